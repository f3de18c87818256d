//! Sylva: a hybrid ODE and stochastic simulator for plant metacommunities.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Sylva sub-crates. For most users, adding `sylva` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use sylva::prelude::*;
//!
//! let pioneer = LightLimited::builder().name("pioneer").growth_rate(2.0).build().unwrap();
//! let species: Vec<Arc<dyn GrowthModel>> = vec![Arc::new(pioneer)];
//!
//! let mut sim = Simulation::new(Parameters::new(4, species), 42).unwrap();
//! sim.add_seeds(&[20]).unwrap();
//! assert_eq!(sim.community().total_individuals(), 20);
//!
//! let metrics = sim.step().unwrap();
//! assert!(metrics.elapsed > 0.0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `sylva-core` | IDs, errors, the state vector protocol, growth model traits |
//! | [`ode`] | `sylva-ode` | Adaptive Runge–Kutta solver and step-size control |
//! | [`engine`] | `sylva-engine` | Patches, metacommunity, seed rain, seeded simulation |
//! | [`models`] | `sylva-models` | Reference growth models |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`sylva-core`).
///
/// Contains [`types::OdeSystem`], [`types::OdeTarget`], the growth model
/// traits and [`types::CountMatrix`].
pub use sylva_core as types;

/// Adaptive ODE integration (`sylva-ode`).
///
/// [`ode::Solver`] with Cash–Karp stepping and standard error control.
pub use sylva_ode as ode;

/// Metacommunity engine (`sylva-engine`).
///
/// [`engine::Patch`], [`engine::Metacommunity`] and the seeded
/// [`engine::Simulation`] wrapper.
pub use sylva_engine as engine;

/// Reference growth models (`sylva-models`).
pub use sylva_models as models;

/// Common imports for typical Sylva usage.
///
/// ```rust
/// use sylva::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use sylva_core::{
        CountMatrix, Environment, GrowthModel, Individual, OdeSystem, OdeTarget, PatchId,
        SpeciesId,
    };

    // Errors
    pub use sylva_core::{DemographyError, OdeError, StepError};

    // Solver
    pub use sylva_ode::{Solver, SolverConfig};

    // Engine
    pub use sylva_engine::{
        ConfigError, DisturbanceConfig, Metacommunity, ParameterKey, Parameters, Patch,
        SimRng, Simulation, StepMetrics,
    };

    // Models
    pub use sylva_models::{LightLimited, LightTraits};
}
