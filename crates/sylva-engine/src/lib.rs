//! Patch and metacommunity engine for Sylva.
//!
//! Composes per-species populations into [`Patch`]es, patches into a
//! [`Metacommunity`] that is integrated as one ODE system by a single
//! adaptive solver, and alternates that continuous growth with
//! stochastic deaths, disturbance and seed rain. [`Simulation`] wraps a
//! metacommunity together with its seeded generator for host use.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod dispersal;
pub mod disturbance;
pub mod hash;
pub mod metacommunity;
pub mod metrics;
pub mod patch;
pub mod simulation;

pub use config::{ConfigError, DisturbanceConfig, ParameterKey, Parameters};
pub use dispersal::allocate_seeds;
pub use disturbance::DisturbanceRegime;
pub use hash::state_hash;
pub use metacommunity::{Demography, Metacommunity};
pub use metrics::StepMetrics;
pub use patch::{Mortality, Patch};
pub use simulation::{SimRng, Simulation};
