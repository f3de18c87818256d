//! Core types and traits for the Sylva metacommunity simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Sylva workspace:
//! identifiers, error types, the state-vector protocol shared by the
//! ODE solver and the population containers, and the growth-model
//! capability that plugs individual physiology into a patch.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod environment;
pub mod error;
pub mod growth;
pub mod id;
pub mod matrix;
pub mod traits;

pub use environment::{Canopy, Environment};
pub use error::{DemographyError, OdeError, StepError};
pub use growth::{GrowthModel, Individual};
pub use id::{PatchId, SpeciesId};
pub use matrix::CountMatrix;
pub use traits::{split_state, split_state_mut, OdeSystem, OdeTarget};
