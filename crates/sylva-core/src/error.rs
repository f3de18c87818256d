//! Error types for the Sylva simulator.
//!
//! Organized by subsystem: numerical integration (ODE solver),
//! demographic bookkeeping (host-facing queries and seed/seedling
//! matrices), and the combined step error surfaced by a metacommunity
//! step. Configuration errors live next to the configuration types in
//! `sylva-engine`.

use std::error::Error;
use std::fmt;

use crate::id::{PatchId, SpeciesId};

/// Errors from the adaptive ODE solver.
#[derive(Clone, Debug, PartialEq)]
pub enum OdeError {
    /// A state vector did not match the target's `ode_size()`.
    SizeMismatch {
        /// Number of values the target expects.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },
    /// A step was requested before any state was set.
    NoState,
    /// The step size collapsed below the configured floor without
    /// satisfying the error tolerance. Fatal for the run.
    StepSizeUnderflow {
        /// Solver time at which the failure occurred.
        time: f64,
        /// The rejected step size.
        step: f64,
        /// The configured minimum step size.
        min_step: f64,
    },
    /// The supplied state or time contained NaN or infinity.
    NonFiniteState {
        /// Solver time at which the non-finite value was found.
        time: f64,
    },
    /// An explicit step size was zero, negative, or non-finite.
    InvalidStepSize {
        /// The rejected step size.
        step: f64,
    },
    /// `advance()` was asked to integrate to a time before the current one.
    TargetInPast {
        /// The requested target time.
        target: f64,
        /// The solver's current time.
        time: f64,
    },
}

impl fmt::Display for OdeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "state vector has {actual} values, target expects {expected}")
            }
            Self::NoState => write!(f, "solver has no state; call set_state first"),
            Self::StepSizeUnderflow {
                time,
                step,
                min_step,
            } => write!(
                f,
                "step size {step:e} fell below minimum {min_step:e} at t={time}"
            ),
            Self::NonFiniteState { time } => write!(f, "non-finite state at t={time}"),
            Self::InvalidStepSize { step } => {
                write!(f, "step size must be finite and positive, got {step}")
            }
            Self::TargetInPast { target, time } => {
                write!(f, "target time {target} is before current time {time}")
            }
        }
    }
}

impl Error for OdeError {}

/// Errors from demographic bookkeeping at the host boundary.
///
/// Raised before any state is mutated: a rejected call leaves the
/// patch or metacommunity exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DemographyError {
    /// A species index was outside `0..n_species`.
    SpeciesOutOfRange {
        /// The offending index.
        species: SpeciesId,
        /// Number of species configured.
        n_species: usize,
    },
    /// A patch index was outside `0..n_patches`.
    PatchOutOfRange {
        /// The offending index.
        patch: PatchId,
        /// Number of patches configured.
        n_patches: usize,
    },
    /// A species-by-patch matrix had the wrong shape.
    ShapeMismatch {
        /// Expected `(rows, cols)` = `(n_species, n_patches)`.
        expected: (usize, usize),
        /// Supplied `(rows, cols)`.
        actual: (usize, usize),
    },
    /// A per-species vector had the wrong length.
    LengthMismatch {
        /// Expected length (number of species).
        expected: usize,
        /// Supplied length.
        actual: usize,
    },
    /// Adding individuals would push one species' population in a
    /// patch past `u32::MAX`.
    CountOverflow {
        /// The species being added to.
        species: SpeciesId,
        /// Population the addition would have produced.
        count: u64,
    },
}

impl fmt::Display for DemographyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpeciesOutOfRange { species, n_species } => {
                write!(f, "species {species} out of range (n_species = {n_species})")
            }
            Self::PatchOutOfRange { patch, n_patches } => {
                write!(f, "patch {patch} out of range (n_patches = {n_patches})")
            }
            Self::ShapeMismatch { expected, actual } => write!(
                f,
                "matrix is {}x{}, expected {}x{} (species x patches)",
                actual.0, actual.1, expected.0, expected.1
            ),
            Self::LengthMismatch { expected, actual } => {
                write!(f, "expected {expected} per-species values, got {actual}")
            }
            Self::CountOverflow { species, count } => {
                write!(f, "species {species} would reach {count} individuals in one patch")
            }
        }
    }
}

impl Error for DemographyError {}

/// Errors from a metacommunity step.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// The deterministic (growth) phase failed to integrate.
    Integration(OdeError),
    /// The stochastic (demographic) phase could not place its seedlings.
    Demography(DemographyError),
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integration(e) => write!(f, "integration failed: {e}"),
            Self::Demography(e) => write!(f, "demography failed: {e}"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Integration(e) => Some(e),
            Self::Demography(e) => Some(e),
        }
    }
}

impl From<OdeError> for StepError {
    fn from(e: OdeError) -> Self {
        Self::Integration(e)
    }
}

impl From<DemographyError> for StepError {
    fn from(e: DemographyError) -> Self {
        Self::Demography(e)
    }
}
