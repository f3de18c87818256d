//! Simulation parameters, validation, and error types.
//!
//! [`Parameters`] is the shared, read-only configuration every patch of a
//! [`Metacommunity`](crate::Metacommunity) refers to. Scalar fields are
//! additionally addressable by name through [`ParameterKey`], a fixed
//! table of typed accessors for hosts that set parameters from strings.

use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use sylva_core::GrowthModel;
use sylva_ode::SolverConfig;

// ── DisturbanceConfig ──────────────────────────────────────────────

/// Shape of the patch-level disturbance hazard.
///
/// Time between disturbances follows a Weibull distribution with the
/// given mean. `shape = 1` is a memoryless (exponential) regime; larger
/// shapes make young patches less likely to be disturbed than old ones.
#[derive(Clone, Debug, PartialEq)]
pub struct DisturbanceConfig {
    /// Mean time between disturbances. `f64::INFINITY` disables
    /// disturbance. Default: 30.
    pub mean_interval: f64,
    /// Weibull shape parameter. Default: 2.
    pub shape: f64,
}

impl Default for DisturbanceConfig {
    fn default() -> Self {
        Self {
            mean_interval: 30.0,
            shape: 2.0,
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating or editing [`Parameters`].
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// `n_patches` is zero.
    NoPatches,
    /// No species registered.
    NoSpecies,
    /// Disturbance mean interval or shape is NaN, zero, or negative.
    InvalidDisturbance {
        /// The invalid value.
        value: f64,
    },
    /// A solver tolerance or step bound is invalid.
    InvalidSolver {
        /// Description of which invariant was violated.
        reason: String,
    },
    /// Light extinction coefficient is negative or not finite.
    InvalidLightExtinction {
        /// The invalid value.
        value: f64,
    },
    /// No parameter is registered under this name.
    UnknownParameter {
        /// The name that was looked up.
        name: String,
    },
    /// A value was rejected for a named parameter.
    InvalidParameter {
        /// The parameter being set.
        key: ParameterKey,
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPatches => write!(f, "n_patches must be at least 1"),
            Self::NoSpecies => write!(f, "no species registered"),
            Self::InvalidDisturbance { value } => {
                write!(f, "disturbance parameters must be positive, got {value}")
            }
            Self::InvalidSolver { reason } => write!(f, "invalid solver config: {reason}"),
            Self::InvalidLightExtinction { value } => {
                write!(f, "light_extinction must be finite and >= 0, got {value}")
            }
            Self::UnknownParameter { name } => write!(f, "unknown parameter '{name}'"),
            Self::InvalidParameter { key, value } => {
                write!(f, "invalid value {value} for parameter '{}'", key.name())
            }
        }
    }
}

impl Error for ConfigError {}

// ── ParameterKey ───────────────────────────────────────────────────

/// Name-addressable scalar parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterKey {
    /// [`Parameters::n_patches`].
    NPatches,
    /// [`DisturbanceConfig::mean_interval`].
    DisturbanceMeanInterval,
    /// [`DisturbanceConfig::shape`].
    DisturbanceShape,
    /// [`Parameters::light_extinction`].
    LightExtinction,
    /// [`SolverConfig::abs_tol`].
    AbsTol,
    /// [`SolverConfig::rel_tol`].
    RelTol,
    /// [`SolverConfig::initial_step`].
    InitialStep,
    /// [`SolverConfig::min_step`].
    MinStep,
    /// [`SolverConfig::max_step`].
    MaxStep,
}

impl ParameterKey {
    /// Every key, in a fixed order.
    pub const ALL: [ParameterKey; 9] = [
        Self::NPatches,
        Self::DisturbanceMeanInterval,
        Self::DisturbanceShape,
        Self::LightExtinction,
        Self::AbsTol,
        Self::RelTol,
        Self::InitialStep,
        Self::MinStep,
        Self::MaxStep,
    ];

    /// Host-facing name.
    pub fn name(self) -> &'static str {
        match self {
            Self::NPatches => "n_patches",
            Self::DisturbanceMeanInterval => "disturbance_mean_interval",
            Self::DisturbanceShape => "disturbance_shape",
            Self::LightExtinction => "light_extinction",
            Self::AbsTol => "abs_tol",
            Self::RelTol => "rel_tol",
            Self::InitialStep => "initial_step",
            Self::MinStep => "min_step",
            Self::MaxStep => "max_step",
        }
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParameterKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| ConfigError::UnknownParameter {
                name: s.to_string(),
            })
    }
}

// ── Parameters ─────────────────────────────────────────────────────

/// Complete configuration for a metacommunity run.
#[derive(Clone)]
pub struct Parameters {
    /// Number of patches. Must be at least 1.
    pub n_patches: usize,
    /// Species, indexed by [`SpeciesId`](sylva_core::SpeciesId).
    pub species: Vec<Arc<dyn GrowthModel>>,
    /// Patch disturbance regime.
    pub disturbance: DisturbanceConfig,
    /// Canopy light extinction coefficient. Default: 0.5.
    pub light_extinction: f64,
    /// Adaptive solver tolerances and step bounds.
    pub solver: SolverConfig,
}

impl Parameters {
    /// Default settings for `n_patches` patches of the given species.
    pub fn new(n_patches: usize, species: Vec<Arc<dyn GrowthModel>>) -> Self {
        Self {
            n_patches,
            species,
            disturbance: DisturbanceConfig::default(),
            light_extinction: 0.5,
            solver: SolverConfig::default(),
        }
    }

    /// Number of species.
    pub fn n_species(&self) -> usize {
        self.species.len()
    }

    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_patches == 0 {
            return Err(ConfigError::NoPatches);
        }
        if u32::try_from(self.n_patches).is_err() {
            return Err(ConfigError::InvalidParameter {
                key: ParameterKey::NPatches,
                value: self.n_patches as f64,
            });
        }
        if self.species.is_empty() {
            return Err(ConfigError::NoSpecies);
        }
        let d = &self.disturbance;
        if d.mean_interval.is_nan() || d.mean_interval <= 0.0 {
            return Err(ConfigError::InvalidDisturbance {
                value: d.mean_interval,
            });
        }
        if !d.shape.is_finite() || d.shape <= 0.0 {
            return Err(ConfigError::InvalidDisturbance { value: d.shape });
        }
        if !self.light_extinction.is_finite() || self.light_extinction < 0.0 {
            return Err(ConfigError::InvalidLightExtinction {
                value: self.light_extinction,
            });
        }
        self.solver
            .validate()
            .map_err(|reason| ConfigError::InvalidSolver { reason })?;
        Ok(())
    }

    /// Read a scalar parameter.
    pub fn get(&self, key: ParameterKey) -> f64 {
        match key {
            ParameterKey::NPatches => self.n_patches as f64,
            ParameterKey::DisturbanceMeanInterval => self.disturbance.mean_interval,
            ParameterKey::DisturbanceShape => self.disturbance.shape,
            ParameterKey::LightExtinction => self.light_extinction,
            ParameterKey::AbsTol => self.solver.abs_tol,
            ParameterKey::RelTol => self.solver.rel_tol,
            ParameterKey::InitialStep => self.solver.initial_step,
            ParameterKey::MinStep => self.solver.min_step,
            ParameterKey::MaxStep => self.solver.max_step,
        }
    }

    /// Set a scalar parameter.
    ///
    /// The edit is applied to a copy and validated as a whole; on error
    /// `self` is unchanged. `n_patches` must be a positive whole number.
    pub fn set(&mut self, key: ParameterKey, value: f64) -> Result<(), ConfigError> {
        let invalid = ConfigError::InvalidParameter { key, value };
        let mut next = self.clone();
        match key {
            ParameterKey::NPatches => {
                if !value.is_finite() || value < 1.0 || value.fract() != 0.0 {
                    return Err(invalid);
                }
                next.n_patches = value as usize;
            }
            ParameterKey::DisturbanceMeanInterval => next.disturbance.mean_interval = value,
            ParameterKey::DisturbanceShape => next.disturbance.shape = value,
            ParameterKey::LightExtinction => next.light_extinction = value,
            ParameterKey::AbsTol => next.solver.abs_tol = value,
            ParameterKey::RelTol => next.solver.rel_tol = value,
            ParameterKey::InitialStep => next.solver.initial_step = value,
            ParameterKey::MinStep => next.solver.min_step = value,
            ParameterKey::MaxStep => next.solver.max_step = value,
        }
        next.validate().map_err(|_| invalid)?;
        *self = next;
        Ok(())
    }

    /// Set a scalar parameter by host-facing name.
    pub fn set_by_name(&mut self, name: &str, value: f64) -> Result<(), ConfigError> {
        self.set(name.parse()?, value)
    }
}

impl fmt::Debug for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.species.iter().map(|s| s.name()).collect();
        f.debug_struct("Parameters")
            .field("n_patches", &self.n_patches)
            .field("species", &names)
            .field("disturbance", &self.disturbance)
            .field("light_extinction", &self.light_extinction)
            .field("solver", &self.solver)
            .finish()
    }
}
