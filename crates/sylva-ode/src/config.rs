//! Solver configuration and validation.

/// Tolerances and step-size bounds for the adaptive solver.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// Absolute error tolerance per state variable. Default: 1e-6.
    pub abs_tol: f64,
    /// Relative error tolerance per state variable. Default: 1e-6.
    pub rel_tol: f64,
    /// Step size used for the first attempt and after [`reset`](crate::Solver::reset).
    /// Default: 0.01.
    pub initial_step: f64,
    /// Floor below which a rejected step is a hard failure. Default: 1e-8.
    pub min_step: f64,
    /// Ceiling on any step size. Default: unbounded.
    pub max_step: f64,
    /// Largest multiplicative increase after an accepted step. Default: 5.
    pub max_growth: f64,
    /// Smallest multiplicative decrease after a rejected step. Default: 0.2.
    pub min_shrink: f64,
    /// Safety factor applied to the optimal step estimate. Default: 0.9.
    pub safety: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            abs_tol: 1e-6,
            rel_tol: 1e-6,
            initial_step: 0.01,
            min_step: 1e-8,
            max_step: f64::INFINITY,
            max_growth: 5.0,
            min_shrink: 0.2,
            safety: 0.9,
        }
    }
}

impl SolverConfig {
    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason for the first violated invariant.
    pub fn validate(&self) -> Result<(), String> {
        if !self.abs_tol.is_finite() || self.abs_tol <= 0.0 {
            return Err(format!("abs_tol must be finite and > 0, got {}", self.abs_tol));
        }
        if !self.rel_tol.is_finite() || self.rel_tol <= 0.0 {
            return Err(format!("rel_tol must be finite and > 0, got {}", self.rel_tol));
        }
        if !self.min_step.is_finite() || self.min_step <= 0.0 {
            return Err(format!("min_step must be finite and > 0, got {}", self.min_step));
        }
        if self.max_step.is_nan() || self.max_step < self.min_step {
            return Err(format!(
                "max_step ({}) must be >= min_step ({})",
                self.max_step, self.min_step
            ));
        }
        if !self.initial_step.is_finite()
            || self.initial_step < self.min_step
            || self.initial_step > self.max_step
        {
            return Err(format!(
                "initial_step ({}) must lie in [min_step, max_step] = [{}, {}]",
                self.initial_step, self.min_step, self.max_step
            ));
        }
        if !self.max_growth.is_finite() || self.max_growth <= 1.0 {
            return Err(format!(
                "max_growth must be finite and > 1, got {}",
                self.max_growth
            ));
        }
        if !self.min_shrink.is_finite() || self.min_shrink <= 0.0 || self.min_shrink >= 1.0 {
            return Err(format!(
                "min_shrink must lie in (0, 1), got {}",
                self.min_shrink
            ));
        }
        if !self.safety.is_finite() || self.safety <= 0.0 || self.safety > 1.0 {
            return Err(format!("safety must lie in (0, 1], got {}", self.safety));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SolverConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_tolerances() {
        for bad in [0.0, -1e-6, f64::NAN, f64::INFINITY] {
            let cfg = SolverConfig {
                abs_tol: bad,
                ..SolverConfig::default()
            };
            assert!(cfg.validate().unwrap_err().contains("abs_tol"));
            let cfg = SolverConfig {
                rel_tol: bad,
                ..SolverConfig::default()
            };
            assert!(cfg.validate().unwrap_err().contains("rel_tol"));
        }
    }

    #[test]
    fn rejects_inverted_step_bounds() {
        let cfg = SolverConfig {
            min_step: 1.0,
            max_step: 0.5,
            initial_step: 0.7,
            ..SolverConfig::default()
        };
        assert!(cfg.validate().unwrap_err().contains("max_step"));
    }

    #[test]
    fn rejects_initial_step_outside_bounds() {
        let cfg = SolverConfig {
            initial_step: 1e-12,
            ..SolverConfig::default()
        };
        assert!(cfg.validate().unwrap_err().contains("initial_step"));
    }

    #[test]
    fn rejects_degenerate_controller_factors() {
        let cfg = SolverConfig {
            max_growth: 1.0,
            ..SolverConfig::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = SolverConfig {
            min_shrink: 1.0,
            ..SolverConfig::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = SolverConfig {
            safety: 0.0,
            ..SolverConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
