//! The adaptive solver: buffers, time, step-size history and stepping.
//!
//! # Lifecycle
//!
//! 1. [`Solver::set_state`] copies an explicit state vector and time in,
//!    checking the length against the target's `ode_size()`.
//! 2. [`Solver::step`] takes one adaptive step (retrying internally on
//!    rejection), [`Solver::advance`] steps until a target time, and
//!    [`Solver::try_step`] / [`Solver::do_step`] expose single attempts
//!    at an explicit size.
//! 3. [`Solver::state`] and [`Solver::time`] read the result back.
//!
//! The solver remembers the step size suggested by the controller
//! across calls, including across `set_state`. Callers that change the
//! target discontinuously (births, deaths, clearing) call
//! [`Solver::reset`] so the next step starts from the configured
//! initial step rather than from history computed on a stale system.
//!
//! After a step the target holds whatever state its last stage
//! evaluation unpacked, not the accepted solution. Callers that need the
//! target consistent with the solver unpack [`Solver::state`] into it.

use sylva_core::{OdeError, OdeSystem, OdeTarget};

use crate::config::SolverConfig;
use crate::control::StandardControl;
use crate::stepper::CashKarp;

/// Cumulative counters over the solver's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolverStats {
    /// Steps whose error estimate met tolerance (plus forced steps).
    pub accepted_steps: u64,
    /// Steps discarded by the controller.
    pub rejected_steps: u64,
    /// Right-hand-side evaluations.
    pub rhs_evaluations: u64,
}

impl SolverStats {
    /// Counter increments since an earlier snapshot.
    pub fn since(&self, earlier: &SolverStats) -> SolverStats {
        SolverStats {
            accepted_steps: self.accepted_steps - earlier.accepted_steps,
            rejected_steps: self.rejected_steps - earlier.rejected_steps,
            rhs_evaluations: self.rhs_evaluations - earlier.rhs_evaluations,
        }
    }
}

/// Result of a single attempted step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepOutcome {
    /// Whether the step was committed.
    pub accepted: bool,
    /// The attempted step size.
    pub step: f64,
    /// The controller's suggestion for the next attempt.
    pub next_step: f64,
    /// Worst error-to-tolerance ratio over all components.
    pub error_ratio: f64,
}

/// Embedded Runge–Kutta solver with adaptive step-size control.
#[derive(Clone, Debug)]
pub struct Solver {
    config: SolverConfig,
    control: StandardControl,
    stepper: CashKarp,
    time: f64,
    y: Vec<f64>,
    y_new: Vec<f64>,
    y_err: Vec<f64>,
    dydt: Vec<f64>,
    dydt_valid: bool,
    has_state: bool,
    step_size: f64,
    stats: SolverStats,
}

impl Solver {
    /// Create a solver. `config` is expected to have passed
    /// [`SolverConfig::validate`].
    pub fn new(config: SolverConfig) -> Self {
        debug_assert!(config.validate().is_ok(), "invalid solver config");
        Self {
            control: StandardControl::new(&config),
            stepper: CashKarp::new(),
            time: 0.0,
            y: Vec::new(),
            y_new: Vec::new(),
            y_err: Vec::new(),
            dydt: Vec::new(),
            dydt_valid: false,
            has_state: false,
            step_size: config.initial_step,
            stats: SolverStats::default(),
            config,
        }
    }

    /// The solver's configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Current integration time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Current state vector.
    pub fn state(&self) -> &[f64] {
        &self.y
    }

    /// Step size the next adaptive step will attempt first.
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Lifetime counters.
    pub fn stats(&self) -> SolverStats {
        self.stats
    }

    /// Whether [`set_state`](Self::set_state) has been called.
    pub fn has_state(&self) -> bool {
        self.has_state
    }

    /// Load an explicit state vector and time.
    ///
    /// # Errors
    ///
    /// [`OdeError::SizeMismatch`] if `values.len() != target.ode_size()`,
    /// [`OdeError::NonFiniteState`] if `time` or any value is NaN or infinite.
    pub fn set_state<T: OdeSystem + ?Sized>(
        &mut self,
        target: &T,
        values: &[f64],
        time: f64,
    ) -> Result<(), OdeError> {
        let expected = target.ode_size();
        if values.len() != expected {
            return Err(OdeError::SizeMismatch {
                expected,
                actual: values.len(),
            });
        }
        if !time.is_finite() || values.iter().any(|v| !v.is_finite()) {
            return Err(OdeError::NonFiniteState { time });
        }
        let n = values.len();
        self.y.clear();
        self.y.extend_from_slice(values);
        self.y_new.resize(n, 0.0);
        self.y_err.resize(n, 0.0);
        self.dydt.resize(n, 0.0);
        self.time = time;
        self.dydt_valid = false;
        self.has_state = true;
        Ok(())
    }

    /// Forget step-size history; the next step starts from the
    /// configured initial step. State and time are kept.
    pub fn reset(&mut self) {
        self.step_size = self.config.initial_step;
        self.dydt_valid = false;
    }

    /// Attempt one step of exactly `h`, without retrying.
    ///
    /// Commits the step only if the controller accepts it. Does not
    /// update the remembered step size; the suggestion is returned in
    /// [`StepOutcome::next_step`].
    ///
    /// # Errors
    ///
    /// [`OdeError::NoState`], [`OdeError::SizeMismatch`] if the target
    /// changed size since `set_state`, [`OdeError::InvalidStepSize`].
    pub fn try_step<T: OdeTarget + ?Sized>(
        &mut self,
        target: &mut T,
        h: f64,
    ) -> Result<StepOutcome, OdeError> {
        self.require_state(target)?;
        check_step(h)?;
        self.attempt(target, h);

        let (adjustment, error_ratio) =
            self.control
                .adjust(&self.y_new, &self.y_err, h, CashKarp::ORDER);
        let finite = self.y_new.iter().all(|v| v.is_finite());
        let accepted = adjustment.accepted() && finite;
        let next_step = if finite {
            adjustment.next_step(h)
        } else {
            h * self.config.min_shrink
        }
        .min(self.config.max_step);

        if accepted {
            self.commit(h);
        } else {
            self.stats.rejected_steps += 1;
        }
        tracing::trace!(
            time = self.time,
            step = h,
            error_ratio,
            accepted,
            "solver step attempt"
        );
        Ok(StepOutcome {
            accepted,
            step: h,
            next_step,
            error_ratio,
        })
    }

    /// Take one step of exactly `h` with no error control.
    ///
    /// # Errors
    ///
    /// As [`try_step`](Self::try_step), plus [`OdeError::NonFiniteState`]
    /// if the step produced NaN or infinity (the step is then discarded).
    pub fn do_step<T: OdeTarget + ?Sized>(&mut self, target: &mut T, h: f64) -> Result<(), OdeError> {
        self.require_state(target)?;
        check_step(h)?;
        self.attempt(target, h);
        if self.y_new.iter().any(|v| !v.is_finite()) {
            return Err(OdeError::NonFiniteState { time: self.time + h });
        }
        self.commit(h);
        Ok(())
    }

    /// Take one adaptive step, retrying with smaller steps on rejection.
    ///
    /// Returns the elapsed time of the accepted step, which may be
    /// smaller than the remembered step size if rejections occurred.
    ///
    /// # Errors
    ///
    /// [`OdeError::StepSizeUnderflow`] if the step size falls below
    /// `min_step` before an attempt is accepted. Not retried further.
    pub fn step<T: OdeTarget + ?Sized>(&mut self, target: &mut T) -> Result<f64, OdeError> {
        self.step_bounded(target, f64::INFINITY)
    }

    /// Step until `target_time`, landing on it exactly.
    ///
    /// `dt_hint`, when given, replaces the remembered step size (clamped
    /// to the configured bounds) before the first step.
    ///
    /// # Errors
    ///
    /// [`OdeError::TargetInPast`] if `target_time` is before the current
    /// time (or not finite), [`OdeError::InvalidStepSize`] for a bad hint,
    /// and any error from [`step`](Self::step).
    pub fn advance<T: OdeTarget + ?Sized>(
        &mut self,
        target: &mut T,
        target_time: f64,
        dt_hint: Option<f64>,
    ) -> Result<(), OdeError> {
        self.require_state(target)?;
        if !target_time.is_finite() || target_time < self.time {
            return Err(OdeError::TargetInPast {
                target: target_time,
                time: self.time,
            });
        }
        if let Some(h) = dt_hint {
            check_step(h)?;
            self.step_size = h.clamp(self.config.min_step, self.config.max_step);
        }
        while self.time < target_time {
            self.step_bounded(target, target_time)?;
        }
        Ok(())
    }

    fn step_bounded<T: OdeTarget + ?Sized>(
        &mut self,
        target: &mut T,
        t_max: f64,
    ) -> Result<f64, OdeError> {
        let mut h = self.step_size.min(self.config.max_step);
        loop {
            let remaining = t_max - self.time;
            let clipped = h >= remaining;
            let h_try = if clipped { remaining } else { h };
            if !clipped && h_try < self.config.min_step {
                tracing::warn!(
                    time = self.time,
                    step = h_try,
                    min_step = self.config.min_step,
                    "solver step size underflow"
                );
                return Err(OdeError::StepSizeUnderflow {
                    time: self.time,
                    step: h_try,
                    min_step: self.config.min_step,
                });
            }

            let outcome = self.try_step(target, h_try)?;
            if outcome.accepted {
                if clipped {
                    self.time = t_max;
                } else {
                    self.step_size = outcome.next_step;
                }
                return Ok(h_try);
            }
            h = outcome.next_step;
            self.step_size = h;
        }
    }

    fn require_state<T: OdeSystem + ?Sized>(&self, target: &T) -> Result<(), OdeError> {
        if !self.has_state {
            return Err(OdeError::NoState);
        }
        let expected = target.ode_size();
        if expected != self.y.len() {
            return Err(OdeError::SizeMismatch {
                expected,
                actual: self.y.len(),
            });
        }
        Ok(())
    }

    fn attempt<T: OdeTarget + ?Sized>(&mut self, target: &mut T, h: f64) {
        if !self.dydt_valid {
            target.derivs(self.time, &self.y, &mut self.dydt);
            self.stats.rhs_evaluations += 1;
            self.dydt_valid = true;
        }
        self.stepper.apply(
            target,
            self.time,
            h,
            &self.y,
            &self.dydt,
            &mut self.y_new,
            &mut self.y_err,
        );
        self.stats.rhs_evaluations += CashKarp::STAGES - 1;
    }

    fn commit(&mut self, h: f64) {
        std::mem::swap(&mut self.y, &mut self.y_new);
        self.time += h;
        self.dydt_valid = false;
        self.stats.accepted_steps += 1;
    }
}

fn check_step(h: f64) -> Result<(), OdeError> {
    if !h.is_finite() || h <= 0.0 {
        return Err(OdeError::InvalidStepSize { step: h });
    }
    Ok(())
}
