//! Step-size control from an embedded error estimate.
//!
//! The controller compares each component's error estimate against
//! `abs_tol + rel_tol * |y|` and takes the worst ratio. A ratio above
//! 1.1 rejects the step and shrinks it; a ratio below 0.5 accepts the
//! step and suggests a larger one; anything in between keeps the step
//! size unchanged. Shrink and growth are clamped to
//! `[min_shrink, max_growth]` so that a single bad estimate cannot
//! collapse or explode the step size.

use crate::config::SolverConfig;

/// The controller's verdict on an attempted step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Adjustment {
    /// Error too large: reject and retry with the given smaller step.
    Decrease(f64),
    /// Error comfortably small: accept; the next step may use the
    /// given larger size.
    Increase(f64),
    /// Accept and keep the step size.
    Unchanged,
}

impl Adjustment {
    /// Whether the attempted step should be kept.
    pub fn accepted(&self) -> bool {
        !matches!(self, Self::Decrease(_))
    }

    /// Step size to use for the next attempt, given the attempted `h`.
    pub fn next_step(&self, h: f64) -> f64 {
        match *self {
            Self::Decrease(next) | Self::Increase(next) => next,
            Self::Unchanged => h,
        }
    }
}

/// Error-per-step controller keyed to absolute and relative tolerance.
#[derive(Clone, Debug, PartialEq)]
pub struct StandardControl {
    abs_tol: f64,
    rel_tol: f64,
    safety: f64,
    max_growth: f64,
    min_shrink: f64,
}

impl StandardControl {
    /// Build a controller from validated solver configuration.
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            abs_tol: config.abs_tol,
            rel_tol: config.rel_tol,
            safety: config.safety,
            max_growth: config.max_growth,
            min_shrink: config.min_shrink,
        }
    }

    /// Worst ratio of estimated error to tolerance over all components.
    ///
    /// Non-finite estimates or states map to infinity so that they are
    /// always rejected.
    pub fn error_ratio(&self, y: &[f64], y_err: &[f64]) -> f64 {
        let mut worst: f64 = 0.0;
        for (&yi, &ei) in y.iter().zip(y_err) {
            let scale = self.abs_tol + self.rel_tol * yi.abs();
            let r = (ei / scale).abs();
            if !r.is_finite() {
                return f64::INFINITY;
            }
            worst = worst.max(r);
        }
        worst
    }

    /// Decide what to do with a step of size `h` and method order `order`.
    pub fn adjust(&self, y: &[f64], y_err: &[f64], h: f64, order: u32) -> (Adjustment, f64) {
        let ratio = self.error_ratio(y, y_err);
        let order = f64::from(order);
        let adjustment = if ratio > 1.1 {
            let r = if ratio.is_finite() {
                (self.safety * ratio.powf(-1.0 / order)).max(self.min_shrink)
            } else {
                self.min_shrink
            };
            Adjustment::Decrease(h * r)
        } else if ratio < 0.5 {
            let r = if ratio > 0.0 {
                (self.safety * ratio.powf(-1.0 / (order + 1.0))).clamp(1.0, self.max_growth)
            } else {
                self.max_growth
            };
            Adjustment::Increase(h * r)
        } else {
            Adjustment::Unchanged
        };
        (adjustment, ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control() -> StandardControl {
        StandardControl::new(&SolverConfig {
            abs_tol: 1e-3,
            rel_tol: 1e-12,
            ..SolverConfig::default()
        })
    }

    #[test]
    fn large_error_rejects_and_shrinks() {
        let (adj, ratio) = control().adjust(&[0.0], &[1e-2], 1.0, 4);
        assert!(ratio > 1.1);
        match adj {
            Adjustment::Decrease(h) => assert!(h < 1.0 && h >= 0.2),
            other => panic!("expected Decrease, got {other:?}"),
        }
        assert!(!adj.accepted());
    }

    #[test]
    fn shrink_is_bounded_below() {
        let (adj, _) = control().adjust(&[0.0], &[1e6], 1.0, 4);
        assert_eq!(adj, Adjustment::Decrease(0.2));
    }

    #[test]
    fn tiny_error_grows_within_bound() {
        let (adj, _) = control().adjust(&[0.0], &[1e-12], 1.0, 4);
        match adj {
            Adjustment::Increase(h) => assert!(h > 1.0 && h <= 5.0),
            other => panic!("expected Increase, got {other:?}"),
        }
        assert!(adj.accepted());
    }

    #[test]
    fn zero_error_grows_by_max_factor() {
        let (adj, ratio) = control().adjust(&[1.0, 2.0], &[0.0, 0.0], 0.1, 4);
        assert_eq!(ratio, 0.0);
        assert_eq!(adj.next_step(0.1), 0.1 * 5.0);
    }

    #[test]
    fn moderate_error_keeps_step() {
        let (adj, _) = control().adjust(&[0.0], &[0.8e-3], 0.3, 4);
        assert_eq!(adj, Adjustment::Unchanged);
        assert_eq!(adj.next_step(0.3), 0.3);
    }

    #[test]
    fn non_finite_error_always_rejects() {
        let (adj, ratio) = control().adjust(&[0.0], &[f64::NAN], 1.0, 4);
        assert!(ratio.is_infinite());
        assert_eq!(adj, Adjustment::Decrease(0.2));
    }

    #[test]
    fn empty_state_always_accepts() {
        let (adj, ratio) = control().adjust(&[], &[], 0.5, 4);
        assert_eq!(ratio, 0.0);
        assert!(adj.accepted());
    }
}
