//! Patch-level disturbance hazard.
//!
//! Each patch is independently disturbed after a random interval drawn
//! from a Weibull distribution. The Weibull scale is chosen so that the
//! distribution's mean equals the configured mean interval:
//! `scale = mean / Γ(1 + 1/shape)`.

use rand::Rng;
use rand_distr::{Distribution, Weibull};

use crate::config::DisturbanceConfig;

/// A validated disturbance regime, ready to sample from.
#[derive(Clone, Debug)]
pub struct DisturbanceRegime {
    // None when disturbance is disabled.
    interval: Option<Weibull<f64>>,
}

impl DisturbanceRegime {
    /// Build from configuration that passed
    /// [`Parameters::validate`](crate::Parameters::validate).
    pub fn new(config: &DisturbanceConfig) -> Self {
        if !config.mean_interval.is_finite() {
            return Self { interval: None };
        }
        let scale = weibull_scale(config.mean_interval, config.shape);
        let interval =
            Weibull::new(scale, config.shape).expect("disturbance config validated positive");
        Self {
            interval: Some(interval),
        }
    }

    /// Draw the patch age at which the next disturbance occurs.
    /// Infinite when disturbance is disabled.
    pub fn draw_interval<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match &self.interval {
            Some(dist) => dist.sample(rng),
            None => f64::INFINITY,
        }
    }
}

// Weibull scale whose distribution has the given mean and shape.
fn weibull_scale(mean: f64, shape: f64) -> f64 {
    (mean / ln_gamma(1.0 + 1.0 / shape).exp()).max(f64::MIN_POSITIVE)
}

// Lanczos approximation, g = 7, n = 9. Valid for x >= 0.5.
fn ln_gamma(x: f64) -> f64 {
    const G: f64 = 7.0;
    const COEF: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];
    let x = x - 1.0;
    let mut a = COEF[0];
    let t = x + G + 0.5;
    for (i, c) in COEF.iter().enumerate().skip(1) {
        a += c / (x + i as f64);
    }
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + a.ln()
}
