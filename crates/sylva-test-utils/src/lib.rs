//! Test utilities and fixture systems for Sylva development.
//!
//! Provides small closed-form [`OdeTarget`]s for exercising the solver
//! ([`ConstantRate`], [`ExponentialDecay`], [`PoisonedRate`]) and, in
//! [`fixtures`], growth models with trivially predictable physiology
//! for engine tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{LinearGrowth, LinearPlant};

use sylva_core::{split_state, split_state_mut, OdeSystem, OdeTarget};

/// Independent variables each changing at a fixed rate.
///
/// Any explicit Runge–Kutta method integrates this exactly, with a zero
/// error estimate.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantRate {
    values: Vec<f64>,
    rates: Vec<f64>,
}

impl ConstantRate {
    /// # Panics
    ///
    /// Panics if `values` and `rates` differ in length.
    pub fn new(values: Vec<f64>, rates: Vec<f64>) -> Self {
        assert_eq!(values.len(), rates.len(), "one rate per value");
        Self { values, rates }
    }

    /// Append a variable, growing the system by one slot.
    pub fn push(&mut self, value: f64, rate: f64) {
        self.values.push(value);
        self.rates.push(rate);
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl OdeSystem for ConstantRate {
    fn ode_size(&self) -> usize {
        self.values.len()
    }

    fn ode_values_set<'a>(&mut self, values: &'a [f64]) -> &'a [f64] {
        let (head, tail) = split_state(values, self.values.len());
        self.values.copy_from_slice(head);
        tail
    }

    fn ode_values<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64] {
        let (head, tail) = split_state_mut(out, self.values.len());
        head.copy_from_slice(&self.values);
        tail
    }

    fn ode_rates<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64] {
        let (head, tail) = split_state_mut(out, self.rates.len());
        head.copy_from_slice(&self.rates);
        tail
    }
}

impl OdeTarget for ConstantRate {}

/// `dy/dt = -lambda * y`, solved by `y0 * exp(-lambda * t)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ExponentialDecay {
    pub lambda: f64,
    pub value: f64,
}

impl ExponentialDecay {
    pub fn new(lambda: f64, y0: f64) -> Self {
        Self { lambda, value: y0 }
    }

    pub fn exact(&self, y0: f64, t: f64) -> f64 {
        y0 * (-self.lambda * t).exp()
    }
}

impl OdeSystem for ExponentialDecay {
    fn ode_size(&self) -> usize {
        1
    }

    fn ode_values_set<'a>(&mut self, values: &'a [f64]) -> &'a [f64] {
        let (head, tail) = split_state(values, 1);
        self.value = head[0];
        tail
    }

    fn ode_values<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64] {
        let (head, tail) = split_state_mut(out, 1);
        head[0] = self.value;
        tail
    }

    fn ode_rates<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64] {
        let (head, tail) = split_state_mut(out, 1);
        head[0] = -self.lambda * self.value;
        tail
    }
}

impl OdeTarget for ExponentialDecay {}

/// A system whose rates are always NaN.
///
/// Every adaptive attempt is rejected, so the solver shrinks until it
/// hits its minimum step. Useful for exercising failure paths.
#[derive(Clone, Debug, PartialEq)]
pub struct PoisonedRate {
    values: Vec<f64>,
}

impl PoisonedRate {
    /// `size` zero-valued variables.
    pub fn new(size: usize) -> Self {
        Self {
            values: vec![0.0; size],
        }
    }
}

impl OdeSystem for PoisonedRate {
    fn ode_size(&self) -> usize {
        self.values.len()
    }

    fn ode_values_set<'a>(&mut self, values: &'a [f64]) -> &'a [f64] {
        let (head, tail) = split_state(values, self.values.len());
        self.values.copy_from_slice(head);
        tail
    }

    fn ode_values<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64] {
        let (head, tail) = split_state_mut(out, self.values.len());
        head.copy_from_slice(&self.values);
        tail
    }

    fn ode_rates<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64] {
        let (head, tail) = split_state_mut(out, self.values.len());
        head.fill(f64::NAN);
        tail
    }
}

impl OdeTarget for PoisonedRate {}
