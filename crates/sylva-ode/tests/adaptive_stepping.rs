//! Integration test: adaptive stepping over composite and oscillatory
//! systems.
//!
//! Exercises the solver through the public API only: composites built
//! from the blanket `Vec<T>` protocol impl, a two-variable oscillator
//! whose rates couple slots, and long runs that must track closed-form
//! solutions within tolerance while landing exactly on requested times.

use sylva_core::{split_state, split_state_mut, OdeError, OdeSystem, OdeTarget};
use sylva_ode::{Solver, SolverConfig};
use sylva_test_utils::{ConstantRate, ExponentialDecay};

// ── Harmonic oscillator: x' = v, v' = -omega^2 x ─────────────────────

struct Oscillator {
    omega: f64,
    x: f64,
    v: f64,
}

impl OdeSystem for Oscillator {
    fn ode_size(&self) -> usize {
        2
    }

    fn ode_values_set<'a>(&mut self, values: &'a [f64]) -> &'a [f64] {
        let (head, tail) = split_state(values, 2);
        self.x = head[0];
        self.v = head[1];
        tail
    }

    fn ode_values<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64] {
        let (head, tail) = split_state_mut(out, 2);
        head[0] = self.x;
        head[1] = self.v;
        tail
    }

    fn ode_rates<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64] {
        let (head, tail) = split_state_mut(out, 2);
        head[0] = self.v;
        head[1] = -self.omega * self.omega * self.x;
        tail
    }
}

impl OdeTarget for Oscillator {}

fn tight() -> SolverConfig {
    SolverConfig {
        abs_tol: 1e-9,
        rel_tol: 1e-9,
        ..SolverConfig::default()
    }
}

#[test]
fn oscillator_conserves_phase_over_many_periods() {
    let omega = 2.0 * std::f64::consts::PI;
    let mut osc = Oscillator {
        omega,
        x: 1.0,
        v: 0.0,
    };
    let mut solver = Solver::new(tight());
    solver.set_state(&osc, &osc.ode_state(), 0.0).unwrap();

    // Ten full periods.
    solver.advance(&mut osc, 10.0, None).unwrap();
    let y = solver.state();
    assert_eq!(solver.time(), 10.0);
    assert!((y[0] - 1.0).abs() < 1e-5, "x = {}", y[0]);
    assert!(y[1].abs() < 1e-4, "v = {}", y[1]);
    assert!(solver.stats().accepted_steps > 10);
}

#[test]
fn composite_of_decays_tracks_every_component() {
    let mut system: Vec<ExponentialDecay> = [0.1, 1.0, 3.0]
        .iter()
        .map(|&lambda| ExponentialDecay::new(lambda, 1.0))
        .collect();
    let mut solver = Solver::new(tight());
    solver.set_state(&system, &system.ode_state(), 0.0).unwrap();
    solver.advance(&mut system, 2.0, None).unwrap();

    for (i, lambda) in [0.1f64, 1.0, 3.0].iter().enumerate() {
        let exact = (-lambda * 2.0).exp();
        assert!(
            (solver.state()[i] - exact).abs() < 1e-7,
            "component {i}: {} vs {exact}",
            solver.state()[i]
        );
    }
}

#[test]
fn linear_growth_reaches_height_plus_k_t() {
    let k = 0.75;
    let t = 13.0;
    let mut plant = ConstantRate::new(vec![0.5], vec![k]);
    let mut solver = Solver::new(SolverConfig::default());
    solver.set_state(&plant, &plant.ode_state(), 0.0).unwrap();

    let mut elapsed = 0.0;
    while solver.time() < t {
        elapsed += solver.step(&mut plant).unwrap();
    }
    let expected = 0.5 + k * solver.time();
    assert!((solver.state()[0] - expected).abs() < 1e-6);
    assert!((elapsed - solver.time()).abs() < 1e-12);
}

#[test]
fn step_history_grows_then_reset_restarts_small() {
    let mut plant = ConstantRate::new(vec![0.0], vec![1.0]);
    let mut solver = Solver::new(SolverConfig {
        max_step: 10.0,
        ..SolverConfig::default()
    });
    solver.set_state(&plant, &[0.0], 0.0).unwrap();
    for _ in 0..10 {
        solver.step(&mut plant).unwrap();
    }
    assert_eq!(solver.step_size(), 10.0);

    solver.reset();
    let h = solver.step(&mut plant).unwrap();
    assert_eq!(h, solver.config().initial_step);
}

#[test]
fn rejection_cycles_terminate_on_sudden_stiffness() {
    // A fast mode that needs a much smaller step than history suggests.
    let mut system = vec![
        ExponentialDecay::new(0.01, 1.0),
        ExponentialDecay::new(0.01, 1.0),
    ];
    let mut solver = Solver::new(tight());
    solver.set_state(&system, &system.ode_state(), 0.0).unwrap();
    solver.advance(&mut system, 50.0, None).unwrap();
    let before = solver.stats();

    system[1].lambda = 200.0;
    let state = solver.state().to_vec();
    solver.set_state(&system, &state, solver.time()).unwrap();
    solver.step(&mut system).unwrap();
    let delta = solver.stats().since(&before);
    assert!(delta.rejected_steps > 0);
    assert_eq!(delta.accepted_steps, 1);
}

#[test]
fn size_drift_between_set_state_and_step_is_reported() {
    let mut system = vec![ExponentialDecay::new(1.0, 1.0)];
    let mut solver = Solver::new(SolverConfig::default());
    solver.set_state(&system, &system.ode_state(), 0.0).unwrap();
    system.push(ExponentialDecay::new(1.0, 1.0));
    assert_eq!(
        solver.step(&mut system),
        Err(OdeError::SizeMismatch {
            expected: 2,
            actual: 1
        })
    );
}

#[test]
fn empty_system_advances_time_only() {
    let mut system: Vec<ExponentialDecay> = Vec::new();
    let mut solver = Solver::new(SolverConfig::default());
    solver.set_state(&system, &[], 0.0).unwrap();
    let h = solver.step(&mut system).unwrap();
    assert_eq!(h, 0.01);
    assert!(solver.state().is_empty());
}
