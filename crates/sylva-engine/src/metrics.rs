//! Per-step metrics for the simulation engine.
//!
//! [`StepMetrics`] captures timing, solver effort and demographic
//! counts for a single [`Simulation::step`](crate::Simulation::step).

/// Timing, solver and demographic data collected during one step.
///
/// All durations are in microseconds. Solver counters are increments
/// over this step, not lifetime totals.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepMetrics {
    /// Wall-clock time for the entire step, in microseconds.
    pub total_us: u64,
    /// Time spent integrating growth, in microseconds.
    pub deterministic_us: u64,
    /// Time spent on deaths, births and seed rain, in microseconds.
    pub stochastic_us: u64,
    /// Integrated time covered by this step.
    pub elapsed: f64,
    /// Solver steps accepted.
    pub accepted_steps: u64,
    /// Solver steps rejected and retried.
    pub rejected_steps: u64,
    /// Right-hand-side evaluations.
    pub rhs_evaluations: u64,
    /// Individuals removed by mortality or disturbance.
    pub deaths: u64,
    /// Patches disturbed.
    pub disturbances: u32,
    /// Seeds produced.
    pub seeds_produced: u64,
    /// Seeds that became seedlings.
    pub seedlings_established: u64,
    /// Live individuals after the step.
    pub individuals: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = StepMetrics::default();
        assert_eq!(m.total_us, 0);
        assert_eq!(m.elapsed, 0.0);
        assert_eq!(m.accepted_steps, 0);
        assert_eq!(m.deaths, 0);
        assert_eq!(m.individuals, 0);
    }
}
