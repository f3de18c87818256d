//! Seeded, host-facing simulation.
//!
//! [`Simulation`] owns a [`Metacommunity`] together with the generator
//! that drives its stochastic steps. Every stochastic entry point
//! borrows that generator for exactly the duration of the call, so two
//! simulations created with the same parameters and seed evolve
//! identically, bit for bit.
//!
//! # Ownership model
//!
//! `Simulation` is [`Send`] (can be moved between threads). All
//! mutating methods take `&mut self`; there is no shared or global
//! generator state.

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sylva_core::{CountMatrix, DemographyError, OdeError, StepError};

use crate::config::{ConfigError, Parameters};
use crate::hash::state_hash;
use crate::metacommunity::{Demography, Metacommunity};
use crate::metrics::StepMetrics;

/// The generator type used by [`Simulation`].
pub type SimRng = ChaCha8Rng;

// Compile-time assertion: Simulation is Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Simulation>();
    }
};

/// A metacommunity and its seeded generator.
pub struct Simulation {
    community: Metacommunity,
    rng: SimRng,
    seed: u64,
    last_metrics: StepMetrics,
}

impl Simulation {
    /// Validate `parameters`, build an empty metacommunity and seed the
    /// generator.
    pub fn new(parameters: Parameters, seed: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            community: Metacommunity::new(parameters)?,
            rng: SimRng::seed_from_u64(seed),
            seed,
            last_metrics: StepMetrics::default(),
        })
    }

    /// One deterministic step then one stochastic step.
    ///
    /// # Errors
    ///
    /// [`StepError::Integration`] if the solver fails. The community is
    /// left at its last accepted state and the failure is logged.
    /// [`StepError::Demography`] if the seed rain cannot be placed.
    pub fn step(&mut self) -> Result<&StepMetrics, StepError> {
        let before = self.community.solver_stats();
        let start = Instant::now();

        let elapsed = self.community.step_deterministic().inspect_err(|e| {
            tracing::warn!(age = self.community.age(), error = %e, "deterministic step failed");
        })?;
        let deterministic_us = start.elapsed().as_micros() as u64;

        let stochastic_start = Instant::now();
        let demography = self.community.step_stochastic(&mut self.rng).inspect_err(|e| {
            tracing::warn!(age = self.community.age(), error = %e, "stochastic step failed");
        })?;
        let stochastic_us = stochastic_start.elapsed().as_micros() as u64;

        let solver = self.community.solver_stats().since(&before);
        self.last_metrics = StepMetrics {
            total_us: start.elapsed().as_micros() as u64,
            deterministic_us,
            stochastic_us,
            elapsed,
            accepted_steps: solver.accepted_steps,
            rejected_steps: solver.rejected_steps,
            rhs_evaluations: solver.rhs_evaluations,
            deaths: demography.deaths,
            disturbances: demography.disturbances,
            seeds_produced: demography.seeds_produced,
            seedlings_established: demography.seedlings_established,
            individuals: self.community.total_individuals(),
        };
        Ok(&self.last_metrics)
    }

    /// Integrate growth only. Returns the elapsed time.
    pub fn step_deterministic(&mut self) -> Result<f64, OdeError> {
        self.community.step_deterministic()
    }

    /// Deaths, births and seed rain only.
    pub fn step_stochastic(&mut self) -> Result<Demography, DemographyError> {
        self.community.step_stochastic(&mut self.rng)
    }

    /// Step until the community age reaches `horizon`. Returns the
    /// number of steps taken.
    ///
    /// The last step may overshoot `horizon`: each step is one adaptive
    /// solver step followed by a demographic census.
    pub fn run_until(&mut self, horizon: f64) -> Result<u64, StepError> {
        let mut steps = 0;
        while self.community.age() < horizon {
            self.step()?;
            steps += 1;
        }
        tracing::debug!(age = self.community.age(), steps, "reached horizon");
        Ok(steps)
    }

    /// Redistribute seeds across patches using the owned generator.
    pub fn add_seeds(&mut self, seeds: &[u64]) -> Result<u64, DemographyError> {
        self.community.add_seeds(seeds, &mut self.rng)
    }

    /// Inject seedlings from a species-by-patch matrix.
    pub fn add_seedlings(&mut self, seedlings: &CountMatrix) -> Result<(), DemographyError> {
        self.community.add_seedlings(seedlings)
    }

    /// Clear the community and reseed the generator.
    pub fn reset(&mut self, seed: u64) {
        self.community.clear();
        self.rng = SimRng::seed_from_u64(seed);
        self.seed = seed;
        self.last_metrics = StepMetrics::default();
    }

    /// The simulated community.
    pub fn community(&self) -> &Metacommunity {
        &self.community
    }

    /// The simulated community, mutably.
    pub fn community_mut(&mut self) -> &mut Metacommunity {
        &mut self.community
    }

    /// Community age.
    pub fn age(&self) -> f64 {
        self.community.age()
    }

    /// The seed the generator was last seeded with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Metrics from the most recent successful [`step`](Self::step).
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// Hash of the current community state.
    pub fn state_hash(&self) -> u64 {
        state_hash(&self.community)
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("age", &self.community.age())
            .field("patches", &self.community.size())
            .field("individuals", &self.community.total_individuals())
            .field("seed", &self.seed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use sylva_core::GrowthModel;
    use sylva_test_utils::LinearGrowth;

    fn parameters(model: LinearGrowth) -> Parameters {
        let species: Vec<Arc<dyn GrowthModel>> = vec![Arc::new(model)];
        Parameters::new(3, species)
    }

    #[test]
    fn new_rejects_invalid_parameters() {
        let mut p = parameters(LinearGrowth::new(1.0));
        p.light_extinction = f64::NAN;
        assert!(matches!(
            Simulation::new(p, 1),
            Err(ConfigError::InvalidLightExtinction { .. })
        ));
    }

    #[test]
    fn step_records_metrics() {
        let mut sim = Simulation::new(parameters(LinearGrowth::new(1.0).with_seeds(1)), 7).unwrap();
        sim.add_seedlings(&CountMatrix::from_rows(&[vec![1, 1, 1]]).unwrap())
            .unwrap();
        let m = sim.step().unwrap().clone();
        assert_eq!(m.elapsed, sim.age());
        assert_eq!(m.accepted_steps, 1);
        assert_eq!(m.rhs_evaluations, 6);
        assert_eq!(m.seeds_produced, 3);
        assert_eq!(m.individuals, 6);
        assert_eq!(sim.last_metrics(), &m);
    }

    #[test]
    fn run_until_reaches_horizon() {
        let mut sim = Simulation::new(parameters(LinearGrowth::new(1.0)), 7).unwrap();
        let steps = sim.run_until(1.0).unwrap();
        assert!(steps > 0);
        assert!(sim.age() >= 1.0);
    }

    #[test]
    fn same_seed_same_trajectory() {
        let run = |seed| {
            let model = LinearGrowth::new(0.5).with_seeds(2).with_mortality(0.3);
            let mut sim = Simulation::new(parameters(model), seed).unwrap();
            sim.add_seedlings(&CountMatrix::from_rows(&[vec![2, 2, 2]]).unwrap())
                .unwrap();
            for _ in 0..10 {
                sim.step().unwrap();
            }
            sim.state_hash()
        };
        assert_eq!(run(11), run(11));
        assert_ne!(run(11), run(12));
    }

    #[test]
    fn reset_reseeds_and_clears() {
        let mut sim = Simulation::new(parameters(LinearGrowth::new(1.0)), 1).unwrap();
        sim.add_seeds(&[50]).unwrap();
        sim.step().unwrap();
        sim.reset(2);
        assert_eq!(sim.seed(), 2);
        assert_eq!(sim.age(), 0.0);
        assert_eq!(sim.community().total_individuals(), 0);
        assert_eq!(sim.last_metrics(), &StepMetrics::default());
    }
}
