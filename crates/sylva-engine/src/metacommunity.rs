//! A fixed set of patches integrated as one ODE system.
//!
//! # Step anatomy
//!
//! [`Metacommunity::step`] runs exactly one deterministic step followed
//! by one stochastic step:
//!
//! 1. **Deterministic.** Pack every patch's state (patches in index
//!    order), load it into the shared adaptive solver, take one adaptive
//!    step, unpack the result back into the patches, and advance both
//!    the global age and every patch age by the elapsed time. The
//!    elapsed time is whatever the solver accepted, which may be less
//!    than its previous step size if it had to subdivide.
//! 2. **Stochastic.** Run the mortality census (including disturbance)
//!    in every patch, and only then collect seed production from the
//!    survivors. Pool seeds per species across patches and redistribute
//!    them with [`allocate_seeds`], visiting patches in index order.
//!
//! Whenever the number of individuals changes, the solver's step-size
//! history is reset: it was adapted to a state vector that no longer
//! exists.

use std::sync::Arc;

use rand::Rng;
use sylva_core::{
    CountMatrix, DemographyError, OdeError, OdeSystem, OdeTarget, PatchId, StepError,
};
use sylva_ode::{Solver, SolverStats};

use crate::config::{ConfigError, Parameters};
use crate::dispersal::allocate_seeds;
use crate::patch::{Mortality, Patch};

/// Outcome of one stochastic step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Demography {
    /// Individuals removed by mortality or disturbance.
    pub deaths: u64,
    /// Patches disturbed.
    pub disturbances: u32,
    /// Seeds produced across all patches and species.
    pub seeds_produced: u64,
    /// Seeds that became seedlings.
    pub seedlings_established: u64,
}

/// Patches sharing one seed pool and one solver.
#[derive(Clone, Debug)]
pub struct Metacommunity {
    parameters: Arc<Parameters>,
    patches: Vec<Patch>,
    age: f64,
    solver: Solver,
}

impl Metacommunity {
    /// Validate `parameters` and create `n_patches` empty patches.
    pub fn new(parameters: Parameters) -> Result<Self, ConfigError> {
        parameters.validate()?;
        let solver = Solver::new(parameters.solver.clone());
        let parameters = Arc::new(parameters);
        let patches = (0..parameters.n_patches)
            .map(|_| Patch::new(Arc::clone(&parameters)))
            .collect();
        Ok(Self {
            parameters,
            patches,
            age: 0.0,
            solver,
        })
    }

    /// Shared parameters.
    pub fn parameters(&self) -> &Arc<Parameters> {
        &self.parameters
    }

    /// Number of patches.
    pub fn size(&self) -> usize {
        self.patches.len()
    }

    /// Number of species.
    pub fn n_species(&self) -> usize {
        self.parameters.n_species()
    }

    /// Time since the simulation started (or was last cleared).
    pub fn age(&self) -> f64 {
        self.age
    }

    /// All patches, in index order.
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// One patch.
    pub fn patch(&self, id: PatchId) -> Result<&Patch, DemographyError> {
        let n_patches = self.patches.len();
        self.patches
            .get(id.0 as usize)
            .ok_or(DemographyError::PatchOutOfRange {
                patch: id,
                n_patches,
            })
    }

    /// One patch, mutably.
    ///
    /// Changes made through this handle that alter the population should
    /// be followed by [`reset_solver`](Self::reset_solver).
    pub fn patch_mut(&mut self, id: PatchId) -> Result<&mut Patch, DemographyError> {
        let n_patches = self.patches.len();
        self.patches
            .get_mut(id.0 as usize)
            .ok_or(DemographyError::PatchOutOfRange {
                patch: id,
                n_patches,
            })
    }

    /// The shared solver.
    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    /// Lifetime solver counters.
    pub fn solver_stats(&self) -> SolverStats {
        self.solver.stats()
    }

    /// Discard the solver's step-size history.
    pub fn reset_solver(&mut self) {
        self.solver.reset();
    }

    /// Live individuals over all patches and species.
    pub fn total_individuals(&self) -> usize {
        self.patches.iter().map(Patch::total_individuals).sum()
    }

    /// One deterministic step followed by one stochastic step.
    ///
    /// # Errors
    ///
    /// [`StepError::Integration`] if the solver fails; the stochastic
    /// step is then not run. [`StepError::Demography`] if seed rain
    /// cannot be placed.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Demography, StepError> {
        self.step_deterministic()?;
        Ok(self.step_stochastic(rng)?)
    }

    /// Integrate growth by one adaptive solver step. Returns the elapsed
    /// time.
    ///
    /// # Errors
    ///
    /// Any [`OdeError`] from the solver. Step-size underflow is fatal for
    /// the run and is not retried here. On failure every patch is
    /// restored to the state it held before the call.
    pub fn step_deterministic(&mut self) -> Result<f64, OdeError> {
        let state = self.patches.ode_state();
        self.solver.set_state(&self.patches, &state, self.age)?;
        let elapsed = match self.solver.step(&mut self.patches) {
            Ok(elapsed) => elapsed,
            Err(e) => {
                // Patches still hold the last trial stage.
                self.patches.ode_values_set(&state);
                return Err(e);
            }
        };

        let rest = self.patches.ode_values_set(self.solver.state());
        assert!(rest.is_empty(), "solver state longer than community");
        for patch in &mut self.patches {
            patch.advance_age(elapsed);
        }
        self.age = self.solver.time();
        Ok(elapsed)
    }

    /// Deaths in every patch, then births, then seed redistribution.
    ///
    /// # Errors
    ///
    /// [`DemographyError::CountOverflow`] if the seed rain could push a
    /// species past `u32::MAX` individuals in a patch. Deaths and births
    /// have then happened but no seedling was added.
    pub fn step_stochastic<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Demography, DemographyError> {
        let mortality = self.deaths(rng);
        let seeds = self.births();
        let established = self.distribute_seeds(&seeds, rng)?;
        let demography = Demography {
            deaths: mortality.iter().map(|m| m.deaths).sum(),
            disturbances: mortality.iter().filter(|m| m.disturbed).count() as u32,
            seeds_produced: seeds.iter().sum(),
            seedlings_established: established,
        };
        tracing::debug!(
            age = self.age,
            deaths = demography.deaths,
            disturbances = demography.disturbances,
            seeds = demography.seeds_produced,
            established = demography.seedlings_established,
            "stochastic step"
        );
        Ok(demography)
    }

    /// Mortality census in every patch, in index order.
    pub fn deaths<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<Mortality> {
        let mortality: Vec<Mortality> = self.patches.iter_mut().map(|p| p.deaths(rng)).collect();
        if mortality.iter().any(|m| m.deaths > 0) {
            self.solver.reset();
        }
        mortality
    }

    /// Seeds produced per species, summed over patches.
    pub fn births(&mut self) -> Vec<u64> {
        let mut total = vec![0u64; self.n_species()];
        for patch in &mut self.patches {
            for (sum, n) in total.iter_mut().zip(patch.births()) {
                *sum += n;
            }
        }
        total
    }

    /// Redistribute per-species seed totals across patches and let them
    /// establish. Returns the number of seedlings added.
    ///
    /// # Errors
    ///
    /// [`DemographyError::LengthMismatch`] if `seeds` does not have one
    /// entry per species, [`DemographyError::CountOverflow`] if a patch's
    /// share could overflow a cohort. Nothing is mutated in either case.
    pub fn add_seeds<R: Rng + ?Sized>(
        &mut self,
        seeds: &[u64],
        rng: &mut R,
    ) -> Result<u64, DemographyError> {
        if seeds.len() != self.n_species() {
            return Err(DemographyError::LengthMismatch {
                expected: self.n_species(),
                actual: seeds.len(),
            });
        }
        self.distribute_seeds(seeds, rng)
    }

    fn distribute_seeds<R: Rng + ?Sized>(
        &mut self,
        seeds: &[u64],
        rng: &mut R,
    ) -> Result<u64, DemographyError> {
        let allocation = allocate_seeds(seeds, self.patches.len(), rng);
        for (patch, share) in self.patches.iter().zip(&allocation) {
            patch.check_capacity(share)?;
        }
        let mut established = 0u64;
        for (patch, share) in self.patches.iter_mut().zip(&allocation) {
            established += patch.add_seeds(share, rng)?;
        }
        if established > 0 {
            self.solver.reset();
        }
        Ok(established)
    }

    /// Inject seedlings from a species-by-patch matrix.
    ///
    /// # Errors
    ///
    /// [`DemographyError::ShapeMismatch`] unless the matrix is
    /// `n_species x n_patches`. Nothing is mutated in that case.
    pub fn add_seedlings(&mut self, seedlings: &CountMatrix) -> Result<(), DemographyError> {
        let expected = (self.n_species(), self.size());
        if seedlings.shape() != expected {
            return Err(DemographyError::ShapeMismatch {
                expected,
                actual: seedlings.shape(),
            });
        }
        for (patch, id) in self.patches.iter_mut().zip((0u32..).map(PatchId)) {
            patch.add_seedlings(seedlings.column(id)?)?;
        }
        if seedlings.total() > 0 {
            self.solver.reset();
        }
        Ok(())
    }

    /// Live individuals as a species-by-patch matrix.
    pub fn n_individuals(&self) -> CountMatrix {
        let columns: Vec<Vec<u32>> = self.patches.iter().map(Patch::n_individuals).collect();
        CountMatrix::from_columns(self.n_species(), &columns)
            .expect("every patch has one cohort per species")
    }

    /// Empty every patch, reset age to 0 and forget solver history.
    pub fn clear(&mut self) {
        self.age = 0.0;
        for patch in &mut self.patches {
            patch.clear();
        }
        self.solver.reset();
    }
}

impl OdeSystem for Metacommunity {
    fn ode_size(&self) -> usize {
        self.patches.ode_size()
    }

    fn ode_values_set<'a>(&mut self, values: &'a [f64]) -> &'a [f64] {
        self.patches.ode_values_set(values)
    }

    fn ode_values<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64] {
        self.patches.ode_values(out)
    }

    fn ode_rates<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64] {
        self.patches.ode_rates(out)
    }
}

impl OdeTarget for Metacommunity {}
