//! A single patch: per-species cohorts sharing one light environment.
//!
//! Individuals are stored per species in insertion order (oldest
//! first). The state vector of a patch is the concatenation of its
//! species in index order, and within a species its individuals in
//! insertion order. Every time state is unpacked the patch rebuilds its
//! canopy and lets each individual recompute its rates against it.

use std::sync::Arc;

use rand::Rng;
use sylva_core::{DemographyError, Environment, Individual, OdeSystem, OdeTarget, SpeciesId};

use crate::config::Parameters;
use crate::dispersal::binomial;
use crate::disturbance::DisturbanceRegime;

/// Result of one mortality census on a patch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Mortality {
    /// Individuals removed, including those cleared by disturbance.
    pub deaths: u64,
    /// Whether the patch was disturbed.
    pub disturbed: bool,
}

/// One patch of the metacommunity.
#[derive(Clone, Debug)]
pub struct Patch {
    parameters: Arc<Parameters>,
    regime: DisturbanceRegime,
    age: f64,
    next_disturbance: Option<f64>,
    species: Vec<Vec<Box<dyn Individual>>>,
    environment: Environment,
}

impl Patch {
    /// An empty, freshly disturbed patch.
    pub fn new(parameters: Arc<Parameters>) -> Self {
        let n_species = parameters.n_species();
        Self {
            regime: DisturbanceRegime::new(&parameters.disturbance),
            environment: Environment::new(parameters.light_extinction),
            species: (0..n_species).map(|_| Vec::new()).collect(),
            age: 0.0,
            next_disturbance: None,
            parameters,
        }
    }

    /// Shared parameters.
    pub fn parameters(&self) -> &Arc<Parameters> {
        &self.parameters
    }

    /// Time since the patch was last disturbed.
    pub fn age(&self) -> f64 {
        self.age
    }

    /// Number of species slots.
    pub fn n_species(&self) -> usize {
        self.species.len()
    }

    /// Current light environment.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Advance patch age by `dt` of integrated time.
    pub fn advance_age(&mut self, dt: f64) {
        self.age += dt;
        self.environment.patch_age = self.age;
    }

    /// Live individuals per species.
    pub fn n_individuals(&self) -> Vec<u32> {
        self.species
            .iter()
            .map(|cohort| u32::try_from(cohort.len()).expect("cohort size checked on insertion"))
            .collect()
    }

    /// Live individuals over all species.
    pub fn total_individuals(&self) -> usize {
        self.species.iter().map(Vec::len).sum()
    }

    /// The cohort of one species, oldest first.
    pub fn species(&self, id: SpeciesId) -> Result<&[Box<dyn Individual>], DemographyError> {
        self.species
            .get(id.0 as usize)
            .map(Vec::as_slice)
            .ok_or(DemographyError::SpeciesOutOfRange {
                species: id,
                n_species: self.species.len(),
            })
    }

    /// Patch age at which the next disturbance fires, if already drawn.
    pub fn disturbance_at(&self) -> Option<f64> {
        self.next_disturbance
    }

    /// Force the next disturbance to fire once the patch reaches `age`.
    pub fn schedule_disturbance(&mut self, age: f64) {
        self.next_disturbance = Some(age);
    }

    /// Whether the patch has reached its scheduled disturbance.
    pub fn is_disturbed(&self) -> bool {
        self.next_disturbance.is_some_and(|at| self.age >= at)
    }

    /// Mortality census.
    ///
    /// If the patch has reached its disturbance age every individual is
    /// removed, age resets to 0 and a new disturbance age is drawn.
    /// Otherwise each individual dies with its own mortality probability;
    /// survivors keep their relative order.
    pub fn deaths<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Mortality {
        if self.next_disturbance.is_none() {
            self.next_disturbance = Some(self.regime.draw_interval(rng));
        }

        if self.is_disturbed() {
            let cleared = self.total_individuals() as u64;
            tracing::debug!(age = self.age, cleared, "patch disturbed");
            for cohort in &mut self.species {
                cohort.clear();
            }
            self.age = 0.0;
            self.next_disturbance = Some(self.regime.draw_interval(rng));
            self.compute_vars_phys();
            return Mortality {
                deaths: cleared,
                disturbed: true,
            };
        }

        let mut deaths = 0u64;
        for cohort in &mut self.species {
            cohort.retain_mut(|individual| {
                let dies = rng.random::<f64>() < individual.mortality_probability();
                if dies {
                    deaths += 1;
                } else {
                    individual.survived();
                }
                !dies
            });
        }
        self.compute_vars_phys();
        Mortality {
            deaths,
            disturbed: false,
        }
    }

    /// Seeds released by this patch, per species.
    pub fn births(&mut self) -> Vec<u64> {
        self.species
            .iter_mut()
            .map(|cohort| {
                cohort
                    .iter_mut()
                    .map(|individual| u64::from(individual.offspring()))
                    .sum()
            })
            .collect()
    }

    /// Turn arriving seeds into seedlings.
    ///
    /// Each seed establishes independently with its species'
    /// establishment probability in the current environment. Returns the
    /// number of seedlings added.
    ///
    /// # Errors
    ///
    /// [`DemographyError::LengthMismatch`] unless there is one count per
    /// species, [`DemographyError::CountOverflow`] if establishing every
    /// seed could push a species past `u32::MAX` individuals. Nothing is
    /// mutated in either case.
    pub fn add_seeds<R: Rng + ?Sized>(
        &mut self,
        seeds: &[u64],
        rng: &mut R,
    ) -> Result<u64, DemographyError> {
        self.check_capacity(seeds)?;
        let mut established = Vec::with_capacity(seeds.len());
        for (model, &n) in self.parameters.species.iter().zip(seeds) {
            let p = model.establishment_probability(&self.environment);
            established.push(binomial(n, p, rng));
        }
        self.push_seedlings(&established);
        Ok(established.iter().sum())
    }

    /// Add seedlings directly, bypassing establishment.
    ///
    /// # Errors
    ///
    /// As [`add_seeds`](Self::add_seeds).
    pub fn add_seedlings(&mut self, counts: &[u32]) -> Result<(), DemographyError> {
        let counts: Vec<u64> = counts.iter().map(|&n| u64::from(n)).collect();
        self.check_capacity(&counts)?;
        self.push_seedlings(&counts);
        Ok(())
    }

    /// Remove every individual and reset age to 0.
    pub fn clear(&mut self) {
        for cohort in &mut self.species {
            cohort.clear();
        }
        self.age = 0.0;
        self.next_disturbance = None;
        self.compute_vars_phys();
    }

    /// Rebuild the canopy and recompute every individual's rates.
    pub fn compute_vars_phys(&mut self) {
        let environment = &mut self.environment;
        environment.patch_age = self.age;
        environment.canopy.rebuild(
            self.species
                .iter()
                .flatten()
                .map(|individual| (individual.height(), individual.leaf_area())),
        );
        for individual in self.species.iter_mut().flatten() {
            individual.compute_vars_phys(environment);
        }
    }

    /// Check that `counts` has one entry per species and that adding
    /// them keeps every cohort within `u32::MAX` individuals.
    pub(crate) fn check_capacity(&self, counts: &[u64]) -> Result<(), DemographyError> {
        if counts.len() != self.species.len() {
            return Err(DemographyError::LengthMismatch {
                expected: self.species.len(),
                actual: counts.len(),
            });
        }
        for (index, (cohort, &n)) in self.species.iter().zip(counts).enumerate() {
            let count = (cohort.len() as u64).saturating_add(n);
            if count > u64::from(u32::MAX) {
                return Err(DemographyError::CountOverflow {
                    species: SpeciesId(index as u32),
                    count,
                });
            }
        }
        Ok(())
    }

    fn push_seedlings(&mut self, counts: &[u64]) {
        if counts.iter().all(|&n| n == 0) {
            return;
        }
        for ((cohort, model), &n) in self
            .species
            .iter_mut()
            .zip(&self.parameters.species)
            .zip(counts)
        {
            cohort.extend((0..n).map(|_| model.germinate()));
        }
        self.compute_vars_phys();
    }
}

impl OdeSystem for Patch {
    fn ode_size(&self) -> usize {
        self.species.ode_size()
    }

    fn ode_values_set<'a>(&mut self, values: &'a [f64]) -> &'a [f64] {
        let rest = self.species.ode_values_set(values);
        self.compute_vars_phys();
        rest
    }

    fn ode_values<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64] {
        self.species.ode_values(out)
    }

    fn ode_rates<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64] {
        self.species.ode_rates(out)
    }
}

impl OdeTarget for Patch {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sylva_test_utils::LinearGrowth;

    fn patch_with(models: Vec<LinearGrowth>) -> Patch {
        let species = models
            .into_iter()
            .map(|m| Arc::new(m) as Arc<dyn sylva_core::GrowthModel>)
            .collect();
        let mut parameters = Parameters::new(1, species);
        parameters.disturbance.mean_interval = f64::INFINITY;
        Patch::new(Arc::new(parameters))
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn new_patch_is_empty_and_young() {
        let patch = patch_with(vec![LinearGrowth::new(1.0), LinearGrowth::new(2.0)]);
        assert_eq!(patch.n_individuals(), vec![0, 0]);
        assert_eq!(patch.age(), 0.0);
        assert_eq!(patch.ode_size(), 0);
        assert_eq!(patch.disturbance_at(), None);
    }

    #[test]
    fn seedlings_start_at_germination_height() {
        let mut patch = patch_with(vec![
            LinearGrowth::new(1.0).with_germination_height(0.2),
            LinearGrowth::new(1.0).with_germination_height(0.7),
        ]);
        patch.add_seedlings(&[2, 1]).unwrap();
        assert_eq!(patch.n_individuals(), vec![2, 1]);
        assert_eq!(patch.ode_state(), vec![0.2, 0.2, 0.7]);
    }

    #[test]
    fn wrong_length_is_rejected_before_mutation() {
        let mut patch = patch_with(vec![LinearGrowth::new(1.0)]);
        assert_eq!(
            patch.add_seedlings(&[1, 1]),
            Err(DemographyError::LengthMismatch {
                expected: 1,
                actual: 2
            })
        );
        assert!(patch.add_seeds(&[], &mut rng()).is_err());
        assert_eq!(patch.total_individuals(), 0);
    }

    #[test]
    fn species_lookup_is_bounds_checked() {
        let patch = patch_with(vec![LinearGrowth::new(1.0)]);
        assert!(patch.species(SpeciesId(0)).unwrap().is_empty());
        assert_eq!(
            patch.species(SpeciesId(3)).unwrap_err(),
            DemographyError::SpeciesOutOfRange {
                species: SpeciesId(3),
                n_species: 1
            }
        );
    }

    #[test]
    fn values_set_recomputes_canopy() {
        let mut patch = patch_with(vec![LinearGrowth::new(1.0).with_leaf_area(2.0)]);
        patch.add_seedlings(&[2]).unwrap();
        patch.ode_values_set(&[5.0, 1.0]);
        assert_eq!(patch.environment().canopy.total_leaf_area(), 4.0);
        assert_eq!(patch.environment().canopy.leaf_area_above(1.0), 2.0);
    }

    #[test]
    fn immortal_individuals_never_die() {
        let mut patch = patch_with(vec![LinearGrowth::new(1.0)]);
        patch.add_seedlings(&[5]).unwrap();
        let m = patch.deaths(&mut rng());
        assert_eq!(m, Mortality::default());
        assert_eq!(patch.n_individuals(), vec![5]);
    }

    #[test]
    fn certain_death_empties_the_patch() {
        let mut patch = patch_with(vec![LinearGrowth::new(1.0).with_mortality(1.0)]);
        patch.add_seedlings(&[4]).unwrap();
        let m = patch.deaths(&mut rng());
        assert_eq!(m.deaths, 4);
        assert!(!m.disturbed);
        assert_eq!(patch.total_individuals(), 0);
    }

    #[test]
    fn deaths_keep_survivor_order() {
        let mut patch = patch_with(vec![LinearGrowth::new(1.0).with_mortality(0.5)]);
        patch.add_seedlings(&[40]).unwrap();
        let heights: Vec<f64> = (0..40).map(f64::from).collect();
        patch.ode_values_set(&heights);
        patch.deaths(&mut rng());
        let survivors = patch.ode_state();
        assert!(survivors.len() < 40);
        assert!(survivors.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn scheduled_disturbance_clears_and_resets_age() {
        let mut patch = patch_with(vec![LinearGrowth::new(1.0)]);
        patch.add_seedlings(&[3]).unwrap();
        patch.advance_age(5.0);
        patch.schedule_disturbance(4.9);
        assert!(patch.is_disturbed());

        let m = patch.deaths(&mut rng());
        assert_eq!(
            m,
            Mortality {
                deaths: 3,
                disturbed: true
            }
        );
        assert_eq!(patch.age(), 0.0);
        assert_eq!(patch.total_individuals(), 0);
        // Disturbance disabled: next one never fires.
        assert_eq!(patch.disturbance_at(), Some(f64::INFINITY));
    }

    #[test]
    fn births_sum_offspring_per_species() {
        let mut patch = patch_with(vec![
            LinearGrowth::new(1.0).with_seeds(3),
            LinearGrowth::new(1.0),
        ]);
        patch.add_seedlings(&[2, 5]).unwrap();
        assert_eq!(patch.births(), vec![6, 0]);
    }

    #[test]
    fn births_beyond_u32_are_not_clamped() {
        let mut patch = patch_with(vec![LinearGrowth::new(1.0).with_seeds(u32::MAX)]);
        patch.add_seedlings(&[2]).unwrap();
        assert_eq!(patch.births(), vec![2 * u64::from(u32::MAX)]);
    }

    #[test]
    fn oversized_seed_rain_is_rejected_before_mutation() {
        let mut patch = patch_with(vec![LinearGrowth::new(1.0), LinearGrowth::new(1.0)]);
        patch.add_seedlings(&[0, 3]).unwrap();
        let too_many = u64::from(u32::MAX) - 2;
        assert_eq!(
            patch.add_seeds(&[0, too_many], &mut rng()),
            Err(DemographyError::CountOverflow {
                species: SpeciesId(1),
                count: u64::from(u32::MAX) + 1,
            })
        );
        assert_eq!(patch.n_individuals(), vec![0, 3]);
    }

    #[test]
    fn establishment_thins_arriving_seeds() {
        let mut patch = patch_with(vec![
            LinearGrowth::new(1.0),
            LinearGrowth::new(1.0).with_establishment(0.0),
        ]);
        let added = patch.add_seeds(&[7, 9], &mut rng()).unwrap();
        assert_eq!(added, 7);
        assert_eq!(patch.n_individuals(), vec![7, 0]);
    }

    #[test]
    fn clear_resets_everything() {
        let mut patch = patch_with(vec![LinearGrowth::new(1.0)]);
        patch.add_seedlings(&[3]).unwrap();
        patch.advance_age(2.0);
        patch.schedule_disturbance(10.0);
        patch.clear();
        assert_eq!(patch.age(), 0.0);
        assert_eq!(patch.total_individuals(), 0);
        assert_eq!(patch.disturbance_at(), None);
        assert!(patch.environment().canopy.is_empty());
    }
}
