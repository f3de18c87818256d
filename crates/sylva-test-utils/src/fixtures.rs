//! Reusable growth-model fixtures.
//!
//! [`LinearGrowth`] grows every individual at a constant rate and makes
//! each demographic answer a fixed, configurable constant, so engine
//! tests can predict heights, deaths and seed output exactly.

use sylva_core::{
    split_state, split_state_mut, Environment, GrowthModel, Individual, OdeSystem,
};

/// A species whose individuals grow at constant rate `rate`.
///
/// Defaults: germination height 1, leaf area 1, never dies, releases no
/// seeds, every seed establishes.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearGrowth {
    pub name: String,
    pub rate: f64,
    pub germination_height: f64,
    pub leaf_area: f64,
    pub mortality: f64,
    pub seeds: u32,
    pub establishment: f64,
}

impl LinearGrowth {
    pub fn new(rate: f64) -> Self {
        Self {
            name: "linear".to_string(),
            rate,
            germination_height: 1.0,
            leaf_area: 1.0,
            mortality: 0.0,
            seeds: 0,
            establishment: 1.0,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_germination_height(mut self, height: f64) -> Self {
        self.germination_height = height;
        self
    }

    pub fn with_leaf_area(mut self, leaf_area: f64) -> Self {
        self.leaf_area = leaf_area;
        self
    }

    /// Per-step death probability of every individual.
    pub fn with_mortality(mut self, probability: f64) -> Self {
        self.mortality = probability;
        self
    }

    /// Seeds released by every individual at each birth census.
    pub fn with_seeds(mut self, seeds: u32) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn with_establishment(mut self, probability: f64) -> Self {
        self.establishment = probability;
        self
    }

    /// An individual of this species at an arbitrary height.
    pub fn plant_at(&self, height: f64) -> LinearPlant {
        LinearPlant {
            height,
            rate: self.rate,
            leaf_area: self.leaf_area,
            mortality: self.mortality,
            seeds: self.seeds,
            openness: 1.0,
            vars_computed: 0,
        }
    }
}

impl GrowthModel for LinearGrowth {
    fn name(&self) -> &str {
        &self.name
    }

    fn germination_height(&self) -> f64 {
        self.germination_height
    }

    fn germinate(&self) -> Box<dyn Individual> {
        Box::new(self.plant_at(self.germination_height))
    }

    fn establishment_probability(&self, _environment: &Environment) -> f64 {
        self.establishment
    }
}

/// One individual of a [`LinearGrowth`] species. State: `[height]`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearPlant {
    pub height: f64,
    pub rate: f64,
    pub leaf_area: f64,
    pub mortality: f64,
    pub seeds: u32,
    /// Canopy openness at this plant's height, as of the last
    /// `compute_vars_phys`.
    pub openness: f64,
    /// Number of `compute_vars_phys` calls received.
    pub vars_computed: u32,
}

impl OdeSystem for LinearPlant {
    fn ode_size(&self) -> usize {
        1
    }

    fn ode_values_set<'a>(&mut self, values: &'a [f64]) -> &'a [f64] {
        let (head, tail) = split_state(values, 1);
        self.height = head[0];
        tail
    }

    fn ode_values<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64] {
        let (head, tail) = split_state_mut(out, 1);
        head[0] = self.height;
        tail
    }

    fn ode_rates<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64] {
        let (head, tail) = split_state_mut(out, 1);
        head[0] = self.rate;
        tail
    }
}

impl Individual for LinearPlant {
    fn height(&self) -> f64 {
        self.height
    }

    fn leaf_area(&self) -> f64 {
        self.leaf_area
    }

    fn compute_vars_phys(&mut self, environment: &Environment) {
        self.openness = environment.canopy_openness(self.height);
        self.vars_computed += 1;
    }

    fn mortality_probability(&self) -> f64 {
        self.mortality
    }

    fn offspring(&mut self) -> u32 {
        self.seeds
    }

    fn clone_box(&self) -> Box<dyn Individual> {
        Box::new(self.clone())
    }
}
