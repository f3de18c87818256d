//! Light-limited growth model.
//!
//! Each individual carries three state variables:
//!
//! | slot | variable              | rate                                      |
//! |------|-----------------------|-------------------------------------------|
//! | 0    | height `h`            | `g * L * (1 - h / h_max)`                 |
//! | 1    | mortality integral `m`| `d0 + d1 * (1 - L)`                       |
//! | 2    | fecundity integral `f`| `r * L * leaf_area` once `h >= h_mat`     |
//!
//! where `L` is canopy openness at the individual's height. At each
//! demographic census an individual dies with probability
//! `1 - exp(-m)`; survivors restart `m` from zero. The whole part of
//! `f` is released as seeds and subtracted.
//!
//! Seeds establish with probability equal to canopy openness at
//! germination height.
//!
//! Constructed via the builder pattern: [`LightLimited::builder`].

use std::sync::Arc;

use sylva_core::{
    split_state, split_state_mut, Environment, GrowthModel, Individual, OdeSystem,
};

/// Trait values shared by every individual of a species.
#[derive(Clone, Debug, PartialEq)]
pub struct LightTraits {
    /// Species name.
    pub name: String,
    /// Height growth rate under full light.
    pub growth_rate: f64,
    /// Asymptotic height.
    pub max_height: f64,
    /// Leaf area per unit height.
    pub leaf_area_per_height: f64,
    /// Background mortality rate.
    pub base_mortality: f64,
    /// Additional mortality rate under full shade.
    pub shade_mortality: f64,
    /// Seed production per unit leaf area under full light.
    pub fecundity_rate: f64,
    /// Height at which reproduction begins.
    pub maturation_height: f64,
    /// Height of new seedlings.
    pub germination_height: f64,
}

/// A light-limited species.
#[derive(Clone, Debug)]
pub struct LightLimited {
    traits: Arc<LightTraits>,
}

/// Builder for [`LightLimited`].
pub struct LightLimitedBuilder {
    traits: LightTraits,
}

impl LightLimited {
    /// Create a new builder with default traits.
    pub fn builder() -> LightLimitedBuilder {
        LightLimitedBuilder {
            traits: LightTraits {
                name: "light_limited".to_string(),
                growth_rate: 1.0,
                max_height: 20.0,
                leaf_area_per_height: 0.5,
                base_mortality: 0.01,
                shade_mortality: 0.2,
                fecundity_rate: 0.5,
                maturation_height: 5.0,
                germination_height: 0.2,
            },
        }
    }

    /// The species' traits.
    pub fn traits(&self) -> &LightTraits {
        &self.traits
    }

    /// An individual of this species at an arbitrary height, with rates
    /// computed under full light.
    pub fn plant_at(&self, height: f64) -> LightLimitedPlant {
        LightLimitedPlant::new(Arc::clone(&self.traits), height)
    }
}

impl LightLimitedBuilder {
    /// Set the species name (default: `light_limited`).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.traits.name = name.into();
        self
    }

    /// Height growth rate under full light (default: 1).
    pub fn growth_rate(mut self, rate: f64) -> Self {
        self.traits.growth_rate = rate;
        self
    }

    /// Asymptotic height (default: 20).
    pub fn max_height(mut self, height: f64) -> Self {
        self.traits.max_height = height;
        self
    }

    /// Leaf area per unit height (default: 0.5).
    pub fn leaf_area_per_height(mut self, ratio: f64) -> Self {
        self.traits.leaf_area_per_height = ratio;
        self
    }

    /// Background and full-shade mortality rates (defaults: 0.01, 0.2).
    pub fn mortality(mut self, base: f64, shade: f64) -> Self {
        self.traits.base_mortality = base;
        self.traits.shade_mortality = shade;
        self
    }

    /// Seed production per unit leaf area under full light (default: 0.5).
    pub fn fecundity_rate(mut self, rate: f64) -> Self {
        self.traits.fecundity_rate = rate;
        self
    }

    /// Height at which reproduction begins (default: 5).
    pub fn maturation_height(mut self, height: f64) -> Self {
        self.traits.maturation_height = height;
        self
    }

    /// Seedling height (default: 0.2).
    pub fn germination_height(mut self, height: f64) -> Self {
        self.traits.germination_height = height;
        self
    }

    /// Build the species, validating all traits.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any rate is negative or not finite, or if the
    /// heights do not satisfy `0 < germination_height < max_height`.
    pub fn build(self) -> Result<LightLimited, String> {
        let t = &self.traits;
        for (name, value) in [
            ("growth_rate", t.growth_rate),
            ("leaf_area_per_height", t.leaf_area_per_height),
            ("base_mortality", t.base_mortality),
            ("shade_mortality", t.shade_mortality),
            ("fecundity_rate", t.fecundity_rate),
            ("maturation_height", t.maturation_height),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be finite and >= 0, got {value}"));
            }
        }
        if !t.max_height.is_finite() || t.max_height <= 0.0 {
            return Err(format!(
                "max_height must be finite and > 0, got {}",
                t.max_height
            ));
        }
        let h0 = t.germination_height;
        if h0.is_nan() || h0 <= 0.0 || h0 >= t.max_height {
            return Err(format!(
                "germination_height must lie in (0, max_height = {}), got {}",
                t.max_height, t.germination_height
            ));
        }
        Ok(LightLimited {
            traits: Arc::new(self.traits),
        })
    }
}

impl GrowthModel for LightLimited {
    fn name(&self) -> &str {
        &self.traits.name
    }

    fn germination_height(&self) -> f64 {
        self.traits.germination_height
    }

    fn germinate(&self) -> Box<dyn Individual> {
        Box::new(self.plant_at(self.traits.germination_height))
    }

    fn establishment_probability(&self, environment: &Environment) -> f64 {
        environment.canopy_openness(self.traits.germination_height)
    }
}

/// One individual of a [`LightLimited`] species.
#[derive(Clone, Debug)]
pub struct LightLimitedPlant {
    traits: Arc<LightTraits>,
    height: f64,
    mortality: f64,
    fecundity: f64,
    openness: f64,
    rates: [f64; 3],
}

impl LightLimitedPlant {
    fn new(traits: Arc<LightTraits>, height: f64) -> Self {
        let mut plant = Self {
            traits,
            height,
            mortality: 0.0,
            fecundity: 0.0,
            openness: 1.0,
            rates: [0.0; 3],
        };
        plant.update_rates();
        plant
    }

    /// Accumulated mortality integral.
    pub fn mortality(&self) -> f64 {
        self.mortality
    }

    /// Accumulated, not yet released, fecundity.
    pub fn fecundity(&self) -> f64 {
        self.fecundity
    }

    /// Canopy openness at this plant's height, as of the last
    /// environment update.
    pub fn openness(&self) -> f64 {
        self.openness
    }

    fn update_rates(&mut self) {
        let t = &self.traits;
        let light = self.openness;
        let growth = t.growth_rate * light * (1.0 - self.height / t.max_height);
        let fecundity = if self.height >= t.maturation_height {
            t.fecundity_rate * light * self.leaf_area()
        } else {
            0.0
        };
        self.rates = [
            growth.max(0.0),
            t.base_mortality + t.shade_mortality * (1.0 - light),
            fecundity,
        ];
    }
}

impl OdeSystem for LightLimitedPlant {
    fn ode_size(&self) -> usize {
        3
    }

    fn ode_values_set<'a>(&mut self, values: &'a [f64]) -> &'a [f64] {
        let (head, tail) = split_state(values, 3);
        self.height = head[0];
        self.mortality = head[1];
        self.fecundity = head[2];
        tail
    }

    fn ode_values<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64] {
        let (head, tail) = split_state_mut(out, 3);
        head.copy_from_slice(&[self.height, self.mortality, self.fecundity]);
        tail
    }

    fn ode_rates<'a>(&self, out: &'a mut [f64]) -> &'a mut [f64] {
        let (head, tail) = split_state_mut(out, 3);
        head.copy_from_slice(&self.rates);
        tail
    }
}

impl Individual for LightLimitedPlant {
    fn height(&self) -> f64 {
        self.height
    }

    fn leaf_area(&self) -> f64 {
        self.traits.leaf_area_per_height * self.height.max(0.0)
    }

    fn compute_vars_phys(&mut self, environment: &Environment) {
        self.openness = environment.canopy_openness(self.height);
        self.update_rates();
    }

    fn mortality_probability(&self) -> f64 {
        (1.0 - (-self.mortality).exp()).clamp(0.0, 1.0)
    }

    fn survived(&mut self) {
        self.mortality = 0.0;
    }

    fn offspring(&mut self) -> u32 {
        if self.fecundity.is_nan() || self.fecundity < 1.0 {
            return 0;
        }
        let whole = self.fecundity.floor().min(f64::from(u32::MAX));
        self.fecundity -= whole;
        whole as u32
    }

    fn clone_box(&self) -> Box<dyn Individual> {
        Box::new(self.clone())
    }
}
