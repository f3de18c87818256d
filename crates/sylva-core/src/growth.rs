//! Growth-model capability: the seam between the population engine and
//! individual physiology.
//!
//! A [`GrowthModel`] describes one species. It creates seedlings
//! ([`Individual`]s) at the species' germination height and decides
//! what fraction of arriving seeds establish. Each individual carries
//! its own continuous state through the [`OdeSystem`] protocol and
//! answers the demographic questions a patch asks once per step:
//! how likely it is to die, and how many seeds it releases.
//!
//! Patches and metacommunities only ever see `dyn GrowthModel` and
//! `Box<dyn Individual>`, so any physiology satisfying these traits is
//! pluggable without touching the engine or the solver.

use std::fmt;

use crate::environment::Environment;
use crate::traits::OdeSystem;

/// One living individual (or deterministic cohort member).
///
/// The first state slot is conventionally height; further slots are
/// model-defined (for example accumulated mortality and fecundity).
pub trait Individual: OdeSystem + fmt::Debug + Send {
    /// Current height.
    fn height(&self) -> f64;

    /// Leaf area contributed to the patch canopy.
    fn leaf_area(&self) -> f64;

    /// Recompute derived physiological quantities (and therefore the
    /// values later emitted by `ode_rates`) from the current state and
    /// the patch environment.
    fn compute_vars_phys(&mut self, environment: &Environment);

    /// Probability of dying at this demographic update, in `[0, 1]`.
    fn mortality_probability(&self) -> f64;

    /// Called on individuals that survived the mortality roll.
    ///
    /// Models that accumulate a mortality integral reset it here.
    fn survived(&mut self) {}

    /// Number of seeds released now. Models that accumulate fecundity
    /// subtract what they release.
    fn offspring(&mut self) -> u32;

    /// Clone into a new box.
    fn clone_box(&self) -> Box<dyn Individual>;
}

impl Clone for Box<dyn Individual> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A species: the factory for its individuals.
pub trait GrowthModel: fmt::Debug + Send + Sync {
    /// Human-readable species name.
    fn name(&self) -> &str;

    /// Height at which seedlings enter the population.
    fn germination_height(&self) -> f64;

    /// Create a new seedling at [`germination_height`](Self::germination_height).
    fn germinate(&self) -> Box<dyn Individual>;

    /// Probability that an arriving seed establishes as a seedling.
    ///
    /// Defaults to 1: every seed becomes a seedling.
    fn establishment_probability(&self, _environment: &Environment) -> f64 {
        1.0
    }
}
