//! Benchmark profiles for the Sylva metacommunity simulator.
//!
//! Provides pre-built [`Parameters`] profiles for benchmarking:
//!
//! - [`reference_profile`]: 50 patches, two light-limited species
//! - [`stress_profile`]: 500 patches, four light-limited species
//! - [`seeded_simulation`]: a profile with seedlings already injected

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use sylva_core::{CountMatrix, GrowthModel};
use sylva_engine::{Parameters, Simulation};
use sylva_models::LightLimited;

/// Growth rates of the species in [`stress_profile`], fastest first.
const STRESS_GROWTH_RATES: [f64; 4] = [2.0, 1.2, 0.8, 0.4];

fn species(growth_rates: &[f64]) -> Vec<Arc<dyn GrowthModel>> {
    growth_rates
        .iter()
        .enumerate()
        .map(|(i, &rate)| {
            let model = LightLimited::builder()
                .name(format!("species-{i}"))
                .growth_rate(rate)
                .build()
                .expect("benchmark traits are valid");
            Arc::new(model) as Arc<dyn GrowthModel>
        })
        .collect()
}

/// Reference profile: 50 patches, a fast and a slow species.
///
/// Disturbance every 30 time units on average, `max_step = 0.5`.
pub fn reference_profile() -> Parameters {
    let mut parameters = Parameters::new(50, species(&[2.0, 0.5]));
    parameters.solver.max_step = 0.5;
    parameters
}

/// Stress profile: 500 patches and four species.
///
/// Same regime as [`reference_profile`] at 10x the patch count.
pub fn stress_profile() -> Parameters {
    let mut parameters = Parameters::new(500, species(&STRESS_GROWTH_RATES));
    parameters.solver.max_step = 0.5;
    parameters
}

/// Build a simulation from `parameters` with `per_patch` seedlings of
/// every species in every patch.
pub fn seeded_simulation(parameters: Parameters, per_patch: u32, seed: u64) -> Simulation {
    let rows = vec![vec![per_patch; parameters.n_patches]; parameters.n_species()];
    let mut sim = Simulation::new(parameters, seed).expect("benchmark profile is valid");
    let seedlings = CountMatrix::from_rows(&rows).expect("rows are rectangular");
    sim.add_seedlings(&seedlings)
        .expect("seedling matrix matches the profile");
    sim
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_validate() {
        assert!(reference_profile().validate().is_ok());
        assert!(stress_profile().validate().is_ok());
    }

    #[test]
    fn seeded_simulation_populates_every_patch() {
        let sim = seeded_simulation(reference_profile(), 2, 1);
        let counts = sim.community().n_individuals();
        assert_eq!(counts.shape(), (2, 50));
        assert_eq!(counts.total(), 200);
    }
}
