//! Integration test: long runs with the light-limited reference model.
//!
//! Two species that differ only in growth rate compete for light in a
//! disturbed metacommunity. Checks structural invariants every step
//! and that shading actually feeds back into the rates.

use std::sync::Arc;

use sylva_core::{CountMatrix, GrowthModel, OdeSystem, PatchId, SpeciesId};
use sylva_engine::{Parameters, Simulation};
use sylva_models::LightLimited;

fn two_species() -> Parameters {
    let fast = LightLimited::builder()
        .name("fast")
        .growth_rate(2.0)
        .build()
        .unwrap();
    let slow = LightLimited::builder()
        .name("slow")
        .growth_rate(0.5)
        .build()
        .unwrap();
    let species: Vec<Arc<dyn GrowthModel>> = vec![Arc::new(fast), Arc::new(slow)];
    let mut p = Parameters::new(4, species);
    p.disturbance.mean_interval = 15.0;
    p.solver.max_step = 0.5;
    p
}

#[test]
fn long_run_keeps_state_vector_consistent() {
    let mut sim = Simulation::new(two_species(), 3).unwrap();
    sim.add_seedlings(&CountMatrix::from_rows(&[vec![3, 3, 3, 3], vec![3, 3, 3, 3]]).unwrap())
        .unwrap();

    let mut last_age = 0.0;
    for _ in 0..300 {
        let metrics = sim.step().unwrap().clone();
        let community = sim.community();
        assert_eq!(community.ode_size(), 3 * community.total_individuals());
        assert_eq!(metrics.individuals, community.total_individuals());
        assert!(community.age() > last_age);
        last_age = community.age();
        for patch in community.patches() {
            assert!(patch.age() >= 0.0 && patch.age() <= community.age());
        }
        assert!(community.ode_state().iter().all(|v| v.is_finite()));
    }
}

#[test]
fn tall_neighbours_shade_seedlings() {
    let mut sim = Simulation::new(two_species(), 8).unwrap();
    sim.community_mut()
        .patch_mut(PatchId(0))
        .unwrap()
        .schedule_disturbance(f64::INFINITY);
    sim.add_seedlings(&CountMatrix::from_rows(&[vec![1, 0, 0, 0], vec![0, 0, 0, 0]]).unwrap())
        .unwrap();
    while sim.age() < 5.0 {
        sim.step_deterministic().unwrap();
    }
    let patch = sim.community().patch(PatchId(0)).unwrap();
    let fast = patch.species(SpeciesId(0)).unwrap();
    assert!(fast[0].height() > 0.2);
    let openness = patch.environment().canopy_openness(0.2);
    assert!(openness < 1.0);
}
