//! Sylva Quickstart: a small light-competition metacommunity.
//!
//! Demonstrates:
//!   1. Building species with the light-limited reference model
//!   2. Configuring Parameters (patches, disturbance, solver)
//!   3. Seeding a Simulation and injecting seedlings
//!   4. Stepping, reading metrics and counts, and resetting
//!
//! Run with:
//!   RUST_LOG=sylva_engine=debug cargo run --example quickstart

use std::error::Error;
use std::sync::Arc;

use sylva_core::{CountMatrix, GrowthModel};
use sylva_engine::{ParameterKey, Parameters, Simulation};
use sylva_models::LightLimited;
use tracing_subscriber::EnvFilter;

const N_PATCHES: usize = 10;
const HORIZON: f64 = 50.0;
const SEED: u64 = 42;

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // ─── Species ────────────────────────────────────────────────
    let pioneer = LightLimited::builder()
        .name("pioneer")
        .growth_rate(2.0)
        .mortality(0.05, 0.5)
        .maturation_height(3.0)
        .build()?;
    let climax = LightLimited::builder()
        .name("climax")
        .growth_rate(0.6)
        .max_height(30.0)
        .mortality(0.01, 0.05)
        .build()?;
    let species: Vec<Arc<dyn GrowthModel>> = vec![Arc::new(pioneer), Arc::new(climax)];

    // ─── Parameters ─────────────────────────────────────────────
    let mut parameters = Parameters::new(N_PATCHES, species);
    parameters.set(ParameterKey::DisturbanceMeanInterval, 20.0)?;
    parameters.set_by_name("max_step", 1.0)?;
    println!("{parameters:?}");

    // ─── Simulation ─────────────────────────────────────────────
    let mut sim = Simulation::new(parameters, SEED)?;
    let initial = CountMatrix::from_rows(&[vec![5; N_PATCHES], vec![5; N_PATCHES]])?;
    sim.add_seedlings(&initial)?;

    let mut next_report = 0.0;
    while sim.age() < HORIZON {
        let metrics = sim.step()?.clone();
        if sim.age() >= next_report {
            let counts = sim.community().n_individuals();
            println!(
                "t={:7.3}  pioneer={:5}  climax={:5}  disturbed={}  solver={}/{} ({} us)",
                sim.age(),
                counts.row_sums()[0],
                counts.row_sums()[1],
                metrics.disturbances,
                metrics.accepted_steps,
                metrics.rejected_steps,
                metrics.total_us,
            );
            next_report += 5.0;
        }
    }
    println!("state hash: {:#018x}", sim.state_hash());

    // ─── Reset ──────────────────────────────────────────────────
    sim.reset(SEED + 1);
    println!(
        "after reset: age={} individuals={}",
        sim.age(),
        sim.community().total_individuals()
    );
    Ok(())
}
