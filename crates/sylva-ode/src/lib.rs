//! Adaptive ODE solver for Sylva state vectors.
//!
//! A single [`Solver`] advances any [`OdeTarget`](sylva_core::OdeTarget)
//! using the Cash–Karp embedded Runge–Kutta 4(5) pair. The embedded
//! error estimate drives a [`StandardControl`] that rejects steps whose
//! scaled local error exceeds tolerance and grows or shrinks the step
//! size within bounded factors.
//!
//! The solver does not own its target. Each stepping call borrows the
//! target mutably for its duration, so a metacommunity can own both the
//! solver and the patches it integrates.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod control;
pub mod solver;
pub mod stepper;

pub use config::SolverConfig;
pub use control::{Adjustment, StandardControl};
pub use solver::{Solver, SolverStats, StepOutcome};
pub use stepper::CashKarp;
