//! Reference growth models for the Sylva metacommunity simulator.
//!
//! Provides [`LightLimited`], a species whose height growth, mortality
//! and fecundity all respond to the light reaching the top of each
//! individual. It is deliberately simple: enough physiology for
//! competition for light to shape community dynamics, with every rate
//! in closed form.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod light_limited;

pub use light_limited::{LightLimited, LightLimitedBuilder, LightLimitedPlant, LightTraits};
