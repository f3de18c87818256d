//! Strongly-typed identifiers for species and patches.

use std::fmt;

/// Identifies a species within a metacommunity.
///
/// `SpeciesId(n)` corresponds to the n-th growth model in the
/// parameter set, and to row `n` of every species-by-patch matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpeciesId(pub u32);

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SpeciesId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a patch within a metacommunity.
///
/// Patches are created at construction and never reordered, so
/// `PatchId(n)` is stable for the lifetime of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatchId(pub u32);

impl fmt::Display for PatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PatchId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_raw_index() {
        assert_eq!(SpeciesId(3).to_string(), "3");
        assert_eq!(PatchId::from(7).to_string(), "7");
    }

    #[test]
    fn ids_order_by_index() {
        assert!(PatchId(1) < PatchId(2));
        assert!(SpeciesId(0) < SpeciesId(10));
    }
}
