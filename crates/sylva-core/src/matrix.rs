//! Species-by-patch count matrices.
//!
//! Rows are species, columns are patches. Storage is column-major so
//! that a patch's per-species counts are contiguous, which is how
//! seedling injection and individual-count queries consume them.

use crate::error::DemographyError;
use crate::id::{PatchId, SpeciesId};

/// A dense `n_species x n_patches` matrix of non-negative counts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountMatrix {
    n_species: usize,
    n_patches: usize,
    data: Vec<u32>,
}

impl CountMatrix {
    /// A zero matrix of the given shape.
    pub fn zeros(n_species: usize, n_patches: usize) -> Self {
        Self {
            n_species,
            n_patches,
            data: vec![0; n_species * n_patches],
        }
    }

    /// Build from row vectors (one per species).
    ///
    /// # Errors
    ///
    /// Returns [`DemographyError::ShapeMismatch`] if the rows are ragged.
    pub fn from_rows(rows: &[Vec<u32>]) -> Result<Self, DemographyError> {
        let n_species = rows.len();
        let n_patches = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != n_patches) {
            return Err(DemographyError::ShapeMismatch {
                expected: (n_species, n_patches),
                actual: (n_species, bad.len()),
            });
        }
        let mut m = Self::zeros(n_species, n_patches);
        for (s, row) in rows.iter().enumerate() {
            for (p, &v) in row.iter().enumerate() {
                m.data[p * n_species + s] = v;
            }
        }
        Ok(m)
    }

    /// Build from per-patch columns (each of length `n_species`).
    ///
    /// # Errors
    ///
    /// Returns [`DemographyError::LengthMismatch`] if a column has the
    /// wrong length.
    pub fn from_columns(n_species: usize, columns: &[Vec<u32>]) -> Result<Self, DemographyError> {
        let mut data = Vec::with_capacity(n_species * columns.len());
        for col in columns {
            if col.len() != n_species {
                return Err(DemographyError::LengthMismatch {
                    expected: n_species,
                    actual: col.len(),
                });
            }
            data.extend_from_slice(col);
        }
        Ok(Self {
            n_species,
            n_patches: columns.len(),
            data,
        })
    }

    /// `(rows, cols)` = `(n_species, n_patches)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_species, self.n_patches)
    }

    /// Number of species (rows).
    pub fn n_species(&self) -> usize {
        self.n_species
    }

    /// Number of patches (columns).
    pub fn n_patches(&self) -> usize {
        self.n_patches
    }

    /// Count for one species in one patch.
    ///
    /// # Errors
    ///
    /// Returns an out-of-range error naming the invalid index.
    pub fn get(&self, species: SpeciesId, patch: PatchId) -> Result<u32, DemographyError> {
        let (s, p) = self.check(species, patch)?;
        Ok(self.data[p * self.n_species + s])
    }

    /// Overwrite the count for one species in one patch.
    ///
    /// # Errors
    ///
    /// Returns an out-of-range error naming the invalid index.
    pub fn set(
        &mut self,
        species: SpeciesId,
        patch: PatchId,
        value: u32,
    ) -> Result<(), DemographyError> {
        let (s, p) = self.check(species, patch)?;
        self.data[p * self.n_species + s] = value;
        Ok(())
    }

    /// Per-species counts for one patch.
    ///
    /// # Errors
    ///
    /// Returns [`DemographyError::PatchOutOfRange`] naming the index.
    pub fn column(&self, patch: PatchId) -> Result<&[u32], DemographyError> {
        let p = self.check_patch(patch)?;
        Ok(&self.data[p * self.n_species..(p + 1) * self.n_species])
    }

    /// Per-patch counts for one species.
    ///
    /// # Errors
    ///
    /// Returns [`DemographyError::SpeciesOutOfRange`] naming the index.
    pub fn row(&self, species: SpeciesId) -> Result<Vec<u32>, DemographyError> {
        let s = self.check_species(species)?;
        Ok((0..self.n_patches)
            .map(|p| self.data[p * self.n_species + s])
            .collect())
    }

    /// Sum over all patches for each species.
    pub fn row_sums(&self) -> Vec<u64> {
        let mut sums = vec![0u64; self.n_species];
        for col in self.data.chunks(self.n_species.max(1)) {
            for (sum, &v) in sums.iter_mut().zip(col) {
                *sum += u64::from(v);
            }
        }
        sums
    }

    /// Sum of every entry.
    pub fn total(&self) -> u64 {
        self.data.iter().map(|&v| u64::from(v)).sum()
    }

    fn check(&self, species: SpeciesId, patch: PatchId) -> Result<(usize, usize), DemographyError> {
        Ok((self.check_species(species)?, self.check_patch(patch)?))
    }

    fn check_species(&self, species: SpeciesId) -> Result<usize, DemographyError> {
        let s = species.0 as usize;
        if s >= self.n_species {
            return Err(DemographyError::SpeciesOutOfRange {
                species,
                n_species: self.n_species,
            });
        }
        Ok(s)
    }

    fn check_patch(&self, patch: PatchId) -> Result<usize, DemographyError> {
        let p = patch.0 as usize;
        if p >= self.n_patches {
            return Err(DemographyError::PatchOutOfRange {
                patch,
                n_patches: self.n_patches,
            });
        }
        Ok(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_and_columns_agree() {
        let m = CountMatrix::from_rows(&[vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.column(PatchId(1)).unwrap(), &[2, 5]);
        assert_eq!(m.row(SpeciesId(1)).unwrap(), vec![4, 5, 6]);
        assert_eq!(m.get(SpeciesId(0), PatchId(2)).unwrap(), 3);
        assert_eq!(m.row_sums(), vec![6, 15]);
        assert_eq!(m.total(), 21);

        let c = CountMatrix::from_columns(2, &[vec![1, 4], vec![2, 5], vec![3, 6]]).unwrap();
        assert_eq!(c, m);
    }

    #[test]
    fn ragged_rows_rejected() {
        let err = CountMatrix::from_rows(&[vec![1, 2], vec![3]]).unwrap_err();
        assert!(matches!(err, DemographyError::ShapeMismatch { .. }));
    }

    #[test]
    fn short_column_rejected() {
        let err = CountMatrix::from_columns(2, &[vec![1]]).unwrap_err();
        assert_eq!(
            err,
            DemographyError::LengthMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn out_of_range_names_the_index() {
        let mut m = CountMatrix::zeros(2, 2);
        match m.get(SpeciesId(5), PatchId(0)) {
            Err(DemographyError::SpeciesOutOfRange { species, n_species }) => {
                assert_eq!(species, SpeciesId(5));
                assert_eq!(n_species, 2);
            }
            other => panic!("expected SpeciesOutOfRange, got {other:?}"),
        }
        assert!(matches!(
            m.set(SpeciesId(0), PatchId(9), 1),
            Err(DemographyError::PatchOutOfRange { .. })
        ));
        m.set(SpeciesId(1), PatchId(1), 7).unwrap();
        assert_eq!(m.column(PatchId(1)).unwrap(), &[0, 7]);
    }

    #[test]
    fn row_and_column_queries_are_bounds_checked() {
        let m = CountMatrix::from_rows(&[vec![1, 2]]).unwrap();
        assert_eq!(
            m.row(SpeciesId(5)),
            Err(DemographyError::SpeciesOutOfRange {
                species: SpeciesId(5),
                n_species: 1
            })
        );
        assert_eq!(
            m.column(PatchId(9)),
            Err(DemographyError::PatchOutOfRange {
                patch: PatchId(9),
                n_patches: 2
            })
        );
        assert_eq!(m.row(SpeciesId(0)).unwrap(), vec![1, 2]);
        assert_eq!(m.column(PatchId(1)).unwrap(), &[2]);
    }

    #[test]
    fn zero_species_matrix_is_empty() {
        let m = CountMatrix::zeros(0, 3);
        assert_eq!(m.total(), 0);
        assert!(m.row_sums().is_empty());
    }
}
