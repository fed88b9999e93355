// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Ordered subspace index sets and the local ↔ full mapping built on them.
//!
//! A [`SubspaceIndexSet`] lists which components of a `D`-dimensional
//! parameter space a measurement observes. Position `i` in the set pairs local
//! component `i` with full component `indices[i]`. Capacity is `D`, held
//! inline, so a set never allocates.
//!
//! # Invariants
//!
//! - At least one index, at most `D`.
//! - Every index is `< D`.
//! - Indices are strictly increasing, hence unique.
//!
//! Lookups are linear scans. `D` is in the single digits for every
//! parametrisation this crate targets.

use core::ops::Deref;

use heapless::Vec as HVec;
use nalgebra::{Dim, Matrix, RawStorage, SMatrix, SVector, Vector};

use crate::error::{MeasurementError, Result};
use crate::indices::ParameterIndices;

/// Ordered, fixed-capacity set of measured component indices.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "HVec<u8, D>", into = "HVec<u8, D>")
)]
pub struct SubspaceIndexSet<const D: usize> {
    indices: HVec<u8, D>,
}

impl<const D: usize> SubspaceIndexSet<D> {
    /// Validate and store raw component indices.
    pub fn new(indices: &[u8]) -> Result<Self> {
        Self::from_indices(indices)
    }

    /// Validate and store indices given as a named enumeration.
    pub fn from_indices<I: ParameterIndices<D>>(indices: &[I]) -> Result<Self> {
        if indices.is_empty() {
            return Err(MeasurementError::EmptySubspace);
        }
        if indices.len() > D {
            return Err(MeasurementError::TooManyIndices {
                count: indices.len(),
                max: D,
            });
        }

        let mut set: HVec<u8, D> = HVec::new();
        for (position, index) in indices.iter().map(|i| i.to_index()).enumerate() {
            if index as usize >= D {
                return Err(MeasurementError::IndexOutOfRange { index, size: D });
            }
            if set.last().is_some_and(|&prev| index <= prev) {
                return Err(MeasurementError::IndicesNotIncreasing { position, index });
            }
            if set.push(index).is_err() {
                return Err(MeasurementError::TooManyIndices {
                    count: indices.len(),
                    max: D,
                });
            }
        }
        Ok(Self { indices: set })
    }

    /// Number of measured components.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Always `false` for a constructed set; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Is full component `index` measured?
    pub fn contains(&self, index: u8) -> bool {
        self.indices.iter().any(|&i| i == index)
    }

    /// Local position of full component `index`, or `None` if not measured.
    pub fn position(&self, index: u8) -> Option<usize> {
        self.indices.iter().position(|&i| i == index)
    }

    /// Local position of full component `index`.
    ///
    /// `index` must be a member. Debug builds panic otherwise; release builds
    /// return `len()`, which is out of range for every local view.
    pub fn index_of(&self, index: u8) -> usize {
        let position = self.position(index);
        debug_assert!(position.is_some(), "index {index} is not part of the subspace");
        position.unwrap_or(self.indices.len())
    }

    /// The ordered indices.
    pub fn as_slice(&self) -> &[u8] {
        &self.indices
    }

    /// Iterate over the ordered indices.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.indices.iter().copied()
    }

    /// Copy into a fixed-length array. `N` must equal `len()`.
    pub fn to_array<const N: usize>(&self) -> [u8; N] {
        debug_assert_eq!(
            N,
            self.len(),
            "requested {} indices from a {}-index subspace",
            N,
            self.len()
        );
        let mut out = [0u8; N];
        for (slot, &index) in out.iter_mut().zip(self.indices.iter()) {
            *slot = index;
        }
        out
    }

    // ── local → full ───────────────────────────────────────────────────────

    /// Scatter a local `n`-vector into a zeroed full-space vector.
    pub fn expand_vector<R, S>(&self, local: &Vector<f64, R, S>) -> SVector<f64, D>
    where
        R: Dim,
        S: RawStorage<f64, R>,
    {
        debug_assert_eq!(local.nrows(), self.len());
        let mut full = SVector::<f64, D>::zeros();
        for (i, &index) in self.indices.iter().enumerate() {
            full[index as usize] = local[i];
        }
        full
    }

    /// Scatter a local `n × n` matrix into a zeroed full-space matrix.
    ///
    /// Rows and columns of unmeasured components stay zero.
    pub fn expand_matrix<R, C, S>(&self, local: &Matrix<f64, R, C, S>) -> SMatrix<f64, D, D>
    where
        R: Dim,
        C: Dim,
        S: RawStorage<f64, R, C>,
    {
        debug_assert_eq!(local.shape(), (self.len(), self.len()));
        let mut full = SMatrix::<f64, D, D>::zeros();
        for (i, &row) in self.indices.iter().enumerate() {
            for (j, &col) in self.indices.iter().enumerate() {
                full[(row as usize, col as usize)] = local[(i, j)];
            }
        }
        full
    }

    // ── full → local ───────────────────────────────────────────────────────

    /// Full-size projection matrix.
    ///
    /// Row `i < n` selects full component `indices[i]`; rows `n..D` are zero.
    pub fn projector(&self) -> SMatrix<f64, D, D> {
        let mut h = SMatrix::<f64, D, D>::zeros();
        for (row, &col) in self.indices.iter().enumerate() {
            h[(row, col as usize)] = 1.0;
        }
        h
    }

    /// Gather the measured components of a full-space vector. `N` must equal `len()`.
    pub fn project_vector<const N: usize>(&self, full: &SVector<f64, D>) -> SVector<f64, N> {
        debug_assert_eq!(N, self.len());
        SVector::<f64, N>::from_fn(|i, _| full[self.indices[i] as usize])
    }

    /// Gather the measured block of a full-space matrix. `N` must equal `len()`.
    pub fn project_matrix<const N: usize>(&self, full: &SMatrix<f64, D, D>) -> SMatrix<f64, N, N> {
        debug_assert_eq!(N, self.len());
        SMatrix::<f64, N, N>::from_fn(|i, j| {
            full[(self.indices[i] as usize, self.indices[j] as usize)]
        })
    }
}

impl<const D: usize> Deref for SubspaceIndexSet<D> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.indices
    }
}

impl<const D: usize> AsRef<[u8]> for SubspaceIndexSet<D> {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl<const D: usize> TryFrom<HVec<u8, D>> for SubspaceIndexSet<D> {
    type Error = MeasurementError;

    fn try_from(indices: HVec<u8, D>) -> Result<Self> {
        Self::new(&indices)
    }
}

impl<const D: usize> From<SubspaceIndexSet<D>> for HVec<u8, D> {
    fn from(set: SubspaceIndexSet<D>) -> Self {
        set.indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indices::BoundIndices;
    use nalgebra::{Matrix2, Vector2};

    fn loc0_phi() -> SubspaceIndexSet<6> {
        SubspaceIndexSet::from_indices(&[BoundIndices::Loc0, BoundIndices::Phi]).unwrap()
    }

    #[test]
    fn test_membership_and_position() {
        let set = loc0_phi();
        assert_eq!(set.len(), 2);
        assert!(set.contains(0));
        assert!(!set.contains(1));
        assert!(set.contains(2));
        assert_eq!(set.index_of(0), 0);
        assert_eq!(set.index_of(2), 1);
        assert_eq!(set.position(5), None);
    }

    #[test]
    #[should_panic(expected = "not part of the subspace")]
    #[cfg(debug_assertions)]
    fn test_index_of_non_member_panics_in_debug() {
        loc0_phi().index_of(4);
    }

    #[test]
    fn test_indexes_like_a_slice() {
        let set = loc0_phi();
        assert_eq!(set[set.index_of(2)], 2);
        assert_eq!(set[0], 0);
        assert_eq!(set.first(), Some(&0));
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(
            SubspaceIndexSet::<6>::new(&[]),
            Err(MeasurementError::EmptySubspace)
        );
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(
            SubspaceIndexSet::<6>::new(&[1, 6]),
            Err(MeasurementError::IndexOutOfRange { index: 6, size: 6 })
        );
    }

    #[test]
    fn test_rejects_duplicates_and_descending_order() {
        assert_eq!(
            SubspaceIndexSet::<6>::new(&[1, 1]),
            Err(MeasurementError::IndicesNotIncreasing { position: 1, index: 1 })
        );
        assert_eq!(
            SubspaceIndexSet::<6>::new(&[3, 0]),
            Err(MeasurementError::IndicesNotIncreasing { position: 1, index: 0 })
        );
    }

    #[test]
    fn test_rejects_more_indices_than_dimension() {
        assert_eq!(
            SubspaceIndexSet::<2>::new(&[0, 1, 1]),
            Err(MeasurementError::TooManyIndices { count: 3, max: 2 })
        );
    }

    #[test]
    fn test_full_dimension_subspace_is_allowed() {
        let set = SubspaceIndexSet::<3>::new(&[0, 1, 2]).unwrap();
        assert_eq!(set.to_array::<3>(), [0, 1, 2]);
    }

    #[test]
    fn test_expand_then_project_recovers_local_values() {
        let set = loc0_phi();
        let local = Vector2::new(1.5, -0.3);
        let full = set.expand_vector(&local);
        assert_eq!(full.as_slice(), &[1.5, 0.0, -0.3, 0.0, 0.0, 0.0]);
        assert_eq!(set.project_vector::<2>(&full), local);

        let cov = Matrix2::new(0.1, 0.05, 0.05, 0.2);
        let full_cov = set.expand_matrix(&cov);
        assert_eq!(full_cov[(0, 2)], 0.05);
        assert_eq!(full_cov[(2, 0)], 0.05);
        assert_eq!(full_cov[(1, 1)], 0.0);
        assert_eq!(set.project_matrix::<2>(&full_cov), cov);
    }

    #[test]
    fn test_projector_matches_gather() {
        let set = loc0_phi();
        let full = SVector::<f64, 6>::from_fn(|i, _| i as f64 + 10.0);
        let projected = set.projector() * full;
        assert_eq!(projected[0], 10.0);
        assert_eq!(projected[1], 12.0);
        assert!(projected.iter().skip(2).all(|&v| v == 0.0));
    }
}
