// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The variable-size measurement value type.
//!
//! A [`Measurement`] observes `n` components (`1 ≤ n ≤ D`) of a
//! `D`-dimensional parameter space. Its values and covariance live in inline
//! `D` and `D × D` buffers, so creating one never touches the heap, and
//! cloning one is a plain copy of fixed-size arrays.
//!
//! # Storage layout
//!
//! ```text
//! parameters:  [ p0 p1 .. p(n-1) | 0 .. 0 ]                 (D entries)
//! covariance:  [ packed n×n column-major | 0 .. 0 ]          (D·D entries)
//! ```
//!
//! Both the statically-sized views (`*_fixed::<N>()`) and the dynamically
//! sized views (`parameters()`, `covariance()`) are contiguous maps over the
//! front of these buffers. They alias: a write through one is visible through
//! the other.
//!
//! # Construction
//!
//! - [`Measurement::new`]: sizes known at compile time; a vector or matrix
//!   of the wrong size does not type-check.
//! - [`Measurement::from_parts`]: sizes known only at run time; shape
//!   mismatches come back as [`MeasurementError`] values.
//!
//! There is no empty measurement. Construction either yields a complete
//! observation or an error.

use core::marker::PhantomData;

use nalgebra::{
    Cholesky, DMatrixView, DMatrixViewMut, DVectorView, DVectorViewMut, Dim, Matrix, RawStorage,
    SMatrix, SMatrixView, SMatrixViewMut, SVector, SVectorView, SVectorViewMut,
};
use tracing::debug;

use crate::error::{MeasurementError, Result};
use crate::indices::{
    BoundIndices, BoundSubspaceIndices, FreeIndices, ParameterIndices, BOUND_SIZE,
    BOUND_SUBSPACE_INDICES_INVALID, FREE_SIZE,
};
use crate::source_link::SourceLink;
use crate::subspace::SubspaceIndexSet;

/// Scalar type of all measured values.
pub type Scalar = f64;

/// Full-space parameter vector.
pub type FullParametersVector<const D: usize> = SVector<Scalar, D>;

/// Full-space covariance matrix.
pub type FullCovarianceMatrix<const D: usize> = SMatrix<Scalar, D, D>;

/// Compile-time guard: a statically sized measurement observes `1..=D` components.
struct SubspaceFits<const N: usize, const D: usize>;

impl<const N: usize, const D: usize> SubspaceFits<N, D> {
    const OK: () = assert!(N >= 1 && N <= D, "subspace size must lie in 1..=D");
}

// ─── Measurement ─────────────────────────────────────────────────────────────

/// A measurement of a variable-size subspace of the full parameters.
///
/// - `L`: identity token linking back to the detector readout.
/// - `I`: parameter-index enumeration, fixes the full dimension `D`.
///
/// The measurement does not reference its detector surface; the token already
/// identifies it.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement<L, I, const D: usize>
where
    I: ParameterIndices<D>,
{
    source_link: L,
    subspace: SubspaceIndexSet<D>,
    parameters: SVector<Scalar, D>,
    covariance: SMatrix<Scalar, D, D>,
    #[cfg_attr(feature = "serde", serde(skip))]
    _indices: PhantomData<I>,
}

/// A measurement of the bound (surface-local) parameters.
pub type BoundMeasurement<L> = Measurement<L, BoundIndices, BOUND_SIZE>;

/// A measurement of the free (global) parameters.
pub type FreeMeasurement<L> = Measurement<L, FreeIndices, FREE_SIZE>;

impl<L, I, const D: usize> Measurement<L, I, D>
where
    L: SourceLink,
    I: ParameterIndices<D>,
{
    /// Construct from a compile-time-sized index list, vector and covariance.
    ///
    /// The index array, the vector and both covariance dimensions share `N`,
    /// so shape agreement is enforced by the type system. `1 ≤ N ≤ D` is
    /// checked when the call is monomorphised. Indices must be strictly
    /// increasing and in range; violations are returned as errors.
    ///
    /// ```rust
    /// use nalgebra::{Matrix2, Vector2};
    /// use subspace_measurement::{BoundIndices, BoundMeasurement};
    ///
    /// let m: BoundMeasurement<u32> = BoundMeasurement::new(
    ///     17,
    ///     [BoundIndices::Loc0, BoundIndices::Phi],
    ///     &Vector2::new(1.5, -0.3),
    ///     &Matrix2::new(0.1, 0.0, 0.0, 0.2),
    /// )
    /// .unwrap();
    /// assert_eq!(m.size(), 2);
    /// ```
    pub fn new<const N: usize>(
        source_link: L,
        indices: [I; N],
        parameters: &SVector<Scalar, N>,
        covariance: &SMatrix<Scalar, N, N>,
    ) -> Result<Self> {
        #[allow(clippy::let_unit_value)]
        let () = SubspaceFits::<N, D>::OK;

        let subspace = SubspaceIndexSet::from_indices(&indices)?;

        let mut stored_parameters = SVector::<Scalar, D>::zeros();
        stored_parameters.as_mut_slice()[..N].copy_from_slice(parameters.as_slice());

        let mut stored_covariance = SMatrix::<Scalar, D, D>::zeros();
        stored_covariance.as_mut_slice()[..N * N].copy_from_slice(covariance.as_slice());

        Ok(Self {
            source_link,
            subspace,
            parameters: stored_parameters,
            covariance: stored_covariance,
            _indices: PhantomData,
        })
    }

    /// Construct from run-time-sized parts.
    ///
    /// Accepts any nalgebra vector, matrix or view. The parameter vector must
    /// be `n × 1` and the covariance `n × n`, where `n = indices.len()`;
    /// anything else is rejected, never truncated or padded.
    pub fn from_parts<R1, C1, S1, R2, C2, S2>(
        source_link: L,
        indices: &[I],
        parameters: &Matrix<Scalar, R1, C1, S1>,
        covariance: &Matrix<Scalar, R2, C2, S2>,
    ) -> Result<Self>
    where
        R1: Dim,
        C1: Dim,
        S1: RawStorage<Scalar, R1, C1>,
        R2: Dim,
        C2: Dim,
        S2: RawStorage<Scalar, R2, C2>,
    {
        let built = Self::checked_from_parts(source_link, indices, parameters, covariance);
        if let Err(err) = &built {
            debug!(%err, indices = indices.len(), "rejected measurement");
        }
        built
    }

    fn checked_from_parts<R1, C1, S1, R2, C2, S2>(
        source_link: L,
        indices: &[I],
        parameters: &Matrix<Scalar, R1, C1, S1>,
        covariance: &Matrix<Scalar, R2, C2, S2>,
    ) -> Result<Self>
    where
        R1: Dim,
        C1: Dim,
        S1: RawStorage<Scalar, R1, C1>,
        R2: Dim,
        C2: Dim,
        S2: RawStorage<Scalar, R2, C2>,
    {
        let subspace = SubspaceIndexSet::from_indices(indices)?;
        let n = subspace.len();

        let (rows, cols) = parameters.shape();
        if (rows, cols) != (n, 1) {
            return Err(MeasurementError::ParametersShape { expected: n, rows, cols });
        }
        let (rows, cols) = covariance.shape();
        if (rows, cols) != (n, n) {
            return Err(MeasurementError::CovarianceShape { expected: n, rows, cols });
        }

        // Matrix::iter walks column-major, matching the packed layout.
        let mut stored_parameters = SVector::<Scalar, D>::zeros();
        for (slot, &value) in stored_parameters.iter_mut().zip(parameters.iter()) {
            *slot = value;
        }
        let mut stored_covariance = SMatrix::<Scalar, D, D>::zeros();
        for (slot, &value) in stored_covariance.as_mut_slice().iter_mut().zip(covariance.iter()) {
            *slot = value;
        }

        Ok(Self {
            source_link,
            subspace,
            parameters: stored_parameters,
            covariance: stored_covariance,
            _indices: PhantomData,
        })
    }

    // ── Identity and subspace ──────────────────────────────────────────────

    /// Token that connects to the underlying detector readout.
    pub fn source_link(&self) -> &L {
        &self.source_link
    }

    /// Number of measured components `n`.
    pub fn size(&self) -> usize {
        self.subspace.len()
    }

    /// Is parameter `index` part of this measurement?
    pub fn contains(&self, index: I) -> bool {
        self.subspace.contains(index.to_index())
    }

    /// Local position of parameter `index`. `index` must be measured.
    pub fn index_of(&self, index: I) -> usize {
        self.subspace.index_of(index.to_index())
    }

    /// The ordered measured indices.
    pub fn subspace_indices(&self) -> &SubspaceIndexSet<D> {
        &self.subspace
    }

    /// The measured indices as a fixed-length array. `N` must equal `size()`.
    pub fn subspace_indices_fixed<const N: usize>(&self) -> [u8; N] {
        self.subspace.to_array::<N>()
    }

    /// Full-size projection matrix for this measurement's subspace.
    pub fn projector(&self) -> SMatrix<Scalar, D, D> {
        self.subspace.projector()
    }

    // ── Parameter views ────────────────────────────────────────────────────

    /// Statically sized view of the measured values. `N` must equal `size()`.
    pub fn parameters_fixed<const N: usize>(&self) -> SVectorView<'_, Scalar, N> {
        debug_assert_eq!(N, self.size(), "static parameter view of the wrong size");
        SVectorView::from_slice(&self.parameters.as_slice()[..N])
    }

    /// Mutable statically sized view of the measured values. `N` must equal `size()`.
    pub fn parameters_fixed_mut<const N: usize>(&mut self) -> SVectorViewMut<'_, Scalar, N> {
        debug_assert_eq!(N, self.size(), "static parameter view of the wrong size");
        SVectorViewMut::from_slice(&mut self.parameters.as_mut_slice()[..N])
    }

    /// Dynamically sized view of the measured values.
    pub fn parameters(&self) -> DVectorView<'_, Scalar> {
        let n = self.size();
        DVectorView::from_slice(&self.parameters.as_slice()[..n], n)
    }

    /// Mutable dynamically sized view of the measured values.
    pub fn parameters_mut(&mut self) -> DVectorViewMut<'_, Scalar> {
        let n = self.size();
        DVectorViewMut::from_slice(&mut self.parameters.as_mut_slice()[..n], n)
    }

    // ── Covariance views ───────────────────────────────────────────────────

    /// Statically sized view of the measured covariance. `N` must equal `size()`.
    pub fn covariance_fixed<const N: usize>(&self) -> SMatrixView<'_, Scalar, N, N> {
        debug_assert_eq!(N, self.size(), "static covariance view of the wrong size");
        SMatrixView::from_slice(&self.covariance.as_slice()[..N * N])
    }

    /// Mutable statically sized view of the measured covariance. `N` must equal `size()`.
    pub fn covariance_fixed_mut<const N: usize>(&mut self) -> SMatrixViewMut<'_, Scalar, N, N> {
        debug_assert_eq!(N, self.size(), "static covariance view of the wrong size");
        SMatrixViewMut::from_slice(&mut self.covariance.as_mut_slice()[..N * N])
    }

    /// Dynamically sized view of the measured covariance.
    pub fn covariance(&self) -> DMatrixView<'_, Scalar> {
        let n = self.size();
        DMatrixView::from_slice(&self.covariance.as_slice()[..n * n], n, n)
    }

    /// Mutable dynamically sized view of the measured covariance.
    pub fn covariance_mut(&mut self) -> DMatrixViewMut<'_, Scalar> {
        let n = self.size();
        DMatrixViewMut::from_slice(&mut self.covariance.as_mut_slice()[..n * n], n, n)
    }

    // ── Full-space expansion ───────────────────────────────────────────────

    /// Measured values scattered into the full space, zero elsewhere.
    pub fn full_parameters(&self) -> FullParametersVector<D> {
        self.subspace.expand_vector(&self.parameters())
    }

    /// Measured covariance scattered into the full space.
    ///
    /// Rows and columns of unmeasured components are zero: no information.
    pub fn full_covariance(&self) -> FullCovarianceMatrix<D> {
        self.subspace.expand_matrix(&self.covariance())
    }

    // ── Compatibility with a predicted state ───────────────────────────────

    /// χ² distance between this measurement and a predicted full-space state.
    ///
    /// ```text
    /// r  = m − H·x
    /// S  = V + H·P·Hᵀ
    /// χ² = rᵀ·S⁻¹·r
    /// ```
    ///
    /// Evaluated on a `D × D` matrix whose unmeasured block is the identity,
    /// so no size-dependent allocation is needed. Fails when `S` is not
    /// positive definite.
    pub fn chi2(
        &self,
        predicted: &FullParametersVector<D>,
        predicted_covariance: &FullCovarianceMatrix<D>,
    ) -> Result<Scalar> {
        let indices = self.subspace.as_slice();
        let local = self.parameters();
        let local_covariance = self.covariance();

        let mut residual = SVector::<Scalar, D>::zeros();
        let mut s = SMatrix::<Scalar, D, D>::identity();
        for (i, &row) in indices.iter().enumerate() {
            residual[i] = local[i] - predicted[row as usize];
            for (j, &col) in indices.iter().enumerate() {
                s[(i, j)] = local_covariance[(i, j)]
                    + predicted_covariance[(row as usize, col as usize)];
            }
        }

        let chol = Cholesky::new(s).ok_or(MeasurementError::SingularResidualCovariance)?;
        let chi2 = residual.dot(&chol.solve(&residual));
        if !chi2.is_finite() {
            return Err(MeasurementError::SingularResidualCovariance);
        }
        Ok(chi2)
    }
}

impl<L: SourceLink> Measurement<L, BoundIndices, BOUND_SIZE> {
    /// Dense bound subspace indices, unused slots set to the invalid sentinel.
    pub fn bound_subspace_indices(&self) -> BoundSubspaceIndices {
        let mut out = BOUND_SUBSPACE_INDICES_INVALID;
        for (slot, index) in out.iter_mut().zip(self.subspace.iter()) {
            *slot = index;
        }
        out
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indices::BOUND_SUBSPACE_INDEX_INVALID;
    use nalgebra::{Matrix1, Matrix2, Matrix3, Vector1, Vector2, Vector3};

    // ── Helpers ──────────────────────────────────────────────────────────

    fn loc0_phi() -> BoundMeasurement<u32> {
        BoundMeasurement::new(
            1,
            [BoundIndices::Loc0, BoundIndices::Phi],
            &Vector2::new(1.5, -0.3),
            &Matrix2::new(0.1, 0.0, 0.0, 0.2),
        )
        .unwrap()
    }

    // ── Construction ─────────────────────────────────────────────────────

    #[test]
    fn test_static_construction_stores_everything() {
        let m = loc0_phi();
        assert_eq!(*m.source_link(), 1);
        assert_eq!(m.size(), 2);
        assert_eq!(m.subspace_indices().as_slice(), &[0, 2]);
        assert_eq!(m.parameters_fixed::<2>()[0], 1.5);
        assert_eq!(m.covariance_fixed::<2>()[(1, 1)], 0.2);
    }

    #[test]
    fn test_static_construction_rejects_unordered_indices() {
        let err = BoundMeasurement::new(
            1u32,
            [BoundIndices::Phi, BoundIndices::Loc0],
            &Vector2::zeros(),
            &Matrix2::identity(),
        )
        .unwrap_err();
        assert_eq!(err, MeasurementError::IndicesNotIncreasing { position: 1, index: 0 });
    }

    #[test]
    fn test_dynamic_construction_matches_static() {
        let params = [1.5, -0.3];
        let cov = [0.1, 0.0, 0.0, 0.2];
        let m = BoundMeasurement::from_parts(
            1u32,
            &[BoundIndices::Loc0, BoundIndices::Phi],
            &DVectorView::from_slice(&params, 2),
            &DMatrixView::from_slice(&cov, 2, 2),
        )
        .unwrap();
        assert_eq!(m.full_parameters(), loc0_phi().full_parameters());
        assert_eq!(m.full_covariance(), loc0_phi().full_covariance());
    }

    #[test]
    fn test_dynamic_construction_rejects_long_parameter_vector() {
        let err = BoundMeasurement::from_parts(
            1u32,
            &[BoundIndices::Loc0, BoundIndices::Loc1],
            &Vector3::new(1.0, 2.0, 3.0),
            &Matrix2::identity(),
        )
        .unwrap_err();
        assert_eq!(err, MeasurementError::ParametersShape { expected: 2, rows: 3, cols: 1 });
    }

    #[test]
    fn test_dynamic_construction_rejects_non_square_covariance() {
        let cov = [1.0; 6];
        let err = BoundMeasurement::from_parts(
            1u32,
            &[BoundIndices::Loc0, BoundIndices::Loc1],
            &Vector2::new(1.0, 2.0),
            &DMatrixView::from_slice(&cov, 2, 3),
        )
        .unwrap_err();
        assert_eq!(err, MeasurementError::CovarianceShape { expected: 2, rows: 2, cols: 3 });
    }

    #[test]
    fn test_dynamic_construction_rejects_empty_index_list() {
        let empty: [f64; 0] = [];
        let err = BoundMeasurement::from_parts(
            1u32,
            &[],
            &DVectorView::from_slice(&empty, 0),
            &DMatrixView::from_slice(&empty, 0, 0),
        )
        .unwrap_err();
        assert_eq!(err, MeasurementError::EmptySubspace);
    }

    // ── Subspace queries ─────────────────────────────────────────────────

    #[test]
    fn test_contains_and_index_of_agree() {
        let m = loc0_phi();
        assert!(m.contains(BoundIndices::Loc0));
        assert!(!m.contains(BoundIndices::Loc1));
        assert!(m.contains(BoundIndices::Phi));
        assert!(!m.contains(BoundIndices::Time));
        assert_eq!(m.index_of(BoundIndices::Phi), 1);
        assert_eq!(m.subspace_indices_fixed::<2>(), [0, 2]);
    }

    #[test]
    fn test_bound_subspace_indices_pad_with_sentinel() {
        let m = loc0_phi();
        let dense = m.bound_subspace_indices();
        assert_eq!(dense[..2], [0, 2]);
        assert!(dense[2..].iter().all(|&i| i == BOUND_SUBSPACE_INDEX_INVALID));
    }

    // ── Views alias one buffer ───────────────────────────────────────────

    #[test]
    fn test_dynamic_write_visible_through_static_view() {
        let mut m = loc0_phi();
        m.parameters_mut()[1] = 4.0;
        assert_eq!(m.parameters_fixed::<2>()[1], 4.0);
        m.covariance_mut()[(0, 1)] = 0.05;
        assert_eq!(m.covariance_fixed::<2>()[(0, 1)], 0.05);
    }

    #[test]
    fn test_static_write_visible_through_dynamic_view() {
        let mut m = loc0_phi();
        m.parameters_fixed_mut::<2>()[0] = -2.0;
        assert_eq!(m.parameters()[0], -2.0);
        m.covariance_fixed_mut::<2>()[(1, 0)] = 0.07;
        assert_eq!(m.covariance()[(1, 0)], 0.07);
        assert_eq!(m.full_covariance()[(2, 0)], 0.07);
    }

    #[test]
    #[should_panic(expected = "wrong size")]
    #[cfg(debug_assertions)]
    fn test_static_view_of_wrong_size_panics_in_debug() {
        let m = loc0_phi();
        let _ = m.parameters_fixed::<3>();
    }

    // ── Full-space expansion ─────────────────────────────────────────────

    #[test]
    fn test_full_parameters_scenario() {
        let full = loc0_phi().full_parameters();
        assert_eq!(full.as_slice(), &[1.5, 0.0, -0.3, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_full_covariance_scenario() {
        let full = loc0_phi().full_covariance();
        for row in 0..6 {
            for col in 0..6 {
                let expected = match (row, col) {
                    (0, 0) => 0.1,
                    (2, 2) => 0.2,
                    _ => 0.0,
                };
                assert_eq!(full[(row, col)], expected, "entry ({row}, {col})");
            }
        }
    }

    #[test]
    fn test_full_space_of_free_measurement() {
        let m: FreeMeasurement<u32> = FreeMeasurement::new(
            3,
            [FreeIndices::Pos0, FreeIndices::Pos1, FreeIndices::Time],
            &Vector3::new(1.0, 2.0, 3.0),
            &Matrix3::from_diagonal(&Vector3::new(0.1, 0.2, 0.3)),
        )
        .unwrap();
        let full = m.full_parameters();
        assert_eq!(full.len(), 8);
        assert_eq!(full[3], 3.0);
        assert_eq!(m.full_covariance()[(3, 3)], 0.3);
        assert_eq!(m.full_covariance()[(2, 2)], 0.0);
    }

    // ── χ² ───────────────────────────────────────────────────────────────

    #[test]
    fn test_chi2_one_dimensional() {
        let m: BoundMeasurement<u32> = BoundMeasurement::new(
            1,
            [BoundIndices::Loc1],
            &Vector1::new(2.0),
            &Matrix1::new(0.1),
        )
        .unwrap();
        let predicted = SVector::<f64, 6>::zeros();
        let predicted_cov = SMatrix::<f64, 6, 6>::identity() * 0.3;
        let chi2 = m.chi2(&predicted, &predicted_cov).unwrap();
        // r = 2, S = 0.1 + 0.3
        assert!((chi2 - 10.0).abs() < 1e-9, "chi2={chi2}");
    }

    #[test]
    fn test_chi2_zero_for_exact_prediction() {
        let m = loc0_phi();
        let chi2 = m
            .chi2(&m.full_parameters(), &SMatrix::<f64, 6, 6>::identity())
            .unwrap();
        assert!(chi2.abs() < 1e-12);
    }

    #[test]
    fn test_chi2_rejects_non_positive_residual_covariance() {
        let m: BoundMeasurement<u32> = BoundMeasurement::new(
            1,
            [BoundIndices::Loc0],
            &Vector1::new(1.0),
            &Matrix1::new(-1.0),
        )
        .unwrap();
        let err = m
            .chi2(&SVector::zeros(), &SMatrix::zeros())
            .unwrap_err();
        assert_eq!(err, MeasurementError::SingularResidualCovariance);
    }

    #[test]
    fn test_clone_is_independent() {
        let a = loc0_phi();
        let mut b = a.clone();
        b.parameters_mut()[0] = 9.0;
        assert_eq!(a.parameters()[0], 1.5);
        assert_eq!(b.parameters()[0], 9.0);
    }
}
