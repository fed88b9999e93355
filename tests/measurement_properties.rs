// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Property tests for the local ↔ full mapping.
//!
//! Every subset of a 6-dimensional space is reachable through a non-zero
//! 6-bit mask; values and covariances are drawn freely for each subset.

use nalgebra::{DMatrix, DVector};
use proptest::prelude::*;
use subspace_measurement::Measurement;

/// Raw `u8` indices over a 6-dimensional space.
type RawMeasurement = Measurement<u32, u8, 6>;

// ─── helpers ─────────────────────────────────────────────────────────────────

fn arb_parts() -> impl Strategy<Value = (Vec<u8>, Vec<f64>, Vec<f64>)> {
    (1u8..64).prop_flat_map(|mask| {
        let indices: Vec<u8> = (0..6u8).filter(|i| mask & (1 << i) != 0).collect();
        let n = indices.len();
        (
            Just(indices),
            prop::collection::vec(-100.0f64..100.0, n),
            prop::collection::vec(-10.0f64..10.0, n * n),
        )
    })
}

/// Symmetric covariance built from the upper triangle of `raw`.
fn symmetric(n: usize, raw: &[f64]) -> DMatrix<f64> {
    DMatrix::from_fn(n, n, |i, j| {
        if i <= j {
            raw[i * n + j]
        } else {
            raw[j * n + i]
        }
    })
}

fn build(indices: &[u8], values: &[f64], cov: &DMatrix<f64>) -> RawMeasurement {
    RawMeasurement::from_parts(7, indices, &DVector::from_vec(values.to_vec()), cov)
        .expect("generated parts are consistent")
}

// ─── properties ──────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn size_matches_subspace_length((indices, values, raw) in arb_parts()) {
        let n = indices.len();
        let m = build(&indices, &values, &symmetric(n, &raw));
        prop_assert_eq!(m.size(), m.subspace_indices().len());
        prop_assert_eq!(m.size(), n);
    }

    #[test]
    fn contains_and_index_of_agree((indices, values, raw) in arb_parts()) {
        let n = indices.len();
        let m = build(&indices, &values, &symmetric(n, &raw));
        for i in 0..6u8 {
            prop_assert_eq!(m.contains(i), indices.contains(&i));
            if m.contains(i) {
                prop_assert_eq!(m.subspace_indices()[m.index_of(i)], i);
            }
        }
    }

    #[test]
    fn full_parameters_scatter_local_values((indices, values, raw) in arb_parts()) {
        let n = indices.len();
        let m = build(&indices, &values, &symmetric(n, &raw));
        let full = m.full_parameters();
        for (k, &index) in indices.iter().enumerate() {
            prop_assert_eq!(full[index as usize], values[k]);
        }
        for j in 0..6u8 {
            if !indices.contains(&j) {
                prop_assert_eq!(full[j as usize], 0.0);
            }
        }
    }

    #[test]
    fn full_covariance_scatter_local_block((indices, values, raw) in arb_parts()) {
        let n = indices.len();
        let cov = symmetric(n, &raw);
        let m = build(&indices, &values, &cov);
        let full = m.full_covariance();
        for (k, &row) in indices.iter().enumerate() {
            for (l, &col) in indices.iter().enumerate() {
                prop_assert_eq!(full[(row as usize, col as usize)], cov[(k, l)]);
            }
        }
        for j in 0..6usize {
            if !indices.contains(&(j as u8)) {
                prop_assert!(full.row(j).iter().all(|&v| v == 0.0));
                prop_assert!(full.column(j).iter().all(|&v| v == 0.0));
            }
        }
    }

    #[test]
    fn symmetric_covariance_stays_symmetric((indices, values, raw) in arb_parts()) {
        let n = indices.len();
        let m = build(&indices, &values, &symmetric(n, &raw));
        let full = m.full_covariance();
        prop_assert_eq!(full, full.transpose());
    }

    #[test]
    fn projection_inverts_expansion((indices, values, raw) in arb_parts()) {
        let n = indices.len();
        let m = build(&indices, &values, &symmetric(n, &raw));
        let projected = m.projector() * m.full_parameters();
        for k in 0..n {
            prop_assert_eq!(projected[k], values[k]);
        }
        for k in n..6 {
            prop_assert_eq!(projected[k], 0.0);
        }
    }

    #[test]
    fn dynamic_construction_rejects_wrong_vector_length(
        (indices, values, raw) in arb_parts(),
        extra in 1usize..3,
    ) {
        let n = indices.len();
        let mut long = values.clone();
        long.extend(core::iter::repeat(0.0).take(extra));
        let result = RawMeasurement::from_parts(
            7,
            &indices,
            &DVector::from_vec(long),
            &symmetric(n, &raw),
        );
        prop_assert!(result.is_err());
    }
}
