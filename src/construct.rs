// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Construction helper that infers the subspace size from the index list.
//!
//! [`measurement!`](crate::measurement!) takes one or more indices, counts
//! them, and forwards to [`Measurement::new`] with a fixed-length array, so
//! callers never spell out `[I; N]` themselves. Vector and covariance sizes
//! must match the index count at compile time:
//!
//! ```rust
//! use nalgebra::{Matrix2, Vector2};
//! use subspace_measurement::{measurement, BoundIndices, BoundMeasurement};
//!
//! let m: BoundMeasurement<u32> = measurement!(
//!     5u32,
//!     Vector2::new(0.4, 1.2),
//!     Matrix2::identity();
//!     BoundIndices::Loc0,
//!     BoundIndices::Loc1
//! )
//! .unwrap();
//! assert_eq!(m.size(), 2);
//! ```
//!
//! Two indices with a three-component vector does not compile:
//!
//! ```compile_fail
//! use nalgebra::{Matrix2, Vector3};
//! use subspace_measurement::{measurement, BoundIndices, BoundMeasurement};
//!
//! let m: subspace_measurement::Result<BoundMeasurement<u32>> = measurement!(
//!     5u32,
//!     Vector3::new(0.4, 1.2, 3.0),
//!     Matrix2::identity();
//!     BoundIndices::Loc0,
//!     BoundIndices::Loc1
//! );
//! ```

use nalgebra::{SMatrix, SVector};

use crate::error::Result;
use crate::indices::ParameterIndices;
use crate::measurement::{Measurement, Scalar};
use crate::source_link::SourceLink;

/// Build a measurement, inferring `N` from the length of `indices`.
///
/// Function form of [`measurement!`](crate::measurement!).
pub fn make_measurement<L, I, const N: usize, const D: usize>(
    source_link: L,
    parameters: &SVector<Scalar, N>,
    covariance: &SMatrix<Scalar, N, N>,
    indices: [I; N],
) -> Result<Measurement<L, I, D>>
where
    L: SourceLink,
    I: ParameterIndices<D>,
{
    Measurement::new(source_link, indices, parameters, covariance)
}

/// Build a measurement from a token, a vector, a covariance and at least one index.
///
/// `measurement!(link, params, cov; i0, i1, ...)` borrows `params` and `cov`
/// and forwards to [`make_measurement`](crate::construct::make_measurement).
#[macro_export]
macro_rules! measurement {
    ($source_link:expr, $parameters:expr, $covariance:expr; $first:expr $(, $rest:expr)* $(,)?) => {
        $crate::construct::make_measurement(
            $source_link,
            &$parameters,
            &$covariance,
            [$first $(, $rest)*],
        )
    };
}
