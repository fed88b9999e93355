// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Recoverable error tier for measurement construction and selection.
//!
//! Caller bugs on an already-built measurement (asking for the position of an
//! index that is not measured, requesting a static view of the wrong size)
//! are contract violations and are caught by debug assertions instead.
//! Everything here can be triggered by externally sourced data and is
//! returned as a value.

use thiserror::Error;

/// Errors reported while building or evaluating measurements.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementError {
    /// A measurement must observe at least one parameter.
    #[error("subspace must contain at least one index")]
    EmptySubspace,

    /// More indices than the full parameter space has components.
    #[error("subspace has {count} indices but the full space has only {max}")]
    TooManyIndices {
        /// Number of indices supplied.
        count: usize,
        /// Full dimension of the parameter space.
        max: usize,
    },

    /// An index does not address a component of the full space.
    #[error("index {index} is out of range for a {size}-dimensional parameter space")]
    IndexOutOfRange {
        /// The offending index.
        index: u8,
        /// Full dimension of the parameter space.
        size: usize,
    },

    /// Indices must be strictly increasing (which also rules out duplicates).
    #[error("index {index} at position {position} does not follow its predecessor in increasing order")]
    IndicesNotIncreasing {
        /// Position of the offending index in the supplied list.
        position: usize,
        /// The offending index.
        index: u8,
    },

    /// The parameter vector does not have shape `expected × 1`.
    #[error("parameter vector is {rows}x{cols}, expected {expected}x1")]
    ParametersShape {
        /// Number of subspace indices.
        expected: usize,
        /// Rows of the supplied vector.
        rows: usize,
        /// Columns of the supplied vector.
        cols: usize,
    },

    /// The covariance matrix does not have shape `expected × expected`.
    #[error("covariance matrix is {rows}x{cols}, expected {expected}x{expected}")]
    CovarianceShape {
        /// Number of subspace indices.
        expected: usize,
        /// Rows of the supplied matrix.
        rows: usize,
        /// Columns of the supplied matrix.
        cols: usize,
    },

    /// The combined measurement and predicted covariance is not positive definite.
    #[error("residual covariance is not positive definite")]
    SingularResidualCovariance,

    /// Selection found no candidate with a usable χ², including the empty list.
    #[error("no usable candidate measurements to select from")]
    NoCandidates,
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, MeasurementError>;
