// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! # subspace-measurement
//!
//! Allocation-free detector measurements of a variable-size subspace of a
//! fixed-size parameter space.
//!
//! ---
//!
//! ## The problem
//!
//! A tracking detector hit observes some components of a trajectory state:
//! one local coordinate for a strip, two for a pixel, sometimes a time.
//! Which components, and how many, varies hit by hit. Yet measurements are
//! created by the thousand per event, so they must not allocate, and the
//! code consuming them wants fixed-size linear algebra whenever it knows the
//! size.
//!
//! **Fixed capacity, variable size**: every [`Measurement`] holds a `D`
//! vector and a `D × D` matrix inline, and uses the front `n` / `n × n` of
//! them.
//!
//! **Two views, one buffer**: the same storage is exposed as a statically
//! sized nalgebra view (`parameters_fixed::<N>()`) and as a dynamically sized
//! one (`parameters()`). No copies; writes through either are seen by both.
//!
//! **Local ↔ full mapping**: [`SubspaceIndexSet`] pairs local position `i`
//! with full component `indices[i]`; [`Measurement::full_parameters`] and
//! [`Measurement::full_covariance`] scatter into the full space, and the
//! projection helpers gather back.
//!
//! ## The pipeline
//!
//! ```text
//! readout → SourceLink ─┐
//!                       ├→ Measurement ─→ MeasurementSequence
//! indices + values ─────┘        │
//!                                └→ full_parameters / full_covariance
//!                                └→ chi2 ─→ MeasurementSelector
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`indices`] | [`ParameterIndices`], [`BoundIndices`], [`FreeIndices`] | Name the full parameter space and fix `D` |
//! | [`source_link`] | [`SourceLink`], [`IndexSourceLink`] | Opaque identity token |
//! | [`subspace`] | [`SubspaceIndexSet`] | Ordered index set, expansion and projection |
//! | [`measurement`] | [`Measurement`], [`BoundMeasurement`], [`FreeMeasurement`] | The value type |
//! | [`construct`] | [`make_measurement`], [`measurement!`] | Build without spelling out `[I; N]` |
//! | [`container`] | [`MeasurementSequence`] | Append-only, insertion-ordered list |
//! | [`selector`] | [`MeasurementSelector`], [`SelectorCuts`] | χ² ranking against a prediction |
//! | [`error`] | [`MeasurementError`] | Recoverable errors |
//!
//! ## Two error tiers
//!
//! Caller bugs on a built measurement (wrong static view size, position of
//! an unmeasured index) trip debug assertions. Anything reachable from
//! external data (bad index lists, shape mismatches on the run-time
//! constructor, singular residual covariance) is a [`MeasurementError`].
//!
//! ## `no_std`
//!
//! This crate is `#![no_std]` by default and needs only `alloc`, for
//! [`MeasurementSequence`] and selection results. Enable `std` to switch the
//! dependencies to their `std` builds. Enable `serde` for serialisation of
//! every public value type.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

pub mod construct;
pub mod container;
pub mod error;
pub mod indices;
pub mod measurement;
pub mod selector;
pub mod source_link;
pub mod subspace;

pub use construct::make_measurement;
pub use container::MeasurementSequence;
pub use error::{MeasurementError, Result};
pub use indices::{
    BoundIndices, BoundSubspaceIndices, FreeIndices, ParameterIndices, BOUND_SIZE,
    BOUND_SUBSPACE_INDEX_INVALID, BOUND_SUBSPACE_INDICES_INVALID, FREE_SIZE,
};
pub use measurement::{
    BoundMeasurement, FreeMeasurement, FullCovarianceMatrix, FullParametersVector, Measurement,
    Scalar,
};
pub use selector::{Candidate, MeasurementSelector, SelectorCuts, Selection};
pub use source_link::{IndexSourceLink, SourceLink};
pub use subspace::SubspaceIndexSet;

/// Container of bound measurements, the common case in track finding.
pub type BoundMeasurementSequence<L> = MeasurementSequence<L, BoundIndices, BOUND_SIZE>;
