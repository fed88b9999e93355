// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Identity tokens linking a measurement back to its detector readout.
//!
//! The crate stores the token by value and never looks inside it. Any type
//! with value semantics and a total order qualifies; the order belongs to the
//! token's owner and is never used to order measurements.

use core::fmt::Debug;

/// Bound satisfied by every identity token a measurement can carry.
///
/// Blanket-implemented; there is nothing to implement by hand.
pub trait SourceLink: Clone + Eq + Ord + Debug {}

impl<T: Clone + Eq + Ord + Debug> SourceLink for T {}

/// Reference token: a detector element identifier plus a hit index.
///
/// Orders by `geometry_id` first, then `index`, so that tokens from one
/// element are contiguous when a caller sorts them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexSourceLink {
    /// Opaque identifier of the detector element that produced the hit.
    pub geometry_id: u64,
    /// Position of the hit in the readout of that element.
    pub index: u32,
}

impl IndexSourceLink {
    /// Create a token for hit `index` on element `geometry_id`.
    pub fn new(geometry_id: u64, index: u32) -> Self {
        Self { geometry_id, index }
    }
}
