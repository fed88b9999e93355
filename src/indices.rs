// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameter-index enumerations: the full parameter spaces measurements live in.
//!
//! A measurement never stores the enumeration itself, only the raw `u8`
//! positions of its measured components. The enumeration fixes two things at
//! the type level: the full dimension `D` and which names the components have.
//!
//! # Implementing for a new parametrisation
//!
//! ```rust
//! use subspace_measurement::indices::ParameterIndices;
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq)]
//! pub enum StripIndices {
//!     Position,
//!     Time,
//! }
//!
//! impl ParameterIndices<2> for StripIndices {
//!     fn to_index(self) -> u8 {
//!         self as u8
//!     }
//!
//!     fn from_index(index: u8) -> Option<Self> {
//!         match index {
//!             0 => Some(Self::Position),
//!             1 => Some(Self::Time),
//!             _ => None,
//!         }
//!     }
//! }
//! // Now Measurement<L, StripIndices, 2> works with the full crate.
//! ```

use core::fmt::Debug;

/// A named enumeration of the components of a fixed-size parameter space.
///
/// The const generic `D` is the full dimension. Every value returned by
/// [`ParameterIndices::to_index`] must be `< D`, and `from_index` must invert it.
pub trait ParameterIndices<const D: usize>: Copy + Eq + Debug {
    /// Full dimension of the parameter space (equal to the const generic `D`).
    const FULL_SIZE: usize = D;

    /// Position of this component in the full parameter vector.
    fn to_index(self) -> u8;

    /// Component at `index`, or `None` if `index >= D`.
    fn from_index(index: u8) -> Option<Self>;
}

/// Raw indices work for any full dimension.
impl<const D: usize> ParameterIndices<D> for u8 {
    fn to_index(self) -> u8 {
        self
    }

    fn from_index(index: u8) -> Option<Self> {
        ((index as usize) < D).then_some(index)
    }
}

// ─── Bound parameters ────────────────────────────────────────────────────────

/// Dimension of the bound (surface-local) parameter space.
pub const BOUND_SIZE: usize = 6;

/// Components of a trajectory expressed on a reference surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum BoundIndices {
    /// First local coordinate on the surface.
    Loc0 = 0,
    /// Second local coordinate on the surface.
    Loc1 = 1,
    /// Azimuthal direction angle.
    Phi = 2,
    /// Polar direction angle.
    Theta = 3,
    /// Charge over momentum.
    QOverP = 4,
    /// Time.
    Time = 5,
}

impl ParameterIndices<BOUND_SIZE> for BoundIndices {
    fn to_index(self) -> u8 {
        self as u8
    }

    fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Loc0),
            1 => Some(Self::Loc1),
            2 => Some(Self::Phi),
            3 => Some(Self::Theta),
            4 => Some(Self::QOverP),
            5 => Some(Self::Time),
            _ => None,
        }
    }
}

/// Dense, fixed-width subspace index array for the bound space.
///
/// Slots past the measured size hold [`BOUND_SUBSPACE_INDEX_INVALID`].
pub type BoundSubspaceIndices = [u8; BOUND_SIZE];

/// Sentinel marking an unused slot in [`BoundSubspaceIndices`].
pub const BOUND_SUBSPACE_INDEX_INVALID: u8 = BOUND_SIZE as u8;

/// A [`BoundSubspaceIndices`] with every slot unused.
pub const BOUND_SUBSPACE_INDICES_INVALID: BoundSubspaceIndices =
    [BOUND_SUBSPACE_INDEX_INVALID; BOUND_SIZE];

// ─── Free parameters ─────────────────────────────────────────────────────────

/// Dimension of the free (global) parameter space.
pub const FREE_SIZE: usize = 8;

/// Components of a trajectory expressed in global coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FreeIndices {
    /// Global x position.
    Pos0 = 0,
    /// Global y position.
    Pos1 = 1,
    /// Global z position.
    Pos2 = 2,
    /// Time.
    Time = 3,
    /// Direction x component.
    Dir0 = 4,
    /// Direction y component.
    Dir1 = 5,
    /// Direction z component.
    Dir2 = 6,
    /// Charge over momentum.
    QOverP = 7,
}

impl ParameterIndices<FREE_SIZE> for FreeIndices {
    fn to_index(self) -> u8 {
        self as u8
    }

    fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Pos0),
            1 => Some(Self::Pos1),
            2 => Some(Self::Pos2),
            3 => Some(Self::Time),
            4 => Some(Self::Dir0),
            5 => Some(Self::Dir1),
            6 => Some(Self::Dir2),
            7 => Some(Self::QOverP),
            _ => None,
        }
    }
}
