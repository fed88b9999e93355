// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Insertion-ordered measurement sequence.
//!
//! Measurements are not orderable: the tokens inside them are opaque here, so
//! the sequence never sorts, deduplicates or indexes its contents. It is an
//! append-only list whose iteration order is the order of `push` calls.
//!
//! Requires `alloc`; the rest of the crate does not.

use alloc::vec::Vec;
use core::ops::Index;

use crate::indices::ParameterIndices;
use crate::measurement::Measurement;

/// Growable, append-only list of measurements.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasurementSequence<L, I, const D: usize>
where
    I: ParameterIndices<D>,
{
    measurements: Vec<Measurement<L, I, D>>,
}

impl<L, I, const D: usize> MeasurementSequence<L, I, D>
where
    I: ParameterIndices<D>,
{
    /// Empty sequence.
    pub fn new() -> Self {
        Self { measurements: Vec::new() }
    }

    /// Empty sequence with room for `capacity` measurements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { measurements: Vec::with_capacity(capacity) }
    }

    /// Append a measurement and return its position.
    pub fn push(&mut self, measurement: Measurement<L, I, D>) -> usize {
        self.measurements.push(measurement);
        self.measurements.len() - 1
    }

    /// Number of stored measurements.
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    /// True when nothing has been pushed.
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Measurement at `position`, if any.
    pub fn get(&self, position: usize) -> Option<&Measurement<L, I, D>> {
        self.measurements.get(position)
    }

    /// Mutable measurement at `position`, if any.
    pub fn get_mut(&mut self, position: usize) -> Option<&mut Measurement<L, I, D>> {
        self.measurements.get_mut(position)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> core::slice::Iter<'_, Measurement<L, I, D>> {
        self.measurements.iter()
    }

    /// Iterate mutably in insertion order.
    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, Measurement<L, I, D>> {
        self.measurements.iter_mut()
    }

    /// All measurements as a slice.
    pub fn as_slice(&self) -> &[Measurement<L, I, D>] {
        &self.measurements
    }
}

impl<L, I, const D: usize> Default for MeasurementSequence<L, I, D>
where
    I: ParameterIndices<D>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<L, I, const D: usize> Index<usize> for MeasurementSequence<L, I, D>
where
    I: ParameterIndices<D>,
{
    type Output = Measurement<L, I, D>;

    fn index(&self, position: usize) -> &Self::Output {
        &self.measurements[position]
    }
}

impl<L, I, const D: usize> Extend<Measurement<L, I, D>> for MeasurementSequence<L, I, D>
where
    I: ParameterIndices<D>,
{
    fn extend<T: IntoIterator<Item = Measurement<L, I, D>>>(&mut self, iter: T) {
        self.measurements.extend(iter);
    }
}

impl<L, I, const D: usize> FromIterator<Measurement<L, I, D>> for MeasurementSequence<L, I, D>
where
    I: ParameterIndices<D>,
{
    fn from_iter<T: IntoIterator<Item = Measurement<L, I, D>>>(iter: T) -> Self {
        Self { measurements: iter.into_iter().collect() }
    }
}

impl<L, I, const D: usize> IntoIterator for MeasurementSequence<L, I, D>
where
    I: ParameterIndices<D>,
{
    type Item = Measurement<L, I, D>;
    type IntoIter = alloc::vec::IntoIter<Measurement<L, I, D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.measurements.into_iter()
    }
}

impl<'a, L, I, const D: usize> IntoIterator for &'a MeasurementSequence<L, I, D>
where
    I: ParameterIndices<D>,
{
    type Item = &'a Measurement<L, I, D>;
    type IntoIter = core::slice::Iter<'a, Measurement<L, I, D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.measurements.iter()
    }
}
