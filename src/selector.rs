// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! χ²-based selection of compatible measurements.
//!
//! Given a predicted full-space state and a handful of candidate
//! measurements (typically every hit on the surface the prediction reached),
//! the selector ranks candidates by their χ² distance and keeps the best
//! ones that pass the cut.
//!
//! # Rules
//!
//! 1. Compute χ² for every candidate; skip candidates whose residual
//!    covariance is not positive definite.
//! 2. If even the best χ² exceeds [`SelectorCuts::chi2_cut_off`], return that
//!    single best candidate flagged as an outlier.
//! 3. Otherwise keep candidates with `χ² ≤ cut`, ordered by ascending χ²
//!    (ties keep input order), at most
//!    [`SelectorCuts::num_measurements_cut_off`] of them.

use alloc::vec::Vec;

use tracing::{debug, trace};

use crate::error::{MeasurementError, Result};
use crate::indices::ParameterIndices;
use crate::measurement::{FullCovarianceMatrix, FullParametersVector, Measurement, Scalar};
use crate::source_link::SourceLink;

// ─── Config ───────────────────────────────────────────────────────────────────

/// Cuts applied by [`MeasurementSelector`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectorCuts {
    /// Maximum χ² for a candidate to count as compatible.
    /// Default: 15.0.
    pub chi2_cut_off: Scalar,

    /// Maximum number of compatible candidates returned; 0 behaves like 1.
    /// Default: 1.
    pub num_measurements_cut_off: usize,
}

impl Default for SelectorCuts {
    fn default() -> Self {
        Self {
            chi2_cut_off: 15.0,
            num_measurements_cut_off: 1,
        }
    }
}

// ─── Selection ────────────────────────────────────────────────────────────────

/// One ranked candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate {
    /// Position of the measurement in the slice passed to `select`.
    pub position: usize,
    /// χ² distance to the prediction.
    pub chi2: Scalar,
}

/// Result of a selection pass.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selection {
    /// Selected candidates, best first.
    pub candidates: Vec<Candidate>,
    /// True when no candidate passed the cut and the best one was kept anyway.
    pub is_outlier: bool,
}

// ─── MeasurementSelector ──────────────────────────────────────────────────────

/// Ranks candidate measurements against a prediction.
#[derive(Clone, Debug, Default)]
pub struct MeasurementSelector {
    cuts: SelectorCuts,
}

impl MeasurementSelector {
    /// Selector applying `cuts`.
    pub fn new(cuts: SelectorCuts) -> Self {
        Self { cuts }
    }

    /// The cuts in use.
    pub fn cuts(&self) -> &SelectorCuts {
        &self.cuts
    }

    /// Select the measurements compatible with `predicted`.
    ///
    /// A candidate whose residual covariance is not positive definite has no
    /// usable χ² and is skipped. Fails with [`MeasurementError::NoCandidates`]
    /// when the list is empty or no candidate is usable.
    pub fn select<L, I, const D: usize>(
        &self,
        measurements: &[Measurement<L, I, D>],
        predicted: &FullParametersVector<D>,
        predicted_covariance: &FullCovarianceMatrix<D>,
    ) -> Result<Selection>
    where
        L: SourceLink,
        I: ParameterIndices<D>,
    {
        let mut candidates = Vec::with_capacity(measurements.len());
        for (position, measurement) in measurements.iter().enumerate() {
            match measurement.chi2(predicted, predicted_covariance) {
                Ok(chi2) => {
                    trace!(position, chi2, "candidate");
                    candidates.push(Candidate { position, chi2 });
                }
                Err(err) => debug!(position, %err, "skipping candidate without a usable chi2"),
            }
        }

        // Stable sort keeps input order among equal χ².
        candidates.sort_by(|a, b| a.chi2.total_cmp(&b.chi2));

        let Some(&best) = candidates.first() else {
            return Err(MeasurementError::NoCandidates);
        };
        if best.chi2 > self.cuts.chi2_cut_off {
            debug!(
                position = best.position,
                chi2 = best.chi2,
                cut = self.cuts.chi2_cut_off,
                "no candidate passed the cut, keeping best as outlier"
            );
            return Ok(Selection {
                candidates: alloc::vec![best],
                is_outlier: true,
            });
        }

        candidates.retain(|c| c.chi2 <= self.cuts.chi2_cut_off);
        candidates.truncate(self.cuts.num_measurements_cut_off.max(1));
        Ok(Selection {
            candidates,
            is_outlier: false,
        })
    }
}
