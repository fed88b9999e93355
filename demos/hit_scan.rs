// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! # Hit Scan
//!
//! Builds the hits of a small four-layer detector, a pixel layer pair
//! followed by a strip layer pair, and walks a straight-line prediction
//! through them. On each layer the selector picks the compatible hit and the
//! picked measurements are printed in full-space form.

use nalgebra::{Matrix1, Matrix2, SMatrix, SVector, Vector1, Vector2};
use subspace_measurement::{
    measurement, BoundIndices, BoundMeasurement, BoundMeasurementSequence, IndexSourceLink,
    MeasurementSelector, Result, SelectorCuts, BOUND_SIZE,
};

// ── Detector ─────────────────────────────────────────────────────────────────

const PIXEL_SIGMA: f64 = 0.01;
const STRIP_SIGMA: f64 = 0.05;

/// True local position of the track on layer `layer`.
fn track_loc(layer: u64) -> (f64, f64) {
    (0.1 * layer as f64, -0.05 * layer as f64)
}

fn pixel(layer: u64, index: u32, loc0: f64, loc1: f64) -> Result<BoundMeasurement<IndexSourceLink>> {
    let var = PIXEL_SIGMA * PIXEL_SIGMA;
    measurement!(
        IndexSourceLink::new(layer, index),
        Vector2::new(loc0, loc1),
        Matrix2::new(var, 0.0, 0.0, var);
        BoundIndices::Loc0,
        BoundIndices::Loc1
    )
}

fn strip(layer: u64, index: u32, loc0: f64) -> Result<BoundMeasurement<IndexSourceLink>> {
    measurement!(
        IndexSourceLink::new(layer, index),
        Vector1::new(loc0),
        Matrix1::new(STRIP_SIGMA * STRIP_SIGMA);
        BoundIndices::Loc0
    )
}

/// One true hit plus two noise hits per layer.
fn layer_hits(layer: u64) -> Result<BoundMeasurementSequence<IndexSourceLink>> {
    let (loc0, loc1) = track_loc(layer);
    let mut hits = BoundMeasurementSequence::with_capacity(3);
    if layer < 2 {
        hits.push(pixel(layer, 0, loc0 + 0.8, loc1 - 0.3)?);
        hits.push(pixel(layer, 1, loc0 + 0.004, loc1 - 0.006)?);
        hits.push(pixel(layer, 2, loc0 - 1.1, loc1 + 0.9)?);
    } else {
        hits.push(strip(layer, 0, loc0 - 0.9)?);
        hits.push(strip(layer, 1, loc0 + 2.4)?);
        hits.push(strip(layer, 2, loc0 + 0.03)?);
    }
    Ok(hits)
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let selector = MeasurementSelector::new(SelectorCuts {
        chi2_cut_off: 9.0,
        num_measurements_cut_off: 1,
    });
    let predicted_cov = SMatrix::<f64, BOUND_SIZE, BOUND_SIZE>::identity() * 1e-3;

    println!("=== hit scan ===\n");
    for layer in 0..4u64 {
        let hits = layer_hits(layer)?;
        let (loc0, loc1) = track_loc(layer);
        let predicted =
            SVector::<f64, BOUND_SIZE>::from_row_slice(&[loc0, loc1, 0.0, 0.0, 0.0, 0.0]);

        let selection = match selector.select(hits.as_slice(), &predicted, &predicted_cov) {
            Ok(selection) => selection,
            Err(err) => {
                println!("layer {layer}: selection failed: {err}");
                continue;
            }
        };

        for candidate in &selection.candidates {
            let hit = &hits[candidate.position];
            println!(
                "layer {layer}: hit {} ({}D) chi2 = {:.3}{}",
                hit.source_link().index,
                hit.size(),
                candidate.chi2,
                if selection.is_outlier { "  [outlier]" } else { "" },
            );
            println!("  local       {:?}", hit.parameters().iter().collect::<Vec<_>>());
            println!("  full        {:?}", hit.full_parameters().as_slice());
            println!("  bound index {:?}", hit.bound_subspace_indices());
        }
    }
    Ok(())
}
