use image::GrayImage;
use imageproc::contours::{find_contours, Contour};
use tracing::debug;

use crate::config::LocatorConfig;
use crate::error::{RecognitionError, Result};
use crate::models::{BoundingBox, CellCandidate};

/// Trace every border in a binary image, outer and hole alike.
pub fn trace_contours(binary: &GrayImage) -> Vec<Contour<i32>> {
    find_contours::<i32>(binary)
}

/// Measure every contour and keep the ones shaped like a grid cell.
pub fn find_cell_candidates(binary: &GrayImage, config: &LocatorConfig) -> Vec<CellCandidate> {
    let (min_area, max_area) = config.area.resolve(binary.width(), binary.height());
    let contours = trace_contours(binary);
    let total = contours.len();

    let accepted: Vec<CellCandidate> = contours
        .into_iter()
        .filter_map(|c| CellCandidate::measure(c, config.epsilon_fraction))
        .filter(|c| c.is_cell_shaped(min_area, max_area, config.min_aspect, config.max_aspect))
        .collect();

    debug!(
        total,
        accepted = accepted.len(),
        min_area,
        max_area,
        "filtered contours by cell geometry"
    );
    accepted
}

/// Bounding boxes of every cell in the grid, in discovery order.
///
/// Fails with `GridNotFound` unless exactly `expected_cells` contours pass
/// the geometry filter.
pub fn locate_cells(binary: &GrayImage, config: &LocatorConfig) -> Result<Vec<BoundingBox>> {
    let candidates = find_cell_candidates(binary, config);
    if candidates.len() != config.expected_cells {
        return Err(RecognitionError::GridNotFound {
            found: candidates.len(),
            expected: config.expected_cells,
        });
    }
    Ok(candidates.into_iter().map(|c| c.bbox).collect())
}
