use image::{imageops, GrayImage};
use imageproc::contours::Contour;
use imageproc::distance_transform::Norm;
use imageproc::morphology;
use tracing::{debug, warn};

use crate::config::GlyphFilterConfig;
use crate::detection::contours::trace_contours;
use crate::detection::geometry::{fill_polygon, polygon_area};
use crate::detection::ocr::{DigitClassifier, DIGIT_ALPHABET};

/// Character recorded for a cell with no recognizable digit.
pub const EMPTY_CELL: char = '0';

/// Pick the contours that survive the noise heuristic.
///
/// Contours are ranked by area, largest first (ties keep trace order).
/// Above `blank_contour_threshold` nothing survives; above
/// `slice_contour_threshold` only ranks `slice_start..slice_end` survive;
/// otherwise everything does.
pub fn select_glyph_contours(
    contours: Vec<Contour<i32>>,
    config: &GlyphFilterConfig,
) -> Vec<Contour<i32>> {
    let count = contours.len();
    if count > config.blank_contour_threshold {
        return Vec::new();
    }

    let mut ranked: Vec<(f64, Contour<i32>)> = contours
        .into_iter()
        .map(|c| (polygon_area(&c.points), c))
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    if count > config.slice_contour_threshold {
        let start = config.slice_start.min(count);
        let end = config.slice_end.min(count);
        ranked.drain(start..end).map(|(_, c)| c).collect()
    } else {
        ranked.into_iter().map(|(_, c)| c).collect()
    }
}

/// Trace a cell crop as if it sat on a one-pixel black frame.
///
/// Crops are cut flush to the cell box, so the cell's own foreground
/// touches the crop edge. Framing it first makes the tracer report that
/// region's outer border too. Points come back in crop coordinates.
pub fn trace_cell_contours(cell: &GrayImage) -> Vec<Contour<i32>> {
    let mut framed = GrayImage::new(cell.width() + 2, cell.height() + 2);
    imageops::replace(&mut framed, cell, 1, 1);

    let mut contours = trace_contours(&framed);
    for contour in &mut contours {
        for p in &mut contour.points {
            p.x -= 1;
            p.y -= 1;
        }
    }
    contours
}

/// Denoise a binary cell crop: keep the selected contours, redraw them
/// filled on a black canvas and thicken the strokes by dilation.
pub fn isolate_glyph(cell: &GrayImage, config: &GlyphFilterConfig) -> GrayImage {
    let contours = trace_cell_contours(cell);
    let total = contours.len();
    let kept = select_glyph_contours(contours, config);
    debug!(total, kept = kept.len(), "selected glyph contours");

    let mut canvas = GrayImage::new(cell.width(), cell.height());
    for contour in &kept {
        fill_polygon(&mut canvas, &contour.points);
    }
    if config.dilation_radius == 0 {
        return canvas;
    }
    morphology::dilate(&canvas, Norm::LInf, config.dilation_radius)
}

/// Map a classifier answer onto a board character. Anything outside the
/// digit alphabet counts as an empty cell.
pub fn to_cell_char(answer: Option<char>) -> char {
    match answer {
        Some(ch) if DIGIT_ALPHABET.contains(&ch) => ch,
        _ => EMPTY_CELL,
    }
}

/// Classify one cell crop as `'0'` (empty) or a digit `'1'..='9'`.
///
/// Classifier errors are logged and recorded as an empty cell.
pub fn classify_cell(
    cell: &GrayImage,
    config: &GlyphFilterConfig,
    classifier: &dyn DigitClassifier,
) -> char {
    let glyph = isolate_glyph(cell, config);
    classify_glyph(&glyph, classifier)
}

/// Run the classifier on an already isolated glyph.
pub fn classify_glyph(glyph: &GrayImage, classifier: &dyn DigitClassifier) -> char {
    match classifier.classify(glyph, DIGIT_ALPHABET) {
        Ok(answer) => to_cell_char(answer),
        Err(e) => {
            warn!(classifier = classifier.name(), error = %e, "cell classification failed, recording as empty");
            EMPTY_CELL
        }
    }
}
