use crate::models::BoundingBox;

/// Mean box height, the row-bucket size used by [`order_cells`].
pub fn average_height(boxes: &[BoundingBox]) -> f64 {
    if boxes.is_empty() {
        return 0.0;
    }
    boxes.iter().map(|b| b.height as f64).sum::<f64>() / boxes.len() as f64
}

/// Sort cell boxes into row-major order.
///
/// Each box gets the row bucket `floor(y / average_height)`; boxes sort by
/// bucket, then by `x`. The sort is stable, so exact ties keep discovery
/// order. This assumes a roughly upright capture: a rotated grid spreads a
/// row across several buckets and the order comes out wrong.
pub fn order_cells(boxes: Vec<BoundingBox>) -> Vec<BoundingBox> {
    let avg = average_height(&boxes);
    if avg <= 0.0 {
        return boxes;
    }
    let mut keyed: Vec<(u64, u32, BoundingBox)> = boxes
        .into_iter()
        .map(|b| (((b.y as f64) / avg).floor() as u64, b.x, b))
        .collect();
    keyed.sort_by_key(|&(row, x, _)| (row, x));
    keyed.into_iter().map(|(_, _, b)| b).collect()
}
