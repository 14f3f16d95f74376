use image::{GrayImage, Luma};
use imageproc::drawing::draw_line_segment_mut;
use imageproc::point::Point;

/// Length of the closed polyline through `points`.
pub fn closed_perimeter(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    let mut perimeter = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        let dx = (points[j].x - points[i].x) as f64;
        let dy = (points[j].y - points[i].y) as f64;
        perimeter += (dx * dx + dy * dy).sqrt();
    }
    perimeter
}

/// Unsigned polygon area by the shoelace formula. Zero for fewer than three
/// points.
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area: i64 = 0;
    for i in 0..n {
        let j = (i + 1) % n;
        twice_area += points[i].x as i64 * points[j].y as i64;
        twice_area -= points[j].x as i64 * points[i].y as i64;
    }
    twice_area.abs() as f64 / 2.0
}

/// Douglas-Peucker simplification of a closed curve.
///
/// The curve is split at the first point and the point farthest from it, and
/// each half is simplified as an open polyline.
pub fn approx_poly_dp(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let origin = points[0];
    let mut far = 0;
    let mut far_dist = -1.0;
    for (i, p) in points.iter().enumerate().skip(1) {
        let dx = (p.x - origin.x) as f64;
        let dy = (p.y - origin.y) as f64;
        let d = dx * dx + dy * dy;
        if d > far_dist {
            far_dist = d;
            far = i;
        }
    }
    if far_dist <= 0.0 {
        return vec![origin];
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[far] = true;
    mark_open(points, 0, far, epsilon, &mut keep);

    // Second half wraps back to the first point.
    let mut tail: Vec<Point<i32>> = points[far..].to_vec();
    tail.push(origin);
    let mut tail_keep = vec![false; tail.len()];
    mark_open(&tail, 0, tail.len() - 1, epsilon, &mut tail_keep);
    for (offset, k) in tail_keep.iter().enumerate().take(tail.len() - 1) {
        if *k {
            keep[far + offset] = true;
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| if k { Some(*p) } else { None })
        .collect()
}

fn mark_open(points: &[Point<i32>], start: usize, end: usize, epsilon: f64, keep: &mut [bool]) {
    let mut stack = vec![(start, end)];
    while let Some((s, e)) = stack.pop() {
        if e <= s + 1 {
            continue;
        }
        let mut max_dist = 0.0;
        let mut max_index = s;
        for i in (s + 1)..e {
            let d = point_to_segment_distance(points[i], points[s], points[e]);
            if d > max_dist {
                max_dist = d;
                max_index = i;
            }
        }
        if max_dist > epsilon {
            keep[max_index] = true;
            stack.push((s, max_index));
            stack.push((max_index, e));
        }
    }
}

fn point_to_segment_distance(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let (px, py) = (p.x as f64, p.y as f64);
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (bx, by) = (b.x as f64, b.y as f64);
    let (dx, dy) = (bx - ax, by - ay);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }
    let t = (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0);
    let (cx, cy) = (ax + t * dx, ay + t * dy);
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

/// Paint the closed polygon through `points` solid white, boundary pixels
/// included. Pixels outside the canvas are ignored.
pub fn fill_polygon(canvas: &mut GrayImage, points: &[Point<i32>]) {
    let n = points.len();
    if n == 0 {
        return;
    }
    let (width, height) = (canvas.width() as i32, canvas.height() as i32);
    for p in points {
        if p.x >= 0 && p.y >= 0 && p.x < width && p.y < height {
            canvas.put_pixel(p.x as u32, p.y as u32, Luma([255u8]));
        }
    }
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        draw_line_segment_mut(
            canvas,
            (a.x as f32, a.y as f32),
            (b.x as f32, b.y as f32),
            Luma([255u8]),
        );
    }
    if n < 3 {
        return;
    }

    let min_y = points.iter().map(|p| p.y).min().unwrap_or(0);
    let max_y = points.iter().map(|p| p.y).max().unwrap_or(-1);
    let mut crossings: Vec<f64> = Vec::new();

    // Even-odd scanline fill through pixel centres. Half-open edges keep the
    // crossing count even.
    for y in min_y..=max_y {
        crossings.clear();
        for i in 0..n {
            let a = points[i];
            let b = points[(i + 1) % n];
            if (a.y <= y && b.y > y) || (b.y <= y && a.y > y) {
                let t = (y - a.y) as f64 / (b.y - a.y) as f64;
                crossings.push(a.x as f64 + t * (b.x - a.x) as f64);
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));
        for pair in crossings.chunks_exact(2) {
            let x0 = pair[0].ceil() as i32;
            let x1 = pair[1].floor() as i32;
            if y < 0 || y >= height {
                continue;
            }
            for x in x0.max(0)..=x1.min(width - 1) {
                canvas.put_pixel(x as u32, y as u32, Luma([255u8]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(i32, i32)]) -> Vec<Point<i32>> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_area_of_triangle() {
        assert_eq!(polygon_area(&pts(&[(0, 0), (4, 0), (0, 3)])), 6.0);
    }

    #[test]
    fn test_area_ignores_orientation() {
        let ccw = pts(&[(0, 0), (0, 3), (4, 0)]);
        assert_eq!(polygon_area(&ccw), 6.0);
    }

    #[test]
    fn test_degenerate_area_is_zero() {
        assert_eq!(polygon_area(&pts(&[(0, 0), (5, 5)])), 0.0);
    }

    #[test]
    fn test_perimeter_of_square() {
        assert_eq!(closed_perimeter(&pts(&[(0, 0), (10, 0), (10, 10), (0, 10)])), 40.0);
    }

    #[test]
    fn test_dp_drops_collinear_points() {
        let square = pts(&[
            (0, 0),
            (5, 0),
            (10, 0),
            (10, 5),
            (10, 10),
            (5, 10),
            (0, 10),
            (0, 5),
        ]);
        let simplified = approx_poly_dp(&square, 1.0);
        assert_eq!(simplified, pts(&[(0, 0), (10, 0), (10, 10), (0, 10)]));
    }

    #[test]
    fn test_dp_keeps_small_curves_with_zero_epsilon() {
        let tri = pts(&[(0, 0), (3, 0), (0, 3)]);
        assert_eq!(approx_poly_dp(&tri, 0.0), tri);
    }

    #[test]
    fn test_fill_square_covers_interior_and_border() {
        let mut canvas = GrayImage::new(10, 10);
        fill_polygon(&mut canvas, &pts(&[(2, 2), (6, 2), (6, 6), (2, 6)]));
        let lit = canvas.pixels().filter(|p| p[0] == 255).count();
        assert_eq!(lit, 25);
        assert_eq!(canvas.get_pixel(4, 4)[0], 255);
        assert_eq!(canvas.get_pixel(7, 4)[0], 0);
    }

    #[test]
    fn test_fill_clips_to_canvas() {
        let mut canvas = GrayImage::new(4, 4);
        fill_polygon(&mut canvas, &pts(&[(-2, -2), (10, -2), (10, 10), (-2, 10)]));
        assert!(canvas.pixels().all(|p| p[0] == 255));
    }
}
