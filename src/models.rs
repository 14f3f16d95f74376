use image::GrayImage;
use imageproc::contours::Contour;
use imageproc::point::Point;

use crate::detection::geometry;

/// Axis-aligned rectangle in image coordinates. Width and height count
/// pixels, so a single pixel has size 1x1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Smallest box enclosing every point. `None` for an empty slice or
    /// points at negative coordinates.
    pub fn from_points(points: &[Point<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        if min_x < 0 || min_y < 0 {
            return None;
        }
        Some(Self {
            x: min_x as u32,
            y: min_y as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Crop this box out of `img`, clamped to the image bounds.
    pub fn crop(&self, img: &GrayImage) -> GrayImage {
        let x = self.x.min(img.width());
        let y = self.y.min(img.height());
        let width = self.width.min(img.width() - x);
        let height = self.height.min(img.height() - y);
        image::imageops::crop_imm(img, x, y, width, height).to_image()
    }
}

/// A traced contour with the measurements used to decide whether it is a
/// grid cell.
#[derive(Debug, Clone)]
pub struct CellCandidate {
    pub contour: Contour<i32>,
    pub area: f64,
    pub perimeter: f64,
    /// Bounding box of the simplified polygon.
    pub approx_bbox: BoundingBox,
    /// Bounding box of the raw contour points.
    pub bbox: BoundingBox,
}

impl CellCandidate {
    /// Measure a contour. `epsilon_fraction` scales the perimeter into the
    /// polygon simplification tolerance.
    pub fn measure(contour: Contour<i32>, epsilon_fraction: f64) -> Option<Self> {
        let bbox = BoundingBox::from_points(&contour.points)?;
        let perimeter = geometry::closed_perimeter(&contour.points);
        let approx = geometry::approx_poly_dp(&contour.points, epsilon_fraction * perimeter);
        let approx_bbox = BoundingBox::from_points(&approx)?;
        let area = geometry::polygon_area(&contour.points);
        Some(Self {
            contour,
            area,
            perimeter,
            approx_bbox,
            bbox,
        })
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.approx_bbox.aspect_ratio()
    }

    /// True when the area lies strictly inside `(min_area, max_area)` and the
    /// aspect ratio inside `[min_aspect, max_aspect]`.
    pub fn is_cell_shaped(&self, min_area: f64, max_area: f64, min_aspect: f64, max_aspect: f64) -> bool {
        let aspect = self.aspect_ratio();
        min_area < self.area && self.area < max_area && aspect >= min_aspect && aspect <= max_aspect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::contours::BorderType;

    fn rect_points(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Point<i32>> {
        let mut pts = Vec::new();
        for x in x0..=x1 {
            pts.push(Point::new(x, y0));
        }
        for y in y0 + 1..=y1 {
            pts.push(Point::new(x1, y));
        }
        for x in (x0..x1).rev() {
            pts.push(Point::new(x, y1));
        }
        for y in (y0 + 1..y1).rev() {
            pts.push(Point::new(x0, y));
        }
        pts
    }

    #[test]
    fn test_bbox_is_pixel_inclusive() {
        let bbox = BoundingBox::from_points(&rect_points(10, 20, 19, 24)).unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                x: 10,
                y: 20,
                width: 10,
                height: 5
            }
        );
    }

    #[test]
    fn test_bbox_of_empty_is_none() {
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_measure_square_border() {
        let contour = Contour::new(rect_points(0, 0, 67, 67), BorderType::Outer, None);
        let candidate = CellCandidate::measure(contour, 0.03).unwrap();
        assert_eq!(candidate.area, 67.0 * 67.0);
        assert_eq!(candidate.perimeter, 4.0 * 67.0);
        assert_eq!(candidate.approx_bbox, candidate.bbox);
        assert_eq!(candidate.aspect_ratio(), 1.0);
        assert!(candidate.is_cell_shaped(4200.0, 5000.0, 0.8, 1.2));
        assert!(!candidate.is_cell_shaped(4489.0, 5000.0, 0.8, 1.2));
    }

    #[test]
    fn test_wide_rectangle_fails_aspect() {
        let contour = Contour::new(rect_points(0, 0, 99, 49), BorderType::Outer, None);
        let candidate = CellCandidate::measure(contour, 0.03).unwrap();
        assert!(!candidate.is_cell_shaped(0.0, 1e9, 0.8, 1.2));
    }

    #[test]
    fn test_crop_clamps_to_image() {
        let img = GrayImage::new(10, 10);
        let bbox = BoundingBox {
            x: 8,
            y: 8,
            width: 5,
            height: 5,
        };
        assert_eq!(bbox.crop(&img).dimensions(), (2, 2));
    }
}
