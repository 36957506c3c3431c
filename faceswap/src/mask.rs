//! Coverage masks for triangles and the hull polygon.

use crate::point_set::Point;
use crate::rectangle::Rectangle;

/// Per-pixel weights in `[0, 1]` (row-major storage).
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    /// Width of the mask.
    pub width: usize,
    /// Height of the mask.
    pub height: usize,
    /// Weight values 0.0-1.0.
    pub data: Vec<f32>,
}

impl Mask {
    /// Create a new mask filled with 0.0 (nothing covered).
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    /// Rasterises a convex polygon into a `width` × `height` mask.
    ///
    /// A pixel is covered when its integer coordinate lies inside the polygon
    /// or on one of its edges. Either winding is accepted. A polygon with zero
    /// area yields an empty mask.
    ///
    /// ```
    /// # use faceswap::mask::Mask;
    /// # use faceswap::point_set::Point;
    /// let tri = [Point::new(0.0, 0.0), Point::new(3.0, 0.0), Point::new(0.0, 3.0)];
    /// let mask = Mask::fill_convex_polygon(4, 4, &tri);
    /// assert_eq!(mask.coverage(), 10);
    /// assert_eq!(mask.get(3, 0), 1.0);
    /// assert_eq!(mask.get(3, 3), 0.0);
    /// ```
    pub fn fill_convex_polygon(width: usize, height: usize, polygon: &[Point]) -> Self {
        let mut mask = Mask::new(width, height);
        let area = crate::hull::polygon_area(polygon);
        if polygon.len() < 3 || area.abs() < f64::EPSILON {
            return mask;
        }
        let sign = area.signum();

        let Some(bounds) = Rectangle::bounding(polygon) else {
            return mask;
        };
        let clipped = bounds.intersect(&Rectangle::new(0, 0, width as i32, height as i32));

        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                let p = Point::new(x as f32, y as f32);
                let inside = (0..polygon.len()).all(|i| {
                    let a = polygon[i];
                    let b = polygon[(i + 1) % polygon.len()];
                    Point::cross(a, b, p) * sign >= -1e-9
                });
                if inside {
                    mask.data[y as usize * width + x as usize] = 1.0;
                }
            }
        }
        mask
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.data[y * self.width + x] = value;
    }

    /// Number of pixels with a non-zero weight.
    pub fn coverage(&self) -> usize {
        self.data.iter().filter(|&&v| v > 0.0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&v| v <= 0.0)
    }

    /// Tight bounding rectangle of the covered pixels.
    pub fn covered_bounds(&self) -> Option<Rectangle> {
        let (mut min_x, mut min_y) = (usize::MAX, usize::MAX);
        let (mut max_x, mut max_y) = (0usize, 0usize);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) > 0.0 {
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
            }
        }
        if min_x == usize::MAX {
            return None;
        }
        Some(Rectangle::new(
            min_x as i32,
            min_y as i32,
            (max_x - min_x + 1) as i32,
            (max_y - min_y + 1) as i32,
        ))
    }

    /// Erodes the mask `iterations` times with a 3×3 square kernel.
    ///
    /// Each pass keeps the minimum weight of a pixel's neighbourhood. Pixels
    /// beyond the mask edge are not part of any neighbourhood, so coverage
    /// touching the edge of the mask is not eaten away from that side.
    pub fn eroded(&self, iterations: usize) -> Mask {
        let mut current = self.clone();
        for _ in 0..iterations {
            let mut next = Mask::new(self.width, self.height);
            for y in 0..self.height {
                for x in 0..self.width {
                    let mut weight = current.get(x, y);
                    for ny in y.saturating_sub(1)..=(y + 1).min(self.height - 1) {
                        for nx in x.saturating_sub(1)..=(x + 1).min(self.width - 1) {
                            weight = weight.min(current.get(nx, ny));
                        }
                    }
                    next.set(x, y, weight);
                }
            }
            current = next;
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_and_vertices_are_covered() {
        let square = [
            Point::new(1.0, 1.0),
            Point::new(4.0, 1.0),
            Point::new(4.0, 4.0),
            Point::new(1.0, 4.0),
        ];
        let mask = Mask::fill_convex_polygon(6, 6, &square);
        assert_eq!(mask.coverage(), 16);
        assert_eq!(mask.get(1, 1), 1.0);
        assert_eq!(mask.get(4, 4), 1.0);
        assert_eq!(mask.get(0, 2), 0.0);
        assert_eq!(mask.get(5, 2), 0.0);
    }

    #[test]
    fn winding_does_not_matter() {
        let ccw = [Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(0.0, 5.0)];
        let cw = [ccw[0], ccw[2], ccw[1]];
        assert_eq!(
            Mask::fill_convex_polygon(6, 6, &ccw),
            Mask::fill_convex_polygon(6, 6, &cw)
        );
    }

    #[test]
    fn degenerate_polygon_is_empty() {
        let line = [Point::new(0.0, 0.0), Point::new(2.0, 2.0), Point::new(4.0, 4.0)];
        let mask = Mask::fill_convex_polygon(5, 5, &line);
        assert!(mask.is_empty());
        assert_eq!(mask.covered_bounds(), None);
    }

    #[test]
    fn polygon_is_clipped_to_mask() {
        let big = [Point::new(-5.0, -5.0), Point::new(20.0, -5.0), Point::new(-5.0, 20.0)];
        let mask = Mask::fill_convex_polygon(4, 3, &big);
        assert_eq!(mask.coverage(), 12);
        assert_eq!(mask.covered_bounds(), Some(Rectangle::new(0, 0, 4, 3)));
    }

    #[test]
    fn erosion_shrinks_from_uncovered_neighbours_only() {
        let square = [
            Point::new(2.0, 2.0),
            Point::new(8.0, 2.0),
            Point::new(8.0, 8.0),
            Point::new(2.0, 8.0),
        ];
        let mask = Mask::fill_convex_polygon(12, 12, &square);
        assert_eq!(mask.eroded(1).covered_bounds(), Some(Rectangle::new(3, 3, 5, 5)));
        assert_eq!(mask.eroded(3).covered_bounds(), Some(Rectangle::new(5, 5, 1, 1)));
        assert!(mask.eroded(4).is_empty());

        let mut full = Mask::new(5, 4);
        full.data.iter_mut().for_each(|v| *v = 1.0);
        assert_eq!(full.eroded(3), full);
    }
}
