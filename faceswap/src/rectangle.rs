use crate::point_set::Point;

/// An axis-aligned pixel rectangle: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest integer rectangle containing every point.
    ///
    /// Corners are floored, so a point with `x = 9.0` occupies column 9 and the
    /// rectangle spans it. Extents too large for `i32` saturate. Returns `None`
    /// for an empty slice or non-finite input.
    ///
    /// ```
    /// # use faceswap::point_set::Point;
    /// # use faceswap::rectangle::Rectangle;
    /// let pts = [Point::new(2.0, 3.0), Point::new(9.0, 4.5), Point::new(5.0, 8.0)];
    /// let r = Rectangle::bounding(&pts).unwrap();
    /// assert_eq!(r, Rectangle::new(2, 3, 8, 6));
    /// ```
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
            return None;
        }
        let x0 = min_x.floor() as i64;
        let y0 = min_y.floor() as i64;
        let x1 = max_x.floor() as i64;
        let y1 = max_y.floor() as i64;
        Some(Self::new(
            saturate(x0),
            saturate(y0),
            saturate(x1 - x0 + 1),
            saturate(y1 - y0 + 1),
        ))
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Inclusive containment: points on the far edges count as inside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x as f32
            && p.y >= self.y as f32
            && p.x <= self.right() as f32
            && p.y <= self.bottom() as f32
    }

    /// Overlap of two rectangles; empty when they do not meet.
    pub fn intersect(&self, other: &Rectangle) -> Rectangle {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        Rectangle::new(x0, y0, x1.saturating_sub(x0).max(0), y1.saturating_sub(y0).max(0))
    }

    /// Integer centre `(x + w/2, y + h/2)`.
    pub fn center(&self) -> (i32, i32) {
        (
            saturate(self.x as i64 + self.width as i64 / 2),
            saturate(self.y as i64 + self.height as i64 / 2),
        )
    }

    /// Translates `p` into coordinates relative to this rectangle's corner.
    pub fn relative(&self, p: Point) -> Point {
        Point::new(p.x - self.x as f32, p.y - self.y as f32)
    }
}

fn saturate(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_of_single_point_is_one_pixel() {
        let r = Rectangle::bounding(&[Point::new(4.0, 7.0)]).unwrap();
        assert_eq!(r, Rectangle::new(4, 7, 1, 1));
    }

    #[test]
    fn bounding_of_nothing_is_none() {
        assert_eq!(Rectangle::bounding(&[]), None);
        assert_eq!(Rectangle::bounding(&[Point::new(f32::NAN, 0.0)]), None);
    }

    #[test]
    fn contains_is_inclusive() {
        let r = Rectangle::new(0, 0, 10, 10);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(0.0, 5.0)));
        assert!(!r.contains(Point::new(-0.5, 5.0)));
        assert!(!r.contains(Point::new(5.0, 10.5)));
    }

    #[test]
    fn intersection_clips_and_empties() {
        let a = Rectangle::new(0, 0, 10, 10);
        let b = Rectangle::new(5, -3, 10, 6);
        assert_eq!(a.intersect(&b), Rectangle::new(5, 0, 5, 3));
        assert!(a.intersect(&Rectangle::new(20, 20, 3, 3)).is_empty());
    }

    #[test]
    fn center_uses_integer_halves() {
        assert_eq!(Rectangle::new(1, 2, 5, 7).center(), (3, 5));
    }

    #[test]
    fn far_apart_points_saturate_instead_of_overflowing() {
        let pts = [Point::new(-2_000_000_000.0, 20.0), Point::new(2_000_000_000.0, 20.0)];
        let r = Rectangle::bounding(&pts).unwrap();
        assert_eq!((r.x, r.width, r.height), (-2_000_000_000, i32::MAX, 1));
        assert_eq!(r.right(), i32::MAX - 2_000_000_000);
        let clipped = r.intersect(&Rectangle::new(0, 0, 40, 40));
        assert_eq!(clipped, Rectangle::new(0, 20, 40, 1));
        assert_eq!(Rectangle::new(i32::MAX - 1, 0, i32::MAX, 2).center(), (i32::MAX, 1));
    }
}
