use crate::error::GeometryError;
use crate::point_set::{Point, PointSet};
use crate::rectangle::Rectangle;

/// The convex hull of a landmark set, stored as indices into that set.
///
/// The same index list applies to the source and destination sets, so the
/// hull chosen on the destination face selects the matching source outline.
/// Vertices run counter-clockwise in a y-up frame (positive signed area);
/// collinear boundary points are not vertices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hull {
    indices: Vec<usize>,
}

impl Hull {
    /// Computes the hull of `points` with Andrew's monotone chain.
    ///
    /// # Errors
    /// [`GeometryError::DegenerateHull`] when fewer than three non-collinear
    /// points exist.
    pub fn select(points: &PointSet) -> Result<Hull, GeometryError> {
        let pts = points.points();
        let degenerate = GeometryError::DegenerateHull { points: pts.len() };
        if pts.len() < 3 {
            return Err(degenerate);
        }

        let mut order: Vec<usize> = (0..pts.len()).collect();
        order.sort_by(|&a, &b| {
            pts[a]
                .x
                .total_cmp(&pts[b].x)
                .then(pts[a].y.total_cmp(&pts[b].y))
        });

        let mut lower: Vec<usize> = Vec::with_capacity(pts.len());
        for &i in &order {
            push_turning_left(&mut lower, pts, i);
        }
        let mut upper: Vec<usize> = Vec::with_capacity(pts.len());
        for &i in order.iter().rev() {
            push_turning_left(&mut upper, pts, i);
        }

        lower.pop();
        upper.pop();
        lower.extend(upper);

        if lower.len() < 3 {
            return Err(degenerate);
        }
        Ok(Hull { indices: lower })
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Looks the hull indices up in `points`. Used for both the destination
    /// set and the index-aligned source set.
    pub fn resolve(&self, points: &PointSet) -> Vec<Point> {
        self.indices.iter().map(|&i| points[i]).collect()
    }

    /// Area of the hull polygon in `points`' frame.
    pub fn area(&self, points: &PointSet) -> f64 {
        polygon_area(&self.resolve(points)).abs()
    }

    /// Bounding rectangle of the hull vertices in `points`' frame.
    pub fn bounding_rect(&self, points: &PointSet) -> Rectangle {
        Rectangle::bounding(&self.resolve(points)).unwrap_or_default()
    }
}

fn push_turning_left(chain: &mut Vec<usize>, pts: &[Point], i: usize) {
    while chain.len() >= 2
        && Point::cross(pts[chain[chain.len() - 2]], pts[chain[chain.len() - 1]], pts[i]) <= 0.0
    {
        chain.pop();
    }
    chain.push(i);
}

/// Signed shoelace area of a closed polygon.
pub fn polygon_area(polygon: &[Point]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[(i + 1) % polygon.len()];
        sum += a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64;
    }
    sum / 2.0
}
