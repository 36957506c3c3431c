use crate::point_set::Point;
use nalgebra::{Matrix3, Vector3};

/// Represents a 2D affine transformation: a 2×2 linear part
/// (`a11`, `a12`, `a21`, `a22`) plus a translation offset
/// (`translate_x`, `translate_y`).
///
/// A point `(x, y)` is transformed into `(X, Y)` by:
///
/// ```text
///   X = (x * a11) + (y * a12) + translate_x;
///   Y = (x * a21) + (y * a22) + translate_y;
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AffineTransform {
    /// Translation offset in the transformed space (x-direction).
    pub translate_x: f64,

    /// Translation offset in the transformed space (y-direction).
    pub translate_y: f64,

    /// Matrix entry: row 1, col 1.
    pub a11: f64,

    /// Matrix entry: row 1, col 2.
    pub a12: f64,

    /// Matrix entry: row 2, col 1.
    pub a21: f64,

    /// Matrix entry: row 2, col 2.
    pub a22: f64,
}

impl AffineTransform {
    pub const IDENTITY: AffineTransform = AffineTransform {
        translate_x: 0.0,
        translate_y: 0.0,
        a11: 1.0,
        a12: 0.0,
        a21: 0.0,
        a22: 1.0,
    };

    /// Solves the unique affine map taking each `from[i]` onto `to[i]`.
    ///
    /// Three correspondences fix all six degrees of freedom. Returns `None`
    /// when the `from` triangle is degenerate (collinear vertices), since the
    /// system then has no unique solution.
    ///
    /// # Examples
    /// ```
    /// # use faceswap::affine_transform::AffineTransform;
    /// # use faceswap::point_set::Point;
    /// let from = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
    /// let to = [Point::new(5.0, 5.0), Point::new(7.0, 5.0), Point::new(5.0, 8.0)];
    /// let t = AffineTransform::from_triangles(&from, &to).unwrap();
    /// let (x, y) = t.transform(1.0, 1.0);
    /// assert!((x - 7.0).abs() < 1e-9 && (y - 8.0).abs() < 1e-9);
    /// ```
    pub fn from_triangles(from: &[Point; 3], to: &[Point; 3]) -> Option<AffineTransform> {
        if Point::cross(from[0], from[1], from[2]).abs() < f64::EPSILON {
            return None;
        }
        let m = Matrix3::new(
            from[0].x as f64, from[0].y as f64, 1.0,
            from[1].x as f64, from[1].y as f64, 1.0,
            from[2].x as f64, from[2].y as f64, 1.0,
        );
        let lu = m.lu();
        let row_x = lu.solve(&Vector3::new(to[0].x as f64, to[1].x as f64, to[2].x as f64))?;
        let row_y = lu.solve(&Vector3::new(to[0].y as f64, to[1].y as f64, to[2].y as f64))?;
        Some(AffineTransform {
            a11: row_x[0],
            a12: row_x[1],
            translate_x: row_x[2],
            a21: row_y[0],
            a22: row_y[1],
            translate_y: row_y[2],
        })
    }

    /// Transform a point (x, y) according to this affine transform.
    pub fn transform(&self, x: f64, y: f64) -> (f64, f64) {
        let tx = self.a11 * x + self.a12 * y + self.translate_x;
        let ty = self.a21 * x + self.a22 * y + self.translate_y;
        (tx, ty)
    }

    /// Determinant of the linear part; zero for a collapsing map.
    pub fn determinant(&self) -> f64 {
        self.a11 * self.a22 - self.a12 * self.a21
    }

    /// The inverse map, or `None` if the transform is singular.
    ///
    /// # Examples
    /// ```
    /// # use faceswap::affine_transform::AffineTransform;
    /// let t = AffineTransform { translate_x: 3.0, translate_y: -2.0, a11: 2.0, a12: 0.0, a21: 0.0, a22: 4.0 };
    /// let inv = t.inverse().unwrap();
    /// let (x, y) = t.transform(1.5, 2.5);
    /// let (bx, by) = inv.transform(x, y);
    /// assert!((bx - 1.5).abs() < 1e-12 && (by - 2.5).abs() < 1e-12);
    /// ```
    pub fn inverse(&self) -> Option<AffineTransform> {
        let det = self.determinant();
        if det.abs() < f64::EPSILON {
            return None;
        }
        let a11 = self.a22 / det;
        let a12 = -self.a12 / det;
        let a21 = -self.a21 / det;
        let a22 = self.a11 / det;
        Some(AffineTransform {
            a11,
            a12,
            a21,
            a22,
            translate_x: -(a11 * self.translate_x + a12 * self.translate_y),
            translate_y: -(a21 * self.translate_x + a22 * self.translate_y),
        })
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
