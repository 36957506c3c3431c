use crate::error::InputError;
use std::fs;
use std::path::Path;

/// A landmark coordinate in pixel space. Sub-pixel values are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Twice the signed area of the triangle `(a, b, c)`, computed in `f64`.
    ///
    /// Positive when the three points turn counter-clockwise in a y-up frame.
    ///
    /// ```
    /// # use faceswap::point_set::Point;
    /// let a = Point::new(0.0, 0.0);
    /// let b = Point::new(4.0, 0.0);
    /// let c = Point::new(0.0, 3.0);
    /// assert_eq!(Point::cross(a, b, c), 12.0);
    /// assert_eq!(Point::cross(a, c, b), -12.0);
    /// ```
    pub fn cross(a: Point, b: Point, c: Point) -> f64 {
        let abx = b.x as f64 - a.x as f64;
        let aby = b.y as f64 - a.y as f64;
        let acx = c.x as f64 - a.x as f64;
        let acy = c.y as f64 - a.y as f64;
        abx * acy - aby * acx
    }
}

/// An ordered list of landmarks for one photo. Index `i` names the same
/// anatomical feature in the source and the destination set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointSet {
    points: Vec<Point>,
}

impl PointSet {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns the point with landmark index `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    /// Parses the landmark text format: one point per line, two
    /// whitespace-separated integers `x y`. Blank lines are ignored.
    ///
    /// `origin` names the data in error messages (usually the file path).
    ///
    /// ```
    /// # use faceswap::point_set::PointSet;
    /// let set = PointSet::parse("10 20\n30 40\n", "inline").unwrap();
    /// assert_eq!(set.len(), 2);
    /// assert_eq!(set.get(1).unwrap().y, 40.0);
    /// ```
    pub fn parse(text: &str, origin: &str) -> Result<Self, InputError> {
        let mut points = Vec::new();
        for (line_index, line) in text.lines().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }
            let malformed = |reason: String| InputError::MalformedLine {
                origin: origin.to_string(),
                line: line_index + 1,
                reason,
            };
            if tokens.len() != 2 {
                return Err(malformed(format!(
                    "expected 2 coordinates, found {}",
                    tokens.len()
                )));
            }
            let mut coordinates = [0i32; 2];
            for (slot, token) in coordinates.iter_mut().zip(&tokens) {
                *slot = token
                    .parse::<i32>()
                    .map_err(|_| malformed(format!("`{token}` is not an integer")))?;
            }
            points.push(Point::new(coordinates[0] as f32, coordinates[1] as f32));
        }

        if points.is_empty() {
            return Err(InputError::EmptyPointSet {
                origin: origin.to_string(),
            });
        }
        Ok(Self { points })
    }

    /// Reads and parses a landmark file.
    pub fn read_from_file(path: &Path) -> Result<Self, InputError> {
        let text = fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let set = Self::parse(&text, &path.display().to_string())?;
        log::debug!("read {} landmarks from {}", set.len(), path.display());
        Ok(set)
    }

    /// Checks that two sets describe the same landmarks.
    pub fn ensure_aligned(source: &PointSet, destination: &PointSet) -> Result<(), InputError> {
        if source.len() != destination.len() {
            return Err(InputError::PointCountMismatch {
                source_len: source.len(),
                destination_len: destination.len(),
            });
        }
        Ok(())
    }
}

impl std::ops::Index<usize> for PointSet {
    type Output = Point;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.points[idx]
    }
}

impl From<Vec<(i32, i32)>> for PointSet {
    fn from(pairs: Vec<(i32, i32)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(x, y)| Point::new(x as f32, y as f32))
                .collect(),
        )
    }
}
