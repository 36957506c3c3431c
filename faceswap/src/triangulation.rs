use crate::error::{GeometryError, SkipReason, TriangleSkip};
use crate::point_set::{Point, PointSet};
use crate::rectangle::Rectangle;
use kd_tree::{KdPoint, KdTree};
use std::collections::HashMap;

/// Three landmark indices. Vertices are ordered counter-clockwise (y-up) in
/// the frame the triangle was built in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triangle {
    pub vertices: [usize; 3],
}

impl Triangle {
    pub const fn new(a: usize, b: usize, c: usize) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Looks up the three vertex coordinates in `points`.
    pub fn resolve(&self, points: &PointSet) -> Option<[Point; 3]> {
        Some([
            points.get(self.vertices[0])?,
            points.get(self.vertices[1])?,
            points.get(self.vertices[2])?,
        ])
    }

    /// Rotates the vertices so the smallest index comes first, keeping the
    /// winding.
    fn rotated_to_min(self) -> Self {
        let [a, b, c] = self.vertices;
        if a <= b && a <= c {
            Triangle::new(a, b, c)
        } else if b <= a && b <= c {
            Triangle::new(b, c, a)
        } else {
            Triangle::new(c, a, b)
        }
    }
}

/// An ordered list of triangles with disjoint interiors.
///
/// Order matters: the compositor writes triangles in this order, so where
/// bounding rectangles overlap the later triangle wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mesh {
    triangles: Vec<Triangle>,
}

impl Mesh {
    /// Wraps triangles in the order given.
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Wraps triangles in canonical order: each triangle rotated so its
    /// smallest index leads, then sorted lexicographically.
    pub fn canonical(triangles: Vec<Triangle>) -> Self {
        let mut triangles: Vec<Triangle> = triangles.into_iter().map(Triangle::rotated_to_min).collect();
        triangles.sort_unstable();
        triangles.dedup();
        Self { triangles }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Sum of absolute triangle areas measured in `points`' frame.
    pub fn total_area(&self, points: &PointSet) -> f64 {
        self.triangles
            .iter()
            .filter_map(|t| t.resolve(points))
            .map(|[a, b, c]| Point::cross(a, b, c).abs() / 2.0)
            .sum()
    }
}

/// Output of a triangulation run: the mesh plus any landmarks or triangles
/// that had to be left out.
#[derive(Debug, Clone)]
pub struct Triangulation {
    pub mesh: Mesh,
    pub skipped: Vec<TriangleSkip>,
}

/// A landmark position tagged with its index, for the duplicate lookup.
#[derive(Debug, Clone, Copy)]
struct TaggedPoint {
    point: Point,
    slot: usize,
}

impl KdPoint for TaggedPoint {
    type Scalar = f32;
    type Dim = typenum::U2;
    fn at(&self, k: usize) -> f32 {
        if k == 0 {
            self.point.x
        } else {
            self.point.y
        }
    }
}

/// Super-triangle size relative to the point spread. Large enough that its
/// circumcircles bulge less than any integer lattice distance into the hull.
const SUPER_TRIANGLE_SCALE: f64 = 65536.0;

#[derive(Debug, Clone, Copy)]
struct Vertex {
    x: f64,
    y: f64,
    /// Landmark index; `None` for the enclosing super-triangle corners.
    tag: Option<usize>,
}

/// Delaunay triangulation by Bowyer–Watson incremental insertion.
///
/// Every inserted vertex carries its landmark index, so no coordinate
/// matching is needed to map triangles back to the point set.
pub struct Triangulator {
    bounds: Rectangle,
    duplicate_tolerance: f32,
}

impl Triangulator {
    /// `bounds` limits which triangles are kept; `duplicate_tolerance` is the
    /// distance under which two landmarks count as the same point.
    pub fn new(bounds: Rectangle, duplicate_tolerance: f32) -> Self {
        Self {
            bounds,
            duplicate_tolerance,
        }
    }

    /// Triangulates `landmarks`, each given as `(index, position)`.
    ///
    /// # Errors
    /// [`GeometryError::EmptyMesh`] if no triangle survives.
    pub fn triangulate(&self, landmarks: &[(usize, Point)]) -> Result<Triangulation, GeometryError> {
        let mut skipped = Vec::new();
        let accepted = self.drop_duplicates(landmarks, &mut skipped);

        let mut vertices = self.super_triangle(&accepted);
        let mut triangles: Vec<[usize; 3]> = vec![[0, 1, 2]];

        for &(index, p) in &accepted {
            let slot = vertices.len();
            vertices.push(Vertex {
                x: p.x as f64,
                y: p.y as f64,
                tag: Some(index),
            });
            insert_vertex(&vertices, &mut triangles, slot);
        }

        let mut kept = Vec::with_capacity(triangles.len());
        let mut auxiliary = 0usize;
        for tri in &triangles {
            let tags = [vertices[tri[0]].tag, vertices[tri[1]].tag, vertices[tri[2]].tag];
            // Triangles touching a super-triangle corner are scaffolding.
            let [Some(a), Some(b), Some(c)] = tags else {
                auxiliary += 1;
                continue;
            };
            let inside = tri.iter().all(|&v| {
                self.bounds
                    .contains(Point::new(vertices[v].x as f32, vertices[v].y as f32))
            });
            if !inside {
                log::warn!("triangle [{a}, {b}, {c}] leaves the bounds {:?}, dropping it", self.bounds);
                skipped.push(TriangleSkip {
                    landmarks: vec![a, b, c],
                    reason: SkipReason::OutsideBounds,
                });
                continue;
            }
            kept.push(Triangle::new(a, b, c));
        }

        let mesh = Mesh::canonical(kept);
        log::debug!(
            "triangulated {} landmarks into {} triangles ({} auxiliary discarded)",
            accepted.len(),
            mesh.len(),
            auxiliary
        );
        if mesh.is_empty() {
            return Err(GeometryError::EmptyMesh {
                hull_points: landmarks.len(),
            });
        }
        Ok(Triangulation { mesh, skipped })
    }

    /// Removes landmarks lying within `duplicate_tolerance` of an earlier one.
    fn drop_duplicates(
        &self,
        landmarks: &[(usize, Point)],
        skipped: &mut Vec<TriangleSkip>,
    ) -> Vec<(usize, Point)> {
        let tagged: Vec<TaggedPoint> = landmarks
            .iter()
            .enumerate()
            .map(|(slot, &(_, point))| TaggedPoint { point, slot })
            .collect();
        let tree = KdTree::build_by_ordered_float(tagged.clone());

        let mut accepted = Vec::with_capacity(landmarks.len());
        for item in &tagged {
            let earlier = tree
                .within_radius(item, self.duplicate_tolerance)
                .into_iter()
                .filter(|other| other.slot < item.slot)
                .map(|other| other.slot)
                .min();
            let (index, point) = landmarks[item.slot];
            match earlier {
                Some(first) => {
                    let duplicate_of = landmarks[first].0;
                    log::warn!("landmark {index} coincides with landmark {duplicate_of}, not triangulating it");
                    skipped.push(TriangleSkip {
                        landmarks: vec![index],
                        reason: SkipReason::DuplicateLandmark { duplicate_of },
                    });
                }
                None => accepted.push((index, point)),
            }
        }
        accepted
    }

    /// A triangle far larger than both the bounds and the landmarks, so that
    /// its corners never influence the kept triangles.
    fn super_triangle(&self, landmarks: &[(usize, Point)]) -> Vec<Vertex> {
        let mut min_x = self.bounds.x as f64;
        let mut min_y = self.bounds.y as f64;
        let mut max_x = self.bounds.right() as f64;
        let mut max_y = self.bounds.bottom() as f64;
        for &(_, p) in landmarks {
            min_x = min_x.min(p.x as f64);
            min_y = min_y.min(p.y as f64);
            max_x = max_x.max(p.x as f64);
            max_y = max_y.max(p.y as f64);
        }
        let cx = (min_x + max_x) / 2.0;
        let cy = (min_y + max_y) / 2.0;
        let m = SUPER_TRIANGLE_SCALE * (max_x - min_x).max(max_y - min_y).max(1.0);
        vec![
            Vertex {
                x: cx - 2.0 * m,
                y: cy - m,
                tag: None,
            },
            Vertex {
                x: cx + 2.0 * m,
                y: cy - m,
                tag: None,
            },
            Vertex {
                x: cx,
                y: cy + 2.0 * m,
                tag: None,
            },
        ]
    }
}

/// Inserts `vertices[slot]`: removes every triangle whose circumcircle holds
/// the new vertex and fans the resulting cavity from it.
fn insert_vertex(vertices: &[Vertex], triangles: &mut Vec<[usize; 3]>, slot: usize) {
    let p = vertices[slot];
    let (bad, good): (Vec<[usize; 3]>, Vec<[usize; 3]>) = triangles
        .drain(..)
        .partition(|t| in_circumcircle(vertices[t[0]], vertices[t[1]], vertices[t[2]], p));
    *triangles = good;

    // A cavity edge belongs to exactly one removed triangle.
    let mut edge_count: HashMap<(usize, usize), usize> = HashMap::new();
    for t in &bad {
        for k in 0..3 {
            let (a, b) = (t[k], t[(k + 1) % 3]);
            *edge_count.entry((a.min(b), a.max(b))).or_insert(0) += 1;
        }
    }
    for t in &bad {
        for k in 0..3 {
            let (a, b) = (t[k], t[(k + 1) % 3]);
            if edge_count[&(a.min(b), a.max(b))] == 1 {
                triangles.push([a, b, slot]);
            }
        }
    }
}

/// True when `d` lies strictly inside the circumcircle of the
/// counter-clockwise triangle `(a, b, c)`.
fn in_circumcircle(a: Vertex, b: Vertex, c: Vertex, d: Vertex) -> bool {
    let (adx, ady) = (a.x - d.x, a.y - d.y);
    let (bdx, bdy) = (b.x - d.x, b.y - d.y);
    let (cdx, cdy) = (c.x - d.x, c.y - d.y);
    let det = (adx * adx + ady * ady) * (bdx * cdy - cdx * bdy)
        - (bdx * bdx + bdy * bdy) * (adx * cdy - cdx * ady)
        + (cdx * cdx + cdy * cdy) * (adx * bdy - bdx * ady);
    det > 0.0
}
