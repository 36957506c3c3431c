use crate::error::{SkipReason, TriangleSkip};
use crate::mask::Mask;
use crate::point_set::PointSet;
use crate::raster::{Raster, CHANNELS};
use crate::triangulation::{Mesh, Triangle};
use crate::warp::{TriangleWarper, WarpedPatch};

/// Accumulates warped triangles into a full-size warped-face raster.
///
/// The canvas starts as a copy of the destination. Each triangle overwrites
/// the pixels its mask covers with `out * (1 - m) + patch * m`; triangles are
/// applied in mesh order, so the last one wins where rectangles overlap.
pub struct Compositor {
    canvas: Raster,
    skipped: Vec<TriangleSkip>,
}

impl Compositor {
    pub fn new(destination: &Raster) -> Self {
        Self {
            canvas: destination.clone(),
            skipped: Vec::new(),
        }
    }

    /// Warps and blends every triangle of `mesh`, recording the ones that
    /// have to be skipped.
    pub fn composite_mesh(
        &mut self,
        warper: &TriangleWarper<'_>,
        mesh: &Mesh,
        source_points: &PointSet,
        destination_points: &PointSet,
    ) {
        for triangle in mesh.triangles() {
            if let Err(reason) = self.composite_triangle(warper, triangle, source_points, destination_points) {
                let skip = TriangleSkip {
                    landmarks: triangle.vertices.to_vec(),
                    reason,
                };
                log::warn!("{skip}");
                self.skipped.push(skip);
            }
        }
    }

    fn composite_triangle(
        &mut self,
        warper: &TriangleWarper<'_>,
        triangle: &Triangle,
        source_points: &PointSet,
        destination_points: &PointSet,
    ) -> Result<(), SkipReason> {
        let src = triangle.resolve(source_points).ok_or(SkipReason::UnresolvedVertex)?;
        let dst = triangle.resolve(destination_points).ok_or(SkipReason::UnresolvedVertex)?;
        let patch = warper.warp(&src, &dst)?;
        let mask = Mask::fill_convex_polygon(
            patch.raster.width(),
            patch.raster.height(),
            &patch.local_triangle,
        );
        if mask.is_empty() {
            return Err(SkipReason::EmptyMask);
        }
        self.blend_patch(&patch, &mask);
        Ok(())
    }

    /// Writes `patch` into the canvas at its rectangle, weighted by `mask`.
    /// Parts of the rectangle outside the canvas are ignored.
    pub fn blend_patch(&mut self, patch: &WarpedPatch, mask: &Mask) {
        let visible = patch.rect.intersect(&self.canvas.bounds());
        for y in visible.y..visible.bottom() {
            let py = (y - patch.rect.y) as usize;
            for x in visible.x..visible.right() {
                let px = (x - patch.rect.x) as usize;
                let m = mask.get(px, py);
                if m <= 0.0 {
                    continue;
                }
                let src = patch.raster.pixel(px, py);
                let out = self.canvas.pixel_mut(x as usize, y as usize);
                for c in 0..CHANNELS {
                    out[c] = out[c] * (1.0 - m) + src[c] * m;
                }
            }
        }
    }

    pub fn skipped(&self) -> &[TriangleSkip] {
        &self.skipped
    }

    /// The warped-face raster and the warnings collected along the way.
    pub fn finish(self) -> (Raster, Vec<TriangleSkip>) {
        (self.canvas, self.skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point_set::Point;
    use crate::rectangle::Rectangle;

    fn uniform(width: usize, height: usize, value: f32) -> Raster {
        let mut r = Raster::new(width, height);
        for y in 0..height {
            for x in 0..width {
                r.pixel_mut(x, y).copy_from_slice(&[value, value, value, 255.0]);
            }
        }
        r
    }

    #[test]
    fn blend_overwrites_only_the_masked_pixels() {
        let destination = uniform(6, 6, 10.0);
        let mut compositor = Compositor::new(&destination);
        let patch = WarpedPatch {
            rect: Rectangle::new(4, 4, 3, 3),
            local_triangle: [Point::new(0.0, 0.0), Point::new(2.0, 0.0), Point::new(0.0, 2.0)],
            raster: uniform(3, 3, 200.0),
        };
        let mut mask = Mask::new(3, 3);
        mask.set(0, 0, 1.0);
        mask.set(1, 0, 0.5);
        mask.set(2, 2, 1.0);
        compositor.blend_patch(&patch, &mask);
        let (canvas, skipped) = compositor.finish();
        assert!(skipped.is_empty());
        assert_eq!(canvas.pixel(4, 4)[0], 200.0);
        assert_eq!(canvas.pixel(5, 4)[0], 105.0);
        assert_eq!(canvas.pixel(5, 5)[0], 10.0);
        assert_eq!(canvas.pixel(3, 3)[0], 10.0);
    }

    #[test]
    fn zero_area_triangle_is_skipped_and_others_still_composite() {
        let source = uniform(20, 20, 90.0);
        let destination = uniform(20, 20, 10.0);
        let points = PointSet::from(vec![(2, 2), (15, 2), (2, 15), (4, 4), (8, 8), (12, 12)]);
        let mesh = Mesh::new(vec![Triangle::new(0, 1, 2), Triangle::new(3, 4, 5)]);

        let warper = TriangleWarper::new(&source, 0.5);
        let mut compositor = Compositor::new(&destination);
        compositor.composite_mesh(&warper, &mesh, &points, &points);
        let (canvas, skipped) = compositor.finish();

        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].landmarks, vec![3, 4, 5]);
        assert!(matches!(skipped[0].reason, SkipReason::Degenerate { .. }));
        assert!((canvas.pixel(5, 5)[0] - 90.0).abs() < 1e-3);
        assert_eq!(canvas.pixel(18, 18)[0], 10.0);
    }

    #[test]
    fn unknown_landmark_is_unresolved() {
        let raster = uniform(10, 10, 0.0);
        let points = PointSet::from(vec![(0, 0), (5, 0), (0, 5)]);
        let mesh = Mesh::new(vec![Triangle::new(0, 1, 7)]);
        let warper = TriangleWarper::new(&raster, 0.5);
        let mut compositor = Compositor::new(&raster);
        compositor.composite_mesh(&warper, &mesh, &points, &points);
        assert_eq!(compositor.skipped()[0].reason, SkipReason::UnresolvedVertex);
    }
}
