use crate::affine_transform::AffineTransform;
use crate::error::SkipReason;
use crate::point_set::Point;
use crate::raster::Raster;
use crate::rectangle::Rectangle;

/// Source pixels resampled into the shape of one destination triangle.
#[derive(Debug, Clone)]
pub struct WarpedPatch {
    /// Where the patch belongs in the destination photo.
    pub rect: Rectangle,
    /// Destination triangle, relative to `rect`'s corner.
    pub local_triangle: [Point; 3],
    /// `rect.width` × `rect.height` pixels.
    pub raster: Raster,
}

/// Warps triangles of a source raster onto destination triangle shapes.
///
/// Each call only reads the shared source and writes a fresh patch, so
/// independent triangles never interfere.
pub struct TriangleWarper<'a> {
    source: &'a Raster,
    min_area: f64,
}

impl<'a> TriangleWarper<'a> {
    /// `min_area` is the smallest triangle area, in pixels, accepted in
    /// either frame.
    pub fn new(source: &'a Raster, min_area: f64) -> Self {
        Self { source, min_area }
    }

    /// Resamples the source content of `src_triangle` into the bounding
    /// rectangle of `dst_triangle`.
    ///
    /// Both triangles are first made relative to their own bounding
    /// rectangle. The affine map between them is solved exactly, and every
    /// destination pixel is pulled from the source crop through its inverse
    /// with bilinear interpolation. Samples that fall outside the crop are
    /// mirrored back inside it.
    pub fn warp(
        &self,
        src_triangle: &[Point; 3],
        dst_triangle: &[Point; 3],
    ) -> Result<WarpedPatch, SkipReason> {
        for (frame, tri) in [("source", src_triangle), ("destination", dst_triangle)] {
            let area = Point::cross(tri[0], tri[1], tri[2]).abs() / 2.0;
            if area < self.min_area {
                return Err(SkipReason::Degenerate { frame, area });
            }
        }

        let src_rect = Rectangle::bounding(src_triangle).ok_or(SkipReason::EmptyRectangle)?;
        let dst_rect = Rectangle::bounding(dst_triangle).ok_or(SkipReason::EmptyRectangle)?;
        let (crop, crop_rect) = self.source.crop(&src_rect);
        if crop_rect.is_empty() || dst_rect.is_empty() {
            return Err(SkipReason::EmptyRectangle);
        }

        let src_local = src_triangle.map(|p| crop_rect.relative(p));
        let dst_local = dst_triangle.map(|p| dst_rect.relative(p));

        let degenerate = SkipReason::Degenerate {
            frame: "source",
            area: 0.0,
        };
        let forward = AffineTransform::from_triangles(&src_local, &dst_local).ok_or(degenerate.clone())?;
        let backward = forward.inverse().ok_or(degenerate)?;

        let mut raster = Raster::new(dst_rect.width as usize, dst_rect.height as usize);
        for y in 0..raster.height() {
            for x in 0..raster.width() {
                let (sx, sy) = backward.transform(x as f64, y as f64);
                let sample = crop.sample_bilinear_reflect(sx as f32, sy as f32);
                raster.pixel_mut(x, y).copy_from_slice(&sample);
            }
        }

        Ok(WarpedPatch {
            rect: dst_rect,
            local_triangle: dst_local,
            raster,
        })
    }
}
