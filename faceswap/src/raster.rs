use crate::rectangle::Rectangle;

/// Number of interleaved channels per pixel (RGBA).
pub const CHANNELS: usize = 4;

/// Floating point working image used by every pipeline stage.
///
/// Pixels are stored row by row, `CHANNELS` values per pixel, intensities
/// nominally in `[0, 255]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl Raster {
    /// A black, fully transparent raster.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![0.0; width * height * CHANNELS],
            width,
            height,
        }
    }

    pub(crate) fn from_data(data: Vec<f32>, width: usize, height: usize) -> Self {
        debug_assert_eq!(data.len(), width * height * CHANNELS);
        Self {
            data,
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// The whole raster as a rectangle anchored at the origin.
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(0, 0, self.width as i32, self.height as i32)
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[f32] {
        let index = (y * self.width + x) * CHANNELS;
        &self.data[index..index + CHANNELS]
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [f32] {
        let index = (y * self.width + x) * CHANNELS;
        &mut self.data[index..index + CHANNELS]
    }

    /// Copies out the part of this raster covered by `rect`, clipped to the
    /// raster bounds. The returned rectangle is the clipped one.
    pub fn crop(&self, rect: &Rectangle) -> (Raster, Rectangle) {
        let clipped = rect.intersect(&self.bounds());
        let mut out = Raster::new(clipped.width as usize, clipped.height as usize);
        for row in 0..clipped.height as usize {
            let src_y = clipped.y as usize + row;
            let start = (src_y * self.width + clipped.x as usize) * CHANNELS;
            let len = clipped.width as usize * CHANNELS;
            let dst_start = row * clipped.width as usize * CHANNELS;
            out.data[dst_start..dst_start + len].copy_from_slice(&self.data[start..start + len]);
        }
        (out, clipped)
    }

    /// Samples the raster at a fractional position with bilinear
    /// interpolation. Coordinates outside the raster are mirrored about the
    /// edge pixel without repeating it (`gfedcb|abcdefgh|gfedcba`).
    pub fn sample_bilinear_reflect(&self, x: f32, y: f32) -> [f32; CHANNELS] {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let x0 = x0 as i64;
        let y0 = y0 as i64;

        let xa = reflect_101(x0, self.width);
        let xb = reflect_101(x0 + 1, self.width);
        let ya = reflect_101(y0, self.height);
        let yb = reflect_101(y0 + 1, self.height);

        let p00 = self.pixel(xa, ya);
        let p10 = self.pixel(xb, ya);
        let p01 = self.pixel(xa, yb);
        let p11 = self.pixel(xb, yb);

        let mut out = [0.0; CHANNELS];
        for c in 0..CHANNELS {
            let top = p00[c] * (1.0 - fx) + p10[c] * fx;
            let bottom = p01[c] * (1.0 - fx) + p11[c] * fx;
            out[c] = top * (1.0 - fy) + bottom * fy;
        }
        out
    }

    /// Mean absolute per-channel difference between two equally sized rasters.
    pub fn mean_abs_diff(&self, other: &Raster) -> f64 {
        debug_assert_eq!(self.data.len(), other.data.len());
        if self.data.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (*a as f64 - *b as f64).abs())
            .sum();
        total / self.data.len() as f64
    }
}

/// Maps any integer index into `[0, len)` by mirror reflection about the
/// first and last element.
fn reflect_101(index: i64, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let period = 2 * (len as i64 - 1);
    let mut i = index.rem_euclid(period);
    if i >= len as i64 {
        i = period - i;
    }
    i as usize
}
