//! Gradient-domain ("Poisson") blending of a warped face into the destination.
//!
//! The result follows a guidance gradient field: the warped image's gradients
//! well inside the mask, the destination's gradients in a thin band along the
//! mask edge, and the destination's values on the boundary. Solving that
//! Poisson problem per channel hides brightness and colour steps at the seam.

use crate::error::BlendError;
use crate::mask::Mask;
use crate::raster::{Raster, CHANNELS};

/// Conjugate-gradient Poisson solver for seamless cloning.
#[derive(Debug, Clone)]
pub struct SeamlessBlender {
    max_iterations: usize,
    tolerance: f64,
}

/// Masked pixels to solve for, with their neighbour structure.
struct Domain {
    /// Destination coordinates of each unknown.
    pixels: Vec<(usize, usize)>,
    /// Per destination pixel: index into `pixels`, or `None` when fixed.
    slot: Vec<Option<usize>>,
    width: usize,
}

const NEIGHBOURS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// 3×3 erosion passes that separate the warped-gradient core from the band
/// guided by the destination.
const EROSION_ITERATIONS: usize = 3;

impl Domain {
    fn neighbour(&self, (x, y): (usize, usize), (dx, dy): (isize, isize)) -> (usize, usize) {
        ((x as isize + dx) as usize, (y as isize + dy) as usize)
    }
}

impl SeamlessBlender {
    /// `tolerance` is the relative residual at which a channel counts as
    /// solved; `max_iterations` bounds the work per channel.
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
        }
    }

    /// Clones the masked part of `warped` into `destination`.
    ///
    /// `mask` is in `warped`'s frame. Its covered region is moved so that the
    /// centre of its bounding box lands on `center` in the destination; when
    /// `center` is the centre of that same box nothing moves. Pixels on the
    /// destination's outer border are never solved for.
    ///
    /// An edge between two pixels takes the warped gradient only when both
    /// ends lie in the eroded mask. Every other edge, including those that
    /// reach a fixed pixel, takes the destination gradient, so a flat patch
    /// pasted over a flat destination comes out as the destination.
    ///
    /// # Errors
    /// - [`BlendError::EmptyMask`] if nothing is left to solve or `warped` has
    ///   no pixels.
    /// - [`BlendError::NotConverged`] if a channel misses the tolerance.
    pub fn blend(
        &self,
        warped: &Raster,
        destination: &Raster,
        mask: &Mask,
        center: (i32, i32),
    ) -> Result<Raster, BlendError> {
        if warped.width() == 0 || warped.height() == 0 {
            return Err(BlendError::EmptyMask);
        }
        let roi = mask.covered_bounds().ok_or(BlendError::EmptyMask)?;
        let offset_x = center.0 as i64 - (roi.width / 2) as i64 - roi.x as i64;
        let offset_y = center.1 as i64 - (roi.height / 2) as i64 - roi.y as i64;

        let domain = self.build_domain(mask, destination, (offset_x, offset_y));
        if domain.pixels.is_empty() {
            return Err(BlendError::EmptyMask);
        }
        log::debug!(
            "poisson domain: {} unknowns, offset ({offset_x}, {offset_y})",
            domain.pixels.len()
        );

        let core = mask.eroded(EROSION_ITERATIONS);
        let (guide_width, guide_height) = (
            core.width.min(warped.width()) as i64,
            core.height.min(warped.height()) as i64,
        );
        // Warped-frame coordinate of a destination pixel inside the eroded mask.
        let in_core = |(x, y): (usize, usize)| -> Option<(usize, usize)> {
            let gx = x as i64 - offset_x;
            let gy = y as i64 - offset_y;
            if gx < 0 || gy < 0 || gx >= guide_width || gy >= guide_height {
                return None;
            }
            let g = (gx as usize, gy as usize);
            (core.get(g.0, g.1) > 0.0).then_some(g)
        };
        let start = |(x, y): (usize, usize), c: usize| -> f64 {
            let gx = (x as i64 - offset_x).clamp(0, warped.width() as i64 - 1) as usize;
            let gy = (y as i64 - offset_y).clamp(0, warped.height() as i64 - 1) as usize;
            warped.pixel(gx, gy)[c] as f64
        };

        let mut output = destination.clone();
        for c in 0..CHANNELS {
            let mut rhs = vec![0.0; domain.pixels.len()];
            let mut initial = vec![0.0; domain.pixels.len()];
            for (i, &p) in domain.pixels.iter().enumerate() {
                initial[i] = start(p, c);
                let mut b = 0.0;
                for step in NEIGHBOURS {
                    let q = domain.neighbour(p, step);
                    b += match (in_core(p), in_core(q)) {
                        (Some(a), Some(g)) => (warped.pixel(a.0, a.1)[c] - warped.pixel(g.0, g.1)[c]) as f64,
                        _ => (destination.pixel(p.0, p.1)[c] - destination.pixel(q.0, q.1)[c]) as f64,
                    };
                    if domain.slot[q.1 * domain.width + q.0].is_none() {
                        b += destination.pixel(q.0, q.1)[c] as f64;
                    }
                }
                rhs[i] = b;
            }

            let solution = self.solve(&domain, &rhs, initial)?;
            for (&(x, y), value) in domain.pixels.iter().zip(solution) {
                output.pixel_mut(x, y)[c] = value as f32;
            }
        }
        Ok(output)
    }

    fn build_domain(&self, mask: &Mask, destination: &Raster, offset: (i64, i64)) -> Domain {
        let width = destination.width();
        let height = destination.height();
        let mut slot = vec![None; width * height];
        let mut pixels = Vec::new();
        for y in 0..mask.height {
            for x in 0..mask.width {
                if mask.get(x, y) <= 0.0 {
                    continue;
                }
                let tx = x as i64 + offset.0;
                let ty = y as i64 + offset.1;
                if tx < 1 || ty < 1 || tx >= width as i64 - 1 || ty >= height as i64 - 1 {
                    continue;
                }
                let index = ty as usize * width + tx as usize;
                if slot[index].is_none() {
                    slot[index] = Some(pixels.len());
                    pixels.push((tx as usize, ty as usize));
                }
            }
        }
        Domain {
            pixels,
            slot,
            width,
        }
    }

    /// Applies the 5-point Laplacian restricted to the unknowns:
    /// `4 x_p - sum of unknown neighbours`.
    fn apply(domain: &Domain, x: &[f64], out: &mut [f64]) {
        for (i, &p) in domain.pixels.iter().enumerate() {
            let mut v = 4.0 * x[i];
            for step in NEIGHBOURS {
                let q = domain.neighbour(p, step);
                if let Some(j) = domain.slot[q.1 * domain.width + q.0] {
                    v -= x[j];
                }
            }
            out[i] = v;
        }
    }

    fn solve(&self, domain: &Domain, rhs: &[f64], mut x: Vec<f64>) -> Result<Vec<f64>, BlendError> {
        let n = rhs.len();
        let mut ax = vec![0.0; n];
        Self::apply(domain, &x, &mut ax);
        let mut r: Vec<f64> = rhs.iter().zip(&ax).map(|(b, a)| b - a).collect();
        let mut p = r.clone();
        let mut rs = dot(&r, &r);
        let scale = dot(rhs, rhs).sqrt().max(1.0);
        let mut ap = vec![0.0; n];

        let mut iterations = 0;
        while rs.sqrt() > self.tolerance * scale {
            if iterations == self.max_iterations {
                return Err(BlendError::NotConverged {
                    iterations,
                    residual: rs.sqrt() / scale,
                });
            }
            Self::apply(domain, &p, &mut ap);
            let alpha = rs / dot(&p, &ap);
            for i in 0..n {
                x[i] += alpha * p[i];
                r[i] -= alpha * ap[i];
            }
            let rs_next = dot(&r, &r);
            let beta = rs_next / rs;
            for i in 0..n {
                p[i] = r[i] + beta * p[i];
            }
            rs = rs_next;
            iterations += 1;
        }
        log::trace!("channel solved in {iterations} iterations");
        Ok(x)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
