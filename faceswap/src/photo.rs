use crate::raster::{Raster, CHANNELS};

/// A basic representation of an image with RGBA pixel data.
/// Each pixel occupies 4 bytes: R, G, B, and A (alpha).
///
/// This is the exchange format with the outside world: decoders hand the
/// pipeline `Photo`s and the pipeline returns a `Photo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    /// Pixel data stored in a 1D `Vec<u8>`, in RGBA format (4 bytes per pixel).
    pub img_data: Vec<u8>,
    /// The width (in pixels) of the image.
    pub width: usize,
    /// The height (in pixels) of the image.
    pub height: usize,
}

impl Default for Photo {
    /// Creates an empty `Photo` with zero width and height, and no image data.
    fn default() -> Photo {
        Photo {
            img_data: Vec::new(),
            width: 0,
            height: 0,
        }
    }
}

impl Photo {
    /// Wraps raw RGBA bytes. Returns `None` if the buffer length does not
    /// match `width * height * 4`.
    pub fn new(img_data: Vec<u8>, width: usize, height: usize) -> Option<Photo> {
        if img_data.len() != width * height * CHANNELS {
            return None;
        }
        Some(Photo {
            img_data,
            width,
            height,
        })
    }

    /// Builds a photo by evaluating `f(x, y)` for every pixel.
    ///
    /// # Examples
    /// ```
    /// # use faceswap::photo::Photo;
    /// let photo = Photo::from_fn(3, 2, |x, y| [x as u8, y as u8, 0, 255]);
    /// assert_eq!(photo.get_rgba(2, 1), [2, 1, 0, 255]);
    /// ```
    pub fn from_fn<F>(width: usize, height: usize, f: F) -> Photo
    where
        F: Fn(usize, usize) -> [u8; 4],
    {
        let mut img_data = Vec::with_capacity(width * height * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                img_data.extend_from_slice(&f(x, y));
            }
        }
        Photo {
            img_data,
            width,
            height,
        }
    }

    /// Returns the `[R, G, B, A]` components at the pixel coordinate `(x, y)`.
    ///
    /// If `(x, y)` is out of bounds, this method returns `[0, 0, 255, 255]`,
    /// effectively a blue pixel.
    pub fn get_rgba(&self, x: usize, y: usize) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            [0, 0, 255, 255]
        } else {
            let index = (y * self.width + x) * CHANNELS;
            [
                self.img_data[index],
                self.img_data[index + 1],
                self.img_data[index + 2],
                self.img_data[index + 3],
            ]
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Converts the bytes to floating point intensities in `[0, 255]`.
    pub fn to_raster(&self) -> Raster {
        Raster::from_data(
            self.img_data.iter().map(|&v| v as f32).collect(),
            self.width,
            self.height,
        )
    }

    /// Quantises a raster back to bytes, rounding and clamping every channel.
    pub fn from_raster(raster: &Raster) -> Photo {
        Photo {
            img_data: raster
                .data()
                .iter()
                .map(|&v| v.round().clamp(0.0, 255.0) as u8)
                .collect(),
            width: raster.width(),
            height: raster.height(),
        }
    }
}
