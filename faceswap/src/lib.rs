//! # FaceSwap Library
//!
//! The `faceswap` library replaces the face in a destination photo with the face
//! from a source photo, given index-aligned landmark points for both. Landmark
//! detection is not part of the library; the points are supplied by the caller.
//!
//! ## Overview of Modules
//!
//! - **`faceswap_processor`**: Orchestrates the whole pipeline for one photo pair
//!   and returns a [`FaceSwapReport`] with the output photo and any skipped triangles.
//!
//! - **`photo`**: Defines a basic `Photo` struct for storing pixel data (RGBA format),
//!   the exchange format with image decoders and encoders.
//!
//! - **`raster`**: Floating point working image with bilinear sampling that mirrors
//!   about the border (`BORDER_REFLECT_101`).
//!
//! - **`point_set`**: Landmark points and the plain text point file format.
//!
//! - **`hull`**: Convex hull of the destination landmarks, as indices shared by
//!   both point sets.
//!
//! - **`triangulation`**: Delaunay mesh over the hull landmarks. Vertices carry
//!   their landmark index, so triangles never need to be matched back by coordinate.
//!
//! - **`affine_transform`**: Provides the `AffineTransform` struct for 2D affine
//!   maps, solved from three point correspondences.
//!
//! - **`warp`**: Resamples one source triangle into the shape of its destination
//!   triangle.
//!
//! - **`mask`**: Convex polygon rasterisation into coverage masks.
//!
//! - **`compositor`**: Accumulates warped triangles into a full-size warped face,
//!   in canonical mesh order.
//!
//! - **`seamless_clone`**: Gradient-domain (Poisson) blending of the warped face
//!   into the destination.
//!
//! - **`config`** and **`error`**: Tunable parameters and the error types of a run.

pub mod faceswap_processor;

pub mod affine_transform;
pub mod compositor;
pub mod config;
pub mod error;
pub mod hull;
pub mod mask;
pub mod photo;
pub mod point_set;
pub mod raster;
pub mod rectangle;
pub mod seamless_clone;
pub mod triangulation;
pub mod warp;

pub use config::FaceSwapConfig;
pub use error::{Error, Result};
pub use faceswap_processor::{FaceSwapProcessor, FaceSwapReport};
pub use photo::Photo;
pub use point_set::{Point, PointSet};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
