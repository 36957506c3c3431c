use std::path::PathBuf;
use thiserror::Error;

/// Problems with the inputs handed to the pipeline: landmark files and photos.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("could not read point file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{origin}:{line}: {reason}")]
    MalformedLine {
        origin: String,
        line: usize,
        reason: String,
    },

    #[error("point file {origin} contains no points")]
    EmptyPointSet { origin: String },

    #[error("point count mismatch: source has {source_len} points, destination has {destination_len}")]
    PointCountMismatch {
        source_len: usize,
        destination_len: usize,
    },

    #[error("{role} photo is empty ({width}x{height})")]
    EmptyPhoto {
        role: &'static str,
        width: usize,
        height: usize,
    },
}

/// Failures of the hull or triangulation stages.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GeometryError {
    #[error("convex hull is degenerate: {points} landmark(s), need at least 3 non-collinear points")]
    DegenerateHull { points: usize },

    #[error("triangulation of {hull_points} hull points produced no triangles")]
    EmptyMesh { hull_points: usize },
}

/// Failures of the gradient-domain blend.
#[derive(Error, Debug, PartialEq)]
pub enum BlendError {
    #[error("blend mask is empty")]
    EmptyMask,

    #[error("poisson solve did not converge in {iterations} iterations (residual {residual:e})")]
    NotConverged { iterations: usize, residual: f64 },
}

/// Any fatal error of a face swap run, tagged with the stage it came from.
#[derive(Error, Debug)]
pub enum Error {
    #[error("input error: {0}")]
    Input(#[from] InputError),

    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("blend error: {0}")]
    Blend(#[from] BlendError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single triangle (or landmark) was left out of the composite.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The triangle has (near) zero area in the named frame.
    Degenerate { frame: &'static str, area: f64 },
    /// A vertex carried no landmark index out of triangulation.
    UnresolvedVertex,
    /// A landmark lies outside the triangulation bounds.
    OutsideBounds,
    /// A landmark coincides with an earlier one and was not triangulated.
    DuplicateLandmark { duplicate_of: usize },
    /// The bounding rectangle has no pixels inside the photo.
    EmptyRectangle,
    /// Rasterising the triangle covered no pixels.
    EmptyMask,
}

/// A non-fatal warning: the contribution of one triangle was omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleSkip {
    /// Landmark indices of the triangle, or the single landmark concerned.
    pub landmarks: Vec<usize>,
    pub reason: SkipReason,
}

impl std::fmt::Display for TriangleSkip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "skipped landmarks {:?}: ", self.landmarks)?;
        match &self.reason {
            SkipReason::Degenerate { frame, area } => {
                write!(f, "degenerate in {frame} frame (area {area:.3})")
            }
            SkipReason::UnresolvedVertex => write!(f, "vertex has no landmark index"),
            SkipReason::OutsideBounds => write!(f, "vertex outside triangulation bounds"),
            SkipReason::DuplicateLandmark { duplicate_of } => {
                write!(f, "coincides with landmark {duplicate_of}")
            }
            SkipReason::EmptyRectangle => write!(f, "bounding rectangle is empty"),
            SkipReason::EmptyMask => write!(f, "coverage mask is empty"),
        }
    }
}
