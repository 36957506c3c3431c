/// Tunable parameters of a face swap run.
///
/// The defaults are what the command line tool uses.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceSwapConfig {
    /// Triangles with a smaller area (in pixels) in either photo are skipped.
    pub min_triangle_area: f64,
    /// Landmarks closer than this to an earlier landmark are not triangulated.
    pub duplicate_tolerance: f32,
    /// Conjugate-gradient iteration budget per colour channel.
    pub max_iterations: usize,
    /// Relative residual at which the Poisson solve counts as converged.
    pub tolerance: f64,
}

impl Default for FaceSwapConfig {
    fn default() -> Self {
        Self {
            min_triangle_area: 0.5,
            duplicate_tolerance: 0.5,
            max_iterations: 20_000,
            tolerance: 1e-6,
        }
    }
}

impl FaceSwapConfig {
    pub fn with_min_triangle_area(mut self, area: f64) -> Self {
        self.min_triangle_area = area;
        self
    }

    pub fn with_duplicate_tolerance(mut self, tolerance: f32) -> Self {
        self.duplicate_tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}
