use crate::compositor::Compositor;
use crate::config::FaceSwapConfig;
use crate::error::{BlendError, GeometryError, InputError, Result, TriangleSkip};
use crate::hull::Hull;
use crate::mask::Mask;
use crate::photo::Photo;
use crate::point_set::{Point, PointSet};
use crate::raster::Raster;
use crate::seamless_clone::SeamlessBlender;
use crate::triangulation::{Mesh, Triangulation, Triangulator};
use crate::warp::TriangleWarper;

/// Outcome of a successful face swap.
#[derive(Debug, Clone)]
pub struct FaceSwapReport {
    /// The destination photo with the source face blended in.
    pub output: Photo,
    /// Landmarks and triangles that were left out along the way.
    pub skipped: Vec<TriangleSkip>,
    /// Number of landmarks on the destination hull.
    pub hull_size: usize,
    /// Number of triangles in the mesh that was composited.
    pub triangle_count: usize,
}

/// Runs the face swap pipeline for one (source, destination) photo pair.
///
/// The stages are, in order:
/// 1. **Hull selection** on the destination landmarks ([Hull::select]).
/// 2. **Triangulation** of the hull landmarks inside the destination frame.
/// 3. **Warping and compositing** every triangle from source to destination
///    geometry into a full-size warped face.
/// 4. **Seamless blending** of that warped face into the destination, keyed on
///    the filled hull polygon.
///
/// Each stage is also exposed on its own so callers can inspect or replace
/// intermediate results. No state is kept between runs.
pub struct FaceSwapProcessor {
    /// Photo the face is taken from.
    source: Photo,
    /// Photo the face is placed into.
    destination: Photo,
    config: FaceSwapConfig,
    /// Working copies of the photos.
    source_raster: Raster,
    destination_raster: Raster,
}

impl FaceSwapProcessor {
    /// Constructs a processor for `source` → `destination`.
    ///
    /// # Errors
    /// [`InputError::EmptyPhoto`] if either photo has no pixels.
    pub fn new(
        source: Photo,
        destination: Photo,
        config: FaceSwapConfig,
    ) -> std::result::Result<Self, InputError> {
        for (role, photo) in [("source", &source), ("destination", &destination)] {
            if photo.is_empty() {
                return Err(InputError::EmptyPhoto {
                    role,
                    width: photo.width,
                    height: photo.height,
                });
            }
        }
        let source_raster = source.to_raster();
        let destination_raster = destination.to_raster();
        Ok(Self {
            source,
            destination,
            config,
            source_raster,
            destination_raster,
        })
    }

    pub fn source(&self) -> &Photo {
        &self.source
    }

    pub fn destination(&self) -> &Photo {
        &self.destination
    }

    pub fn config(&self) -> &FaceSwapConfig {
        &self.config
    }

    /// Swaps the face outlined by `source_points` into the region outlined
    /// by `destination_points`.
    ///
    /// Any error aborts the run without producing an output photo.
    /// Individual triangles that cannot be warped are only reported in
    /// [FaceSwapReport::skipped].
    pub fn run(&self, source_points: &PointSet, destination_points: &PointSet) -> Result<FaceSwapReport> {
        PointSet::ensure_aligned(source_points, destination_points)?;

        let hull = self.select_hull(destination_points)?;
        log::info!("hull: {} of {} landmarks", hull.len(), destination_points.len());

        let Triangulation { mesh, mut skipped } = self.triangulate(&hull, destination_points)?;
        log::info!("triangulation: {} triangles", mesh.len());

        let (warped, composite_skips) = self.composite(&mesh, source_points, destination_points);
        log::info!(
            "composited {} triangles, {} skipped",
            mesh.len() - composite_skips.len(),
            composite_skips.len()
        );
        skipped.extend(composite_skips);

        let blended = self.blend(&warped, &hull, destination_points)?;
        log::info!("seamless blend done");

        Ok(FaceSwapReport {
            output: Photo::from_raster(&blended),
            skipped,
            hull_size: hull.len(),
            triangle_count: mesh.len(),
        })
    }

    /// Computes the convex hull of the destination landmarks.
    ///
    /// The returned index list applies unchanged to the source landmarks.
    ///
    /// # Parameters
    /// - `destination_points`: Landmarks of the destination photo.
    ///
    /// # Returns
    /// The hull, or [`GeometryError::DegenerateHull`] when fewer than three
    /// non-collinear landmarks exist.
    pub fn select_hull(&self, destination_points: &PointSet) -> std::result::Result<Hull, GeometryError> {
        Hull::select(destination_points)
    }

    /// Triangulates the hull landmarks in the destination frame.
    ///
    /// Only the landmarks on `hull` are inserted. Triangles leaving the
    /// destination photo and landmarks closer than
    /// [`FaceSwapConfig::duplicate_tolerance`] to an earlier one are dropped
    /// and reported in [`Triangulation::skipped`].
    ///
    /// # Parameters
    /// - `hull`: Hull selected on `destination_points`.
    /// - `destination_points`: Landmarks of the destination photo.
    ///
    /// # Returns
    /// A [`Triangulation`] with the mesh in canonical order, or
    /// [`GeometryError::EmptyMesh`] if no triangle survives.
    pub fn triangulate(
        &self,
        hull: &Hull,
        destination_points: &PointSet,
    ) -> std::result::Result<Triangulation, GeometryError> {
        let landmarks: Vec<(usize, Point)> = hull
            .indices()
            .iter()
            .map(|&i| (i, destination_points[i]))
            .collect();
        Triangulator::new(self.destination_raster.bounds(), self.config.duplicate_tolerance)
            .triangulate(&landmarks)
    }

    /// Warps every triangle of `mesh` from source to destination geometry and
    /// composites the patches over a copy of the destination.
    ///
    /// Triangles are written in mesh order, so the later one wins where their
    /// bounding rectangles overlap. Triangles that are degenerate, cannot be
    /// resolved, or have no pixels are skipped rather than failing the run.
    ///
    /// # Parameters
    /// - `mesh`: Triangles as landmark indices, valid in both point sets.
    /// - `source_points`: Landmarks of the source photo.
    /// - `destination_points`: Landmarks of the destination photo.
    ///
    /// # Returns
    /// A tuple `(warped, skipped)`: the full-size warped face and the
    /// triangles that were left out.
    pub fn composite(
        &self,
        mesh: &Mesh,
        source_points: &PointSet,
        destination_points: &PointSet,
    ) -> (Raster, Vec<TriangleSkip>) {
        let warper = TriangleWarper::new(&self.source_raster, self.config.min_triangle_area);
        let mut compositor = Compositor::new(&self.destination_raster);
        compositor.composite_mesh(&warper, mesh, source_points, destination_points);
        compositor.finish()
    }

    /// Blends `warped` into the destination inside the filled hull polygon.
    ///
    /// The blend is centred on the hull's bounding rectangle, clipped to the
    /// destination photo, so a hull reaching past the frame does not shift
    /// the face.
    ///
    /// # Parameters
    /// - `warped`: Output of [`Self::composite`].
    /// - `hull`: Hull selected on `destination_points`.
    /// - `destination_points`: Landmarks of the destination photo.
    ///
    /// # Returns
    /// The blended raster, or a [`BlendError`] if the mask is empty or the
    /// solve does not converge within [`FaceSwapConfig::max_iterations`].
    pub fn blend(
        &self,
        warped: &Raster,
        hull: &Hull,
        destination_points: &PointSet,
    ) -> std::result::Result<Raster, BlendError> {
        let mask = Mask::fill_convex_polygon(
            self.destination_raster.width(),
            self.destination_raster.height(),
            &hull.resolve(destination_points),
        );
        let center = hull
            .bounding_rect(destination_points)
            .intersect(&self.destination_raster.bounds())
            .center();
        log::debug!("hull mask covers {} pixels, center {center:?}", mask.coverage());
        SeamlessBlender::new(self.config.max_iterations, self.config.tolerance).blend(
            warped,
            &self.destination_raster,
            &mask,
            center,
        )
    }
}
