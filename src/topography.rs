use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use ndarray::{Array2, Array3, ArrayView2, ArrayViewD, Axis, Ix2, Ix3, Zip};

use crate::{
    config::MaskConfig,
    error::{Result, TopographyError},
    grid::RegularGrid,
    interp::resize,
    types::{Extent, Value},
};

const NOT_ACTIVATED: &str = "topography not activated";

/// A terrain height-field covering the horizontal extent of a [`RegularGrid`].
///
/// The canonical data is `values_2d`, a `(rows, cols, 3)` grid of `(x, y, z)`
/// samples with axis 0 running along x and axis 1 along y. The flat
/// `(rows * cols, 3)` point list is derived from it on demand.
///
/// The terrain is assumed to span the grid extent exactly; nothing is clipped
/// or extrapolated.
///
/// The voxel mask is cached after the first [`topography_mask`](TerrainSurface::topography_mask)
/// call and cleared by every [`set_values`](TerrainSurface::set_values).
#[derive(Debug, Clone)]
pub struct TerrainSurface {
    regular_grid: Arc<RegularGrid>,
    values_2d: Array3<Value>,
    /// Coordinate overrides supplied by whoever produced the surface.
    x: Option<Vec<Value>>,
    y: Option<Vec<Value>>,
    mask: Option<Array3<bool>>,
    config: MaskConfig,
}

impl TerrainSurface {
    /// Creates an empty surface. It must be given values before it can be sampled.
    pub fn new(regular_grid: Arc<RegularGrid>) -> Self {
        Self {
            regular_grid,
            values_2d: Array3::zeros((0, 0, 3)),
            x: None,
            y: None,
            mask: None,
            config: MaskConfig::default(),
        }
    }

    pub fn from_values(regular_grid: Arc<RegularGrid>, values_2d: Array3<Value>) -> Self {
        let mut topo = Self::new(regular_grid);
        topo.set_values(values_2d);
        topo
    }

    pub fn with_config(mut self, config: MaskConfig) -> Self {
        self.config = config;
        self.mask = None;
        self
    }

    /// Replaces the surface with a `(rows, cols, 3)` grid of `(x, y, z)` samples.
    ///
    /// Clears the coordinate overrides and the cached mask.
    pub fn set_values(&mut self, values_2d: Array3<Value>) -> &mut Self {
        debug_assert_eq!(values_2d.len_of(Axis(2)), 3);
        self.values_2d = values_2d;
        self.x = None;
        self.y = None;
        self.mask = None;
        tracing::debug!(resolution = ?self.resolution(), "topography values set");
        self
    }

    /// Like [`set_values`](TerrainSurface::set_values), then records the x/y axes of
    /// the generator that produced the grid.
    pub fn set_values_with_axes(&mut self, values_2d: Array3<Value>, x: Vec<Value>, y: Vec<Value>) -> &mut Self {
        self.set_values(values_2d);
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn regular_grid(&self) -> &RegularGrid {
        &self.regular_grid
    }

    pub fn extent(&self) -> &Extent {
        self.regular_grid.extent()
    }

    pub fn config(&self) -> &MaskConfig {
        &self.config
    }

    /// `(rows, cols)` of [`values_2d`](TerrainSurface::values_2d).
    pub fn resolution(&self) -> (usize, usize) {
        let (rows, cols, _) = self.values_2d.dim();
        (rows, cols)
    }

    pub fn is_empty(&self) -> bool {
        self.values_2d.is_empty()
    }

    pub fn values_2d(&self) -> &Array3<Value> {
        &self.values_2d
    }

    /// The surface as a flat `(rows * cols, 3)` point list in row-major order.
    pub fn values(&self) -> Array2<Value> {
        let (rows, cols) = self.resolution();
        Array2::from_shape_fn((rows * cols, 3), |(n, c)| self.values_2d[[n / cols, n % cols, c]])
    }

    /// Elevation plane, `(rows, cols)`.
    pub fn elevation(&self) -> ArrayView2<'_, Value> {
        self.values_2d.index_axis(Axis(2), 2)
    }

    /// Sorted unique x coordinates, unless overridden by the surface producer.
    pub fn x(&self) -> Vec<Value> {
        match &self.x {
            Some(x) => x.clone(),
            None => unique_sorted(self.values_2d.index_axis(Axis(2), 0).iter().copied()),
        }
    }

    /// Sorted unique y coordinates, unless overridden by the surface producer.
    pub fn y(&self) -> Vec<Value> {
        match &self.y {
            Some(y) => y.clone(),
            None => unique_sorted(self.values_2d.index_axis(Axis(2), 1).iter().copied()),
        }
    }

    /// Resamples the surface to `rows × cols` (bilinear, no extrapolation, value
    /// range preserved). Does not modify the surface.
    pub fn resample_to(&self, rows: usize, cols: usize) -> Result<Array3<Value>> {
        self.require_values()?;
        Ok(resize(self.values_2d.view().into_dyn(), rows, cols)?.into_dimensionality::<Ix3>()?)
    }

    /// Resamples the surface to the horizontal resolution of the regular grid.
    pub fn resize_to_regular_grid(&self) -> Result<Array3<Value>> {
        let [nx, ny, _] = self.regular_grid.resolution();
        self.resample_to(nx, ny)
    }

    /// Boolean `(nx, ny, nz)` mask of the regular grid against the terrain.
    ///
    /// The terrain is resampled to `(nx, ny)` and lowered by
    /// [`voxel_offset`](MaskConfig::voxel_offset)` * dz`. A voxel is `true` when its
    /// center lies strictly above the lowered surface:
    ///
    /// ```text
    /// mask[i, j, k] = z_center[i, j, k] > terrain[i, j] - 2 * dz
    /// ```
    ///
    /// Use [`ground_mask`](TerrainSurface::ground_mask) for the complement.
    ///
    /// The result is cached until the surface is reset.
    pub fn topography_mask(&mut self) -> Result<&Array3<bool>> {
        let mask = match self.mask.take() {
            Some(mask) => {
                tracing::trace!("topography mask cache hit");
                mask
            }
            None => self.compute_mask()?,
        };
        let mask: &Array3<bool> = self.mask.insert(mask);
        Ok(mask)
    }

    /// Voxels at or below the lowered terrain surface, i.e. solid ground.
    pub fn ground_mask(&mut self) -> Result<Array3<bool>> {
        Ok(self.topography_mask()?.mapv(|above| !above))
    }

    pub fn is_mask_cached(&self) -> bool {
        self.mask.is_some()
    }

    fn compute_mask(&self) -> Result<Array3<bool>> {
        self.require_values()?;
        let [nx, ny, nz] = self.regular_grid.resolution();
        let offset = self.config.voxel_offset * self.regular_grid.dz();

        let resampled = resize(self.values_2d.view().into_dyn(), nx, ny)?;
        let lowered = surface_elevation(resampled.view())?.mapv(|z| z - offset);

        let z = self.regular_grid.z_values();
        let centers = z.to_shape((nx, ny, nz))?;

        tracing::debug!(nx, ny, nz, offset, "computing topography mask");

        let mask = Zip::indexed(&centers).par_map_collect(|(i, j, _), &z| z > lowered[[i, j]]);
        Ok(mask)
    }

    fn require_values(&self) -> Result<()> {
        if self.is_empty() {
            return Err(TopographyError::MissingPrecondition(NOT_ACTIVATED));
        }
        Ok(())
    }

    /// Writes `values_2d` to `path` as a binary `f64` array.
    ///
    /// The array is written to a sibling `.partial` file first and renamed over
    /// `path` once complete, so a failed save leaves any existing file untouched.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let partial = partial_path(path);
        let file = File::create(&partial)?;

        let written = write_values(file, &self.values_2d).and_then(|()| Ok(fs::rename(&partial, path)?));
        if written.is_err() {
            let _ = fs::remove_file(&partial);
        }
        tracing::debug!(path = %path.display(), ok = written.is_ok(), "topography saved");
        written
    }

    /// Replaces the surface with one previously written by [`save`](TerrainSurface::save).
    ///
    /// Resets coordinate overrides and the cached mask.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let values_2d: Array3<Value> = bincode::deserialize_from(reader)?;
        tracing::debug!(path = %path.display(), "topography loaded");
        Ok(self.set_values(values_2d))
    }
}

fn write_values(file: File, values_2d: &Array3<Value>) -> Result<()> {
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, values_2d)?;
    writer.flush()?;
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

/// Elevation plane of a resampled terrain: the array itself when 2D, the z
/// channel when 3D.
fn surface_elevation(resampled: ArrayViewD<'_, Value>) -> Result<Array2<Value>> {
    match resampled.ndim() {
        2 => Ok(resampled.into_dimensionality::<Ix2>()?.to_owned()),
        3 => Ok(resampled.into_dimensionality::<Ix3>()?.index_axis(Axis(2), 2).to_owned()),
        ndim => Err(TopographyError::Dimensionality { ndim }),
    }
}

fn unique_sorted(values: impl Iterator<Item = Value>) -> Vec<Value> {
    let mut v: Vec<Value> = values.collect();
    v.sort_by(|a, b| a.total_cmp(b));
    v.dedup();
    v
}
