use ndarray::{Array2, ArrayView1, Axis};

use crate::types::{Extent, Value};

/// A regular voxel grid spanning a model [`Extent`].
///
/// The grid has `nx × ny × nz` voxels. Voxel centers are stored flat as an
/// `(nx * ny * nz, 3)` array ordered with x slowest and z fastest, so that the
/// z column reshapes directly into an `(nx, ny, nz)` volume.
#[derive(Debug, Clone)]
pub struct RegularGrid {
    extent: Extent,
    resolution: [usize; 3],
    values: Array2<Value>,
}

impl RegularGrid {
    /// Creates a grid and computes its voxel centers.
    ///
    /// Center of voxel `i` along an axis is `min + (i + 0.5) * step`.
    pub fn new(extent: impl Into<Extent>, resolution: [usize; 3]) -> Self {
        let extent = extent.into();
        let [nx, ny, nz] = resolution;
        let (dx, dy, dz) = steps(&extent, resolution);

        let values = Array2::from_shape_fn((nx * ny * nz, 3), |(n, c)| {
            let i = n / (ny * nz);
            let j = (n / nz) % ny;
            let k = n % nz;
            match c {
                0 => extent.xmin + (i as Value + 0.5) * dx,
                1 => extent.ymin + (j as Value + 0.5) * dy,
                _ => extent.zmin + (k as Value + 0.5) * dz,
            }
        });

        Self {
            extent,
            resolution,
            values,
        }
    }

    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    /// `[nx, ny, nz]`
    pub fn resolution(&self) -> [usize; 3] {
        self.resolution
    }

    pub fn dx(&self) -> Value {
        steps(&self.extent, self.resolution).0
    }

    pub fn dy(&self) -> Value {
        steps(&self.extent, self.resolution).1
    }

    /// Voxel height.
    pub fn dz(&self) -> Value {
        steps(&self.extent, self.resolution).2
    }

    /// Flattened voxel centers, one `[x, y, z]` row per voxel.
    pub fn values(&self) -> &Array2<Value> {
        &self.values
    }

    /// Voxel-center elevations in flat order.
    pub fn z_values(&self) -> ArrayView1<'_, Value> {
        self.values.index_axis(Axis(1), 2)
    }

    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn steps(extent: &Extent, [nx, ny, nz]: [usize; 3]) -> (Value, Value, Value) {
    (
        extent.width() / nx as Value,
        extent.depth() / ny as Value,
        extent.height() / nz as Value,
    )
}
