use crate::types::Value;

/// Configuration for the terrain voxel mask.
///
/// ```rust,ignore
/// let topo = TerrainSurface::new(grid).with_config(MaskConfig::default().with_voxel_offset(1.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskConfig {
    /// How far the terrain is lowered before voxels are classified, in voxel
    /// heights (`dz`).
    ///
    /// Boundary voxels then consistently fall on one side of the surface
    /// instead of straddling it. Default: `2.0`.
    pub voxel_offset: Value,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self { voxel_offset: 2.0 }
    }
}

impl MaskConfig {
    pub fn with_voxel_offset(mut self, voxel_offset: Value) -> Self {
        self.voxel_offset = voxel_offset;
        self
    }
}

/// Which vertical bound of the model closes a section profile polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileFill {
    /// Close against the model top: filling the polygon masks everything above ground.
    #[default]
    ModelTop,
    /// Close against the model base: filling the polygon paints solid ground.
    ModelBase,
}

/// Configuration for [`SectionProfiler`](crate::profile::SectionProfiler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProfileConfig {
    pub fill: ProfileFill,
}

impl ProfileConfig {
    pub fn with_fill(mut self, fill: ProfileFill) -> Self {
        self.fill = fill;
        self
    }
}
