//! Terrain occupancy masks over regular voxel grids and terrain profiles for
//! geological cross-sections.
//!
//! ```text
//! RegularGrid ──► TerrainSurface ──► topography_mask()      (nx, ny, nz) bool
//!                       │
//! Sections ─────────────┴──► SectionProfiler ──► slice_for_section()  closed polygon
//! ```

pub mod config;
pub mod error;
pub mod grid;
pub mod interp;
pub mod profile;
pub mod sections;
pub mod solution;
pub mod topography;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::{MaskConfig, ProfileConfig, ProfileFill};
pub use error::{Result, TopographyError};
pub use grid::RegularGrid;
pub use profile::{SectionOrientation, SectionProfiler, SliceAxis};
pub use sections::{Section, Sections};
pub use solution::Solution;
pub use topography::TerrainSurface;
pub use types::{Extent, Point, ProfilePoint, Value};
