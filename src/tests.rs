//! Whole-pipeline scenarios: grid, terrain, mask and section profiles together.

use std::sync::Arc;

use ndarray::Axis;

use crate::{
    Point, RegularGrid, Section, SectionProfiler, Sections, TerrainSurface, Value,
    topography::tests::terrain_grid,
};

const EXTENT: [Value; 6] = [0., 100., 0., 100., -50., 50.];

fn flat_model() -> (TerrainSurface, Sections) {
    let grid = Arc::new(RegularGrid::new(EXTENT, [10, 10, 10]));
    let values = terrain_grid(grid.extent(), 10, 10, |_, _| 10.0);
    let topo = TerrainSurface::from_values(grid, values);
    let sections = Sections::new(EXTENT)
        .with_section(Section::new("ns", Point::new(50., 0.), Point::new(50., 100.), [10, 10]))
        .with_section(Section::new("diag", Point::new(0., 0.), Point::new(100., 100.), [10, 10]));
    (topo, sections)
}

#[test]
fn flat_terrain_mask_marks_voxels_above_lowered_surface() {
    let (mut topo, _) = flat_model();
    let grid = topo.regular_grid().clone();
    let threshold = 10.0 - 2.0 * grid.dz();

    let mask = topo.topography_mask().unwrap();
    assert_eq!(mask.dim(), (10, 10, 10));
    for (&above, &z) in mask.iter().zip(grid.z_values().iter()) {
        assert_eq!(above, z > threshold);
    }

    // every column shares the same split: 4 voxels at or below -10, 6 above
    for column in mask.lanes(Axis(2)) {
        let flags: Vec<bool> = column.to_vec();
        assert_eq!(flags, [false, false, false, false, true, true, true, true, true, true]);
    }
}

#[test]
fn flat_terrain_vertical_section_profile() {
    let (topo, sections) = flat_model();
    let profiler = SectionProfiler::new(&topo, &sections);

    let profile = profiler.profile_for_section(0).unwrap();
    assert_eq!(profile.len(), 10);
    assert!(profile.iter().all(|p| p[1] == 10.0));
    assert_eq!(profile[0][0], 0.0);
    assert_eq!(profile[9][0], 100.0);
    assert!(profile.windows(2).all(|w| w[0][0] < w[1][0]));

    let closed = profiler.slice_for_section(0).unwrap();
    assert_eq!(closed.len(), 14);
    assert_eq!(closed[11], [100.0, 50.0]);
    assert_eq!(closed[12], [0.0, 50.0]);
    assert_eq!(closed[13], [0.0, 10.0]);
}

#[test]
fn flat_terrain_diagonal_section_profile() {
    let (topo, sections) = flat_model();
    let profiler = SectionProfiler::new(&topo, &sections);

    let profile = profiler.profile_for_section(1).unwrap();
    assert_eq!(profile.len(), 10);
    assert!(profile.iter().all(|p| p[1] == 10.0));
    let dist = sections.dist()[1];
    assert!((profile[9][0] - dist).abs() < 1e-9);
}

#[test]
fn resetting_terrain_refreshes_mask_and_profiles() {
    let (mut topo, sections) = flat_model();
    let before = topo.topography_mask().unwrap().clone();

    let values = terrain_grid(topo.extent(), 10, 10, |_, _| -30.0);
    topo.set_values(values);

    let after = topo.topography_mask().unwrap().clone();
    assert_ne!(before, after);
    // threshold -50: every voxel center lies above it
    assert!(after.iter().all(|&above| above));

    let profiler = SectionProfiler::new(&topo, &sections);
    let profile = profiler.profile_for_section(0).unwrap();
    assert!(profile.iter().all(|p| p[1] == -30.0));
}
