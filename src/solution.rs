use ndarray::{Array1, Array2, Array3};

use crate::{
    error::{Result, TopographyError},
    grid::RegularGrid,
    sections::Sections,
    topography::TerrainSurface,
    types::Value,
};

/// Output of the external interpolation engine, as consumed for rendering.
///
/// Every field is flat in the order of the grid it was evaluated on: the
/// regular grid for `lith_block`, the topography surface for `geological_map`
/// and the concatenated section points for `sections`.
#[derive(Debug, Clone, Default)]
pub struct Solution {
    pub lith_block: Option<Array1<Value>>,
    pub geological_map: Option<Array1<Value>>,
    pub sections: Option<Array1<Value>>,
}

impl Solution {
    /// The lithology block reshaped to the `(nx, ny, nz)` voxel grid.
    pub fn lith_block_grid(&self, grid: &RegularGrid) -> Result<Array3<Value>> {
        let block = self
            .lith_block
            .as_ref()
            .ok_or(TopographyError::MissingPrecondition("lithology block not computed"))?;
        let [nx, ny, nz] = grid.resolution();
        Ok(block.to_shape((nx, ny, nz))?.to_owned())
    }

    /// The geological map reshaped to the topography resolution.
    pub fn geological_map_grid(&self, topography: &TerrainSurface) -> Result<Array2<Value>> {
        let map = self.geological_map.as_ref().ok_or(TopographyError::MissingPrecondition(
            "geological map not computed, activate the topography grid",
        ))?;
        Ok(map.to_shape(topography.resolution())?.to_owned())
    }

    /// Values of one section reshaped to its `[along, z]` resolution.
    pub fn section_block(&self, sections: &Sections, name: &str) -> Result<Array2<Value>> {
        let values = self
            .sections
            .as_ref()
            .ok_or(TopographyError::MissingPrecondition("no sections computed"))?;
        let (l0, l1) = sections.section_args(name)?;
        let [along, z] = sections.by_name(name)?.resolution;
        if l1 > values.len() {
            return Err(TopographyError::CellOutOfRange {
                cell: l1,
                len: values.len(),
            });
        }
        Ok(values.slice(ndarray::s![l0..l1]).to_shape((along, z))?.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{sections::Section, types::Point};

    #[test]
    fn lith_block_follows_grid_order() {
        let grid = RegularGrid::new([0., 10., 0., 10., 0., 10.], [2, 3, 4]);
        assert!(matches!(
            Solution::default().lith_block_grid(&grid),
            Err(TopographyError::MissingPrecondition(_))
        ));

        let solution = Solution {
            lith_block: Some(Array1::from_iter((0..24).map(|v| v as Value))),
            ..Default::default()
        };
        let block = solution.lith_block_grid(&grid).unwrap();
        assert_eq!(block.dim(), (2, 3, 4));
        // z fastest, x slowest
        assert_eq!(block[[0, 0, 1]], 1.0);
        assert_eq!(block[[1, 0, 0]], 12.0);

        let short = Solution {
            lith_block: Some(Array1::zeros(5)),
            ..Default::default()
        };
        assert!(matches!(short.lith_block_grid(&grid), Err(TopographyError::Shape(_))));
    }

    #[test]
    fn geological_map_requires_topography_solution() {
        let grid = Arc::new(RegularGrid::new([0., 10., 0., 10., 0., 10.], [2, 2, 2]));
        let topo = TerrainSurface::from_values(grid, ndarray::Array3::zeros((3, 4, 3)));

        let solution = Solution::default();
        assert!(matches!(
            solution.geological_map_grid(&topo),
            Err(TopographyError::MissingPrecondition(_))
        ));

        let solution = Solution {
            geological_map: Some(Array1::from_iter((0..12).map(|v| v as Value))),
            ..Default::default()
        };
        let map = solution.geological_map_grid(&topo).unwrap();
        assert_eq!(map.dim(), (3, 4));
        assert_eq!(map[[1, 0]], 4.0);
    }

    #[test]
    fn section_block_slices_by_section_args() {
        let sections = Sections::new([0., 10., 0., 10., 0., 10.])
            .with_section(Section::new("a", Point::new(0., 0.), Point::new(0., 10.), [2, 3]))
            .with_section(Section::new("b", Point::new(0., 0.), Point::new(10., 0.), [4, 2]));

        assert!(Solution::default().section_block(&sections, "a").is_err());

        let solution = Solution {
            sections: Some(Array1::from_iter((0..14).map(|v| v as Value))),
            ..Default::default()
        };
        let b = solution.section_block(&sections, "b").unwrap();
        assert_eq!(b.dim(), (4, 2));
        assert_eq!(b[[0, 0]], 6.0);
        assert_eq!(b[[3, 1]], 13.0);
        assert!(matches!(
            solution.section_block(&sections, "c"),
            Err(TopographyError::UnknownSection(_))
        ));
    }
}
