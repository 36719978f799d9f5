use nalgebra::{DMatrix, DVector};
use ndarray::{ArrayView2, Axis, s};

use crate::{
    config::{ProfileConfig, ProfileFill},
    error::{Result, TopographyError},
    interp::{lerp, linspace, nearest_index, remap},
    sections::{Section, Sections},
    topography::TerrainSurface,
    types::{Point, ProfilePoint, Value},
};

/// How a section line sits over the terrain grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionOrientation {
    /// Both endpoints share x: the profile runs along y.
    Vertical,
    /// Both endpoints share y: the profile runs along x.
    Horizontal,
    Diagonal,
}

impl SectionOrientation {
    pub fn classify(start: &Point, end: &Point) -> Self {
        if start.x == end.x {
            Self::Vertical
        } else if start.y == end.y {
            Self::Horizontal
        } else {
            Self::Diagonal
        }
    }
}

/// Direction an axis-aligned terrain slice runs in.
///
/// [`SliceAxis::Y`] reads one terrain row (fixed x cell), [`SliceAxis::X`] one
/// terrain column (fixed y cell).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceAxis {
    X,
    Y,
}

/// Extracts terrain profiles along the sections of a [`Sections`] registry.
///
/// Profiles are `(distance, elevation)` pairs. [`slice_for_section`](SectionProfiler::slice_for_section)
/// additionally closes them into a polygon for fill rendering:
///
/// ```text
///  (0, bound) ----------------- (dist, bound)
///      |                             |
///  (0, z0) ~~~~ terrain ~~~~~~~ (dist, zn)
/// ```
pub struct SectionProfiler<'a> {
    topography: &'a TerrainSurface,
    sections: &'a Sections,
    config: ProfileConfig,
}

impl<'a> SectionProfiler<'a> {
    pub fn new(topography: &'a TerrainSurface, sections: &'a Sections) -> Self {
        Self {
            topography,
            sections,
            config: ProfileConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ProfileConfig) -> Self {
        self.config = config;
        self
    }

    /// Closed terrain polygon for the section at `index`.
    pub fn slice_for_section(&self, index: usize) -> Result<Vec<ProfilePoint>> {
        let section = self.section(index)?;
        let profile = self.profile(section)?;
        Ok(close_polygon(profile, section.dist(), self.fill_bound()))
    }

    pub fn slice_for_section_named(&self, name: &str) -> Result<Vec<ProfilePoint>> {
        let index = self
            .sections
            .index_of(name)
            .ok_or_else(|| TopographyError::UnknownSection(name.to_string()))?;
        self.slice_for_section(index)
    }

    /// Open terrain line for the section at `index`, distances spanning `0..=dist`.
    pub fn profile_for_section(&self, index: usize) -> Result<Vec<ProfilePoint>> {
        let section = self.section(index)?;
        self.profile(section)
    }

    fn section(&self, index: usize) -> Result<&'a Section> {
        if self.sections.is_empty() {
            return Err(TopographyError::MissingPrecondition("no sections defined"));
        }
        self.sections.get(index)
    }

    fn profile(&self, section: &Section) -> Result<Vec<ProfilePoint>> {
        self.require_topography()?;
        let raw = match SectionOrientation::classify(&section.start, &section.end) {
            SectionOrientation::Vertical => {
                let cell = self.cell_index(SliceAxis::Y, section.start.x);
                self.slice_along(SliceAxis::Y, cell)?
            }
            SectionOrientation::Horizontal => {
                let cell = self.cell_index(SliceAxis::X, section.start.y);
                self.slice_along(SliceAxis::X, cell)?
            }
            SectionOrientation::Diagonal => self.slice_diagonal(section.start, section.end)?,
        };
        tracing::debug!(section = %section.name, samples = raw.len(), "terrain profile sliced");
        if raw.len() < 2 {
            return Err(TopographyError::DegenerateSection {
                x_count: raw.len(),
                z_count: raw.len(),
            });
        }
        Ok(reparameterize(raw, section.dist()))
    }

    /// Nearest terrain cell to `coordinate` across the slice direction.
    ///
    /// For [`SliceAxis::Y`] the coordinate is an x value mapped onto terrain rows,
    /// for [`SliceAxis::X`] a y value mapped onto terrain columns:
    ///
    /// ```text
    /// cell = round((coordinate - origin) / (span / cells))
    /// ```
    ///
    /// Coordinates outside the extent are clamped to the border cell.
    pub fn cell_index(&self, axis: SliceAxis, coordinate: Value) -> usize {
        let extent = self.topography.extent();
        let (rows, cols) = self.topography.resolution();
        let (origin, span, cells) = match axis {
            SliceAxis::Y => (extent.xmin, extent.width(), rows),
            SliceAxis::X => (extent.ymin, extent.depth(), cols),
        };
        let last = cells.saturating_sub(1);
        let cell = remap(coordinate, [origin, origin + span], [0.0, cells as Value]).round();
        if cell < 0.0 || cell > last as Value {
            log::warn!("section coordinate {coordinate} maps to terrain cell {cell}, clamped into 0..={last}");
        }
        (cell.max(0.0) as usize).min(last)
    }

    /// One terrain row ([`SliceAxis::Y`]) or column ([`SliceAxis::X`]) as
    /// `(coordinate along the slice, elevation)` pairs truncated toward zero.
    ///
    /// Returns [`TopographyError::Orthogonality`] if the fixed coordinate varies
    /// along the slice, which means the terrain grid is not rectangular.
    pub fn slice_along(&self, axis: SliceAxis, cell: usize) -> Result<Vec<ProfilePoint>> {
        self.require_topography()?;
        let values = self.topography.values_2d();
        let (fixed_axis, along, orthogonal, coordinate) = match axis {
            SliceAxis::Y => (Axis(0), 1, 0, "x"),
            SliceAxis::X => (Axis(1), 0, 1, "y"),
        };

        let len = values.len_of(fixed_axis);
        if cell >= len {
            return Err(TopographyError::CellOutOfRange { cell, len });
        }

        let line = values.index_axis(fixed_axis, cell);
        let fixed = line[[0, orthogonal]];
        if line.column(orthogonal).iter().any(|&c| c != fixed) {
            return Err(TopographyError::Orthogonality { coordinate, cell });
        }

        Ok(line
            .rows()
            .into_iter()
            .map(|p| [p[along].trunc(), p[2].trunc()])
            .collect())
    }

    /// Terrain profile along an arbitrary line from `start` to `end`.
    ///
    /// The line is fitted through the endpoints, the terrain rows nearest each
    /// endpoint's x bound the sub-block in x, and the fitted line's y at those
    /// rows bounds it in y. Elevations come from [`diagonal_profile_between`].
    ///
    /// Returns `(x, elevation)` pairs, or [`TopographyError::DegenerateSection`]
    /// when the sub-block has zero width or height (the x and elevation counts
    /// then disagree). Endpoints must not share x.
    pub fn slice_diagonal(&self, start: Point, end: Point) -> Result<Vec<ProfilePoint>> {
        self.require_topography()?;
        let values = self.topography.values_2d();
        let (m, c) = fit_line(&[start, end])?;

        let xs = values.slice(s![.., 0, 0]);
        let ys = values.slice(s![0, .., 1]);

        let x_idx = directed_span(
            nearest_index(&xs, start.x).unwrap_or_default(),
            nearest_index(&xs, end.x).unwrap_or_default(),
        );
        let xvals: Vec<Value> = x_idx.iter().map(|&i| xs[i]).collect();

        let y_at = |x: Value| (m * x + c).trunc();
        let (x_first, x_last) = (xvals[0], xvals[xvals.len() - 1]);
        let y_idx = directed_span(
            nearest_index(&ys, y_at(x_first)).unwrap_or_default(),
            nearest_index(&ys, y_at(x_last)).unwrap_or_default(),
        );

        let zvals = diagonal_profile_between(self.topography.elevation(), &x_idx, &y_idx);
        if xvals.len() != zvals.len() {
            return Err(TopographyError::DegenerateSection {
                x_count: xvals.len(),
                z_count: zvals.len(),
            });
        }

        Ok(xvals.into_iter().zip(zvals).map(|(x, z)| [x, z]).collect())
    }

    fn fill_bound(&self) -> Value {
        let extent = self.topography.extent();
        match self.config.fill {
            ProfileFill::ModelTop => extent.zmax,
            ProfileFill::ModelBase => extent.zmin,
        }
    }

    fn require_topography(&self) -> Result<()> {
        if self.topography.is_empty() {
            return Err(TopographyError::MissingPrecondition("topography not activated"));
        }
        Ok(())
    }
}

/// Elevations along the diagonal of the sub-block `elevation[x_idx, y_idx]`.
///
/// Both index lists are ordered from the section start to its end, so a line
/// heading toward lower rows or columns reads the flipped block and the walk
/// always follows the section direction. One elevation is produced per x index,
/// with the y index advancing proportionally:
///
/// ```text
/// k  ->  (x_idx[k], y_idx[round(k * (ny - 1) / (nx - 1))])
/// ```
///
/// The block must span at least two cells on each axis. A zero-width or
/// zero-height block yields no elevations.
pub fn diagonal_profile_between(elevation: ArrayView2<'_, Value>, x_idx: &[usize], y_idx: &[usize]) -> Vec<Value> {
    let (nx, ny) = (x_idx.len(), y_idx.len());
    if nx < 2 || ny < 2 {
        return Vec::new();
    }
    let x_last = (nx - 1) as Value;
    let y_last = (ny - 1) as Value;
    (0..nx)
        .map(|k| {
            let j = lerp(0.0, y_last, k as Value / x_last).round() as usize;
            elevation[[x_idx[k], y_idx[j]]]
        })
        .collect()
}

/// Replaces the first coordinate of every point with evenly spaced distances
/// from `0` to `dist`.
///
/// A single point gets distance `0`; profiles need two samples to reach `dist`.
pub fn reparameterize(mut profile: Vec<ProfilePoint>, dist: Value) -> Vec<ProfilePoint> {
    let distances = linspace(0.0, dist, profile.len());
    for (point, d) in profile.iter_mut().zip(distances) {
        point[0] = d;
    }
    profile
}

/// Appends the four corners that turn a profile into a fillable polygon:
/// `(dist, last z)`, `(dist, bound)`, `(0, bound)`, `(0, first z)`.
pub fn close_polygon(mut profile: Vec<ProfilePoint>, dist: Value, bound: Value) -> Vec<ProfilePoint> {
    let first = profile.first().map_or(bound, |p| p[1]);
    let last = profile.last().map_or(bound, |p| p[1]);
    profile.extend_from_slice(&[[dist, last], [dist, bound], [0.0, bound], [0.0, first]]);
    profile
}

/// Least-squares fit of `y = m * x + c` through `points`.
fn fit_line(points: &[Point]) -> Result<(Value, Value)> {
    let a = DMatrix::from_fn(points.len(), 2, |r, col| if col == 0 { points[r].x } else { 1.0 });
    let b = DVector::from_iterator(points.len(), points.iter().map(|p| p.y));
    let solution = a
        .svd(true, true)
        .solve(&b, Value::EPSILON)
        .map_err(|_| TopographyError::DegenerateSection {
            x_count: points.len(),
            z_count: 0,
        })?;
    Ok((solution[0], solution[1]))
}

/// Inclusive index range from `from` to `to`, descending when `to < from`.
fn directed_span(from: usize, to: usize) -> Vec<usize> {
    if from <= to {
        (from..=to).collect()
    } else {
        (to..=from).rev().collect()
    }
}
