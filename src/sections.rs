use ndarray::Array2;

use crate::{
    error::{Result, TopographyError},
    interp::linspace,
    profile::SectionOrientation,
    types::{Extent, Point, Value, Vector},
};

/// A vertical cutting plane through the model, defined by two horizontal endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub start: Point,
    pub end: Point,
    /// Pixel resolution of the rendered section: `[samples along the line, samples in z]`.
    pub resolution: [usize; 2],
}

impl Section {
    pub fn new(name: impl Into<String>, start: Point, end: Point, resolution: [usize; 2]) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            resolution,
        }
    }

    /// Total length of the section line.
    pub fn dist(&self) -> Value {
        let line: Vector = self.end - self.start;
        line.norm()
    }

    /// X coordinate of every sample along the line.
    pub fn xaxis(&self) -> Vec<Value> {
        linspace(self.start.x, self.end.x, self.resolution[0])
    }

    /// Y coordinate of every sample along the line.
    pub fn yaxis(&self) -> Vec<Value> {
        linspace(self.start.y, self.end.y, self.resolution[0])
    }

    /// Number of points this section contributes to the section grid.
    pub fn len(&self) -> usize {
        self.resolution[0] * self.resolution[1]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordered registry of named [`Section`]s over a model extent.
///
/// Sections keep their insertion order; indices into the registry are stable
/// until a section is removed.
#[derive(Debug, Clone)]
pub struct Sections {
    extent: Extent,
    sections: Vec<Section>,
}

impl Sections {
    pub fn new(extent: impl Into<Extent>) -> Self {
        Self {
            extent: extent.into(),
            sections: Vec::new(),
        }
    }

    /// Adds a section, replacing any section with the same name in place.
    pub fn with_section(mut self, section: Section) -> Self {
        self.insert(section);
        self
    }

    pub fn insert(&mut self, section: Section) -> &mut Self {
        match self.sections.iter_mut().find(|s| s.name == section.name) {
            Some(existing) => *existing = section,
            None => self.sections.push(section),
        }
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Section> {
        let index = self.index_of(name)?;
        Some(self.sections.remove(index))
    }

    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.name == name)
    }

    pub fn get(&self, index: usize) -> Result<&Section> {
        self.sections
            .get(index)
            .ok_or_else(|| TopographyError::UnknownSection(format!("#{index}")))
    }

    pub fn by_name(&self, name: &str) -> Result<&Section> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| TopographyError::UnknownSection(name.to_string()))
    }

    /// Length of every section line, in registry order.
    pub fn dist(&self) -> Vec<Value> {
        self.sections.iter().map(Section::dist).collect()
    }

    /// `(l0, l1)` bounds of a section's points within [`points`](Sections::points).
    pub fn section_args(&self, name: &str) -> Result<(usize, usize)> {
        let index = self
            .index_of(name)
            .ok_or_else(|| TopographyError::UnknownSection(name.to_string()))?;
        let l0: usize = self.sections[..index].iter().map(Section::len).sum();
        Ok((l0, l0 + self.sections[index].len()))
    }

    /// Sample points of all sections, `(n, 3)`.
    ///
    /// Each section contributes `resolution[0] * resolution[1]` points, walking the
    /// line from start to end and, at every step, the model from `zmin` to `zmax`.
    pub fn points(&self) -> Array2<Value> {
        let total: usize = self.sections.iter().map(Section::len).sum();
        let mut flat = Vec::with_capacity(total * 3);
        for section in &self.sections {
            let zaxis = linspace(self.extent.zmin, self.extent.zmax, section.resolution[1]);
            for (x, y) in section.xaxis().into_iter().zip(section.yaxis()) {
                for &z in &zaxis {
                    flat.extend_from_slice(&[x, y, z]);
                }
            }
        }
        Array2::from_shape_fn((total, 3), |(n, c)| flat[n * 3 + c])
    }

    /// Tick labels for a section plot with `n` ticks, plus the axis name.
    ///
    /// Constant-x sections are labelled with y values (`"Y"`), constant-y sections
    /// with x values (`"X"`) and diagonal ones with `"x,\ny"` pairs (`"X,Y"`).
    pub fn axis_labels(&self, index: usize, n: usize) -> Result<(Vec<String>, &'static str)> {
        let section = self.get(index)?;
        let orientation = SectionOrientation::classify(&section.start, &section.end);
        let name = match orientation {
            SectionOrientation::Vertical => "Y",
            SectionOrientation::Horizontal => "X",
            SectionOrientation::Diagonal => "X,Y",
        };
        let (xaxis, yaxis) = (section.xaxis(), section.yaxis());
        if xaxis.is_empty() || n == 0 {
            return Ok((Vec::new(), name));
        }

        let last = xaxis.len() - 1;
        let ticks: Vec<usize> = linspace(0.0, xaxis.len() as Value, n)
            .into_iter()
            .map(|t| (t as usize).min(last))
            .collect();

        let labels = ticks
            .iter()
            .map(|&i| match orientation {
                SectionOrientation::Vertical => format!("{}", yaxis[i] as i64),
                SectionOrientation::Horizontal => format!("{}", xaxis[i] as i64),
                SectionOrientation::Diagonal => format!("{},\n{}", xaxis[i] as i64, yaxis[i] as i64),
            })
            .collect();
        Ok((labels, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Sections {
        Sections::new([0., 100., 0., 100., -50., 50.])
            .with_section(Section::new("ns", Point::new(50., 0.), Point::new(50., 100.), [10, 5]))
            .with_section(Section::new("diag", Point::new(0., 0.), Point::new(30., 40.), [6, 4]))
    }

    #[test]
    fn dist_is_line_length() {
        let s = registry();
        assert_eq!(s.dist(), vec![100.0, 50.0]);
    }

    #[test]
    fn insert_replaces_by_name() {
        let mut s = registry();
        s.insert(Section::new("ns", Point::new(10., 0.), Point::new(10., 20.), [2, 2]));
        assert_eq!(s.len(), 2);
        assert_eq!(s.by_name("ns").unwrap().dist(), 20.0);
        assert_eq!(s.names(), vec!["ns", "diag"]);
    }

    #[test]
    fn unknown_sections_are_errors() {
        let s = registry();
        assert!(matches!(s.get(7), Err(TopographyError::UnknownSection(_))));
        assert!(matches!(s.by_name("ew"), Err(TopographyError::UnknownSection(_))));
        assert!(s.section_args("ew").is_err());
    }

    #[test]
    fn section_args_index_points() {
        let s = registry();
        assert_eq!(s.section_args("ns").unwrap(), (0, 50));
        assert_eq!(s.section_args("diag").unwrap(), (50, 74));

        let points = s.points();
        assert_eq!(points.nrows(), 74);
        // first diagonal sample sits on the start point at the model base
        assert_eq!(points.row(50).to_vec(), vec![0.0, 0.0, -50.0]);
        // last one sits on the end point at the model top
        assert_eq!(points.row(73).to_vec(), vec![30.0, 40.0, 50.0]);
        assert!(points.rows().into_iter().take(50).all(|r| r[0] == 50.0));
    }

    #[test]
    fn remove_shifts_following_sections() {
        let mut s = registry();
        assert!(s.remove("ns").is_some());
        assert_eq!(s.section_args("diag").unwrap(), (0, 24));
        assert!(s.remove("ns").is_none());
    }

    #[test]
    fn axis_labels_follow_orientation() {
        let s = registry();
        let (labels, name) = s.axis_labels(0, 3).unwrap();
        assert_eq!(name, "Y");
        assert_eq!(labels, vec!["0", "55", "100"]);

        let (labels, name) = s.axis_labels(1, 2).unwrap();
        assert_eq!(name, "X,Y");
        assert_eq!(labels, vec!["0,\n0", "30,\n40"]);
    }

    #[test]
    fn axis_labels_for_constant_y_section_use_x() {
        let s = registry().with_section(Section::new("ew", Point::new(0., 20.), Point::new(90., 20.), [4, 2]));
        let (labels, name) = s.axis_labels(2, 2).unwrap();
        assert_eq!(name, "X");
        assert_eq!(labels, vec!["0", "90"]);

        let (labels, name) = s.axis_labels(2, 0).unwrap();
        assert!(labels.is_empty());
        assert_eq!(name, "X");
    }
}
