use nalgebra::{Point2, Vector2};

/// Coordinate and elevation value.
pub type Value = f64;

/// A horizontal (x, y) point.
pub type Point = Point2<Value>;

/// A horizontal (x, y) vector.
pub type Vector = Vector2<Value>;

/// One `(distance, elevation)` sample of a terrain profile.
pub type ProfilePoint = [Value; 2];

/// Bounding box of the model: horizontal bounds plus the vertical range.
///
/// All grids and terrain data are assumed to span it exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub xmin: Value,
    pub xmax: Value,
    pub ymin: Value,
    pub ymax: Value,
    pub zmin: Value,
    pub zmax: Value,
}

impl Extent {
    pub fn new(xmin: Value, xmax: Value, ymin: Value, ymax: Value, zmin: Value, zmax: Value) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
            zmin,
            zmax,
        }
    }

    pub fn width(&self) -> Value {
        self.xmax - self.xmin
    }

    pub fn depth(&self) -> Value {
        self.ymax - self.ymin
    }

    pub fn height(&self) -> Value {
        self.zmax - self.zmin
    }

    /// `[xmin, xmax, ymin, ymax, zmin, zmax]`
    pub fn to_array(&self) -> [Value; 6] {
        [self.xmin, self.xmax, self.ymin, self.ymax, self.zmin, self.zmax]
    }
}

impl From<[Value; 6]> for Extent {
    fn from(e: [Value; 6]) -> Self {
        Self::new(e[0], e[1], e[2], e[3], e[4], e[5])
    }
}
