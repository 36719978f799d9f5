use derive_more::{Display, From};

pub type Result<T> = core::result::Result<T, TopographyError>;

#[derive(Debug, Display, From)]
pub enum TopographyError {
    /// A resampled array came back with neither 2 nor 3 dimensions.
    #[display("resampled array has {ndim} dimensions, expected 2 or 3")]
    Dimensionality { ndim: usize },

    #[display("array shape error: {_0}")]
    #[from]
    Shape(ndarray::ShapeError),

    #[display("cannot resample an empty array")]
    EmptyArray,

    /// The bounding sub-block of a diagonal section has zero width or height.
    #[display("degenerate diagonal section: {x_count} x-values against {z_count} elevations")]
    DegenerateSection { x_count: usize, z_count: usize },

    /// An axis-aligned terrain slice whose orthogonal coordinate is not constant.
    #[display("terrain cell {cell} is not aligned: {coordinate} coordinate varies along the slice")]
    Orthogonality {
        coordinate: &'static str,
        cell: usize,
    },

    #[display("terrain cell {cell} out of range (0..{len})")]
    CellOutOfRange { cell: usize, len: usize },

    #[display("{_0}")]
    MissingPrecondition(&'static str),

    #[display("unknown section: {_0}")]
    UnknownSection(String),

    #[display("i/o error: {_0}")]
    #[from]
    Io(std::io::Error),

    #[display("encoding error: {_0}")]
    #[from]
    Encoding(bincode::Error),
}

impl std::error::Error for TopographyError {}
