use thiserror::Error;

/// Errors that abort a whole recognition run.
///
/// Per-cell classification failures are not represented here: they are
/// recovered locally as an empty cell and never reach the caller.
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// The input image has no pixels.
    #[error("invalid image: {width}x{height} has zero area")]
    InvalidImage { width: u32, height: u32 },

    /// The number of cell-shaped contours did not match the grid size.
    #[error("grid not found: expected {expected} cells, found {found}")]
    GridNotFound { found: usize, expected: usize },

    /// Decoding the input or writing a debug image failed.
    #[error("image codec")]
    Image(#[from] image::ImageError),

    #[error("io")]
    Io(#[from] std::io::Error),

    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Errors from parsing a board string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardParseError {
    #[error("board must have 81 cells, got {0}")]
    Length(usize),
    #[error("invalid character {ch:?} at index {index}")]
    InvalidChar { index: usize, ch: char },
}

pub type Result<T> = std::result::Result<T, RecognitionError>;
