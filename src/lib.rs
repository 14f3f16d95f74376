//! Sudoku grid recognition from photographs.
//!
//! The pipeline binarizes the photo, finds the 81 cell contours, orders
//! them row-major, isolates each cell's glyph and hands it to a pluggable
//! [`DigitClassifier`]. The result is a [`Board`] of 81 characters where
//! `'0'` is an empty cell.

pub mod board;
pub mod config;
pub mod detection;
pub mod error;
pub mod models;

pub use board::{assemble_board, Board};
pub use config::{
    AreaBounds, GlyphFilterConfig, LocatorConfig, RecognizerConfig, ThresholdConfig,
    ThresholdPolarity, GRID_CELLS,
};
pub use detection::ocr::{DigitClassifier, OcrsClassifier, DIGIT_ALPHABET};
pub use detection::tesseract::TesseractClassifier;
pub use detection::Recognizer;
pub use error::{BoardParseError, RecognitionError, Result};
pub use models::{BoundingBox, CellCandidate};

use image::DynamicImage;

/// Recognize a board with the default configuration.
pub fn recognize(img: &DynamicImage, classifier: Box<dyn DigitClassifier>) -> Result<Board> {
    Recognizer::new(RecognizerConfig::default(), classifier)?.recognize(img)
}
