pub mod contours;
pub mod geometry;
pub mod glyph;
pub mod grid;
pub mod ocr;
pub mod preprocessing;
pub mod tesseract;

use image::{DynamicImage, GrayImage, ImageReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::board::{assemble_board, Board};
use crate::config::RecognizerConfig;
use crate::error::{RecognitionError, Result};
use crate::models::BoundingBox;
use ocr::DigitClassifier;

/// Image-to-board recognizer: preprocessing, cell location, ordering,
/// per-cell classification and assembly.
///
/// Holds no per-run state, so one recognizer can serve concurrent calls.
pub struct Recognizer {
    config: RecognizerConfig,
    classifier: Box<dyn DigitClassifier>,
    verbose: bool,
    debug_dir: Option<PathBuf>,
}

impl Recognizer {
    pub fn new(config: RecognizerConfig, classifier: Box<dyn DigitClassifier>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            classifier,
            verbose: false,
            debug_dir: None,
        })
    }

    /// Log the recognized grid row by row after each run.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(RecognitionError::InvalidConfig(format!(
                    "debug directory is not empty: {}",
                    output_dir.display()
                )));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }
        self.debug_dir = Some(output_dir);
        Ok(self)
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// Decode an image file and recognize it.
    pub fn recognize_file(&self, path: &Path) -> Result<Board> {
        let img = ImageReader::open(path)?.decode()?;
        debug!(path = %path.display(), width = img.width(), height = img.height(), "image loaded");
        self.recognize(&img)
    }

    /// Recognize the board in `img`.
    pub fn recognize(&self, img: &DynamicImage) -> Result<Board> {
        let binary = self.binarize(img)?;
        let boxes = self.locate_in_binary(&binary)?;

        let cells: Vec<GrayImage> = boxes.iter().map(|b| b.crop(&binary)).collect();
        self.save_debug_set("02_cells", &cells)?;

        let glyphs: Vec<GrayImage> = cells
            .iter()
            .map(|cell| glyph::isolate_glyph(cell, &self.config.glyph))
            .collect();
        self.save_debug_set("03_glyphs", &glyphs)?;

        let values: Vec<char> = glyphs
            .iter()
            .enumerate()
            .map(|(i, g)| {
                let value = glyph::classify_glyph(g, self.classifier.as_ref());
                debug!(row = i / 9, col = i % 9, value = %value, "classified cell");
                value
            })
            .collect();

        let board = assemble_board(&values);
        info!(givens = board.givens(), classifier = self.classifier.name(), "board recognized");
        if self.verbose {
            for row in board.rows() {
                info!("{}", row);
            }
        }
        Ok(board)
    }

    /// Ordered cell boxes without running OCR.
    pub fn locate(&self, img: &DynamicImage) -> Result<Vec<BoundingBox>> {
        let binary = self.binarize(img)?;
        self.locate_in_binary(&binary)
    }

    fn binarize(&self, img: &DynamicImage) -> Result<GrayImage> {
        self.save_debug_image("00_input.png", img)?;
        let binary = preprocessing::preprocess(img, &self.config.threshold)?;
        self.save_debug_image("01_binary.png", &DynamicImage::ImageLuma8(binary.clone()))?;
        Ok(binary)
    }

    fn locate_in_binary(&self, binary: &GrayImage) -> Result<Vec<BoundingBox>> {
        let boxes = contours::locate_cells(binary, &self.config.locator)?;
        let ordered = grid::order_cells(boxes);
        info!(
            cells = ordered.len(),
            average_height = grid::average_height(&ordered),
            "grid located"
        );
        Ok(ordered)
    }

    fn save_debug_image(&self, name: &str, img: &DynamicImage) -> Result<()> {
        let Some(dir) = &self.debug_dir else {
            return Ok(());
        };
        let path = dir.join(name);
        img.save(&path)?;
        debug!(path = %path.display(), "saved debug image");
        Ok(())
    }

    fn save_debug_set(&self, subdir: &str, images: &[GrayImage]) -> Result<()> {
        let Some(dir) = &self.debug_dir else {
            return Ok(());
        };
        let step_dir = dir.join(subdir);
        std::fs::create_dir_all(&step_dir)?;
        for (idx, img) in images.iter().enumerate() {
            img.save(step_dir.join(format!("{:02}.png", idx + 1)))?;
        }
        debug!(count = images.len(), dir = %step_dir.display(), "saved debug images");
        Ok(())
    }
}
