use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{RecognitionError, Result};

/// Number of cells in a 9x9 grid.
pub const GRID_CELLS: usize = 81;

/// Top-level recognizer settings. `Default` reproduces the values the
/// recognizer was calibrated with.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    pub threshold: ThresholdConfig,
    pub locator: LocatorConfig,
    pub glyph: GlyphFilterConfig,
}

impl RecognizerConfig {
    /// Load a config from a JSON file. Missing fields fall back to defaults.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: RecognizerConfig = serde_json::from_str(&text)
            .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.threshold.validate()?;
        self.locator.validate()?;
        self.glyph.validate()
    }
}

/// Which side of the local-mean threshold becomes foreground (255).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPolarity {
    /// Pixels brighter than `mean - c` are foreground (paper and cell interiors).
    #[default]
    Binary,
    /// Pixels at or below `mean - c` are foreground (ink).
    BinaryInverse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Side length of the square neighbourhood used for the local mean. Odd.
    pub block_size: u32,
    /// Constant subtracted from the local mean.
    pub c: i32,
    pub polarity: ThresholdPolarity,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            block_size: 11,
            c: 2,
            polarity: ThresholdPolarity::Binary,
        }
    }
}

impl ThresholdConfig {
    pub fn block_radius(&self) -> u32 {
        self.block_size / 2
    }

    fn validate(&self) -> Result<()> {
        if self.block_size < 3 || self.block_size % 2 == 0 {
            return Err(RecognitionError::InvalidConfig(format!(
                "threshold block_size must be odd and >= 3, got {}",
                self.block_size
            )));
        }
        Ok(())
    }
}

/// Accepted contour area band for a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AreaBounds {
    /// Fixed pixel areas, tied to one capture resolution.
    Absolute { min: f64, max: f64 },
    /// Fractions of the whole image area.
    Relative { min_fraction: f64, max_fraction: f64 },
}

impl AreaBounds {
    /// Resolve to pixel areas for an image of the given size.
    pub fn resolve(&self, width: u32, height: u32) -> (f64, f64) {
        match *self {
            AreaBounds::Absolute { min, max } => (min, max),
            AreaBounds::Relative {
                min_fraction,
                max_fraction,
            } => {
                let image_area = width as f64 * height as f64;
                (min_fraction * image_area, max_fraction * image_area)
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let (lo, hi, unit_max) = match *self {
            AreaBounds::Absolute { min, max } => (min, max, f64::INFINITY),
            AreaBounds::Relative {
                min_fraction,
                max_fraction,
            } => (min_fraction, max_fraction, 1.0),
        };
        if !(lo >= 0.0 && lo < hi && hi <= unit_max) {
            return Err(RecognitionError::InvalidConfig(format!(
                "cell area bounds must satisfy 0 <= min < max, got {:?}",
                self
            )));
        }
        Ok(())
    }
}

impl Default for AreaBounds {
    fn default() -> Self {
        // Empirical values for the original capture setup.
        AreaBounds::Absolute {
            min: 4200.0,
            max: 5000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Contour area band, exclusive on both ends.
    pub area: AreaBounds,
    /// Aspect ratio band (width / height), inclusive on both ends.
    pub min_aspect: f64,
    pub max_aspect: f64,
    /// Polygon simplification tolerance as a fraction of the contour perimeter.
    pub epsilon_fraction: f64,
    pub expected_cells: usize,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            area: AreaBounds::default(),
            min_aspect: 0.8,
            max_aspect: 1.2,
            epsilon_fraction: 0.03,
            expected_cells: GRID_CELLS,
        }
    }
}

impl LocatorConfig {
    fn validate(&self) -> Result<()> {
        self.area.validate()?;
        if !(self.min_aspect > 0.0 && self.min_aspect <= self.max_aspect) {
            return Err(RecognitionError::InvalidConfig(format!(
                "aspect bounds must satisfy 0 < min <= max, got [{}, {}]",
                self.min_aspect, self.max_aspect
            )));
        }
        if self.epsilon_fraction < 0.0 {
            return Err(RecognitionError::InvalidConfig(
                "epsilon_fraction must not be negative".to_string(),
            ));
        }
        if self.expected_cells != GRID_CELLS {
            return Err(RecognitionError::InvalidConfig(format!(
                "expected_cells must be {}, got {}",
                GRID_CELLS, self.expected_cells
            )));
        }
        Ok(())
    }
}

/// Contour-count heuristics used to strip noise from a cell before OCR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlyphFilterConfig {
    /// More contours than this and the cell is treated as empty.
    pub blank_contour_threshold: usize,
    /// More contours than this and only the `slice_start..slice_end` range
    /// (by descending area) is kept.
    pub slice_contour_threshold: usize,
    pub slice_start: usize,
    pub slice_end: usize,
    /// Chebyshev radius of the dilation element (1 = 3x3).
    pub dilation_radius: u8,
}

impl Default for GlyphFilterConfig {
    fn default() -> Self {
        Self {
            blank_contour_threshold: 15,
            slice_contour_threshold: 4,
            slice_start: 4,
            slice_end: 9,
            dilation_radius: 1,
        }
    }
}

impl GlyphFilterConfig {
    fn validate(&self) -> Result<()> {
        if self.slice_start > self.slice_end {
            return Err(RecognitionError::InvalidConfig(format!(
                "glyph slice {}..{} is empty",
                self.slice_start, self.slice_end
            )));
        }
        Ok(())
    }
}
