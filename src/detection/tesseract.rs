use anyhow::{anyhow, Result};
use image::GrayImage;
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::detection::ocr::{pick_char, prepare_for_ocr, DigitClassifier};

/// Digit classifier that shells out to the `tesseract` executable in
/// single-character mode with a character whitelist.
pub struct TesseractClassifier {
    executable: PathBuf,
    tessdata_dir: Option<PathBuf>,
    target_size: u32,
}

impl TesseractClassifier {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            tessdata_dir: None,
            target_size: 100,
        }
    }

    pub fn with_tessdata_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tessdata_dir = Some(dir.into());
        self
    }

    /// Command-line arguments after the input and output paths.
    pub fn engine_args(&self, alphabet: &[char]) -> Vec<String> {
        let whitelist: String = alphabet.iter().collect();
        let mut args = Vec::new();
        if let Some(dir) = &self.tessdata_dir {
            args.push("--tessdata-dir".to_string());
            args.push(dir.to_string_lossy().to_string());
        }
        args.extend([
            "--psm".to_string(),
            "10".to_string(), // Treat the image as a single character
            "--oem".to_string(),
            "3".to_string(),
            "-c".to_string(),
            format!("tessedit_char_whitelist={}", whitelist),
        ]);
        args
    }
}

impl Default for TesseractClassifier {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl DigitClassifier for TesseractClassifier {
    fn classify(&self, glyph: &GrayImage, alphabet: &[char]) -> Result<Option<char>> {
        let prepared = prepare_for_ocr(glyph, self.target_size, self.target_size / 5);

        // Save image to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")?;
        prepared.save(temp_input.path())?;

        let output = Command::new(&self.executable)
            .arg(temp_input.path())
            .arg("stdout")
            .args(self.engine_args(alphabet))
            .output()
            .map_err(|e| anyhow!("Failed to run {}: {}", self.executable.display(), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        debug!(text = %text.trim(), "tesseract output");
        Ok(pick_char(&text, alphabet))
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}
