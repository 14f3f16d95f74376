use image::{GrayImage, Luma};
pub use ocrs::{ImageSource, OcrEngine}; // Re-export for use in other modules
use ocrs::OcrEngineParams;
use rten::Model;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Characters a sudoku cell may contain.
pub const DIGIT_ALPHABET: &[char] = &['1', '2', '3', '4', '5', '6', '7', '8', '9'];

/// Single-character recognition capability.
///
/// Given a small glyph image (white strokes on black) and the characters it
/// may contain, return the most likely one, or `None` when nothing is
/// recognized.
pub trait DigitClassifier: Send + Sync {
    fn classify(&self, glyph: &GrayImage, alphabet: &[char]) -> anyhow::Result<Option<char>>;

    /// Human-readable engine name (used in logs)
    fn name(&self) -> &str;
}

/// First character of `text`, ignoring whitespace, if it is in `alphabet`.
pub fn pick_char(text: &str, alphabet: &[char]) -> Option<char> {
    text.trim().chars().next().filter(|c| alphabet.contains(c))
}

/// Turn a white-on-black glyph into dark text on a white square canvas,
/// scaled to fit `target_size` with a uniform border.
pub fn prepare_for_ocr(glyph: &GrayImage, target_size: u32, border: u32) -> GrayImage {
    let (width, height) = glyph.dimensions();
    let mut inverted = GrayImage::new(width, height);
    for (x, y, pixel) in glyph.enumerate_pixels() {
        inverted.put_pixel(x, y, Luma([255 - pixel[0]]));
    }

    let mut canvas = GrayImage::from_pixel(target_size, target_size, Luma([255u8]));
    let inner = target_size.saturating_sub(2 * border).max(1);
    if width == 0 || height == 0 {
        return canvas;
    }

    // Scale to fit inside the border while maintaining aspect ratio
    let scale = (inner as f32 / width as f32).min(inner as f32 / height as f32);
    let scaled_w = ((width as f32 * scale) as u32).max(1);
    let scaled_h = ((height as f32 * scale) as u32).max(1);
    let scaled = image::imageops::resize(
        &inverted,
        scaled_w,
        scaled_h,
        image::imageops::FilterType::CatmullRom,
    );

    let offset_x = (target_size - scaled_w) / 2;
    let offset_y = (target_size - scaled_h) / 2;
    image::imageops::overlay(&mut canvas, &scaled, offset_x.into(), offset_y.into());
    canvas
}

/// Default model directory used by `ocrs-cli`.
pub fn default_models_dir() -> anyhow::Result<PathBuf> {
    let home_dir = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
    Ok(Path::new(&home_dir).join(".cache/ocrs"))
}

/// Initialize OCR engine with models from `models_dir`
pub fn init_ocr_engine(models_dir: &Path) -> anyhow::Result<OcrEngine> {
    let detection_model_path = models_dir.join("text-detection.rten");
    let recognition_model_path = models_dir.join("text-recognition.rten");

    if !detection_model_path.exists() || !recognition_model_path.exists() {
        anyhow::bail!(
            "OCR models not found. Please run: ocrs-cli --help (or download models manually)\n\
             Expected locations:\n  - {}\n  - {}",
            detection_model_path.display(),
            recognition_model_path.display()
        );
    }

    let detection_model = Model::load_file(&detection_model_path)?;
    let recognition_model = Model::load_file(&recognition_model_path)?;

    let engine = OcrEngine::new(OcrEngineParams {
        detection_model: Some(detection_model),
        recognition_model: Some(recognition_model),
        ..Default::default()
    })?;

    Ok(engine)
}

/// Digit classifier backed by the `ocrs` engine.
pub struct OcrsClassifier {
    models_dir: PathBuf,
    // Loaded on first use so that constructing a recognizer stays cheap.
    engine: Mutex<Option<Arc<OcrEngine>>>,
    target_size: u32,
}

impl OcrsClassifier {
    pub fn new(models_dir: PathBuf) -> Self {
        Self {
            models_dir,
            engine: Mutex::new(None),
            target_size: 100,
        }
    }

    /// Use the standard `~/.cache/ocrs` model location.
    pub fn from_default_location() -> anyhow::Result<Self> {
        Ok(Self::new(default_models_dir()?))
    }

    fn engine(&self) -> anyhow::Result<Arc<OcrEngine>> {
        let mut guard = self
            .engine
            .lock()
            .map_err(|_| anyhow::anyhow!("OCR engine lock poisoned"))?;
        if let Some(engine) = guard.as_ref() {
            return Ok(engine.clone());
        }
        info!(models_dir = %self.models_dir.display(), "initializing OCR engine");
        let engine = Arc::new(init_ocr_engine(&self.models_dir)?);
        *guard = Some(engine.clone());
        Ok(engine)
    }
}

impl DigitClassifier for OcrsClassifier {
    fn classify(&self, glyph: &GrayImage, alphabet: &[char]) -> anyhow::Result<Option<char>> {
        let engine = self.engine()?;
        let prepared = prepare_for_ocr(glyph, self.target_size, self.target_size / 5);
        let img = image::DynamicImage::ImageLuma8(prepared).to_rgb8();

        let img_source = ImageSource::from_bytes(img.as_raw(), img.dimensions())
            .map_err(|e| anyhow::anyhow!("Failed to build OCR input: {}", e))?;
        let ocr_input = engine
            .prepare_input(img_source)
            .map_err(|e| anyhow::anyhow!("Failed to prepare OCR input: {}", e))?;
        let text = engine
            .get_text(&ocr_input)
            .map_err(|e| anyhow::anyhow!("OCR failed: {}", e))?;

        debug!(text = %text.trim(), "ocrs output");
        Ok(text
            .chars()
            .filter(|c| !c.is_whitespace())
            .find(|c| alphabet.contains(c)))
    }

    fn name(&self) -> &str {
        "ocrs"
    }
}
