use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sudoku_vision::{
    AreaBounds, DigitClassifier, OcrsClassifier, Recognizer, RecognizerConfig,
    TesseractClassifier,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Engine {
    Ocrs,
    Tesseract,
}

#[derive(Parser)]
#[command(name = "sudoku-vision")]
#[command(about = "Read a sudoku grid from a photo")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// OCR engine used for digit classification
    #[arg(long, value_enum, default_value = "ocrs")]
    engine: Engine,

    /// Directory holding the ocrs .rten models (default: ~/.cache/ocrs)
    #[arg(long, value_name = "DIR")]
    models_dir: Option<PathBuf>,

    /// Path to the tesseract executable
    #[arg(long, value_name = "PATH", default_value = "tesseract")]
    tesseract_path: PathBuf,

    /// JSON recognizer config; flags below override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Minimum cell contour area in pixels
    #[arg(long, requires = "max_area", conflicts_with = "relative_area")]
    min_area: Option<f64>,

    /// Maximum cell contour area in pixels
    #[arg(long, requires = "min_area")]
    max_area: Option<f64>,

    /// Cell area band as fractions of the image area, e.g. 0.008,0.012
    #[arg(long, value_name = "MIN,MAX", value_delimiter = ',')]
    relative_area: Option<Vec<f64>>,

    /// Save intermediate images to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Only locate the grid, print the cell boxes and skip OCR
    #[arg(long)]
    skip_ocr: bool,

    /// Print the board as a 9x9 grid instead of one line
    #[arg(long)]
    grid: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_config(args: &Cli) -> anyhow::Result<RecognizerConfig> {
    let mut config = match &args.config {
        Some(path) => RecognizerConfig::from_json_file(path)?,
        None => RecognizerConfig::default(),
    };
    if let (Some(min), Some(max)) = (args.min_area, args.max_area) {
        config.locator.area = AreaBounds::Absolute { min, max };
    }
    if let Some(fractions) = &args.relative_area {
        anyhow::ensure!(
            fractions.len() == 2,
            "--relative-area takes exactly two values, got {}",
            fractions.len()
        );
        config.locator.area = AreaBounds::Relative {
            min_fraction: fractions[0],
            max_fraction: fractions[1],
        };
    }
    config.validate()?;
    Ok(config)
}

fn build_classifier(args: &Cli) -> anyhow::Result<Box<dyn DigitClassifier>> {
    Ok(match args.engine {
        Engine::Ocrs => match &args.models_dir {
            Some(dir) => Box::new(OcrsClassifier::new(dir.clone())),
            None => Box::new(OcrsClassifier::from_default_location()?),
        },
        Engine::Tesseract => Box::new(TesseractClassifier::new(args.tesseract_path.clone())),
    })
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let config = build_config(&args)?;
    let classifier = build_classifier(&args)?;

    let mut recognizer = Recognizer::new(config, classifier)?.with_verbose(args.verbose);
    if let Some(debug_dir) = args.debug_out.clone() {
        recognizer = recognizer.with_debug(debug_dir)?;
    }

    if args.skip_ocr {
        let img = image::ImageReader::open(&args.image_path)?
            .decode()
            .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;
        let boxes = recognizer.locate(&img)?;
        for (i, bbox) in boxes.iter().enumerate() {
            println!(
                "r{}c{}: x={} y={} w={} h={}",
                i / 9,
                i % 9,
                bbox.x,
                bbox.y,
                bbox.width,
                bbox.height
            );
        }
        return Ok(());
    }

    let board = recognizer.recognize_file(&args.image_path)?;
    if args.grid {
        print!("{}", board.to_grid_string());
    } else {
        println!("{}", board);
    }

    Ok(())
}
