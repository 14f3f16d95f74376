#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from sudoku_vision for tests
#[allow(unused_imports)]
pub use sudoku_vision::{
    AreaBounds, Board, DigitClassifier, RecognitionError, Recognizer, RecognizerConfig,
};

pub fn keypad_recognizer() -> Recognizer {
    Recognizer::new(RecognizerConfig::default(), Box::new(KeypadClassifier))
        .expect("default config is valid")
}
