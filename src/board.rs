use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::config::GRID_CELLS;
use crate::error::BoardParseError;

/// A recognized 9x9 board, row-major. `'0'` marks an empty cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: String,
}

impl Board {
    /// Character at `(row, col)`, both in `0..9`.
    pub fn cell(&self, row: usize, col: usize) -> char {
        assert!(row < 9 && col < 9, "cell ({row}, {col}) out of range");
        self.cells.as_bytes()[row * 9 + col] as char
    }

    pub fn rows(&self) -> impl Iterator<Item = &str> {
        (0..9).map(move |r| &self.cells[r * 9..r * 9 + 9])
    }

    /// Number of filled (non-zero) cells.
    pub fn givens(&self) -> usize {
        self.cells.bytes().filter(|&b| b != b'0').count()
    }

    pub fn as_str(&self) -> &str {
        &self.cells
    }

    /// Multi-line rendering with `.` for empty cells and box separators.
    pub fn to_grid_string(&self) -> String {
        let mut out = String::new();
        for (r, row) in self.rows().enumerate() {
            if r > 0 && r % 3 == 0 {
                out.push_str("------+-------+------\n");
            }
            for (c, ch) in row.chars().enumerate() {
                if c > 0 && c % 3 == 0 {
                    out.push_str("| ");
                }
                out.push(if ch == '0' { '.' } else { ch });
                if c < 8 {
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Concatenate per-cell results, already in row-major order, into a board.
///
/// Panics unless given exactly 81 ASCII digits; the cell locator guarantees
/// the count and the cell classifier the alphabet.
pub fn assemble_board(cells: &[char]) -> Board {
    assert_eq!(cells.len(), GRID_CELLS, "board needs exactly 81 cells");
    if let Some((index, ch)) = cells.iter().enumerate().find(|(_, c)| !c.is_ascii_digit()) {
        panic!("board cell {index} is not a digit: {ch:?}");
    }
    Board {
        cells: cells.iter().collect(),
    }
}

impl FromStr for Board {
    type Err = BoardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let count = s.chars().count();
        if count != GRID_CELLS {
            return Err(BoardParseError::Length(count));
        }
        if let Some((index, ch)) = s.chars().enumerate().find(|(_, c)| !c.is_ascii_digit()) {
            return Err(BoardParseError::InvalidChar { index, ch });
        }
        Ok(Board {
            cells: s.to_string(),
        })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cells)
    }
}

impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.cells)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
