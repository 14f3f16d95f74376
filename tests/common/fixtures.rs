use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use sudoku_vision::DigitClassifier;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Centres of the 3x3 keypad positions inside a 68px cell.
pub const KEYPAD: [u32; 3] = [11, 34, 56];

/// Centres of the three large decoy specks. They outrank the marker by area,
/// so the noise filter drops them and keeps only the marker.
const DECOYS: [(u32, u32); 3] = [(23, 23), (45, 23), (23, 45)];

/// Geometry of a synthetic printed grid.
#[derive(Debug, Clone, Copy)]
pub struct GridLayout {
    pub margin: u32,
    pub cell: u32,
    pub line: u32,
}

impl Default for GridLayout {
    /// 68px cells trace to an area of 67*67 = 4489, inside the default band.
    fn default() -> Self {
        Self {
            margin: 20,
            cell: 68,
            line: 4,
        }
    }
}

impl GridLayout {
    pub fn pitch(&self) -> u32 {
        self.cell + self.line
    }

    pub fn size(&self) -> u32 {
        2 * self.margin + 9 * self.pitch() + self.line
    }

    /// Top-left pixel of the white interior of cell `(row, col)`.
    pub fn cell_origin(&self, row: u32, col: u32) -> (u32, u32) {
        (
            self.margin + self.line + col * self.pitch(),
            self.margin + self.line + row * self.pitch(),
        )
    }
}

fn fill(img: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, color: Rgb<u8>) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            img.put_pixel(x, y, color);
        }
    }
}

fn speck(img: &mut RgbImage, cx: u32, cy: u32, half: u32) {
    fill(img, cx - half, cy - half, 2 * half + 1, 2 * half + 1, BLACK);
}

/// Render a white page with a black 9x9 grid. `digits[i]` in `1..=9` puts a
/// keypad marker in cell `(i / 9, i % 9)`; `0` leaves the cell blank.
pub fn render_grid(layout: &GridLayout, digits: &[u8; 81]) -> RgbImage {
    let size = layout.size();
    let mut img = RgbImage::from_pixel(size, size, WHITE);
    let extent = 9 * layout.pitch() + layout.line;

    for k in 0..=9 {
        let offset = layout.margin + k * layout.pitch();
        fill(&mut img, offset, layout.margin, layout.line, extent, BLACK);
        fill(&mut img, layout.margin, offset, extent, layout.line, BLACK);
    }

    for (i, &digit) in digits.iter().enumerate() {
        if digit == 0 {
            continue;
        }
        let (ox, oy) = layout.cell_origin(i as u32 / 9, i as u32 % 9);
        for (dx, dy) in DECOYS {
            speck(&mut img, ox + dx, oy + dy, 3);
        }
        let k = (digit - 1) as usize;
        speck(&mut img, ox + KEYPAD[k % 3], oy + KEYPAD[k / 3], 1);
    }
    img
}

/// Open the vertical grid line between cells `(row, col)` and `(row, col + 1)`.
pub fn merge_with_right_neighbour(img: &mut RgbImage, layout: &GridLayout, row: u32, col: u32) {
    let (ox, oy) = layout.cell_origin(row, col);
    fill(img, ox + layout.cell, oy, layout.line, layout.cell, WHITE);
}

/// Draw a standalone framed cell with its frame's top-left at `(x, y)`.
pub fn draw_framed_cell(img: &mut RgbImage, layout: &GridLayout, x: u32, y: u32) {
    let outer = layout.cell + 2 * layout.line;
    fill(img, x, y, outer, outer, BLACK);
    fill(img, x + layout.line, y + layout.line, layout.cell, layout.cell, WHITE);
}

/// Diagonal 1..9 with everything else blank.
pub fn diagonal_digits() -> [u8; 81] {
    let mut digits = [0u8; 81];
    for i in 0..9 {
        digits[i * 9 + i] = i as u8 + 1;
    }
    digits
}

/// A complete valid solution: every cell labelled, every row different.
pub fn full_solution_digits() -> [u8; 81] {
    let mut digits = [0u8; 81];
    for r in 0..9 {
        for c in 0..9 {
            digits[r * 9 + c] = ((r * 3 + r / 3 + c) % 9) as u8 + 1;
        }
    }
    digits
}

pub fn digits_to_string(digits: &[u8; 81]) -> String {
    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

pub fn grid_image(digits: &[u8; 81]) -> DynamicImage {
    DynamicImage::ImageRgb8(render_grid(&GridLayout::default(), digits))
}

/// Deterministic OCR stand-in. Reads the digit from the position of the lit
/// pixels' centroid on a 3x3 keypad. A glyph that is empty or covers more
/// than half the cell reads as nothing.
pub struct KeypadClassifier;

impl DigitClassifier for KeypadClassifier {
    fn classify(&self, glyph: &GrayImage, alphabet: &[char]) -> anyhow::Result<Option<char>> {
        let (w, h) = glyph.dimensions();
        let (mut lit, mut sum_x, mut sum_y) = (0u64, 0u64, 0u64);
        for (x, y, p) in glyph.enumerate_pixels() {
            if p[0] > 0 {
                lit += 1;
                sum_x += x as u64;
                sum_y += y as u64;
            }
        }
        if lit == 0 || lit * 2 > (w * h) as u64 {
            return Ok(None);
        }
        let cx = sum_x as f64 / lit as f64;
        let cy = sum_y as f64 / lit as f64;
        let col = ((cx * 3.0 / w as f64) as usize).min(2);
        let row = ((cy * 3.0 / h as f64) as usize).min(2);
        let ch = char::from(b'1' + (row * 3 + col) as u8);
        Ok(Some(ch).filter(|c| alphabet.contains(c)))
    }

    fn name(&self) -> &str {
        "keypad"
    }
}

/// Classifier that always fails.
pub struct BrokenClassifier;

impl DigitClassifier for BrokenClassifier {
    fn classify(&self, _glyph: &GrayImage, _alphabet: &[char]) -> anyhow::Result<Option<char>> {
        anyhow::bail!("engine crashed")
    }

    fn name(&self) -> &str {
        "broken"
    }
}
