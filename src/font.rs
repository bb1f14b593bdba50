//! Advance widths of the standard Helvetica face.
//!
//! Labels sit on a circular plate sized from the text width, so the layout
//! needs string widths without loading any font file. Values are the AFM
//! widths of Helvetica in 1/1000 em for printable ASCII.

/// Widths for code points 32 (space) through 126 (`~`).
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Fallback for characters outside printable ASCII.
const DEFAULT_WIDTH: u16 = 556;

/// Width of `text` in points when set in Helvetica at `size`.
///
/// ```
/// // Digits are all 0.556 em wide.
/// assert!((flipbook::helvetica_text_width("12", 10.0) - 11.12).abs() < 1e-4);
/// ```
pub fn helvetica_text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|ch| {
            let code = ch as u32;
            if (32..=126).contains(&code) {
                u32::from(HELVETICA_WIDTHS[(code - 32) as usize])
            } else {
                u32::from(DEFAULT_WIDTH)
            }
        })
        .sum();
    units as f32 * size / 1000.0
}
