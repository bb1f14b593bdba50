//! Drawing surface used by the layout engine.
//!
//! [`DocumentCanvas`] is the small set of primitives a flipbook needs: text,
//! images, filled circles, dashed rectangles and page breaks. The layout
//! engine decides what to draw and in which order; implementations decide how
//! it ends up on disk. [`PdfCanvas`](crate::PdfCanvas) is the production one.

use std::path::Path;

use crate::{error::FlipbookError, font::helvetica_text_width, geometry::Rect};

/// An RGB colour with components in `0.0 ..= 1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        red: 0.0,
        green: 0.0,
        blue: 0.0,
    };

    pub const WHITE: Color = Color {
        red: 1.0,
        green: 1.0,
        blue: 1.0,
    };
}

/// A stroke dash pattern: `on` points drawn, `off` points skipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashPattern {
    pub on: f32,
    pub off: f32,
}

/// Dash used for the cut lines around each tile.
pub const SEPARATOR_DASH: DashPattern = DashPattern { on: 1.0, off: 2.0 };

/// Paged drawing surface in PDF coordinates (points, origin bottom-left).
///
/// A canvas starts with one open page. [`show_page`](Self::show_page) closes
/// it and opens the next; [`save`](Self::save) commits the document, emitting
/// the open page only if something was drawn on it.
pub trait DocumentCanvas {
    /// Draw `text` in black Helvetica with its baseline starting at `(x, y)`.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32) -> Result<(), FlipbookError>;

    /// Rendered width of `text` in Helvetica at `size`.
    fn text_width(&self, text: &str, size: f32) -> f32 {
        helvetica_text_width(text, size)
    }

    /// Draw the image file at `image`, stretched to exactly fill `area`.
    fn draw_image(&mut self, image: &Path, area: Rect) -> Result<(), FlipbookError>;

    /// Fill a circle without stroking it.
    fn fill_circle(
        &mut self,
        center_x: f32,
        center_y: f32,
        radius: f32,
        color: Color,
    ) -> Result<(), FlipbookError>;

    /// Stroke the outline of `area`, optionally dashed.
    fn stroke_rect(&mut self, area: Rect, dash: Option<DashPattern>) -> Result<(), FlipbookError>;

    /// Finish the current page and start a new one.
    fn show_page(&mut self) -> Result<(), FlipbookError>;

    /// Write the finished document.
    fn save(&mut self) -> Result<(), FlipbookError>;
}
