//! Page geometry.
//!
//! All coordinates are PDF points with the origin in the bottom-left corner
//! of an A4 page. Tiles fill a grid of two columns and
//! `ceil(frames_per_page / 2)` rows inside the margins, row by row from the
//! top.

use crate::configuration::MAX_FRAMES_PER_PAGE;
use crate::error::FlipbookError;

/// Points per millimetre.
pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// A4 width in points.
pub const A4_WIDTH: f32 = 210.0 * POINTS_PER_MM;

/// A4 height in points.
pub const A4_HEIGHT: f32 = 297.0 * POINTS_PER_MM;

/// Margin on every side of the page (2 cm).
pub const PAGE_MARGIN: f32 = 20.0 * POINTS_PER_MM;

/// Extra space left of each tile when spacing is enabled (1 cm).
pub const GUTTER_WIDTH: f32 = 10.0 * POINTS_PER_MM;

/// Number of tile columns.
pub const COLUMNS: u32 = 2;

/// Font size of the frame number labels.
pub const LABEL_FONT_SIZE: f32 = 10.0;

/// Horizontal inset of a label from the tile's left edge.
const LABEL_INSET: f32 = 10.0;

/// Distance from the tile's top edge to the label's reference line.
const LABEL_DROP: f32 = 15.0;

/// Padding between label text and the edge of its backing plate.
const PLATE_PADDING: f32 = 3.0;

/// An axis-aligned rectangle; `(x, y)` is the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Where a frame number label and its white plate go.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPlate {
    /// Baseline start of the label text.
    pub text_x: f32,
    pub text_y: f32,
    /// Centre of the backing circle.
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
}

impl LabelPlate {
    /// Place a label of the given rendered width in the top-left corner of
    /// `tile`.
    pub fn for_tile(tile: Rect, text_width: f32) -> Self {
        let anchor_x = tile.x;
        let anchor_y = tile.y + tile.height - LABEL_DROP;
        let text_height = LABEL_FONT_SIZE;

        Self {
            text_x: anchor_x + LABEL_INSET,
            text_y: anchor_y - 8.0,
            center_x: anchor_x + text_width / 2.0 + LABEL_INSET,
            center_y: anchor_y - text_height / 2.0,
            radius: text_width.max(text_height) / 2.0 + PLATE_PADDING,
        }
    }
}

/// The grid shared by every frame page of one flipbook.
///
/// Computed once per layout and reused for every tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    /// Gutter left of each tile; 0 without spacing.
    pub gutter: f32,
    pub frames_per_page: u32,
    pub rows: u32,
    pub tile_width: f32,
    pub tile_height: f32,
}

impl PageGeometry {
    /// Geometry for an A4 page holding `frames_per_page` tiles.
    ///
    /// # Errors
    ///
    /// Returns [`FlipbookError::InvalidParameter`] unless
    /// `1 <= frames_per_page <= 10`.
    pub fn a4(frames_per_page: u32, spacing: bool) -> Result<Self, FlipbookError> {
        if !(1..=MAX_FRAMES_PER_PAGE).contains(&frames_per_page) {
            return Err(FlipbookError::InvalidParameter(format!(
                "frames per page must be between 1 and {MAX_FRAMES_PER_PAGE} (got {frames_per_page})"
            )));
        }

        let gutter = if spacing { GUTTER_WIDTH } else { 0.0 };
        let rows = frames_per_page.div_ceil(COLUMNS);
        let usable_width = A4_WIDTH - 2.0 * PAGE_MARGIN;
        let usable_height = A4_HEIGHT - 2.0 * PAGE_MARGIN;

        Ok(Self {
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            margin: PAGE_MARGIN,
            gutter,
            frames_per_page,
            rows,
            tile_width: (usable_width - gutter) / COLUMNS as f32,
            tile_height: usable_height / rows as f32,
        })
    }

    /// Y coordinate of the top margin line.
    pub fn top(&self) -> f32 {
        self.page_height - self.margin
    }

    /// Image rectangle for tile `slot` (0-based, row-major within a page).
    pub fn tile(&self, slot: u32) -> Rect {
        let row = slot / COLUMNS;
        let column = slot % COLUMNS;
        Rect {
            x: self.margin + column as f32 * (self.tile_width + self.gutter),
            y: self.top() - (row + 1) as f32 * self.tile_height,
            width: self.tile_width,
            height: self.tile_height,
        }
    }

    /// Dashed separator around `tile`, widened to the left by the gutter.
    pub fn outline(&self, tile: Rect) -> Rect {
        Rect {
            x: tile.x - self.gutter,
            width: tile.width + self.gutter,
            ..tile
        }
    }

    /// Number of frame pages needed for `frame_count` frames.
    pub fn page_count(&self, frame_count: usize) -> usize {
        frame_count.div_ceil(self.frames_per_page as usize)
    }
}
