//! Shared fakes for the integration tests.
//!
//! `SyntheticVideo` stands in for a decoded video so sampling and conversion
//! can be tested without FFmpeg fixtures; `RecordingCanvas` captures what the
//! layout engine draws.

#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use flipbook::{
    Color, DashPattern, DocumentCanvas, FlipbookError, FrameSource, ProgressCallback,
    ProgressInfo, VideoMetadata,
    geometry::Rect,
};
use image::{Rgb, RgbImage};

pub const WIDTH: u32 = 32;
pub const HEIGHT: u32 = 24;

/// A video of `frame_count` solid-colour frames.
pub struct SyntheticVideo {
    metadata: VideoMetadata,
    next: u64,
    fail_at: Option<u64>,
}

impl SyntheticVideo {
    pub fn new(frame_count: u64, frames_per_second: f64) -> Self {
        Self {
            metadata: VideoMetadata {
                width: WIDTH,
                height: HEIGHT,
                frames_per_second,
                frame_count,
                codec: "synthetic".to_string(),
            },
            next: 0,
            fail_at: None,
        }
    }

    /// Fail with a decode error when frame `index` is requested.
    pub fn failing_at(mut self, index: u64) -> Self {
        self.fail_at = Some(index);
        self
    }
}

impl FrameSource for SyntheticVideo {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>, FlipbookError> {
        if self.next >= self.metadata.frame_count {
            return Ok(None);
        }
        if self.fail_at == Some(self.next) {
            return Err(FlipbookError::VideoDecodeError(format!(
                "synthetic failure at frame {}",
                self.next
            )));
        }

        let shade = (self.next % 256) as u8;
        self.next += 1;
        Ok(Some(RgbImage::from_pixel(
            WIDTH,
            HEIGHT,
            Rgb([shade, 255 - shade, 128]),
        )))
    }
}

/// Write `count` staged JPEGs into `dir`.
pub fn stage_frames(dir: &Path, count: u64) {
    std::fs::create_dir_all(dir).unwrap();
    for index in 0..count {
        let image = RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([200, 100, (index % 256) as u8]));
        image
            .save(dir.join(flipbook::staged_frame_name(index)))
            .unwrap();
    }
}

/// Page count of a PDF on disk.
pub fn pdf_page_count(path: &Path) -> usize {
    lopdf::Document::load(path).unwrap().get_pages().len()
}

/// What one PDF page draws: images placed and text shown, in content order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfPageSummary {
    pub images: usize,
    pub texts: Vec<String>,
}

/// Decode every page of a PDF on disk into a [`PdfPageSummary`].
pub fn pdf_page_summaries(path: &Path) -> Vec<PdfPageSummary> {
    let document = lopdf::Document::load(path).unwrap();
    document
        .get_pages()
        .values()
        .map(|&page_id| {
            let bytes = document.get_page_content(page_id).unwrap();
            let content = lopdf::content::Content::decode(&bytes).unwrap();
            let mut summary = PdfPageSummary {
                images: 0,
                texts: Vec::new(),
            };
            for operation in &content.operations {
                match operation.operator.as_str() {
                    "Do" => summary.images += 1,
                    "Tj" => {
                        let text = operation.operands[0].as_str().unwrap();
                        summary.texts.push(String::from_utf8_lossy(text).into_owned());
                    }
                    _ => {}
                }
            }
            summary
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text { text: String, x: f32, y: f32, size: f32 },
    Image { path: PathBuf, area: Rect },
    Circle { x: f32, y: f32, radius: f32, color: Color },
    Outline { area: Rect, dash: Option<DashPattern> },
}

/// A canvas that keeps every drawing call, page by page.
#[derive(Default)]
pub struct RecordingCanvas {
    pub pages: Vec<Vec<DrawOp>>,
    pub current: Vec<DrawOp>,
    pub saved: bool,
}

impl RecordingCanvas {
    pub fn texts(page: &[DrawOp]) -> Vec<String> {
        page.iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn images(page: &[DrawOp]) -> Vec<Rect> {
        page.iter()
            .filter_map(|op| match op {
                DrawOp::Image { area, .. } => Some(*area),
                _ => None,
            })
            .collect()
    }

    pub fn outlines(page: &[DrawOp]) -> Vec<Rect> {
        page.iter()
            .filter_map(|op| match op {
                DrawOp::Outline { area, .. } => Some(*area),
                _ => None,
            })
            .collect()
    }
}

impl DocumentCanvas for RecordingCanvas {
    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32) -> Result<(), FlipbookError> {
        self.current.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            size,
        });
        Ok(())
    }

    fn draw_image(&mut self, image: &Path, area: Rect) -> Result<(), FlipbookError> {
        self.current.push(DrawOp::Image {
            path: image.to_path_buf(),
            area,
        });
        Ok(())
    }

    fn fill_circle(
        &mut self,
        center_x: f32,
        center_y: f32,
        radius: f32,
        color: Color,
    ) -> Result<(), FlipbookError> {
        self.current.push(DrawOp::Circle {
            x: center_x,
            y: center_y,
            radius,
            color,
        });
        Ok(())
    }

    fn stroke_rect(&mut self, area: Rect, dash: Option<DashPattern>) -> Result<(), FlipbookError> {
        self.current.push(DrawOp::Outline { area, dash });
        Ok(())
    }

    fn show_page(&mut self) -> Result<(), FlipbookError> {
        self.pages.push(std::mem::take(&mut self.current));
        Ok(())
    }

    fn save(&mut self) -> Result<(), FlipbookError> {
        if !self.current.is_empty() {
            self.show_page()?;
        }
        self.saved = true;
        Ok(())
    }
}

/// Keeps every progress report.
#[derive(Default)]
pub struct ProgressLog(pub Mutex<Vec<ProgressInfo>>);

impl ProgressLog {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reports(&self) -> Vec<ProgressInfo> {
        self.0.lock().unwrap().clone()
    }
}

impl ProgressCallback for ProgressLog {
    fn on_progress(&self, info: &ProgressInfo) {
        self.0.lock().unwrap().push(info.clone());
    }
}
