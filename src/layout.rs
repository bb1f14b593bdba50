//! Flipbook page layout.
//!
//! [`FlipbookLayoutEngine`] turns the staged frames into a document: one
//! title page, then pages of tiles in a two-column grid. Every tile carries
//! its frame number on a white plate and a dashed cut line. Numbers run
//! across the whole book rather than restarting on each page.

use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::{
    canvas::{Color, DocumentCanvas, SEPARATOR_DASH},
    configuration::{ConversionOptions, DEFAULT_FRAMES_PER_PAGE, TitlePage},
    error::FlipbookError,
    geometry::{LABEL_FONT_SIZE, LabelPlate, PageGeometry},
    pdf::PdfCanvas,
    progress::{Phase, ProgressTracker},
    staging,
};

/// Font size of the title page lines.
const TITLE_FONT_SIZE: f32 = 14.0;

/// Timestamp format on the title page.
const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Everything the layout stage needs.
#[derive(Debug, Clone)]
pub struct LayoutRequest {
    /// Directory holding `frame00000.jpg` ….
    pub staging_dir: PathBuf,
    /// Document to write.
    pub output: PathBuf,
    /// Tiles per page, 1 – 10.
    pub frames_per_page: u32,
    /// Add the left gutter to each tile.
    pub spacing: bool,
    /// Name shown on the title page.
    pub video_name: String,
    /// Frame total shown on the title page.
    pub total_frames: u64,
    /// Creation time shown on the title page.
    pub created: DateTime<Local>,
    /// Heading lines of the title page.
    pub title_page: TitlePage,
    /// Produce a title-only document instead of failing when nothing is
    /// staged.
    pub allow_empty: bool,
}

impl LayoutRequest {
    /// A request with default density, no spacing, stamped with the current
    /// time.
    pub fn new(
        staging_dir: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        video_name: impl Into<String>,
    ) -> Self {
        Self {
            staging_dir: staging_dir.into(),
            output: output.into(),
            frames_per_page: DEFAULT_FRAMES_PER_PAGE,
            spacing: false,
            video_name: video_name.into(),
            total_frames: 0,
            created: Local::now(),
            title_page: TitlePage::default(),
            allow_empty: false,
        }
    }
}

/// Outcome of a layout run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutReport {
    /// Pages carrying frames (the title page is not counted).
    pub frame_pages: usize,
    /// Frames placed.
    pub frames: usize,
}

impl LayoutReport {
    /// All pages in the document, title page included.
    pub fn total_pages(&self) -> usize {
        self.frame_pages + 1
    }
}

/// Stateless layout entry points.
///
/// # Example
///
/// ```no_run
/// use flipbook::{FlipbookLayoutEngine, LayoutRequest};
///
/// let mut request = LayoutRequest::new("staging", "book.pdf", "clip");
/// request.frames_per_page = 6;
/// let report = FlipbookLayoutEngine::layout(&request)?;
/// println!("{} pages", report.total_pages());
/// # Ok::<(), flipbook::FlipbookError>(())
/// ```
pub struct FlipbookLayoutEngine;

impl FlipbookLayoutEngine {
    /// Lay out the staged frames into a PDF at `request.output`.
    pub fn layout(request: &LayoutRequest) -> Result<LayoutReport, FlipbookError> {
        Self::layout_with_options(request, &ConversionOptions::default())
    }

    /// Like [`layout`](Self::layout), with progress and cancellation from
    /// `options`.
    pub fn layout_with_options(
        request: &LayoutRequest,
        options: &ConversionOptions,
    ) -> Result<LayoutReport, FlipbookError> {
        let geometry = PageGeometry::a4(request.frames_per_page, request.spacing)?;
        let mut canvas = PdfCanvas::create(
            &request.output,
            geometry.page_width,
            geometry.page_height,
            &format!("Flipbook for {}", request.video_name),
        );
        Self::layout_onto(&mut canvas, request, options)
    }

    /// Draw the flipbook onto any [`DocumentCanvas`] and save it.
    ///
    /// # Errors
    ///
    /// - [`FlipbookError::InvalidParameter`] if `frames_per_page` is outside
    ///   1 – 10.
    /// - [`FlipbookError::NoFramesFound`] if nothing is staged and
    ///   `allow_empty` is false.
    /// - Any error raised by the canvas.
    pub fn layout_onto<C: DocumentCanvas + ?Sized>(
        canvas: &mut C,
        request: &LayoutRequest,
        options: &ConversionOptions,
    ) -> Result<LayoutReport, FlipbookError> {
        let geometry = PageGeometry::a4(request.frames_per_page, request.spacing)?;

        let frames = staging::list_staged_frames(&request.staging_dir)?;
        if frames.is_empty() && !request.allow_empty {
            return Err(FlipbookError::NoFramesFound(request.staging_dir.clone()));
        }

        log::info!(
            "Laying out {} frame(s) on {} page(s) into {}",
            frames.len(),
            geometry.page_count(frames.len()),
            request.output.display()
        );

        draw_title_page(canvas, &geometry, request)?;
        canvas.show_page()?;

        let mut tracker = ProgressTracker::new(
            options.progress.clone(),
            Phase::Layout,
            Some(frames.len() as u64),
            1,
        );
        tracker.start();

        let per_page = geometry.frames_per_page as usize;
        let mut frame_pages = 0;
        for (page_index, page) in frames.chunks(per_page).enumerate() {
            for (slot, frame) in page.iter().enumerate() {
                if options.is_cancelled() {
                    log::info!("Layout cancelled on page {}", page_index + 1);
                    return Err(FlipbookError::Cancelled);
                }

                let number = page_index * per_page + slot + 1;
                draw_tile(canvas, &geometry, slot as u32, frame, number)?;
            }

            canvas.show_page()?;
            frame_pages += 1;
            tracker.advance_by(page.len() as u64);
        }

        canvas.save()?;
        if frames.is_empty() {
            tracker.complete();
        }

        Ok(LayoutReport {
            frame_pages,
            frames: frames.len(),
        })
    }
}

fn draw_title_page<C: DocumentCanvas + ?Sized>(
    canvas: &mut C,
    geometry: &PageGeometry,
    request: &LayoutRequest,
) -> Result<(), FlipbookError> {
    let x = geometry.margin;
    let top = geometry.top();
    let title_page = &request.title_page;

    canvas.draw_text(&title_page.title, x, top - 20.0, TITLE_FONT_SIZE)?;
    canvas.draw_text(&title_page.attribution, x, top - 40.0, TITLE_FONT_SIZE)?;
    canvas.draw_text(&title_page.url, x, top - 60.0, TITLE_FONT_SIZE)?;
    canvas.draw_text(
        &format!("Flipbook for Video: {}", request.video_name),
        x,
        top - 100.0,
        TITLE_FONT_SIZE,
    )?;
    canvas.draw_text(
        &format!("Total Frames: {}", request.total_frames),
        x,
        top - 140.0,
        TITLE_FONT_SIZE,
    )?;
    canvas.draw_text(
        &format!("Created: {}", request.created.format(CREATED_FORMAT)),
        x,
        top - 180.0,
        TITLE_FONT_SIZE,
    )
}

fn draw_tile<C: DocumentCanvas + ?Sized>(
    canvas: &mut C,
    geometry: &PageGeometry,
    slot: u32,
    frame: &std::path::Path,
    number: usize,
) -> Result<(), FlipbookError> {
    let tile = geometry.tile(slot);
    canvas.draw_image(frame, tile)?;

    let label = number.to_string();
    let plate = LabelPlate::for_tile(tile, canvas.text_width(&label, LABEL_FONT_SIZE));
    canvas.fill_circle(plate.center_x, plate.center_y, plate.radius, Color::WHITE)?;
    canvas.draw_text(&label, plate.text_x, plate.text_y, LABEL_FONT_SIZE)?;

    canvas.stroke_rect(geometry.outline(tile), Some(SEPARATOR_DASH))
}
