//! Layout engine integration tests.
//!
//! Most tests draw onto a recording canvas; the PDF tests read the result
//! back with `lopdf`.

mod common;

use chrono::{Local, TimeZone};
use flipbook::{
    CancellationToken, Color, ConversionOptions, DEFAULT_TITLE_URL, FlipbookError,
    FlipbookLayoutEngine, LayoutRequest, Phase, SEPARATOR_DASH, TitlePage,
    geometry::{GUTTER_WIDTH, PAGE_MARGIN},
};

use common::{DrawOp, ProgressLog, RecordingCanvas, pdf_page_count, stage_frames};

fn request(staging: &std::path::Path, frames_per_page: u32) -> LayoutRequest {
    let mut request = LayoutRequest::new(staging, staging.join("book.pdf"), "clip");
    request.frames_per_page = frames_per_page;
    request.created = Local.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap();
    request
}

fn layout(request: &LayoutRequest) -> Result<RecordingCanvas, FlipbookError> {
    let mut canvas = RecordingCanvas::default();
    FlipbookLayoutEngine::layout_onto(&mut canvas, request, &ConversionOptions::new())?;
    Ok(canvas)
}

// ── Pagination ─────────────────────────────────────────────────────

#[test]
fn twenty_three_frames_fill_three_pages() {
    let dir = tempfile::tempdir().unwrap();
    stage_frames(dir.path(), 23);

    let canvas = layout(&request(dir.path(), 10)).unwrap();
    assert!(canvas.saved);
    assert_eq!(canvas.pages.len(), 4);

    let tiles: Vec<usize> = canvas
        .pages
        .iter()
        .map(|page| RecordingCanvas::images(page).len())
        .collect();
    assert_eq!(tiles, vec![0, 10, 10, 3]);
}

#[test]
fn labels_continue_across_pages() {
    let dir = tempfile::tempdir().unwrap();
    stage_frames(dir.path(), 23);

    let canvas = layout(&request(dir.path(), 10)).unwrap();
    assert_eq!(RecordingCanvas::texts(&canvas.pages[1])[0], "1");
    assert_eq!(RecordingCanvas::texts(&canvas.pages[2])[0], "11");
    assert_eq!(
        RecordingCanvas::texts(&canvas.pages[3]),
        vec!["21".to_string(), "22".to_string(), "23".to_string()]
    );
}

#[test]
fn tiles_are_drawn_in_capture_order() {
    let dir = tempfile::tempdir().unwrap();
    stage_frames(dir.path(), 4);

    let canvas = layout(&request(dir.path(), 4)).unwrap();
    let names: Vec<String> = canvas.pages[1]
        .iter()
        .filter_map(|op| match op {
            DrawOp::Image { path, .. } => {
                Some(path.file_name().unwrap().to_string_lossy().into_owned())
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        names,
        ["frame00000.jpg", "frame00001.jpg", "frame00002.jpg", "frame00003.jpg"]
    );
}

#[test]
fn unrelated_images_are_not_laid_out() {
    let dir = tempfile::tempdir().unwrap();
    stage_frames(dir.path(), 3);
    std::fs::copy(
        dir.path().join("frame00000.jpg"),
        dir.path().join("cover.jpg"),
    )
    .unwrap();

    let canvas = layout(&request(dir.path(), 10)).unwrap();
    assert_eq!(RecordingCanvas::images(&canvas.pages[1]).len(), 3);
}

// ── Tile drawing ───────────────────────────────────────────────────

#[test]
fn every_tile_gets_plate_label_and_dashed_outline() {
    let dir = tempfile::tempdir().unwrap();
    stage_frames(dir.path(), 2);

    let canvas = layout(&request(dir.path(), 2)).unwrap();
    let page = &canvas.pages[1];
    assert_eq!(page.len(), 8);

    assert!(matches!(page[0], DrawOp::Image { .. }));
    assert!(matches!(page[1], DrawOp::Circle { color, .. } if color == Color::WHITE));
    assert!(matches!(&page[2], DrawOp::Text { text, size, .. } if text == "1" && *size == 10.0));
    assert!(matches!(page[3], DrawOp::Outline { dash: Some(dash), .. } if dash == SEPARATOR_DASH));
}

#[test]
fn tiles_fill_rows_top_down() {
    let dir = tempfile::tempdir().unwrap();
    stage_frames(dir.path(), 6);

    let canvas = layout(&request(dir.path(), 6)).unwrap();
    let tiles = RecordingCanvas::images(&canvas.pages[1]);

    assert!((tiles[0].x - PAGE_MARGIN).abs() < 1e-3);
    assert!(tiles[1].x > tiles[0].x);
    assert!((tiles[0].y - tiles[1].y).abs() < 1e-3);
    assert!(tiles[2].y < tiles[0].y);
    assert!((tiles[5].y - PAGE_MARGIN).abs() < 1e-3);
}

#[test]
fn spacing_widens_outlines_by_gutter() {
    let dir = tempfile::tempdir().unwrap();
    stage_frames(dir.path(), 2);

    let mut request = request(dir.path(), 2);
    request.spacing = true;
    let canvas = layout(&request).unwrap();

    let tiles = RecordingCanvas::images(&canvas.pages[1]);
    let outlines = RecordingCanvas::outlines(&canvas.pages[1]);
    for (tile, outline) in tiles.iter().zip(&outlines) {
        assert!((outline.x - (tile.x - GUTTER_WIDTH)).abs() < 1e-3);
        assert!((outline.width - (tile.width + GUTTER_WIDTH)).abs() < 1e-3);
    }
    assert!((tiles[0].x - (PAGE_MARGIN)).abs() < 1e-3);
    assert!((tiles[1].x - (tiles[0].x + tiles[0].width + GUTTER_WIDTH)).abs() < 1e-3);
}

// ── Title page ─────────────────────────────────────────────────────

#[test]
fn title_page_lists_video_details() {
    let dir = tempfile::tempdir().unwrap();
    stage_frames(dir.path(), 3);

    let mut request = request(dir.path(), 10);
    request.total_frames = 3;
    let canvas = layout(&request).unwrap();

    let lines = RecordingCanvas::texts(&canvas.pages[0]);
    assert_eq!(
        lines,
        vec![
            TitlePage::default().title,
            TitlePage::default().attribution,
            DEFAULT_TITLE_URL.to_string(),
            "Flipbook for Video: clip".to_string(),
            "Total Frames: 3".to_string(),
            "Created: 2024-05-17 09:30:00".to_string(),
        ]
    );
}

#[test]
fn title_page_prints_overridden_url() {
    let dir = tempfile::tempdir().unwrap();
    stage_frames(dir.path(), 1);

    let mut request = request(dir.path(), 10);
    request.title_page = TitlePage {
        title: "Summer".to_string(),
        attribution: "by us".to_string(),
        url: "https://example.org".to_string(),
    };
    let canvas = layout(&request).unwrap();

    let lines = RecordingCanvas::texts(&canvas.pages[0]);
    assert_eq!(&lines[..3], &["Summer", "by us", "https://example.org"]);
    assert_eq!(lines.len(), 6);
}

// ── Empty and invalid input ────────────────────────────────────────

#[test]
fn empty_staging_is_an_error_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let result = layout(&request(dir.path(), 10));
    assert!(matches!(result, Err(FlipbookError::NoFramesFound(_))));
}

#[test]
fn empty_staging_gives_title_only_when_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let mut request = request(dir.path(), 10);
    request.allow_empty = true;

    let canvas = layout(&request).unwrap();
    assert!(canvas.saved);
    assert_eq!(canvas.pages.len(), 1);
}

#[test]
fn density_outside_range_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    stage_frames(dir.path(), 3);

    for frames_per_page in [0, 11] {
        let result = layout(&request(dir.path(), frames_per_page));
        assert!(matches!(result, Err(FlipbookError::InvalidParameter(_))));
    }
}

// ── Progress and cancellation ──────────────────────────────────────

#[test]
fn layout_progress_reaches_one_hundred() {
    let dir = tempfile::tempdir().unwrap();
    stage_frames(dir.path(), 23);

    let log = ProgressLog::shared();
    let options = ConversionOptions::new().with_progress(log.clone());
    let mut canvas = RecordingCanvas::default();
    FlipbookLayoutEngine::layout_onto(&mut canvas, &request(dir.path(), 10), &options).unwrap();

    let reports = log.reports();
    assert!(reports.iter().all(|info| info.phase == Phase::Layout));
    let percentages: Vec<f32> = reports.iter().filter_map(|info| info.percentage).collect();
    assert_eq!(percentages.first(), Some(&0.0));
    assert_eq!(percentages.last(), Some(&100.0));
    assert!(percentages.windows(2).all(|pair| pair[0] <= pair[1]));
    // Start plus one report per page.
    assert_eq!(percentages.len(), 4);
}

#[test]
fn cancelled_layout_is_not_saved() {
    let dir = tempfile::tempdir().unwrap();
    stage_frames(dir.path(), 5);

    let token = CancellationToken::new();
    token.cancel();
    let options = ConversionOptions::new().with_cancellation(token);

    let mut canvas = RecordingCanvas::default();
    let result =
        FlipbookLayoutEngine::layout_onto(&mut canvas, &request(dir.path(), 10), &options);
    assert!(matches!(result, Err(FlipbookError::Cancelled)));
    assert!(!canvas.saved);
}

// ── PDF output ─────────────────────────────────────────────────────

#[test]
fn pdf_has_title_page_plus_frame_pages() {
    let dir = tempfile::tempdir().unwrap();
    stage_frames(dir.path(), 23);

    let request = request(dir.path(), 10);
    let report = FlipbookLayoutEngine::layout(&request).unwrap();
    assert_eq!(report.frame_pages, 3);
    assert_eq!(report.total_pages(), 4);
    assert_eq!(pdf_page_count(&request.output), 4);
    assert!(!dir.path().join("book.pdf.partial").exists());
}

#[test]
fn empty_pdf_has_only_the_title_page() {
    let dir = tempfile::tempdir().unwrap();
    let mut request = request(dir.path(), 10);
    request.allow_empty = true;

    FlipbookLayoutEngine::layout(&request).unwrap();
    assert_eq!(pdf_page_count(&request.output), 1);
}

#[test]
fn unwritable_output_leaves_nothing_behind() {
    let dir = tempfile::tempdir().unwrap();
    stage_frames(dir.path(), 2);

    let mut request = request(dir.path(), 10);
    request.output = dir.path().join("missing").join("book.pdf");
    assert!(FlipbookLayoutEngine::layout(&request).is_err());
    assert!(!request.output.exists());
    assert!(!dir.path().join("missing").exists());
}
