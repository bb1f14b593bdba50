//! # flipbook
//!
//! Turn a video into a printable flipbook: still frames sampled from a time
//! window, tiled two-up onto numbered A4 pages behind a title page, written
//! as a PDF.
//!
//! Decoding is done by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate, the document
//! is assembled with [`lopdf`](https://crates.io/crates/lopdf).
//!
//! ## Quick Start
//!
//! ```no_run
//! use flipbook::{ConversionOptions, ConversionRequest, Converter};
//!
//! let options = ConversionOptions::new().with_frames_per_page(8);
//! let request = ConversionRequest::new("input.mp4", "out", options);
//! let report = Converter::new(request).run().unwrap();
//! println!("{} frames on {} pages", report.frames, report.pages);
//! ```
//!
//! ### In the background
//!
//! ```no_run
//! use std::{thread, time::Duration};
//!
//! use flipbook::{ConversionOptions, ConversionRequest, Converter};
//!
//! let request = ConversionRequest::new("input.mp4", "out", ConversionOptions::new());
//! let task = Converter::new(request).spawn();
//! while !task.is_finished() {
//!     println!("{:?} {}%", task.phase(), task.progress());
//!     thread::sleep(Duration::from_millis(200));
//! }
//! let report = task.join().unwrap();
//! ```
//!
//! ### The stages on their own
//!
//! ```no_run
//! use flipbook::{FlipbookLayoutEngine, FrameSampler, LayoutRequest, SamplingRequest};
//!
//! let sampled = FrameSampler::sample(&SamplingRequest::new("input.mp4", "frames")).unwrap();
//!
//! let mut layout = LayoutRequest::new("frames", "book.pdf", "input");
//! layout.total_frames = sampled.frame_count();
//! FlipbookLayoutEngine::layout(&layout).unwrap();
//! ```
//!
//! ## Features
//!
//! - **Time windows**: `HH:MM:SS` start and end bounds
//! - **Quality tiers**: four JPEG presets for staged frames
//! - **Two sampling modes**: one frame per tick of the sample clock, or
//!   every frame of the time window
//! - **Atomic output**: documents are written aside and renamed into place,
//!   existing documents are never overwritten
//! - **Progress & cancellation**: callbacks, a pollable [`ProgressSignal`] and
//!   [`CancellationToken`]
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `async` | `Converter::run_async` and [`ConversionFuture`] via Tokio |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod canvas;
pub mod configuration;
pub mod conversion;
pub mod error;
pub mod ffmpeg;
pub mod font;
pub mod geometry;
pub mod layout;
pub mod metadata;
pub mod output;
pub mod pdf;
pub mod progress;
pub mod sampler;
pub mod staging;
#[cfg(feature = "async")]
pub mod stream;
pub mod timecode;
pub mod video;

pub use canvas::{Color, DashPattern, DocumentCanvas, SEPARATOR_DASH};
pub use configuration::{
    ConversionOptions, DEFAULT_TITLE_URL, Quality, SamplingMode, TitlePage,
};
pub use conversion::{ConversionReport, ConversionRequest, ConversionTask, Converter};
pub use error::FlipbookError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use font::helvetica_text_width;
pub use layout::{FlipbookLayoutEngine, LayoutReport, LayoutRequest};
pub use metadata::VideoMetadata;
pub use output::output_document_path;
pub use pdf::PdfCanvas;
pub use progress::{CancellationToken, Phase, ProgressCallback, ProgressInfo, ProgressSignal};
pub use sampler::{FrameSampler, SamplingReport, SamplingRequest};
pub use staging::{StagedFrame, list_staged_frames, remove_staged_frames, staged_frame_name};
#[cfg(feature = "async")]
pub use stream::ConversionFuture;
pub use timecode::{TimeWindow, format_timecode, parse_timecode};
pub use video::{FrameSource, VideoReader};
