//! Conversion configuration.
//!
//! [`ConversionOptions`] is a builder that carries every knob of a flipbook
//! conversion (sampling rate, page density, image quality, time window) along
//! with operational settings such as progress callbacks and cancellation.
//!
//! # Example
//!
//! ```
//! use flipbook::{ConversionOptions, Quality};
//!
//! let options = ConversionOptions::new()
//!     .with_sample_rate(2)
//!     .with_frames_per_page(8)
//!     .with_quality(Quality::Medium)
//!     .with_spacing(true)
//!     .with_start("00:00:05")
//!     .with_end("00:00:20");
//! assert_eq!(options.frames_per_page(), 8);
//! ```

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::FlipbookError;
use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};

/// Default number of frames placed on one page.
pub const DEFAULT_FRAMES_PER_PAGE: u32 = 10;

/// Largest supported number of frames per page.
pub const MAX_FRAMES_PER_PAGE: u32 = 10;

/// Compression preset for staged still frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quality {
    /// JPEG quality 100.
    Highest,
    /// JPEG quality 90. This is the default.
    #[default]
    High,
    /// JPEG quality 75.
    Medium,
    /// JPEG quality 50.
    Low,
}

impl Quality {
    /// The JPEG quality parameter (1 – 100) this tier encodes with.
    pub fn jpeg_quality(self) -> u8 {
        match self {
            Quality::Highest => 100,
            Quality::High => 90,
            Quality::Medium => 75,
            Quality::Low => 50,
        }
    }
}

impl Display for Quality {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Quality::Highest => "highest",
            Quality::High => "high",
            Quality::Medium => "medium",
            Quality::Low => "low",
        };
        f.write_str(name)
    }
}

impl FromStr for Quality {
    type Err = FlipbookError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "highest" | "best" => Ok(Quality::Highest),
            "high" => Ok(Quality::High),
            "medium" | "med" => Ok(Quality::Medium),
            "low" => Ok(Quality::Low),
            other => Err(FlipbookError::InvalidParameter(format!(
                "unknown quality tier '{other}' (expected highest, high, medium or low)"
            ))),
        }
    }
}

/// How the sampler decides which decoded frames to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingMode {
    /// Keep the first decoded frame at or after each tick of a clock that
    /// starts at the window start and advances by `1 / sample_rate` seconds
    /// for every kept frame.
    ///
    /// A higher sample rate keeps more frames, up to every frame of the
    /// window once the rate reaches the source frame rate.
    #[default]
    SyntheticClock,
    /// Keep every decoded frame inside the window, ignoring the sample rate
    /// for selection.
    EveryFrame,
}

/// Link printed on the title page unless overridden.
pub const DEFAULT_TITLE_URL: &str = env!("CARGO_PKG_HOMEPAGE");

/// Text lines printed on the title page, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitlePage {
    /// Document heading.
    pub title: String,
    /// Attribution line under the heading.
    pub attribution: String,
    /// Link line under the attribution.
    pub url: String,
}

impl Default for TitlePage {
    fn default() -> Self {
        Self {
            title: "Video to Flipbook Creator".to_string(),
            attribution: format!("Generated by flipbook {}", env!("CARGO_PKG_VERSION")),
            url: DEFAULT_TITLE_URL.to_string(),
        }
    }
}

/// Configuration for a conversion.
///
/// All fields have sensible defaults: one sample per second of the sample clock, ten
/// frames per page, [`Quality::High`], no gutter, the whole video.
/// Values are validated when the conversion starts, not when they are set,
/// so the front end can pass user input straight through.
#[derive(Clone)]
pub struct ConversionOptions {
    pub(crate) sample_rate: u32,
    pub(crate) frames_per_page: u32,
    pub(crate) quality: Quality,
    pub(crate) spacing: bool,
    pub(crate) start: Option<String>,
    pub(crate) end: Option<String>,
    pub(crate) sampling_mode: SamplingMode,
    pub(crate) title_page: TitlePage,
    /// Where frames are staged. `None` stages into the output folder.
    pub(crate) staging_dir: Option<PathBuf>,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
    pub(crate) batch_size: u64,
}

impl Debug for ConversionOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ConversionOptions")
            .field("sample_rate", &self.sample_rate)
            .field("frames_per_page", &self.frames_per_page)
            .field("quality", &self.quality)
            .field("spacing", &self.spacing)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("sampling_mode", &self.sampling_mode)
            .field("staging_dir", &self.staging_dir)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            sample_rate: 1,
            frames_per_page: DEFAULT_FRAMES_PER_PAGE,
            quality: Quality::default(),
            spacing: false,
            start: None,
            end: None,
            sampling_mode: SamplingMode::default(),
            title_page: TitlePage::default(),
            staging_dir: None,
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 1,
        }
    }

    /// Frames kept per second of source video. Must be at least 1.
    #[must_use]
    pub fn with_sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = rate;
        self
    }

    /// Frames tiled onto each page, 1 – 10.
    #[must_use]
    pub fn with_frames_per_page(mut self, count: u32) -> Self {
        self.frames_per_page = count;
        self
    }

    /// Compression tier for staged frames.
    #[must_use]
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Add a fixed left gutter to every tile (for binding or cutting).
    #[must_use]
    pub fn with_spacing(mut self, spacing: bool) -> Self {
        self.spacing = spacing;
        self
    }

    /// Window start as `HH:MM:SS`.
    #[must_use]
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Window end as `HH:MM:SS`. Defaults to the full duration.
    #[must_use]
    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    /// Choose how frames are picked. See [`SamplingMode`].
    #[must_use]
    pub fn with_sampling_mode(mut self, mode: SamplingMode) -> Self {
        self.sampling_mode = mode;
        self
    }

    /// Replace the title page text.
    #[must_use]
    pub fn with_title_page(mut self, title_page: TitlePage) -> Self {
        self.title_page = title_page;
        self
    }

    /// Stage frames somewhere other than the output folder.
    #[must_use]
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    ///
    /// When the token is cancelled the conversion stops at the next frame or
    /// tile and returns [`FlipbookError::Cancelled`].
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how often the progress callback fires (every N items, minimum 1).
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames_per_page(&self) -> u32 {
        self.frames_per_page
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn spacing(&self) -> bool {
        self.spacing
    }

    pub fn sampling_mode(&self) -> SamplingMode {
        self.sampling_mode
    }

    pub fn title_page(&self) -> &TitlePage {
        &self.title_page
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
