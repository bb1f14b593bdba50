//! Frame sampling.
//!
//! [`FrameSampler`] walks a [`FrameSource`] from the first frame to the last,
//! keeps one frame per tick of the sample clock inside the requested
//! [`TimeWindow`], and writes each kept frame to the staging directory as a
//! JPEG.
//!
//! Frames outside the window are decoded and discarded rather than skipped by
//! seeking, so the decode cost is always that of the whole video.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use image::{RgbImage, codecs::jpeg::JpegEncoder};

use crate::{
    configuration::{ConversionOptions, Quality, SamplingMode},
    error::FlipbookError,
    metadata::VideoMetadata,
    progress::{Phase, ProgressTracker},
    staging::{self, StagedFrame},
    timecode::TimeWindow,
    video::{FrameSource, VideoReader},
};

/// Tolerance for comparing frame times against interval boundaries.
const TIME_EPSILON: f64 = 1e-9;

/// What to sample and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingRequest {
    /// The video to read.
    pub source: PathBuf,
    /// Directory receiving `frame00000.jpg` …; created if missing.
    pub staging_dir: PathBuf,
    /// Frames kept per second of source video, at least 1.
    pub sample_rate: u32,
    /// Compression tier for the staged JPEGs.
    pub quality: Quality,
    /// Portion of the source to keep frames from.
    pub window: TimeWindow,
    /// Frame selection rule.
    pub mode: SamplingMode,
}

impl SamplingRequest {
    /// A request covering the whole video with default settings.
    pub fn new(source: impl Into<PathBuf>, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            staging_dir: staging_dir.into(),
            sample_rate: 1,
            quality: Quality::default(),
            window: TimeWindow::full(),
            mode: SamplingMode::default(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), FlipbookError> {
        if self.sample_rate < 1 {
            return Err(FlipbookError::InvalidParameter(format!(
                "sample rate must be at least 1 (got {})",
                self.sample_rate
            )));
        }
        Ok(())
    }
}

/// Result of a sampling run.
#[derive(Debug, Clone)]
pub struct SamplingReport {
    /// Every staged frame, in capture order.
    pub frames: Vec<StagedFrame>,
    /// How many frames were decoded in total, kept or not.
    pub decoded_frames: u64,
    /// Properties of the sampled source.
    pub metadata: VideoMetadata,
}

impl SamplingReport {
    /// Number of kept (staged) frames.
    pub fn frame_count(&self) -> u64 {
        self.frames.len() as u64
    }
}

/// Stateless sampling entry points.
///
/// # Example
///
/// ```no_run
/// use flipbook::{FrameSampler, SamplingRequest};
///
/// let mut request = SamplingRequest::new("input.mp4", "staging");
/// request.sample_rate = 2;
/// let report = FrameSampler::sample(&request)?;
/// println!("staged {} frames", report.frame_count());
/// # Ok::<(), flipbook::FlipbookError>(())
/// ```
pub struct FrameSampler;

impl FrameSampler {
    /// Sample the video at `request.source` with default options.
    pub fn sample(request: &SamplingRequest) -> Result<SamplingReport, FlipbookError> {
        Self::sample_with_options(request, &ConversionOptions::default())
    }

    /// Sample with progress reporting and cancellation taken from `options`.
    ///
    /// # Errors
    ///
    /// - [`FlipbookError::InvalidParameter`] if the sample rate is 0.
    /// - [`FlipbookError::SourceUnreadable`] if the video cannot be opened.
    /// - [`FlipbookError::StagingUnwritable`] if the staging directory cannot
    ///   be created or a frame cannot be written into it.
    pub fn sample_with_options(
        request: &SamplingRequest,
        options: &ConversionOptions,
    ) -> Result<SamplingReport, FlipbookError> {
        request.validate()?;
        let source = VideoReader::open(&request.source)?;
        Self::sample_source(source, request, options)
    }

    /// Sample frames from an already-open source.
    ///
    /// The source is consumed and dropped before this returns, whether the
    /// run succeeds or not.
    pub fn sample_source<S: FrameSource>(
        mut source: S,
        request: &SamplingRequest,
        options: &ConversionOptions,
    ) -> Result<SamplingReport, FlipbookError> {
        request.validate()?;

        let metadata = source.metadata().clone();
        let frames_per_second = metadata.frames_per_second;
        if !frames_per_second.is_finite() || frames_per_second <= 0.0 {
            return Err(FlipbookError::SourceUnreadable {
                path: request.source.clone(),
                reason: format!("invalid frame rate {frames_per_second}"),
            });
        }

        staging::prepare(&request.staging_dir)?;

        log::info!(
            "Sampling {} at {} sample(s)/s into {}",
            request.source.display(),
            request.sample_rate,
            request.staging_dir.display()
        );

        let mut selector = FrameSelector::new(request);
        let mut tracker = ProgressTracker::new(
            options.progress.clone(),
            Phase::Sampling,
            Some(metadata.frame_count),
            options.batch_size,
        );
        tracker.start();

        let mut frames = Vec::new();
        let mut read_index: u64 = 0;

        while let Some(image) = source.next_frame()? {
            if options.is_cancelled() {
                log::info!("Sampling cancelled after {read_index} frame(s)");
                return Err(FlipbookError::Cancelled);
            }

            let seconds = read_index as f64 / frames_per_second;
            if selector.keep(seconds) {
                let index = frames.len() as u64;
                let path = request.staging_dir.join(staging::staged_frame_name(index));
                write_jpeg(&image, &path, request.quality)?;

                let timestamp = synthetic_timestamp(index, request.sample_rate);
                log::trace!(
                    "Kept source frame {read_index} ({seconds:.3}s) as {} at {:?}",
                    path.display(),
                    timestamp
                );
                frames.push(StagedFrame {
                    index,
                    path,
                    timestamp,
                    source_index: read_index,
                });
            }

            read_index += 1;
            tracker.advance();
        }
        tracker.finish();
        drop(source);

        log::info!("Decoded {read_index} frame(s), staged {}", frames.len());

        Ok(SamplingReport {
            frames,
            decoded_frames: read_index,
            metadata,
        })
    }
}

/// Synthetic time of the `index`-th kept frame: `index * 1000 / rate` ms.
pub(crate) fn synthetic_timestamp(index: u64, sample_rate: u32) -> Duration {
    Duration::from_secs_f64(index as f64 / f64::from(sample_rate.max(1)))
}

/// Applies the window and the sampling mode to frame times.
///
/// In [`SamplingMode::SyntheticClock`] the `n`-th kept frame is the first
/// decoded frame at or after `window.start + n / sample_rate` seconds. The
/// clock only advances when a frame is kept, so a source slower than the
/// sample rate has every frame kept once rather than repeated.
struct FrameSelector {
    window: TimeWindow,
    mode: SamplingMode,
    sample_rate: f64,
    kept: u64,
}

impl FrameSelector {
    fn new(request: &SamplingRequest) -> Self {
        Self {
            window: request.window,
            mode: request.mode,
            sample_rate: f64::from(request.sample_rate.max(1)),
            kept: 0,
        }
    }

    fn next_due(&self) -> f64 {
        self.window.start.as_secs_f64() + self.kept as f64 / self.sample_rate
    }

    fn keep(&mut self, seconds: f64) -> bool {
        if !self.window.contains(seconds) {
            return false;
        }

        let keep = match self.mode {
            SamplingMode::SyntheticClock => seconds + TIME_EPSILON >= self.next_due(),
            SamplingMode::EveryFrame => true,
        };
        if keep {
            self.kept += 1;
        }
        keep
    }
}

fn write_jpeg(image: &RgbImage, path: &Path, quality: Quality) -> Result<(), FlipbookError> {
    let file = File::create(path).map_err(|error| FlipbookError::StagingUnwritable {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, quality.jpeg_quality()).encode_image(image)?;
    writer.flush()?;
    Ok(())
}
