//! End-to-end conversion.
//!
//! [`Converter`] validates a [`ConversionRequest`], samples the video into
//! the staging directory, lays the staged frames out into a PDF at a fresh
//! path in the output folder, and finally deletes the staged frames. On any
//! failure the staged frames are left in place and the error is returned
//! unchanged.
//!
//! # Example
//!
//! ```no_run
//! use flipbook::{ConversionOptions, ConversionRequest, Converter, Quality};
//!
//! let options = ConversionOptions::new()
//!     .with_sample_rate(2)
//!     .with_quality(Quality::Medium)
//!     .with_start("00:00:05")
//!     .with_end("00:00:30");
//! let request = ConversionRequest::new("holiday.mp4", "books", options);
//! let report = Converter::new(request).run()?;
//! println!("wrote {}", report.document.display());
//! # Ok::<(), flipbook::FlipbookError>(())
//! ```

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    thread::{self, JoinHandle},
};

use chrono::Local;

use crate::{
    configuration::ConversionOptions,
    error::FlipbookError,
    geometry::PageGeometry,
    layout::{FlipbookLayoutEngine, LayoutRequest},
    output,
    progress::{CancellationToken, Phase, ProgressSignal, ProgressTracker},
    sampler::{FrameSampler, SamplingRequest},
    staging,
    timecode::TimeWindow,
    video::{FrameSource, VideoReader},
};

/// One conversion job. Built once by the front end and never mutated.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Video to convert.
    pub video: PathBuf,
    /// Folder receiving the PDF (and, by default, the staged frames).
    pub output_folder: PathBuf,
    /// Everything else.
    pub options: ConversionOptions,
}

impl ConversionRequest {
    pub fn new(
        video: impl Into<PathBuf>,
        output_folder: impl Into<PathBuf>,
        options: ConversionOptions,
    ) -> Self {
        Self {
            video: video.into(),
            output_folder: output_folder.into(),
            options,
        }
    }

    /// Directory frames are staged in.
    pub fn staging_dir(&self) -> &Path {
        self.options
            .staging_dir
            .as_deref()
            .unwrap_or(&self.output_folder)
    }
}

/// Summary of a finished conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    /// The PDF that was written.
    pub document: PathBuf,
    /// Frames placed in the flipbook.
    pub frames: u64,
    /// Frames decoded from the source, kept or not.
    pub decoded_frames: u64,
    /// Pages in the document, title page included.
    pub pages: usize,
}

/// Drives a conversion from video to flipbook.
#[derive(Debug, Clone)]
pub struct Converter {
    request: ConversionRequest,
}

impl Converter {
    pub fn new(request: ConversionRequest) -> Self {
        Self { request }
    }

    pub fn request(&self) -> &ConversionRequest {
        &self.request
    }

    /// Check every parameter without touching the filesystem and return the
    /// parsed time window.
    ///
    /// # Errors
    ///
    /// - [`FlipbookError::MissingInput`] if the video path or output folder
    ///   is empty.
    /// - [`FlipbookError::InvalidParameter`] for a sample rate below 1, a
    ///   page density outside 1 – 10, a malformed time or `start >= end`.
    pub fn validate(&self) -> Result<TimeWindow, FlipbookError> {
        let request = &self.request;
        if request.video.as_os_str().is_empty() {
            return Err(FlipbookError::MissingInput(
                "no video file was given".to_string(),
            ));
        }
        if request.output_folder.as_os_str().is_empty() {
            return Err(FlipbookError::MissingInput(
                "no output folder was given".to_string(),
            ));
        }

        let options = &request.options;
        if options.sample_rate < 1 {
            return Err(FlipbookError::InvalidParameter(format!(
                "sample rate must be at least 1 (got {})",
                options.sample_rate
            )));
        }
        PageGeometry::a4(options.frames_per_page, options.spacing)?;

        TimeWindow::parse(options.start.as_deref(), options.end.as_deref())
    }

    /// Run the conversion on the calling thread, decoding with FFmpeg.
    pub fn run(&self) -> Result<ConversionReport, FlipbookError> {
        self.run_with_source(|path| VideoReader::open(path))
    }

    /// Run the conversion, obtaining frames from `open` instead of FFmpeg.
    ///
    /// `open` is called with the request's video path after validation.
    pub fn run_with_source<S, F>(&self, open: F) -> Result<ConversionReport, FlipbookError>
    where
        S: FrameSource,
        F: FnOnce(&Path) -> Result<S, FlipbookError>,
    {
        let window = self.validate()?;
        let request = &self.request;
        let options = &request.options;
        let staging_dir = request.staging_dir().to_path_buf();

        log::info!(
            "Converting {} into {}",
            request.video.display(),
            request.output_folder.display()
        );

        let source = open(&request.video)?;

        staging::prepare(&request.output_folder)?;
        staging::prepare(&staging_dir)?;
        let stale = staging::remove_staged_frames(&staging_dir)?;
        if stale > 0 {
            log::warn!(
                "Removed {stale} leftover staged frame(s) from {}",
                staging_dir.display()
            );
        }

        let document = output::output_document_path(&request.output_folder, &request.video);

        let sampling = SamplingRequest {
            source: request.video.clone(),
            staging_dir: staging_dir.clone(),
            sample_rate: options.sample_rate,
            quality: options.quality,
            window,
            mode: options.sampling_mode,
        };
        let sampled = FrameSampler::sample_source(source, &sampling, options)?;
        if sampled.frames.is_empty() {
            log::warn!(
                "No frames of {} fall inside the requested window",
                request.video.display()
            );
        }

        let layout = LayoutRequest {
            staging_dir: staging_dir.clone(),
            output: document.clone(),
            frames_per_page: options.frames_per_page,
            spacing: options.spacing,
            video_name: output::video_display_name(&request.video),
            total_frames: sampled.frame_count(),
            created: Local::now(),
            title_page: options.title_page.clone(),
            allow_empty: sampled.frames.is_empty(),
        };
        let laid_out = FlipbookLayoutEngine::layout_with_options(&layout, options)?;

        let removed = staging::remove_staged_frames(&staging_dir)?;
        log::debug!("Cleaned up {removed} staged frame(s)");

        ProgressTracker::new(options.progress.clone(), Phase::Finished, None, 1).complete();
        log::info!(
            "Wrote {} ({} frame(s) on {} page(s))",
            document.display(),
            laid_out.frames,
            laid_out.total_pages()
        );

        Ok(ConversionReport {
            document,
            frames: sampled.frame_count(),
            decoded_frames: sampled.decoded_frames,
            pages: laid_out.total_pages(),
        })
    }

    /// Run the conversion on a background thread.
    ///
    /// The returned [`ConversionTask`] exposes the progress percentage and
    /// can cancel the run. A progress callback already set on the options
    /// still receives every report.
    pub fn spawn(self) -> ConversionTask {
        self.spawn_with_source(|path| VideoReader::open(path))
    }

    /// Like [`spawn`](Self::spawn), reading frames from `open`.
    pub fn spawn_with_source<S, F>(self, open: F) -> ConversionTask
    where
        S: FrameSource,
        F: FnOnce(&Path) -> Result<S, FlipbookError> + Send + 'static,
    {
        let (converter, signal, cancellation) = self.observed();
        let handle = thread::spawn(move || converter.run_with_source(open));

        ConversionTask {
            handle,
            signal,
            cancellation,
        }
    }

    /// A copy of this converter whose progress goes through a fresh
    /// [`ProgressSignal`] and which is guaranteed to carry a cancellation
    /// token.
    pub(crate) fn observed(self) -> (Converter, ProgressSignal, CancellationToken) {
        let mut request = self.request;
        let signal = ProgressSignal::new().with_forward(request.options.progress.clone());
        let cancellation = request
            .options
            .cancellation
            .clone()
            .unwrap_or_default();

        request.options = request
            .options
            .with_progress(Arc::new(signal.clone()))
            .with_cancellation(cancellation.clone());

        (Converter::new(request), signal, cancellation)
    }
}

/// Handle to a conversion running on a background thread.
///
/// Dropping the handle detaches the thread; the conversion keeps running.
pub struct ConversionTask {
    handle: JoinHandle<Result<ConversionReport, FlipbookError>>,
    signal: ProgressSignal,
    cancellation: CancellationToken,
}

impl ConversionTask {
    /// Percentage of the running phase, 0 – 100.
    pub fn progress(&self) -> u8 {
        self.signal.percentage()
    }

    /// The phase currently running.
    pub fn phase(&self) -> Phase {
        self.signal.phase()
    }

    /// A clone of the signal, for observers on other threads.
    pub fn signal(&self) -> ProgressSignal {
        self.signal.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Ask the conversion to stop at the next frame or tile.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Wait for the conversion to end and return its outcome.
    ///
    /// # Panics
    ///
    /// Re-raises a panic from the worker thread.
    pub fn join(self) -> Result<ConversionReport, FlipbookError> {
        match self.handle.join() {
            Ok(result) => result,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter(video: &str, folder: &str, options: ConversionOptions) -> Converter {
        Converter::new(ConversionRequest::new(video, folder, options))
    }

    #[test]
    fn empty_paths_are_missing_input() {
        let options = ConversionOptions::new();
        assert!(matches!(
            converter("", "out", options.clone()).validate(),
            Err(FlipbookError::MissingInput(_))
        ));
        assert!(matches!(
            converter("clip.mp4", "", options).validate(),
            Err(FlipbookError::MissingInput(_))
        ));
    }

    #[test]
    fn out_of_range_parameters_are_invalid() {
        for options in [
            ConversionOptions::new().with_sample_rate(0),
            ConversionOptions::new().with_frames_per_page(0),
            ConversionOptions::new().with_frames_per_page(11),
            ConversionOptions::new().with_start("1:2"),
            ConversionOptions::new().with_start("00:00:10").with_end("00:00:05"),
        ] {
            assert!(matches!(
                converter("clip.mp4", "out", options).validate(),
                Err(FlipbookError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn staging_defaults_to_output_folder() {
        let request = ConversionRequest::new("clip.mp4", "out", ConversionOptions::new());
        assert_eq!(request.staging_dir(), Path::new("out"));

        let request = ConversionRequest::new(
            "clip.mp4",
            "out",
            ConversionOptions::new().with_staging_dir("/tmp/frames"),
        );
        assert_eq!(request.staging_dir(), Path::new("/tmp/frames"));
    }
}
