//! Sequential video decoding.
//!
//! The sampler only ever needs "the next frame, in temporal order", so the
//! decoding side is reduced to the [`FrameSource`] trait. [`VideoReader`] is
//! the FFmpeg-backed implementation; tests and alternative decoders can
//! provide their own.

use std::path::{Path, PathBuf};

use ffmpeg_next::{
    Error as FfmpegError, Packet,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbImage;

use crate::{error::FlipbookError, metadata::VideoMetadata};

/// A time-ordered stream of decoded frames.
///
/// The source is owned by whoever samples it and is released when dropped.
pub trait FrameSource {
    /// Stream properties, known as soon as the source is open.
    fn metadata(&self) -> &VideoMetadata;

    /// Decode the next frame. `Ok(None)` marks the end of the stream.
    fn next_frame(&mut self) -> Result<Option<RgbImage>, FlipbookError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn metadata(&self) -> &VideoMetadata {
        (**self).metadata()
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>, FlipbookError> {
        (**self).next_frame()
    }
}

/// Decodes every frame of the best video stream of a file, in order.
///
/// Frames are converted to packed RGB at the source resolution. The demuxer,
/// decoder and scaler are freed when the reader is dropped.
///
/// # Example
///
/// ```no_run
/// use flipbook::{FrameSource, VideoReader};
///
/// let mut reader = VideoReader::open("input.mp4")?;
/// while let Some(frame) = reader.next_frame()? {
///     println!("{}x{}", frame.width(), frame.height());
/// }
/// # Ok::<(), flipbook::FlipbookError>(())
/// ```
pub struct VideoReader {
    input_context: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    video_stream_index: usize,
    metadata: VideoMetadata,
    decoded_frame: VideoFrame,
    rgb_frame: VideoFrame,
    eof_sent: bool,
    done: bool,
    path: PathBuf,
}

impl VideoReader {
    /// Open `path` and prepare to decode its best video stream.
    ///
    /// # Errors
    ///
    /// Returns [`FlipbookError::SourceUnreadable`] if the file cannot be
    /// opened, has no video stream, or reports a zero or invalid frame rate.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FlipbookError> {
        let path = path.as_ref().to_path_buf();
        let unreadable = |reason: String| FlipbookError::SourceUnreadable {
            path: path.clone(),
            reason,
        };

        log::debug!("Opening video source: {}", path.display());
        crate::ffmpeg::initialize().map_err(|error| unreadable(error.to_string()))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| unreadable(error.to_string()))?;

        let (video_stream_index, decoder, frames_per_second, recorded_frames) = {
            let stream = input_context
                .streams()
                .best(Type::Video)
                .ok_or_else(|| unreadable("no video stream".to_string()))?;

            let rate = stream.avg_frame_rate();
            let rate = if rate.denominator() != 0 && rate.numerator() > 0 {
                rate
            } else {
                stream.rate()
            };
            let frames_per_second = if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            };

            let decoder = CodecContext::from_parameters(stream.parameters())
                .and_then(|context| context.decoder().video())
                .map_err(|error| unreadable(format!("cannot create decoder: {error}")))?;

            (stream.index(), decoder, frames_per_second, stream.frames())
        };

        if !frames_per_second.is_finite() || frames_per_second <= 0.0 {
            return Err(unreadable(format!(
                "invalid frame rate {frames_per_second}"
            )));
        }

        let frame_count = if recorded_frames > 0 {
            recorded_frames as u64
        } else {
            let micros = input_context.duration().max(0) as f64;
            (micros / 1_000_000.0 * frames_per_second) as u64
        };

        let (width, height) = (decoder.width(), decoder.height());
        let scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|error| unreadable(format!("cannot create RGB converter: {error}")))?;

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = VideoMetadata {
            width,
            height,
            frames_per_second,
            frame_count,
            codec,
        };
        log::debug!(
            "{}: {}x{} @ {:.3} fps, {} frames",
            path.display(),
            width,
            height,
            frames_per_second,
            frame_count
        );

        Ok(Self {
            input_context,
            decoder,
            scaler,
            video_stream_index,
            metadata,
            decoded_frame: VideoFrame::empty(),
            rgb_frame: VideoFrame::empty(),
            eof_sent: false,
            done: false,
            path,
        })
    }

    /// The path this reader was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn convert_current_frame(&mut self) -> Result<RgbImage, FlipbookError> {
        self.scaler.run(&self.decoded_frame, &mut self.rgb_frame)?;

        let (width, height) = (self.metadata.width, self.metadata.height);
        let buffer = packed_rgb(&self.rgb_frame, width, height);
        RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            FlipbookError::VideoDecodeError(
                "decoded frame does not match the stream dimensions".to_string(),
            )
        })
    }
}

impl FrameSource for VideoReader {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>, FlipbookError> {
        if self.done {
            return Ok(None);
        }

        loop {
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                let converted = self.convert_current_frame();
                return stop_on_error(&mut self.done, converted).map(Some);
            }

            if self.eof_sent {
                self.done = true;
                return Ok(None);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    if packet.stream() == self.video_stream_index {
                        let sent = self.decoder.send_packet(&packet);
                        stop_on_error(&mut self.done, sent)?;
                    }
                }
                Err(FfmpegError::Eof) => {
                    let sent = self.decoder.send_eof();
                    stop_on_error(&mut self.done, sent)?;
                    self.eof_sent = true;
                }
                Err(error) => {
                    self.done = true;
                    return Err(FlipbookError::VideoDecodeError(format!(
                        "{}: {error}",
                        self.path.display()
                    )));
                }
            }
        }
    }
}

/// Mark the reader exhausted when `result` failed, so later calls return
/// `Ok(None)`.
fn stop_on_error<T, E: Into<FlipbookError>>(
    done: &mut bool,
    result: Result<T, E>,
) -> Result<T, FlipbookError> {
    result.map_err(|error| {
        *done = true;
        error.into()
    })
}

/// Strip per-row padding from an RGB24 frame.
fn packed_rgb(frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = frame.stride(0);
    let row_bytes = width as usize * 3;
    let data = frame.data(0);

    if stride == row_bytes {
        return data[..row_bytes * height as usize].to_vec();
    }

    let mut buffer = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        buffer.extend_from_slice(&data[start..start + row_bytes]);
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoder_errors_end_the_stream() {
        let mut done = false;
        let result: Result<(), _> = stop_on_error(&mut done, Err(FfmpegError::InvalidData));
        assert!(matches!(result, Err(FlipbookError::FfmpegError(_))));
        assert!(done);
    }

    #[test]
    fn success_keeps_the_stream_open() {
        let mut done = false;
        let value = stop_on_error(&mut done, Ok::<_, FfmpegError>(7)).unwrap();
        assert_eq!(value, 7);
        assert!(!done);
    }
}
