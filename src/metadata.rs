//! Video metadata.
//!
//! [`VideoMetadata`] is read once when a [`VideoReader`](crate::VideoReader)
//! opens a file and describes the stream the sampler walks through.

use std::time::Duration;

/// Metadata for the video stream being sampled.
///
/// # Example
///
/// ```no_run
/// use flipbook::{FrameSource, VideoReader};
///
/// let reader = VideoReader::open("input.mp4").unwrap();
/// let metadata = reader.metadata();
/// println!("{} frames at {:.2} fps", metadata.frame_count, metadata.frames_per_second);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Nominal frames per second.
    pub frames_per_second: f64,
    /// Total number of frames. Estimated from the duration when the container
    /// does not record it; may be 0 when neither is known.
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`, `"vp9"`).
    pub codec: String,
}

impl VideoMetadata {
    /// Duration derived as `frame_count / frames_per_second`.
    pub fn duration(&self) -> Duration {
        if self.frames_per_second > 0.0 {
            Duration::from_secs_f64(self.frame_count as f64 / self.frames_per_second)
        } else {
            Duration::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_count_over_rate() {
        let metadata = VideoMetadata {
            width: 64,
            height: 48,
            frames_per_second: 25.0,
            frame_count: 125,
            codec: "test".to_string(),
        };
        assert_eq!(metadata.duration(), Duration::from_secs(5));
    }
}
