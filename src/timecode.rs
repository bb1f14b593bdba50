//! `HH:MM:SS` time bounds.
//!
//! Window bounds arrive as text from the front end and are turned into whole
//! seconds with `h * 3600 + m * 60 + s`. Anything else is rejected as
//! [`FlipbookError::InvalidParameter`].

use std::time::Duration;

use crate::error::FlipbookError;

/// Parse an `HH:MM:SS` string into whole seconds.
///
/// Each field must be an unsigned integer. Fields are not range-checked, so
/// `"00:90:00"` is ninety minutes.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// let t = flipbook::parse_timecode("01:02:03").unwrap();
/// assert_eq!(t, Duration::from_secs(3723));
/// assert!(flipbook::parse_timecode("1:2").is_err());
/// ```
pub fn parse_timecode(value: &str) -> Result<Duration, FlipbookError> {
    let trimmed = value.trim();
    let malformed = || {
        FlipbookError::InvalidParameter(format!("malformed time '{trimmed}' (expected HH:MM:SS)"))
    };

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() != 3 {
        return Err(malformed());
    }

    let mut fields = [0_u64; 3];
    for (field, part) in fields.iter_mut().zip(&parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        *field = part.parse().map_err(|_| malformed())?;
    }

    let [hours, minutes, seconds] = fields;
    let total = hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .ok_or_else(malformed)?;
    Ok(Duration::from_secs(total))
}

/// Format a duration as `HH:MM:SS`, dropping fractional seconds.
pub fn format_timecode(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{:02}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}

/// A closed interval of source time to sample from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeWindow {
    /// Inclusive start.
    pub start: Duration,
    /// Inclusive end. `None` runs to the end of the video.
    pub end: Option<Duration>,
}

impl TimeWindow {
    /// The whole video.
    pub fn full() -> Self {
        Self::default()
    }

    /// Build a window, rejecting `start >= end`.
    pub fn new(start: Duration, end: Option<Duration>) -> Result<Self, FlipbookError> {
        if let Some(end) = end {
            if start >= end {
                return Err(FlipbookError::InvalidParameter(format!(
                    "start time {} must be before end time {}",
                    format_timecode(start),
                    format_timecode(end),
                )));
            }
        }
        Ok(Self { start, end })
    }

    /// Parse optional `HH:MM:SS` bounds. A missing start means zero.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, FlipbookError> {
        let start = start.map(parse_timecode).transpose()?.unwrap_or_default();
        let end = end.map(parse_timecode).transpose()?;
        Self::new(start, end)
    }

    /// Whether `seconds` lies inside the window.
    pub fn contains(&self, seconds: f64) -> bool {
        if seconds < self.start.as_secs_f64() {
            return false;
        }
        self.end.is_none_or(|end| seconds <= end.as_secs_f64())
    }
}
