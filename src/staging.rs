//! The staging area between sampling and layout.
//!
//! Sampled frames are written as `frame00000.jpg`, `frame00001.jpg`, … so
//! that name order equals capture order. Only files matching that pattern are
//! ever listed or removed; anything else in the directory is left alone.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::error::FlipbookError;

const PREFIX: &str = "frame";
const EXTENSION: &str = "jpg";
const INDEX_WIDTH: usize = 5;

/// One sampled still image on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFrame {
    /// Zero-based position among the kept frames.
    pub index: u64,
    /// Where the image was written.
    pub path: PathBuf,
    /// Synthetic time assigned to the frame, `index / sample_rate`.
    pub timestamp: Duration,
    /// Zero-based position of the frame in the decoded source.
    pub source_index: u64,
}

/// File name for the staged frame with the given index.
///
/// ```
/// assert_eq!(flipbook::staged_frame_name(7), "frame00007.jpg");
/// ```
pub fn staged_frame_name(index: u64) -> String {
    format!("{PREFIX}{index:05}.{EXTENSION}")
}

/// Parse the index back out of a staged frame file name.
pub(crate) fn staged_frame_index(name: &str) -> Option<u64> {
    let digits = name.strip_prefix(PREFIX)?.strip_suffix(EXTENSION)?;
    let digits = digits.strip_suffix('.')?;
    if digits.len() < INDEX_WIDTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Create the staging directory if it does not exist yet.
///
/// # Errors
///
/// Returns [`FlipbookError::StagingUnwritable`] on an I/O failure. An
/// existing directory is not an error.
pub(crate) fn prepare(dir: &Path) -> Result<(), FlipbookError> {
    fs::create_dir_all(dir).map_err(|error| FlipbookError::StagingUnwritable {
        path: dir.to_path_buf(),
        reason: error.to_string(),
    })
}

/// All staged frames in `dir`, in capture order.
///
/// Indices are compared numerically, which equals lexical order for the
/// fixed-width names and stays correct past 99 999 frames.
pub fn list_staged_frames(dir: &Path) -> Result<Vec<PathBuf>, FlipbookError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(error) => return Err(error.into()),
    };

    let mut frames: Vec<(u64, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if let Some(index) = name.to_str().and_then(staged_frame_index) {
            frames.push((index, entry.path()));
        }
    }

    frames.sort_unstable_by_key(|(index, _)| *index);
    Ok(frames.into_iter().map(|(_, path)| path).collect())
}

/// Delete every staged frame in `dir`. Returns how many were removed.
pub fn remove_staged_frames(dir: &Path) -> Result<usize, FlipbookError> {
    let frames = list_staged_frames(dir)?;
    for path in &frames {
        fs::remove_file(path)?;
    }
    log::debug!("Removed {} staged frame(s) from {}", frames.len(), dir.display());
    Ok(frames.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        assert_eq!(staged_frame_index(&staged_frame_name(0)), Some(0));
        assert_eq!(staged_frame_index(&staged_frame_name(123_456)), Some(123_456));
    }

    #[test]
    fn foreign_names_are_ignored() {
        for name in ["frame0001.jpg", "frame00001.png", "frameabcde.jpg", "holiday.jpg", "frame00001jpg"] {
            assert_eq!(staged_frame_index(name), None, "{name}");
        }
    }

    #[test]
    fn listing_follows_capture_order() {
        let dir = tempfile::tempdir().unwrap();
        for index in [3_u64, 100_000, 0, 12] {
            fs::write(dir.path().join(staged_frame_name(index)), b"x").unwrap();
        }
        fs::write(dir.path().join("cover.jpg"), b"x").unwrap();

        let names: Vec<String> = list_staged_frames(dir.path())
            .unwrap()
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            ["frame00000.jpg", "frame00003.jpg", "frame00012.jpg", "frame100000.jpg"]
        );

        assert_eq!(remove_staged_frames(dir.path()).unwrap(), 4);
        assert!(dir.path().join("cover.jpg").exists());
    }

    #[test]
    fn missing_directory_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_staged_frames(&dir.path().join("absent")).unwrap().is_empty());
    }
}
