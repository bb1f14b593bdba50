//! Output document naming.
//!
//! A flipbook for `clips/holiday.mp4` is written as
//! `flipbook for [holiday].pdf`. If that file already exists the next free
//! name out of `flipbook for [holiday]_1.pdf`, `_2`, … is used instead, so an
//! existing document is never overwritten.

use std::path::{Path, PathBuf};

/// Name used when the video path has no usable file stem.
const FALLBACK_NAME: &str = "video";

/// Display name of a video: its file name without the extension.
///
/// ```
/// use flipbook::output::video_display_name;
///
/// assert_eq!(video_display_name("clips/holiday.mp4"), "holiday");
/// assert_eq!(video_display_name("archive.tar.mov"), "archive.tar");
/// ```
pub fn video_display_name(video: impl AsRef<Path>) -> String {
    video
        .as_ref()
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

/// First path in `folder` for the flipbook of `video` that does not exist
/// yet.
pub fn output_document_path(folder: impl AsRef<Path>, video: impl AsRef<Path>) -> PathBuf {
    let folder = folder.as_ref();
    let name = video_display_name(video);

    let first = folder.join(format!("flipbook for [{name}].pdf"));
    if !first.exists() {
        return first;
    }

    let mut suffix: u64 = 1;
    loop {
        let candidate = folder.join(format!("flipbook for [{name}]_{suffix}.pdf"));
        if !candidate.exists() {
            log::debug!("{} exists, using {}", first.display(), candidate.display());
            return candidate;
        }
        suffix += 1;
    }
}
