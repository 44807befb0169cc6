use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively collects files under `dir` whose extension matches
/// `extension` (case-insensitive, without the dot). Sorted.
pub fn find_files(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .map_or(false, |ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        })
        .collect();

    files.sort();
    files
}

/// Tries `extensions` in order and returns the matches of the first one
/// that finds anything, together with that extension.
pub fn find_videos<'a>(dir: &Path, extensions: &'a [String]) -> Option<(&'a str, Vec<PathBuf>)> {
    extensions.iter().find_map(|ext| {
        let files = find_files(dir, ext);
        if files.is_empty() {
            None
        } else {
            Some((ext.as_str(), files))
        }
    })
}
