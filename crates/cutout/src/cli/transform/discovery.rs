//! Source discovery: a single file or every supported image under a directory.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A source file found on disk.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

/// Find transformable sources at `path`.
///
/// A file is returned as-is when its extension is supported. A directory is
/// walked recursively, skipping earlier outputs for `options`; results are
/// sorted by path.
pub fn discover(
    path: &Path,
    supported_formats: &[String],
    options: &str,
) -> Vec<DiscoveredFile> {
    if path.is_file() {
        return match std::fs::metadata(path) {
            Ok(meta) if is_supported(path, supported_formats) => vec![DiscoveredFile {
                path: path.to_path_buf(),
                size: meta.len(),
            }],
            _ => vec![],
        };
    }

    let mut files: Vec<DiscoveredFile> = WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| is_supported(entry.path(), supported_formats))
        .filter(|entry| !is_generated(entry.path(), options))
        .filter_map(|entry| {
            let size = entry.metadata().ok()?.len();
            Some(DiscoveredFile {
                path: entry.into_path(),
                size,
            })
        })
        .collect();

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}

fn is_supported(path: &Path, supported_formats: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            supported_formats
                .iter()
                .any(|fmt| fmt.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Outputs are named `<stem>.<options>.jpg`.
fn is_generated(path: &Path, options: &str) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|stem| stem.strip_suffix(options))
        .is_some_and(|rest| rest.len() > 1 && rest.ends_with('.'))
}
