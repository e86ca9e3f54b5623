use std::collections::HashSet;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::TransferError;

/// Derives a local file name from the last path segment of a URL.
pub fn get_filename_from_url(url_str: &str) -> String {
    let segment = match Url::parse(url_str) {
        Ok(url) => url
            .path_segments()
            .and_then(|segments| segments.last())
            .map(str::to_string),
        Err(_) => url_str.rsplit('/').next().map(str::to_string),
    };

    match segment.filter(|s| !s.is_empty() && s != "." && s != "..") {
        Some(filename) => sanitize_filename(&filename),
        // Fallback if no filename found in path
        None => format!("download_{}", uuid::Uuid::new_v4()),
    }
}

pub fn sanitize_filename(filename: &str) -> String {
    filename.replace(|c: char| !c.is_alphanumeric() && c != '.' && c != '-' && c != '_', "_")
}

/// Returns `filename`, or `stem_N.ext` with the smallest free `N`, whichever
/// is not in `taken`. Comparison ignores case.
pub fn get_unique_filename(filename: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(&filename.to_lowercase()) {
        return filename.to_string();
    }

    let path = Path::new(filename);
    let file_stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| filename.to_string());
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut counter = 1;
    loop {
        let candidate = if extension.is_empty() {
            format!("{}_{}", file_stem, counter)
        } else {
            format!("{}_{}.{}", file_stem, counter, extension)
        };
        if !taken.contains(&candidate.to_lowercase()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Derives one output name per URL, index-aligned, with no two alike.
pub fn assign_filenames(urls: &[String]) -> Vec<String> {
    let mut taken = HashSet::with_capacity(urls.len());
    urls.iter()
        .map(|url| {
            let filename = get_unique_filename(&get_filename_from_url(url), &taken);
            taken.insert(filename.to_lowercase());
            filename
        })
        .collect()
}

/// Files land next to the working directory, in its parent.
pub fn destination_dir() -> Result<PathBuf, TransferError> {
    let cwd = std::env::current_dir().map_err(TransferError::WorkingDirectoryUnavailable)?;
    let dir = match cwd.parent() {
        Some(parent) => parent.to_path_buf(),
        None => cwd.clone(),
    };
    Ok(dir)
}
