//! Static file resolution
//!
//! Maps a request path onto the document root. The file itself is loaded by
//! `Response::from_file`, which turns any read failure into a 404.

use std::path::{Path, PathBuf};

use crate::http::{Response, StatusCode};
use crate::logger;

/// Serve `path` from `root`, trying `index_files` for directories
pub fn serve(root: &str, path: &str, index_files: &[String]) -> Response {
    match resolve(root, path, index_files) {
        Some(file_path) => Response::from_file(file_path),
        None => Response::new(StatusCode::NOT_FOUND),
    }
}

/// Resolve a request path to a file inside `root`
///
/// Returns `None` when the root is missing or the path escapes it. The
/// returned file may still be unreadable.
pub fn resolve(root: &str, path: &str, index_files: &[String]) -> Option<PathBuf> {
    let root_canonical = match Path::new(root).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Document root not found or inaccessible '{root}': {e}"
            ));
            return None;
        }
    };

    let relative = path.trim_start_matches('/');
    let mut file_path = root_canonical.join(relative);

    if file_path.is_dir() {
        if let Some(index) = index_files
            .iter()
            .map(|name| file_path.join(name))
            .find(|candidate| candidate.is_file())
        {
            file_path = index;
        }
    }

    // A missing file is a plain 404, not worth a warning
    let Ok(file_canonical) = file_path.canonicalize() else {
        logger::log_debug(&format!("No such file: {}", file_path.display()));
        return (!has_parent_dir(relative)).then_some(file_path);
    };
    if !file_canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {path} -> {}",
            file_canonical.display()
        ));
        return None;
    }
    Some(file_canonical)
}

fn has_parent_dir(relative: &str) -> bool {
    Path::new(relative)
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
}
