//! Upward search for the directory holding the marker directory

use std::path::{Path, PathBuf};

/// Walk up from `start` until a directory containing `marker` is found
///
/// At most `max_hops` parents are visited. When no marker is found, or the
/// filesystem root is reached first, `start` itself is returned.
#[must_use]
pub fn discover_root(start: &Path, marker: &str, max_hops: usize) -> PathBuf {
    let mut current = start;
    for _ in 0..=max_hops {
        if current.join(marker).is_dir() {
            tracing::debug!(root = %current.display(), marker, "found marker directory");
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    tracing::debug!(start = %start.display(), marker, "no marker directory found, using start");
    start.to_path_buf()
}
