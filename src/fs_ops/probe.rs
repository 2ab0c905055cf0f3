//! Existence probing.
//! The rename primitives operate on the link itself, so probes use
//! `symlink_metadata` and never follow the final component. Probe errors
//! (including EACCES) read as Missing; the rename that follows reports the
//! real failure with its own errno.

use std::fs;
use std::path::Path;

/// What a path resolves to right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistenceState {
    Missing,
    File,
    Directory,
    /// Present but neither regular file nor directory: symlink, fifo, socket, device.
    Other,
}

impl ExistenceState {
    pub fn is_missing(self) -> bool {
        matches!(self, ExistenceState::Missing)
    }

    pub fn is_dir(self) -> bool {
        matches!(self, ExistenceState::Directory)
    }
}

/// Probe a path's current state. Nothing is cached here; callers that need
/// freshness re-probe immediately before acting on the answer.
pub fn probe(path: &Path) -> ExistenceState {
    match fs::symlink_metadata(path) {
        Err(_) => ExistenceState::Missing,
        Ok(meta) if meta.is_dir() => ExistenceState::Directory,
        Ok(meta) if meta.is_file() => ExistenceState::File,
        Ok(_) => ExistenceState::Other,
    }
}

pub fn exists(path: &Path) -> bool {
    !probe(path).is_missing()
}
