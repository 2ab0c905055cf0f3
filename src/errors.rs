//! Typed error definitions for atomv.
//! One variant per well-known failure mode of a relocation request, so the
//! batch driver and tests can match on exactly what went wrong.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MoveError {
    #[error("missing source for rename: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("existing destination: {}", .0.display())]
    DestinationExists(PathBuf),

    /// A backup target is occupied and no policy allows suffixing it further.
    #[error("existing backup destination: {}", .0.display())]
    BackupDestinationExists(PathBuf),

    #[error("missing destination directory: {}", .0.display())]
    MissingDestDir(PathBuf),

    #[error("existing destination not a directory: {}", .0.display())]
    DestNotDirectory(PathBuf),

    #[error("failed: mkdir for {}", .path.display())]
    ParentCreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Strict mode (`--enforce`) and the filesystem lacks a no-clobber rename.
    #[error("no-clobber rename unsupported by filesystem: {} -> {}", .src.display(), .dst.display())]
    PrimitiveUnsupported { src: PathBuf, dst: PathBuf },

    #[error("cannot rename {} -> {}: {source}", .src.display(), .dst.display())]
    PrimitiveFailed {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Usage(String),
}

impl MoveError {
    /// Usage errors exit with the usage-error status instead of a plain failure.
    pub fn is_usage(&self) -> bool {
        matches!(self, MoveError::Usage(_))
    }
}
