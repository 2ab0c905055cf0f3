//! Runtime policy configuration.
//! Built once from the parsed CLI flags in `cli.rs`, then passed by
//! reference into every component; nothing mutates it afterwards.

use std::path::PathBuf;

/// Parent-directory creation depth, from the stacking `-p` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateParents {
    #[default]
    None,
    /// `-p`: create missing parents for composed rename destinations.
    ForRename,
    /// `-pp`: additionally accept a missing `--dest` directory and create it.
    ForDestDir,
}

impl CreateParents {
    pub fn from_count(n: u8) -> Self {
        match n {
            0 => CreateParents::None,
            1 => CreateParents::ForRename,
            _ => CreateParents::ForDestDir,
        }
    }

    pub fn enabled(self) -> bool {
        self != CreateParents::None
    }
}

/// Whiteout request state (`-w` / `--no-whiteout`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Whiteout {
    #[default]
    Unset,
    Off,
    On,
}

impl Whiteout {
    pub fn is_on(self) -> bool {
        matches!(self, Whiteout::On)
    }
}

/// The process-wide relocation policy.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Back up an existing destination before moving over it.
    pub backup: bool,
    /// Move the source aside to a backup name when the destination exists.
    pub append: bool,
    /// Redirect backups into this directory instead of next to the destination.
    pub backup_dir: Option<PathBuf>,
    /// Destination directory for move-into-directory mode.
    pub dest: Option<PathBuf>,
    pub create_parents: CreateParents,
    /// Fail instead of falling back when the no-clobber primitive is missing.
    pub enforce_atomic: bool,
    pub whiteout: Whiteout,
    /// Compose destinations relative to the source path.
    pub relative: bool,
    /// Literal prefix prepended to every source name (not a directory join).
    pub source_prefix: Option<String>,
    /// Stdin name stream is NUL-delimited.
    pub nulls: bool,
    /// Stdin name stream is newline-delimited.
    pub lines: bool,
    /// Record failures and keep going instead of aborting the batch.
    pub ignore_errors: bool,
    pub quiet: bool,
    pub verbose: bool,
    /// mv-style promotion of a trailing directory argument to the destination.
    pub original_mv: bool,
    /// Emit log events as JSON.
    pub log_json: bool,
}

impl Config {
    /// Whether an existing destination may be displaced rather than rejected.
    pub fn can_backup(&self) -> bool {
        self.backup || self.backup_dir.is_some()
    }

    /// Effective strict-atomicity: whiteout needs the real primitive, so `-w`
    /// implies `-e`.
    pub fn enforce(&self) -> bool {
        self.enforce_atomic || self.whiteout.is_on()
    }
}
