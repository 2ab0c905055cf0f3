//! Core library for `atomv`.
//!
//! Atomic file relocation: a destination is never observed transiently
//! missing by concurrent readers, and an existing destination is never
//! silently destroyed: it is preserved under a deterministic backup name
//! or the move is rejected. The pieces: a no-clobber rename primitive with
//! per-process capability fallback (`fs_ops::atomic`), a conflict-resolution
//! policy layer (`fs_ops::resolver`), backup naming, path composition, and
//! the policy `Config` the CLI binaries build once and share.

pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod output;
pub mod platform;

pub use config::{Config, CreateParents, Whiteout};
pub use errors::MoveError;
pub use fs_ops::{move_away, move_into_dir, move_rename, move_with_backup};
