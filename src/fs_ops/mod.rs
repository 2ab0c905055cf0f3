//! Filesystem operations: the atomic primitive layer, existence probing,
//! backup naming, path composition and the per-request conflict resolver.

pub mod atomic;
pub mod backup;
pub mod compose;
pub mod probe;
pub mod resolver;

pub use atomic::{
    noclobber_capability, rename_exchange, rename_noclobber, rename_unconditional, ExchangeMode,
    NoclobberOutcome, RenameCapability,
};
pub use backup::backup_name;
pub use probe::{exists, probe, ExistenceState};
pub use resolver::{move_away, move_into_dir, move_rename, move_with_backup};
