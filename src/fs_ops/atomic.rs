//! Atomic rename primitives and the process-wide capability cache.
//!
//! `rename_noclobber` wants renameat2(RENAME_NOREPLACE): an atomic rename
//! that fails instead of overwriting. Not every filesystem supports the
//! flag; the first EINVAL/ENOSYS is recorded and the primitive is skipped
//! for the rest of the process instead of re-probing on every call.

use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::debug;

use crate::platform::{self, RENAME_EXCHANGE, RENAME_NOREPLACE, RENAME_WHITEOUT};

/// Result of a no-clobber rename attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoclobberOutcome {
    Renamed,
    /// EEXIST/ENOTEMPTY: something already lives at the destination.
    DestinationExists,
    /// ENOENT: the source is gone (or the destination's parent is); callers
    /// disambiguate by probing.
    SourceMissing,
    /// The filesystem lacks RENAME_NOREPLACE.
    Unsupported,
}

/// Whether RENAME_NOREPLACE works here, learned at most once per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameCapability {
    Unknown,
    Supported,
    Unsupported,
}

static NOCLOBBER_CAP: AtomicU8 = AtomicU8::new(0);

pub fn noclobber_capability() -> RenameCapability {
    match NOCLOBBER_CAP.load(Ordering::Relaxed) {
        1 => RenameCapability::Supported,
        2 => RenameCapability::Unsupported,
        _ => RenameCapability::Unknown,
    }
}

fn record_capability(cap: RenameCapability) {
    let v = match cap {
        RenameCapability::Unknown => 0,
        RenameCapability::Supported => 1,
        RenameCapability::Unsupported => 2,
    };
    NOCLOBBER_CAP.store(v, Ordering::Relaxed);
}

/// Test-only: forget the discovered capability.
#[cfg(any(test, feature = "test-helpers"))]
pub fn reset_capability() {
    NOCLOBBER_CAP.store(0, Ordering::Relaxed);
}

/// Test-only: pretend the filesystem lacks RENAME_NOREPLACE.
#[cfg(any(test, feature = "test-helpers"))]
pub fn force_capability_unsupported() {
    NOCLOBBER_CAP.store(2, Ordering::Relaxed);
}

/// Attempt the strongest available atomic rename: fails rather than
/// overwriting an existing destination. `whiteout` additionally requests a
/// whiteout entry at the source (union filesystems).
pub fn rename_noclobber(src: &Path, dst: &Path, whiteout: bool) -> io::Result<NoclobberOutcome> {
    if noclobber_capability() == RenameCapability::Unsupported {
        return Ok(NoclobberOutcome::Unsupported);
    }
    let mut flags = RENAME_NOREPLACE;
    if whiteout {
        flags |= RENAME_WHITEOUT;
    }
    match platform::renameat2(src, dst, flags) {
        Ok(()) => {
            record_capability(RenameCapability::Supported);
            if let Some(parent) = dst.parent() {
                let _ = fsync_dir(parent);
            }
            Ok(NoclobberOutcome::Renamed)
        }
        Err(e) => match e.raw_os_error() {
            Some(code) if code == libc::EEXIST || code == libc::ENOTEMPTY => {
                record_capability(RenameCapability::Supported);
                Ok(NoclobberOutcome::DestinationExists)
            }
            Some(code) if code == libc::ENOENT => {
                record_capability(RenameCapability::Supported);
                Ok(NoclobberOutcome::SourceMissing)
            }
            Some(code) if code == libc::EINVAL || code == libc::ENOSYS => {
                debug!(
                    src = %src.display(),
                    dst = %dst.display(),
                    "RENAME_NOREPLACE unsupported; remembered for this process"
                );
                record_capability(RenameCapability::Unsupported);
                Ok(NoclobberOutcome::Unsupported)
            }
            _ => Err(e),
        },
    }
}

/// Plain atomic rename; silently replaces an existing destination. Callers
/// must have verified non-existence themselves; the window between that
/// probe and this call is the documented residual race on filesystems
/// without RENAME_NOREPLACE.
pub fn rename_unconditional(src: &Path, dst: &Path) -> io::Result<()> {
    fs::rename(src, dst)?;
    if let Some(parent) = dst.parent() {
        let _ = fsync_dir(parent);
    }
    Ok(())
}

/// Flag selection for the raw exchange/whiteout primitive, a peer of
/// `rename_noclobber` used by the `atomx` utility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeMode {
    /// Plain rename(2): unconditionally replaces the destination.
    Force,
    /// Fail instead of replacing.
    NoReplace,
    /// Replace and leave a whiteout entry at the source.
    Whiteout,
    NoReplaceWhiteout,
    /// Atomically swap the two paths.
    Exchange,
}

impl ExchangeMode {
    pub fn flags(self) -> u32 {
        match self {
            ExchangeMode::Force => 0,
            ExchangeMode::NoReplace => RENAME_NOREPLACE,
            ExchangeMode::Whiteout => RENAME_WHITEOUT,
            ExchangeMode::NoReplaceWhiteout => RENAME_NOREPLACE | RENAME_WHITEOUT,
            ExchangeMode::Exchange => RENAME_EXCHANGE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExchangeMode::Force => "0",
            ExchangeMode::NoReplace => "RENAME_NOREPLACE",
            ExchangeMode::Whiteout => "RENAME_WHITEOUT",
            ExchangeMode::NoReplaceWhiteout => "RENAME_NOREPLACE+RENAME_WHITEOUT",
            ExchangeMode::Exchange => "RENAME_EXCHANGE",
        }
    }
}

/// Atomically swap two paths, or rename with the whiteout/force variants.
/// Independently invokable; does not consult the capability cache.
pub fn rename_exchange(a: &Path, b: &Path, mode: ExchangeMode) -> io::Result<()> {
    platform::renameat2(a, b, mode.flags())
}

/// Best-effort directory fsync so a completed rename survives a crash.
fn fsync_dir(dir: &Path) -> io::Result<()> {
    let f = File::open(dir)?;
    f.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn noclobber_moves_when_destination_free() {
        reset_capability();
        let td = tempdir().unwrap();
        let a = td.path().join("a");
        let b = td.path().join("b");
        fs::write(&a, b"payload").unwrap();

        let out = rename_noclobber(&a, &b, false).unwrap();
        assert_eq!(out, NoclobberOutcome::Renamed);
        assert!(!a.exists());
        assert_eq!(fs::read(&b).unwrap(), b"payload");
        assert_eq!(noclobber_capability(), RenameCapability::Supported);
    }

    #[test]
    #[serial]
    fn noclobber_refuses_existing_destination() {
        reset_capability();
        let td = tempdir().unwrap();
        let a = td.path().join("a");
        let b = td.path().join("b");
        fs::write(&a, b"new").unwrap();
        fs::write(&b, b"old").unwrap();

        let out = rename_noclobber(&a, &b, false).unwrap();
        assert_eq!(out, NoclobberOutcome::DestinationExists);
        assert_eq!(fs::read(&a).unwrap(), b"new");
        assert_eq!(fs::read(&b).unwrap(), b"old");
    }

    #[test]
    #[serial]
    fn noclobber_reports_missing_source() {
        reset_capability();
        let td = tempdir().unwrap();
        let out = rename_noclobber(&td.path().join("gone"), &td.path().join("b"), false).unwrap();
        assert_eq!(out, NoclobberOutcome::SourceMissing);
    }

    #[test]
    #[serial]
    fn unsupported_capability_short_circuits() {
        force_capability_unsupported();
        let td = tempdir().unwrap();
        let a = td.path().join("a");
        fs::write(&a, b"x").unwrap();

        // No syscall happens; the cached answer comes straight back.
        let out = rename_noclobber(&a, &td.path().join("b"), false).unwrap();
        assert_eq!(out, NoclobberOutcome::Unsupported);
        assert!(a.exists());
        reset_capability();
    }

    #[test]
    #[serial]
    fn exchange_swaps_both_paths() {
        reset_capability();
        let td = tempdir().unwrap();
        let a = td.path().join("a");
        let b = td.path().join("b");
        fs::write(&a, b"first").unwrap();
        fs::write(&b, b"second").unwrap();

        match rename_exchange(&a, &b, ExchangeMode::Exchange) {
            Ok(()) => {
                assert_eq!(fs::read(&a).unwrap(), b"second");
                assert_eq!(fs::read(&b).unwrap(), b"first");
            }
            // Filesystems without RENAME_EXCHANGE report the unsupported signature.
            Err(e) => assert!(matches!(
                e.raw_os_error(),
                Some(code) if code == libc::EINVAL || code == libc::ENOSYS
            )),
        }
    }

    #[test]
    fn exchange_mode_flag_bits() {
        assert_eq!(ExchangeMode::Force.flags(), 0);
        assert_eq!(ExchangeMode::NoReplace.flags(), RENAME_NOREPLACE);
        assert_eq!(
            ExchangeMode::NoReplaceWhiteout.flags(),
            RENAME_NOREPLACE | RENAME_WHITEOUT
        );
        assert_eq!(ExchangeMode::Exchange.flags(), RENAME_EXCHANGE);
    }
}
