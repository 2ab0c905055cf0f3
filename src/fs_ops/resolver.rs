//! Conflict resolution for a single relocation request.
//!
//! The flow mirrors the only safe ordering: attempt the no-clobber rename
//! first (optimistic, zero probes in the common case), and only on failure
//! probe to decide between source-missing, displace-the-destination
//! (backup), move-the-source-aside (append) and parent creation. Probes
//! narrow windows and improve diagnostics; the step that actually commits
//! is always the atomic primitive.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

use crate::config::Config;
use crate::errors::MoveError;
use crate::output as out;

use super::atomic::{self, NoclobberOutcome};
use super::backup;
use super::compose;
use super::probe;

type MoveResult = Result<(), MoveError>;

/// Relocate `src` to `dest` under the configured conflict policy.
pub fn move_with_backup(cfg: &Config, src: &Path, dest: &Path) -> MoveResult {
    // Optimistic attempt. The unconditional fallback is NOT taken from here:
    // nothing has verified yet that the destination is free.
    if let Ok(NoclobberOutcome::Renamed) = atomic::rename_noclobber(src, dest, cfg.whiteout.is_on())
    {
        trace_rename(cfg, "rename", src, dest);
        return Ok(());
    }

    // Work out what stopped us.
    if probe::probe(src).is_missing() {
        return Err(MoveError::SourceMissing(src.to_path_buf()));
    }
    if probe::exists(dest) {
        if cfg.append {
            // Append policy: the *source* moves aside to a backup name of
            // the destination; the existing destination stays put.
            return rename_away(cfg, src, dest);
        }
        if !cfg.can_backup() {
            return Err(MoveError::DestinationExists(dest.to_path_buf()));
        }
        // Displace the existing destination to its backup name, then retry.
        rename_away(cfg, dest, dest)?;
    } else if cfg.create_parents.enabled() {
        make_parents(cfg, dest)?;
    }
    checked_rename(cfg, src, dest)
}

/// Move `name` out of the way: to `target`, redirected into the backup
/// directory when one is configured, backup-suffixed when already taken.
fn rename_away(cfg: &Config, name: &Path, target: &Path) -> MoveResult {
    let mut target = target.to_path_buf();
    if let Some(dir) = &cfg.backup_dir {
        let file = target.file_name().ok_or_else(|| {
            MoveError::Usage(format!(
                "cannot derive a backup name from: {}",
                target.display()
            ))
        })?;
        target = dir.join(file);
    }
    if probe::exists(&target) {
        if !cfg.append && !cfg.backup {
            return Err(MoveError::BackupDestinationExists(target));
        }
        target = backup::backup_name(&target);
    } else if cfg.create_parents.enabled() {
        make_parents(cfg, &target)?;
    }
    checked_rename(cfg, name, &target)
}

/// Move-away mode (`-ab NAME`): relocate the source to its own backup name.
pub fn move_away(cfg: &Config, name: &Path) -> MoveResult {
    let src = compose::prefixed_source(cfg.source_prefix.as_deref(), name);
    if probe::probe(&src).is_missing() {
        return Err(MoveError::SourceMissing(src));
    }
    rename_away(cfg, &src, &src)
}

/// Two-argument rename (`atomv OLD NEW`), honoring `-r` and `-s`.
pub fn move_rename(cfg: &Config, old: &Path, new: &Path) -> MoveResult {
    let dest = if cfg.relative {
        compose::relative_destination(old, new)
    } else {
        new.to_path_buf()
    };
    let src = compose::prefixed_source(cfg.source_prefix.as_deref(), old);
    move_with_backup(cfg, &src, &dest)
}

/// Move `name` into the destination directory (`-d DIR`), honoring `-r`/`-s`.
pub fn move_into_dir(cfg: &Config, dest_dir: &Path, name: &Path) -> MoveResult {
    let target = compose::dest_target(cfg.relative, name).ok_or_else(|| {
        MoveError::Usage(format!(
            "cannot derive a target name from: {}",
            name.display()
        ))
    })?;
    let dest = dest_dir.join(&target);
    if cfg.relative {
        // -r reproduces the source tree under the destination; its parents
        // are created without requiring -p.
        make_parents(cfg, &dest)?;
    }
    let src = compose::prefixed_source(cfg.source_prefix.as_deref(), name);
    move_with_backup(cfg, &src, &dest)
}

/// The primitive step: no-clobber rename, falling back to the unconditional
/// rename only when the strong primitive is unsupported, enforcement is off
/// and no whiteout was requested. Callers have already verified that the
/// destination is currently free.
fn checked_rename(cfg: &Config, src: &Path, dst: &Path) -> MoveResult {
    match atomic::rename_noclobber(src, dst, cfg.whiteout.is_on()) {
        Ok(NoclobberOutcome::Renamed) => {
            trace_rename(cfg, "rename", src, dst);
            Ok(())
        }
        Ok(NoclobberOutcome::DestinationExists) => {
            Err(MoveError::DestinationExists(dst.to_path_buf()))
        }
        Ok(NoclobberOutcome::SourceMissing) => Err(MoveError::PrimitiveFailed {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
            source: io::Error::from_raw_os_error(libc::ENOENT),
        }),
        Ok(NoclobberOutcome::Unsupported) => {
            if cfg.enforce() {
                return Err(MoveError::PrimitiveUnsupported {
                    src: src.to_path_buf(),
                    dst: dst.to_path_buf(),
                });
            }
            match atomic::rename_unconditional(src, dst) {
                Ok(()) => {
                    trace_rename(cfg, "unsafe rename", src, dst);
                    Ok(())
                }
                Err(e) => Err(MoveError::PrimitiveFailed {
                    src: src.to_path_buf(),
                    dst: dst.to_path_buf(),
                    source: e,
                }),
            }
        }
        Err(e) => Err(MoveError::PrimitiveFailed {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
            source: e,
        }),
    }
}

/// Create the destination's missing parent directories. Losing the creation
/// race to another process is success; the failure surfaces only when a
/// retry also fails and the directory still is not there.
fn make_parents(cfg: &Config, dest: &Path) -> MoveResult {
    let Some(parent) = dest.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() || probe::probe(parent).is_dir() {
        return Ok(());
    }
    if let Err(first) = fs::create_dir_all(parent) {
        if !probe::probe(parent).is_dir() && fs::create_dir_all(parent).is_err() {
            return Err(MoveError::ParentCreateFailed {
                path: parent.to_path_buf(),
                source: first,
            });
        }
    }
    debug!(path = %parent.display(), "created parent directories");
    if cfg.verbose {
        out::print_user(&format!("mkdir for {}", dest.display()));
    }
    Ok(())
}

fn trace_rename(cfg: &Config, kind: &str, src: &Path, dst: &Path) {
    info!(kind, src = %src.display(), dest = %dst.display(), "rename completed");
    if cfg.verbose {
        out::print_user(&format!("{kind}: {} -> {}", src.display(), dst.display()));
    }
}
