//! Application orchestrator and batch driver.
//! Derives the policy Config, initializes logging, resolves the argument
//! shape (rename / move-into-directory / move-away) and folds per-request
//! outcomes into the process exit status. One request is fully resolved
//! before the next begins; correctness under external concurrency is the
//! resolver's job, not this loop's.

use anyhow::Result;
use std::ffi::{OsStr, OsString};
use std::io::{self, BufRead};
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::{Path, PathBuf};
use tracing::debug;

use atomv::config::{Config, CreateParents};
use atomv::errors::MoveError;
use atomv::fs_ops::{move_away, move_into_dir, move_rename, probe, ExistenceState};
use atomv::output as out;

use crate::cli::Args;
use crate::logging::init_tracing;

/// Exit statuses: success, any failed request, usage error.
const EXIT_OK: u8 = 0;
const EXIT_FAILED: u8 = 1;
const EXIT_USAGE: u8 = 2;

/// Run the CLI application, returning the process exit code.
pub fn run(args: Args) -> u8 {
    let cfg = args.to_config();
    init_tracing(cfg.quiet, cfg.verbose, cfg.log_json);
    debug!(?args, "starting atomv");

    match drive(&cfg, args.names) {
        Ok(false) => EXIT_OK,
        Ok(true) => EXIT_FAILED,
        Err(e) => {
            if e.downcast_ref::<MoveError>().is_some_and(MoveError::is_usage) {
                out::print_error(&e.to_string());
                out::print_error("try --help for usage");
                EXIT_USAGE
            } else {
                // Already reported by the driver when it aborted the batch.
                EXIT_FAILED
            }
        }
    }
}

/// Dispatch on argument shape and process the batch. `Ok(failed)` carries
/// the accumulated failure flag for ignore-mode.
fn drive(cfg: &Config, mut names: Vec<OsString>) -> Result<bool> {
    let mut dest = cfg.dest.clone();

    // --original: promote a trailing directory-looking argument, mv-style.
    if cfg.original_mv && dest.is_none() && names.len() >= 2 {
        let promote = names
            .last()
            .is_some_and(|last| is_directory_target(Path::new(last)));
        if promote {
            dest = names.pop().map(PathBuf::from);
        }
    }

    let mut driver = Driver::new(cfg);

    // `-ab NAME` with no destination: unconditionally move the name aside.
    if dest.is_none() && cfg.backup && cfg.append && names.len() == 1 {
        driver.each(&names[0], move_away)?;
        return Ok(driver.failed);
    }

    if cfg.backup && cfg.append {
        return Err(MoveError::Usage(
            "options --append and --backup cannot be combined this way".into(),
        )
        .into());
    }

    if let Some(dest_dir) = dest {
        for name in &names {
            driver.each(name, |cfg, n| {
                preflight_dest_dir(cfg, &dest_dir)?;
                move_into_dir(cfg, &dest_dir, n)
            })?;
        }
        return Ok(driver.failed);
    }

    if names.len() == 2 {
        let old = PathBuf::from(&names[0]);
        let new = PathBuf::from(&names[1]);
        driver.fold(move_rename(cfg, &old, &new))?;
        return Ok(driver.failed);
    }

    Err(MoveError::Usage(
        "no --dest given: a rename takes exactly two names; to move a single name away use --backup --append".into(),
    )
    .into())
}

/// Per-batch failure accumulation. Default policy aborts on the first
/// failure; --ignore records it and carries on.
struct Driver<'a> {
    cfg: &'a Config,
    failed: bool,
}

impl<'a> Driver<'a> {
    fn new(cfg: &'a Config) -> Self {
        Self { cfg, failed: false }
    }

    /// Apply `op` to a name, expanding `-` into the stdin name stream.
    fn each<F>(&mut self, name: &OsStr, op: F) -> Result<(), MoveError>
    where
        F: Fn(&Config, &Path) -> Result<(), MoveError>,
    {
        if name != OsStr::new("-") {
            return self.fold(op(self.cfg, Path::new(name)));
        }

        let delim = stdin_delimiter(self.cfg)?;
        let stdin = io::stdin();
        for chunk in stdin.lock().split(delim) {
            let Ok(chunk) = chunk else {
                debug!("stdin name stream ended on a read error");
                break;
            };
            if chunk.is_empty() {
                continue;
            }
            let streamed = OsString::from_vec(chunk);
            self.fold(op(self.cfg, Path::new(&streamed)))?;
        }
        Ok(())
    }

    fn fold(&mut self, res: Result<(), MoveError>) -> Result<(), MoveError> {
        match res {
            Ok(()) => Ok(()),
            Err(e) => {
                self.failed = true;
                debug!(error = %e, "request failed");
                if !self.cfg.quiet {
                    out::print_error(&e.to_string());
                }
                if self.cfg.ignore_errors { Ok(()) } else { Err(e) }
            }
        }
    }
}

fn stdin_delimiter(cfg: &Config) -> Result<u8, MoveError> {
    if cfg.nulls {
        Ok(0)
    } else if cfg.lines {
        Ok(b'\n')
    } else {
        Err(MoveError::Usage(
            "missing --lines or --null to read names from stdin".into(),
        ))
    }
}

/// Unless `-pp`, a missing or non-directory --dest is rejected before any
/// rename is attempted. Re-checked per request: the directory can vanish
/// between moves.
fn preflight_dest_dir(cfg: &Config, dest: &Path) -> Result<(), MoveError> {
    if cfg.create_parents == CreateParents::ForDestDir {
        return Ok(());
    }
    match probe(dest) {
        ExistenceState::Directory => Ok(()),
        ExistenceState::Missing => Err(MoveError::MissingDestDir(dest.to_path_buf())),
        _ => Err(MoveError::DestNotDirectory(dest.to_path_buf())),
    }
}

/// mv-style directory target: the final component is empty (trailing `/`),
/// `.` or `..`, and the path names an existing directory.
fn is_directory_target(p: &Path) -> bool {
    let b = p.as_os_str().as_bytes();
    let dir_shaped = b.ends_with(b"/")
        || b == b"."
        || b == b".."
        || b.ends_with(b"/.")
        || b.ends_with(b"/..");
    dir_shaped && probe(p).is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn directory_target_needs_dir_shape_and_existence() {
        let td = tempdir().unwrap();
        let dir = td.path().join("d");
        fs::create_dir(&dir).unwrap();

        let mut shaped = dir.clone().into_os_string();
        shaped.push("/");
        assert!(is_directory_target(Path::new(&shaped)));
        assert!(is_directory_target(Path::new(".")));
        // A bare directory name without the mv-style shape is not promoted.
        assert!(!is_directory_target(&dir));
        // Shape alone is not enough either.
        let mut missing = td.path().join("gone").into_os_string();
        missing.push("/");
        assert!(!is_directory_target(Path::new(&missing)));
    }

    #[test]
    fn stdin_needs_a_delimiter_flag() {
        let err = stdin_delimiter(&Config::default()).unwrap_err();
        assert!(err.is_usage());
        let cfg = Config {
            lines: true,
            ..Default::default()
        };
        assert_eq!(stdin_delimiter(&cfg).unwrap(), b'\n');
        let cfg = Config {
            nulls: true,
            ..Default::default()
        };
        assert_eq!(stdin_delimiter(&cfg).unwrap(), 0);
    }

    #[test]
    fn preflight_rejects_missing_and_non_directory() {
        let td = tempdir().unwrap();
        let cfg = Config::default();

        let err = preflight_dest_dir(&cfg, &td.path().join("gone")).unwrap_err();
        assert!(matches!(err, MoveError::MissingDestDir(_)));

        let file = td.path().join("f");
        fs::write(&file, b"x").unwrap();
        let err = preflight_dest_dir(&cfg, &file).unwrap_err();
        assert!(matches!(err, MoveError::DestNotDirectory(_)));

        assert!(preflight_dest_dir(&cfg, td.path()).is_ok());

        // -pp defers to parent creation in the resolver.
        let pp = Config {
            create_parents: CreateParents::ForDestDir,
            ..Default::default()
        };
        assert!(preflight_dest_dir(&pp, &td.path().join("gone")).is_ok());
    }
}
