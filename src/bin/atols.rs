//! Directory-listing collaborator for atomv pipelines.
//! Plain readdir plus string filtering; no atomicity or conflict
//! semantics. Emits one name per line (NUL-terminated with -0), optionally
//! prefixed with the source directory, filtered on dotfiles and mode bits,
//! with optional recursive descent. Designed to feed `atomv -l`/`-0`.

use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use walkdir::WalkDir;

use atomv::output as out;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "List directory entries, filtered, for piping into atomv",
    after_help = "Example: atols -0 spool | atomv -0 -s spool/ -d done -"
)]
struct Args {
    /// Skip dotfile entries.
    #[arg(long = "skip-hidden")]
    skip_hidden: bool,

    /// Also emit the `.` and `..` entries (skipped by default).
    #[arg(long = "include-dot")]
    include_dot: bool,

    /// Terminate each name with NUL instead of newline.
    #[arg(short = '0', long = "null")]
    nulls: bool,

    /// Prefix each name with its source directory.
    #[arg(long = "prefix")]
    prefix: bool,

    /// Keep only entries with at least one of these mode bits set (octal).
    #[arg(long = "mode-any", value_name = "OCTAL", value_parser = parse_octal)]
    mode_any: Option<u32>,

    /// Drop entries with any of these mode bits set (octal).
    #[arg(long = "mode-none", value_name = "OCTAL", value_parser = parse_octal)]
    mode_none: Option<u32>,

    /// Descend into subdirectories.
    #[arg(short = 'R', long = "recursive")]
    recursive: bool,

    /// Directories to list.
    #[arg(value_name = "DIR", default_value = ".")]
    dirs: Vec<PathBuf>,
}

fn parse_octal(s: &str) -> Result<u32, String> {
    u32::from_str_radix(s, 8).map_err(|e| format!("invalid octal mode '{s}': {e}"))
}

/// One-slot stat cache: both mode filters ask about the same entry back to
/// back, so the last (path, mode) pair is kept and replaced on every new
/// path. An optimization only; freshness is not a concern while listing.
#[derive(Debug, Default)]
struct StatCache {
    last: Option<(PathBuf, Option<u32>)>,
}

impl StatCache {
    fn mode(&mut self, path: &Path) -> Option<u32> {
        if let Some((cached, mode)) = &self.last {
            if cached == path {
                return *mode;
            }
        }
        let mode = fs::symlink_metadata(path)
            .ok()
            .map(|m| m.permissions().mode());
        self.last = Some((path.to_path_buf(), mode));
        mode
    }
}

impl Args {
    /// Apply the dotfile and mode-bit filters to one directory entry.
    fn keep(&self, path: &Path, file_name: &std::ffi::OsStr, cache: &mut StatCache) -> bool {
        if self.skip_hidden && file_name.as_bytes().starts_with(b".") {
            return false;
        }
        if let Some(mask) = self.mode_any {
            match cache.mode(path) {
                Some(mode) if mode & mask != 0 => {}
                _ => return false,
            }
        }
        if let Some(mask) = self.mode_none {
            match cache.mode(path) {
                Some(mode) if mode & mask != 0 => return false,
                None => return false,
                _ => {}
            }
        }
        true
    }

    fn delimiter(&self) -> u8 {
        if self.nulls { 0 } else { b'\n' }
    }
}

/// Emit one name and flush, so downstream pipeline stages see entries as
/// they are produced.
fn emit(out_lock: &mut io::StdoutLock<'_>, name: &std::ffi::OsStr, delim: u8) -> io::Result<()> {
    out_lock.write_all(name.as_bytes())?;
    out_lock.write_all(&[delim])?;
    out_lock.flush()
}

fn list_dir(args: &Args, dir: &Path, cache: &mut StatCache, out_lock: &mut io::StdoutLock<'_>) -> bool {
    let delim = args.delimiter();

    if args.include_dot && !args.recursive {
        for dot in [".", ".."] {
            let shown: PathBuf = if args.prefix { dir.join(dot) } else { dot.into() };
            if emit(out_lock, shown.as_os_str(), delim).is_err() {
                return false;
            }
        }
    }

    if args.recursive {
        let mut ok = true;
        for entry in WalkDir::new(dir).min_depth(1) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    out::print_warn(&format!("cannot descend under {}: {}", dir.display(), e));
                    ok = false;
                    continue;
                }
            };
            if !args.keep(entry.path(), entry.file_name(), cache) {
                continue;
            }
            let shown: PathBuf = if args.prefix {
                entry.path().to_path_buf()
            } else {
                entry
                    .path()
                    .strip_prefix(dir)
                    .unwrap_or(entry.path())
                    .to_path_buf()
            };
            if emit(out_lock, shown.as_os_str(), delim).is_err() {
                return false;
            }
        }
        return ok;
    }

    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            out::print_error(&format!("cannot list directory {}: {}", dir.display(), e));
            return false;
        }
    };
    let mut ok = true;
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                out::print_error(&format!("error reading {}: {}", dir.display(), e));
                ok = false;
                continue;
            }
        };
        let name = entry.file_name();
        if !args.keep(&entry.path(), &name, cache) {
            continue;
        }
        let shown: PathBuf = if args.prefix { dir.join(&name) } else { name.into() };
        if emit(out_lock, shown.as_os_str(), delim).is_err() {
            return false;
        }
    }
    ok
}

fn main() -> ExitCode {
    let args = Args::parse();
    let mut cache = StatCache::default();
    let stdout = io::stdout();
    let mut out_lock = stdout.lock();

    let mut failed = false;
    for dir in &args.dirs {
        if !list_dir(&args, dir, &mut cache, &mut out_lock) {
            failed = true;
        }
    }
    ExitCode::from(if failed { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use tempfile::tempdir;

    #[test]
    fn octal_parsing() {
        assert_eq!(parse_octal("755").unwrap(), 0o755);
        assert_eq!(parse_octal("0").unwrap(), 0);
        assert!(parse_octal("9").is_err());
        assert!(parse_octal("rwx").is_err());
    }

    #[test]
    fn stat_cache_replaces_on_new_path() {
        let td = tempdir().unwrap();
        let a = td.path().join("a");
        let b = td.path().join("b");
        fs::write(&a, b"x").unwrap();
        fs::write(&b, b"y").unwrap();

        let mut cache = StatCache::default();
        let first = cache.mode(&a).unwrap();
        // Same path: answered from the slot.
        assert_eq!(cache.mode(&a).unwrap(), first);
        // New path replaces the slot.
        cache.mode(&b).unwrap();
        let (cached, _) = cache.last.as_ref().unwrap();
        assert_eq!(cached, &b);
        // Missing paths are cached as None too.
        assert!(cache.mode(&td.path().join("gone")).is_none());
    }

    #[test]
    fn hidden_filter_applies_to_file_name() {
        let td = tempdir().unwrap();
        let hidden = td.path().join(".secret");
        fs::write(&hidden, b"x").unwrap();

        let args = Args::parse_from(["atols", "--skip-hidden"]);
        let mut cache = StatCache::default();
        assert!(!args.keep(&hidden, OsStr::new(".secret"), &mut cache));
        assert!(args.keep(&hidden, OsStr::new("visible"), &mut cache));
    }

    #[cfg(unix)]
    #[test]
    fn mode_filters_consult_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let td = tempdir().unwrap();
        let exec = td.path().join("runme");
        fs::write(&exec, b"#!/bin/sh\n").unwrap();
        fs::set_permissions(&exec, fs::Permissions::from_mode(0o755)).unwrap();
        let plain = td.path().join("data");
        fs::write(&plain, b"x").unwrap();
        fs::set_permissions(&plain, fs::Permissions::from_mode(0o644)).unwrap();

        let args = Args::parse_from(["atols", "--mode-any", "111"]);
        let mut cache = StatCache::default();
        assert!(args.keep(&exec, OsStr::new("runme"), &mut cache));
        assert!(!args.keep(&plain, OsStr::new("data"), &mut cache));

        let args = Args::parse_from(["atols", "--mode-none", "111"]);
        assert!(!args.keep(&exec, OsStr::new("runme"), &mut cache));
        assert!(args.keep(&plain, OsStr::new("data"), &mut cache));
    }
}
