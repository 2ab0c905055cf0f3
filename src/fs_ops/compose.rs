//! Destination and source path composition. Pure path arithmetic; the only
//! filesystem writes in this area (parent creation) live in the resolver.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Strip a leading root, yielding a path that can be re-anchored elsewhere.
pub fn skip_root(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect()
}

/// `-r` rename mode: the new name is taken relative to the old name's
/// directory, so `atomv -r /path/to/a b` renames inside `/path/to`.
pub fn relative_destination(old: &Path, dest: &Path) -> PathBuf {
    let dir = old.parent().unwrap_or_else(|| Path::new(""));
    dir.join(skip_root(dest))
}

/// `-s` literal prefix: byte concatenation, not a directory join; input
/// names may be relative to a different working context than ours.
pub fn prefixed_source(prefix: Option<&str>, name: &Path) -> PathBuf {
    match prefix {
        None => name.to_path_buf(),
        Some(p) => {
            let mut joined = OsString::from(p);
            joined.push(name.as_os_str());
            PathBuf::from(joined)
        }
    }
}

/// The name a source takes inside `--dest`: its bare filename, or in
/// relative mode its root-stripped path so the source tree is reproduced.
/// Returns None for names with no final component (`.`, `..`, `/`).
pub fn dest_target(relative: bool, name: &Path) -> Option<PathBuf> {
    if relative {
        let stripped = skip_root(name);
        if stripped.as_os_str().is_empty() {
            None
        } else {
            Some(stripped)
        }
    } else {
        name.file_name().map(PathBuf::from)
    }
}
