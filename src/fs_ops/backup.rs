//! Backup name generation.
//! A displaced file is preserved under `<name>.~#~`; when that is taken the
//! numeric series `<name>.~1~`, `<name>.~2~`, … is probed until a free name
//! turns up. Every candidate is probed at generation time; a stale answer
//! here would reopen exactly the race the atomic layer closes.

use std::path::{Path, PathBuf};

use super::probe;

/// Fixed marker tried before the numeric series kicks in.
const BACKUP_MARKER: &str = ".~#~";

fn with_appended(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Produce a currently-free path derived from `path`.
pub fn backup_name(path: &Path) -> PathBuf {
    let fixed = with_appended(path, BACKUP_MARKER);
    if probe::probe(&fixed).is_missing() {
        return fixed;
    }
    let mut n: u32 = 1;
    loop {
        let candidate = with_appended(path, &format!(".~{n}~"));
        if probe::probe(&candidate).is_missing() {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn fixed_marker_comes_first() {
        let td = tempdir().unwrap();
        let target = td.path().join("data.txt");
        fs::write(&target, b"x").unwrap();

        let name = backup_name(&target);
        assert_eq!(name, td.path().join("data.txt.~#~"));
        assert!(!name.exists());
    }

    #[test]
    fn collisions_walk_the_numeric_series() {
        let td = tempdir().unwrap();
        let target = td.path().join("data");
        fs::write(&target, b"x").unwrap();

        // Occupy each generated name in turn; the next call must skip it.
        let first = backup_name(&target);
        fs::write(&first, b"1").unwrap();
        let second = backup_name(&target);
        fs::write(&second, b"2").unwrap();
        let third = backup_name(&target);

        assert_eq!(first, td.path().join("data.~#~"));
        assert_eq!(second, td.path().join("data.~1~"));
        assert_eq!(third, td.path().join("data.~2~"));
    }

    #[test]
    fn extension_is_appended_not_replaced() {
        let td = tempdir().unwrap();
        let target = td.path().join("archive.tar.gz");
        let name = backup_name(&target);
        assert_eq!(name, td.path().join("archive.tar.gz.~#~"));
    }
}
