use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn atomv() -> std::path::PathBuf {
    assert_cmd::cargo::cargo_bin!("atomv").to_path_buf()
}

#[test]
fn moves_several_names_into_the_destination() {
    let td = tempdir().unwrap();
    let dest = td.path().join("done");
    fs::create_dir(&dest).unwrap();
    let x = td.path().join("x");
    let y = td.path().join("y");
    fs::write(&x, b"one").unwrap();
    fs::write(&y, b"two").unwrap();

    let out = Command::new(atomv())
        .arg("-d")
        .arg(&dest)
        .arg(&x)
        .arg(&y)
        .output()
        .expect("spawn binary");

    assert!(out.status.success(), "{:?}", out);
    assert_eq!(fs::read(dest.join("x")).unwrap(), b"one");
    assert_eq!(fs::read(dest.join("y")).unwrap(), b"two");
    assert!(!x.exists());
    assert!(!y.exists());
}

#[test]
fn missing_destination_directory_is_diagnosed() {
    let td = tempdir().unwrap();
    let a = td.path().join("a");
    fs::write(&a, b"data").unwrap();
    let dest = td.path().join("nowhere");

    let out = Command::new(atomv())
        .arg("-d")
        .arg(&dest)
        .arg(&a)
        .output()
        .expect("spawn binary");

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("missing destination directory"),
        "stderr: {stderr}"
    );
    assert!(a.exists(), "source must be untouched on failure");
}

#[test]
fn double_parents_flag_creates_the_destination_directory() {
    let td = tempdir().unwrap();
    let a = td.path().join("a");
    fs::write(&a, b"data").unwrap();
    let dest = td.path().join("made/on/demand");

    let out = Command::new(atomv())
        .arg("-pp")
        .arg("-d")
        .arg(&dest)
        .arg(&a)
        .output()
        .expect("spawn binary");

    assert!(out.status.success(), "{:?}", out);
    assert_eq!(fs::read(dest.join("a")).unwrap(), b"data");
}

#[test]
fn non_directory_destination_is_diagnosed() {
    let td = tempdir().unwrap();
    let a = td.path().join("a");
    fs::write(&a, b"data").unwrap();
    let dest = td.path().join("file");
    fs::write(&dest, b"occupied").unwrap();

    let out = Command::new(atomv())
        .arg("-d")
        .arg(&dest)
        .arg(&a)
        .output()
        .expect("spawn binary");

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("not a directory"), "stderr: {stderr}");
}

#[test]
fn relative_mode_reproduces_the_source_tree() {
    let td = tempdir().unwrap();
    let dest = td.path().join("mirror");
    fs::create_dir(&dest).unwrap();
    let deep = td.path().join("spool/inner");
    fs::create_dir_all(&deep).unwrap();
    fs::write(deep.join("f"), b"data").unwrap();

    let out = Command::new(atomv())
        .current_dir(td.path())
        .args(["-r", "-d", "mirror", "spool/inner/f"])
        .output()
        .expect("spawn binary");

    assert!(out.status.success(), "{:?}", out);
    assert_eq!(fs::read(dest.join("spool/inner/f")).unwrap(), b"data");
    assert!(!deep.join("f").exists());
}

#[test]
fn source_prefix_is_a_literal_prefix() {
    let td = tempdir().unwrap();
    let spool = td.path().join("spool");
    fs::create_dir(&spool).unwrap();
    fs::write(spool.join("x"), b"data").unwrap();
    let dest = td.path().join("done");
    fs::create_dir(&dest).unwrap();

    let out = Command::new(atomv())
        .current_dir(td.path())
        .args(["-s", "spool/", "-d", "done", "x"])
        .output()
        .expect("spawn binary");

    assert!(out.status.success(), "{:?}", out);
    assert_eq!(fs::read(dest.join("x")).unwrap(), b"data");
    assert!(!spool.join("x").exists());
}

#[test]
fn original_flag_promotes_a_trailing_directory() {
    let td = tempdir().unwrap();
    let dest = td.path().join("dir");
    fs::create_dir(&dest).unwrap();
    let a = td.path().join("a");
    fs::write(&a, b"data").unwrap();

    let mut slashed = dest.clone().into_os_string();
    slashed.push("/");

    let out = Command::new(atomv())
        .arg("-o")
        .arg(&a)
        .arg(&slashed)
        .output()
        .expect("spawn binary");

    assert!(out.status.success(), "{:?}", out);
    assert_eq!(fs::read(dest.join("a")).unwrap(), b"data");
}
