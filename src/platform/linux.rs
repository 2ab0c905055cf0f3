//! Linux renameat2(2) via a raw syscall, so both gnu and musl libc work.

use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

fn cpath(p: &Path) -> io::Result<CString> {
    CString::new(p.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains null byte"))
}

/// Atomic rename with RENAME_NOREPLACE / RENAME_EXCHANGE / RENAME_WHITEOUT
/// flag bits. Errors come back untranslated; the capability layer interprets
/// EINVAL/ENOSYS.
pub fn renameat2(src: &Path, dst: &Path, flags: u32) -> io::Result<()> {
    let src_c = cpath(src)?;
    let dst_c = cpath(dst)?;
    let rc = unsafe {
        libc::syscall(
            libc::SYS_renameat2,
            libc::AT_FDCWD,
            src_c.as_ptr(),
            libc::AT_FDCWD,
            dst_c.as_ptr(),
            flags as libc::c_uint,
        )
    };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}
