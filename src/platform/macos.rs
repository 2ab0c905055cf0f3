//! macOS renamex_np(2): RENAME_EXCL covers no-replace, RENAME_SWAP covers
//! exchange. Whiteout has no Darwin equivalent and reports EINVAL, the same
//! signature an unsupported filesystem produces on Linux.

use std::ffi::CString;
use std::fs;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use super::{RENAME_EXCHANGE, RENAME_NOREPLACE, RENAME_WHITEOUT};

const RENAMEX_SWAP: libc::c_uint = 0x0000_0002;
const RENAMEX_EXCL: libc::c_uint = 0x0000_0004;

fn cpath(p: &Path) -> io::Result<CString> {
    CString::new(p.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains null byte"))
}

pub fn renameat2(src: &Path, dst: &Path, flags: u32) -> io::Result<()> {
    if flags & RENAME_WHITEOUT != 0 {
        return Err(io::Error::from_raw_os_error(libc::EINVAL));
    }
    let mut nx: libc::c_uint = 0;
    if flags & RENAME_NOREPLACE != 0 {
        nx |= RENAMEX_EXCL;
    }
    if flags & RENAME_EXCHANGE != 0 {
        nx |= RENAMEX_SWAP;
    }
    if nx == 0 {
        return fs::rename(src, dst);
    }
    let src_c = cpath(src)?;
    let dst_c = cpath(dst)?;
    let rc = unsafe { libc::renamex_np(src_c.as_ptr(), dst_c.as_ptr(), nx) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}
