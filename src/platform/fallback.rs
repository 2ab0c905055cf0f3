//! Unix targets without a no-replace rename syscall. Every flagged call
//! reports EINVAL so the capability layer records Unsupported and the
//! resolver takes its probe-then-rename fallback.

use std::fs;
use std::io;
use std::path::Path;

pub fn renameat2(src: &Path, dst: &Path, flags: u32) -> io::Result<()> {
    if flags == 0 {
        return fs::rename(src, dst);
    }
    Err(io::Error::from_raw_os_error(libc::EINVAL))
}
