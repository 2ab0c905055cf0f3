//! User-facing stdout/stderr printing.
//! Diagnostics carry a colored prefix when the stream is a TTY; primary
//! output lines (rename traces) stay plain so scripts can consume them.

use owo_colors::OwoColorize;

fn stderr_is_tty() -> bool {
    atty::is(atty::Stream::Stderr)
}

/// One diagnostic line per failure, on stderr.
pub fn print_error(msg: &str) {
    if stderr_is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

/// Non-fatal notice on stderr.
pub fn print_warn(msg: &str) {
    if stderr_is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {}", msg);
    }
}

/// Plain line on stdout for primary output such as `rename: a -> b`.
pub fn print_user(msg: &str) {
    println!("{}", msg);
}
