//! Raw renameat2 mode selector.
//! Thin cover over the exchange/whiteout rename primitives: pick exactly
//! one mode and apply it to SRC DEST. Exit codes: 0 ok, 1 failed, 2 the
//! filesystem does not support the requested mode.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use std::process::ExitCode;

use atomv::fs_ops::{rename_exchange, ExchangeMode};
use atomv::output as out;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Apply one renameat2 mode to a pair of paths",
    group(ArgGroup::new("mode").required(true))
)]
struct Args {
    /// Unconditionally replace the destination (plain rename).
    #[arg(short = 'f', long = "force", group = "mode")]
    force: bool,

    /// Fail instead of replacing an existing destination (RENAME_NOREPLACE).
    #[arg(short = 'n', long = "noreplace", group = "mode")]
    noreplace: bool,

    /// Replace and leave a whiteout entry at the source, for union
    /// filesystems (RENAME_WHITEOUT).
    #[arg(short = 'r', long = "whiteout", group = "mode")]
    whiteout: bool,

    /// RENAME_NOREPLACE combined with RENAME_WHITEOUT.
    #[arg(short = 'w', long = "noreplace-whiteout", group = "mode")]
    noreplace_whiteout: bool,

    /// Atomically exchange source and destination (RENAME_EXCHANGE).
    #[arg(short = 'x', long = "exchange", group = "mode")]
    exchange: bool,

    #[arg(value_name = "SRC")]
    src: PathBuf,

    #[arg(value_name = "DEST")]
    dest: PathBuf,
}

impl Args {
    fn mode(&self) -> ExchangeMode {
        if self.force {
            ExchangeMode::Force
        } else if self.noreplace {
            ExchangeMode::NoReplace
        } else if self.whiteout {
            ExchangeMode::Whiteout
        } else if self.noreplace_whiteout {
            ExchangeMode::NoReplaceWhiteout
        } else {
            ExchangeMode::Exchange
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let mode = args.mode();
    match rename_exchange(&args.src, &args.dest, mode) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            out::print_error(&format!(
                "failed: renameat2 {} {} {}: {}",
                args.src.display(),
                args.dest.display(),
                mode.as_str(),
                e
            ));
            let unsupported = matches!(
                e.raw_os_error(),
                Some(code) if code == libc::EINVAL || code == libc::ENOSYS
            );
            ExitCode::from(if unsupported { 2 } else { 1 })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_mode_is_required() {
        assert!(Args::try_parse_from(["atomx", "a", "b"]).is_err());
        assert!(Args::try_parse_from(["atomx", "-n", "-x", "a", "b"]).is_err());
        let args = Args::parse_from(["atomx", "-x", "a", "b"]);
        assert_eq!(args.mode(), ExchangeMode::Exchange);
    }

    #[test]
    fn mode_mapping_matches_flags() {
        assert_eq!(
            Args::parse_from(["atomx", "-f", "a", "b"]).mode(),
            ExchangeMode::Force
        );
        assert_eq!(
            Args::parse_from(["atomx", "-w", "a", "b"]).mode(),
            ExchangeMode::NoReplaceWhiteout
        );
        assert_eq!(
            Args::parse_from(["atomx", "-r", "a", "b"]).mode(),
            ExchangeMode::Whiteout
        );
    }
}
