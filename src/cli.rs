//! CLI definition and parsing.
//! Defines Args and the Config derivation. Argument *shape* (rename vs
//! move-into-directory vs move-away) is resolved later in `app::run`,
//! because `--original` needs to consult filesystem state.

use clap::{ArgAction, Parser, ValueHint};
use std::ffi::OsString;
use std::path::PathBuf;

use atomv::config::{Config, CreateParents, Whiteout};

/// Atomic file mover: a reader never sees the destination missing, and an
/// existing destination is backed up or the move is refused, never clobbered.
#[derive(Parser, Debug, Clone)]
#[command(
    version,
    about = "Move files atomically; never clobber an existing destination",
    after_help = "If NAME is `-`, further names are read from stdin (needs -l or -0).\n\
                  rename:     atomv [-r] OLDNAME NEWNAME\n\
                  move:       atomv -d DIR NAME...\n\
                  move away:  atomv -ab NAME\n\
                  convenience: alias mv='atomv -o'\n\
                  Atomicity holds within one filesystem only."
)]
pub struct Args {
    /// Read NUL-terminated names from stdin when NAME is `-`.
    /// Example: find . -type f -print0 | atomv -0ab -
    #[arg(short = '0', long = "null")]
    pub nulls: bool,

    /// Append the backup suffix to the *source* when the destination exists.
    /// Has fewer race windows than --backup; combine both to move a file away.
    #[arg(short = 'a', long = "append")]
    pub append: bool,

    /// Back up an existing destination to its `.~#~` name first.
    /// On errors this can leave the destination under its backup name.
    #[arg(short = 'b', long = "backup")]
    pub backup: bool,

    /// Create backups in DIR: an existing destination moves there,
    /// renamed further according to --append/--backup.
    #[arg(short = 'c', long = "backup-dir", value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub backup_dir: Option<PathBuf>,

    /// Destination directory to move names into.
    #[arg(short = 'd', long = "dest", value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub dest: Option<PathBuf>,

    /// Enforce the no-clobber primitive: fail on filesystems without it
    /// instead of falling back to a checked plain rename (the fallback
    /// carries a small unavoidable race window).
    #[arg(short = 'e', long = "enforce")]
    pub enforce: bool,

    /// Record failures but keep processing the remaining names; the exit
    /// status still reports them.
    #[arg(short = 'i', long = "ignore")]
    pub ignore: bool,

    /// Read newline-terminated names from stdin when NAME is `-`.
    /// Example: find . -print | atomv -lb -
    #[arg(short = 'l', long = "lines")]
    pub lines: bool,

    /// Treat a final argument naming an existing directory (trailing `/`,
    /// `.` or `..`) as the destination, like plain mv.
    #[arg(short = 'o', long = "original")]
    pub original: bool,

    /// Create missing parent directories for composed destinations; give
    /// twice to also create a missing --dest directory.
    #[arg(short = 'p', long = "parents", action = ArgAction::Count)]
    pub parents: u8,

    /// Suppress diagnostics; failures only show in the exit status.
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Compose the destination relative to the source path. Renaming inside
    /// a directory without moving: atomv -r /path/to/file/a b
    #[arg(short = 'r', long = "relative")]
    pub relative: bool,

    /// Literal prefix prepended to every source name (not a directory join).
    /// Example: ( cd spool; ls -1; ) | atomv -l -s spool/ -d done -
    #[arg(short = 's', long = "source-prefix", value_name = "PREFIX")]
    pub source_prefix: Option<String>,

    /// Print a line per successful rename and parent creation.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Leave a whiteout entry at the source (union filesystems);
    /// implies --enforce.
    #[arg(short = 'w', long = "whiteout", conflicts_with = "no_whiteout")]
    pub whiteout: bool,

    /// Explicitly disable whiteout.
    #[arg(long = "no-whiteout")]
    pub no_whiteout: bool,

    /// Emit log events on stderr as JSON.
    #[arg(long = "log-json")]
    pub log_json: bool,

    /// Names to relocate: exactly two for a rename, one or more with --dest,
    /// a single name for move-away mode.
    #[arg(value_name = "NAME", required = true, value_hint = ValueHint::AnyPath)]
    pub names: Vec<OsString>,
}

impl Args {
    /// Fold the parsed flags into the process-wide policy value.
    pub fn to_config(&self) -> Config {
        Config {
            backup: self.backup,
            append: self.append,
            backup_dir: self.backup_dir.clone(),
            dest: self.dest.clone(),
            create_parents: CreateParents::from_count(self.parents),
            enforce_atomic: self.enforce,
            whiteout: if self.whiteout {
                Whiteout::On
            } else if self.no_whiteout {
                Whiteout::Off
            } else {
                Whiteout::Unset
            },
            relative: self.relative,
            source_prefix: self.source_prefix.clone(),
            nulls: self.nulls,
            lines: self.lines,
            ignore_errors: self.ignore,
            quiet: self.quiet,
            verbose: self.verbose,
            original_mv: self.original,
            log_json: self.log_json,
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
