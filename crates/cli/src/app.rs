use std::path::PathBuf;

use clap::Parser;

/// Process-level arguments: the root to open and an optional preferences
/// file, mirroring the teacher's `Args`/`RunCmd` split but collapsed into
/// one struct since this front end has no subcommands.
#[derive(Parser, Debug)]
#[command(name = "browse", about = "Headless archive-virtualization browser")]
pub struct Args {
    /// Root to open: a directory or an archive file (zip/tar/tar.gz/...).
    pub root: String,

    /// Optional BrowseConfig TOML file; a missing/malformed file falls back
    /// to defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,
}
