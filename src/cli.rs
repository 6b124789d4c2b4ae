//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ZenPad static site generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name, relative to the root (default: zenpad.toml)
    #[arg(short = 'C', long, default_value = "zenpad.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render every document into the build directory
    Build {
        /// Environment block to merge over `default`, e.g. `prod`
        #[arg(short, long)]
        env: Option<String>,
    },
}

impl Cli {
    /// Root directory with `~` expanded.
    pub fn root_dir(&self) -> PathBuf {
        match &self.root {
            Some(root) => {
                let root = root.to_string_lossy();
                PathBuf::from(shellexpand::tilde(&root).into_owned())
            }
            None => PathBuf::from("./"),
        }
    }
}
