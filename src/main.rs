//! ZenPad - a static site generator.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use zenpad::{Engine, build::build_site};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let root = cli.root_dir();

    let engine = Engine::builder(&root)
        .config_file(&cli.config)
        .build()
        .with_context(|| format!("failed to load site at `{}`", root.display()))?;

    match &cli.command {
        Commands::Build { env } => {
            build_site(&engine, env.as_deref()).context("build failed")?;
        }
    }
    Ok(())
}
