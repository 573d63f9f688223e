//! Init command
//!
//! Usage: qgs init [--force] [--write-config]

use clap::Args;
use qgs_core::Session;
use qgs_engine::EngineConfig;

use super::{load_config, save, CliResult, SessionArgs};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing session file
    #[arg(long)]
    pub force: bool,

    /// Also write a config file with every default spelled out
    #[arg(long)]
    pub write_config: bool,
}

pub fn execute(args: InitArgs, session_args: &SessionArgs) -> CliResult {
    load_config(session_args)?;
    if session_args.scene.exists() && !args.force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            session_args.scene.display()
        )
        .into());
    }
    save(&Session::default(), session_args)?;
    println!("✓ Created {}", session_args.scene.display());

    if args.write_config {
        std::fs::write(&session_args.config, EngineConfig::default().to_toml()?)?;
        println!("✓ Wrote {}", session_args.config.display());
    }
    Ok(())
}
