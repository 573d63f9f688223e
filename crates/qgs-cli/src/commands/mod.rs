//! Subcommand implementations
//!
//! Every subcommand loads the session file, acts on it, and writes it back.

pub mod init;
pub mod inspect;
pub mod operator;
pub mod selection;
pub mod update;

use std::path::PathBuf;

use clap::Args;
use qgs_core::logging_facility;
use qgs_core::Session;
use qgs_engine::commands::session_file;
use qgs_engine::EngineConfig;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session file holding the scene and bone history
    #[arg(long, global = true, default_value = "qgs-scene.json")]
    pub scene: PathBuf,

    /// Engine configuration (TOML); defaults apply when absent
    #[arg(long, global = true, default_value = "qgs.toml")]
    pub config: PathBuf,
}

/// Load the configuration and start logging
pub fn load_config(args: &SessionArgs) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let config = EngineConfig::load(&args.config)?;
    logging_facility::init(config.log_profile);
    Ok(config)
}

/// Load the configuration and the session it applies to
pub fn open(args: &SessionArgs) -> Result<(Session, EngineConfig), Box<dyn std::error::Error>> {
    let config = load_config(args)?;
    let session = session_file::load(&args.scene, &config.tool)?;
    Ok((session, config))
}

pub fn save(session: &Session, args: &SessionArgs) -> CliResult {
    session_file::save(session, &args.scene)?;
    Ok(())
}
