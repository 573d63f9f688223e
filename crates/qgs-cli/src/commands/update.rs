//! Update command
//!
//! Usage: qgs update

use qgs_engine::commands::update::{run_update, HttpFetcher, Version};

use super::{load_config, CliResult, SessionArgs};

pub fn execute(session_args: &SessionArgs) -> CliResult {
    let config = load_config(session_args)?;

    let outcome = run_update(&HttpFetcher::new(), &config.updater, &Version::current());
    let report = outcome.to_report();
    if report.severity == qgs_core::Severity::Error {
        return Err(report.to_string().into());
    }
    println!("{}", report);
    Ok(())
}
