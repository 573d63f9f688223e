//! Self-update
//!
//! Compares the published version against the running one and, when the
//! published one is newer, overwrites the installed file with the published
//! source. There is no signature check and no rollback.

use std::fmt;
use std::str::FromStr;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use qgs_core::errors::{ExError, ExErrorKind};
use qgs_core::{log_op_end, log_op_error, log_op_start, OperatorReport, ReportStatus, Severity};

use crate::config::UpdaterConfig;
use crate::errors::{io_error, Result};

/// Dot-separated integer version, ordered component by component
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version(Vec<u32>);

impl Version {
    /// The version of this build
    pub fn current() -> Self {
        Self::from_str(env!("CARGO_PKG_VERSION")).unwrap_or(Version(vec![0, 0, 0]))
    }

    pub fn parts(&self) -> &[u32] {
        &self.0
    }
}

impl FromStr for Version {
    type Err = ExError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .split('.')
            .map(|part| part.parse::<u32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Version)
            .map_err(|e| {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_op("parse_version")
                    .with_entity_id(s.trim())
                    .with_message(e.to_string())
            })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Source of remote bytes
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Blocking HTTP fetcher
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let external = |e: reqwest::Error| {
            ExError::new(ExErrorKind::ExternalService)
                .with_op("fetch")
                .with_entity_id(url)
                .with_message(e.to_string())
        };
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(external)?;
        Ok(response.bytes().map_err(external)?.to_vec())
    }
}

/// Append a `t=<unix seconds>` query parameter so caches are bypassed
pub fn cache_busted(url: &str, unix_secs: u64) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{}{}t={}", url, sep, unix_secs)
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Fetch and parse the published version
///
/// # Errors
///
/// `ERR_EXTERNAL_SERVICE` when the fetch fails, `ERR_INVALID_INPUT` when the
/// body is not a dotted integer version.
pub fn remote_version(fetcher: &dyn Fetch, config: &UpdaterConfig) -> Result<Version> {
    let body = fetcher.fetch(&cache_busted(&config.version_url, now_secs()))?;
    String::from_utf8_lossy(&body).parse()
}

/// The published version, if it is newer than `current`
///
/// # Errors
///
/// See [`remote_version`].
pub fn check_for_update(
    fetcher: &dyn Fetch,
    config: &UpdaterConfig,
    current: &Version,
) -> Result<Option<Version>> {
    let remote = remote_version(fetcher, config)?;
    tracing::debug!(%remote, %current, "checked published version");
    Ok((remote > *current).then_some(remote))
}

/// Fetch the published source and overwrite the installed file
///
/// # Errors
///
/// `ERR_INVALID_INPUT` without an install path, otherwise fetch and write
/// failures.
pub fn install(fetcher: &dyn Fetch, config: &UpdaterConfig) -> Result<()> {
    let path = config.install_path.as_deref().ok_or_else(|| {
        ExError::new(ExErrorKind::InvalidInput)
            .with_op("install_update")
            .with_message("no install path configured")
    })?;
    let bytes = fetcher.fetch(&cache_busted(&config.source_url, now_secs()))?;
    std::fs::write(path, &bytes).map_err(|e| io_error("install_update", path, e))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "installed update");
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(Version),
    UpToDate,
    Failed(String),
}

impl UpdateOutcome {
    pub fn message(&self) -> String {
        match self {
            UpdateOutcome::Updated(version) => {
                format!("Updated to version {}. Restart to load it.", version)
            }
            UpdateOutcome::UpToDate => "Already up to date.".to_string(),
            UpdateOutcome::Failed(reason) => format!("Update failed: {}", reason),
        }
    }

    /// Report in operator form; failures still finish, with Error severity
    pub fn to_report(&self) -> OperatorReport {
        let severity = match self {
            UpdateOutcome::Failed(_) => Severity::Error,
            _ => Severity::Info,
        };
        OperatorReport {
            message: self.message(),
            severity,
            status: ReportStatus::Finished,
        }
    }
}

/// Check and install in one step
pub fn run_update(fetcher: &dyn Fetch, config: &UpdaterConfig, current: &Version) -> UpdateOutcome {
    let start = Instant::now();
    log_op_start!("self_update", current = %current);

    let result = check_for_update(fetcher, config, current).and_then(|newer| match newer {
        Some(version) => install(fetcher, config).map(|()| UpdateOutcome::Updated(version)),
        None => Ok(UpdateOutcome::UpToDate),
    });

    let duration_ms = start.elapsed().as_millis() as u64;
    match result {
        Ok(outcome) => {
            log_op_end!("self_update", duration_ms = duration_ms);
            outcome
        }
        Err(err) => {
            let reason = err.to_string();
            log_op_error!("self_update", err, duration_ms = duration_ms);
            UpdateOutcome::Failed(reason)
        }
    }
}
