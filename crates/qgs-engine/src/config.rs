//! Engine configuration
//!
//! Loaded from a TOML file. Every section and key is optional; a missing
//! file yields the defaults.
//!
//! ```toml
//! log_profile = "production"
//!
//! [tool]
//! armature_name = "Rig"
//! bone_length = 0.5
//!
//! [updater]
//! version_url = "https://example.com/qgs/version.txt"
//! ```

use std::path::{Path, PathBuf};

use qgs_core::logging_facility::Profile;
use qgs_core::ToolConfig;
use serde::{Deserialize, Serialize};

use crate::errors::{io_error, parse_error, Result};

pub const DEFAULT_VERSION_URL: &str =
    "https://raw.githubusercontent.com/ItsALiving/Test/main/version.txt";
pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/ItsALiving/Test/main/__init__.py";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub log_profile: Profile,
    pub tool: ToolConfig,
    pub updater: UpdaterConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// Plain-text file holding the published version, e.g. `0.9.0`
    pub version_url: String,
    /// File fetched and installed when the published version is newer
    pub source_url: String,
    /// Where the fetched file is written; unset disables installing
    pub install_path: Option<PathBuf>,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            version_url: DEFAULT_VERSION_URL.to_string(),
            source_url: DEFAULT_SOURCE_URL.to_string(),
            install_path: None,
        }
    }
}

impl EngineConfig {
    /// Load from `path`, falling back to defaults when the file does not exist
    ///
    /// # Errors
    ///
    /// `ERR_IO` for unreadable files, `ERR_SERIALIZATION` for invalid TOML.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file absent, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| io_error("load_config", path, e))?;
        Self::from_toml(&text).map_err(|e| parse_error("load_config", path, e.message()))
    }

    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Render as TOML, e.g. to write a starter config
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
