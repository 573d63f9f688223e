//! Session file persistence
//!
//! A session file is the pretty-printed JSON form of a `Session`: the scene
//! and the bone parent history. Tool configuration is not stored; it is
//! attached on load.

use std::path::Path;

use qgs_core::{Session, ToolConfig};

use crate::errors::{io_error, parse_error, Result};

/// Read a session file and attach `config`
///
/// # Errors
///
/// `ERR_IO` when the file cannot be read, `ERR_SERIALIZATION` when it is not
/// a valid session.
pub fn load(path: &Path, config: &ToolConfig) -> Result<Session> {
    let text = std::fs::read_to_string(path).map_err(|e| io_error("load_session", path, e))?;
    let session: Session =
        serde_json::from_str(&text).map_err(|e| parse_error("load_session", path, e.to_string()))?;
    tracing::debug!(
        path = %path.display(),
        objects = session.scene.object_names().len(),
        "loaded session"
    );
    Ok(session.with_config(config.clone()))
}

/// Write a session file, creating parent directories as needed
///
/// # Errors
///
/// `ERR_IO` when the file or its directory cannot be written.
pub fn save(session: &Session, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_error("save_session", parent, e))?;
    }
    let json = serde_json::to_string_pretty(session)
        .map_err(|e| parse_error("save_session", path, e.to_string()))?;
    std::fs::write(path, json).map_err(|e| io_error("save_session", path, e))?;
    tracing::debug!(path = %path.display(), "saved session");
    Ok(())
}
