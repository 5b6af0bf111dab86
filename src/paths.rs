//! Path resolution for appver
//!
//! # Environment Variables
//!
//! - `APPVER_DATA_DIR` - Override the local backend root
//!
//! # Path Resolution Priority
//!
//! For data_dir():
//! 1. `APPVER_DATA_DIR` environment variable
//! 2. `XDG_DATA_HOME/appver` (if set)
//! 3. Platform default:
//!    - Windows: `%LOCALAPPDATA%\appver`
//!    - macOS/Linux: `~/.local/share/appver`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable for the backend root override
pub const ENV_DATA_DIR: &str = "APPVER_DATA_DIR";

/// State file name, next to the project file
pub const STATE_FILE_NAME: &str = "appver.state.toml";

/// Get the default local backend root
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
        let path = expand_path(&dir);
        log::debug!("Using data dir from {}: {}", ENV_DATA_DIR, path.display());
        return Ok(path);
    }

    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        let path = PathBuf::from(xdg_data).join("appver");
        log::debug!("Using XDG_DATA_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        let dir = dirs::data_local_dir().context("Could not determine local data directory")?;
        Ok(dir.join("appver"))
    }

    #[cfg(not(windows))]
    {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".local").join("share").join("appver"))
    }
}

/// Directory holding the project file; bundle filenames resolve against it
pub fn project_dir(project: &Path) -> PathBuf {
    match project.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// State file path for a project, unless overridden
pub fn state_file(project: &Path, explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(
        || project_dir(project).join(STATE_FILE_NAME),
        Path::to_path_buf,
    )
}

/// Expand `~` and environment variables in a path
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(e) => {
            log::debug!("Could not expand {path}: {e}");
            PathBuf::from(shellexpand::tilde(path).as_ref())
        }
    }
}
