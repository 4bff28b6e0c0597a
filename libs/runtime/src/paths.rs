//! Home directory resolution for `server.home_dir`.

use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomeDirError {
    #[error("cannot determine the user's home directory")]
    NoHome,
    #[error("failed to create home directory '{path}': {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read current directory: {0}")]
    Cwd(#[source] std::io::Error),
}

/// `%APPDATA%` on Windows, the user's home elsewhere (falling back to the passwd entry on Unix).
fn platform_home() -> Result<PathBuf, HomeDirError> {
    #[cfg(target_os = "windows")]
    let base = dirs::config_dir();
    #[cfg(not(target_os = "windows"))]
    let base = dirs::home_dir();

    base.ok_or(HomeDirError::NoHome)
}

/// Expand a leading `~` and make the path absolute against the current directory.
fn expand(raw: &str) -> Result<PathBuf, HomeDirError> {
    let p = if raw == "~" {
        platform_home()?
    } else if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        platform_home()?.join(rest)
    } else {
        PathBuf::from(raw)
    };

    if p.is_absolute() {
        Ok(p)
    } else {
        Ok(env::current_dir().map_err(HomeDirError::Cwd)?.join(p))
    }
}

/// Resolve the server home directory.
///
/// `None` selects `<platform home>/<default_subdir>`. The result is always absolute; with `create` the
/// directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let path = match configured {
        Some(raw) => expand(raw.trim())?,
        None => platform_home()?.join(default_subdir),
    };

    if create {
        ensure_dir(&path)?;
    }
    Ok(path)
}

fn ensure_dir(path: &Path) -> Result<(), HomeDirError> {
    std::fs::create_dir_all(path).map_err(|source| HomeDirError::Create {
        path: path.to_path_buf(),
        source,
    })
}
