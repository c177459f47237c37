use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::{config::env::DirectoryConfig, infrastructure::logging::LOG_FILE_NAME};

#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub logs_dir: PathBuf,
    pub log_file: PathBuf,
}

pub fn ensure_directories(cfg: &DirectoryConfig) -> Result<ResolvedPaths> {
    let logs_dir = ensure_dir(&cfg.logs_dir)?;

    let write_check = logs_dir.join(".write-test");
    fs::write(&write_check, b"ok")
        .with_context(|| format!("logs directory {} is not writable", logs_dir.display()))?;
    fs::remove_file(&write_check)?;

    Ok(ResolvedPaths {
        log_file: logs_dir.join(LOG_FILE_NAME),
        logs_dir,
    })
}

fn ensure_dir(path: &str) -> Result<PathBuf> {
    let dir = PathBuf::from(path);
    if !dir.exists() {
        create_private_dir(&dir)
            .with_context(|| format!("failed to create directory {}", path))?;
    }
    Ok(dir.canonicalize().unwrap_or(dir))
}

// Only directories created here get a mode; an existing one keeps whatever
// the operator gave it.
#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o750).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}
