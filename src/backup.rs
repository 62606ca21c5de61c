//! Backup and restore
//!
//! Exports a container's filesystem into a timestamp-named tar artifact
//! and re-instantiates containers from such artifacts. Exports are live:
//! the container is not paused, so the archive reflects the filesystem at
//! call time.

use crate::error::{Result, VesselError};
use crate::runtime::ContainerRuntime;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use walkdir::WalkDir;

/// Timestamp format embedded in artifact names
const STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Artifact name shape: `<name>_backup_<YYYYMMDDHHMMSS>.tar`
fn artifact_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.-]*_backup_[0-9]{14}\.tar$").unwrap()
    })
}

/// One backup artifact on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub size: u64,
}

/// Exports and imports container filesystem snapshots
pub struct BackupEngine {
    runtime: Arc<dyn ContainerRuntime>,
}

impl BackupEngine {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }

    /// Export `name` into a fresh artifact inside `dir`.
    ///
    /// The directory must already exist; creating it is the surrounding
    /// workflow's responsibility.
    pub fn backup(&self, name: &str, dir: &Path) -> Result<PathBuf> {
        if !self.runtime.container_exists(name)? {
            return Err(VesselError::ContainerNotFound(name.to_string()));
        }

        let stamp = chrono::Local::now().format(STAMP_FORMAT);
        let dest = dir.join(format!("{}_backup_{}.tar", name, stamp));

        tracing::info!("Exporting {} to {}", name, dest.display());
        self.runtime.export(name, &dest)?;
        Ok(dest)
    }

    /// Import `archive` as a new container named `name`, at rest.
    ///
    /// Registering a service or starting the container is deliberately left
    /// to the caller.
    pub fn restore(&self, name: &str, archive: &Path) -> Result<()> {
        if self.runtime.container_exists(name)? {
            return Err(VesselError::NameInUse(name.to_string()));
        }
        if !archive.is_file() {
            return Err(VesselError::ArchiveNotFound(archive.to_path_buf()));
        }

        tracing::info!("Importing {} as {}", archive.display(), name);
        self.runtime.import(archive, name)
    }
}

/// Enumerate backup artifacts in `dir`, newest first per container name.
///
/// A missing directory yields an empty listing.
pub fn list_artifacts(dir: &Path) -> Result<Vec<Artifact>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut artifacts = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let file_name = entry.file_name().to_string_lossy();
        if artifact_pattern().is_match(&file_name) {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            artifacts.push(Artifact {
                path: entry.path().to_path_buf(),
                size,
            });
        }
    }

    // The embedded timestamp makes descending name order newest-first.
    artifacts.sort_by(|a, b| b.path.file_name().cmp(&a.path.file_name()));
    Ok(artifacts)
}
