//! Runtime configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Immutable configuration, constructed once at startup and passed by
/// reference into the workflows. There is no ambient global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base image used when a create request names none
    pub default_image: String,
    /// First candidate for host port allocation
    pub default_port: u16,
    /// Base directory holding one data directory per container
    pub data_dir: PathBuf,
    /// Directory backup artifacts are written to
    pub backup_dir: PathBuf,
    /// Directory service unit records are written to
    pub unit_dir: PathBuf,
    /// CPU share applied when a create request names none
    pub default_cpus: String,
    /// Memory limit applied when a create request names none
    pub default_memory: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_image: "docker.io/library/almalinux:latest".to_string(),
            default_port: 60000,
            data_dir: PathBuf::from("./containers_data"),
            backup_dir: PathBuf::from("./container_backups"),
            unit_dir: PathBuf::from("/etc/systemd/system"),
            default_cpus: "1".to_string(),
            default_memory: "512m".to_string(),
        }
    }
}
