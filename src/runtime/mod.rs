//! Container runtime adapter
//!
//! Narrow contract over the external container runtime. The workflows are
//! written entirely against the [`ContainerRuntime`] trait; [`Podman`] is
//! the production implementation. The runtime owns container state - it is
//! queried live at every decision point, never cached.

pub mod podman;

#[cfg(test)]
pub mod mock;

pub use podman::Podman;

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Mount point of the data directory inside every container
pub const DATA_MOUNT: &str = "/data";

/// Container status as reported by the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStatus {
    /// Created but never started
    Created,
    /// Container is running
    Running,
    /// Container is paused
    Paused,
    /// Container has exited
    Exited,
    /// Any state this tool has no special handling for
    Unknown,
}

impl ContainerStatus {
    /// Parse the runtime's status string
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "created" | "configured" | "initialized" => ContainerStatus::Created,
            "running" => ContainerStatus::Running,
            "paused" => ContainerStatus::Paused,
            "exited" | "stopped" => ContainerStatus::Exited,
            _ => ContainerStatus::Unknown,
        }
    }
}

impl std::fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerStatus::Created => write!(f, "created"),
            ContainerStatus::Running => write!(f, "running"),
            ContainerStatus::Paused => write!(f, "paused"),
            ContainerStatus::Exited => write!(f, "exited"),
            ContainerStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Everything the runtime needs to start a new container
#[derive(Debug, Clone)]
pub struct RunSpec {
    /// Container name, used verbatim as the runtime identifier
    pub name: String,
    /// Image reference
    pub image: String,
    /// Host-facing port
    pub host_port: u16,
    /// Container-side port the host port maps to
    pub container_port: u16,
    /// Host directory bind-mounted at [`DATA_MOUNT`]
    pub data_dir: PathBuf,
    /// CPU share
    pub cpus: String,
    /// Memory limit
    pub memory: String,
    /// Main process; a long-lived placeholder so later steps can exec
    pub command: Vec<String>,
}

/// One row of the runtime's container listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRecord {
    pub name: String,
    pub image: String,
    pub status: ContainerStatus,
    /// Port mappings as `host->container/proto` strings
    pub ports: Vec<String>,
}

/// Listing filter understood by the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    All,
    Running,
    Stopped,
}

/// Contract over the external container runtime
pub trait ContainerRuntime: Send + Sync {
    /// Whether a container with this exact name exists in the runtime's
    /// namespace
    fn container_exists(&self, name: &str) -> Result<bool>;

    /// Whether the image is present in local storage
    fn image_exists(&self, image: &str) -> Result<bool>;

    /// Pull an image from its registry
    fn pull(&self, image: &str) -> Result<()>;

    /// Create and start a new container
    fn run(&self, spec: &RunSpec) -> Result<()>;

    /// Execute a command inside a running container, returning its stdout
    fn exec(&self, name: &str, user: Option<&str>, cmd: &[String]) -> Result<String>;

    /// Execute a command attached to the caller's terminal
    fn exec_interactive(&self, name: &str, cmd: &[String]) -> Result<()>;

    /// Start a stopped container
    fn start(&self, name: &str) -> Result<()>;

    /// Stop a running container
    fn stop(&self, name: &str) -> Result<()>;

    /// Current status of a container
    fn inspect_status(&self, name: &str) -> Result<ContainerStatus>;

    /// Remove a stopped container
    fn remove(&self, name: &str) -> Result<()>;

    /// Export the container's filesystem to a tar archive at `dest`
    fn export(&self, name: &str, dest: &Path) -> Result<()>;

    /// Import a tar archive as a new container at rest under `name`
    fn import(&self, archive: &Path, name: &str) -> Result<()>;

    /// List containers. Ordering is whatever the runtime reports.
    fn list(&self, filter: ListFilter) -> Result<Vec<ContainerRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(ContainerStatus::parse("running"), ContainerStatus::Running);
        assert_eq!(ContainerStatus::parse("exited\n"), ContainerStatus::Exited);
        assert_eq!(ContainerStatus::parse("created"), ContainerStatus::Created);
        assert_eq!(ContainerStatus::parse("weird"), ContainerStatus::Unknown);
    }

    #[test]
    fn test_status_display_round_trip() {
        for status in [
            ContainerStatus::Created,
            ContainerStatus::Running,
            ContainerStatus::Paused,
            ContainerStatus::Exited,
        ] {
            assert_eq!(ContainerStatus::parse(&status.to_string()), status);
        }
    }
}
