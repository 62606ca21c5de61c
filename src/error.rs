//! Error types for Vessel

use thiserror::Error;

/// Result type for Vessel operations
pub type Result<T> = std::result::Result<T, VesselError>;

/// Vessel error types
#[derive(Error, Debug)]
pub enum VesselError {
    #[error("No free port: scan passed 65535")]
    PortRangeExhausted,

    #[error("Name already in use: {0}")]
    NameInUse(String),

    #[error("Invalid container name: {0}")]
    InvalidName(String),

    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    #[error("Container {0} is running (use --force to remove it)")]
    ContainerRunning(String),

    #[error("Backup archive not found: {}", .0.display())]
    ArchiveNotFound(std::path::PathBuf),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Supervisor error: {0}")]
    Supervisor(String),

    #[error("Firewall error: {0}")]
    Firewall(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VesselError {
    /// Process exit code for this error's category
    pub fn exit_code(&self) -> i32 {
        match self {
            VesselError::PortRangeExhausted => 2,
            VesselError::NameInUse(_) => 3,
            VesselError::ContainerNotFound(_) | VesselError::ArchiveNotFound(_) => 4,
            VesselError::Runtime(_)
            | VesselError::Supervisor(_)
            | VesselError::Firewall(_)
            | VesselError::Io(_)
            | VesselError::Json(_) => 5,
            VesselError::InvalidName(_) | VesselError::ContainerRunning(_) => 6,
        }
    }
}
