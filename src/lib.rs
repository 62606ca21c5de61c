//! Vessel - provisioning manager for persistent podman containers
//!
//! Vessel provisions named, reproducible application containers on a single
//! host. Each managed unit pairs a podman container with a systemd service
//! record that restarts it across boots and crashes, a bind-mounted data
//! directory, and an open firewall port. It provides:
//!
//! - Container provisioning and teardown
//! - Automatic host port allocation
//! - Service pairing (`pm-<name>.service`)
//! - Filesystem backup and restore
//!
//! All external state lives in the container runtime, the init system and
//! the firewall; Vessel queries them live instead of keeping a shadow
//! registry.

pub mod backup;
pub mod config;
pub mod error;
pub mod firewall;
pub mod provision;
pub mod registry;
pub mod runtime;
pub mod service;

pub use error::{Result, VesselError};
