//! Service supervision
//!
//! Pairs every container with an init-system record so it is restarted
//! across boots and crashes. [`ServiceRegistrar`] owns the unit-record
//! lifecycle; the [`Supervisor`] trait is the narrow contract over the
//! external init system, implemented by [`Systemctl`].

pub mod systemd;

#[cfg(test)]
pub mod mock;

pub use systemd::Systemctl;

use crate::error::{Result, VesselError};
use std::path::PathBuf;
use std::sync::Arc;

/// Prefix of unit records derived from container names
pub const UNIT_PREFIX: &str = "pm-";

/// Unit name derived from a container name
pub fn unit_name(container: &str) -> String {
    format!("{}{}.service", UNIT_PREFIX, container)
}

/// User-directed service actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
    Status,
}

/// Contract over the external init system
pub trait Supervisor: Send + Sync {
    /// Reload the supervisor's unit index
    fn daemon_reload(&self) -> Result<()>;

    /// Activate the unit on boot
    fn enable(&self, unit: &str) -> Result<()>;

    /// Stop activating the unit on boot
    fn disable(&self, unit: &str) -> Result<()>;

    fn start(&self, unit: &str) -> Result<()>;

    fn stop(&self, unit: &str) -> Result<()>;

    fn restart(&self, unit: &str) -> Result<()>;

    /// Human-readable unit status
    fn status(&self, unit: &str) -> Result<String>;
}

/// Manages the unit records wiring containers into the init system
pub struct ServiceRegistrar {
    unit_dir: PathBuf,
    supervisor: Arc<dyn Supervisor>,
}

impl ServiceRegistrar {
    pub fn new(unit_dir: impl Into<PathBuf>, supervisor: Arc<dyn Supervisor>) -> Self {
        Self {
            unit_dir: unit_dir.into(),
            supervisor,
        }
    }

    /// Path of the unit record for a container
    pub fn unit_path(&self, container: &str) -> PathBuf {
        self.unit_dir.join(unit_name(container))
    }

    /// Whether a unit record exists for this container
    pub fn exists(&self, container: &str) -> bool {
        self.unit_path(container).is_file()
    }

    /// Write, enable and start the unit for a container.
    ///
    /// A start failure after a successful enable is logged and tolerated;
    /// every earlier sub-step failure is fatal.
    pub fn create(&self, container: &str) -> Result<()> {
        let unit = unit_name(container);
        let path = self.unit_path(container);

        std::fs::write(&path, unit_contents(container)).map_err(|e| {
            VesselError::Supervisor(format!("writing {}: {}", path.display(), e))
        })?;

        self.supervisor.daemon_reload()?;
        self.supervisor.enable(&unit)?;

        if let Err(e) = self.supervisor.start(&unit) {
            tracing::warn!("Unit {} enabled but failed to start: {}", unit, e);
        } else {
            tracing::info!("Unit {} enabled and started", unit);
        }

        Ok(())
    }

    /// Remove the unit record.
    ///
    /// Best-effort by design: a container removal is never blocked on
    /// service-layer inconsistency, so every failure here is only logged.
    pub fn remove(&self, container: &str) {
        let unit = unit_name(container);

        if let Err(e) = self.supervisor.stop(&unit) {
            tracing::warn!("Failed to stop {}: {}", unit, e);
        }
        if let Err(e) = self.supervisor.disable(&unit) {
            tracing::warn!("Failed to disable {}: {}", unit, e);
        }

        let path = self.unit_path(container);
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to delete {}: {}", path.display(), e),
        }

        if let Err(e) = self.supervisor.daemon_reload() {
            tracing::warn!("Failed to reload unit index: {}", e);
        }
    }

    /// Dispatch a user-directed action against the derived unit name.
    ///
    /// Failures propagate: these are explicit requests with no ambiguity
    /// about intent. `Status` returns the supervisor's output.
    pub fn manage(&self, action: ServiceAction, container: &str) -> Result<Option<String>> {
        let unit = unit_name(container);
        match action {
            ServiceAction::Start => self.supervisor.start(&unit).map(|_| None),
            ServiceAction::Stop => self.supervisor.stop(&unit).map(|_| None),
            ServiceAction::Restart => self.supervisor.restart(&unit).map(|_| None),
            ServiceAction::Status => self.supervisor.status(&unit).map(Some),
        }
    }
}

/// Unit record contents for a container.
///
/// Start/stop are wired to the runtime's start/stop of the same-named
/// container, restarting always, ordered after network availability.
fn unit_contents(container: &str) -> String {
    format!(
        "[Unit]\n\
         Description=Vessel container {name}\n\
         Wants=network-online.target\n\
         After=network-online.target\n\
         \n\
         [Service]\n\
         Restart=always\n\
         ExecStart=/usr/bin/podman start -a {name}\n\
         ExecStop=/usr/bin/podman stop -t 10 {name}\n\
         \n\
         [Install]\n\
         WantedBy=multi-user.target\n",
        name = container
    )
}
