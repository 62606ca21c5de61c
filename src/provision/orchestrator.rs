//! Create / remove workflows
//!
//! Sequences the adapters through the provisioning steps in strict forward
//! order. Every step is a commit point: when a later step fails, the steps
//! already taken are left in place and the operator cleans up with an
//! explicit remove. Rollback of a multi-subsystem sequence cannot be made
//! atomic, so partial state is kept visible instead of papered over.

use super::allocator::{self, PortAllocator};
use crate::config::Config;
use crate::error::{Result, VesselError};
use crate::firewall::Firewall;
use crate::runtime::{ContainerRuntime, ContainerStatus, RunSpec};
use crate::service::ServiceRegistrar;
use std::sync::Arc;

/// Fixed container-side port the host port maps to
pub const WEB_PORT: u16 = 80;

/// Placeholder main process keeping the container alive for exec
const HOLD_CMD: [&str; 2] = ["sleep", "infinity"];

/// Web server package installed into every new container
const WEB_PACKAGE: &str = "httpd";

/// Parameters of a create request, as collected by the caller.
///
/// Everything here is re-validated; caller pre-validation is not trusted.
#[derive(Debug, Clone, Default)]
pub struct CreateRequest {
    /// Container name, used verbatim
    pub name: String,
    /// Image reference; the configured default when absent
    pub image: Option<String>,
    /// Requested host port; allocation starts from the default when absent
    pub port: Option<String>,
    /// Extra packages installed in one batch
    pub packages: Vec<String>,
    /// CPU share
    pub cpus: Option<String>,
    /// Memory limit
    pub memory: Option<String>,
}

/// Outcome of a successful create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioned {
    pub name: String,
    pub port: u16,
}

/// Sequences create/remove across runtime, firewall and supervisor
pub struct Orchestrator {
    config: Config,
    ports: PortAllocator,
    runtime: Arc<dyn ContainerRuntime>,
    registrar: ServiceRegistrar,
    firewall: Arc<dyn Firewall>,
}

impl Orchestrator {
    pub fn new(
        config: Config,
        ports: PortAllocator,
        runtime: Arc<dyn ContainerRuntime>,
        registrar: ServiceRegistrar,
        firewall: Arc<dyn Firewall>,
    ) -> Self {
        Self {
            config,
            ports,
            runtime,
            registrar,
            firewall,
        }
    }

    /// Provision a new container with its service record and open port.
    ///
    /// Fails before any side effect when the name is invalid, already in
    /// use, or no port can be allocated.
    pub fn create(&self, req: &CreateRequest) -> Result<Provisioned> {
        allocator::validate_name(&req.name)?;
        if self.runtime.container_exists(&req.name)? {
            return Err(VesselError::NameInUse(req.name.clone()));
        }

        let requested = allocator::parse_port(req.port.as_deref());
        let port = self.ports.resolve(requested)?;
        tracing::info!("Resolved host port {}", port);

        let data_dir = allocator::resolve_data_dir(&self.config.data_dir, &req.name)?;
        tracing::info!("Data directory {}", data_dir.display());

        let image = req
            .image
            .clone()
            .unwrap_or_else(|| self.config.default_image.clone());
        if self.runtime.image_exists(&image)? {
            tracing::info!("Image {} already present", image);
        } else {
            tracing::info!("Pulling image {}", image);
            self.runtime.pull(&image)?;
        }

        let spec = RunSpec {
            name: req.name.clone(),
            image,
            host_port: port,
            container_port: WEB_PORT,
            data_dir,
            cpus: allocator::sanitize_cpus(req.cpus.as_deref(), &self.config.default_cpus),
            memory: allocator::sanitize_memory(req.memory.as_deref(), &self.config.default_memory),
            command: HOLD_CMD.iter().map(|s| s.to_string()).collect(),
        };
        tracing::info!("Starting container {}", req.name);
        self.runtime.run(&spec)?;

        if !req.packages.is_empty() {
            tracing::info!("Installing packages: {}", req.packages.join(", "));
            let mut cmd: Vec<String> = vec!["dnf".into(), "-y".into(), "install".into()];
            cmd.extend(req.packages.iter().cloned());
            self.runtime.exec(&req.name, None, &cmd)?;
        }

        tracing::info!("Installing web server");
        let install: Vec<String> = vec![
            "dnf".into(),
            "-y".into(),
            "install".into(),
            WEB_PACKAGE.into(),
        ];
        self.runtime.exec(&req.name, None, &install)?;
        let enable: Vec<String> = vec!["systemctl".into(), "enable".into(), WEB_PACKAGE.into()];
        self.runtime.exec(&req.name, None, &enable)?;

        tracing::info!("Opening firewall port {}/tcp", port);
        self.firewall.add_permanent_port(port)?;
        self.firewall.reload()?;

        if self.registrar.exists(&req.name) {
            tracing::warn!(
                "Service record for {} already exists, leaving it untouched",
                req.name
            );
        } else {
            self.registrar.create(&req.name)?;
        }

        tracing::info!("Container {} provisioned on port {}", req.name, port);
        Ok(Provisioned {
            name: req.name.clone(),
            port,
        })
    }

    /// Tear down a container and its service record.
    ///
    /// Refused while the container runs unless `force` is set, with zero
    /// side effects. The data directory is deliberately left in place for
    /// later backup or re-creation.
    pub fn remove(&self, name: &str, force: bool) -> Result<()> {
        if !self.runtime.container_exists(name)? {
            return Err(VesselError::ContainerNotFound(name.to_string()));
        }
        let running = self.runtime.inspect_status(name)? == ContainerStatus::Running;
        if running && !force {
            return Err(VesselError::ContainerRunning(name.to_string()));
        }

        // Deregister first so the supervisor cannot restart the container
        // mid-removal.
        self.registrar.remove(name);

        if running {
            tracing::info!("Stopping container {}", name);
            self.runtime.stop(name)?;
        }
        tracing::info!("Removing container {}", name);
        self.runtime.remove(name)?;
        tracing::info!("Container {} removed", name);
        Ok(())
    }
}
