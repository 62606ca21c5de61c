//! Podman-backed runtime adapter

use super::{ContainerRecord, ContainerRuntime, ContainerStatus, ListFilter, RunSpec, DATA_MOUNT};
use crate::error::{Result, VesselError};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

/// Runtime adapter shelling out to the `podman` CLI
#[derive(Debug, Clone)]
pub struct Podman {
    /// Binary to invoke
    bin: String,
}

impl Podman {
    /// Create an adapter driving the system `podman`
    pub fn new() -> Self {
        Self {
            bin: "podman".to_string(),
        }
    }

    /// Run podman with `args`, failing on a non-zero exit
    fn podman(&self, args: &[&str]) -> Result<String> {
        tracing::debug!("{} {}", self.bin, args.join(" "));
        let output = Command::new(&self.bin).args(args).output()?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(VesselError::Runtime(format!(
                "{} {} failed: {}",
                self.bin,
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }

    /// Run a podman existence check, where exit 0 means yes and 1 means no
    fn probe(&self, args: &[&str]) -> Result<bool> {
        tracing::debug!("{} {}", self.bin, args.join(" "));
        let output = Command::new(&self.bin).args(args).output()?;

        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(VesselError::Runtime(format!(
                "{} {} failed: {}",
                self.bin,
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }
}

impl Default for Podman {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerRuntime for Podman {
    fn container_exists(&self, name: &str) -> Result<bool> {
        self.probe(&["container", "exists", name])
    }

    fn image_exists(&self, image: &str) -> Result<bool> {
        self.probe(&["image", "exists", image])
    }

    fn pull(&self, image: &str) -> Result<()> {
        self.podman(&["pull", image]).map(|_| ())
    }

    fn run(&self, spec: &RunSpec) -> Result<()> {
        let publish = format!("{}:{}", spec.host_port, spec.container_port);
        let volume = format!("{}:{}:Z", spec.data_dir.display(), DATA_MOUNT);
        let cpus = format!("--cpus={}", spec.cpus);
        let memory = format!("--memory={}", spec.memory);

        let mut args = vec![
            "run", "-d", "--name", &spec.name, "-p", &publish, "-v", &volume, &cpus, &memory,
            &spec.image,
        ];
        args.extend(spec.command.iter().map(|s| s.as_str()));

        self.podman(&args).map(|_| ())
    }

    fn exec(&self, name: &str, user: Option<&str>, cmd: &[String]) -> Result<String> {
        let mut args = vec!["exec"];
        if let Some(user) = user {
            args.push("--user");
            args.push(user);
        }
        args.push(name);
        args.extend(cmd.iter().map(|s| s.as_str()));

        self.podman(&args)
    }

    fn exec_interactive(&self, name: &str, cmd: &[String]) -> Result<()> {
        let status = Command::new(&self.bin)
            .args(["exec", "-it", name])
            .args(cmd)
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(VesselError::Runtime(format!(
                "exec into {} exited with {}",
                name, status
            )))
        }
    }

    fn start(&self, name: &str) -> Result<()> {
        self.podman(&["start", name]).map(|_| ())
    }

    fn stop(&self, name: &str) -> Result<()> {
        self.podman(&["stop", name]).map(|_| ())
    }

    fn inspect_status(&self, name: &str) -> Result<ContainerStatus> {
        let out = self.podman(&[
            "inspect",
            "--type",
            "container",
            "--format",
            "{{.State.Status}}",
            name,
        ])?;
        Ok(ContainerStatus::parse(&out))
    }

    fn remove(&self, name: &str) -> Result<()> {
        self.podman(&["rm", name]).map(|_| ())
    }

    fn export(&self, name: &str, dest: &Path) -> Result<()> {
        let dest = dest.to_string_lossy();
        self.podman(&["export", "--output", &dest, name]).map(|_| ())
    }

    fn import(&self, archive: &Path, name: &str) -> Result<()> {
        // podman import produces an image; a create from that image puts the
        // container itself back into the namespace, at rest.
        let archive = archive.to_string_lossy();
        let image = format!("localhost/{}:restored", name);
        self.podman(&["import", &archive, &image])?;
        self.podman(&["create", "--name", name, &image, "sleep", "infinity"])
            .map(|_| ())
    }

    fn list(&self, filter: ListFilter) -> Result<Vec<ContainerRecord>> {
        let mut args = vec!["ps", "--format", "json"];
        match filter {
            ListFilter::All => args.push("--all"),
            ListFilter::Running => {}
            ListFilter::Stopped => {
                args.extend(["--all", "--filter", "status=exited"]);
            }
        }

        let out = self.podman(&args)?;
        if out.trim().is_empty() {
            return Ok(Vec::new());
        }
        let records: Vec<PsRecord> = serde_json::from_str(&out)?;

        Ok(records.into_iter().map(PsRecord::into_record).collect())
    }
}

/// One entry of `podman ps --format json`
#[derive(Debug, Deserialize)]
struct PsRecord {
    #[serde(rename = "Names", default)]
    names: Vec<String>,
    #[serde(rename = "Image", default)]
    image: String,
    #[serde(rename = "State", default)]
    state: String,
    #[serde(rename = "Ports", default)]
    ports: Vec<PsPort>,
}

/// One port mapping of a `podman ps` entry
#[derive(Debug, Deserialize)]
struct PsPort {
    #[serde(default)]
    host_port: u16,
    #[serde(default)]
    container_port: u16,
    #[serde(default)]
    protocol: String,
}

impl PsRecord {
    fn into_record(self) -> ContainerRecord {
        ContainerRecord {
            name: self.names.into_iter().next().unwrap_or_default(),
            image: self.image,
            status: ContainerStatus::parse(&self.state),
            ports: self
                .ports
                .iter()
                .map(|p| format!("{}->{}/{}", p.host_port, p.container_port, p.protocol))
                .collect(),
        }
    }
}
