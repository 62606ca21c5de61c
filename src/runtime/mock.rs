//! In-memory runtime used by tests

use super::{ContainerRecord, ContainerRuntime, ContainerStatus, ListFilter, RunSpec};
use crate::error::{Result, VesselError};
use std::io::Read;
use std::path::Path;
use std::sync::Mutex;

/// What the mock knows about one container
#[derive(Debug, Clone)]
pub struct MockContainer {
    pub image: String,
    pub status: ContainerStatus,
    pub ports: Vec<String>,
    /// Stand-in for the container's filesystem contents
    pub fs_content: String,
}

/// Which calls should fail, set up before the mock is shared
#[derive(Debug, Default)]
pub struct Failures {
    pub pull: bool,
    pub run: bool,
    pub exec: bool,
    pub export: bool,
}

/// Runtime double recording every call against in-memory state.
///
/// Containers are kept in insertion order so listings are deterministic.
#[derive(Debug, Default)]
pub struct MockRuntime {
    pub containers: Mutex<Vec<(String, MockContainer)>>,
    pub images: Mutex<Vec<String>>,
    pub pulls: Mutex<Vec<String>>,
    pub execs: Mutex<Vec<(String, Vec<String>)>>,
    pub fail: Failures,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a container before the test runs
    pub fn with_container(self, name: &str, status: ContainerStatus) -> Self {
        self.containers.lock().unwrap().push((
            name.to_string(),
            MockContainer {
                image: "mock:latest".to_string(),
                status,
                ports: Vec::new(),
                fs_content: format!("rootfs of {}", name),
            },
        ));
        self
    }

    /// Seed an image before the test runs
    pub fn with_image(self, image: &str) -> Self {
        self.images.lock().unwrap().push(image.to_string());
        self
    }

    /// Snapshot of one container, for assertions
    pub fn container(&self, name: &str) -> Option<MockContainer> {
        self.containers
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.clone())
    }

    fn set_status(&self, name: &str, status: ContainerStatus) -> Result<()> {
        let mut containers = self.containers.lock().unwrap();
        let entry = containers
            .iter_mut()
            .find(|(n, _)| n == name)
            .ok_or_else(|| VesselError::Runtime(format!("no such container: {}", name)))?;
        entry.1.status = status;
        Ok(())
    }
}

impl ContainerRuntime for MockRuntime {
    fn container_exists(&self, name: &str) -> Result<bool> {
        Ok(self.containers.lock().unwrap().iter().any(|(n, _)| n == name))
    }

    fn image_exists(&self, image: &str) -> Result<bool> {
        Ok(self.images.lock().unwrap().iter().any(|i| i == image))
    }

    fn pull(&self, image: &str) -> Result<()> {
        if self.fail.pull {
            return Err(VesselError::Runtime("pull failed".to_string()));
        }
        self.pulls.lock().unwrap().push(image.to_string());
        self.images.lock().unwrap().push(image.to_string());
        Ok(())
    }

    fn run(&self, spec: &RunSpec) -> Result<()> {
        if self.fail.run {
            return Err(VesselError::Runtime("run failed".to_string()));
        }
        let mut containers = self.containers.lock().unwrap();
        if containers.iter().any(|(n, _)| n == &spec.name) {
            return Err(VesselError::Runtime(format!(
                "container name {} already in use",
                spec.name
            )));
        }
        containers.push((
            spec.name.clone(),
            MockContainer {
                image: spec.image.clone(),
                status: ContainerStatus::Running,
                ports: vec![format!("{}->{}/tcp", spec.host_port, spec.container_port)],
                fs_content: format!("rootfs of {}", spec.name),
            },
        ));
        Ok(())
    }

    fn exec(&self, name: &str, _user: Option<&str>, cmd: &[String]) -> Result<String> {
        if self.fail.exec {
            return Err(VesselError::Runtime("exec failed".to_string()));
        }
        match self.container(name) {
            Some(c) if c.status == ContainerStatus::Running => {
                self.execs
                    .lock()
                    .unwrap()
                    .push((name.to_string(), cmd.to_vec()));
                Ok(String::new())
            }
            Some(_) => Err(VesselError::Runtime(format!("{} is not running", name))),
            None => Err(VesselError::Runtime(format!("no such container: {}", name))),
        }
    }

    fn exec_interactive(&self, name: &str, cmd: &[String]) -> Result<()> {
        self.exec(name, None, cmd).map(|_| ())
    }

    fn start(&self, name: &str) -> Result<()> {
        self.set_status(name, ContainerStatus::Running)
    }

    fn stop(&self, name: &str) -> Result<()> {
        self.set_status(name, ContainerStatus::Exited)
    }

    fn inspect_status(&self, name: &str) -> Result<ContainerStatus> {
        self.container(name)
            .map(|c| c.status)
            .ok_or_else(|| VesselError::Runtime(format!("no such container: {}", name)))
    }

    fn remove(&self, name: &str) -> Result<()> {
        let mut containers = self.containers.lock().unwrap();
        let idx = containers
            .iter()
            .position(|(n, _)| n == name)
            .ok_or_else(|| VesselError::Runtime(format!("no such container: {}", name)))?;
        if containers[idx].1.status == ContainerStatus::Running {
            return Err(VesselError::Runtime(format!("{} is running", name)));
        }
        containers.remove(idx);
        Ok(())
    }

    fn export(&self, name: &str, dest: &Path) -> Result<()> {
        if self.fail.export {
            return Err(VesselError::Runtime("export failed".to_string()));
        }
        let container = self
            .container(name)
            .ok_or_else(|| VesselError::Runtime(format!("no such container: {}", name)))?;

        let file = std::fs::File::create(dest)?;
        let mut builder = tar::Builder::new(file);
        let bytes = container.fs_content.as_bytes();
        let mut header = tar::Header::new_gnu();
        header.set_size(bytes.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, "rootfs.txt", bytes)?;
        builder.finish()?;
        Ok(())
    }

    fn import(&self, archive: &Path, name: &str) -> Result<()> {
        let file = std::fs::File::open(archive)?;
        let mut archive = tar::Archive::new(file);
        let mut content = String::new();
        for entry in archive.entries()? {
            entry?.read_to_string(&mut content)?;
        }

        let mut containers = self.containers.lock().unwrap();
        if containers.iter().any(|(n, _)| n == name) {
            return Err(VesselError::Runtime(format!(
                "container name {} already in use",
                name
            )));
        }
        containers.push((
            name.to_string(),
            MockContainer {
                image: format!("localhost/{}:restored", name),
                status: ContainerStatus::Created,
                ports: Vec::new(),
                fs_content: content,
            },
        ));
        Ok(())
    }

    fn list(&self, filter: ListFilter) -> Result<Vec<ContainerRecord>> {
        let containers = self.containers.lock().unwrap();
        Ok(containers
            .iter()
            .filter(|(_, c)| match filter {
                ListFilter::All => true,
                ListFilter::Running => c.status == ContainerStatus::Running,
                ListFilter::Stopped => c.status == ContainerStatus::Exited,
            })
            .map(|(n, c)| ContainerRecord {
                name: n.clone(),
                image: c.image.clone(),
                status: c.status,
                ports: c.ports.clone(),
            })
            .collect())
    }
}
