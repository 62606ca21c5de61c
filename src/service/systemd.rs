//! systemd-backed supervisor adapter

use super::Supervisor;
use crate::error::{Result, VesselError};
use std::process::Command;

/// Supervisor adapter shelling out to `systemctl`
#[derive(Debug, Clone)]
pub struct Systemctl {
    /// Binary to invoke
    bin: String,
}

impl Systemctl {
    /// Create an adapter driving the system `systemctl`
    pub fn new() -> Self {
        Self {
            bin: "systemctl".to_string(),
        }
    }

    /// Run systemctl with `args`, failing on a non-zero exit
    fn systemctl(&self, args: &[&str]) -> Result<()> {
        tracing::debug!("{} {}", self.bin, args.join(" "));
        let output = Command::new(&self.bin).args(args).output()?;

        if output.status.success() {
            Ok(())
        } else {
            Err(VesselError::Supervisor(format!(
                "{} {} failed: {}",
                self.bin,
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}

impl Default for Systemctl {
    fn default() -> Self {
        Self::new()
    }
}

impl Supervisor for Systemctl {
    fn daemon_reload(&self) -> Result<()> {
        self.systemctl(&["daemon-reload"])
    }

    fn enable(&self, unit: &str) -> Result<()> {
        self.systemctl(&["enable", unit])
    }

    fn disable(&self, unit: &str) -> Result<()> {
        self.systemctl(&["disable", unit])
    }

    fn start(&self, unit: &str) -> Result<()> {
        self.systemctl(&["start", unit])
    }

    fn stop(&self, unit: &str) -> Result<()> {
        self.systemctl(&["stop", unit])
    }

    fn restart(&self, unit: &str) -> Result<()> {
        self.systemctl(&["restart", unit])
    }

    fn status(&self, unit: &str) -> Result<String> {
        tracing::debug!("{} status {}", self.bin, unit);
        let output = Command::new(&self.bin)
            .args(["status", "--no-pager", unit])
            .output()?;

        // systemctl status exits non-zero for inactive units; only "no such
        // unit" and invocation failures are errors here.
        match output.status.code() {
            Some(0..=3) => Ok(String::from_utf8_lossy(&output.stdout).into_owned()),
            _ => Err(VesselError::Supervisor(format!(
                "{} status {} failed: {}",
                self.bin,
                unit,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }
}
