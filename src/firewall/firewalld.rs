//! firewalld-backed firewall adapter

use super::Firewall;
use crate::error::{Result, VesselError};
use std::process::Command;

/// Firewall adapter shelling out to `firewall-cmd`
#[derive(Debug, Clone)]
pub struct FirewallCmd {
    /// Binary to invoke
    bin: String,
}

impl FirewallCmd {
    /// Create an adapter driving the system `firewall-cmd`
    pub fn new() -> Self {
        Self {
            bin: "firewall-cmd".to_string(),
        }
    }

    fn firewall_cmd(&self, args: &[&str]) -> Result<()> {
        tracing::debug!("{} {}", self.bin, args.join(" "));
        let output = Command::new(&self.bin).args(args).output()?;

        if output.status.success() {
            Ok(())
        } else {
            Err(VesselError::Firewall(format!(
                "{} {} failed: {}",
                self.bin,
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}

impl Default for FirewallCmd {
    fn default() -> Self {
        Self::new()
    }
}

impl Firewall for FirewallCmd {
    fn add_permanent_port(&self, port: u16) -> Result<()> {
        let rule = format!("--add-port={}/tcp", port);
        self.firewall_cmd(&["--permanent", &rule])
    }

    fn reload(&self) -> Result<()> {
        self.firewall_cmd(&["--reload"])
    }
}
