//! In-memory firewall used by tests

use super::Firewall;
use crate::error::Result;
use std::sync::Mutex;

/// Firewall double recording opened ports and reloads
#[derive(Debug, Default)]
pub struct MockFirewall {
    pub open_ports: Mutex<Vec<u16>>,
    pub reloads: Mutex<usize>,
}

impl MockFirewall {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ports(&self) -> Vec<u16> {
        self.open_ports.lock().unwrap().clone()
    }

    pub fn reload_count(&self) -> usize {
        *self.reloads.lock().unwrap()
    }
}

impl Firewall for MockFirewall {
    fn add_permanent_port(&self, port: u16) -> Result<()> {
        self.open_ports.lock().unwrap().push(port);
        Ok(())
    }

    fn reload(&self) -> Result<()> {
        *self.reloads.lock().unwrap() += 1;
        Ok(())
    }
}
