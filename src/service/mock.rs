//! In-memory supervisor used by tests

use super::Supervisor;
use crate::error::{Result, VesselError};
use std::sync::Mutex;

/// Supervisor double recording every call, with switchable failures
#[derive(Debug, Default)]
pub struct MockSupervisor {
    pub log: Mutex<Vec<String>>,
    pub fail_enable: bool,
    pub fail_disable: bool,
    pub fail_start: bool,
    pub fail_stop: bool,
}

impl MockSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, call: String, fail: bool) -> Result<()> {
        if fail {
            return Err(VesselError::Supervisor(format!("{} failed", call)));
        }
        self.log.lock().unwrap().push(call);
        Ok(())
    }
}

impl Supervisor for MockSupervisor {
    fn daemon_reload(&self) -> Result<()> {
        self.record("daemon-reload".to_string(), false)
    }

    fn enable(&self, unit: &str) -> Result<()> {
        self.record(format!("enable {}", unit), self.fail_enable)
    }

    fn disable(&self, unit: &str) -> Result<()> {
        self.record(format!("disable {}", unit), self.fail_disable)
    }

    fn start(&self, unit: &str) -> Result<()> {
        self.record(format!("start {}", unit), self.fail_start)
    }

    fn stop(&self, unit: &str) -> Result<()> {
        self.record(format!("stop {}", unit), self.fail_stop)
    }

    fn restart(&self, unit: &str) -> Result<()> {
        self.record(format!("restart {}", unit), false)
    }

    fn status(&self, unit: &str) -> Result<String> {
        self.log.lock().unwrap().push(format!("status {}", unit));
        Ok(format!("status of {}", unit))
    }
}
