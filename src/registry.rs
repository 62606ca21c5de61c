//! Read-only container listings
//!
//! Thin projections over the runtime's live listing. Nothing is cached,
//! and result ordering is whatever the runtime reports - callers must not
//! rely on any particular order.

use crate::error::Result;
use crate::runtime::{ContainerRecord, ContainerRuntime, ListFilter};
use std::sync::Arc;

/// Read-only view over the runtime's container namespace
pub struct RegistryView {
    runtime: Arc<dyn ContainerRuntime>,
}

impl RegistryView {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }

    /// Every container, regardless of state
    pub fn all(&self) -> Result<Vec<ContainerRecord>> {
        self.runtime.list(ListFilter::All)
    }

    /// Containers currently running
    pub fn running(&self) -> Result<Vec<ContainerRecord>> {
        self.runtime.list(ListFilter::Running)
    }

    /// Containers that have exited
    pub fn stopped(&self) -> Result<Vec<ContainerRecord>> {
        self.runtime.list(ListFilter::Stopped)
    }
}
