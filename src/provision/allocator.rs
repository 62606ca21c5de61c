//! Resource allocation for new containers
//!
//! Resolves the three scarce inputs of a create: a free host port, a
//! verbatim unique name, and a per-container data directory. Liveness is
//! always re-derived from the OS; nothing is tracked, so there is no
//! release step. The existence checks are check-then-act and therefore
//! racy under concurrent invocation of independent processes.

use crate::error::{Result, VesselError};
use regex::Regex;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Suffix appended to container names to form data directory names
pub const DATA_SUFFIX: &str = "_data";

/// Name shape accepted by the container runtime
fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.-]*$").unwrap())
}

/// Memory limit shape accepted by the container runtime (e.g. 512m, 2g)
fn memory_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(?i)[0-9]+[bkmg]?$").unwrap())
}

/// Reject aliases the runtime would not accept as container names
pub fn validate_name(name: &str) -> Result<()> {
    if name_pattern().is_match(name) {
        Ok(())
    } else {
        Err(VesselError::InvalidName(name.to_string()))
    }
}

/// Whether some process is already bound to `port`
pub fn port_in_use(port: u16) -> bool {
    TcpListener::bind(("0.0.0.0", port)).is_err()
}

/// Linear forward port scan.
///
/// Deterministic and simple; the namespace is small and allocation is
/// infrequent, so a smarter allocator buys nothing.
#[derive(Clone, Copy)]
pub struct PortAllocator {
    default_port: u16,
    probe: fn(u16) -> bool,
}

impl PortAllocator {
    /// Allocator probing live OS port state
    pub fn new(default_port: u16) -> Self {
        Self {
            default_port,
            probe: port_in_use,
        }
    }

    /// Allocator with a caller-supplied probe
    #[cfg(test)]
    pub fn with_probe(default_port: u16, probe: fn(u16) -> bool) -> Self {
        Self {
            default_port,
            probe,
        }
    }

    /// Resolve a host port, scanning forward from `requested` (or the
    /// default). Candidates below 1 are skipped; passing 65535 fails the
    /// allocation.
    pub fn resolve(&self, requested: Option<u32>) -> Result<u16> {
        let mut candidate = requested.unwrap_or(u32::from(self.default_port));
        loop {
            if candidate < 1 {
                candidate += 1;
                continue;
            }
            if candidate > u32::from(u16::MAX) {
                return Err(VesselError::PortRangeExhausted);
            }
            let port = candidate as u16;
            if !(self.probe)(port) {
                return Ok(port);
            }
            candidate += 1;
        }
    }
}

/// Parse a requested port. Malformed input falls back to `None` (the
/// configured default) with a warning; it is never fatal.
pub fn parse_port(raw: Option<&str>) -> Option<u32> {
    let raw = raw?;
    match raw.trim().parse::<u32>() {
        Ok(port) => Some(port),
        Err(_) => {
            tracing::warn!("Ignoring malformed port {:?}, using the default", raw);
            None
        }
    }
}

/// Validate a CPU share, substituting `default` on malformed input
pub fn sanitize_cpus(raw: Option<&str>, default: &str) -> String {
    match raw {
        None => default.to_string(),
        Some(v) if v.parse::<f64>().map(|c| c > 0.0).unwrap_or(false) => v.to_string(),
        Some(v) => {
            tracing::warn!("Ignoring malformed CPU share {:?}, using {}", v, default);
            default.to_string()
        }
    }
}

/// Validate a memory limit, substituting `default` on malformed input
pub fn sanitize_memory(raw: Option<&str>, default: &str) -> String {
    match raw {
        None => default.to_string(),
        Some(v) if memory_pattern().is_match(v) => v.to_string(),
        Some(v) => {
            tracing::warn!("Ignoring malformed memory limit {:?}, using {}", v, default);
            default.to_string()
        }
    }
}

/// Resolve the data directory for `name` under `base`, creating it if
/// absent. An existing directory is reused as-is; its contents are not
/// validated.
pub fn resolve_data_dir(base: &Path, name: &str) -> Result<PathBuf> {
    let dir = base.join(format!("{}{}", name, DATA_SUFFIX));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
