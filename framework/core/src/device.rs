use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Hosts whose GPUs are too old to run the parallel tool, so they default to the CPU.
pub const DEFAULT_CPU_HOSTS: &[&str] = &["dijkstra", "turing"];

/// The device the parallel tool is asked to run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    Cpu,
    Gpu,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cpu => "cpu",
            Device::Gpu => "gpu",
        }
    }
}

impl Display for Device {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(Device::Cpu),
            "gpu" => Ok(Device::Gpu),
            other => Err(format!("Unknown device [{other}], expected cpu or gpu")),
        }
    }
}

/// Decides which device a run targets.
///
/// An explicitly requested device always wins. Otherwise hosts on the CPU allowlist get
/// [Device::Cpu] and every other host gets [Device::Gpu].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePolicy {
    cpu_hosts: Vec<String>,
}

impl Default for DevicePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_CPU_HOSTS.iter().map(|h| h.to_string()).collect())
    }
}

impl DevicePolicy {
    pub fn new(cpu_hosts: Vec<String>) -> Self {
        Self { cpu_hosts }
    }

    /// Parse a comma separated allowlist, ignoring blank entries.
    pub fn from_list(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(|h| h.to_string())
                .collect(),
        )
    }

    pub fn cpu_hosts(&self) -> &[String] {
        &self.cpu_hosts
    }

    pub fn resolve(&self, explicit: Option<Device>, hostname: &str) -> Device {
        if let Some(device) = explicit {
            return device;
        }

        if self.cpu_hosts.iter().any(|h| h == hostname) {
            Device::Cpu
        } else {
            Device::Gpu
        }
    }
}
