use std::env;
use std::path::PathBuf;
use std::time::Duration;

use cipher_tunnel_core::prelude::{Device, DevicePolicy};

use crate::cli::HarnessCli;

/// Environment variable holding a comma separated list of hosts that default to the CPU.
pub const CT_CPU_HOSTS_ENV: &str = "CT_CPU_HOSTS";

/// Environment variable to override the path to the build tool.
pub const CT_MAKE_PATH_ENV: &str = "CT_MAKE_PATH";

/// Resolved configuration for a run.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Device requested on the command line, if any.
    pub device: Option<Device>,
    pub device_policy: DevicePolicy,
    pub base_dir: PathBuf,
    pub paes_src: PathBuf,
    pub aes_src: PathBuf,
    /// Build tool override. When unset the build tool is looked up when it's first needed.
    pub make_path: Option<PathBuf>,
    pub timeout: Option<Duration>,
    pub cooldown: Option<Duration>,
    pub no_progress: bool,
}

impl HarnessConfig {
    /// Combine the command line with the `CT_*` environment variables.
    pub fn from_cli(cli: HarnessCli) -> Self {
        let device_policy = match env::var(CT_CPU_HOSTS_ENV) {
            Ok(list) => DevicePolicy::from_list(&list),
            Err(_) => DevicePolicy::default(),
        };
        let make_path = env::var(CT_MAKE_PATH_ENV)
            .ok()
            .filter(|p| !p.is_empty() && p != "make")
            .map(PathBuf::from);

        Self {
            device: cli.device,
            device_policy,
            base_dir: cli.base_dir,
            paes_src: cli.paes_src,
            aes_src: cli.aes_src,
            make_path,
            timeout: cli.timeout.map(Duration::from_secs),
            cooldown: cli.cooldown.map(Duration::from_secs),
            no_progress: cli.no_progress,
        }
    }

    /// A configuration rooted at `base_dir` with the default tool locations, no timeout and no
    /// progress bar.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            device: None,
            device_policy: DevicePolicy::default(),
            paes_src: base_dir.join("..").join("paes"),
            aes_src: base_dir.join("..").join("aes"),
            base_dir,
            make_path: None,
            timeout: None,
            cooldown: None,
            no_progress: true,
        }
    }
}
