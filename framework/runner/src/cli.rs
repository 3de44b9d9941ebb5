use std::path::PathBuf;

use cipher_tunnel_core::prelude::Device;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(about, long_about = None)]
pub struct HarnessCli {
    /// The device the parallel tool should run on, `cpu` or `gpu`.
    ///
    /// If this is not given then the device is chosen from the host name. Hosts listed in
    /// `CT_CPU_HOSTS` (by default `dijkstra,turing`) use the CPU, every other host uses the GPU.
    #[clap(value_parser = parse_device)]
    pub device: Option<Device>,

    /// The directory that holds the per-run working directory and the `reports` directory.
    #[clap(long, default_value = ".")]
    pub base_dir: PathBuf,

    /// Source directory of the parallel tool. The build is run in this directory.
    #[clap(long, default_value = "../paes")]
    pub paes_src: PathBuf,

    /// Source directory of the reference tool. The build is run in this directory.
    #[clap(long, default_value = "../aes")]
    pub aes_src: PathBuf,

    /// Kill a tool invocation that runs for longer than this many seconds and fail the case.
    ///
    /// By default the harness waits for every invocation to finish, however long it takes.
    #[clap(long)]
    pub timeout: Option<u64>,

    /// Seconds to pause between cases. Overrides the scenario's default.
    #[clap(long)]
    pub cooldown: Option<u64>,

    /// Do not show a progress bar on the CLI.
    ///
    /// This is recommended for CI/CD environments where the progress bar isn't being looked at by anyone and is just adding noise to the logs.
    #[clap(long, default_value = "false")]
    pub no_progress: bool,
}

fn parse_device(s: &str) -> Result<Device, String> {
    s.parse::<Device>()
}
