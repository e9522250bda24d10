//! FIP CLI - render the Peru financial inclusion dashboard views as JSON.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "fip-cli",
    version,
    about = "Peru financial inclusion dashboard toolkit"
)]
struct Cli {
    /// Directory holding the an10/rep4b2/an03 files and the boundaries
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// JSON config file; --data-dir overrides its data_dir
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: fip_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = fip_cmd::load_config(cli.config.as_deref(), cli.data_dir)?;
    fip_cmd::run(cli.command, &config)
}
