//! Command implementations for the financial inclusion CLI.
//!
//! Every command loads the catalog from the configured data directory and
//! prints JSON to stdout.

use anyhow::Context;
use clap::{Args, Subcommand};
use fip_core::config::Config;
use fip_core::Period;
use fip_db::Catalog;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub mod inspect;
pub mod render;

#[derive(Subcommand)]
pub enum Command {
    /// List the selectable periods
    Periods,

    /// Print every dashboard view for one selection
    Render {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Print a single dashboard view
    View {
        /// View name, e.g. sum_deposits or map_loans
        name: String,

        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Load every input and report how the boundaries matched the data
    Check,
}

/// Period and toggle flags shared by the rendering commands.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Month to show (YYYY-MM); defaults to the earliest available
    #[arg(short, long)]
    pub period: Option<Period>,

    /// Leave LIMA out of the summary cards and maps
    #[arg(long)]
    pub exclude_lima: bool,

    /// Keep personal/mortgage loans in the industry charts
    #[arg(long)]
    pub include_personal_loans: bool,
}

/// Read the optional JSON config file and apply the `--data-dir` override.
pub fn load_config(path: Option<&Path>, data_dir: Option<PathBuf>) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(dir) = data_dir {
        config.data.data_dir = dir;
    }
    Ok(config)
}

pub fn load_catalog(config: &Config) -> anyhow::Result<Catalog> {
    Catalog::load(&config.data).with_context(|| {
        format!(
            "Failed to load datasets from {}",
            config.data.data_dir.display()
        )
    })
}

pub fn run(command: Command, config: &Config) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match command {
        Command::Periods => inspect::run_periods(config, &mut out)?,
        Command::Render { selection } => render::run_render(config, &selection, &mut out)?,
        Command::View { name, selection } => {
            render::run_view(config, &name, &selection, &mut out)?
        }
        Command::Check => inspect::run_check(config, &mut out)?,
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn fixture_config() -> Config {
        let mut config = Config::default();
        config.data.data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../fixtures");
        config
    }

    #[test]
    fn data_dir_flag_overrides_default() {
        let config = load_config(None, Some(PathBuf::from("/srv/fip"))).unwrap();
        assert_eq!(config.data.data_dir, PathBuf::from("/srv/fip"));
        assert_eq!(config.data.deposits_file, "an10_final.dsv");
    }

    #[test]
    fn data_dir_flag_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fip.json");
        std::fs::write(
            &path,
            r#"{"data": {"data_dir": "/from/file"}, "dashboard": {"excluded_region": "CALLAO"}}"#,
        )
        .unwrap();

        let config = load_config(Some(&path), None).unwrap();
        assert_eq!(config.data.data_dir, PathBuf::from("/from/file"));
        assert_eq!(config.dashboard.excluded_region, "CALLAO");

        let config = load_config(Some(&path), Some(PathBuf::from("/from/flag"))).unwrap();
        assert_eq!(config.data.data_dir, PathBuf::from("/from/flag"));
    }

    #[test]
    fn missing_config_file_names_the_path() {
        let err = load_config(Some(Path::new("/nonexistent/fip.json")), None).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/fip.json"));
    }

    #[test]
    fn missing_data_dir_fails_with_context() {
        let mut config = Config::default();
        config.data.data_dir = PathBuf::from("/nonexistent/data");
        let err = load_catalog(&config).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/data"));
    }
}
