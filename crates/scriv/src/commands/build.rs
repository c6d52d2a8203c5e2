//! `scriv build` command implementation.

use std::path::PathBuf;

use clap::Args;
use scriv_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover scriv.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source directory (overrides config).
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Output directory for the generated site (overrides config).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Base URL links are resolved against (overrides config).
    #[arg(long)]
    base_url: Option<String>,

    /// Enable verbose output (show per-stage logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or any file fails to convert.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            input_dir: self.input_dir,
            output_dir: self.output_dir,
            base_url: self.base_url,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!(
            "Source: {}",
            config.build_resolved.input_dir.display()
        ));
        output.info(&format!(
            "Output: {}",
            config.build_resolved.output_dir.display()
        ));
        if let Some(base_url) = config.base_url() {
            output.info(&format!("Base URL: {base_url}"));
        }

        let builder = scriv_convertors::site_builder(&config)?;
        let summary = builder.build()?;

        output.success(&format!(
            "Built {} files ({} pages) to {}",
            summary.files,
            summary.pages,
            config.build_resolved.output_dir.display()
        ));
        Ok(())
    }
}
