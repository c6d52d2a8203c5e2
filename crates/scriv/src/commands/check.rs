//! `scriv check` command implementation.

use std::path::PathBuf;

use clap::Args;
use scriv_config::Config;
use scriv_site::{NavId, NavTree};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Path to configuration file (default: auto-discover scriv.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output (show per-stage logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// Gathers files, builds navigation and tables of contents, and resolves
    /// every page link without writing anything.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;
        let plan = scriv_convertors::site_builder(&config)?.plan()?;

        output.info(&format!(
            "{} files, {} navigation pages, {} tables of contents",
            plan.registry.len(),
            plan.nav.pages().len(),
            plan.tocs.len()
        ));
        if !plan.nav.is_empty() {
            output.highlight("Navigation");
        }
        for line in nav_outline(&plan.nav) {
            output.info(&line);
        }
        output.success("Site is consistent");
        Ok(())
    }
}

/// Indented navigation listing, one line per entry.
fn nav_outline(nav: &NavTree) -> Vec<String> {
    fn walk(nav: &NavTree, ids: &[NavId], depth: usize, lines: &mut Vec<String>) {
        for &id in ids {
            let node = nav.node(id);
            let indent = "  ".repeat(depth);
            match node.file() {
                Some(file) => lines.push(format!("{indent}{} -> {}", node.title(), file.url())),
                None => lines.push(format!("{indent}{}/", node.title())),
            }
            walk(nav, node.children(), depth + 1, lines);
        }
    }

    let mut lines = Vec::new();
    walk(nav, nav.roots(), 0, &mut lines);
    lines
}
