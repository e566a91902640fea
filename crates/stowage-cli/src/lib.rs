pub mod cli;
pub mod diagnostics;
pub mod dispatch;

use anyhow::Result;
use clap::Parser;
use stowage_app::App;
use stowage_core::config::resolve_inventory_path;

use crate::cli::Cli;
use crate::diagnostics::DiagnosticsSession;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let diagnostics = DiagnosticsSession::initialize(cli.diagnostics)?;
    if let Some(path) = diagnostics.path() {
        eprintln!("Diagnostics enabled: {}", path.display());
    }

    let inventory_path = match &cli.inventory {
        Some(path) => path.clone(),
        None => resolve_inventory_path()?,
    };
    let app = App::with_inventory(&inventory_path);

    let result = dispatch::run_with_deps(cli, &app, &inventory_path);
    if let Err(error) = &result {
        tracing::error!(error = %format!("{error:#}"), "command failed");
    }
    result
}
