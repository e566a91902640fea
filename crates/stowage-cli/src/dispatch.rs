use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, ContentArrangement, Table};
use stowage_app::App;
use stowage_core::doctor::DoctorReport;
use stowage_core::eligibility::{EligibilityRule, RuleCounts};
use stowage_core::mode::WizardMode;
use stowage_tui::WizardExit;

use crate::cli::{Cli, Command};

pub fn run_with_deps(cli: Cli, app: &App, inventory_path: &Path) -> Result<()> {
    match cli.command {
        Command::Doctor => run_doctor_command(app, inventory_path),
        Command::Pack { mode } => run_pack_command(app, inventory_path, mode),
    }
}

fn run_pack_command(app: &App, inventory_path: &Path, mode: Option<WizardMode>) -> Result<()> {
    let config = app.ensure_config_ready()?;
    app.ensure_inventory_ready(inventory_path)?;

    match stowage_tui::run_wizard(app, mode, config.machine_options())? {
        WizardExit::Completed(receipt) => {
            println!("{}", receipt.summary);
            println!("Recorded at {}", receipt.recorded_at);
        }
        WizardExit::Cancelled => println!("Cancelled; nothing was submitted."),
    }

    Ok(())
}

fn run_doctor_command(app: &App, inventory_path: &Path) -> Result<()> {
    let report = app.doctor(inventory_path)?;
    print_doctor_report(&report);
    Ok(())
}

fn print_doctor_report(report: &DoctorReport) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Check", "Status", "Details"]);

    for check in &report.checks {
        table.add_row(vec![
            Cell::new(check.name.as_str()),
            Cell::new(check.state),
            Cell::new(check.details.as_str()),
        ]);
    }

    println!("{table}");
    if let Some(counts) = &report.counts {
        println!("{}", counts_table(counts));
    }
    println!("{}", report.summary());
}

fn counts_table(counts: &RuleCounts) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Rule", "Eligible items"]);

    for rule in EligibilityRule::ALL {
        table.add_row(vec![Cell::new(rule), Cell::new(counts.get(rule))]);
    }
    table.add_row(vec![Cell::new("ineligible"), Cell::new(counts.ineligible)]);
    table
}
