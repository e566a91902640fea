use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stowage_core::mode::WizardMode;

#[derive(Debug, Parser)]
#[command(name = "stowage")]
#[command(bin_name = "stowage")]
#[command(version)]
#[command(about = "Terminal wizard for packing, storing and boxing inventory items")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "Write a diagnostics log under ~/.config/stowage/diagnostics"
    )]
    pub diagnostics: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Inventory file to read and update [default: ~/.config/stowage/inventory.toml]"
    )]
    pub inventory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Run the packing wizard")]
    Pack {
        #[arg(
            long,
            value_name = "MODE",
            help = "Skip the chooser: tote-pack, single-pack, store, create-tote, create-self or tote-confirm"
        )]
        mode: Option<WizardMode>,
    },
    #[command(about = "Check config and inventory, and count eligible items")]
    Doctor,
}
