//! VA Journal CLI - a private journal for text, drawings and audio
//!
//! This is the command-line interface for VA Journal. Entries are encrypted
//! on this machine before they reach the store.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod logging;
mod output;

use clap::Parser;
use vajournal_core::VERSION;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{account, entries, init, journals, maintenance, misc};
use crate::errors::exit_code_for;
use crate::output::print_error;

fn main() {
    logging::init();
    let cli = Cli::parse();
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli) {
        print_error(&e);
        std::process::exit(exit_code_for(&e));
    }
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Init(args)) => init::handle_init(ctx, args),
        Some(Commands::Register(args)) => account::handle_register(ctx, args),
        Some(Commands::Journals { json, no_input }) => {
            journals::handle_journals(ctx, *json, *no_input)
        }
        Some(Commands::CreateJournal { name, no_input }) => {
            journals::handle_create_journal(ctx, name, *no_input)
        }
        Some(Commands::Write(args)) => entries::handle_write(ctx, args),
        Some(Commands::Attach(args)) => entries::handle_attach(ctx, args),
        Some(Commands::Read(args)) => entries::handle_read(ctx, args),
        Some(Commands::Check { decrypt, no_input }) => {
            maintenance::handle_check(ctx, *decrypt, *no_input)
        }
        Some(Commands::Backup { destination, force }) => {
            maintenance::handle_backup(ctx, destination, *force)
        }
        Some(Commands::Completions { shell }) => misc::handle_completions(*shell),
        None => {
            println!("VA Journal v{}", VERSION);
            println!("\nRun `vajournal --help` for usage information.");
            Ok(())
        }
    }
}
