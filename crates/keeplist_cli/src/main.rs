//! `keeplist` command-line front end.
//!
//! Each invocation opens the database, loads one collection, applies at most
//! one mutation (written through before exit) and prints the result.

mod commands;
mod handlers;

use clap::Parser;
use commands::{Cli, Commands};
use keeplist_core::{core_version, default_log_level, init_logging};

fn main() {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let result = match cli.command {
        Commands::Tasks(command) => handlers::handle_tasks(&cli.db, command),
        Commands::Notes(command) => handlers::handle_notes(&cli.db, command),
        Commands::Version => {
            println!("keeplist_core {}", core_version());
            Ok(())
        }
    };

    if let Err(err) = result {
        log::error!("event=cli_command module=cli status=error error={err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
