mod attachments;
mod cli;
mod error;
mod fmt;
mod loader;
mod models;
mod report;
mod settings;
mod tui;

use clap::Parser;

use cli::{AttachmentsCommands, Cli, Commands};

fn main() {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Init {
            source,
            attachments,
        }) => cli::init::run(source, attachments),
        Some(Commands::Report {
            source,
            attachments,
            text,
            output,
        }) => cli::report::run(source, attachments, text, output),
        Some(Commands::Attachments { command }) => match command {
            AttachmentsCommands::List { attachments } => cli::attachments::list(attachments),
            AttachmentsCommands::Save {
                date,
                output,
                attachments,
            } => cli::attachments::save(&date, output, attachments),
        },
        Some(Commands::Status) => cli::status::run(),
        Some(Commands::Completions { shell }) => cli::completions(shell),
        None => cli::report::run(None, None, false, None),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
