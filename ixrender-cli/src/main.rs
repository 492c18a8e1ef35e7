use clap::Parser;

mod cli;
mod commands;
mod composition;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    cli.global.init_tracing();

    let result = match cli.command {
        Commands::Render(args) => commands::render::execute(args, &cli.global),
    };

    if let Err(error) = result {
        eprintln!("Error: {:#}", error);
        std::process::exit(1);
    }
}
