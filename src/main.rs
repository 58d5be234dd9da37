use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use rulebot::cli::commands;
use rulebot::config::{Paths, Settings};
use rulebot::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {e}", "error".red().bold());
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = Paths::new()
        .and_then(|paths| Settings::load(&paths))
        .unwrap_or_default();
    if settings.general.no_color {
        colored::control::set_override(false);
    }
    let format = cli.output.unwrap_or(settings.general.default_output);

    let output = match cli.command {
        Commands::Check { file } => commands::check(&file, format)?,
        Commands::Fmt { file, write } => commands::fmt(&file, write)?,
        Commands::List { dir } => commands::list(dir, format)?,
    };
    println!("{output}");
    Ok(())
}
