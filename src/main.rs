//! hurtigbrief - quick LaTeX letters with a debounced live compile pipeline.

#![allow(dead_code)]

mod cli;
mod config;
mod latex;
mod letter;
mod logger;
mod pipeline;
mod template;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::BriefConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = BriefConfig::load(&cli)?;

    match &cli.command {
        Commands::Render { letter, output } => {
            cli::render::render_letter(letter, output.as_deref(), &config)
        }
        Commands::Watch { letter, output } => {
            cli::watch::watch_letter(letter, output.as_deref(), &config)
        }
        Commands::New { path, force } => cli::new::new_letter(path, *force),
    }
}
