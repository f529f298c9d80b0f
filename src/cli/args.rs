//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Quick LaTeX letters from a TOML description
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file name, searched upward from the current directory
    #[arg(short = 'C', long, default_value = "hurtigbrief.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compile a letter once
    #[command(visible_alias = "r")]
    Render {
        /// Letter description (TOML)
        #[arg(value_hint = clap::ValueHint::FilePath)]
        letter: PathBuf,

        /// PDF destination (default: next to the letter)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Recompile a letter whenever it is saved
    #[command(visible_alias = "w")]
    Watch {
        /// Letter description (TOML)
        #[arg(value_hint = clap::ValueHint::FilePath)]
        letter: PathBuf,

        /// PDF destination (default: next to the letter)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Write a sample letter to start from
    #[command(visible_alias = "n")]
    New {
        /// Where to create the letter
        #[arg(default_value = "letter.toml", value_hint = clap::ValueHint::FilePath)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

impl Commands {
    /// Whether the command runs the LaTeX compiler.
    pub const fn compiles(&self) -> bool {
        matches!(self, Self::Render { .. } | Self::Watch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_watch() {
        let cli = Cli::try_parse_from(["hurtigbrief", "-V", "watch", "brief.toml", "-o", "out.pdf"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("hurtigbrief.toml"));
        match cli.command {
            Commands::Watch { letter, output } => {
                assert_eq!(letter, PathBuf::from("brief.toml"));
                assert_eq!(output, Some(PathBuf::from("out.pdf")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_new_defaults() {
        let cli = Cli::try_parse_from(["hurtigbrief", "new"]).unwrap();
        assert!(!cli.command.compiles());
        match cli.command {
            Commands::New { path, force } => {
                assert_eq!(path, PathBuf::from("letter.toml"));
                assert!(!force);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_render_compiles() {
        let cli = Cli::try_parse_from(["hurtigbrief", "r", "brief.toml"]).unwrap();
        assert!(cli.command.compiles());
    }

    #[test]
    fn test_missing_letter_rejected() {
        assert!(Cli::try_parse_from(["hurtigbrief", "render"]).is_err());
    }
}
