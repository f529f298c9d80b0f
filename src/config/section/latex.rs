//! `[latex]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [latex]
//! command = "pdflatex"          # compiler binary (looked up on PATH)
//! workspace = "~/.cache/hb"     # fixed scratch directory (default: private temp dir)
//! output = "out/letter.pdf"     # where finished PDFs go (default: next to the letter)
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatexConfig {
    /// Compiler binary, must support `-ini` format dumping.
    pub command: String,

    /// Scratch directory reused across compiles.
    pub workspace: Option<PathBuf>,

    /// Destination of the compiled PDF, relative to the letter file.
    pub output: Option<PathBuf>,
}

impl Default for LatexConfig {
    fn default() -> Self {
        Self {
            command: "pdflatex".to_string(),
            workspace: None,
            output: None,
        }
    }
}

impl LatexConfig {
    /// Validate that the compiler is usable.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.command.trim().is_empty() {
            diag.error("latex.command", "compiler command must not be empty");
            return;
        }
        if which::which(&self.command).is_err() {
            diag.error_with_hint(
                "latex.command",
                format!("`{}` not found in PATH", self.command),
                "install a TeX distribution (e.g. TeX Live) or set `latex.command`",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_latex_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.latex.command, "pdflatex");
        assert_eq!(config.latex.workspace, None);
        assert_eq!(config.latex.output, None);
    }

    #[test]
    fn test_latex_config_override() {
        let config = test_parse_config(
            "[latex]\ncommand = \"lualatex\"\nworkspace = \"/tmp/hb\"\noutput = \"out.pdf\"",
        );
        assert_eq!(config.latex.command, "lualatex");
        assert_eq!(config.latex.workspace, Some(PathBuf::from("/tmp/hb")));
        assert_eq!(config.latex.output, Some(PathBuf::from("out.pdf")));
    }

    #[test]
    fn test_latex_config_missing_command() {
        let config = LatexConfig {
            command: "hurtigbrief-no-such-latex".into(),
            ..LatexConfig::default()
        };
        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        assert_eq!(diag.errors().len(), 1);
        assert!(diag.errors()[0].message.contains("not found"));

        let empty = LatexConfig {
            command: " ".into(),
            ..LatexConfig::default()
        };
        let mut diag = ConfigDiagnostics::new();
        empty.validate(&mut diag);
        assert!(diag.errors()[0].message.contains("must not be empty"));
    }
}
