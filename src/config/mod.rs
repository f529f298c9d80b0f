//! Configuration management for `hurtigbrief.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [scheduler], [latex], [letter]
//! ├── error          # ConfigError, ConfigDiagnostics
//! ├── util           # config file lookup
//! └── mod.rs         # BriefConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section        | Purpose                                          |
//! |----------------|--------------------------------------------------|
//! | `[scheduler]`  | Debounce heuristic: window sizes and factors     |
//! | `[latex]`      | Compiler command, scratch workspace, output path |
//! | `[letter]`     | Defaults for template, font, opening, sender     |
//!
//! The config is loaded once and handed to the pipeline by value; nothing
//! reads it through global state.

pub mod error;
pub mod section;
mod util;

pub use error::{ConfigDiagnostics, ConfigError};
pub use section::{LatexConfig, LetterConfig, SchedulerConfig};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use util::find_config_file;

use crate::cli::Cli;
use crate::{debug, log};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing hurtigbrief.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BriefConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Debounce scheduler settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// LaTeX compiler settings
    #[serde(default)]
    pub latex: LatexConfig,

    /// Letter defaults
    #[serde(default)]
    pub letter: LetterConfig,
}

impl BriefConfig {
    /// Load configuration for the given CLI invocation.
    ///
    /// Searches upward from cwd for the config file. A missing file is not
    /// an error: every setting has a default.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                debug!("config"; "using {}", path.display());
                let mut config = Self::from_path(&path)?;
                config.config_path = Some(path);
                config
            }
            None => {
                debug!("config"; "no {} found, using defaults", cli.config.display());
                Self::default()
            }
        };

        config.finalize();
        config.validate(cli.command.compiles())?;
        Ok(config)
    }

    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("in {}", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Resolve paths relative to the config file's directory.
    fn finalize(&mut self) {
        let base = self.base_dir();
        if let Some(workspace) = self.latex.workspace.take() {
            self.latex.workspace = Some(crate::utils::path::expand_path(&workspace, &base));
        }
    }

    /// Directory relative paths in the config are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        self.config_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default()
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration, collecting all errors before failing.
    ///
    /// The compiler lookup only matters for commands that compile.
    pub fn validate(&self, needs_compiler: bool) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.scheduler.validate(&mut diag);
        if needs_compiler {
            self.latex.validate(&mut diag);
        }

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config content.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> BriefConfig {
    let (parsed, ignored) = BriefConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}
