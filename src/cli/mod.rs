//! Command-line interface module.

mod args;
pub mod new;
pub mod render;
pub mod watch;

pub use args::{Cli, Commands};

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::BriefConfig;
use crate::latex::{LatexBackend, Workspace};
use crate::pipeline::CompileWorker;
use crate::template::TemplateRenderer;
use crate::utils::path::expand_path;

/// Where the PDF of `letter` goes.
///
/// `--output` wins over `[latex] output`, which is relative to the letter.
/// Without either, the PDF lands next to the letter with the same stem.
pub fn resolve_output(letter: &Path, cli_output: Option<&Path>, config: &BriefConfig) -> PathBuf {
    if let Some(output) = cli_output {
        return output.to_path_buf();
    }
    match &config.latex.output {
        Some(output) => {
            let base = letter.parent().unwrap_or_else(|| Path::new(""));
            expand_path(output, base)
        }
        None => letter.with_extension("pdf"),
    }
}

/// Worker with the LaTeX backend and its workspace, delivering to `output`.
pub fn build_worker(config: &BriefConfig, output: PathBuf) -> Result<CompileWorker> {
    let workspace = Workspace::create(config.latex.workspace.as_deref())?;
    Ok(CompileWorker::new(
        TemplateRenderer,
        LatexBackend::new(&config.latex),
        workspace,
    )
    .with_output(Some(output)))
}
