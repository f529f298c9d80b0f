//! Pipeline message definitions.
//!
//! ```text
//! submit(CompileRequest) --Job--> DebounceGate --Job--> CoalescingQueue
//!     --Job--> worker loop --CompileEvent--> observers
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::letter::{Design, Letter};
use crate::template::{RenderError, TemplateName};

// =============================================================================
// Requests
// =============================================================================

/// Snapshot of the document state at one edit.
///
/// Never mutated; a later request supersedes it as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    pub letter: Letter,
    pub template: TemplateName,
    pub design: Design,
}

impl CompileRequest {
    pub fn new(letter: Letter, template: TemplateName, design: Design) -> Self {
        Self {
            letter,
            template,
            design,
        }
    }
}

/// Sequence number handed out by `submit`, in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A request travelling through the pipeline.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub request: CompileRequest,
}

// =============================================================================
// Errors
// =============================================================================

/// Everything that can go wrong while running one job.
///
/// None of these stop the worker loop; they become failed results.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("template rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("LaTeX error in preamble")]
    Initialization { diagnostic: String },

    #[error("compiling the LaTeX document failed")]
    Compilation { diagnostic: String },

    #[error("could not write `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("could not copy the PDF to `{0}`")]
    Delivery(PathBuf, #[source] std::io::Error),

    #[error("compile job panicked: {0}")]
    Panicked(String),
}

impl CompileError {
    /// Compiler output or underlying cause, for display below the summary.
    pub fn detail(&self) -> String {
        match self {
            Self::Initialization { diagnostic } | Self::Compilation { diagnostic } => {
                diagnostic.clone()
            }
            Self::Io(_, err) | Self::Delivery(_, err) => err.to_string(),
            Self::Render(_) | Self::Panicked(_) => String::new(),
        }
    }
}

// =============================================================================
// Results
// =============================================================================

#[derive(Debug)]
pub enum CompileOutcome {
    Success(PathBuf),
    Failed(CompileError),
}

impl From<Result<PathBuf, CompileError>> for CompileOutcome {
    fn from(result: Result<PathBuf, CompileError>) -> Self {
        match result {
            Ok(path) => Self::Success(path),
            Err(err) => Self::Failed(err),
        }
    }
}

/// Result of one started job. Superseded jobs never get one.
#[derive(Debug)]
pub struct CompileResult {
    pub job: JobId,
    pub outcome: CompileOutcome,
    pub elapsed: Duration,
}

impl CompileResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, CompileOutcome::Success(_))
    }

    pub fn artifact(&self) -> Option<&Path> {
        match &self.outcome {
            CompileOutcome::Success(path) => Some(path),
            CompileOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&CompileError> {
        match &self.outcome {
            CompileOutcome::Success(_) => None,
            CompileOutcome::Failed(err) => Some(err),
        }
    }
}

/// Notifications published by the worker loop.
#[derive(Debug)]
pub enum CompileEvent {
    /// Measured wall time of a job, sent before its result.
    CompileTime { job: JobId, elapsed: Duration },
    /// The job completed, successfully or not.
    Finished(CompileResult),
}
