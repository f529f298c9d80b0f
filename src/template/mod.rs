//! Template rendering: letter + design → LaTeX preamble and body.
//!
//! Rendering is a pure function. The preamble depends on the design only,
//! which is what makes it cacheable as a precompiled format.

pub mod scrletter;
pub mod tokenize;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::CompileRequest;

/// Template rendering errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("could not substitute token starting with `%%{0}`")]
    UnknownToken(String),

    #[error("no value for template token `%%{0}`")]
    MissingValue(&'static str),
}

/// Available letter templates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateName {
    #[default]
    #[serde(rename = "scrletter")]
    ScrLetter,
}

impl TemplateName {
    pub const fn as_str(self) -> &'static str {
        match self {
            TemplateName::ScrLetter => "scrletter",
        }
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scrletter" => Ok(TemplateName::ScrLetter),
            other => Err(format!("unknown template `{other}`")),
        }
    }
}

/// Compiler source text produced by a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Content-invariant part, precompiled into a format file.
    pub preamble: String,
    /// Per-request part, compiled against the format.
    pub body: String,
}

/// Turns a compile request into compiler source text.
pub trait Renderer: Send {
    fn render(&self, request: &CompileRequest) -> Result<Rendered, RenderError>;
}

impl<F> Renderer for F
where
    F: Fn(&CompileRequest) -> Result<Rendered, RenderError> + Send,
{
    fn render(&self, request: &CompileRequest) -> Result<Rendered, RenderError> {
        self(request)
    }
}

/// Renders requests with the built-in templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRenderer;

impl Renderer for TemplateRenderer {
    fn render(&self, request: &CompileRequest) -> Result<Rendered, RenderError> {
        match request.template {
            TemplateName::ScrLetter => scrletter::render(&request.letter, &request.design),
        }
    }
}
