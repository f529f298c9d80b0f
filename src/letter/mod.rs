//! Letter model and the letter file format.
//!
//! A letter file is a small TOML document:
//!
//! ```toml
//! subject = "Über die Anhörung"
//! body = "..."
//!
//! [sender]
//! name = "Max Mustermann"
//! address = "Panoramastraße 1A, 10178 Berlin"
//!
//! [recipient]
//! name = "Maxi Muster"
//! address = "Alte Post 4, 18055 Rostock"
//! ```
//!
//! Template, font, opening, closing and sender fall back to the `[letter]`
//! section of `hurtigbrief.toml` when omitted.

pub mod address;
pub mod design;
pub mod person;

pub use address::{AddressError, GermanAddress};
pub use design::Design;
pub use person::Person;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::config::LetterConfig;
use crate::log;
use crate::pipeline::CompileRequest;
use crate::template::TemplateName;

/// A sample letter, written by `hurtigbrief new`.
pub const SAMPLE_LETTER: &str = include_str!("sample.toml");

/// Letter file errors.
#[derive(Debug, Error)]
pub enum LetterError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("letter file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("no sender given: add a [sender] table or set [letter.sender] in the config")]
    MissingSender,
}

/// A letter, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Letter {
    pub sender: Person,
    pub recipient: Person,
    pub subject: String,
    pub opening: String,
    pub body: String,
    pub closing: String,
    pub signature: Option<String>,
}

/// On-disk representation of a letter.
#[derive(Debug, Clone, Deserialize)]
pub struct LetterFile {
    pub template: Option<TemplateName>,
    #[serde(default)]
    pub subject: String,
    pub opening: Option<String>,
    #[serde(default)]
    pub body: String,
    pub closing: Option<String>,
    pub signature: Option<String>,
    pub font: Option<String>,
    pub sender: Option<Person>,
    pub recipient: Person,
}

impl LetterFile {
    /// Read and parse a letter file, warning about unknown keys.
    pub fn load(path: &Path) -> Result<Self, LetterError> {
        let content =
            fs::read_to_string(path).map_err(|err| LetterError::Io(path.to_path_buf(), err))?;
        let (letter, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            log!("warning"; "ignoring unknown fields in {}: {}", path.display(), ignored.join(", "));
        }
        Ok(letter)
    }

    /// Parse TOML content, collecting any unknown fields.
    pub fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), LetterError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let letter = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((letter, ignored))
    }

    /// Fill in defaults and build the compile request snapshot.
    pub fn into_request(self, defaults: &LetterConfig) -> Result<CompileRequest, LetterError> {
        let sender = self
            .sender
            .or_else(|| defaults.sender.clone())
            .ok_or(LetterError::MissingSender)?;

        let letter = Letter {
            sender,
            recipient: self.recipient,
            subject: self.subject,
            opening: self.opening.unwrap_or_else(|| defaults.opening.clone()),
            body: self.body,
            closing: self.closing.unwrap_or_else(|| defaults.closing.clone()),
            signature: self.signature,
        };
        let design = Design {
            font: self.font.unwrap_or_else(|| defaults.font.clone()),
        };

        Ok(CompileRequest::new(
            letter,
            self.template.unwrap_or(defaults.template),
            design,
        ))
    }
}
