//! Visual design parameters of a letter.

use serde::{Deserialize, Serialize};

pub const DEFAULT_FONT: &str = "lmodern";

/// Style parameters that end up in the LaTeX preamble.
///
/// Changing the design invalidates the cached preamble format; editing the
/// letter text does not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Design {
    /// Font package loaded by the preamble (`\usepackage{<font>}`).
    pub font: String,
}

impl Default for Design {
    fn default() -> Self {
        Self {
            font: DEFAULT_FONT.to_string(),
        }
    }
}
