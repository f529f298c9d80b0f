//! `[letter]` section configuration.
//!
//! Defaults for fields a letter file leaves out.
//!
//! # Example
//!
//! ```toml
//! [letter]
//! template = "scrletter"
//! font = "lmodern"
//! opening = "Moin moin"
//! closing = "Mit freundlichen Grüßen"
//!
//! [letter.sender]
//! name = "Zure Laki"
//! address = "Panoramastraße 1A, 10178 Berlin"
//! email = "muster@keinegueltigeemail.de"
//! ```

use serde::{Deserialize, Serialize};

use crate::letter::Person;
use crate::letter::design::DEFAULT_FONT;
use crate::template::TemplateName;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterConfig {
    pub template: TemplateName,
    pub font: String,
    pub opening: String,
    pub closing: String,
    /// Sender used when a letter file has no `[sender]` table.
    pub sender: Option<Person>,
}

impl Default for LetterConfig {
    fn default() -> Self {
        Self {
            template: TemplateName::ScrLetter,
            font: DEFAULT_FONT.to_string(),
            opening: "Moin moin".to_string(),
            closing: "Mit freundlichen Grüßen".to_string(),
            sender: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_letter_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.letter.opening, "Moin moin");
        assert_eq!(config.letter.closing, "Mit freundlichen Grüßen");
        assert_eq!(config.letter.font, "lmodern");
        assert!(config.letter.sender.is_none());
    }

    #[test]
    fn test_letter_config_sender() {
        let config = test_parse_config(
            "[letter.sender]\nname = \"Zure Laki\"\naddress = \"Panoramastraße 1A, 10178 Berlin\"\nphone = \"(0)30 23125837\"",
        );
        let sender = config.letter.sender.unwrap();
        assert_eq!(sender.name, "Zure Laki");
        assert_eq!(sender.address.postal_code(), "10178");
        assert_eq!(sender.phone.as_deref(), Some("(0)30 23125837"));
    }
}
