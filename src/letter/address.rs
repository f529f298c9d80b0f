//! German postal addresses.
//!
//! Addresses are written in letter files as a single line,
//! `"STREET NAME XY, PLZ CITY NAME"`, and composed into the lines that end
//! up in the address field of the letter.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Address parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("expected `STREET NUMBER, PLZ CITY`, found `{0}`")]
    Format(String),

    #[error("postal code and city need to be given in `{0}`")]
    MissingCity(String),

    #[error("postal code `{0}` must consist of digits only")]
    InvalidPostalCode(String),
}

/// An address in Germany.
///
/// Street and house number are optional; an address without both is a
/// postal-code-only address (`10178 Berlin`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GermanAddress {
    street: Option<String>,
    number: Option<String>,
    /// Kept as text: German postal codes may start with `0`.
    postal_code: String,
    city: String,
}

impl GermanAddress {
    pub fn new(
        street: Option<&str>,
        number: Option<&str>,
        postal_code: &str,
        city: &str,
    ) -> Result<Self, AddressError> {
        if !postal_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(AddressError::InvalidPostalCode(postal_code.to_string()));
        }
        Ok(Self {
            street: street.map(str::to_string),
            number: number.map(str::to_string),
            postal_code: postal_code.to_string(),
            city: city.to_string(),
        })
    }

    /// Parse an address of the form `STREET NAME XY, PLZ CITY NAME`.
    ///
    /// "STREET NAME" may span multiple words, "XY" is the one-word house
    /// number (recognized by containing a digit), "PLZ" the one-word postal
    /// code and "CITY NAME" the possibly multi-word city. An empty string
    /// gives the empty default address.
    pub fn parse(addr: &str) -> Result<Self, AddressError> {
        let addr = addr.trim();
        if addr.is_empty() {
            return Ok(Self::default());
        }

        let Some((strnum, zipcity)) = addr.split_once(',') else {
            return Err(AddressError::Format(addr.to_string()));
        };
        if zipcity.contains(',') {
            return Err(AddressError::Format(addr.to_string()));
        }

        let words: Vec<_> = strnum.split_whitespace().collect();
        let (street, number) = match words.as_slice() {
            [] => (None, None),
            [single] => (Some(single.to_string()), None),
            [rest @ .., last] if last.chars().any(|c| c.is_ascii_digit()) => {
                (Some(rest.join(" ")), Some(last.to_string()))
            }
            all => (Some(all.join(" ")), None),
        };

        let zipcity: Vec<_> = zipcity.split_whitespace().collect();
        let [postal_code, city @ ..] = zipcity.as_slice() else {
            return Err(AddressError::MissingCity(addr.to_string()));
        };
        if city.is_empty() {
            return Err(AddressError::MissingCity(addr.to_string()));
        }

        Self::new(
            street.as_deref(),
            number.as_deref(),
            postal_code,
            &city.join(" "),
        )
    }

    pub fn is_postal_only(&self) -> bool {
        self.street.is_none() && self.number.is_none()
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// Compose the address lines, optionally with the country line.
    pub fn compose(&self, international: bool) -> Vec<String> {
        let mut lines = Vec::with_capacity(3);

        if !self.is_postal_only() {
            let street = self.street.as_deref().map(format_street);
            let strnum = [street.as_deref(), self.number.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(strnum);
        }

        lines.push(format!("{} {}", self.postal_code, self.city));

        if international {
            lines.push("Germany".to_string());
        }
        lines
    }
}

/// Shorten street names, e.g. `Brandenburger Straße` → `Brandenburger Str.`
pub fn format_street(street: &str) -> String {
    let street = street.trim();
    for suffix in ["strasse", "Strasse", "straße", "Straße"] {
        if let Some(stem) = street.strip_suffix(suffix) {
            return format!("{stem}{}tr.", &suffix[..1]);
        }
    }
    street.to_string()
}

impl fmt::Display for GermanAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.postal_code.is_empty() && self.city.is_empty() && self.is_postal_only() {
            return Ok(());
        }
        let strnum = [self.street.as_deref(), self.number.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "{strnum}, {} {}", self.postal_code, self.city)
    }
}

impl TryFrom<String> for GermanAddress {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GermanAddress> for String {
    fn from(value: GermanAddress) -> Self {
        value.to_string()
    }
}
