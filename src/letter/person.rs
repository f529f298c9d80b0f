//! Sender and recipient of a letter.

use serde::{Deserialize, Serialize};

use super::address::GermanAddress;

/// A (juridical) person with a postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub address: GermanAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Person {
    pub fn new(name: impl Into<String>, address: GermanAddress) -> Self {
        Self {
            name: name.into(),
            address,
            email: None,
            phone: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Compose name and address lines, separated by LaTeX line breaks.
    pub fn compose_address(&self) -> String {
        std::iter::once(self.name.clone())
            .chain(self.address.compose(false))
            .collect::<Vec<_>>()
            .join("\\\\")
    }
}
