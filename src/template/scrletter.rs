//! KOMA-Script letter template (`scrlttr2`).

use std::sync::LazyLock;

use super::tokenize::{Token, TokenMap, Tokenizer};
use super::{RenderError, Rendered};
use crate::letter::{Design, Letter};

const PREAMBLE_TEMPLATE: &str = include_str!("data/scrletter-preamble.tex");
const BODY_TEMPLATE: &str = include_str!("data/scrletter.tex");

struct Templates {
    preamble: Tokenizer,
    body: Tokenizer,
}

static TEMPLATES: LazyLock<Result<Templates, RenderError>> = LazyLock::new(|| {
    Ok(Templates {
        preamble: Tokenizer::new(PREAMBLE_TEMPLATE)?,
        body: Tokenizer::new(BODY_TEMPLATE)?,
    })
});

/// Render a letter into `(preamble, body)` LaTeX source.
pub fn render(letter: &Letter, design: &Design) -> Result<Rendered, RenderError> {
    let templates = TEMPLATES.as_ref().map_err(Clone::clone)?;
    let values = token_map(letter, design);

    Ok(Rendered {
        preamble: templates.preamble.substitute(&values)?,
        body: templates.body.substitute(&values)?,
    })
}

fn token_map(letter: &Letter, design: &Design) -> TokenMap {
    let sender = &letter.sender;
    let mut map = TokenMap::default();

    let (email_flag, email) = optional_field(sender.email.as_deref());
    map.insert(Token::FromEmailFlag, email_flag);
    map.insert(Token::FromEmail, email);

    let (phone_flag, phone) = optional_field(sender.phone.as_deref());
    map.insert(Token::FromPhoneFlag, phone_flag);
    map.insert(Token::FromPhone, phone);

    map.insert(Token::FromName, sender.name.clone());
    map.insert(Token::FromZipCode, sender.address.postal_code().to_string());
    map.insert(Token::FromAddress, sender.address.compose(false).join("\\\\"));
    map.insert(Token::ToAddress, letter.recipient.compose_address());

    map.insert(Token::Subject, letter.subject.clone());
    map.insert(Token::Opening, opening(&letter.opening));
    map.insert(Token::Content, letter.body.clone());
    map.insert(Token::Closing, letter.closing.clone());
    map.insert(
        Token::Signature,
        letter.signature.clone().unwrap_or_else(|| sender.name.clone()),
    );

    map.insert(Token::Font, design.font.clone());
    map
}

/// KOMA option flag plus value for an optional sender field.
fn optional_field(value: Option<&str>) -> (String, String) {
    match value {
        Some(v) => ("true".to_string(), v.to_string()),
        None => ("false".to_string(), String::new()),
    }
}

/// The opening always ends with a comma.
fn opening(text: &str) -> String {
    let text = text.trim_end();
    if text.is_empty() || text.ends_with(',') {
        text.to_string()
    } else {
        format!("{text},")
    }
}
