//! Token replacement in the LaTeX templates.
//!
//! Templates mark substitution points as `%%TOKEN`. The template is split
//! at every `%%` once, up front, so that rendering a letter is a single
//! pass of string concatenation.

use rustc_hash::FxHashMap;

use super::RenderError;

/// Substitution points known to the templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    FromEmailFlag,
    FromEmail,
    FromPhoneFlag,
    FromPhone,
    FromName,
    FromZipCode,
    FromAddress,
    ToAddress,
    Subject,
    Opening,
    Content,
    Closing,
    Signature,
    Font,
}

impl Token {
    pub const ALL: [Token; 14] = [
        Token::FromEmailFlag,
        Token::FromEmail,
        Token::FromPhoneFlag,
        Token::FromPhone,
        Token::FromName,
        Token::FromZipCode,
        Token::FromAddress,
        Token::ToAddress,
        Token::Subject,
        Token::Opening,
        Token::Content,
        Token::Closing,
        Token::Signature,
        Token::Font,
    ];

    /// Name as written in the template, without the `%%` marker.
    pub const fn name(self) -> &'static str {
        match self {
            Token::FromEmailFlag => "FROMEMAILFLAG",
            Token::FromEmail => "FROMEMAIL",
            Token::FromPhoneFlag => "FROMPHONEFLAG",
            Token::FromPhone => "FROMPHONE",
            Token::FromName => "FROMNAME",
            Token::FromZipCode => "FROMZIPCODE",
            Token::FromAddress => "FROMADDRESS",
            Token::ToAddress => "TOADDRESS",
            Token::Subject => "SUBJECT",
            Token::Opening => "OPENING",
            Token::Content => "CONTENT",
            Token::Closing => "CLOSING",
            Token::Signature => "SIGNATURE",
            Token::Font => "FONT",
        }
    }

    /// Longest token name that prefixes `text`.
    ///
    /// `FROMEMAILFLAG` must win over `FROMEMAIL`.
    fn match_prefix(text: &str) -> Option<Token> {
        Self::ALL
            .into_iter()
            .filter(|tok| text.starts_with(tok.name()))
            .max_by_key(|tok| tok.name().len())
    }
}

/// Values to substitute, one per token.
pub type TokenMap = FxHashMap<Token, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Token(Token),
}

/// A template pre-split into literal text and token slots.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    segments: Vec<Segment>,
}

impl Tokenizer {
    pub fn new(template: &str) -> Result<Self, RenderError> {
        let mut parts = template.split("%%");
        let mut segments = Vec::new();

        if let Some(head) = parts.next()
            && !head.is_empty()
        {
            segments.push(Segment::Literal(head.to_string()));
        }

        for part in parts {
            let Some(token) = Token::match_prefix(part) else {
                let near: String = part.chars().take(10).collect();
                return Err(RenderError::UnknownToken(near));
            };
            segments.push(Segment::Token(token));
            let rest = &part[token.name().len()..];
            if !rest.is_empty() {
                segments.push(Segment::Literal(rest.to_string()));
            }
        }

        Ok(Self { segments })
    }

    /// Tokens used by this template, in order of appearance.
    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Token(tok) => Some(*tok),
            Segment::Literal(_) => None,
        })
    }

    /// Substitute every token slot with its value.
    pub fn substitute(&self, values: &TokenMap) -> Result<String, RenderError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Token(tok) => {
                    let value = values
                        .get(tok)
                        .ok_or(RenderError::MissingValue(tok.name()))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}
