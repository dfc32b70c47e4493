//! Purpose: Provide the JSON decode entrypoints used by the tours and clients.
//! Exports: `from_slice`, `from_str`, `ParseFailureCategory`, `categorize_error`, `decode_error`.
//! Role: Parser boundary that centralizes serde_json usage and failure labelling.
//! Invariants: Category mapping is deterministic for a given serde_json error.
//! Notes: Callsites pick the message so domain context stays explicit.

use serde::de::DeserializeOwned;

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseFailureCategory {
    Syntax,
    Eof,
    Data,
    Io,
}

impl ParseFailureCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseFailureCategory::Syntax => "syntax",
            ParseFailureCategory::Eof => "eof",
            ParseFailureCategory::Data => "data",
            ParseFailureCategory::Io => "io",
        }
    }
}

pub fn from_slice<T: DeserializeOwned>(input: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(input)
}

pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(input)
}

pub fn categorize_error(err: &serde_json::Error) -> ParseFailureCategory {
    use serde_json::error::Category;
    match err.classify() {
        Category::Syntax => ParseFailureCategory::Syntax,
        Category::Eof => ParseFailureCategory::Eof,
        Category::Data => ParseFailureCategory::Data,
        Category::Io => ParseFailureCategory::Io,
    }
}

pub fn decode_error(message: &str, err: serde_json::Error) -> Error {
    let category = categorize_error(&err);
    Error::new(ErrorKind::Decode)
        .with_message(format!("{message} ({} error at line {})", category.as_str(), err.line()))
        .with_source(err)
}
