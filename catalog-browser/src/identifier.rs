//! Identifier validation
//!
//! Table, column and schema names arrive from request paths and from the
//! database catalog. Identifiers cannot be bound as query parameters, so every
//! name that ends up in SQL text must first pass through [`validate`].

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Longest identifier accepted, matching PostgreSQL's `NAMEDATALEN - 1`
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

/// A name that matched the identifier grammar and may be quoted into SQL
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SafeIdentifier(String);

/// Why a name was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid identifier {name:?}: {reason}")]
pub struct InvalidIdentifier {
    /// The rejected input, verbatim
    pub name: String,

    /// Human readable rejection reason
    pub reason: &'static str,
}

/// Validate a raw table, column or schema name
///
/// Accepted grammar: an ASCII letter or underscore, followed by ASCII letters,
/// digits or underscores, at most [`MAX_IDENTIFIER_LENGTH`] characters in
/// total. Quotes, whitespace, statement separators and comment markers can
/// never match.
///
/// # Example
///
/// ```
/// use catalog_browser::identifier::validate;
///
/// let table = validate("orders").unwrap();
/// assert_eq!(table.quoted(), "\"orders\"");
/// assert!(validate("orders; DROP TABLE users").is_err());
/// ```
pub fn validate(name: &str) -> Result<SafeIdentifier, InvalidIdentifier> {
    let reject = |reason| InvalidIdentifier {
        name: name.to_string(),
        reason,
    };

    let mut characters = name.chars();
    let first = characters.next().ok_or_else(|| reject("identifier is empty"))?;

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(reject("identifier exceeds 63 characters"));
    }

    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(reject("identifier must start with a letter or underscore"));
    }

    if !characters.all(|character| character.is_ascii_alphanumeric() || character == '_') {
        return Err(reject(
            "identifier may only contain letters, digits and underscores",
        ));
    }

    Ok(SafeIdentifier(name.to_string()))
}

impl SafeIdentifier {
    /// Wrap a compile-time name that is known to match the grammar
    pub(crate) fn from_static(name: &'static str) -> Self {
        debug_assert!(validate(name).is_ok(), "{name:?} is not a valid identifier");
        SafeIdentifier(name.to_string())
    }

    /// The original, unquoted name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted form for substitution into SQL text
    ///
    /// The grammar already excludes `"`, but embedded quotes are still doubled
    /// so the quoting rule holds on its own.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0.replace('"', "\"\""))
    }
}

impl fmt::Display for SafeIdentifier {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}
