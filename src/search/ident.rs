use anyhow::Result;

use crate::error::{AppError, ErrorKind};

// sysname is nvarchar(128); anything longer never came out of a real catalog.
const MAX_IDENT_CHARS: usize = 128;

/// Bracket-quote a catalog name for use in an identifier position.
///
/// Every name is quoted, even ones that would be legal bare, so a name like
/// `Order Details` or `weird]name` can never change the shape of a statement.
/// Names that cannot be represented safely (empty, over the sysname length
/// limit, or containing control characters) abort with `InvalidIdentifier`.
pub fn quote_identifier(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("[{}]", name.replace(']', "]]")))
}

pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(AppError::new(ErrorKind::InvalidIdentifier, "Empty identifier").into());
    }
    if name.chars().count() > MAX_IDENT_CHARS {
        return Err(AppError::new(
            ErrorKind::InvalidIdentifier,
            format!(
                "Identifier exceeds {} characters: {:.40}...",
                MAX_IDENT_CHARS, name
            ),
        )
        .into());
    }
    if let Some(ch) = name.chars().find(|ch| ch.is_control()) {
        return Err(AppError::new(
            ErrorKind::InvalidIdentifier,
            format!("Identifier contains control character {:?}", ch),
        )
        .into());
    }
    Ok(())
}

/// Render a catalog name as an `N'...'` literal for the origin labels each
/// sub-query selects alongside the matched value.
pub fn quote_literal(value: &str) -> String {
    format!("N'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{classify_error, ErrorKind};

    #[test]
    fn quotes_plain_names() {
        assert_eq!(quote_identifier("Users").unwrap(), "[Users]");
        assert_eq!(quote_identifier("Order Details").unwrap(), "[Order Details]");
    }

    #[test]
    fn doubles_closing_brackets() {
        assert_eq!(quote_identifier("a]b").unwrap(), "[a]]b]");
        assert_eq!(quote_identifier("]]").unwrap(), "[]]]]]");
    }

    #[test]
    fn rejects_empty_name() {
        let err = quote_identifier("").unwrap_err();
        assert_eq!(classify_error(&err), ErrorKind::InvalidIdentifier);
    }

    #[test]
    fn rejects_oversized_name() {
        let name = "x".repeat(129);
        let err = quote_identifier(&name).unwrap_err();
        assert_eq!(classify_error(&err), ErrorKind::InvalidIdentifier);
    }

    #[test]
    fn accepts_name_at_length_limit() {
        let name = "x".repeat(128);
        assert!(quote_identifier(&name).is_ok());
    }

    #[test]
    fn rejects_control_characters() {
        let err = quote_identifier("a\nb").unwrap_err();
        assert_eq!(classify_error(&err), ErrorKind::InvalidIdentifier);
    }

    #[test]
    fn escapes_literals() {
        assert_eq!(quote_literal("plain"), "N'plain'");
        assert_eq!(quote_literal("O'Brien"), "N'O''Brien'");
    }
}
