// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! This module contains HTTP syntax semantics for the parts of a message that
//! are validated on construction: field names, field values, methods and the
//! request-target.
//!
//! # References
//! * [RFC 7230 Section 3.2](https://www.rfc-editor.org/rfc/rfc7230.html#section-3.2)
//! * [RFC 9110](https://www.rfc-editor.org/rfc/rfc9110.html)

use strum_macros::AsRefStr;

use crate::abnf;

/// The reason a piece of a message isn't syntactically valid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, AsRefStr)]
pub enum SyntaxError {
    TokenContainsDelimiter,
    TokenContainsNonVisibleAscii,
    TokenContainsWhitespace,
    TokenEmpty,

    FieldValueContainsInvalidCharacters,
}

/// Validate a field character. Note that in HTTP, UTF-8 is optional (US-ASCII),
/// and isn't used before validating the content.
///
/// ```text
/// field-vchar    = VCHAR / obs-text
/// ```
#[inline]
fn is_field_value_character(byte: u8) -> bool {
    abnf::is_visible_character(byte) || is_obs_text(byte)
}

/// ```text
/// obs-text       = %x80-FF
/// ```
#[inline]
fn is_obs_text(byte: u8) -> bool {
    matches!(byte, 0x80..=0xFF)
}

/// Returns whether or not the character is whitespace according to the HTTP
/// specification. This is in effect just `U+0020 SPACE` and `U+0009 CHARACTER
/// TABULATION`.
///
/// ```text
/// OWS            = *( SP / HTAB )
/// ```
#[inline]
pub fn is_whitespace_character(character: char) -> bool {
    character == ' ' || character == '\t'
}

/// Validates a field value, or a reason phrase, which shares its grammar.
///
/// ```text
/// field-value    = *( field-content / obs-fold )
/// field-content  = field-vchar [ 1*( SP / HTAB ) field-vchar ]
/// reason-phrase  = 1*( HTAB / SP / VCHAR / obs-text )
/// ```
/// Folded lines (`obs-fold`) are deprecated and therefore rejected.
pub fn validate_field_content(value: &[u8]) -> Result<(), SyntaxError> {
    if value.iter().all(|byte| is_field_value_character(*byte) || *byte == b' ' || *byte == b'\t') {
        Ok(())
    } else {
        Err(SyntaxError::FieldValueContainsInvalidCharacters)
    }
}

/// Validates a field value and strips the optional whitespace around it.
pub fn normalize_field_value(value: &str) -> Result<String, SyntaxError> {
    validate_field_content(value.as_bytes())?;
    Ok(value.trim_matches(is_whitespace_character).to_string())
}

/// Validates a token, as used for field names and methods.
///
/// ```text
/// token          = 1*tchar
/// ```
pub fn validate_token(value: &str) -> Result<(), SyntaxError> {
    if value.is_empty() {
        return Err(SyntaxError::TokenEmpty);
    }

    for character in value.bytes() {
        validate_token_character(character)?;
    }

    Ok(())
}

/// Validate a token character.
///
/// ```text
/// tchar          = "!" / "#" / "$" / "%" / "&" / "'" / "*"
///                / "+" / "-" / "." / "^" / "_" / "`" / "|" / "~"
///                / DIGIT / ALPHA
///                ; any VCHAR, except delimiters
/// ```
fn validate_token_character(character: u8) -> Result<(), SyntaxError> {
    match character {
        b' ' | b'\t' => Err(SyntaxError::TokenContainsWhitespace),

        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'^' | b'_' | b'`' | b'|' | b'~' => Ok(()),

        b'0'..=b'9' => Ok(()),
        b'A'..=b'Z' => Ok(()),
        b'a'..=b'z' => Ok(()),

        b'"' | b'(' | b')' | b',' | b'/' | b':' | b';' | b'<' | b'=' | b'>' |
        b'?' | b'@' | b'[' | b'\\' | b']' | b'{' | b'}' => Err(SyntaxError::TokenContainsDelimiter),

        _ => Err(SyntaxError::TokenContainsNonVisibleAscii),
    }
}

/// The request-target is taken verbatim, so the only thing that can't be
/// allowed is whitespace, which would break the request-line.
pub fn is_valid_request_target(value: &str) -> bool {
    !value.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0x00, false)]
    #[case(0x1F, false)]
    #[case(b'A', true)]
    #[case(b'9', true)]
    #[case(0x7F, false)]
    #[case(0xFF, true)]
    fn test_is_field_value_character(#[case] input: u8, #[case] expected: bool) {
        assert_eq!(is_field_value_character(input), expected, "character isn't matching: {}", input);
    }

    #[test]
    fn test_validate_token() {
        assert_eq!(validate_token(""), Err(SyntaxError::TokenEmpty));
        assert_eq!(validate_token("hello"), Ok(()));
        assert_eq!(validate_token("X-Foo_Bar.baz~1"), Ok(()));
        assert_eq!(validate_token(" hello"), Err(SyntaxError::TokenContainsWhitespace));
        assert_eq!(validate_token("hel lo"), Err(SyntaxError::TokenContainsWhitespace));
        assert_eq!(validate_token("Content-Type:"), Err(SyntaxError::TokenContainsDelimiter));
        assert_eq!(validate_token("naïve"), Err(SyntaxError::TokenContainsNonVisibleAscii));
    }

    #[rstest]
    #[case(b' ', Err(SyntaxError::TokenContainsWhitespace))]
    #[case(b'!', Ok(()))]
    #[case(b'"', Err(SyntaxError::TokenContainsDelimiter))]
    #[case(0x00, Err(SyntaxError::TokenContainsNonVisibleAscii))]
    #[case(b'~', Ok(()))]
    #[case(0x7F, Err(SyntaxError::TokenContainsNonVisibleAscii))]
    fn test_validate_token_character(#[case] input: u8, #[case] expected: Result<(), SyntaxError>) {
        assert_eq!(validate_token_character(input), expected);
    }

    #[rstest]
    #[case("text/html", Ok("text/html".to_string()))]
    #[case(" \t text/html \t ", Ok("text/html".to_string()))]
    #[case("a \t b", Ok("a \t b".to_string()))]
    #[case("", Ok(String::new()))]
    #[case("ünïcödé", Ok("ünïcödé".to_string()))]
    #[case("\x00", Err(SyntaxError::FieldValueContainsInvalidCharacters))]
    #[case("foo\r\nbar", Err(SyntaxError::FieldValueContainsInvalidCharacters))]
    #[case("foo\x7Fbar", Err(SyntaxError::FieldValueContainsInvalidCharacters))]
    fn test_normalize_field_value(#[case] input: &str, #[case] expected: Result<String, SyntaxError>) {
        assert_eq!(normalize_field_value(input), expected);
    }

    #[rstest]
    #[case("*", true)]
    #[case("/users?id=foo", true)]
    #[case("https://api.example.com/users", true)]
    #[case("foo bar", false)]
    #[case("foo\tbar", false)]
    #[case("foo\n", false)]
    fn test_is_valid_request_target(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_valid_request_target(input), expected);
    }
}
