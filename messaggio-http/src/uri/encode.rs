// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Percent-encoding of URI components, as described by
//! [RFC 3986 Section 2](https://www.rfc-editor.org/rfc/rfc3986.html#section-2).
//!
//! Characters that are allowed in a component are left as-is, as are valid
//! percent-encoded octets. Everything else is encoded, including a `%` that
//! doesn't start an escape.

use std::borrow::Cow;

use crate::abnf;

/// The characters, next to the unreserved and sub-delims ones, that a
/// component may contain unencoded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Component {
    UserInfo,
    Path,
    QueryOrFragment,
}

impl Component {
    fn allows(&self, byte: u8) -> bool {
        if is_unreserved(byte) || is_sub_delim(byte) {
            return true;
        }

        match self {
            Self::UserInfo => false,
            Self::Path => matches!(byte, b':' | b'@' | b'/'),
            Self::QueryOrFragment => matches!(byte, b':' | b'@' | b'/' | b'?'),
        }
    }
}

/// ```text
/// unreserved    = ALPHA / DIGIT / "-" / "." / "_" / "~"
/// ```
pub(super) fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

/// ```text
/// sub-delims    = "!" / "$" / "&" / "'" / "(" / ")"
///               / "*" / "+" / "," / ";" / "="
/// ```
pub(super) fn is_sub_delim(byte: u8) -> bool {
    matches!(byte, b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'=')
}

pub(super) fn is_escape(bytes: &[u8]) -> bool {
    bytes.len() >= 3
        && bytes[0] == b'%'
        && abnf::is_hex_digit(bytes[1])
        && abnf::is_hex_digit(bytes[2])
}

pub(crate) fn encode(value: &str, component: Component) -> Cow<'_, str> {
    let bytes = value.as_bytes();
    let needs_encoding = bytes.iter()
        .enumerate()
        .any(|(index, byte)| !keeps(bytes, index, *byte, component));
    if !needs_encoding {
        return Cow::Borrowed(value);
    }

    let mut result = String::with_capacity(value.len() + 8);
    let mut index = 0;
    while index < bytes.len() {
        let start = index;
        while index < bytes.len() && !keeps(bytes, index, bytes[index], component) {
            index += 1;
        }

        if start == index {
            result.push(bytes[index] as char);
            index += 1;
        } else {
            result.push_str(&urlencoding::encode_binary(&bytes[start..index]));
        }
    }

    Cow::Owned(result)
}

fn keeps(bytes: &[u8], index: usize, byte: u8, component: Component) -> bool {
    if byte == b'%' {
        is_escape(&bytes[index..])
    } else {
        component.allows(byte)
    }
}
