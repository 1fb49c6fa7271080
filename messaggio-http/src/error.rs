// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt;

use strum_macros::AsRefStr;

pub use messaggio_resources::ErrorKind;
use messaggio_resources::{StreamError, UploadError};

use crate::syntax::SyntaxError;

/// An error that can occur while constructing or transforming a message.
#[derive(Debug, AsRefStr)]
pub enum Error {
    InvalidHeaderName {
        name: String,
        reason: SyntaxError,
    },

    InvalidHeaderValue {
        name: String,
        reason: SyntaxError,
    },

    /// An empty list of values was given for a header.
    EmptyHeaderValues(String),

    InvalidMethod {
        method: String,
        reason: SyntaxError,
    },

    /// The protocol version isn't one of `1.0`, `1.1` and `2.0`.
    InvalidProtocolVersion(String),

    /// The status code isn't in the range `100..=599`.
    InvalidStatusCode(u16),

    InvalidReasonPhrase(String),

    /// The request-target contains whitespace.
    InvalidRequestTarget(String),

    /// The port is not in the range `0..=65535`.
    InvalidPort(u32),

    /// The URI couldn't be parsed.
    InvalidUri(String),

    /// The host is neither a registered name nor an IP literal.
    InvalidHost(String),

    UnsupportedScheme(String),

    /// The parsed body is neither an array, an object nor absent.
    InvalidParsedBody,

    Stream(StreamError),
    Upload(UploadError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Stream(error) => error.kind(),
            Self::Upload(error) => error.kind(),
            _ => ErrorKind::InvalidArgument,
        }
    }
}

impl From<StreamError> for Error {
    fn from(error: StreamError) -> Self {
        Error::Stream(error)
    }
}

impl From<UploadError> for Error {
    fn from(error: UploadError) -> Self {
        Error::Upload(error)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHeaderName { name, reason } => write!(f, "header name \"{}\" is not an RFC 7230 token: {}", name.escape_debug(), reason.as_ref()),
            Self::InvalidHeaderValue { name, reason } => write!(f, "value of header \"{}\" is not an RFC 7230 field-value: {}", name.escape_debug(), reason.as_ref()),
            Self::EmptyHeaderValues(name) => write!(f, "header \"{name}\" must have at least one value"),
            Self::InvalidMethod { method, reason } => write!(f, "unsupported HTTP method \"{}\": {}", method.escape_debug(), reason.as_ref()),
            Self::InvalidProtocolVersion(version) => write!(f, "invalid HTTP version \"{}\", must be one of: 1.0, 1.1, 2.0", version.escape_debug()),
            Self::InvalidStatusCode(code) => write!(f, "invalid HTTP status code {code}"),
            Self::InvalidReasonPhrase(phrase) => write!(f, "invalid reason phrase \"{}\"", phrase.escape_debug()),
            Self::InvalidRequestTarget(target) => write!(f, "the request target \"{}\" cannot contain whitespace", target.escape_debug()),
            Self::InvalidPort(port) => write!(f, "invalid port {port}, must be between 0 and 65535"),
            Self::InvalidUri(uri) => write!(f, "unable to parse URI \"{}\"", uri.escape_debug()),
            Self::InvalidHost(host) => write!(f, "invalid URI host \"{}\"", host.escape_debug()),
            Self::UnsupportedScheme(scheme) => write!(f, "URI scheme \"{}\" must be one of: \"http\", \"https\"", scheme.escape_debug()),
            Self::InvalidParsedBody => f.write_str("the parsed body must be an array, an object or absent"),
            Self::Stream(error) => error.fmt(f),
            Self::Upload(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Stream(error) => Some(error),
            Self::Upload(error) => Some(error),
            _ => None,
        }
    }
}
