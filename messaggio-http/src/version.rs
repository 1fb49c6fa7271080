// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt;

use phf::phf_map;

use crate::error::Error;

/// The protocol versions a message can be stamped with.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProtocolVersion {
    Http10,
    #[default]
    Http11,
    Http2,
}

static VERSIONS: phf::Map<&'static str, ProtocolVersion> = phf_map!(
    "1.0" => ProtocolVersion::Http10,
    "1.1" => ProtocolVersion::Http11,
    "2.0" => ProtocolVersion::Http2,
);

impl ProtocolVersion {
    /// Parses the number part of an HTTP-version, e.g. `1.1`.
    pub fn parse(value: &str) -> Result<Self, Error> {
        VERSIONS.get(value)
            .copied()
            .ok_or_else(|| Error::InvalidProtocolVersion(value.to_string()))
    }

    /// The version number without the `HTTP/` prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http10 => "1.0",
            Self::Http11 => "1.1",
            Self::Http2 => "2.0",
        }
    }

    /// Formats the [`ProtocolVersion`] to a HTTP-Version, as specified by
    /// [RFC 9112 Section 2.3](https://www.rfc-editor.org/rfc/rfc9112.html#name-http-version).
    pub fn to_http_version(&self) -> &'static str {
        match self {
            Self::Http10 => "HTTP/1.0",
            Self::Http11 => "HTTP/1.1",
            Self::Http2 => "HTTP/2.0",
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
