// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use phf::phf_map;

use crate::error::Error;

/// A validated status code in the range `100..=599`.
///
/// IANA: https://www.iana.org/assignments/http-status-codes/http-status-codes.xhtml
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);

    pub fn new(code: u16) -> Result<Self, Error> {
        if (100..=599).contains(&code) {
            Ok(Self(code))
        } else {
            Err(Error::InvalidStatusCode(code))
        }
    }

    #[must_use]
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns the class of this status code.
    #[must_use]
    pub fn class(&self) -> StatusCodeClass {
        match self.0 {
            100..=199 => StatusCodeClass::Informational,
            200..=299 => StatusCodeClass::Success,
            300..=399 => StatusCodeClass::Redirection,
            400..=499 => StatusCodeClass::ClientError,
            _ => StatusCodeClass::ServerError,
        }
    }

    /// The standard reason phrase, if this code has one.
    #[must_use]
    pub fn standard_reason_phrase(&self) -> Option<&'static str> {
        REASON_PHRASES.get(&self.0).copied()
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        Self::OK
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = Error;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::new(code)
    }
}

impl From<StatusCode> for u16 {
    fn from(code: StatusCode) -> Self {
        code.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatusCodeClass {
    /// 1xx: Informational
    Informational,

    /// 2xx: Success
    Success,

    /// 3xx: Redirection
    Redirection,

    /// 4xx: Client Error
    ClientError,

    /// 5xx: Server Error
    ServerError,
}

static REASON_PHRASES: phf::Map<u16, &'static str> = phf_map!(
    100u16 => "Continue",
    101u16 => "Switching Protocols",
    102u16 => "Processing",
    103u16 => "Early Hints",

    200u16 => "OK",
    201u16 => "Created",
    202u16 => "Accepted",
    203u16 => "Non-Authoritative Information",
    204u16 => "No Content",
    205u16 => "Reset Content",
    206u16 => "Partial Content",
    207u16 => "Multi-Status",
    208u16 => "Already Reported",
    226u16 => "IM Used",

    300u16 => "Multiple Choices",
    301u16 => "Moved Permanently",
    302u16 => "Found",
    303u16 => "See Other",
    304u16 => "Not Modified",
    305u16 => "Use Proxy",
    306u16 => "(Unused)",
    307u16 => "Temporary Redirect",
    308u16 => "Permanent Redirect",

    400u16 => "Bad Request",
    401u16 => "Unauthorized",
    402u16 => "Payment Required",
    403u16 => "Forbidden",
    404u16 => "Not Found",
    405u16 => "Method Not Allowed",
    406u16 => "Not Acceptable",
    407u16 => "Proxy Authentication Required",
    408u16 => "Request Timeout",
    409u16 => "Conflict",
    410u16 => "Gone",
    411u16 => "Length Required",
    412u16 => "Precondition Failed",
    413u16 => "Request Entity Too Large",
    414u16 => "Request-URI Too Large",
    415u16 => "Unsupported Media Type",
    416u16 => "Requested Range not satisfiable",
    417u16 => "Expectation Failed",
    418u16 => "I'm a teapot",
    421u16 => "Misdirected Request",
    422u16 => "Unprocessable Entity",
    423u16 => "Locked",
    424u16 => "Failed Dependency",
    425u16 => "Too Early",
    426u16 => "Upgrade Required",
    428u16 => "Precondition Required",
    429u16 => "Too Many Requests",
    431u16 => "Request Header Fields Too Large",
    444u16 => "Connection Closed Without Response",
    451u16 => "Unavailable For Legal Reasons",
    499u16 => "Client Closed Request",

    500u16 => "Internal Server Error",
    501u16 => "Not Implemented",
    502u16 => "Bad Gateway",
    503u16 => "Service Unavailable",
    504u16 => "Gateway Timeout",
    505u16 => "HTTP Version not supported",
    506u16 => "Variant Also Negotiates",
    507u16 => "Insufficient Storage",
    508u16 => "Loop Detected",
    510u16 => "Not Extended",
    511u16 => "Network Authentication Required",
    599u16 => "Network Connect Timeout Error",
);

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use super::*;

    #[rstest]
    #[case(0)]
    #[case(99)]
    #[case(600)]
    #[case(1000)]
    fn test_out_of_range(#[case] code: u16) {
        assert!(matches!(StatusCode::new(code), Err(Error::InvalidStatusCode(c)) if c == code));
    }

    #[rstest]
    #[case(100, StatusCodeClass::Informational)]
    #[case(204, StatusCodeClass::Success)]
    #[case(399, StatusCodeClass::Redirection)]
    #[case(418, StatusCodeClass::ClientError)]
    #[case(599, StatusCodeClass::ServerError)]
    fn test_class(#[case] code: u16, #[case] expected: StatusCodeClass) {
        assert_eq!(StatusCode::new(code).unwrap().class(), expected);
    }

    #[rstest]
    #[case(200, Some("OK"))]
    #[case(306, Some("(Unused)"))]
    #[case(422, Some("Unprocessable Entity"))]
    #[case(599, Some("Network Connect Timeout Error"))]
    #[case(555, None)]
    #[case(299, None)]
    fn test_standard_reason_phrase(#[case] code: u16, #[case] expected: Option<&str>) {
        assert_eq!(StatusCode::new(code).unwrap().standard_reason_phrase(), expected);
    }
}
