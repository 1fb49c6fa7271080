// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Splits a URI reference into its raw components. The components aren't
//! filtered or validated beyond what is needed to find their boundaries.

use crate::error::Error;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct UriParts<'a> {
    pub scheme: Option<&'a str>,
    pub user: Option<&'a str>,
    pub password: Option<&'a str>,
    pub host: Option<&'a str>,
    pub port: Option<u16>,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>,
}

/// ```text
/// scheme        = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
/// ```
fn is_scheme(value: &str) -> bool {
    let mut bytes = value.bytes();
    matches!(bytes.next(), Some(byte) if byte.is_ascii_alphabetic())
        && bytes.all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'+' | b'-' | b'.'))
}

fn parse_port(uri: &str, value: &str) -> Result<Option<u16>, Error> {
    if value.is_empty() {
        return Ok(None);
    }

    if !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(Error::InvalidUri(uri.to_string()));
    }

    value.parse::<u16>()
        .map(Some)
        .map_err(|_| Error::InvalidUri(uri.to_string()))
}

pub(crate) fn parse(uri: &str) -> Result<UriParts<'_>, Error> {
    let mut parts = UriParts::default();

    let mut rest = uri;
    if let Some((before, fragment)) = rest.split_once('#') {
        parts.fragment = Some(fragment);
        rest = before;
    }
    if let Some((before, query)) = rest.split_once('?') {
        parts.query = Some(query);
        rest = before;
    }

    if let Some(colon) = rest.find(':') {
        let (candidate, after) = (&rest[..colon], &rest[colon + 1..]);
        if is_scheme(candidate) {
            let port_end = after.find('/').unwrap_or(after.len());
            let port = &after[..port_end];
            if after.starts_with("//") {
                parts.scheme = Some(candidate);
                rest = &after[2..];
                return parse_authority(uri, rest, parts);
            }

            if !port.is_empty() && port.bytes().all(|byte| byte.is_ascii_digit()) {
                // "example.com:8080/path" has no scheme.
                parts.host = Some(candidate);
                parts.port = parse_port(uri, port)?;
                parts.path = &after[port_end..];
                return Ok(parts);
            }

            parts.scheme = Some(candidate);
            parts.path = after;
            return Ok(parts);
        }
    }

    if let Some(authority) = rest.strip_prefix("//") {
        return parse_authority(uri, authority, parts);
    }

    parts.path = rest;
    Ok(parts)
}

fn parse_authority<'a>(uri: &'a str, rest: &'a str, mut parts: UriParts<'a>) -> Result<UriParts<'a>, Error> {
    let authority_end = rest.find('/').unwrap_or(rest.len());
    let (mut authority, path) = rest.split_at(authority_end);
    parts.path = path;

    if let Some(at) = authority.rfind('@') {
        let user_info = &authority[..at];
        match user_info.split_once(':') {
            Some((user, password)) => {
                parts.user = Some(user);
                parts.password = Some(password);
            }
            None => parts.user = Some(user_info),
        }
        authority = &authority[at + 1..];
    }

    let (host, port) = if authority.starts_with('[') {
        let end = authority.find(']')
            .ok_or_else(|| Error::InvalidUri(uri.to_string()))?;
        let after = &authority[end + 1..];
        let port = match after.strip_prefix(':') {
            Some(port) => port,
            None if after.is_empty() => "",
            None => return Err(Error::InvalidUri(uri.to_string())),
        };
        (&authority[..=end], port)
    } else {
        match authority.rsplit_once(':') {
            Some((host, port)) => (host, port),
            None => (authority, ""),
        }
    };

    if host.is_empty() && parts.scheme.is_some() {
        return Err(Error::InvalidUri(uri.to_string()));
    }

    parts.host = Some(host);
    parts.port = parse_port(uri, port)?;
    Ok(parts)
}
