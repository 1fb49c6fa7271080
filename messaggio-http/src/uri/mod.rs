// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! The [`Uri`] value type.
//!
//! # References
//! * [RFC 3986](https://www.rfc-editor.org/rfc/rfc3986.html)

mod encode;
mod parse;

use std::{
    fmt::{self, Write},
    net::Ipv6Addr,
    str::FromStr,
    sync::Arc,
};

use phf::phf_map;

use crate::error::Error;

use self::encode::{encode, is_escape, is_sub_delim, is_unreserved, Component};

/// The supported schemes with their default ports.
static SCHEMES: phf::Map<&'static str, u16> = phf_map!(
    "http" => 80,
    "https" => 443,
);

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
struct UriState {
    scheme: String,
    user_info: String,
    host: String,
    port: Option<u16>,
    path: String,
    query: String,
    fragment: String,
}

/// An immutable URI. Every component is stored filtered and percent-encoded,
/// so the string form is always a valid URI.
///
/// Cloning a [`Uri`] is cheap, and transformations that wouldn't change
/// anything return a handle to the same URI, see [`Uri::ptr_eq`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Uri {
    state: Arc<UriState>,
}

impl Uri {
    /// Parses a URI reference. The empty string is the empty URI.
    pub fn parse(uri: &str) -> Result<Self, Error> {
        if uri.is_empty() {
            return Ok(Self::default());
        }

        let parts = parse::parse(uri)?;
        let scheme = match parts.scheme {
            Some(scheme) => filter_scheme(scheme)?,
            None => String::new(),
        };

        let mut user_info = parts.user
            .map(|user| encode(user, Component::UserInfo).into_owned())
            .unwrap_or_default();
        if let Some(password) = parts.password {
            user_info.push(':');
            user_info.push_str(&encode(password, Component::UserInfo));
        }

        let host = match parts.host {
            Some(host) => filter_host(host).ok_or_else(|| Error::InvalidUri(uri.to_string()))?,
            None => String::new(),
        };

        let port = filter_port(&scheme, parts.port.map(u32::from))?;
        Ok(Self {
            state: Arc::new(UriState {
                user_info,
                host,
                port,
                path: encode(parts.path, Component::Path).into_owned(),
                query: parts.query.map(|query| encode(query, Component::QueryOrFragment).into_owned()).unwrap_or_default(),
                fragment: parts.fragment.map(|fragment| encode(fragment, Component::QueryOrFragment).into_owned()).unwrap_or_default(),
                scheme,
            }),
        })
    }

    /// Returns whether or not both handles refer to the same URI instance.
    pub fn ptr_eq(&self, other: &Uri) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    pub fn scheme(&self) -> &str {
        &self.state.scheme
    }

    /// The `[userinfo@]host[:port]` part of the URI.
    pub fn authority(&self) -> String {
        let mut authority = String::new();
        if !self.state.user_info.is_empty() {
            authority.push_str(&self.state.user_info);
            authority.push('@');
        }
        authority.push_str(&self.state.host);
        if let Some(port) = self.state.port {
            _ = write!(authority, ":{port}");
        }
        authority
    }

    pub fn user_info(&self) -> &str {
        &self.state.user_info
    }

    pub fn host(&self) -> &str {
        &self.state.host
    }

    /// The port, absent when it is the default port of the scheme.
    pub fn port(&self) -> Option<u16> {
        self.state.port
    }

    pub fn path(&self) -> &str {
        &self.state.path
    }

    pub fn query(&self) -> &str {
        &self.state.query
    }

    pub fn fragment(&self) -> &str {
        &self.state.fragment
    }

    /// Changes the scheme, which must be `http` or `https`. The port is
    /// dropped when it is the default port of the new scheme.
    pub fn with_scheme(&self, scheme: &str) -> Result<Self, Error> {
        let scheme = filter_scheme(scheme)?;
        if scheme == self.state.scheme {
            return Ok(self.clone());
        }

        let port = filter_port(&scheme, self.state.port.map(u32::from))?;
        Ok(self.derive(|state| {
            state.scheme = scheme;
            state.port = port;
        }))
    }

    pub fn with_user_info(&self, user: &str, password: Option<&str>) -> Self {
        let mut user_info = encode(user, Component::UserInfo).into_owned();
        if let Some(password) = password {
            user_info.push(':');
            user_info.push_str(&encode(password, Component::UserInfo));
        }

        if user_info == self.state.user_info {
            return self.clone();
        }
        self.derive(|state| state.user_info = user_info)
    }

    /// Changes the host, which must be a registered name, an IPv4 address or
    /// an IPv6 address (bracketed or not).
    pub fn with_host(&self, host: &str) -> Result<Self, Error> {
        let filtered = filter_host(host)
            .ok_or_else(|| Error::InvalidHost(host.to_string()))?;
        if filtered == self.state.host {
            return Ok(self.clone());
        }
        Ok(self.derive(|state| state.host = filtered))
    }

    /// Ports must be in the range `0..=65535`.
    pub fn with_port(&self, port: Option<u32>) -> Result<Self, Error> {
        let port = filter_port(&self.state.scheme, port)?;
        if port == self.state.port {
            return Ok(self.clone());
        }
        Ok(self.derive(|state| state.port = port))
    }

    pub fn with_path(&self, path: &str) -> Self {
        let path = encode(path, Component::Path);
        if path == self.state.path {
            return self.clone();
        }
        let path = path.into_owned();
        self.derive(|state| state.path = path)
    }

    pub fn with_query(&self, query: &str) -> Self {
        let query = encode(query, Component::QueryOrFragment);
        if query == self.state.query {
            return self.clone();
        }
        let query = query.into_owned();
        self.derive(|state| state.query = query)
    }

    pub fn with_fragment(&self, fragment: &str) -> Self {
        let fragment = encode(fragment, Component::QueryOrFragment);
        if fragment == self.state.fragment {
            return self.clone();
        }
        let fragment = fragment.into_owned();
        self.derive(|state| state.fragment = fragment)
    }

    fn derive(&self, change: impl FnOnce(&mut UriState)) -> Self {
        let mut state = UriState::clone(&self.state);
        change(&mut state);
        Self { state: Arc::new(state) }
    }
}

/// Lower-cases the scheme and strips a trailing `:` or `//`.
fn filter_scheme(scheme: &str) -> Result<String, Error> {
    let scheme = scheme.to_ascii_lowercase();
    let scheme = scheme.trim_end_matches([':', '/']);
    if SCHEMES.contains_key(scheme) {
        Ok(scheme.to_string())
    } else {
        Err(Error::UnsupportedScheme(scheme.to_string()))
    }
}

/// Lower-cases the host, and brackets a bare IPv6 address. `None` when the
/// host contains anything else than the characters below.
///
/// ```text
/// host          = IP-literal / IPv4address / reg-name
/// reg-name      = *( unreserved / pct-encoded / sub-delims )
/// ```
fn filter_host(host: &str) -> Option<String> {
    if let Some(literal) = host.strip_prefix('[').and_then(|host| host.strip_suffix(']')) {
        return literal.parse::<Ipv6Addr>().is_ok().then(|| host.to_ascii_lowercase());
    }

    if host.parse::<Ipv6Addr>().is_ok() {
        return Some(format!("[{}]", host.to_ascii_lowercase()));
    }

    let bytes = host.as_bytes();
    let is_reg_name = bytes.iter().enumerate().all(|(index, &byte)| match byte {
        b'%' => is_escape(&bytes[index..]),
        _ => is_unreserved(byte) || is_sub_delim(byte),
    });
    is_reg_name.then(|| host.to_ascii_lowercase())
}

fn filter_port(scheme: &str, port: Option<u32>) -> Result<Option<u16>, Error> {
    let Some(port) = port else {
        return Ok(None);
    };

    let port = u16::try_from(port)
        .map_err(|_| Error::InvalidPort(port))?;
    if SCHEMES.get(scheme) == Some(&port) {
        Ok(None)
    } else {
        Ok(Some(port))
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut written = false;
        if !self.state.scheme.is_empty() {
            write!(f, "{}://", self.state.scheme)?;
            written = true;
        }

        let authority = self.authority();
        if !authority.is_empty() {
            f.write_str(&authority)?;
            written = true;
        }

        let path = &self.state.path;
        if !path.is_empty() {
            if written && !path.starts_with('/') {
                f.write_char('/')?;
            }
            f.write_str(path)?;
        }

        if !self.state.query.is_empty() {
            write!(f, "?{}", self.state.query)?;
        }

        if !self.state.fragment.is_empty() {
            write!(f, "#{}", self.state.fragment)?;
        }

        Ok(())
    }
}

impl FromStr for Uri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Uri {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}
