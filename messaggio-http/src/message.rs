// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::sync::Arc;

use messaggio_resources::SharedStream;

use crate::{
    error::Error,
    HeaderMap,
    HeaderValues,
    ProtocolVersion,
};

/// The parts every message has: a protocol version, headers and a body.
#[derive(Clone, Debug, Default)]
pub struct MessageCore {
    protocol_version: ProtocolVersion,
    headers: HeaderMap,
    body: SharedStream,
}

impl MessageCore {
    /// Creates the core of a message. Without a body, the message gets an
    /// empty in-memory stream.
    pub fn new(headers: HeaderMap, body: Option<SharedStream>) -> Self {
        Self {
            protocol_version: ProtocolVersion::default(),
            headers,
            body: body.unwrap_or_default(),
        }
    }

    pub fn protocol_version(&self) -> ProtocolVersion {
        self.protocol_version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &SharedStream {
        &self.body
    }

    pub(crate) fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}

/// The operations shared by every kind of message.
///
/// Messages are immutable: the `with_*` methods return a new message and
/// leave `self` untouched.
pub trait HttpMessage: Clone {
    fn core(&self) -> &MessageCore;

    /// Returns a copy of this message with the given core.
    fn with_core(&self, core: MessageCore) -> Self;

    fn protocol_version(&self) -> ProtocolVersion {
        self.core().protocol_version
    }

    /// The headers in insertion order, with their original case.
    fn headers(&self) -> &HeaderMap {
        &self.core().headers
    }

    fn has_header(&self, name: &str) -> bool {
        self.core().headers.contains(name)
    }

    /// The values of a header, or an empty slice if the header isn't present.
    fn header(&self, name: &str) -> &[String] {
        self.core().headers.get(name).unwrap_or_default()
    }

    /// The values of a header joined by a comma, or an empty string if the
    /// header isn't present.
    fn header_line(&self, name: &str) -> String {
        self.core().headers.line(name).unwrap_or_default()
    }

    fn body(&self) -> &SharedStream {
        &self.core().body
    }

    /// Accepts `1.0`, `1.1` and `2.0`.
    fn with_protocol_version(&self, version: &str) -> Result<Self, Error> {
        let protocol_version = ProtocolVersion::parse(version)?;
        let mut core = self.core().clone();
        core.protocol_version = protocol_version;
        Ok(self.with_core(core))
    }

    /// Replaces the header with the given name, regardless of case.
    fn with_header(&self, name: &str, values: impl Into<HeaderValues>) -> Result<Self, Error> {
        let mut core = self.core().clone();
        core.headers.set(name, values)?;
        Ok(self.with_core(core))
    }

    /// Appends values to a header, or adds it if it isn't present.
    fn with_added_header(&self, name: &str, values: impl Into<HeaderValues>) -> Result<Self, Error> {
        let mut core = self.core().clone();
        core.headers.append(name, values)?;
        Ok(self.with_core(core))
    }

    /// Returns the same message when the header isn't present.
    fn without_header(&self, name: &str) -> Self {
        if !self.has_header(name) {
            return self.clone();
        }

        let mut core = self.core().clone();
        core.headers.remove(name);
        self.with_core(core)
    }

    fn with_body(&self, body: SharedStream) -> Self {
        let mut core = self.core().clone();
        core.body = body;
        self.with_core(core)
    }
}

/// A message that is neither a request nor a response.
#[derive(Clone, Debug, Default)]
pub struct Message {
    core: Arc<MessageCore>,
}

impl Message {
    pub fn new(headers: HeaderMap, body: Option<SharedStream>) -> Self {
        Self {
            core: Arc::new(MessageCore::new(headers, body)),
        }
    }

    /// Returns whether or not both handles refer to the same message.
    pub fn ptr_eq(&self, other: &Message) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }
}

impl HttpMessage for Message {
    fn core(&self) -> &MessageCore {
        &self.core
    }

    fn with_core(&self, core: MessageCore) -> Self {
        Self {
            core: Arc::new(core),
        }
    }
}
