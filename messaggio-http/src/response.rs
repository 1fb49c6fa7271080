// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::sync::Arc;

use messaggio_resources::SharedStream;

use crate::{
    error::Error,
    syntax,
    HeaderMap,
    HttpMessage,
    MessageCore,
    StatusCode,
};

#[derive(Clone, Debug)]
struct ResponseState {
    core: MessageCore,
    status: StatusCode,
    reason_phrase: Option<String>,
}

/// An outgoing, server-side response.
#[derive(Clone, Debug)]
pub struct Response {
    state: Arc<ResponseState>,
}

impl Response {
    pub fn new(status: u16, headers: HeaderMap, body: Option<SharedStream>) -> Result<Self, Error> {
        Ok(Self {
            state: Arc::new(ResponseState {
                core: MessageCore::new(headers, body),
                status: StatusCode::new(status)?,
                reason_phrase: None,
            }),
        })
    }

    /// Returns whether or not both handles refer to the same response.
    pub fn ptr_eq(&self, other: &Response) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    pub fn status(&self) -> StatusCode {
        self.state.status
    }

    pub fn status_code(&self) -> u16 {
        self.state.status.as_u16()
    }

    /// The reason phrase given with [`with_status`](Self::with_status), or
    /// else the standard phrase of the status code, or else an empty string.
    pub fn reason_phrase(&self) -> &str {
        match &self.state.reason_phrase {
            Some(reason_phrase) => reason_phrase,
            None => self.state.status.standard_reason_phrase().unwrap_or_default(),
        }
    }

    /// Changes the status. Without a reason phrase, the standard phrase of
    /// the new status code is used.
    ///
    /// ```text
    /// reason-phrase  = 1*( HTAB / SP / VCHAR / obs-text )
    /// ```
    pub fn with_status(&self, code: u16, reason_phrase: Option<&str>) -> Result<Self, Error> {
        let status = StatusCode::new(code)?;
        if let Some(reason_phrase) = reason_phrase {
            syntax::validate_field_content(reason_phrase.as_bytes())
                .map_err(|_| Error::InvalidReasonPhrase(reason_phrase.to_string()))?;
        }

        let mut state = ResponseState::clone(&self.state);
        state.status = status;
        state.reason_phrase = reason_phrase.map(str::to_string);
        Ok(Self { state: Arc::new(state) })
    }
}

impl Default for Response {
    fn default() -> Self {
        Self {
            state: Arc::new(ResponseState {
                core: MessageCore::default(),
                status: StatusCode::default(),
                reason_phrase: None,
            }),
        }
    }
}

impl HttpMessage for Response {
    fn core(&self) -> &MessageCore {
        &self.state.core
    }

    fn with_core(&self, core: MessageCore) -> Self {
        let mut state = ResponseState::clone(&self.state);
        state.core = core;
        Self { state: Arc::new(state) }
    }
}
