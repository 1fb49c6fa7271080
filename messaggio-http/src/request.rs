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
    Method,
    Uri,
};

/// The parts a request has next to the [`MessageCore`].
#[derive(Clone, Debug)]
pub struct RequestParts {
    method: Method,
    uri: Uri,
    request_target: Option<String>,
}

impl RequestParts {
    pub fn new(method: &str, uri: Uri) -> Result<Self, Error> {
        Ok(Self {
            method: Method::parse(method)?,
            uri,
            request_target: None,
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }
}

/// Sets the `Host` header from the URI, as the first header. A URI without
/// a host leaves the headers alone.
///
/// # References
/// * [RFC 7230 Section 5.4](https://www.rfc-editor.org/rfc/rfc7230.html#section-5.4)
pub(crate) fn update_host_from_uri(core: &mut MessageCore, uri: &Uri) -> Result<(), Error> {
    if uri.host().is_empty() {
        return Ok(());
    }

    let host = match uri.port() {
        Some(port) => format!("{}:{port}", uri.host()),
        None => uri.host().to_string(),
    };
    core.headers_mut().set_host_first(&host)
}

/// The operations shared by [`Request`] and
/// [`ServerRequest`](crate::ServerRequest).
pub trait HttpRequest: HttpMessage {
    fn parts(&self) -> &RequestParts;

    /// Returns a copy of this request with the given core and parts.
    fn with_parts(&self, core: MessageCore, parts: RequestParts) -> Self;

    fn method(&self) -> &Method {
        &self.parts().method
    }

    fn uri(&self) -> &Uri {
        &self.parts().uri
    }

    /// The request-target as it would appear in the request-line: the one
    /// set by [`with_request_target`](Self::with_request_target), or the
    /// origin-form derived from the URI.
    fn request_target(&self) -> String {
        let parts = self.parts();
        if let Some(target) = &parts.request_target {
            return target.clone();
        }

        let mut target = match parts.uri.path() {
            "" => String::from("/"),
            path => path.to_string(),
        };
        if !parts.uri.query().is_empty() {
            target.push('?');
            target.push_str(parts.uri.query());
        }
        target
    }

    /// The method is case-sensitive and kept as-is.
    fn with_method(&self, method: &str) -> Result<Self, Error> {
        let mut parts = self.parts().clone();
        parts.method = Method::parse(method)?;
        Ok(self.with_parts(self.core().clone(), parts))
    }

    /// Overrides the request-target, e.g. for the asterisk-form or the
    /// authority-form. The request-target can't contain whitespace.
    fn with_request_target(&self, request_target: &str) -> Result<Self, Error> {
        if self.parts().request_target.as_deref() == Some(request_target) {
            return Ok(self.clone());
        }

        if !syntax::is_valid_request_target(request_target) {
            return Err(Error::InvalidRequestTarget(request_target.to_string()));
        }

        let mut parts = self.parts().clone();
        parts.request_target = Some(request_target.to_string());
        Ok(self.with_parts(self.core().clone(), parts))
    }

    /// Changes the URI. The `Host` header is updated from the new URI, unless
    /// `preserve_host` is set and the request already has a `Host` header.
    fn with_uri(&self, uri: Uri, preserve_host: bool) -> Result<Self, Error> {
        if uri.ptr_eq(self.uri()) {
            return Ok(self.clone());
        }

        let mut core = self.core().clone();
        if !preserve_host || !self.has_header("Host") {
            update_host_from_uri(&mut core, &uri)?;
        }

        let mut parts = self.parts().clone();
        parts.uri = uri;
        Ok(self.with_parts(core, parts))
    }
}

#[derive(Clone, Debug)]
struct RequestState {
    core: MessageCore,
    parts: RequestParts,
}

/// An outgoing, client-side request.
#[derive(Clone, Debug)]
pub struct Request {
    state: Arc<RequestState>,
}

impl Request {
    /// Creates a request. When the URI has a host, the `Host` header is set
    /// from it and becomes the first header.
    pub fn new(method: &str, uri: Uri, headers: HeaderMap, body: Option<SharedStream>) -> Result<Self, Error> {
        let parts = RequestParts::new(method, uri)?;
        let mut core = MessageCore::new(headers, body);
        update_host_from_uri(&mut core, parts.uri())?;

        Ok(Self {
            state: Arc::new(RequestState { core, parts }),
        })
    }

    /// Returns whether or not both handles refer to the same request.
    pub fn ptr_eq(&self, other: &Request) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl HttpMessage for Request {
    fn core(&self) -> &MessageCore {
        &self.state.core
    }

    fn with_core(&self, core: MessageCore) -> Self {
        self.with_parts(core, self.state.parts.clone())
    }
}

impl HttpRequest for Request {
    fn parts(&self) -> &RequestParts {
        &self.state.parts
    }

    fn with_parts(&self, core: MessageCore, parts: RequestParts) -> Self {
        Self {
            state: Arc::new(RequestState { core, parts }),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use super::*;

    fn request(uri: &str) -> Request {
        Request::new("GET", Uri::parse(uri).unwrap(), HeaderMap::new(), None).unwrap()
    }

    #[test]
    fn test_host_is_the_first_header() {
        let headers = HeaderMap::from_headers([("Accept", "*/*")]).unwrap();
        let request = Request::new("GET", Uri::parse("http://example.com").unwrap(), headers, None).unwrap();

        let names: Vec<_> = request.headers().iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["Host", "Accept"]);
        assert_eq!(request.header_line("host"), "example.com");
    }

    #[test]
    fn test_host_from_uri_overrides_given_host() {
        let headers = HeaderMap::from_headers([("Accept", "*/*"), ("HOST", "other.example")]).unwrap();
        let request = Request::new("GET", Uri::parse("http://example.com:8080/").unwrap(), headers, None).unwrap();

        let names: Vec<_> = request.headers().iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["HOST", "Accept"]);
        assert_eq!(request.header("Host"), ["example.com:8080"]);
    }

    #[test]
    fn test_no_host_without_uri_host() {
        let request = request("/foo");
        assert!(!request.has_header("Host"));

        let headers = HeaderMap::from_headers([("Host", "kept.example")]).unwrap();
        let request = Request::new("GET", Uri::parse("/foo").unwrap(), headers, None).unwrap();
        assert_eq!(request.header_line("Host"), "kept.example");
    }

    #[rstest]
    #[case("http://example.com", "/")]
    #[case("http://example.com/foo/bar", "/foo/bar")]
    #[case("http://example.com/foo?a=b&c", "/foo?a=b&c")]
    #[case("http://example.com?q", "/?q")]
    #[case("", "/")]
    fn test_derived_request_target(#[case] uri: &str, #[case] expected: &str) {
        assert_eq!(request(uri).request_target(), expected);
    }

    #[test]
    fn test_with_request_target() {
        let request = request("http://example.com/foo");
        let asterisk = request.with_request_target("*").unwrap();

        assert_eq!(asterisk.request_target(), "*");
        assert_eq!(request.request_target(), "/foo");
        assert!(asterisk.with_request_target("*").unwrap().ptr_eq(&asterisk));
        assert!(matches!(request.with_request_target("/a b"), Err(Error::InvalidRequestTarget(..))));
    }

    #[test]
    fn test_with_method() {
        let request = request("http://example.com");
        let patch = request.with_method("patch").unwrap();

        assert_eq!(patch.method().as_str(), "patch");
        assert_eq!(request.method(), &Method::Get);
        assert!(matches!(request.with_method("GE T"), Err(Error::InvalidMethod { .. })));
        assert!(matches!(Request::new("", Uri::default(), HeaderMap::new(), None), Err(Error::InvalidMethod { .. })));
    }

    #[test]
    fn test_with_uri() {
        let request = request("http://example.com")
            .with_header("Accept", "*/*").unwrap();
        assert!(request.with_uri(request.uri().clone(), false).unwrap().ptr_eq(&request));

        let moved = request.with_uri(Uri::parse("https://other.example:8443/x").unwrap(), false).unwrap();
        let names: Vec<_> = moved.headers().iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["Host", "Accept"]);
        assert_eq!(moved.header_line("Host"), "other.example:8443");
        assert_eq!(request.header_line("Host"), "example.com");
    }

    #[test]
    fn test_with_uri_preserving_host() {
        let request = request("http://example.com");
        let preserved = request.with_uri(Uri::parse("http://other.example").unwrap(), true).unwrap();
        assert_eq!(preserved.header_line("Host"), "example.com");
        assert_eq!(preserved.uri().host(), "other.example");

        // Without a Host header to preserve, it is taken from the URI.
        let request = request.without_header("Host");
        let preserved = request.with_uri(Uri::parse("http://other.example").unwrap(), true).unwrap();
        assert_eq!(preserved.header_line("Host"), "other.example");
    }

    #[test]
    fn test_with_uri_without_host_keeps_headers() {
        let request = request("http://example.com");
        let relative = request.with_uri(Uri::parse("/relative").unwrap(), false).unwrap();
        assert_eq!(relative.header_line("Host"), "example.com");
    }
}
