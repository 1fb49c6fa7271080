// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{
    any::Any,
    fmt,
    sync::Arc,
};

use hashbrown::HashMap;
use messaggio_resources::{SharedStream, UploadedFile};
use serde_json::{Map, Value};

use crate::{
    error::Error,
    request::update_host_from_uri,
    HeaderMap,
    HttpMessage,
    HttpRequest,
    MessageCore,
    RequestParts,
    Uri,
};

/// Server, query and cookie parameters. Values may be nested, e.g. for a
/// repeated query key such as `tag[]=a&tag[]=b`.
pub type Params = Map<String, Value>;

/// An attribute value attached to a request by the application.
pub type Attribute = Arc<dyn Any + Send + Sync>;

/// The uploaded files of a request, in the shape of the form they came from.
#[derive(Clone, Debug)]
pub enum UploadedFileTree {
    File(Arc<UploadedFile>),
    List(Vec<UploadedFileTree>),
    Map(HashMap<String, UploadedFileTree>),
}

impl UploadedFileTree {
    /// Iterates over every file in this tree, depth-first.
    pub fn files(&self) -> Box<dyn Iterator<Item = &Arc<UploadedFile>> + '_> {
        match self {
            Self::File(file) => Box::new(std::iter::once(file)),
            Self::List(list) => Box::new(list.iter().flat_map(UploadedFileTree::files)),
            Self::Map(map) => Box::new(map.values().flat_map(UploadedFileTree::files)),
        }
    }
}

impl From<UploadedFile> for UploadedFileTree {
    fn from(file: UploadedFile) -> Self {
        Self::File(Arc::new(file))
    }
}

#[derive(Clone)]
struct ServerRequestState {
    core: MessageCore,
    parts: RequestParts,
    server_params: Arc<Params>,
    query_params: Params,
    cookie_params: Params,
    parsed_body: Option<Value>,
    uploaded_files: HashMap<String, UploadedFileTree>,
    attributes: HashMap<String, Attribute>,
}

impl fmt::Debug for ServerRequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerRequestState")
            .field("core", &self.core)
            .field("parts", &self.parts)
            .field("server_params", &self.server_params)
            .field("query_params", &self.query_params)
            .field("cookie_params", &self.cookie_params)
            .field("parsed_body", &self.parsed_body)
            .field("uploaded_files", &self.uploaded_files)
            .field("attributes", &self.attributes.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// An incoming, server-side request, together with the environment it was
/// received in.
#[derive(Clone, Debug)]
pub struct ServerRequest {
    state: Arc<ServerRequestState>,
}

impl ServerRequest {
    /// Creates a server request. The server parameters are a snapshot of the
    /// environment and can't be changed afterwards.
    pub fn new(
        method: &str,
        uri: Uri,
        headers: HeaderMap,
        body: Option<SharedStream>,
        server_params: Params,
    ) -> Result<Self, Error> {
        let parts = RequestParts::new(method, uri)?;
        let mut core = MessageCore::new(headers, body);
        update_host_from_uri(&mut core, parts.uri())?;

        Ok(Self {
            state: Arc::new(ServerRequestState {
                core,
                parts,
                server_params: Arc::new(server_params),
                query_params: Params::new(),
                cookie_params: Params::new(),
                parsed_body: None,
                uploaded_files: HashMap::new(),
                attributes: HashMap::new(),
            }),
        })
    }

    /// Returns whether or not both handles refer to the same request.
    pub fn ptr_eq(&self, other: &ServerRequest) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    pub fn server_params(&self) -> &Params {
        &self.state.server_params
    }

    pub fn query_params(&self) -> &Params {
        &self.state.query_params
    }

    pub fn cookie_params(&self) -> &Params {
        &self.state.cookie_params
    }

    /// The deserialized body, which is either an array or an object.
    pub fn parsed_body(&self) -> Option<&Value> {
        self.state.parsed_body.as_ref()
    }

    pub fn uploaded_files(&self) -> &HashMap<String, UploadedFileTree> {
        &self.state.uploaded_files
    }

    pub fn attributes(&self) -> &HashMap<String, Attribute> {
        &self.state.attributes
    }

    /// Returns the attribute, if it is present and of type `T`.
    pub fn attribute<T: Any + Send + Sync>(&self, name: &str) -> Option<&T> {
        self.state.attributes.get(name)
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Returns the attribute, or `default` if it isn't present or not of
    /// type `T`.
    pub fn attribute_or<'a, T: Any + Send + Sync>(&'a self, name: &str, default: &'a T) -> &'a T {
        self.attribute(name).unwrap_or(default)
    }

    pub fn with_query_params(&self, query_params: Params) -> Self {
        self.derive(|state| state.query_params = query_params)
    }

    pub fn with_cookie_params(&self, cookie_params: Params) -> Self {
        self.derive(|state| state.cookie_params = cookie_params)
    }

    /// Only arrays and objects can be a parsed body, `None` removes it.
    pub fn with_parsed_body(&self, parsed_body: Option<Value>) -> Result<Self, Error> {
        if !matches!(parsed_body, None | Some(Value::Array(..)) | Some(Value::Object(..))) {
            return Err(Error::InvalidParsedBody);
        }
        Ok(self.derive(|state| state.parsed_body = parsed_body))
    }

    pub fn with_uploaded_files(&self, uploaded_files: HashMap<String, UploadedFileTree>) -> Self {
        self.derive(|state| state.uploaded_files = uploaded_files)
    }

    pub fn with_attribute<T: Any + Send + Sync>(&self, name: &str, value: T) -> Self {
        let value: Attribute = Arc::new(value);
        self.derive(|state| {
            state.attributes.insert(name.to_string(), value);
        })
    }

    pub fn without_attribute(&self, name: &str) -> Self {
        self.derive(|state| {
            state.attributes.remove(name);
        })
    }

    fn derive(&self, change: impl FnOnce(&mut ServerRequestState)) -> Self {
        let mut state = ServerRequestState::clone(&self.state);
        change(&mut state);
        Self { state: Arc::new(state) }
    }
}

impl HttpMessage for ServerRequest {
    fn core(&self) -> &MessageCore {
        &self.state.core
    }

    fn with_core(&self, core: MessageCore) -> Self {
        self.derive(|state| state.core = core)
    }
}

impl HttpRequest for ServerRequest {
    fn parts(&self) -> &RequestParts {
        &self.state.parts
    }

    fn with_parts(&self, core: MessageCore, parts: RequestParts) -> Self {
        self.derive(|state| {
            state.core = core;
            state.parts = parts;
        })
    }
}

#[cfg(test)]
mod tests {
    use messaggio_resources::{Stream, UploadErrorStatus};
    use serde_json::json;

    use super::*;

    fn request() -> ServerRequest {
        let mut server_params = Params::new();
        server_params.insert(String::from("REQUEST_METHOD"), json!("POST"));
        ServerRequest::new("POST", Uri::parse("https://example.com/form?x=1").unwrap(), HeaderMap::new(), None, server_params).unwrap()
    }

    #[test]
    fn test_construction() {
        let request = request();
        assert_eq!(request.server_params().get("REQUEST_METHOD"), Some(&json!("POST")));
        assert_eq!(request.header_line("Host"), "example.com");
        assert_eq!(request.request_target(), "/form?x=1");
        assert!(request.query_params().is_empty());
        assert!(request.parsed_body().is_none());
    }

    #[test]
    fn test_params_leave_original_untouched() {
        let request = request();
        let mut query = Params::new();
        query.insert(String::from("x"), json!("1"));
        let mut cookies = Params::new();
        cookies.insert(String::from("session"), json!("abc"));

        let changed = request.with_query_params(query).with_cookie_params(cookies);
        assert_eq!(changed.query_params().get("x").and_then(Value::as_str), Some("1"));
        assert_eq!(changed.cookie_params().get("session").and_then(Value::as_str), Some("abc"));
        assert!(request.query_params().is_empty());
        assert!(request.cookie_params().is_empty());
        assert_eq!(changed.server_params(), request.server_params());
    }

    #[test]
    fn test_params_keep_nested_values() {
        // ?tag[]=a&tag[]=b&filter[age][min]=18
        let Value::Object(query) = json!({
            "tag": ["a", "b"],
            "filter": { "age": { "min": "18" } },
        }) else {
            panic!("query should be an object");
        };

        let request = request().with_query_params(query);
        assert_eq!(request.query_params()["tag"], json!(["a", "b"]));
        assert_eq!(request.query_params()["filter"]["age"]["min"], "18");
        assert_eq!(request.query_params().len(), 2);
    }

    #[test]
    fn test_parsed_body() {
        let request = request();
        let with_body = request.with_parsed_body(Some(json!({"name": "value"}))).unwrap();
        assert_eq!(with_body.parsed_body(), Some(&json!({"name": "value"})));
        assert!(request.with_parsed_body(Some(json!([1, 2]))).is_ok());
        assert!(with_body.with_parsed_body(None).unwrap().parsed_body().is_none());

        assert!(matches!(request.with_parsed_body(Some(json!("text"))), Err(Error::InvalidParsedBody)));
        assert!(matches!(request.with_parsed_body(Some(json!(1))), Err(Error::InvalidParsedBody)));
        assert!(matches!(request.with_parsed_body(Some(Value::Null)), Err(Error::InvalidParsedBody)));
    }

    #[test]
    fn test_attributes() {
        let request = request().with_attribute("user_id", 42u64);

        assert_eq!(request.attribute::<u64>("user_id"), Some(&42));
        assert_eq!(request.attribute::<String>("user_id"), None);
        assert_eq!(request.attribute::<u64>("missing"), None);
        assert_eq!(*request.attribute_or("missing", &7u64), 7);
        assert_eq!(request.attributes().len(), 1);

        let without = request.without_attribute("user_id");
        assert!(without.attributes().is_empty());
        assert!(request.attribute::<u64>("user_id").is_some());
        assert!(!request.without_attribute("missing").ptr_eq(&request));
    }

    #[test]
    fn test_uploaded_files() {
        let avatar = UploadedFile::new(Some(Stream::from_contents("png").into()), Some(3), UploadErrorStatus::Ok, Some(String::from("avatar.png")), None).unwrap();
        let failed = UploadedFile::new(None, None, UploadErrorStatus::NoFile, None, None).unwrap();

        let mut files = HashMap::new();
        files.insert(String::from("avatar"), UploadedFileTree::from(avatar));
        files.insert(String::from("documents"), UploadedFileTree::List(vec![failed.into()]));

        let request = request().with_uploaded_files(files);
        assert_eq!(request.uploaded_files().len(), 2);

        let Some(UploadedFileTree::File(avatar)) = request.uploaded_files().get("avatar") else {
            panic!("avatar should be a single file");
        };
        assert_eq!(avatar.client_filename(), Some("avatar.png"));

        let total: usize = request.uploaded_files().values().map(|tree| tree.files().count()).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_request_operations_keep_server_state() {
        let request = request().with_attribute("a", 1i32);
        let changed = request.with_method("PUT").unwrap()
            .with_header("X-Foo", "bar").unwrap()
            .with_uri(Uri::parse("http://other.example").unwrap(), false).unwrap();

        assert_eq!(changed.method().as_str(), "PUT");
        assert_eq!(changed.header_line("host"), "other.example");
        assert_eq!(changed.attribute::<i32>("a"), Some(&1));
        assert_eq!(changed.server_params().len(), 1);
    }
}
