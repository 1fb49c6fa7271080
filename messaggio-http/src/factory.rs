// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Shorthands for creating messages, URIs, streams and uploaded files.

use std::path::Path;

use messaggio_resources::{
    Resource,
    SharedStream,
    Stream,
    UploadError,
    UploadErrorStatus,
    UploadedFile,
};

use crate::{
    error::Error,
    server_request::Params,
    HeaderMap,
    Request,
    Response,
    ServerRequest,
    Uri,
};

pub fn create_request(method: &str, uri: &str) -> Result<Request, Error> {
    Request::new(method, Uri::parse(uri)?, HeaderMap::new(), None)
}

/// Creates a response with the given status, and optionally a reason phrase
/// other than the standard one.
pub fn create_response(code: u16, reason_phrase: Option<&str>) -> Result<Response, Error> {
    let response = Response::new(code, HeaderMap::new(), None)?;
    match reason_phrase {
        Some(..) => response.with_status(code, reason_phrase),
        None => Ok(response),
    }
}

pub fn create_server_request(method: &str, uri: &str, server_params: Params) -> Result<ServerRequest, Error> {
    ServerRequest::new(method, Uri::parse(uri)?, HeaderMap::new(), None, server_params)
}

pub fn create_uri(uri: &str) -> Result<Uri, Error> {
    Uri::parse(uri)
}

/// Creates an in-memory stream, positioned at the start of the contents.
pub fn create_stream(contents: impl Into<Vec<u8>>) -> SharedStream {
    SharedStream::from_contents(contents)
}

/// Opens a file with an `fopen`-style mode, e.g. `"r"` or `"w+"`.
pub fn create_stream_from_file(path: impl AsRef<Path>, mode: &str) -> Result<SharedStream, Error> {
    Ok(SharedStream::new(Stream::open(path, mode)?))
}

pub fn create_stream_from_resource(resource: impl Resource + 'static) -> SharedStream {
    SharedStream::new(Stream::new(resource))
}

/// Creates an uploaded file backed by a stream. The stream must be readable,
/// and without a given size the size of the stream is used.
pub fn create_uploaded_file(
    stream: SharedStream,
    size: Option<u64>,
    error: UploadErrorStatus,
    client_filename: Option<String>,
    client_media_type: Option<String>,
) -> Result<UploadedFile, Error> {
    let size = {
        let mut guard = stream.lock();
        if !guard.is_readable() || guard.metadata_value("uri").is_none() {
            return Err(UploadError::InvalidFileSource.into());
        }
        size.or_else(|| guard.size())
    };

    Ok(UploadedFile::new(Some(stream.into()), size, error, client_filename, client_media_type)?)
}
