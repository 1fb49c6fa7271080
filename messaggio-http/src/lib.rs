// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! This crate contains an immutable model of HTTP messages: requests,
//! responses, server requests and URIs. Every transformation returns a new,
//! validated message and leaves the original untouched.

pub mod abnf;
pub mod error;
pub mod factory;
pub mod header_map;
pub mod header_value;
pub mod message;
pub mod method;
pub mod request;
pub mod response;
pub mod server_request;
pub mod status;
pub mod syntax;
pub mod uri;
pub mod version;

pub use error::*;
pub use header_map::*;
pub use header_value::*;
pub use message::*;
pub use method::*;
pub use request::{HttpRequest, Request, RequestParts};
pub use response::*;
pub use server_request::*;
pub use status::*;
pub use uri::Uri;
pub use version::*;

pub use messaggio_resources::{
    SharedStream,
    Stream,
    UploadErrorStatus,
    UploadedFile,
};
