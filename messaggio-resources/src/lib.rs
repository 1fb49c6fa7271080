// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! This crate contains the resources an HTTP message is backed by: byte
//! streams over an external [`Resource`], and files uploaded by clients.

pub mod error;
pub mod mode;
pub mod resource;
pub mod stream;
pub mod uploaded_file;

pub use error::*;
pub use mode::AccessMode;
pub use resource::*;
pub use stream::*;
pub use uploaded_file::*;
