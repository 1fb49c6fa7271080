// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{fmt, io, path::PathBuf};

use strum_macros::AsRefStr;

use crate::UploadErrorStatus;

/// The two families every error of this workspace falls into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, AsRefStr)]
pub enum ErrorKind {
    /// The caller supplied a value that cannot be represented.
    InvalidArgument,

    /// The operation was valid, but the state of the object or the underlying
    /// resource did not allow it to complete.
    Runtime,
}

/// An error that can occur while operating on a [`Stream`](crate::Stream).
#[derive(Debug, AsRefStr)]
pub enum StreamError {
    /// The resource was detached or closed.
    Detached,

    /// The access mode of the resource is unknown, e.g. an `fopen` mode of
    /// `"q"`.
    InvalidMode(String),

    /// A file resource was requested for the empty filename.
    EmptyFilename,

    /// The file backing a resource couldn't be opened.
    OpenFailed {
        path: PathBuf,
        error: io::Error,
    },

    NotReadable,
    NotWritable,
    NotSeekable,

    ReadFailed(io::Error),
    WriteFailed(io::Error),
    SeekFailed(io::Error),
    TellFailed(io::Error),
}

impl StreamError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMode(..) | Self::EmptyFilename => ErrorKind::InvalidArgument,
            _ => ErrorKind::Runtime,
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detached => f.write_str("stream is detached"),
            Self::InvalidMode(mode) => write!(f, "invalid stream mode \"{mode}\""),
            Self::EmptyFilename => f.write_str("the filename cannot be empty"),
            Self::OpenFailed { path, error } => write!(f, "unable to open \"{}\": {error}", path.display()),
            Self::NotReadable => f.write_str("cannot read from non-readable stream"),
            Self::NotWritable => f.write_str("cannot write to a non-writable stream"),
            Self::NotSeekable => f.write_str("stream is not seekable"),
            Self::ReadFailed(error) => write!(f, "unable to read from stream: {error}"),
            Self::WriteFailed(error) => write!(f, "unable to write to stream: {error}"),
            Self::SeekFailed(error) => write!(f, "unable to seek in stream: {error}"),
            Self::TellFailed(error) => write!(f, "unable to determine stream position: {error}"),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::OpenFailed { error, .. }
                | Self::ReadFailed(error)
                | Self::WriteFailed(error)
                | Self::SeekFailed(error)
                | Self::TellFailed(error) => Some(error),
            _ => None,
        }
    }
}

/// An error that can occur while constructing or consuming an
/// [`UploadedFile`](crate::UploadedFile).
#[derive(Debug, AsRefStr)]
pub enum UploadError {
    /// The raw error status isn't one of the `UPLOAD_ERR_*` codes.
    InvalidErrorStatus(i32),

    /// The upload succeeded, but neither a stream nor a file path was given.
    InvalidFileSource,

    /// The target of [`UploadedFile::move_to`](crate::UploadedFile::move_to)
    /// was empty.
    InvalidTargetPath,

    /// The stream or file is unavailable since the upload itself failed.
    UploadFailed(UploadErrorStatus),

    AlreadyMoved,

    MoveFailed {
        target: PathBuf,
        reason: Box<dyn std::error::Error + Send + Sync>,
    },

    Stream(StreamError),
}

impl UploadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidErrorStatus(..)
                | Self::InvalidFileSource
                | Self::InvalidTargetPath => ErrorKind::InvalidArgument,
            Self::Stream(error) => error.kind(),
            _ => ErrorKind::Runtime,
        }
    }
}

impl From<StreamError> for UploadError {
    fn from(error: StreamError) -> Self {
        UploadError::Stream(error)
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidErrorStatus(status) => write!(f, "upload error status {status} is not one of the UPLOAD_ERR_* codes"),
            Self::InvalidFileSource => f.write_str("invalid stream or file provided"),
            Self::InvalidTargetPath => f.write_str("invalid path provided for move operation; must be non-empty"),
            Self::UploadFailed(status) => write!(f, "cannot retrieve stream due to upload error ({})", status.as_ref()),
            Self::AlreadyMoved => f.write_str("cannot retrieve stream after it has already been moved"),
            Self::MoveFailed { target, reason } => write!(f, "uploaded file could not be moved to {}: {reason}", target.display()),
            Self::Stream(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MoveFailed { reason, .. } => Some(reason.as_ref()),
            Self::Stream(error) => Some(error),
            _ => None,
        }
    }
}
