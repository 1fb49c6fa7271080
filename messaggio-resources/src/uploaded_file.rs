// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use strum_macros::AsRefStr;

use crate::{
    SharedStream,
    Stream,
    UploadError,
};

/// The status of a file upload, following the `UPLOAD_ERR_*` codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, AsRefStr)]
#[repr(i32)]
pub enum UploadErrorStatus {
    /// The file was uploaded successfully.
    Ok = 0,

    /// The file exceeds the maximum size configured on the server.
    IniSize = 1,

    /// The file exceeds the maximum size specified by the form.
    FormSize = 2,

    /// Only part of the file was received.
    Partial = 3,

    /// No file was uploaded.
    NoFile = 4,

    NoTmpDir = 6,
    CantWrite = 7,

    /// An extension of the server stopped the upload.
    Extension = 8,
}

impl UploadErrorStatus {
    pub fn is_ok(&self) -> bool {
        *self == Self::Ok
    }

    pub fn code(&self) -> i32 {
        *self as i32
    }
}

impl TryFrom<i32> for UploadErrorStatus {
    type Error = UploadError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Ok,
            1 => Self::IniSize,
            2 => Self::FormSize,
            3 => Self::Partial,
            4 => Self::NoFile,
            6 => Self::NoTmpDir,
            7 => Self::CantWrite,
            8 => Self::Extension,
            _ => return Err(UploadError::InvalidErrorStatus(value)),
        })
    }
}

/// Where the contents of an uploaded file live.
#[derive(Clone, Debug)]
pub enum UploadSource {
    Stream(SharedStream),
    File(PathBuf),
}

impl From<SharedStream> for UploadSource {
    fn from(stream: SharedStream) -> Self {
        Self::Stream(stream)
    }
}

impl From<Stream> for UploadSource {
    fn from(stream: Stream) -> Self {
        Self::Stream(SharedStream::new(stream))
    }
}

impl From<PathBuf> for UploadSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<&Path> for UploadSource {
    fn from(path: &Path) -> Self {
        Self::File(path.to_path_buf())
    }
}

impl From<&str> for UploadSource {
    fn from(path: &str) -> Self {
        Self::File(PathBuf::from(path))
    }
}

#[derive(Clone, Debug)]
pub struct UploadSettings {
    /// The amount of bytes copied at once when a stream-backed upload is
    /// moved to its destination.
    pub copy_chunk_size: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            copy_chunk_size: 1024 * 1024,
        }
    }
}

/// A file that was uploaded by a client.
///
/// The contents can be consumed once: after a successful
/// [`move_to`](Self::move_to), neither the stream nor another move is
/// available.
#[derive(Debug)]
pub struct UploadedFile {
    source: Option<UploadSource>,
    size: Option<u64>,
    error: UploadErrorStatus,
    client_filename: Option<String>,
    client_media_type: Option<String>,
    moved: AtomicBool,
}

impl UploadedFile {
    /// Creates an uploaded file. When `error` signals success, `source` must
    /// be present; otherwise it is ignored.
    pub fn new(
        source: Option<UploadSource>,
        size: Option<u64>,
        error: UploadErrorStatus,
        client_filename: Option<String>,
        client_media_type: Option<String>,
    ) -> Result<Self, UploadError> {
        let source = if error.is_ok() {
            Some(source.ok_or(UploadError::InvalidFileSource)?)
        } else {
            None
        };

        Ok(Self {
            source,
            size,
            error,
            client_filename,
            client_media_type,
            moved: AtomicBool::new(false),
        })
    }

    /// Like [`new`](Self::new), but with the raw `UPLOAD_ERR_*` code.
    pub fn with_error_code(
        source: Option<UploadSource>,
        size: Option<u64>,
        error_code: i32,
        client_filename: Option<String>,
        client_media_type: Option<String>,
    ) -> Result<Self, UploadError> {
        let error = UploadErrorStatus::try_from(error_code)?;
        Self::new(source, size, error, client_filename, client_media_type)
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn error(&self) -> UploadErrorStatus {
        self.error
    }

    pub fn client_filename(&self) -> Option<&str> {
        self.client_filename.as_deref()
    }

    pub fn client_media_type(&self) -> Option<&str> {
        self.client_media_type.as_deref()
    }

    pub fn is_moved(&self) -> bool {
        self.moved.load(Ordering::Acquire)
    }

    /// The contents of the upload. A stream-backed upload returns the
    /// original stream, a path-backed upload opens the file for reading.
    pub fn stream(&self) -> Result<SharedStream, UploadError> {
        match self.available_source()? {
            UploadSource::Stream(stream) => Ok(stream.clone()),
            UploadSource::File(path) => Ok(SharedStream::new(Stream::open(path, "r")?)),
        }
    }

    pub fn move_to(&self, target: impl AsRef<Path>) -> Result<(), UploadError> {
        self.move_to_with_settings(target, &UploadSettings::default())
    }

    /// Moves the upload to `target`. A path-backed upload is renamed, a
    /// stream-backed upload is copied into a newly created file.
    pub fn move_to_with_settings(&self, target: impl AsRef<Path>, settings: &UploadSettings) -> Result<(), UploadError> {
        let source = self.available_source()?;

        let target = target.as_ref();
        if target.as_os_str().is_empty() {
            return Err(UploadError::InvalidTargetPath);
        }

        if self.moved.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            return Err(UploadError::AlreadyMoved);
        }

        let result = match source {
            UploadSource::File(path) => fs::rename(path, target)
                .map_err(|error| UploadError::MoveFailed { target: target.to_path_buf(), reason: Box::new(error) }),
            UploadSource::Stream(stream) => copy_stream_to_file(stream, target, settings.copy_chunk_size)
                .map_err(|error| UploadError::MoveFailed { target: target.to_path_buf(), reason: Box::new(error) }),
        };

        if let Err(_error) = &result {
            #[cfg(feature = "debugging")]
            eprintln!("[UploadedFile] {_error}");
            self.moved.store(false, Ordering::Release);
        }

        result
    }

    fn available_source(&self) -> Result<&UploadSource, UploadError> {
        if !self.error.is_ok() {
            return Err(UploadError::UploadFailed(self.error));
        }

        if self.is_moved() {
            return Err(UploadError::AlreadyMoved);
        }

        self.source.as_ref().ok_or(UploadError::InvalidFileSource)
    }
}

fn copy_stream_to_file(source: &SharedStream, target: &Path, chunk_size: usize) -> Result<(), crate::StreamError> {
    let mut source = source.lock();
    if source.is_detached() {
        return Err(crate::StreamError::Detached);
    }
    if !source.is_readable() {
        return Err(crate::StreamError::NotReadable);
    }

    let mut destination = Stream::open(target, "w")?;

    if source.is_seekable() {
        source.rewind()?;
    }

    while !source.eof() {
        let chunk = source.read(chunk_size.max(1))?;
        if chunk.is_empty() {
            continue;
        }

        if destination.write(&chunk)? == 0 {
            break;
        }
    }

    destination.close();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, Some(UploadErrorStatus::Ok))]
    #[case(1, Some(UploadErrorStatus::IniSize))]
    #[case(4, Some(UploadErrorStatus::NoFile))]
    #[case(5, None)]
    #[case(8, Some(UploadErrorStatus::Extension))]
    #[case(9, None)]
    #[case(-1, None)]
    fn test_error_status_from_code(#[case] code: i32, #[case] expected: Option<UploadErrorStatus>) {
        assert_eq!(UploadErrorStatus::try_from(code).ok(), expected);
    }

    #[test]
    fn test_invalid_error_status_is_rejected() {
        let result = UploadedFile::with_error_code(Some(Stream::empty().into()), Some(0), 9, None, None);
        assert!(matches!(result, Err(UploadError::InvalidErrorStatus(9))));
    }

    #[test]
    fn test_missing_source_is_rejected_on_success() {
        let result = UploadedFile::new(None, Some(0), UploadErrorStatus::Ok, None, None);
        assert!(matches!(result, Err(UploadError::InvalidFileSource)));
    }

    #[test]
    fn test_missing_source_is_allowed_on_failure() {
        let file = UploadedFile::new(None, None, UploadErrorStatus::NoFile, None, None).unwrap();
        assert_eq!(file.error(), UploadErrorStatus::NoFile);
    }

    #[test]
    fn test_accessors() {
        let file = UploadedFile::new(
            Some(Stream::empty().into()),
            Some(123),
            UploadErrorStatus::Ok,
            Some("avatar.png".into()),
            Some("image/png".into()),
        ).unwrap();

        assert_eq!(file.size(), Some(123));
        assert_eq!(file.client_filename(), Some("avatar.png"));
        assert_eq!(file.client_media_type(), Some("image/png"));
        assert!(!file.is_moved());
    }

    #[test]
    fn test_stream_returns_original_stream() {
        let stream = SharedStream::from_contents("data");
        let file = UploadedFile::new(Some(stream.clone().into()), Some(4), UploadErrorStatus::Ok, None, None).unwrap();
        assert!(file.stream().unwrap().ptr_eq(&stream));
    }

    #[rstest]
    #[case(UploadErrorStatus::IniSize)]
    #[case(UploadErrorStatus::FormSize)]
    #[case(UploadErrorStatus::Partial)]
    #[case(UploadErrorStatus::NoFile)]
    #[case(UploadErrorStatus::NoTmpDir)]
    #[case(UploadErrorStatus::CantWrite)]
    #[case(UploadErrorStatus::Extension)]
    fn test_failed_upload_refuses_access(#[case] status: UploadErrorStatus) {
        let dir = tempfile::tempdir().unwrap();
        let file = UploadedFile::new(Some(Stream::empty().into()), Some(0), status, Some("name".into()), None).unwrap();

        assert!(matches!(file.stream(), Err(UploadError::UploadFailed(s)) if s == status));
        assert!(matches!(file.move_to(dir.path().join("target")), Err(UploadError::UploadFailed(..))));
    }

    #[test]
    fn test_empty_target_is_rejected() {
        let file = UploadedFile::new(Some(Stream::empty().into()), None, UploadErrorStatus::Ok, None, None).unwrap();
        assert!(matches!(file.move_to(""), Err(UploadError::InvalidTargetPath)));
        assert!(!file.is_moved());
    }
}
