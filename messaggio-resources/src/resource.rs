// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! The I/O boundary of a [`Stream`](crate::Stream).
//!
//! A [`Resource`] is anything a stream can be backed by. Two implementations
//! are provided: [`MemoryResource`] for temporary, in-memory contents and
//! [`FileResource`] for files opened with an `fopen`-style mode.

use std::{
    fs::File,
    io::{self, Cursor, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use crate::{
    mode::{canonical_mode, open_options},
    StreamError,
};

pub trait Resource: Send {
    /// The access mode the resource was opened with, e.g. `"r"` or `"w+b"`.
    fn mode(&self) -> &str;

    fn is_seekable(&self) -> bool;

    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize>;

    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    fn seek(&mut self, position: SeekFrom) -> io::Result<u64>;

    fn tell(&mut self) -> io::Result<u64>;

    /// The size of the underlying data, if the resource is able to tell.
    fn stat_size(&mut self) -> io::Result<Option<u64>>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// The location of the resource, e.g. the path of a file.
    fn uri(&self) -> Option<&str> {
        None
    }

    /// The kind of wrapper the data is accessed through, e.g. `"file"`.
    fn wrapper_type(&self) -> &'static str;

    /// The kind of the resource itself, e.g. `"FILE"` or `"MEMORY"`.
    fn stream_type(&self) -> &'static str;
}

/// A temporary resource that lives in memory.
#[derive(Debug, Default)]
pub struct MemoryResource {
    cursor: Cursor<Vec<u8>>,
}

impl MemoryResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resource containing `contents`, positioned at the start.
    pub fn with_contents(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            cursor: Cursor::new(contents.into()),
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.cursor.into_inner()
    }
}

impl Resource for MemoryResource {
    fn mode(&self) -> &str {
        "w+b"
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buffer)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.cursor.write(data)
    }

    fn seek(&mut self, position: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(position)
    }

    fn tell(&mut self) -> io::Result<u64> {
        Ok(self.cursor.position())
    }

    fn stat_size(&mut self) -> io::Result<Option<u64>> {
        Ok(Some(self.cursor.get_ref().len() as u64))
    }

    fn uri(&self) -> Option<&str> {
        Some("memory")
    }

    fn wrapper_type(&self) -> &'static str {
        "memory"
    }

    fn stream_type(&self) -> &'static str {
        "MEMORY"
    }
}

/// A file on disk.
#[derive(Debug)]
pub struct FileResource {
    file: File,
    mode: String,
    path: PathBuf,
    uri: String,
}

impl FileResource {
    /// Opens the file at `path` using an `fopen`-style mode string.
    pub fn open(path: impl AsRef<Path>, mode: &str) -> Result<Self, StreamError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(StreamError::EmptyFilename);
        }

        let file = open_options(mode)?
            .open(path)
            .map_err(|error| StreamError::OpenFailed { path: path.to_path_buf(), error })?;

        Ok(Self {
            file,
            mode: canonical_mode(mode),
            path: path.to_path_buf(),
            uri: path.to_string_lossy().into_owned(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Resource for FileResource {
    fn mode(&self) -> &str {
        &self.mode
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        self.file.read(buffer)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.file.write(data)
    }

    fn seek(&mut self, position: SeekFrom) -> io::Result<u64> {
        self.file.seek(position)
    }

    fn tell(&mut self) -> io::Result<u64> {
        self.file.stream_position()
    }

    fn stat_size(&mut self) -> io::Result<Option<u64>> {
        Ok(Some(self.file.metadata()?.len()))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    fn uri(&self) -> Option<&str> {
        Some(&self.uri)
    }

    fn wrapper_type(&self) -> &'static str {
        "file"
    }

    fn stream_type(&self) -> &'static str {
        "FILE"
    }
}
