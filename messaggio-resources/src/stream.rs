// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{
    fmt,
    io::SeekFrom,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    AccessMode,
    FileResource,
    MemoryResource,
    Resource,
    StreamError,
};

/// The size of the buffer used by [`Stream::contents`] per read call.
const CONTENTS_CHUNK_SIZE: usize = 8192;

/// The most bytes a single [`Stream::read`] asks of the resource at once.
const READ_CHUNK_SIZE: usize = 8192;

/// A byte stream over a single [`Resource`].
///
/// The capabilities of the stream are derived once, from the access mode of
/// the resource. Detaching or closing the stream drops them all.
pub struct Stream {
    resource: Option<Box<dyn Resource>>,
    readable: bool,
    writable: bool,
    seekable: bool,
    eof: bool,
}

impl Stream {
    pub fn new(resource: impl Resource + 'static) -> Self {
        Self::from_boxed(Box::new(resource))
    }

    pub fn from_boxed(resource: Box<dyn Resource>) -> Self {
        let AccessMode { readable, writable } = AccessMode::from_mode(resource.mode());
        let seekable = resource.is_seekable();
        Self {
            resource: Some(resource),
            readable,
            writable,
            seekable,
            eof: false,
        }
    }

    /// Creates a readable, writable and seekable in-memory stream, positioned
    /// at the start of `contents`.
    pub fn from_contents(contents: impl Into<Vec<u8>>) -> Self {
        Self::new(MemoryResource::with_contents(contents))
    }

    pub fn empty() -> Self {
        Self::new(MemoryResource::new())
    }

    /// Opens a file with an `fopen`-style mode, e.g. `"r"` or `"w+b"`.
    pub fn open(path: impl AsRef<Path>, mode: &str) -> Result<Self, StreamError> {
        FileResource::open(path, mode).map(Self::new)
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn is_seekable(&self) -> bool {
        self.seekable
    }

    pub fn is_detached(&self) -> bool {
        self.resource.is_none()
    }

    /// Separates the resource from the stream, leaving the stream unusable.
    pub fn detach(&mut self) -> Option<Box<dyn Resource>> {
        self.readable = false;
        self.writable = false;
        self.seekable = false;
        self.resource.take()
    }

    /// Flushes and drops the resource. Calling this on a detached stream does
    /// nothing.
    pub fn close(&mut self) {
        if let Some(mut resource) = self.detach() {
            if let Err(_error) = resource.flush() {
                #[cfg(feature = "debugging")]
                eprintln!("[Stream] Failed to flush resource on close: {_error}");
            }
        }
    }

    /// Whether the end of the stream was reached by a previous read, or the
    /// stream is detached.
    pub fn eof(&self) -> bool {
        self.resource.is_none() || self.eof
    }

    /// The size of the stream in bytes, if the resource knows it. The
    /// resource is asked on every call.
    pub fn size(&mut self) -> Option<u64> {
        self.resource.as_mut()?.stat_size().ok().flatten()
    }

    pub fn tell(&mut self) -> Result<u64, StreamError> {
        self.resource_mut()?
            .tell()
            .map_err(StreamError::TellFailed)
    }

    pub fn seek(&mut self, position: SeekFrom) -> Result<u64, StreamError> {
        if !self.seekable {
            return Err(StreamError::NotSeekable);
        }

        let offset = self.resource_mut()?
            .seek(position)
            .map_err(StreamError::SeekFailed)?;
        self.eof = false;
        Ok(offset)
    }

    pub fn rewind(&mut self) -> Result<(), StreamError> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }

    /// Reads up to `length` bytes. Fewer bytes are returned when the end of
    /// the stream is reached.
    pub fn read(&mut self, length: usize) -> Result<Vec<u8>, StreamError> {
        if !self.readable {
            return Err(StreamError::NotReadable);
        }

        let resource = self.resource.as_mut().ok_or(StreamError::Detached)?;

        let mut buffer = Vec::new();
        let mut chunk = [0; READ_CHUNK_SIZE];
        while buffer.len() < length {
            let wanted = (length - buffer.len()).min(READ_CHUNK_SIZE);
            let count = resource.read(&mut chunk[..wanted]).map_err(StreamError::ReadFailed)?;
            if count == 0 {
                self.eof = true;
                break;
            }
            buffer.extend_from_slice(&chunk[..count]);
        }

        Ok(buffer)
    }

    /// Writes the data, returning the number of bytes written.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, StreamError> {
        if !self.writable {
            return Err(StreamError::NotWritable);
        }

        self.resource_mut()?
            .write(data)
            .map_err(StreamError::WriteFailed)
    }

    /// Reads the remainder of the stream.
    pub fn contents(&mut self) -> Result<Vec<u8>, StreamError> {
        if !self.readable {
            return Err(StreamError::NotReadable);
        }

        let mut contents = Vec::new();
        loop {
            let chunk = self.read(CONTENTS_CHUNK_SIZE)?;
            if chunk.is_empty() {
                return Ok(contents);
            }
            contents.extend_from_slice(&chunk);
        }
    }

    /// Reads the whole stream from the start (when seekable) as a string. Any
    /// failure results in the empty string.
    pub fn to_string_lossy(&mut self) -> String {
        let result = if self.seekable {
            self.rewind().and_then(|()| self.contents())
        } else {
            self.contents()
        };

        match result {
            Ok(contents) => String::from_utf8_lossy(&contents).into_owned(),
            Err(_error) => {
                #[cfg(feature = "debugging")]
                eprintln!("[Stream] Failed to stringify stream: {_error}");
                String::new()
            }
        }
    }

    /// The metadata of the resource, or `None` if the stream is detached.
    pub fn metadata(&self) -> Option<StreamMetadata> {
        let resource = self.resource.as_ref()?;
        Some(StreamMetadata {
            mode: resource.mode().to_string(),
            seekable: self.seekable,
            uri: resource.uri().map(str::to_string),
            wrapper_type: resource.wrapper_type(),
            stream_type: resource.stream_type(),
        })
    }

    /// Looks up a single metadata entry by its key, e.g. `"mode"`.
    pub fn metadata_value(&self, key: &str) -> Option<String> {
        self.metadata()?.get(key)
    }

    fn resource_mut(&mut self) -> Result<&mut Box<dyn Resource>, StreamError> {
        self.resource.as_mut().ok_or(StreamError::Detached)
    }
}

impl Default for Stream {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("mode", &self.resource.as_ref().map(|resource| resource.mode()))
            .field("readable", &self.readable)
            .field("writable", &self.writable)
            .field("seekable", &self.seekable)
            .field("eof", &self.eof)
            .finish()
    }
}

/// The metadata of a resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamMetadata {
    pub mode: String,
    pub seekable: bool,
    pub uri: Option<String>,
    pub wrapper_type: &'static str,
    pub stream_type: &'static str,
}

impl StreamMetadata {
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "mode" => Some(self.mode.clone()),
            "seekable" => Some(self.seekable.to_string()),
            "uri" => self.uri.clone(),
            "wrapper_type" => Some(self.wrapper_type.to_string()),
            "stream_type" => Some(self.stream_type.to_string()),
            _ => None,
        }
    }
}

/// A handle to a [`Stream`] that can be held by multiple messages.
///
/// Cloning the handle does not clone the stream: every clone refers to the
/// same resource and the same position. Only one holder should use the
/// stream at a time.
#[derive(Clone, Debug)]
pub struct SharedStream {
    inner: Arc<Mutex<Stream>>,
}

impl SharedStream {
    pub fn new(stream: Stream) -> Self {
        Self {
            inner: Arc::new(Mutex::new(stream)),
        }
    }

    pub fn empty() -> Self {
        Self::new(Stream::empty())
    }

    pub fn from_contents(contents: impl Into<Vec<u8>>) -> Self {
        Self::new(Stream::from_contents(contents))
    }

    /// Gains access to the stream. A panic of a previous holder doesn't make
    /// the stream inaccessible.
    pub fn lock(&self) -> MutexGuard<'_, Stream> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether both handles refer to the same stream.
    pub fn ptr_eq(&self, other: &SharedStream) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for SharedStream {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Stream> for SharedStream {
    fn from(stream: Stream) -> Self {
        Self::new(stream)
    }
}

impl fmt::Display for SharedStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lock().to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// A resource that is only readable and fails every other operation.
    struct BrokenPipe;

    impl Resource for BrokenPipe {
        fn mode(&self) -> &str {
            "r"
        }

        fn is_seekable(&self) -> bool {
            false
        }

        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn seek(&mut self, _: SeekFrom) -> io::Result<u64> {
            Err(io::ErrorKind::Unsupported.into())
        }

        fn tell(&mut self) -> io::Result<u64> {
            Err(io::ErrorKind::Unsupported.into())
        }

        fn stat_size(&mut self) -> io::Result<Option<u64>> {
            Ok(None)
        }

        fn wrapper_type(&self) -> &'static str {
            "test"
        }

        fn stream_type(&self) -> &'static str {
            "PIPE"
        }
    }

    #[test]
    fn test_memory_stream_capabilities() {
        let stream = Stream::empty();
        assert!(stream.is_readable());
        assert!(stream.is_writable());
        assert!(stream.is_seekable());
        assert!(!stream.eof());
    }

    #[test]
    fn test_read_write_seek() {
        let mut stream = Stream::empty();
        assert_eq!(stream.write(b"foobarbaz").unwrap(), 9);
        assert_eq!(stream.tell().unwrap(), 9);

        stream.seek(SeekFrom::Start(3)).unwrap();
        assert_eq!(stream.read(3).unwrap(), b"bar");
        assert!(!stream.eof());

        assert_eq!(stream.read(10).unwrap(), b"baz");
        assert!(stream.eof());

        stream.rewind().unwrap();
        assert!(!stream.eof());
        assert_eq!(stream.contents().unwrap(), b"foobarbaz");
    }

    #[test]
    fn test_size_follows_writes() {
        let mut stream = Stream::from_contents("abc");
        assert_eq!(stream.size(), Some(3));

        stream.seek(SeekFrom::End(0)).unwrap();
        stream.write(b"def").unwrap();
        assert_eq!(stream.size(), Some(6));
    }

    #[test]
    fn test_detach_resets_capabilities() {
        let mut stream = Stream::from_contents("abc");
        assert!(stream.detach().is_some());

        assert!(stream.is_detached());
        assert!(stream.eof());
        assert!(!stream.is_readable());
        assert!(!stream.is_writable());
        assert!(!stream.is_seekable());
        assert_eq!(stream.size(), None);
        assert!(stream.metadata().is_none());
        assert!(matches!(stream.read(1), Err(StreamError::NotReadable)));
        assert!(matches!(stream.write(b"x"), Err(StreamError::NotWritable)));
        assert!(matches!(stream.seek(SeekFrom::Start(0)), Err(StreamError::NotSeekable)));
        assert!(matches!(stream.tell(), Err(StreamError::Detached)));
        assert!(stream.detach().is_none());
    }

    #[test]
    fn test_close_after_detach_does_nothing() {
        let mut stream = Stream::empty();
        let _resource = stream.detach();
        stream.close();
        assert!(stream.is_detached());
    }

    #[test]
    fn test_read_only_stream() {
        let mut stream = Stream::new(BrokenPipe);
        assert!(stream.is_readable());
        assert!(!stream.is_writable());
        assert!(!stream.is_seekable());

        assert!(matches!(stream.write(b"x"), Err(StreamError::NotWritable)));
        assert!(matches!(stream.seek(SeekFrom::Start(0)), Err(StreamError::NotSeekable)));
        assert!(matches!(stream.read(4), Err(StreamError::ReadFailed(..))));
        assert!(matches!(stream.tell(), Err(StreamError::TellFailed(..))));
        assert_eq!(stream.to_string_lossy(), "");
    }

    #[test]
    fn test_to_string_lossy_rewinds() {
        let mut stream = Stream::from_contents("hello world");
        stream.read(5).unwrap();
        assert_eq!(stream.to_string_lossy(), "hello world");
    }

    #[test]
    fn test_metadata() {
        let stream = Stream::empty();
        let metadata = stream.metadata().unwrap();
        assert_eq!(metadata.mode, "w+b");
        assert!(metadata.seekable);
        assert_eq!(stream.metadata_value("mode").as_deref(), Some("w+b"));
        assert_eq!(stream.metadata_value("uri").as_deref(), Some("memory"));
        assert_eq!(stream.metadata_value("unknown"), None);
    }

    #[test]
    fn test_file_stream_modes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.txt");

        let mut writer = Stream::open(&path, "w").unwrap();
        assert!(!writer.is_readable());
        assert!(writer.is_writable());
        writer.write(b"contents").unwrap();
        writer.close();

        let mut reader = Stream::open(&path, "r").unwrap();
        assert!(reader.is_readable());
        assert!(!reader.is_writable());
        assert_eq!(reader.size(), Some(8));
        assert_eq!(reader.contents().unwrap(), b"contents");
    }

    #[test]
    fn test_size_is_not_remembered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("growing.txt");
        std::fs::write(&path, "1234").unwrap();

        let mut reader = Stream::open(&path, "r").unwrap();
        assert_eq!(reader.size(), Some(4));

        std::fs::write(&path, "12345678").unwrap();
        assert_eq!(reader.size(), Some(8));
    }

    #[test]
    fn test_read_length_past_the_end() {
        let mut stream = Stream::from_contents("abc");
        assert_eq!(stream.read(usize::MAX).unwrap(), b"abc");
        assert!(stream.eof());
    }

    #[test]
    fn test_read_spanning_chunks() {
        let contents = vec![7u8; READ_CHUNK_SIZE * 2 + 5];
        let mut stream = Stream::from_contents(contents.clone());
        assert_eq!(stream.read(READ_CHUNK_SIZE + 1).unwrap().len(), READ_CHUNK_SIZE + 1);
        assert_eq!(stream.read(usize::MAX).unwrap().len(), READ_CHUNK_SIZE + 4);
        assert!(stream.eof());
    }

    #[test]
    fn test_shared_stream_clones_share_position() {
        let shared = SharedStream::from_contents("abcdef");
        let clone = shared.clone();
        assert!(shared.ptr_eq(&clone));

        assert_eq!(shared.lock().read(3).unwrap(), b"abc");
        assert_eq!(clone.lock().read(3).unwrap(), b"def");
        assert_eq!(clone.to_string(), "abcdef");
        assert!(!shared.ptr_eq(&SharedStream::empty()));
    }
}
