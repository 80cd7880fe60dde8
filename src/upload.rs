//! Uploaded media held in scoped temporary files.
//!
//! Decoders want a path, callers often have bytes. [`MediaUpload`] copies a
//! byte stream into a named temporary file whose suffix matches the declared
//! [`Container`], and deletes it when dropped. Only a small fixed set of
//! containers is accepted.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    io::{self, Read, Write},
    path::Path,
};

use tempfile::{Builder as TempFileBuilder, NamedTempFile};

use crate::error::FramemoodError;

/// Whether a container holds moving or still images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Image,
}

/// Accepted upload containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    Mp4,
    Mov,
    Avi,
    Jpeg,
    Png,
}

impl Container {
    /// Every accepted container.
    pub const ALL: [Container; 5] = [
        Container::Mp4,
        Container::Mov,
        Container::Avi,
        Container::Jpeg,
        Container::Png,
    ];

    /// Parse a file extension (case-insensitive, leading dot allowed).
    ///
    /// # Errors
    ///
    /// Returns [`FramemoodError::UnsupportedContainer`] for anything outside
    /// the accepted set.
    pub fn from_extension(extension: &str) -> Result<Self, FramemoodError> {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "mp4" => Ok(Container::Mp4),
            "mov" => Ok(Container::Mov),
            "avi" => Ok(Container::Avi),
            "jpg" | "jpeg" => Ok(Container::Jpeg),
            "png" => Ok(Container::Png),
            other => Err(FramemoodError::UnsupportedContainer(other.to_string())),
        }
    }

    /// Infer the container from a path's extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FramemoodError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .ok_or_else(|| FramemoodError::UnsupportedContainer(path.display().to_string()))?;
        Self::from_extension(extension)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Mov => "mov",
            Container::Avi => "avi",
            Container::Jpeg => "jpg",
            Container::Png => "png",
        }
    }

    pub fn kind(self) -> MediaKind {
        match self {
            Container::Mp4 | Container::Mov | Container::Avi => MediaKind::Video,
            Container::Jpeg | Container::Png => MediaKind::Image,
        }
    }

    /// Like [`from_path`](Container::from_path), but also require `kind`.
    pub fn expect_kind<P: AsRef<Path>>(path: P, kind: MediaKind) -> Result<Self, FramemoodError> {
        let container = Self::from_path(&path)?;
        if container.kind() != kind {
            return Err(FramemoodError::UnsupportedContainer(format!(
                "{} is not a {kind:?} container",
                container.extension()
            )));
        }
        Ok(container)
    }
}

impl Display for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.extension())
    }
}

/// A byte stream written to a temporary file for decoding.
///
/// The file is removed when this value is dropped.
#[derive(Debug)]
pub struct MediaUpload {
    file: NamedTempFile,
    container: Container,
    len: u64,
}

impl MediaUpload {
    /// Copy `reader` into a new temporary file.
    ///
    /// # Errors
    ///
    /// Returns [`FramemoodError::IoError`] if the file cannot be created or
    /// written.
    pub fn from_reader<R: Read>(mut reader: R, container: Container) -> Result<Self, FramemoodError> {
        let mut file = TempFileBuilder::new()
            .prefix("framemood-")
            .suffix(&format!(".{}", container.extension()))
            .tempfile()?;
        let len = io::copy(&mut reader, &mut file)?;
        file.flush()?;
        log::debug!(
            "Buffered {len} byte(s) of {container} upload at {}",
            file.path().display()
        );
        Ok(Self {
            file,
            container,
            len,
        })
    }

    pub fn from_bytes(bytes: &[u8], container: Container) -> Result<Self, FramemoodError> {
        Self::from_reader(bytes, container)
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn container(&self) -> Container {
        self.container
    }

    /// Number of bytes written.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
