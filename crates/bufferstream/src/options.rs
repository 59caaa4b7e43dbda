//! Stream configuration.

use std::fs::OpenOptions;

use serde::{Deserialize, Serialize};

/// Behavioral flags of a [`BufferStream`](crate::BufferStream).
///
/// Missing fields deserialize to their defaults, so a partial config such as
/// `{"big_endian": true}` is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOptions {
    /// Turn bounds and conversion violations into errors.
    ///
    /// When disabled nothing is checked: reads past the end yield zero bytes,
    /// writes past the end are dropped, seeks are applied as given, and
    /// composite values are copied without endianness conversion.
    pub exceptions_enabled: bool,
    /// Read and write multi-byte scalars most significant byte first.
    pub big_endian: bool,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            exceptions_enabled: true,
            big_endian: false,
        }
    }
}

/// How a [`FileStream`](crate::FileStream) opens its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStreamOptions {
    pub read: bool,
    pub write: bool,
    /// Writes go to the end of the file. Implies `write`.
    pub append: bool,
    /// Discard existing contents. Implies `write`.
    pub truncate: bool,
    /// Create the file, and any missing parent directories, if absent.
    /// Only honored together with write access.
    pub create: bool,
    /// Byte order for multi-byte scalars.
    pub big_endian: bool,
}

impl Default for FileStreamOptions {
    fn default() -> Self {
        Self {
            read: true,
            write: false,
            append: false,
            truncate: false,
            create: false,
            big_endian: false,
        }
    }
}

impl FileStreamOptions {
    /// Read-only access, the default.
    pub fn read_only() -> Self {
        Self::default()
    }

    /// Read and write access, creating the file if needed.
    pub fn read_write() -> Self {
        Self {
            write: true,
            create: true,
            ..Self::default()
        }
    }

    pub fn read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    pub fn write(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    pub fn truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    pub fn big_endian(mut self, big_endian: bool) -> Self {
        self.big_endian = big_endian;
        self
    }

    /// Whether the file is opened for writing at all.
    pub fn writes(&self) -> bool {
        self.write || self.append || self.truncate
    }

    pub(crate) fn open_options(&self) -> OpenOptions {
        let mut open = OpenOptions::new();
        open.read(self.read || !self.writes())
            .write(self.writes())
            .append(self.append)
            .truncate(self.truncate && !self.append)
            .create(self.create && self.writes());
        open
    }
}
