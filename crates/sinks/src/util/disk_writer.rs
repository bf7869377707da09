//! Buffered local file writer
//!
//! Wraps a file opened in append mode with a `BufWriter` and keeps track of
//! the file's size so rotation can be decided without a syscall per message.
//!
//! # Example
//!
//! ```ignore
//! use spool_sinks::{DiskWriter, FileStateWriter};
//! use std::io::Write;
//!
//! let mut writer = DiskWriter::open("logs/app.log", 64 * 1024)?;
//! writer.write_all(b"hello world\n")?;
//! Box::new(writer).close()?;
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::file_state::FileStateWriter;

/// Default write buffer size (64KB)
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Buffered file writer bound to one path
#[derive(Debug)]
pub struct DiskWriter {
    path: PathBuf,
    name: String,
    writer: BufWriter<File>,

    /// Existing length at open plus bytes accepted since
    size: u64,
}

impl DiskWriter {
    /// Open `path` for appending, creating parent directories as needed
    pub fn open(path: impl Into<PathBuf>, buffer_size: usize) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            name: path.display().to_string(),
            path,
            writer: BufWriter::with_capacity(buffer_size.max(1), file),
            size,
        })
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Write for DiskWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.writer.write(buf)?;
        self.size += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl FileStateWriter for DiskWriter {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn is_accessible(&self) -> bool {
        self.writer.get_ref().metadata().is_ok()
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        let file = self.writer.into_inner().map_err(io::IntoInnerError::into_error)?;
        file.sync_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/app.log");

        let writer = DiskWriter::open(&path, DEFAULT_BUFFER_SIZE).unwrap();
        assert!(path.exists());
        assert_eq!(writer.path(), path);
        assert_eq!(writer.name(), path.display().to_string());
        assert_eq!(writer.size(), 0);
    }

    #[test]
    fn test_size_counts_buffered_bytes() {
        let dir = TempDir::new().unwrap();
        let mut writer = DiskWriter::open(dir.path().join("a.log"), DEFAULT_BUFFER_SIZE).unwrap();

        writer.write_all(b"hello\n").unwrap();
        writer.write_all(b"world\n").unwrap();
        assert_eq!(writer.size(), 12);
    }

    #[test]
    fn test_append_keeps_existing_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.log");
        fs::write(&path, b"existing\n").unwrap();

        let mut writer = DiskWriter::open(&path, DEFAULT_BUFFER_SIZE).unwrap();
        assert_eq!(writer.size(), 9);

        writer.write_all(b"new\n").unwrap();
        Box::new(writer).close().unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"existing\nnew\n");
    }

    #[test]
    fn test_flush_makes_data_visible() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.log");
        let mut writer = DiskWriter::open(&path, DEFAULT_BUFFER_SIZE).unwrap();

        writer.write_all(b"line\n").unwrap();
        assert!(fs::read(&path).unwrap().is_empty());

        writer.flush().unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"line\n");
    }

    #[test]
    fn test_open_handle_stays_accessible() {
        let dir = TempDir::new().unwrap();
        let writer = DiskWriter::open(dir.path().join("a.log"), DEFAULT_BUFFER_SIZE).unwrap();
        assert!(writer.is_accessible());
    }

    #[test]
    fn test_open_fails_when_parent_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();

        assert!(DiskWriter::open(blocker.join("a.log"), DEFAULT_BUFFER_SIZE).is_err());
    }
}
