//! Size-rotated log file
//!
//! Appends to `<dir>/<name>`; when the next write would push the file past
//! `max_bytes` it is renamed to `<name>.1`, older backups shift up by one,
//! and the oldest beyond `backups` is removed.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Append-only writer with size-based rotation
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backups: u32,
    file: File,
    written: u64,
}

impl RotatingFile {
    /// Open (or create) the active log file, creating parent directories
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backups: u32) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = open_append(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            path,
            max_bytes,
            backups,
            file,
            written,
        })
    }

    /// `<name>.n`
    fn backup_path(&self, n: u32) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(format!(".{}", n));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.backups == 0 {
            self.file = OpenOptions::new()
                .write(true)
                .truncate(true)
                .open(&self.path)?;
            self.written = 0;
            return Ok(());
        }

        // Remove the oldest if at capacity
        let oldest = self.backup_path(self.backups);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        // Shift existing backups up by one
        for n in (1..self.backups).rev() {
            let src = self.backup_path(n);
            if src.exists() {
                fs::rename(&src, self.backup_path(n + 1))?;
            }
        }

        fs::rename(&self.path, self.backup_path(1))?;
        self.file = open_append(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // A record larger than the limit still lands in a fresh file
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }

        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
