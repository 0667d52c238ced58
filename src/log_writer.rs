//! Size-rotated, append-only log files, plus the error-log channel.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

/// Rotation threshold for the measurement logs.
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// An append-only log file that rotates to a single `.1` backup once it
/// grows past a size threshold. Every write is flushed immediately so a
/// concurrent reader only ever sees whole lines plus at most one partial
/// tail.
pub struct RotatingLog {
    path: PathBuf,
    file: Option<File>,
    max_size: u64,
}

impl RotatingLog {
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        Self::with_max_size(path, MAX_LOG_SIZE)
    }

    pub fn with_max_size(path: impl Into<PathBuf>, max_size: u64) -> io::Result<Self> {
        let path = path.into();
        let file = open_append(&path)?;
        Ok(Self {
            path,
            file: Some(file),
            max_size,
        })
    }

    /// Append one record line, rotating first if the file has exceeded
    /// the size threshold.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.rotate_if_needed()?;
        let file = match self.file.take() {
            Some(file) => file,
            None => open_append(&self.path)?,
        };
        let file = self.file.insert(file);
        writeln!(file, "{line}")?;
        file.flush()
    }

    fn rotate_if_needed(&mut self) -> io::Result<()> {
        if fs::metadata(&self.path)?.len() <= self.max_size {
            return Ok(());
        }
        // Close the active handle before renaming; Windows refuses to
        // rename a file that is still open.
        self.file = None;
        let backup = backup_path(&self.path);
        if backup.exists() {
            fs::remove_file(&backup)?;
        }
        fs::rename(&self.path, &backup)?;
        self.file = Some(open_append(&self.path)?);
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".1");
    PathBuf::from(name)
}

/// Append a timestamped diagnostic to the error log, creating the file
/// on first use. This channel never rotates.
pub fn append_error(path: &str, context: &str, detail: &str) -> io::Result<()> {
    let mut file = open_append(Path::new(path))?;
    writeln!(
        file,
        "{} - {}:\n{}",
        Local::now().naive_local().format("%Y-%m-%d %H:%M:%S"),
        context,
        detail
    )?;
    file.flush()
}
