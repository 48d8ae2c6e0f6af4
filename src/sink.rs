// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use jiff::Zoned;

use crate::Error;
use crate::ErrorKind;
use crate::Trap;
use crate::rotation::RotationState;

/// The active log file behind a large write buffer.
///
/// All access goes through the logger's write lock; the sink does no locking of its own.
#[derive(Debug)]
pub(crate) struct FileSink {
    buffer_size: usize,
    path: Option<PathBuf>,
    writer: Option<BufWriter<File>>,
    state: RotationState,
}

impl FileSink {
    pub(crate) fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            path: None,
            writer: None,
            state: RotationState::default(),
        }
    }

    pub(crate) fn state(&self) -> &RotationState {
        &self.state
    }

    pub(crate) fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn open(&self, path: &Path) -> Result<BufWriter<File>, Error> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|err| {
                Error::new(ErrorKind::Open, "failed to create log directory")
                    .with_context("path", dir.display())
                    .with_source(err)
            })?;
        }

        let mut options = OpenOptions::new();
        options.append(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o664);
        }

        let file = options.open(path).map_err(|err| {
            Error::new(ErrorKind::Open, "failed to open log file")
                .with_context("path", path.display())
                .with_source(err)
        })?;
        Ok(BufWriter::with_capacity(self.buffer_size, file))
    }

    /// Close the current file, if any, and start appending to `path`.
    ///
    /// The old file is flushed and closed before the new one is opened. On failure the sink is
    /// left without a file.
    pub(crate) fn rotate(&mut self, path: &Path, now: &Zoned, trap: &dyn Trap) -> Result<(), Error> {
        if let Err(err) = self.close() {
            let err = Error::new(ErrorKind::Io, "failed to flush previous log file")
                .with_context("path", self.path.as_deref().unwrap_or(path).display())
                .with_source(err);
            trap.trap(&err);
        }

        let writer = self.open(path)?;
        self.writer = Some(writer);
        self.path = Some(path.to_path_buf());
        self.state = RotationState::opened_at(now);
        Ok(())
    }

    /// Append `bytes` to the write buffer, counting them towards size rotation.
    pub(crate) fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let writer = self.writer.as_mut().ok_or_else(closed)?;
        writer.write_all(bytes)?;
        self.state.bytes_written += bytes.len() as u64;
        Ok(bytes.len())
    }

    /// Push buffered bytes to the OS and ask for them to reach stable storage.
    pub(crate) fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            None => Ok(()),
            Some(writer) => {
                writer.flush()?;
                writer.get_ref().sync_all()
            }
        }
    }

    /// Flush and drop the current file.
    pub(crate) fn close(&mut self) -> io::Result<()> {
        match self.writer.take() {
            None => Ok(()),
            Some(mut writer) => writer.flush(),
        }
    }
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "log file is closed")
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use tempfile::TempDir;

    use super::*;
    use crate::trap::DefaultTrap;

    #[test]
    fn test_rotate_resets_state() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("first.log");
        let second = temp_dir.path().join("nested").join("second.log");
        let trap = DefaultTrap::default();

        let mut sink = FileSink::new(1024);
        let opened = Zoned::from_str("2024-08-10T07:00:00[UTC]").unwrap();
        sink.rotate(&first, &opened, &trap).unwrap();
        assert_eq!(sink.write(b"hello\n").unwrap(), 6);
        assert_eq!(sink.write(b"world\n").unwrap(), 6);
        assert_eq!(sink.state().bytes_written, 12);
        assert_eq!(sink.state().hour, 7);

        // buffered, not yet on disk
        assert_eq!(fs::read(&first).unwrap(), b"");

        let rotated = Zoned::from_str("2024-08-11T09:00:00[UTC]").unwrap();
        sink.rotate(&second, &rotated, &trap).unwrap();
        assert_eq!(fs::read(&first).unwrap(), b"hello\nworld\n");
        assert_eq!(
            *sink.state(),
            RotationState {
                bytes_written: 0,
                hour: 9,
                day: 11
            }
        );
        assert_eq!(sink.path(), Some(second.as_path()));

        sink.write(b"again\n").unwrap();
        sink.flush().unwrap();
        assert_eq!(fs::read(&second).unwrap(), b"again\n");
    }

    #[test]
    fn test_open_appends_to_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        fs::write(&path, b"existing\n").unwrap();

        let mut sink = FileSink::new(1024);
        sink.rotate(&path, &Zoned::now(), &DefaultTrap::default())
            .unwrap();
        sink.write(b"appended\n").unwrap();
        sink.close().unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"existing\nappended\n");
    }

    #[test]
    fn test_write_after_close_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");

        let mut sink = FileSink::new(1024);
        sink.rotate(&path, &Zoned::now(), &DefaultTrap::default())
            .unwrap();
        sink.close().unwrap();

        let err = sink.write(b"lost\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
        assert_eq!(sink.state().bytes_written, 0);
        sink.flush().unwrap();
    }

    #[test]
    fn test_open_failure_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        // a directory cannot be opened for appending
        let path = temp_dir.path().to_path_buf();

        let mut sink = FileSink::new(1024);
        let err = sink
            .rotate(&path, &Zoned::now(), &DefaultTrap::default())
            .unwrap_err();
        assert_eq!(err.message(), "failed to open log file");
        assert_eq!(err.context("path"), Some(path.display().to_string().as_str()));
        assert!(sink.write(b"x").is_err());
    }
}
