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

mod builder;
pub use self::builder::DEFAULT_BUFFER_SIZE;
pub use self::builder::DEFAULT_FLUSH_INTERVAL;
pub use self::builder::LoggerBuilder;
pub use self::builder::Options;

mod daemon;
mod levels;
pub(crate) use self::levels::render;

use std::backtrace::Backtrace;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::thread;

use crate::CallSite;
use crate::Error;
use crate::ErrorKind;
use crate::Level;
use crate::Terminate;
use crate::Trap;
use crate::clock::Clock;
use crate::header::Header;
use crate::logger::daemon::FlushDaemon;
use crate::pool::BufferPool;
use crate::pool::PoolStats;
use crate::sink::FileSink;
use crate::terminate::EXIT_FATAL;
use crate::terminate::EXIT_ROTATE_FAILURE;

/// A leveled logger writing to a buffered, optionally rotated, file.
///
/// A `Logger` can be used simultaneously from multiple threads; every record is written under
/// one lock, so records never interleave and a rotation is never observed half done.
///
/// Records are buffered in memory and reach the file when the buffer fills, when the
/// background flush daemon ticks, when [`Logger::flush`] is called, or when the logger is
/// dropped. Records still buffered when the process exits without any of these are lost.
#[derive(Debug)]
pub struct Logger {
    shared: Arc<Shared>,
    daemon: FlushDaemon,
}

#[derive(Debug)]
struct Shared {
    options: Options,
    header: Header,
    clock: Clock,
    pool: BufferPool,
    trap: Box<dyn Trap>,
    terminate: Box<dyn Terminate>,

    // the write lock; guards the file and its rotation bookkeeping
    sink: Mutex<FileSink>,
}

impl Logger {
    /// Create a logger from [`Options`], opening the first log file and starting the flush
    /// daemon.
    ///
    /// # Errors
    ///
    /// Return an error if the log file cannot be opened.
    pub fn new(options: Options) -> Result<Logger, Error> {
        LoggerBuilder::from_options(options).build()
    }

    /// Create a [`LoggerBuilder`] writing to `file`.
    pub fn builder(file: impl Into<std::path::PathBuf>) -> LoggerBuilder {
        LoggerBuilder::new(file)
    }

    /// The configuration this logger was built with.
    pub fn options(&self) -> &Options {
        &self.shared.options
    }

    /// Whether records at `level` pass the configured threshold.
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.shared.options.level
    }

    /// Counters of the record buffer pool.
    pub fn pool_stats(&self) -> PoolStats {
        self.shared.pool.stats()
    }

    /// Write one record regardless of the threshold.
    ///
    /// The record is the configured prefix followed by `message`, with a newline appended
    /// unless `message` already ends with one. The write may rotate the log file first.
    ///
    /// A [`Level::Fatal`] record is followed by a backtrace of the calling thread; the file is
    /// then flushed and closed and the terminate hook runs with [`EXIT_FATAL`]. Failing to open
    /// a rotated file traps the error and runs the terminate hook with
    /// [`EXIT_ROTATE_FAILURE`].
    ///
    /// # Errors
    ///
    /// Return the error of writing into the file buffer, or of opening a rotated file if the
    /// terminate hook returns.
    pub fn output(
        &self,
        level: Level,
        site: Option<CallSite<'_>>,
        message: &str,
    ) -> Result<(), Error> {
        self.shared.output(level, site, message)
    }

    pub(crate) fn trap(&self, err: &Error) {
        self.shared.trap.trap(err);
    }

    /// Flush buffered records to the file and sync it to stable storage.
    ///
    /// # Errors
    ///
    /// Return an error if flushing or syncing fails.
    pub fn flush(&self) -> Result<(), Error> {
        self.shared.flush()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(err) = self.daemon.shutdown() {
            self.shared.trap.trap(&err);
        }
        if let Err(err) = self.shared.flush() {
            self.shared.trap.trap(&err);
        }
    }
}

impl Shared {
    fn sink(&self) -> MutexGuard<'_, FileSink> {
        self.sink.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn output(&self, level: Level, site: Option<CallSite<'_>>, message: &str) -> Result<(), Error> {
        let mut buf = self.pool.acquire();
        let now = self.clock.now();

        self.header.format(&mut buf, level, site, &now);
        buf.extend_from_slice(message.as_bytes());
        if !message.ends_with('\n') {
            buf.push(b'\n');
        }

        let mut sink = self.sink();

        let Options {
            file,
            mode,
            max_size,
            ..
        } = &self.options;
        if mode.should_rotate(sink.state(), &now, buf.len() as u64, *max_size) {
            let path = mode.file_name(file, &now);
            if let Err(err) = sink.rotate(&path, &now, self.trap.as_ref()) {
                drop(sink);
                drop(buf);
                let err = Error::new(ErrorKind::Rotate, "log: exiting because of error")
                    .with_source(err);
                self.trap.trap(&err);
                self.terminate.terminate(EXIT_ROTATE_FAILURE);
                return Err(err);
            }
        }

        let result = sink
            .write(&buf)
            .map(|_| ())
            .map_err(Error::from_io_error);

        if level == Level::Fatal {
            if let Err(err) = sink.write(capture_stack().as_bytes()) {
                let err = Error::new(ErrorKind::Io, "failed to write stack after fatal record")
                    .with_source(err);
                self.trap.trap(&err);
            }
            if let Err(err) = sink.close() {
                let err = Error::new(ErrorKind::Io, "failed to close log file after fatal record")
                    .with_source(err);
                self.trap.trap(&err);
            }
            drop(sink);
            drop(buf);
            self.terminate.terminate(EXIT_FATAL);
        }

        result
    }

    fn flush(&self) -> Result<(), Error> {
        let mut sink = self.sink();
        sink.flush().map_err(|err| {
            let err = Error::new(ErrorKind::Io, "failed to flush log file").with_source(err);
            match sink.path() {
                Some(path) => err.with_context("path", path.display()),
                None => err,
            }
        })
    }
}

/// Render a backtrace of the calling thread, appended after a fatal record.
fn capture_stack() -> String {
    let current = thread::current();
    let name = current.name().unwrap_or("<unnamed>");
    format!("\nthread '{name}':\n{}\n", Backtrace::force_capture())
}
