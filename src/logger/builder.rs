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

use std::num::NonZeroU64;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use crate::Error;
use crate::ErrorKind;
use crate::Flags;
use crate::Level;
use crate::Logger;
use crate::RotateMode;
use crate::Terminate;
use crate::Trap;
use crate::clock::Clock;
use crate::header::Header;
use crate::logger::Shared;
use crate::logger::daemon::FlushDaemon;
use crate::pool::BufferPool;
use crate::sink::FileSink;
use crate::terminate::ProcessTerminate;
use crate::trap::DefaultTrap;

/// Size of the in-memory buffer in front of each log file.
///
/// Large so that bursts of records rarely block callers on disk I/O; the flush daemon blocks
/// instead.
pub const DEFAULT_BUFFER_SIZE: usize = 256 * 1024;

/// Interval between two flushes of the flush daemon.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(30);

/// The immutable configuration of a [`Logger`].
///
/// # Examples
///
/// ```no_run
/// use logroll::Flags;
/// use logroll::Level;
/// use logroll::Logger;
/// use logroll::Options;
/// use logroll::RotateMode;
///
/// let logger = Logger::new(Options {
///     file: "./abc.log".into(),
///     flags: Flags::STD,
///     level: Level::Debug,
///     mode: RotateMode::None,
///     ..Options::default()
/// })
/// .unwrap();
/// logger.info("hello world");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Options {
    /// Base path of the log file; rotated files append a time suffix to it.
    pub file: PathBuf,
    /// Fields rendered before each message.
    pub flags: Flags,
    /// The least severe level written.
    pub level: Level,
    /// When to switch to a new file.
    pub mode: RotateMode,
    /// Maximum bytes per file; only used by [`RotateMode::Size`].
    pub max_size: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            file: PathBuf::new(),
            flags: Flags::STD,
            level: Level::Debug,
            mode: RotateMode::None,
            max_size: 0,
        }
    }
}

/// A builder to configure and create a [`Logger`].
#[must_use = "call `build` to create the logger"]
#[derive(Debug)]
pub struct LoggerBuilder {
    options: Options,

    // has default
    buffer_size: usize,
    flush_interval: Duration,
    trap: Box<dyn Trap>,
    terminate: Box<dyn Terminate>,
    clock: Clock,
}

impl LoggerBuilder {
    /// Create a new builder logging to `file` with the standard prefix, no threshold and no
    /// rotation.
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self::from_options(Options {
            file: file.into(),
            ..Options::default()
        })
    }

    /// Create a new builder from existing [`Options`].
    pub fn from_options(options: Options) -> Self {
        Self {
            options,
            buffer_size: DEFAULT_BUFFER_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            trap: Box::new(DefaultTrap::default()),
            terminate: Box::new(ProcessTerminate::default()),
            clock: Clock::DefaultClock,
        }
    }

    /// Set the fields rendered before each message.
    ///
    /// Default to [`Flags::STD`].
    pub fn flags(mut self, flags: Flags) -> Self {
        self.options.flags = flags;
        self
    }

    /// Set the least severe level written.
    ///
    /// Default to [`Level::Debug`].
    pub fn level(mut self, level: Level) -> Self {
        self.options.level = level;
        self
    }

    /// Roll over to a new file before a record would grow the current one past `n` bytes.
    ///
    /// Files are named `<file>-YYYYMMDD-HHMMSS`. Rotations within the same second reopen the
    /// same name and append to it, so during a burst a file can grow past `n` bytes.
    pub fn rotate_by_size(mut self, n: NonZeroU64) -> Self {
        self.options.mode = RotateMode::Size;
        self.options.max_size = n.get();
        self
    }

    /// Roll over to a new file when the hour changes. Files are named `<file>-YYYYMMDD-HH`.
    pub fn rotate_hourly(mut self) -> Self {
        self.options.mode = RotateMode::Hour;
        self
    }

    /// Roll over to a new file when the day changes. Files are named `<file>-YYYYMMDD`.
    pub fn rotate_daily(mut self) -> Self {
        self.options.mode = RotateMode::Day;
        self
    }

    /// Set the size of the in-memory buffer in front of the file.
    ///
    /// Default to [`DEFAULT_BUFFER_SIZE`].
    pub fn buffer_size(mut self, n: NonZeroUsize) -> Self {
        self.buffer_size = n.get();
        self
    }

    /// Set how often the flush daemon flushes and syncs the file.
    ///
    /// Default to [`DEFAULT_FLUSH_INTERVAL`].
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Set the trap for errors that cannot be returned to a caller.
    ///
    /// Default to [`DefaultTrap`].
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    /// Set the hook run on fatal records and rotation failures.
    ///
    /// Default to [`ProcessTerminate`].
    pub fn terminate(mut self, terminate: impl Into<Box<dyn Terminate>>) -> Self {
        self.terminate = terminate.into();
        self
    }

    #[cfg(test)]
    pub(crate) fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Build the [`Logger`], opening its first file and starting the flush daemon.
    ///
    /// # Errors
    ///
    /// Return an error if either:
    ///
    /// * The configured file path is empty.
    /// * The flush interval is zero.
    /// * The log file cannot be opened.
    /// * The flush daemon thread cannot be spawned.
    pub fn build(self) -> Result<Logger, Error> {
        let Self {
            options,
            buffer_size,
            flush_interval,
            trap,
            terminate,
            clock,
        } = self;

        if options.file.as_os_str().is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidConfig,
                "log file path must not be empty",
            ));
        }
        if flush_interval.is_zero() {
            return Err(Error::new(
                ErrorKind::InvalidConfig,
                "flush interval must not be zero",
            ));
        }

        let now = clock.now();
        let mut sink = FileSink::new(buffer_size);
        let path = options.mode.file_name(&options.file, &now);
        sink.rotate(&path, &now, trap.as_ref())?;

        let shared = Arc::new(Shared {
            header: Header::new(options.flags),
            options,
            clock,
            pool: BufferPool::new(),
            trap,
            terminate,
            sink: Mutex::new(sink),
        });
        let daemon = FlushDaemon::spawn(Arc::downgrade(&shared), flush_interval)?;

        Ok(Logger { shared, daemon })
    }
}
