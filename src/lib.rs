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

//! Logroll is a leveled logger writing buffered records to a file, with optional rotation by
//! size, hour or day.
//!
//! # Overview
//!
//! Each record is prefixed according to a set of [`Flags`] (date, time, microseconds, call
//! site and level), assembled in a pooled buffer, and written under a single lock through a
//! large in-memory buffer. A background thread flushes that buffer to disk periodically
//! (every 30 seconds by default). Call [`Logger::flush`] before the process exits, or drop
//! the logger, otherwise buffered records may be lost.
//!
//! Depending on the [`RotateMode`], the log file name carries a suffix:
//!
//! * [`RotateMode::None`]: no suffix, `abc.log`.
//! * [`RotateMode::Size`]: date and clock, `abc.log-YYYYMMDD-HHMMSS`.
//! * [`RotateMode::Hour`]: date and hour, `abc.log-YYYYMMDD-HH`.
//! * [`RotateMode::Day`]: date, `abc.log-YYYYMMDD`.
//!
//! # Examples
//!
//! ```no_run
//! use logroll::Flags;
//! use logroll::Level;
//! use logroll::Logger;
//!
//! let logger = Logger::builder("./abc.log")
//!     .flags(Flags::STD)
//!     .level(Level::Debug)
//!     .build()
//!     .unwrap();
//!
//! logger.debug("hello world");
//! logroll::info!(logger, "hello, {}", "chasex");
//! logger.warn("testing message");
//! logger.flush().unwrap();
//! ```
//!
//! The output contents in `abc.log` will be:
//!
//! ```text
//! 2016/02/16 17:50:07 DEBUG hello world
//! 2016/02/16 17:50:07 INFO hello, chasex
//! 2016/02/16 17:50:07 WARN testing message
//! ```
//!
//! Records at [`Level::Fatal`] are followed by a backtrace, after which the process exits
//! with status [`EXIT_FATAL`]; see [`Terminate`] to override that.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod bridge;
mod clock;
mod error;
mod flags;
mod header;
mod level;
mod logger;
mod macros;
mod pool;
mod rotation;
mod sink;

pub mod terminate;
pub mod trap;

pub use self::error::Error;
pub use self::error::ErrorKind;
pub use self::flags::Flags;
pub use self::header::CallSite;
pub use self::level::Level;
pub use self::logger::DEFAULT_BUFFER_SIZE;
pub use self::logger::DEFAULT_FLUSH_INTERVAL;
pub use self::logger::Logger;
pub use self::logger::LoggerBuilder;
pub use self::logger::Options;
pub use self::pool::PoolStats;
pub use self::rotation::RotateMode;
pub use self::terminate::EXIT_FATAL;
pub use self::terminate::EXIT_ROTATE_FAILURE;
pub use self::terminate::Terminate;
pub use self::trap::Trap;
