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

//! Hooks invoked when the logger must end the process.

use std::fmt;

/// Exit status used when a rotated log file cannot be opened.
pub const EXIT_ROTATE_FAILURE: i32 = 2;

/// Exit status used after a [`Level::Fatal`](crate::Level::Fatal) record is written.
pub const EXIT_FATAL: i32 = 255;

/// Decides what happens when the logger hits an unrecoverable condition.
///
/// The logger invokes the hook only after releasing its write lock and returning the record
/// buffer to the pool. If the hook returns, control goes back to the caller of
/// [`Logger::output`](crate::Logger::output).
pub trait Terminate: fmt::Debug + Send + Sync + 'static {
    /// Terminate with the given exit status.
    fn terminate(&self, status: i32);
}

impl<T: Terminate> From<T> for Box<dyn Terminate> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

/// Exits the process via [`std::process::exit`].
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct ProcessTerminate {}

impl Terminate for ProcessTerminate {
    fn terminate(&self, status: i32) {
        std::process::exit(status);
    }
}
