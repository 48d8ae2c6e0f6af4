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

use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;

use jiff::Zoned;

/// Defines when the active log file is replaced by a new one.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum RotateMode {
    /// Never rotate; the file name is the base path unchanged.
    #[default]
    None,
    /// Rotate once a write would grow the file past the configured maximum size.
    ///
    /// The new name has second resolution: a rotation in the same second as the previous one
    /// appends to the same file, which may then exceed the maximum size.
    Size,
    /// Rotate when the hour of day changes.
    Hour,
    /// Rotate when the day of month changes.
    Day,
}

/// Bookkeeping about the file currently open, compared against every write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RotationState {
    /// Bytes appended since the file was opened.
    pub(crate) bytes_written: u64,
    /// Hour of day the file was opened at.
    pub(crate) hour: i8,
    /// Day of month the file was opened at.
    pub(crate) day: i8,
}

impl RotationState {
    pub(crate) fn opened_at(now: &Zoned) -> Self {
        RotationState {
            bytes_written: 0,
            hour: now.hour(),
            day: now.day(),
        }
    }
}

impl RotateMode {
    /// Whether a write of `pending` bytes at `now` must go to a new file.
    pub(crate) fn should_rotate(
        &self,
        state: &RotationState,
        now: &Zoned,
        pending: u64,
        max_size: u64,
    ) -> bool {
        match self {
            RotateMode::None => false,
            RotateMode::Size => state.bytes_written.saturating_add(pending) > max_size,
            RotateMode::Hour => state.hour != now.hour() || state.day != now.day(),
            RotateMode::Day => state.day != now.day(),
        }
    }

    /// The strftime pattern appended to the base path, if any.
    pub(crate) fn suffix_format(&self) -> Option<&'static str> {
        match self {
            RotateMode::None => None,
            RotateMode::Size => Some("-%Y%m%d-%H%M%S"),
            RotateMode::Hour => Some("-%Y%m%d-%H"),
            RotateMode::Day => Some("-%Y%m%d"),
        }
    }

    /// The path of the file opened at `now` for the given base path.
    pub(crate) fn file_name(&self, base: &Path, now: &Zoned) -> PathBuf {
        match self.suffix_format() {
            None => base.to_path_buf(),
            Some(format) => {
                let mut name = OsString::from(base.as_os_str());
                name.push(now.strftime(format).to_string());
                PathBuf::from(name)
            }
        }
    }
}
