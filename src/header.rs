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

//! Rendering of the per-record prefix.

use std::panic::Location;

use jiff::Zoned;
use jiff::tz::TimeZone;

use crate::Flags;
use crate::Level;

/// The source location a record was logged from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite<'a> {
    /// Path of the source file.
    pub file: &'a str,
    /// Line number in the source file.
    pub line: u32,
}

impl CallSite<'static> {
    /// The location of the caller, skipping every `#[track_caller]` frame in between.
    #[track_caller]
    pub fn caller() -> CallSite<'static> {
        CallSite::from(Location::caller())
    }
}

impl<'a> From<&'a Location<'a>> for CallSite<'a> {
    fn from(location: &'a Location<'a>) -> Self {
        CallSite {
            file: location.file(),
            line: location.line(),
        }
    }
}

/// Renders the prefix selected by a set of [`Flags`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct Header {
    flags: Flags,
}

impl Header {
    pub(crate) fn new(flags: Flags) -> Self {
        Self { flags }
    }

    pub(crate) fn needs_call_site(&self) -> bool {
        self.flags.intersects(Flags::LONG_FILE | Flags::SHORT_FILE)
    }

    /// Append the prefix for a record at `level` logged from `site` at `now`.
    ///
    /// An unresolved call site renders as `???:0`.
    pub(crate) fn format(
        &self,
        buf: &mut Vec<u8>,
        level: Level,
        site: Option<CallSite<'_>>,
        now: &Zoned,
    ) {
        let flags = self.flags;

        if flags.intersects(Flags::DATE | Flags::TIME | Flags::MICROSECONDS) {
            let datetime = if flags.contains(Flags::UTC) {
                now.timestamp().to_zoned(TimeZone::UTC).datetime()
            } else {
                now.datetime()
            };

            if flags.contains(Flags::DATE) {
                itoa(buf, datetime.year().max(0) as u64, 4);
                buf.push(b'/');
                itoa(buf, datetime.month() as u64, 2);
                buf.push(b'/');
                itoa(buf, datetime.day() as u64, 2);
                buf.push(b' ');
            }
            if flags.intersects(Flags::TIME | Flags::MICROSECONDS) {
                itoa(buf, datetime.hour() as u64, 2);
                buf.push(b':');
                itoa(buf, datetime.minute() as u64, 2);
                buf.push(b':');
                itoa(buf, datetime.second() as u64, 2);
                if flags.contains(Flags::MICROSECONDS) {
                    buf.push(b'.');
                    itoa(buf, (datetime.subsec_nanosecond() / 1000) as u64, 6);
                }
                buf.push(b' ');
            }
        }

        if self.needs_call_site() {
            let CallSite { file, line } = site.unwrap_or(CallSite {
                file: "???",
                line: 0,
            });
            let file = if flags.contains(Flags::SHORT_FILE) {
                short_file(file)
            } else {
                file
            };
            buf.extend_from_slice(file.as_bytes());
            buf.push(b':');
            itoa(buf, line as u64, 0);
            buf.extend_from_slice(b": ");
        }

        if flags.contains(Flags::LEVEL) {
            buf.extend_from_slice(level.name().as_bytes());
            buf.push(b' ');
        }
    }
}

fn short_file(file: &str) -> &str {
    file.rsplit(['/', '\\']).next().unwrap_or(file)
}

/// Cheap integer to fixed-width decimal ASCII, zero-padded to at least `width` digits.
fn itoa(buf: &mut Vec<u8>, mut i: u64, width: usize) {
    let mut digits = [0u8; 20];
    let mut pos = digits.len();
    loop {
        pos -= 1;
        digits[pos] = b'0' + (i % 10) as u8;
        i /= 10;
        if i == 0 && digits.len() - pos >= width {
            break;
        }
    }
    buf.extend_from_slice(&digits[pos..]);
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn render(flags: Flags, level: Level, site: Option<CallSite<'_>>, now: &str) -> String {
        let now = Zoned::from_str(now).unwrap();
        let mut buf = vec![];
        Header::new(flags).format(&mut buf, level, site, &now);
        String::from_utf8(buf).unwrap()
    }

    const NOW: &str = "2009-01-03T01:02:03.004005006+08:00[+08:00]";

    const SITE: CallSite<'static> = CallSite {
        file: "/a/b/c/d.rs",
        line: 23,
    };

    #[test]
    fn test_itoa_padding() {
        let mut buf = vec![];
        itoa(&mut buf, 7, 2);
        itoa(&mut buf, 2009, 4);
        itoa(&mut buf, 12, 0);
        itoa(&mut buf, 0, 0);
        itoa(&mut buf, 42, 6);
        assert_eq!(String::from_utf8(buf).unwrap(), "072009120000042");
    }

    #[test]
    fn test_standard_prefix() {
        assert_eq!(
            render(Flags::STD, Level::Info, None, NOW),
            "2009/01/03 01:02:03 INFO "
        );
        assert_eq!(render(Flags::NONE, Level::Info, Some(SITE), NOW), "");
    }

    #[test]
    fn test_microseconds_imply_time() {
        assert_eq!(
            render(Flags::MICROSECONDS, Level::Debug, None, NOW),
            "01:02:03.004005 "
        );
        assert_eq!(
            render(Flags::DATE | Flags::TIME | Flags::MICROSECONDS, Level::Debug, None, NOW),
            "2009/01/03 01:02:03.004005 "
        );
    }

    #[test]
    fn test_utc_conversion() {
        assert_eq!(
            render(Flags::DATE | Flags::TIME | Flags::UTC, Level::Warn, None, NOW),
            "2009/01/02 17:02:03 "
        );
    }

    #[test]
    fn test_file_locations() {
        assert_eq!(
            render(Flags::LONG_FILE, Level::Error, Some(SITE), NOW),
            "/a/b/c/d.rs:23: "
        );
        assert_eq!(
            render(Flags::SHORT_FILE | Flags::LEVEL, Level::Error, Some(SITE), NOW),
            "d.rs:23: ERROR "
        );
        assert_eq!(
            render(Flags::SHORT_FILE | Flags::LONG_FILE, Level::Error, Some(SITE), NOW),
            "d.rs:23: "
        );
        assert_eq!(
            render(Flags::LONG_FILE, Level::Error, None, NOW),
            "???:0: "
        );
    }

    #[test]
    fn test_caller_location() {
        let site = CallSite::caller();
        assert!(site.file.ends_with("header.rs"));
        assert!(site.line > 0);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let flags = Flags::STD | Flags::MICROSECONDS | Flags::SHORT_FILE;
        let first = render(flags, Level::Fatal, Some(SITE), NOW);
        for _ in 0..10 {
            assert_eq!(render(flags, Level::Fatal, Some(SITE), NOW), first);
        }
    }
}
