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

use std::fmt;
use std::ops::BitOr;
use std::ops::BitOrAssign;

/// Bits controlling which fields prefix each record.
///
/// Fields always appear in the order the constants are listed here, regardless of the order
/// the bits were combined in. For example, `DATE | TIME | LEVEL` (or [`Flags::STD`]) produces
///
/// ```text
/// 2009/01/23 01:23:23 DEBUG message
/// ```
///
/// while `DATE | TIME | MICROSECONDS | LONG_FILE` produces
///
/// ```text
/// 2009/01/23 01:23:23.123123 /a/b/c/d.rs:23: message
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Flags(u32);

impl Flags {
    /// The date in the local time zone: `2009/01/23`.
    pub const DATE: Flags = Flags(1 << 0);
    /// The time in the local time zone: `01:23:23`.
    pub const TIME: Flags = Flags(1 << 1);
    /// Microsecond resolution: `01:23:23.123123`. Renders the time even without [`Flags::TIME`].
    pub const MICROSECONDS: Flags = Flags(1 << 2);
    /// Full file name and line number: `/a/b/c/d.rs:23`.
    pub const LONG_FILE: Flags = Flags(1 << 3);
    /// Final file name element and line number: `d.rs:23`. Overrides [`Flags::LONG_FILE`].
    pub const SHORT_FILE: Flags = Flags(1 << 4);
    /// Render date and time in UTC rather than the local time zone.
    pub const UTC: Flags = Flags(1 << 5);
    /// The record's level: `DEBUG`, `INFO`, ...
    pub const LEVEL: Flags = Flags(1 << 6);

    /// The standard prefix: date, time and level.
    pub const STD: Flags = Flags(Self::DATE.0 | Self::TIME.0 | Self::LEVEL.0);
    /// No prefix at all.
    pub const NONE: Flags = Flags(0);

    const ALL: u32 = (1 << 7) - 1;

    /// Build flags from raw bits, dropping unknown bits.
    pub const fn from_bits(bits: u32) -> Flags {
        Flags(bits & Self::ALL)
    }

    /// The raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every bit of `other` is set.
    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any bit of `other` is set.
    pub const fn intersects(self, other: Flags) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Flags, &str); 7] = [
            (Flags::DATE, "DATE"),
            (Flags::TIME, "TIME"),
            (Flags::MICROSECONDS, "MICROSECONDS"),
            (Flags::LONG_FILE, "LONG_FILE"),
            (Flags::SHORT_FILE, "SHORT_FILE"),
            (Flags::UTC, "UTC"),
            (Flags::LEVEL, "LEVEL"),
        ];

        if self.0 == 0 {
            return f.write_str("NONE");
        }

        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}
