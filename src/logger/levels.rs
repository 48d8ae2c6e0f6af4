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

//! One set of calls per level. Each is a no-op below the threshold; otherwise it renders its
//! arguments and hands them to [`Logger::output`], attributing the record to its caller.
//!
//! Errors of the underlying write are discarded: logging below [`Level::Fatal`] is best-effort.

use std::borrow::Cow;
use std::fmt;

use crate::CallSite;
use crate::Level;
use crate::Logger;

/// Render format arguments without allocating when they are a plain literal.
pub(crate) fn render(args: fmt::Arguments<'_>) -> Cow<'static, str> {
    match args.as_str() {
        Some(s) => Cow::Borrowed(s),
        None => Cow::Owned(args.to_string()),
    }
}

macro_rules! level_methods {
    ($($level:ident => $plain:ident, $formatted:ident, $line:ident;)+) => {
        impl Logger {
            $(
                #[doc = concat!("Log `msg` at [`Level::", stringify!($level), "`].")]
                #[track_caller]
                pub fn $plain(&self, msg: impl fmt::Display) {
                    if self.enabled(Level::$level) {
                        let site = CallSite::caller();
                        let _ = self.output(Level::$level, Some(site), &msg.to_string());
                    }
                }

                #[doc = concat!(
                    "Log pre-formatted arguments at [`Level::", stringify!($level), "`].\n\n",
                    "Usually called through the [`", stringify!($plain), "!`](crate::",
                    stringify!($plain), ") macro.",
                )]
                #[track_caller]
                pub fn $formatted(&self, args: fmt::Arguments<'_>) {
                    if self.enabled(Level::$level) {
                        let site = CallSite::caller();
                        let _ = self.output(Level::$level, Some(site), &render(args));
                    }
                }

                #[doc = concat!(
                    "Log `msg` followed by a newline at [`Level::", stringify!($level), "`].",
                )]
                #[track_caller]
                pub fn $line(&self, msg: impl fmt::Display) {
                    if self.enabled(Level::$level) {
                        let site = CallSite::caller();
                        let _ = self.output(Level::$level, Some(site), &format!("{msg}\n"));
                    }
                }
            )+
        }
    };
}

level_methods! {
    Debug => debug, debugf, debugln;
    Info => info, infof, infoln;
    Warn => warn, warnf, warnln;
    Error => error, errorf, errorln;
    Fatal => fatal, fatalf, fatalln;
}
