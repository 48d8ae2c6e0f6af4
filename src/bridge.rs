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

//! Integration with the [`log`] crate.

use crate::CallSite;
use crate::Level;
use crate::Logger;
use crate::logger::render;

impl Logger {
    /// Install this logger as the global [`log`] logger.
    ///
    /// The maximum level of the `log` crate is set from the configured threshold; `trace`
    /// records are written as [`Level::Debug`].
    ///
    /// # Errors
    ///
    /// Return an error if a global logger has already been set.
    pub fn apply(self) -> Result<(), log::SetLoggerError> {
        let max_level = self.options().level.to_log_filter();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        Logger::enabled(self, Level::from(metadata.level()))
    }

    fn log(&self, record: &log::Record) {
        let level = Level::from(record.level());
        if !Logger::enabled(self, level) {
            return;
        }

        let site = match (record.file(), record.line()) {
            (Some(file), Some(line)) => Some(CallSite { file, line }),
            _ => None,
        };
        let message = render(*record.args());
        let _ = self.output(level, site, &message);
    }

    fn flush(&self) {
        if let Err(err) = Logger::flush(self) {
            self.trap(&err);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use log::Log;
    use tempfile::TempDir;

    use super::*;
    use crate::Flags;

    #[test]
    fn test_log_records_are_written() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let logger = Logger::builder(&path)
            .flags(Flags::LONG_FILE | Flags::LEVEL)
            .level(Level::Info)
            .build()
            .unwrap();

        assert!(!Log::enabled(
            &logger,
            &log::Metadata::builder().level(log::Level::Debug).build()
        ));

        Log::log(
            &logger,
            &log::Record::builder()
                .args(format_args!("hello {}", "bridge"))
                .level(log::Level::Warn)
                .file(Some("src/server.rs"))
                .line(Some(7))
                .build(),
        );
        Log::log(
            &logger,
            &log::Record::builder()
                .args(format_args!("no location"))
                .level(log::Level::Error)
                .build(),
        );
        Log::log(
            &logger,
            &log::Record::builder()
                .args(format_args!("dropped"))
                .level(log::Level::Trace)
                .build(),
        );
        Log::flush(&logger);

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "src/server.rs:7: WARN hello bridge\n???:0: ERROR no location\n"
        );
    }
}
