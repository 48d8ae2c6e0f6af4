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

use std::sync::Weak;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::Sender;
use crossbeam_channel::bounded;
use crossbeam_channel::select;
use crossbeam_channel::tick;

use crate::Error;
use crate::ErrorKind;
use crate::logger::Shared;

/// A background thread flushing the log file on a fixed interval.
///
/// The thread only holds a weak reference to the logger, and stops once the shutdown channel
/// is closed or the logger is gone.
#[derive(Debug)]
pub(super) struct FlushDaemon {
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl FlushDaemon {
    pub(super) fn spawn(shared: Weak<Shared>, interval: Duration) -> Result<Self, Error> {
        let (shutdown, signal) = bounded::<()>(0);
        let ticker = tick(interval);

        let handle = std::thread::Builder::new()
            .name("logroll-flush".to_string())
            .spawn(move || {
                loop {
                    select! {
                        recv(ticker) -> _ => {
                            let Some(logger) = shared.upgrade() else {
                                break;
                            };
                            if let Err(err) = logger.flush() {
                                logger.trap.trap(&err);
                            }
                        }
                        // closed on shutdown
                        recv(signal) -> _ => break,
                    }
                }
            })
            .map_err(|err| {
                Error::new(ErrorKind::Spawn, "failed to spawn flush daemon").with_source(err)
            })?;

        Ok(FlushDaemon {
            shutdown: Some(shutdown),
            handle: Some(handle),
        })
    }

    /// Stop the thread and wait for it; an in-progress flush completes first.
    ///
    /// Return an error if the thread panicked. Later calls do nothing.
    pub(super) fn shutdown(&mut self) -> Result<(), Error> {
        drop(self.shutdown.take());
        match self.handle.take().map(|handle| handle.join()) {
            Some(Err(_)) => Err(Error::new(ErrorKind::Spawn, "flush daemon panicked")),
            _ => Ok(()),
        }
    }
}

impl Drop for FlushDaemon {
    fn drop(&mut self) {
        // Logger::drop has already shut down and trapped the outcome
        let _ = self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::thread;
    use std::time::Duration;
    use std::time::Instant;

    use tempfile::TempDir;

    use super::*;
    use crate::Flags;
    use crate::Level;
    use crate::Logger;

    #[test]
    fn test_daemon_flushes_periodically() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let logger = Logger::builder(&path)
            .flags(Flags::NONE)
            .flush_interval(Duration::from_millis(20))
            .build()
            .unwrap();

        logger.output(Level::Info, None, "flushed by daemon").unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if fs::read_to_string(&path).unwrap() == "flushed by daemon\n" {
                break;
            }
            assert!(Instant::now() < deadline, "daemon did not flush in time");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_shutdown_stops_thread() {
        let temp_dir = TempDir::new().unwrap();
        let mut logger = Logger::builder(temp_dir.path().join("app.log"))
            .flush_interval(Duration::from_secs(3600))
            .build()
            .unwrap();

        logger.daemon.shutdown().unwrap();
        assert!(logger.daemon.handle.is_none());
        // idempotent
        logger.daemon.shutdown().unwrap();
    }

    #[test]
    fn test_shutdown_reports_panicked_thread() {
        let mut daemon = FlushDaemon {
            shutdown: None,
            handle: Some(thread::spawn(|| panic!("flush exploded"))),
        };

        let err = daemon.shutdown().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Spawn);
        assert_eq!(err.message(), "flush daemon panicked");
        daemon.shutdown().unwrap();
    }
}
