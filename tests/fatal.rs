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

use std::fs;
use std::sync::Arc;
use std::sync::atomic::AtomicI32;
use std::sync::atomic::Ordering;

use logroll::EXIT_FATAL;
use logroll::Flags;
use logroll::Logger;
use logroll::Terminate;
use tempfile::TempDir;

#[derive(Debug, Default, Clone)]
struct RecordTerminate(Arc<AtomicI32>);

impl Terminate for RecordTerminate {
    fn terminate(&self, status: i32) {
        self.0.store(status, Ordering::SeqCst);
    }
}

#[test]
fn test_fatal_writes_stack_and_terminates() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("app.log");
    let status = RecordTerminate::default();
    let logger = Logger::builder(&path)
        .flags(Flags::LEVEL)
        .terminate(status.clone())
        .build()
        .unwrap();

    logger.info("before");
    logroll::fatal!(logger, "disk {} is gone", "/dev/sdb");
    assert_eq!(status.0.load(Ordering::SeqCst), EXIT_FATAL);

    let content = fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("INFO before"));
    assert_eq!(lines.next(), Some("FATAL disk /dev/sdb is gone"));
    assert_eq!(lines.next(), Some(""));
    let stack_header = lines.next().unwrap();
    assert!(stack_header.starts_with("thread '"), "{stack_header}");

    // the file is closed once the hook returns
    let err = logger
        .output(logroll::Level::Error, None, "after")
        .unwrap_err();
    assert!(err.to_string().contains("log file is closed"), "{err}");
    assert_eq!(fs::read_to_string(&path).unwrap(), content);
}
