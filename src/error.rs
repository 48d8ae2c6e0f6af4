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
use std::io;

/// What went wrong, coarsely; pairs with the message of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The logger configuration is not usable.
    InvalidConfig,
    /// The log file or its directory could not be created or opened.
    Open,
    /// Writing, flushing or syncing the log file failed.
    Io,
    /// A rotated file could not be opened, so the logger has no destination left.
    Rotate,
    /// The flush daemon thread could not be started, or it panicked.
    Spawn,
}

impl ErrorKind {
    /// A short lowercase name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidConfig => "invalid config",
            ErrorKind::Open => "open",
            ErrorKind::Io => "io",
            ErrorKind::Rotate => "rotate",
            ErrorKind::Spawn => "spawn",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error type of logroll.
///
/// Besides its [`ErrorKind`] and message, an error carries key-value context (such as the
/// `path` of the log file involved) and the chain of underlying causes.
pub struct Error {
    kind: ErrorKind,
    message: String,
    context: Vec<(&'static str, String)>,
    sources: Vec<anyhow::Error>,
}

impl Error {
    /// Create an error of `kind` described by `message`.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: vec![],
            sources: vec![],
        }
    }

    /// Record `value` under `key`.
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Append an underlying cause.
    pub fn with_source(mut self, src: impl Into<anyhow::Error>) -> Self {
        self.sources.push(src.into());
        self
    }

    /// The kind of failure.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The message this error was created with.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The context value recorded under `key`, if any.
    pub fn context(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find_map(|(k, v)| (*k == key).then_some(v.as_str()))
    }

    /// All underlying causes, in the order they were attached.
    pub fn sources(&self) -> impl ExactSizeIterator<Item = &(dyn std::error::Error + 'static)> {
        self.sources.iter().map(|v| v.as_ref())
    }

    /// Wrap an [`io::Error`] raised while writing to or flushing the log file.
    pub fn from_io_error(err: io::Error) -> Error {
        Error::new(ErrorKind::Io, "failed to write log file").with_source(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::from_io_error(err)
    }
}

/// Write `items` separated by `", "`.
fn join<T>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = T>,
    mut item: impl FnMut(&mut fmt::Formatter<'_>, T) -> fmt::Result,
) -> fmt::Result {
    for (i, v) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        item(f, v)?;
    }
    Ok(())
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if !self.context.is_empty() {
            f.write_str(", context: { ")?;
            join(f, &self.context, |f, (k, v)| write!(f, "{k}: {v}"))?;
            f.write_str(" }")?;
        }
        if !self.sources.is_empty() {
            f.write_str(", sources: [")?;
            join(f, &self.sources, |f, source| write!(f, "{source}"))?;
            f.write_str("]")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return f
                .debug_struct("Error")
                .field("kind", &self.kind)
                .field("message", &self.message)
                .field("context", &self.context)
                .field("sources", &self.sources)
                .finish();
        }

        // report style, as printed by `main` returning `Err`
        writeln!(f, "{} ({})", self.message, self.kind)?;
        for (k, v) in &self.context {
            writeln!(f, "    {k}: {v}")?;
        }
        for (i, source) in self.sources.iter().enumerate() {
            writeln!(f, "caused by [{i}]: {source:#}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.sources.first().map(|v| v.as_ref())
    }
}
