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

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use crate::Error;
use crate::EventId;
use crate::Level;
use crate::entry::SharedError;
use crate::logger::Logger;
use crate::logger::Scope;
use crate::logger::TestLogger;
use crate::logger::TestLoggerOptions;
use crate::sink::Sink;

/// A [`TestLogger`] whose category is the type name of `T`.
///
/// # Examples
///
/// ```
/// use logforth_capture::TypedLogger;
/// use logforth_capture::sink::Testing;
///
/// struct Server;
///
/// let logger = TypedLogger::<Server>::new(Testing::default());
/// assert!(logger.category().ends_with("Server"));
/// ```
pub struct TypedLogger<T: ?Sized> {
    inner: TestLogger,
    marker: PhantomData<fn() -> T>,
}

impl<T: ?Sized> fmt::Debug for TypedLogger<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedLogger").field(&self.inner).finish()
    }
}

impl<T: ?Sized> TypedLogger<T> {
    /// Create a logger with default options.
    pub fn new(sink: impl Sink) -> Self {
        Self::with_options(sink, TestLoggerOptions::default())
    }

    /// Create a logger with the given options.
    pub fn with_options(sink: impl Sink, options: TestLoggerOptions) -> Self {
        Self {
            inner: TestLogger::with_options(sink, options)
                .with_category(std::any::type_name::<T>()),
            marker: PhantomData,
        }
    }

    /// Unwrap the underlying [`TestLogger`].
    pub fn into_inner(self) -> TestLogger {
        self.inner
    }
}

impl<T: ?Sized> Deref for TypedLogger<T> {
    type Target = TestLogger;

    fn deref(&self) -> &TestLogger {
        &self.inner
    }
}

impl<T: ?Sized> Logger for TypedLogger<T> {
    fn is_enabled(&self, level: Level) -> bool {
        self.inner.is_enabled(level)
    }

    fn log<S, F>(
        &self,
        level: Level,
        event_id: EventId,
        state: Option<Arc<S>>,
        error: Option<SharedError>,
        formatter: Option<F>,
    ) -> Result<(), Error>
    where
        S: Any + Send + Sync,
        F: FnOnce(Option<&S>, Option<&SharedError>) -> String,
    {
        self.inner.log(level, event_id, state, error, formatter)
    }

    fn begin_scope<S>(&self, state: S) -> Scope {
        self.inner.begin_scope(state)
    }
}

impl<T: ?Sized> log::Log for TypedLogger<T> {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        log::Log::enabled(&self.inner, metadata)
    }

    fn log(&self, record: &log::Record) {
        log::Log::log(&self.inner, record)
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::Buffer;

    struct Repository;

    fn log_through<L: Logger>(logger: &L, message: &'static str) {
        logger
            .log(
                Level::Warn,
                EventId::new(3),
                None::<Arc<()>>,
                None,
                Some(|_: Option<&()>, _: Option<&SharedError>| message.to_string()),
            )
            .unwrap();
    }

    #[test]
    fn test_category_is_type_name() {
        let logger = TypedLogger::<Repository>::new(Buffer::default());
        assert_eq!(logger.category(), std::any::type_name::<Repository>());

        let logger = TypedLogger::<dyn fmt::Display>::new(Buffer::default());
        assert_eq!(logger.category(), std::any::type_name::<dyn fmt::Display>());
    }

    #[test]
    fn test_behaves_like_inner_logger() {
        let output = Buffer::default();
        let logger = TypedLogger::<Repository>::with_options(
            output.clone(),
            TestLoggerOptions::default().capture_messages(true),
        );

        log_through(&logger, "slow query");
        assert_eq!(output.lines(), vec!["WARN: slow query".to_string()]);

        let inner = logger.into_inner();
        assert_eq!(inner.entry_count(), 1);
        assert_eq!(inner.entries()[0].event_id().id(), 3);
    }
}
