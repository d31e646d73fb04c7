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
use std::borrow::Cow;
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use crate::Entry;
use crate::Error;
use crate::EventId;
use crate::Level;
use crate::clock::Clock;
use crate::entry::KeyValues;
use crate::entry::SharedError;
use crate::entry::State;
use crate::logger::Logger;
use crate::logger::Scope;
use crate::logger::TestLoggerOptions;
use crate::sink::Sink;

/// A logger that writes `"{LEVEL}: {message}"` lines to a [`Sink`] and, when capturing is
/// enabled, records every emitted [`Entry`] for later assertions.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use logforth_capture::EventId;
/// use logforth_capture::Level;
/// use logforth_capture::TestLogger;
/// use logforth_capture::TestLoggerOptions;
/// use logforth_capture::sink::Buffer;
///
/// let output = Buffer::default();
/// let logger = TestLogger::with_options(
///     output.clone(),
///     TestLoggerOptions::default().capture_messages(true),
/// );
///
/// logger
///     .log(
///         Level::Info,
///         EventId::new(1),
///         Some(Arc::new("st")),
///         None,
///         Some(|state: Option<&&str>, _: Option<&_>| format!("hello {}", state.unwrap())),
///     )
///     .unwrap();
///
/// assert_eq!(output.lines(), vec!["INFO: hello st".to_string()]);
/// assert_eq!(logger.entries()[0].message(), "hello st");
/// ```
pub struct TestLogger {
    category: Cow<'static, str>,
    sink: Arc<dyn Sink>,
    capture_messages: bool,
    clock: Arc<dyn Clock>,
    entries: Mutex<Vec<Entry>>,
}

impl fmt::Debug for TestLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestLogger")
            .field("category", &self.category)
            .field("sink", &self.sink)
            .field("capture_messages", &self.capture_messages)
            .field("clock", &self.clock)
            .field("entries", &self.entry_count())
            .finish()
    }
}

impl TestLogger {
    /// Create a logger with default options: no capturing, wall clock.
    pub fn new(sink: impl Sink) -> Self {
        Self::with_options(sink, TestLoggerOptions::default())
    }

    /// Create a logger with the given options.
    pub fn with_options(sink: impl Sink, options: TestLoggerOptions) -> Self {
        Self::from_parts(Arc::new(sink), options)
    }

    pub(crate) fn from_parts(sink: Arc<dyn Sink>, options: TestLoggerOptions) -> Self {
        Self {
            category: Cow::Borrowed(std::any::type_name::<TestLogger>()),
            sink,
            capture_messages: options.capture_messages,
            clock: options.clock,
            entries: Mutex::new(vec![]),
        }
    }

    /// Set the category label.
    ///
    /// Default to the type name of `TestLogger`. The category is a label only.
    pub fn with_category(mut self, category: impl Into<Cow<'static, str>>) -> Self {
        self.category = category.into();
        self
    }

    /// The category label.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Whether emitted entries are recorded.
    pub fn is_capturing(&self) -> bool {
        self.capture_messages
    }

    /// A snapshot of the captured entries, in call order.
    pub fn entries(&self) -> Vec<Entry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The number of captured entries.
    pub fn entry_count(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether a call at `level` would produce output.
    ///
    /// This is `false` for [`Level::Off`] and whenever the sink is unavailable.
    pub fn is_enabled(&self, level: Level) -> bool {
        level != Level::Off && self.sink.is_available()
    }

    /// Log a message. See [`Logger::log`].
    pub fn log<S, F>(
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
        let Some(formatter) = formatter else {
            return Err(Error::invalid_argument("formatter is absent")
                .with_context("level", level)
                .with_context("event_id", &event_id));
        };

        if !self.is_enabled(level) {
            return Ok(());
        }

        let message = formatter(state.as_deref(), error.as_ref());
        let state = state.map(|state| state as State);
        self.emit(level, event_id, state, error, message);
        Ok(())
    }

    /// Begin a scope. The returned handle does nothing.
    pub fn begin_scope<S>(&self, state: S) -> Scope {
        let _ = state;
        Scope::default()
    }

    fn emit(
        &self,
        level: Level,
        event_id: EventId,
        state: Option<State>,
        error: Option<SharedError>,
        message: String,
    ) {
        if message.is_empty() {
            return;
        }

        let line = compose_line(level, &message, error.as_deref());

        if self.capture_messages {
            let entry = Entry::new(self.clock.now(), level, event_id, state, error, message);
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(entry);
        }

        if let Err(err) = self.sink.write_line(&line) {
            handle_write_error(&line, err);
        }
    }
}

fn compose_line(
    level: Level,
    message: &str,
    error: Option<&(dyn std::error::Error + Send + Sync)>,
) -> String {
    let mut line = format!("{level}: {message}");
    if let Some(error) = error {
        line.push('\n');
        line.push_str(&error.to_string());

        let mut source = error.source();
        while let Some(cause) = source {
            line.push_str("\nCaused by: ");
            line.push_str(&cause.to_string());
            source = cause.source();
        }
    }
    line
}

fn handle_write_error(line: &str, error: Error) {
    let Err(fallback_error) = write!(
        std::io::stderr(),
        r###"
Error perform test logging.
    Attempted to write: {line}
    Error: {error:?}
"###,
    ) else {
        return;
    };

    panic!(
        r###"
Error performing stderr logging after error occurred during test logging.
    Attempted to write: {line}
    Error: {error:?}
    Fallback error: {fallback_error}
"###,
    );
}

impl Logger for TestLogger {
    fn is_enabled(&self, level: Level) -> bool {
        TestLogger::is_enabled(self, level)
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
        TestLogger::log(self, level, event_id, state, error, formatter)
    }

    fn begin_scope<S>(&self, state: S) -> Scope {
        TestLogger::begin_scope(self, state)
    }
}

impl log::Log for TestLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        TestLogger::is_enabled(self, metadata.level().into())
    }

    fn log(&self, record: &log::Record) {
        let level = Level::from(record.level());
        if !TestLogger::is_enabled(self, level) {
            return;
        }

        let kvs = collect_key_values(record);
        let state = if kvs.is_empty() {
            None
        } else {
            Some(Arc::new(kvs) as State)
        };
        self.emit(
            level,
            EventId::default(),
            state,
            None,
            record.args().to_string(),
        );
    }

    fn flush(&self) {}
}

fn collect_key_values(record: &log::Record) -> KeyValues {
    struct KeyValueVisitor<'a> {
        kvs: &'a mut KeyValues,
    }

    impl<'kvs> log::kv::VisitSource<'kvs> for KeyValueVisitor<'_> {
        fn visit_pair(
            &mut self,
            key: log::kv::Key<'kvs>,
            value: log::kv::Value<'kvs>,
        ) -> Result<(), log::kv::Error> {
            self.kvs.push((key.to_string(), value.to_string()));
            Ok(())
        }
    }

    let mut kvs = KeyValues::new();
    let mut visitor = KeyValueVisitor { kvs: &mut kvs };
    // the visitor never fails
    let _ = record.key_values().visit(&mut visitor);
    kvs
}

#[cfg(test)]
mod tests {
    use std::io;

    use jiff::SignedDuration;
    use jiff::Timestamp;
    use snapbox::assert_data_eq;
    use snapbox::str;

    use super::*;
    use crate::ErrorKind;
    use crate::clock::ManualClock;
    use crate::sink::Buffer;

    type NoState = ();

    fn capturing(output: &Buffer, clock: &Arc<ManualClock>) -> TestLogger {
        TestLogger::with_options(
            output.clone(),
            TestLoggerOptions::default()
                .capture_messages(true)
                .clock(clock.clone()),
        )
    }

    fn text(
        message: &'static str,
    ) -> Option<impl FnOnce(Option<&NoState>, Option<&SharedError>) -> String> {
        Some(move |_: Option<&NoState>, _: Option<&SharedError>| message.to_string())
    }

    #[test]
    fn test_end_to_end_capture() {
        let start: Timestamp = "2025-01-01T00:00:00Z".parse().unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let output = Buffer::default();
        let logger = capturing(&output, &clock);

        let state = Arc::new("st");
        logger
            .log(
                Level::Info,
                EventId::new(1).with_name("E"),
                Some(state.clone()),
                None,
                Some(|_: Option<&&str>, _: Option<&SharedError>| "hello".to_string()),
            )
            .unwrap();

        let entries = logger.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message(), "hello");
        assert_eq!(entries[0].timestamp(), start);
        assert_eq!(entries[0].level(), Level::Info);
        assert_eq!(entries[0].event_id(), &EventId::new(1).with_name("E"));
        assert!(Arc::ptr_eq(&entries[0].state::<&str>().unwrap(), &state));

        clock.advance(SignedDuration::from_hours(1)).unwrap();
        logger
            .log(
                Level::Warn,
                EventId::new(2),
                None::<Arc<NoState>>,
                None,
                text(""),
            )
            .unwrap();
        assert_eq!(logger.entry_count(), 1);
        assert_eq!(output.lines(), vec!["INFO: hello".to_string()]);
    }

    #[test]
    fn test_timestamps_follow_clock() {
        let start: Timestamp = "2025-01-01T00:00:00Z".parse().unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let logger = capturing(&Buffer::default(), &clock);

        logger
            .log(
                Level::Info,
                EventId::new(1),
                None::<Arc<NoState>>,
                None,
                text("first"),
            )
            .unwrap();
        clock.advance(SignedDuration::from_hours(1)).unwrap();
        logger
            .log(
                Level::Info,
                EventId::new(2),
                None::<Arc<NoState>>,
                None,
                text("second"),
            )
            .unwrap();

        let entries = logger.entries();
        assert_eq!(entries[0].timestamp(), start);
        assert_eq!(
            entries[1].timestamp(),
            start.checked_add(SignedDuration::from_hours(1)).unwrap()
        );
    }

    #[test]
    fn test_absent_formatter_is_rejected() {
        let output = Buffer::default();
        output.set_available(false);
        let logger = TestLogger::new(output);

        for level in Level::ALL {
            let err = logger
                .log::<NoState, fn(Option<&NoState>, Option<&SharedError>) -> String>(
                    level,
                    EventId::default(),
                    None,
                    None,
                    None,
                )
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn test_enabled_levels() {
        let output = Buffer::default();
        let logger = TestLogger::new(output.clone());
        for level in Level::ALL {
            assert_eq!(logger.is_enabled(level), level != Level::Off);
        }

        output.set_available(false);
        for level in Level::ALL {
            assert!(!logger.is_enabled(level));
        }
    }

    #[test]
    fn test_unavailable_sink_suppresses_everything() {
        let clock = Arc::new(ManualClock::new(Timestamp::UNIX_EPOCH));
        let output = Buffer::default();
        let logger = capturing(&output, &clock);
        output.set_available(false);

        let mut called = false;
        logger
            .log(
                Level::Error,
                EventId::default(),
                None,
                None,
                Some(|_: Option<&NoState>, _: Option<&SharedError>| {
                    called = true;
                    "never".to_string()
                }),
            )
            .unwrap();

        assert!(!called);
        assert_eq!(logger.entry_count(), 0);
        assert!(output.lines().is_empty());
    }

    #[test]
    fn test_off_level_is_silent() {
        let clock = Arc::new(ManualClock::new(Timestamp::UNIX_EPOCH));
        let output = Buffer::default();
        let logger = capturing(&output, &clock);

        logger
            .log(
                Level::Off,
                EventId::default(),
                None::<Arc<NoState>>,
                None,
                text("nope"),
            )
            .unwrap();
        assert_eq!(logger.entry_count(), 0);
        assert!(output.lines().is_empty());
    }

    #[test]
    fn test_capture_disabled_still_writes() {
        let output = Buffer::default();
        let logger = TestLogger::new(output.clone());
        assert!(!logger.is_capturing());

        logger
            .log(
                Level::Debug,
                EventId::default(),
                None::<Arc<NoState>>,
                None,
                text("visible"),
            )
            .unwrap();
        assert_eq!(logger.entry_count(), 0);
        assert_eq!(output.lines(), vec!["DEBUG: visible".to_string()]);
    }

    #[test]
    fn test_error_is_appended_on_next_line() {
        #[derive(Debug)]
        struct Wrapped(io::Error);

        impl fmt::Display for Wrapped {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("request failed")
            }
        }

        impl std::error::Error for Wrapped {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                Some(&self.0)
            }
        }

        let clock = Arc::new(ManualClock::new(Timestamp::UNIX_EPOCH));
        let output = Buffer::default();
        let logger = capturing(&output, &clock);

        let error: SharedError = Arc::new(Wrapped(io::Error::other("connection reset")));
        logger
            .log(
                Level::Error,
                EventId::new(500),
                None,
                Some(error.clone()),
                Some(|_: Option<&NoState>, e: Option<&SharedError>| {
                    format!("call ended: {}", e.is_some())
                }),
            )
            .unwrap();

        assert_eq!(
            output.lines(),
            vec!["ERROR: call ended: true\nrequest failed\nCaused by: connection reset".to_string()]
        );
        assert!(Arc::ptr_eq(logger.entries()[0].error().unwrap(), &error));
    }

    #[test]
    fn test_scope_is_noop() {
        let logger = TestLogger::new(Buffer::default());
        let scope = logger.begin_scope(("request", 42));
        scope.close();
        drop(logger.begin_scope("dropped"));
    }

    #[test]
    fn test_category_label() {
        let logger = TestLogger::new(Buffer::default());
        assert_eq!(logger.category(), std::any::type_name::<TestLogger>());

        let logger = logger.with_category("my::module");
        assert_eq!(logger.category(), "my::module");
    }

    #[test]
    fn test_log_record_bridge() {
        let clock = Arc::new(ManualClock::new(Timestamp::UNIX_EPOCH));
        let output = Buffer::default();
        let logger = capturing(&output, &clock);

        log::Log::log(
            &logger,
            &log::Record::builder()
                .args(format_args!("served {} bytes", 1024))
                .level(log::Level::Info)
                .target("server")
                .key_values(&[("path", "/index.html")])
                .build(),
        );
        log::Log::log(
            &logger,
            &log::Record::builder()
                .args(format_args!("plain"))
                .level(log::Level::Trace)
                .build(),
        );

        assert_data_eq!(output.lines().join(" | "), str!["INFO: served 1024 bytes | TRACE: plain"]);

        let entries = logger.entries();
        let kvs = entries[0].state::<KeyValues>().unwrap();
        assert_eq!(
            kvs.as_slice(),
            &[("path".to_string(), "/index.html".to_string())]
        );
        assert!(entries[1].raw_state().is_none());
    }
}
