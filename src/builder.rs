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
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::OnceLock;
use std::sync::PoisonError;

use log::LevelFilter;

use crate::Error;
use crate::ErrorKind;
use crate::Level;
use crate::Provider;
use crate::TestLoggerProvider;

/// Create a new empty [`LoggingBuilder`].
///
/// ```rust
/// use logforth_capture::TestLoggerProvider;
///
/// let builder = logforth_capture::builder()
///     .add_provider(TestLoggerProvider::default())
///     .add_provider(TestLoggerProvider::default());
/// assert_eq!(builder.provider_count(), 1);
/// ```
pub fn builder() -> LoggingBuilder {
    LoggingBuilder::new()
}

/// Create a [`LoggingBuilder`] whose only provider is the default [`TestLoggerProvider`], which
/// writes to the test harness output.
///
/// This is a convenient API that you can use as:
///
/// ```rust
/// logforth_capture::test_output().apply();
///
/// log::info!("This is an info message.");
/// ```
pub fn test_output() -> LoggingBuilder {
    builder().clear_providers().add_test_output()
}

static DISPATCHER: OnceLock<Dispatcher> = OnceLock::new();

// The same logger seen through the facade and as its concrete type.
#[derive(Clone)]
struct CachedLogger {
    log: Arc<dyn log::Log>,
    any: Arc<dyn Any + Send + Sync>,
}

trait ErasedProvider: fmt::Debug + Send + Sync + 'static {
    fn create(&self, category: &str) -> CachedLogger;

    fn dispose(&self);
}

impl<P: Provider> ErasedProvider for P {
    fn create(&self, category: &str) -> CachedLogger {
        let logger = Arc::new(self.create_logger(category));
        CachedLogger {
            log: logger.clone(),
            any: logger,
        }
    }

    fn dispose(&self) {
        Provider::dispose(self)
    }
}

#[derive(Debug)]
struct Registration {
    type_id: TypeId,
    provider: Box<dyn ErasedProvider>,
}

/// A builder for configuring the logging providers. See also [`builder`] and [`test_output`].
///
/// Providers are registered at most once per type: adding a second provider of a type that is
/// already registered is a no-op.
#[must_use = "call `build` to create a dispatcher or `apply` to set the global logger"]
#[derive(Debug)]
pub struct LoggingBuilder {
    registrations: Vec<Registration>,

    // default to trace - we need this because the global default is OFF
    max_level: LevelFilter,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingBuilder {
    /// Create a new empty [`LoggingBuilder`].
    pub fn new() -> Self {
        Self {
            registrations: vec![],
            max_level: LevelFilter::Trace,
        }
    }

    /// Register `provider` unless a provider of the same type is already registered.
    pub fn add_provider<P: Provider>(mut self, provider: P) -> Self {
        if !self.has_provider::<P>() {
            self.registrations.push(Registration {
                type_id: TypeId::of::<P>(),
                provider: Box::new(provider),
            });
        }
        self
    }

    /// Register the default [`TestLoggerProvider`].
    pub fn add_test_output(self) -> Self {
        self.add_provider(TestLoggerProvider::default())
    }

    /// Remove every registered provider.
    pub fn clear_providers(mut self) -> Self {
        self.registrations.clear();
        self
    }

    /// Whether a provider of type `P` is registered.
    pub fn has_provider<P: Provider>(&self) -> bool {
        let type_id = TypeId::of::<P>();
        self.registrations.iter().any(|r| r.type_id == type_id)
    }

    /// The number of registered providers.
    pub fn provider_count(&self) -> usize {
        self.registrations.len()
    }

    /// Set the global maximum log level.
    ///
    /// This will be passed to [`log::set_max_level`] on [`LoggingBuilder::apply`].
    pub fn max_level(mut self, max_level: LevelFilter) -> Self {
        self.max_level = max_level;
        self
    }

    /// Read the global maximum log level from the environment variable `key`, e.g. `RUST_LOG`.
    ///
    /// Accepts the names understood by [`Level`]'s `FromStr`. The current maximum level is kept
    /// when the variable is unset or does not name a level.
    pub fn max_level_from_env(self, key: &str) -> Self {
        let level = std::env::var(key)
            .ok()
            .and_then(|value| value.trim().parse::<Level>().ok());
        match level {
            Some(level) => self.max_level(level.to_level_filter()),
            None => self,
        }
    }

    /// Create a [`Dispatcher`] over the registered providers.
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            registrations: self.registrations,
            loggers: Mutex::new(HashMap::new()),
        }
    }

    /// Set up the global logger with the registered providers.
    ///
    /// The returned [`Dispatcher`] is the installed global logger; use
    /// [`Dispatcher::logger`] to inspect the loggers it created.
    ///
    /// # Errors
    ///
    /// An error is returned if the global logger has already been set.
    pub fn try_apply(self) -> Result<&'static Dispatcher, Error> {
        let max_level = self.max_level;
        let mut initialized = false;
        let dispatcher = DISPATCHER.get_or_init(|| {
            initialized = true;
            self.build()
        });
        if !initialized {
            return Err(Error::new(ErrorKind::Unexpected, "failed to set global logger")
                .with_context("reason", "already initialized"));
        }

        log::set_logger(dispatcher).map_err(|err| {
            Error::new(ErrorKind::Unexpected, "failed to set global logger").with_source(err)
        })?;
        log::set_max_level(max_level);
        Ok(dispatcher)
    }

    /// Set up the global logger with the registered providers.
    ///
    /// # Panics
    ///
    /// This function will panic if it is called more than once, or if another library has already
    /// initialized a global logger.
    pub fn apply(self) -> &'static Dispatcher {
        self.try_apply()
            .expect("LoggingBuilder::apply should not be called after the global logger initialized")
    }
}

/// A logger facade that forwards [`log`] records to the loggers of every registered provider.
///
/// One logger is created per provider and record target, on first use, and reused afterward.
pub struct Dispatcher {
    registrations: Vec<Registration>,
    loggers: Mutex<HashMap<String, Arc<[CachedLogger]>>>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let targets: Vec<String> = self
            .loggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        f.debug_struct("Dispatcher")
            .field("registrations", &self.registrations)
            .field("targets", &targets)
            .finish()
    }
}

impl Dispatcher {
    /// The number of registered providers.
    pub fn provider_count(&self) -> usize {
        self.registrations.len()
    }

    /// Dispose every registered provider.
    pub fn dispose(&self) {
        for registration in &self.registrations {
            registration.provider.dispose();
        }
    }

    /// The logger of type `L` created for `target`, creating the target's loggers on first use.
    ///
    /// Returns `None` if no registered provider creates loggers of type `L`.
    ///
    /// # Examples
    ///
    /// ```
    /// use log::Log;
    /// use logforth_capture::TestLogger;
    /// use logforth_capture::TestLoggerOptions;
    /// use logforth_capture::TestLoggerProvider;
    /// use logforth_capture::sink::Buffer;
    ///
    /// let dispatcher = logforth_capture::builder()
    ///     .add_provider(
    ///         TestLoggerProvider::new(Buffer::default())
    ///             .with_options(TestLoggerOptions::default().capture_messages(true)),
    ///     )
    ///     .build();
    ///
    /// dispatcher.log(
    ///     &log::Record::builder()
    ///         .args(format_args!("ready"))
    ///         .level(log::Level::Info)
    ///         .target("db")
    ///         .build(),
    /// );
    ///
    /// let logger = dispatcher.logger::<TestLogger>("db").unwrap();
    /// assert_eq!(logger.entries()[0].message(), "ready");
    /// ```
    pub fn logger<L: log::Log + 'static>(&self, target: &str) -> Option<Arc<L>> {
        self.loggers_for(target)
            .iter()
            .find_map(|logger| logger.any.clone().downcast::<L>().ok())
    }

    fn loggers_for(&self, target: &str) -> Arc<[CachedLogger]> {
        if let Some(existing) = self
            .loggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(target)
        {
            return existing.clone();
        }

        // providers may log while creating loggers, so create them without holding the lock
        let created: Arc<[CachedLogger]> = self
            .registrations
            .iter()
            .map(|r| r.provider.create(target))
            .collect();

        self.loggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(target.to_owned())
            .or_insert(created)
            .clone()
    }
}

impl log::Log for Dispatcher {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.loggers_for(metadata.target())
            .iter()
            .any(|logger| logger.log.enabled(metadata))
    }

    fn log(&self, record: &log::Record) {
        // the lock is released here, so formatting may log recursively
        let loggers = self.loggers_for(record.target());
        for logger in loggers.iter() {
            if logger.log.enabled(record.metadata()) {
                logger.log.log(record);
            }
        }
    }

    fn flush(&self) {
        let loggers: Vec<_> = self
            .loggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for logger in loggers.iter().flat_map(|loggers| loggers.iter()) {
            logger.log.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use log::Log;

    use super::*;
    use crate::TestLogger;
    use crate::TestLoggerOptions;
    use crate::sink::Buffer;

    #[derive(Debug, Default)]
    struct OtherProvider;

    impl Provider for OtherProvider {
        type Logger = TestLogger;

        fn create_logger(&self, category: &str) -> TestLogger {
            TestLogger::new(Buffer::default()).with_category(category.to_owned())
        }
    }

    #[test]
    fn test_add_provider_dedups_by_type() {
        let builder = builder()
            .add_test_output()
            .add_test_output()
            .add_provider(TestLoggerProvider::new(Buffer::default()));
        assert_eq!(builder.provider_count(), 1);
        assert!(builder.has_provider::<TestLoggerProvider>());

        let builder = builder.add_provider(OtherProvider);
        assert_eq!(builder.provider_count(), 2);
    }

    #[test]
    fn test_output_keeps_only_test_provider() {
        let builder = test_output();
        assert_eq!(builder.provider_count(), 1);
        assert!(builder.has_provider::<TestLoggerProvider>());
        assert!(!builder.has_provider::<OtherProvider>());
        assert_eq!(builder.clear_providers().provider_count(), 0);
    }

    #[test]
    fn test_max_level_from_env() {
        // SAFETY: no other test reads or writes this variable
        unsafe { std::env::set_var("LOGFORTH_CAPTURE_TEST_LEVEL", "warning") };
        let builder = builder().max_level_from_env("LOGFORTH_CAPTURE_TEST_LEVEL");
        assert_eq!(builder.max_level, LevelFilter::Warn);

        let builder = builder.max_level_from_env("LOGFORTH_CAPTURE_TEST_LEVEL_UNSET");
        assert_eq!(builder.max_level, LevelFilter::Warn);
    }

    #[test]
    fn test_dispatcher_forwards_by_target() {
        let output = Buffer::default();
        let dispatcher = builder()
            .add_provider(
                TestLoggerProvider::new(output.clone())
                    .with_options(TestLoggerOptions::default().capture_messages(true)),
            )
            .build();
        assert_eq!(dispatcher.provider_count(), 1);

        for (target, message) in [("db", "connected"), ("http", "listening"), ("db", "ready")] {
            dispatcher.log(
                &log::Record::builder()
                    .args(format_args!("{message}"))
                    .level(log::Level::Info)
                    .target(target)
                    .build(),
            );
        }
        dispatcher.flush();
        dispatcher.dispose();

        assert_eq!(
            output.lines(),
            vec!["INFO: connected", "INFO: listening", "INFO: ready"]
        );
        assert_eq!(dispatcher.loggers_for("db").len(), 1);
        assert!(Arc::ptr_eq(
            &dispatcher.loggers_for("db")[0].log,
            &dispatcher.loggers_for("db")[0].log
        ));
    }

    #[test]
    fn test_dispatcher_exposes_captured_entries() {
        let dispatcher = builder()
            .add_provider(
                TestLoggerProvider::new(Buffer::default())
                    .with_options(TestLoggerOptions::default().capture_messages(true)),
            )
            .add_provider(OtherProvider)
            .build();

        for (target, message) in [("db", "connected"), ("http", "listening"), ("db", "ready")] {
            dispatcher.log(
                &log::Record::builder()
                    .args(format_args!("{message}"))
                    .level(log::Level::Warn)
                    .target(target)
                    .build(),
            );
        }

        let db = dispatcher.logger::<TestLogger>("db").unwrap();
        assert!(db.is_capturing());
        assert_eq!(db.category(), "db");
        let messages: Vec<_> = db
            .entries()
            .iter()
            .map(|entry| (entry.level(), entry.message().to_owned()))
            .collect();
        assert_eq!(
            messages,
            vec![
                (Level::Warn, "connected".to_string()),
                (Level::Warn, "ready".to_string()),
            ]
        );

        let http = dispatcher.logger::<TestLogger>("http").unwrap();
        assert_eq!(http.entry_count(), 1);
        assert!(Arc::ptr_eq(
            &http,
            &dispatcher.logger::<TestLogger>("http").unwrap()
        ));
        assert!(dispatcher.logger::<crate::TypedLogger<()>>("db").is_none());
    }

    #[test]
    fn test_dispatcher_respects_sink_availability() {
        let output = Buffer::default();
        output.set_available(false);
        let dispatcher = builder()
            .add_provider(TestLoggerProvider::new(output.clone()))
            .build();

        let metadata = log::Metadata::builder()
            .level(log::Level::Error)
            .target("any")
            .build();
        assert!(!dispatcher.enabled(&metadata));
    }
}
