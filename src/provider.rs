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

//! Factories of named loggers.

use std::fmt;
use std::sync::Arc;

use crate::Logger;
use crate::TestLogger;
use crate::TestLoggerOptions;
use crate::sink::Sink;
use crate::sink::Testing;

/// A factory of loggers keyed by category name.
pub trait Provider: fmt::Debug + Send + Sync + 'static {
    /// The logger type this provider creates.
    type Logger: Logger + log::Log + 'static;

    /// Create a new logger for `category`.
    fn create_logger(&self, category: &str) -> Self::Logger;

    /// Release the provider.
    ///
    /// Default to a no-op.
    fn dispose(&self) {}
}

/// A provider of [`TestLogger`]s.
///
/// Each call to [`create_logger`](Provider::create_logger) returns a fresh logger with its own
/// captured entries. Loggers share the sink and the clock.
///
/// # Examples
///
/// ```
/// use logforth_capture::Provider;
/// use logforth_capture::TestLoggerProvider;
/// use logforth_capture::sink::Buffer;
///
/// let provider = TestLoggerProvider::new(Buffer::default());
/// let logger = provider.create_logger("app::db");
/// assert_eq!(logger.category(), "app::db");
/// ```
#[derive(Debug, Clone)]
pub struct TestLoggerProvider {
    sink: Arc<dyn Sink>,
    options: TestLoggerOptions,
}

impl Default for TestLoggerProvider {
    fn default() -> Self {
        Self::new(Testing::default())
    }
}

impl TestLoggerProvider {
    /// Create a provider writing to `sink`.
    pub fn new(sink: impl Sink) -> Self {
        Self {
            sink: Arc::new(sink),
            options: TestLoggerOptions::default(),
        }
    }

    /// Set the options applied to every created logger.
    pub fn with_options(mut self, options: TestLoggerOptions) -> Self {
        self.options = options;
        self
    }
}

impl Provider for TestLoggerProvider {
    type Logger = TestLogger;

    fn create_logger(&self, category: &str) -> TestLogger {
        TestLogger::from_parts(self.sink.clone(), self.options.clone())
            .with_category(category.to_owned())
    }
}
