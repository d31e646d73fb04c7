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

use std::sync::Arc;

use crate::clock::Clock;
use crate::clock::SystemClock;

/// Options for a [`TestLogger`](crate::TestLogger).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use logforth_capture::TestLogger;
/// use logforth_capture::TestLoggerOptions;
/// use logforth_capture::clock::ManualClock;
/// use logforth_capture::sink::Testing;
///
/// let clock = Arc::new(ManualClock::new("2025-01-01T00:00:00Z".parse().unwrap()));
/// let options = TestLoggerOptions::default()
///     .capture_messages(true)
///     .clock(clock.clone());
/// let logger = TestLogger::with_options(Testing::default(), options);
/// assert!(logger.is_capturing());
/// ```
#[derive(Debug, Clone)]
pub struct TestLoggerOptions {
    pub(crate) capture_messages: bool,
    pub(crate) clock: Arc<dyn Clock>,
}

impl Default for TestLoggerOptions {
    fn default() -> Self {
        Self {
            capture_messages: false,
            clock: Arc::new(SystemClock),
        }
    }
}

impl TestLoggerOptions {
    /// Record every emitted entry in memory.
    ///
    /// Default to `false`.
    pub fn capture_messages(mut self, capture_messages: bool) -> Self {
        self.capture_messages = capture_messages;
        self
    }

    /// Set the clock that timestamps captured entries.
    ///
    /// Default to [`SystemClock`].
    pub fn clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }
}
