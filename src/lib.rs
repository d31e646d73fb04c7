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

//! A logger for tests: it writes log lines into the test harness output, and can capture every
//! emitted entry in memory so tests can assert on what was logged.
//!
//! # Overview
//!
//! [`TestLogger`] formats each message as `"{LEVEL}: {message}"` and writes it to a
//! [`Sink`](sink::Sink). With capturing enabled, it also records an [`Entry`] stamped by an
//! injectable [`Clock`](clock::Clock), so timestamps can be pinned with a
//! [`ManualClock`](clock::ManualClock). It integrates with the `log` crate: every logger
//! implements [`log::Log`], and [`test_output`] installs a global logger that routes the `log`
//! macros to the test harness.
//!
//! # Examples
//!
//! Capture entries with a fixed clock:
//!
//! ```
//! use std::sync::Arc;
//!
//! use jiff::SignedDuration;
//! use logforth_capture::EventId;
//! use logforth_capture::Level;
//! use logforth_capture::TestLogger;
//! use logforth_capture::TestLoggerOptions;
//! use logforth_capture::clock::ManualClock;
//! use logforth_capture::sink::Testing;
//!
//! let clock = Arc::new(ManualClock::new("2025-01-01T00:00:00Z".parse().unwrap()));
//! let logger = TestLogger::with_options(
//!     Testing::default(),
//!     TestLoggerOptions::default()
//!         .capture_messages(true)
//!         .clock(clock.clone()),
//! );
//!
//! logger
//!     .log(
//!         Level::Info,
//!         EventId::new(1).with_name("E"),
//!         Some(Arc::new("st")),
//!         None,
//!         Some(|_: Option<&&str>, _: Option<&_>| "hello".to_string()),
//!     )
//!     .unwrap();
//!
//! clock.advance(SignedDuration::from_hours(1)).unwrap();
//! logger
//!     .log(
//!         Level::Warn,
//!         EventId::new(2),
//!         None::<Arc<()>>,
//!         None,
//!         Some(|_: Option<&()>, _: Option<&_>| String::new()),
//!     )
//!     .unwrap();
//!
//! let entries = logger.entries();
//! assert_eq!(entries.len(), 1);
//! assert_eq!(entries[0].message(), "hello");
//! assert_eq!(entries[0].timestamp().to_string(), "2025-01-01T00:00:00Z");
//! ```
//!
//! Route the `log` macros to the test harness output:
//!
//! ```
//! logforth_capture::test_output().apply();
//!
//! log::info!("This is an info message.");
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod clock;
pub mod level;
pub mod provider;
pub mod sink;

mod builder;
mod entry;
mod error;
mod event;
mod logger;

pub use self::builder::Dispatcher;
pub use self::builder::LoggingBuilder;
pub use self::builder::builder;
pub use self::builder::test_output;
pub use self::entry::Entry;
pub use self::entry::KeyValues;
pub use self::entry::SharedError;
pub use self::entry::State;
pub use self::error::Error;
pub use self::error::ErrorKind;
pub use self::event::EventId;
pub use self::level::Level;
pub use self::logger::Logger;
pub use self::logger::Scope;
pub use self::logger::TestLogger;
pub use self::logger::TestLoggerOptions;
pub use self::logger::TypedLogger;
pub use self::provider::Provider;
pub use self::provider::TestLoggerProvider;
