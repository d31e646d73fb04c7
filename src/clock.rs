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

//! Time sources for captured entries.

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use jiff::SignedDuration;
use jiff::Timestamp;

use crate::Error;
use crate::ErrorKind;

/// A source of the current instant.
pub trait Clock: fmt::Debug + Send + Sync + 'static {
    /// The current instant.
    fn now(&self) -> Timestamp;
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// The wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock whose time only moves when told to.
///
/// # Examples
///
/// ```
/// use jiff::SignedDuration;
/// use jiff::Timestamp;
/// use logforth_capture::clock::Clock;
/// use logforth_capture::clock::ManualClock;
///
/// let start: Timestamp = "2025-01-01T00:00:00Z".parse().unwrap();
/// let clock = ManualClock::new(start);
/// clock.advance(SignedDuration::from_hours(1)).unwrap();
/// assert_eq!(clock.now().to_string(), "2025-01-01T01:00:00Z");
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    /// Create a clock fixed at `now`.
    pub fn new(now: Timestamp) -> ManualClock {
        ManualClock {
            now: Mutex::new(now),
        }
    }

    /// Reset the clock to `now`.
    pub fn set_now(&self, now: Timestamp) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Move the clock by `duration`, which may be negative.
    ///
    /// # Errors
    ///
    /// Returns an error if the result falls outside the supported timestamp range; the clock is
    /// left unchanged in that case.
    pub fn advance(&self, duration: SignedDuration) -> Result<(), Error> {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        let next = now.checked_add(duration).map_err(|err| {
            Error::new(ErrorKind::Unexpected, "failed to advance clock")
                .with_context("now", *now)
                .with_context("duration", duration)
                .with_source(err)
        })?;
        *now = next;
        Ok(())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
