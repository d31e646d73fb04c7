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
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::Error;
use crate::sink::Sink;

#[derive(Debug)]
struct Shared {
    available: AtomicBool,
    lines: Mutex<Vec<String>>,
}

/// An in-memory sink.
///
/// Clones share the same lines, so a test can keep one handle and give another to a logger.
/// Availability can be switched off to simulate a test context without an output stream.
///
/// # Examples
///
/// ```
/// use logforth_capture::sink::Buffer;
/// use logforth_capture::sink::Sink;
///
/// let buffer = Buffer::default();
/// buffer.clone().write_line("INFO: hello").unwrap();
/// assert_eq!(buffer.lines(), vec!["INFO: hello".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct Buffer {
    shared: Arc<Shared>,
}

impl Default for Buffer {
    fn default() -> Self {
        Self {
            shared: Arc::new(Shared {
                available: AtomicBool::new(true),
                lines: Mutex::new(vec![]),
            }),
        }
    }
}

impl Buffer {
    /// Switch the availability reported by [`Sink::is_available`].
    pub fn set_available(&self, available: bool) {
        self.shared.available.store(available, Ordering::SeqCst);
    }

    /// A snapshot of every line written so far, in order.
    pub fn lines(&self) -> Vec<String> {
        self.shared
            .lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return every line written so far.
    pub fn take_lines(&self) -> Vec<String> {
        std::mem::take(
            &mut *self
                .shared
                .lines
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}

impl Sink for Buffer {
    fn is_available(&self) -> bool {
        self.shared.available.load(Ordering::SeqCst)
    }

    fn write_line(&self, line: &str) -> Result<(), Error> {
        self.shared
            .lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_owned());
        Ok(())
    }
}
