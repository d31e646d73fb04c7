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
use std::sync::Arc;

use jiff::Timestamp;

use crate::EventId;
use crate::Level;

/// An opaque state payload attached to a log call.
pub type State = Arc<dyn Any + Send + Sync>;

/// An error attached to a log call.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// Key-value pairs collected from a [`log::Record`], used as the state of entries logged through
/// the `log` facade.
pub type KeyValues = Vec<(String, String)>;

/// One captured log occurrence.
///
/// The state and error are held by reference: they point at the very allocations passed to the
/// log call. Equality therefore compares them by identity.
#[derive(Clone)]
pub struct Entry {
    timestamp: Timestamp,
    level: Level,
    event_id: EventId,
    state: Option<State>,
    error: Option<SharedError>,
    message: String,
}

impl Entry {
    /// Create a new entry.
    pub fn new(
        timestamp: Timestamp,
        level: Level,
        event_id: EventId,
        state: Option<State>,
        error: Option<SharedError>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            level,
            event_id,
            state,
            error,
            message: message.into(),
        }
    }

    /// The instant the entry was captured.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// The severity of the entry.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The event id passed to the log call.
    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    /// The untyped state passed to the log call.
    pub fn raw_state(&self) -> Option<&State> {
        self.state.as_ref()
    }

    /// The state passed to the log call, if it is a `T`.
    pub fn state<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.state.clone()?.downcast::<T>().ok()
    }

    /// The error passed to the log call.
    pub fn error(&self) -> Option<&SharedError> {
        self.error.as_ref()
    }

    /// The formatted message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

fn same_allocation<T: ?Sized>(a: &Option<Arc<T>>, b: &Option<Arc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
            && self.level == other.level
            && self.event_id == other.event_id
            && self.message == other.message
            && same_allocation(&self.state, &other.state)
            && same_allocation(&self.error, &other.error)
    }
}

impl Eq for Entry {}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("timestamp", &self.timestamp)
            .field("level", &self.level)
            .field("event_id", &self.event_id)
            .field("state", &self.state.as_ref().map(|_| ".."))
            .field("error", &self.error.as_ref().map(|e| e.to_string()))
            .field("message", &self.message)
            .finish()
    }
}
