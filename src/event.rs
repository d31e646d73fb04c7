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

use std::borrow::Cow;
use std::fmt;

/// Identifies a logging event: a numeric id with an optional name.
///
/// # Examples
///
/// ```
/// use logforth_capture::EventId;
///
/// let started = EventId::new(1).with_name("Started");
/// assert_eq!(started.to_string(), "Started[1]");
/// assert_eq!(EventId::from(2).to_string(), "2");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EventId {
    id: i32,
    name: Option<Cow<'static, str>>,
}

impl EventId {
    /// Create an unnamed event id.
    pub const fn new(id: i32) -> Self {
        Self { id, name: None }
    }

    /// Attach a name to the event id.
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The numeric id.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// The name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl From<i32> for EventId {
    fn from(id: i32) -> Self {
        EventId::new(id)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}[{}]", self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_id_equality() {
        assert_eq!(EventId::new(1).with_name("E"), EventId::new(1).with_name("E"));
        assert_ne!(EventId::new(1).with_name("E"), EventId::new(1));
        assert_ne!(EventId::new(1), EventId::new(2));
        assert_eq!(EventId::default(), EventId::from(0));
    }
}
