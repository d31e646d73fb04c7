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
use std::sync::Arc;

use crate::Error;
use crate::EventId;
use crate::Level;
use crate::entry::SharedError;

mod options;
mod test_logger;
mod typed;

pub use self::options::TestLoggerOptions;
pub use self::test_logger::TestLogger;
pub use self::typed::TypedLogger;

/// The logging capability.
///
/// Messages are formatted lazily: `formatter` only runs when the level is enabled.
pub trait Logger {
    /// Whether a call at `level` would produce output.
    fn is_enabled(&self, level: Level) -> bool;

    /// Log a message.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument) error when
    /// `formatter` is `None`, whether or not `level` is enabled.
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
        F: FnOnce(Option<&S>, Option<&SharedError>) -> String;

    /// Begin a logical operation scope.
    fn begin_scope<S>(&self, state: S) -> Scope;
}

/// The handle returned by [`Logger::begin_scope`].
///
/// Scopes carry no context; closing or dropping one does nothing.
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct Scope {}

impl Scope {
    /// End the scope.
    pub fn close(self) {}
}
