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

//! Destinations for formatted log lines.

use std::fmt;
use std::sync::Arc;

use crate::Error;

mod buffer;
mod testing;

pub use self::buffer::Buffer;
pub use self::testing::Testing;

/// A destination that receives formatted log lines.
pub trait Sink: fmt::Debug + Send + Sync + 'static {
    /// Whether the sink can currently accept output.
    ///
    /// Default to `true`.
    fn is_available(&self) -> bool {
        true
    }

    /// Write one formatted line.
    fn write_line(&self, line: &str) -> Result<(), Error>;
}

impl<T: Sink + ?Sized> Sink for Arc<T> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn write_line(&self, line: &str) -> Result<(), Error> {
        (**self).write_line(line)
    }
}
