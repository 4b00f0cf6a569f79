// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Helpers for building localized macOS resources.
//!
//! A localized application keeps one `<locale>.lproj` directory per
//! language in its resource root. The functions here keep those
//! directories up to date:
//!
//! - [`ibtool::rebuild_xibs`] exports the strings of the XIBs in the
//!   default locale and rebuilds the XIBs of every other locale from
//!   their translated `.strings` files.
//! - [`helpindex::reindex_help`] and [`helpindex::reindex_help_books`]
//!   regenerate the search indexes of the help content.
//!
//! The actual work is done by Apple's command line tools. All
//! invocations go through a [`runner::CommandRunner`], so the drivers can
//! be exercised without them.

pub mod config;
pub mod error;
pub mod helpindex;
pub mod ibtool;
pub mod runner;
pub mod scan;

pub use config::Config;
pub use error::{Error, Result};
pub use runner::{CommandRunner, ExitPolicy, Invoker, SystemRunner, ToolCommand, ToolOutput};
