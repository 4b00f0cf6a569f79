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

//! Settings shared by all drivers.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Locations and tool names used by the drivers.
///
/// Every field is optional in the configuration file. Missing fields
/// keep their defaults.
///
/// ## Example
///
/// ```toml
/// resource_root = "Resources"
/// default_locale = "English.lproj"
/// help_books = ["Resources/Boxer.help"]
/// fail_fast = true
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding one `*.lproj` directory per locale.
    pub resource_root: PathBuf,
    /// The source locale. Its XIBs are the templates for all others.
    pub default_locale: String,
    /// Help folder inside each locale of the resource root.
    pub help_folder: String,
    /// Name of the index written into the help folder.
    pub help_index: String,
    /// Help book bundles reindexed by `reindex-helpbooks`.
    pub help_books: Vec<PathBuf>,
    pub ibtool: String,
    pub hiutil: String,
    pub killall: String,
    /// Process holding the system help cache.
    pub helpd: String,
    /// Abort on the first tool which exits unsuccessfully.
    pub fail_fast: bool,
    /// Pass `-vv` to `hiutil`. Unset means the driver decides.
    pub hiutil_verbose: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resource_root: PathBuf::from("Resources"),
            default_locale: String::from("English.lproj"),
            help_folder: String::from("BoxerHelp"),
            help_index: String::from("BoxerHelp.helpindex"),
            help_books: vec![
                PathBuf::from("Resources/Boxer.help"),
                PathBuf::from("Standalone/Resources/Help.help"),
            ],
            ibtool: String::from("ibtool"),
            hiutil: String::from("hiutil"),
            killall: String::from("killall"),
            helpd: String::from("helpd"),
            fail_fast: false,
            hiutil_verbose: None,
        }
    }
}

impl Config {
    /// Name of the configuration file looked up in the project directory.
    pub const FILE_NAME: &'static str = "lproj-tools.toml";

    /// Parses a TOML document. `path` is only used in error messages.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|err| Error::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Reads and parses the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|err| Error::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_toml(&text, path)
    }

    /// Loads `explicit` if given, otherwise [`Config::FILE_NAME`] in
    /// `project_dir` if it exists, otherwise the defaults.
    ///
    /// Relative paths in the result are resolved against `project_dir`.
    pub fn discover(project_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::load(path)?,
            None => {
                let path = project_dir.join(Self::FILE_NAME);
                if path.is_file() {
                    Self::load(&path)?
                } else {
                    debug!("No {} in {}, using defaults", Self::FILE_NAME, project_dir.display());
                    Self::default()
                }
            }
        };
        Ok(config.resolved_against(project_dir))
    }

    /// Makes the resource root and help book paths absolute by joining
    /// them onto `base`. Absolute paths are kept as they are.
    pub fn resolved_against(mut self, base: &Path) -> Self {
        self.resource_root = base.join(&self.resource_root);
        self.help_books = self
            .help_books
            .iter()
            .map(|book| base.join(book))
            .collect();
        self
    }

    /// Path of a locale directory in the resource root.
    pub fn locale_dir(&self, locale: &str) -> PathBuf {
        self.resource_root.join(locale)
    }
}
