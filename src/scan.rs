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

//! Discovery of locale directories and localizable files.
//!
//! Nothing here recurses: every function looks at the immediate
//! children of a single directory. The order of the returned names is
//! whatever the filesystem hands back.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Extension of a locale container, e.g. `English.lproj`.
pub const LOCALE_EXTENSION: &str = "lproj";
/// Extension of Interface Builder documents.
pub const XIB_EXTENSION: &str = "xib";
/// Extension of the key/value translation files paired with XIBs.
pub const STRINGS_EXTENSION: &str = "strings";

/// Returns the names of the entries in `dir` whose extension matches
/// `extension`, ignoring ASCII case.
///
/// The extension may be given with or without its leading dot. Names
/// which are not valid UTF-8 are skipped.
pub fn entries_with_extension(dir: &Path, extension: &str) -> Result<Vec<String>> {
    let extension = extension.trim_start_matches('.');
    let scan_error = |source| Error::Scan {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(scan_error)? {
        let entry = entry.map_err(scan_error)?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if has_extension(&name, extension) {
            names.push(name);
        }
    }
    Ok(names)
}

fn has_extension(name: &str, extension: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Returns the names of all locale directories in `root`.
pub fn locales_in(root: &Path) -> Result<Vec<String>> {
    entries_with_extension(root, LOCALE_EXTENSION)
}

/// Returns the names of all XIB files in a locale directory.
pub fn xibs_in(locale_dir: &Path) -> Result<Vec<String>> {
    entries_with_extension(locale_dir, XIB_EXTENSION)
}

/// Returns the path of the file called like `name`, but with
/// `extension`, inside `dir`.
///
/// `sibling_path("de.lproj", "Foo.xib", "strings")` is `de.lproj/Foo.strings`.
pub fn sibling_path(dir: &Path, name: &str, extension: &str) -> PathBuf {
    dir.join(name).with_extension(extension)
}
