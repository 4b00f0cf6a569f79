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

//! Regenerating localized XIBs with `ibtool`.
//!
//! The XIBs of the default locale are the templates. Their strings are
//! exported to `.strings` files next to them, translators produce a
//! `.strings` file per locale, and the localized XIBs are rebuilt by
//! importing those into the templates.

use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::runner::{CommandRunner, Invoker, ToolCommand};
use crate::scan::{locales_in, sibling_path, xibs_in, STRINGS_EXTENSION};

/// Exports a `.strings` file for every XIB in `locale`.
///
/// Returns the number of XIBs exported.
pub fn export_strings_for_locale<R: CommandRunner>(
    config: &Config,
    invoker: &mut Invoker<R>,
    locale: &str,
) -> Result<usize> {
    let path = config.locale_dir(locale);
    let xibs = xibs_in(&path)?;

    for name in &xibs {
        let xib_path = path.join(name);
        let strings_path = sibling_path(&path, name, STRINGS_EXTENSION);
        let command = ToolCommand::new(&config.ibtool)
            .arg("--export-strings-file")
            .arg(&strings_path)
            .arg(&xib_path);
        invoker.invoke(&command)?;
    }

    Ok(xibs.len())
}

/// Builds the localized XIBs of `locale` by importing its `.strings`
/// files into the XIBs of `source_locale`.
///
/// XIBs without a translation in `locale` are skipped. Returns the
/// number of XIBs built.
pub fn build_xibs_for_locale<R: CommandRunner>(
    config: &Config,
    invoker: &mut Invoker<R>,
    locale: &str,
    source_locale: &str,
) -> Result<usize> {
    let dest_path = config.locale_dir(locale);
    let source_path = config.locale_dir(source_locale);
    let mut built = 0;

    for name in xibs_in(&source_path)? {
        let source_xib_path = source_path.join(&name);
        let strings_path = sibling_path(&dest_path, &name, STRINGS_EXTENSION);
        let dest_xib_path = dest_path.join(&name);

        if !strings_path.exists() {
            debug!("No translation of {name} in {locale}, skipping");
            continue;
        }

        let command = ToolCommand::new(&config.ibtool)
            .arg("--import-strings-file")
            .arg(&strings_path)
            .arg("--write")
            .arg(&dest_xib_path)
            .arg(&source_xib_path);
        invoker.invoke(&command)?;
        built += 1;
    }

    Ok(built)
}

/// Builds the localized XIBs of every locale except `source_locale`.
///
/// Returns the number of XIBs built.
pub fn build_xibs_for_all_locales<R: CommandRunner>(
    config: &Config,
    invoker: &mut Invoker<R>,
    source_locale: &str,
) -> Result<usize> {
    let mut built = 0;
    for locale in locales_in(&config.resource_root)? {
        if locale == source_locale {
            continue;
        }
        built += build_xibs_for_locale(config, invoker, &locale, source_locale)?;
    }
    Ok(built)
}

/// Exports the strings of the default locale, then rebuilds the XIBs of
/// all other locales from it.
pub fn rebuild_xibs<R: CommandRunner>(config: &Config, invoker: &mut Invoker<R>) -> Result<()> {
    let exported = export_strings_for_locale(config, invoker, &config.default_locale)?;
    let built = build_xibs_for_all_locales(config, invoker, &config.default_locale)?;
    info!("Exported {exported} XIBs and built {built} localized XIBs");
    Ok(())
}
