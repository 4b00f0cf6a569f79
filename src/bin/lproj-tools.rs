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

//! Build steps for the localized resources of a macOS application.
//!
//! Run it from the project directory (or pass `--project-dir`). Paths
//! and tool names come from `lproj-tools.toml` when present.
//!
//! Tools which exit unsuccessfully are logged and otherwise ignored,
//! unless `--fail-fast` is given. Set `RUST_LOG` or pass `-v` for more
//! output.

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};
use lproj_tools::{helpindex, ibtool, Config, ExitPolicy, Invoker, SystemRunner};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose, args.quiet);

    let mut config = Config::discover(&args.project_dir, args.config.as_deref())
        .context("Could not load configuration")?;
    config.fail_fast |= args.fail_fast;
    let mut invoker = Invoker::new(SystemRunner, ExitPolicy::from_fail_fast(config.fail_fast));

    match args.command {
        Command::RebuildXibs => {
            ibtool::rebuild_xibs(&config, &mut invoker).context("Could not rebuild XIBs")?;
        }
        Command::ExportStrings { locale } => {
            let locale = locale.unwrap_or_else(|| config.default_locale.clone());
            let exported = ibtool::export_strings_for_locale(&config, &mut invoker, &locale)
                .with_context(|| format!("Could not export strings for {locale}"))?;
            info!("Exported strings from {exported} XIBs in {locale}");
        }
        Command::ImportStrings {
            source_locale,
            locales,
        } => {
            let source_locale = source_locale.unwrap_or_else(|| config.default_locale.clone());
            let built = if locales.is_empty() {
                ibtool::build_xibs_for_all_locales(&config, &mut invoker, &source_locale)
                    .context("Could not build localized XIBs")?
            } else {
                let mut built = 0;
                for locale in &locales {
                    built +=
                        ibtool::build_xibs_for_locale(&config, &mut invoker, locale, &source_locale)
                            .with_context(|| format!("Could not build XIBs for {locale}"))?;
                }
                built
            };
            info!("Built {built} localized XIBs from {source_locale}");
        }
        Command::ReindexHelp { verbose_index } => {
            config.hiutil_verbose = verbose_index.or(config.hiutil_verbose);
            let indexed =
                helpindex::reindex_help(&config, &mut invoker).context("Could not reindex help")?;
            info!("Reindexed help for {indexed} locales");
        }
        Command::ReindexHelpbooks {
            verbose_index,
            books,
        } => {
            config.hiutil_verbose = verbose_index.or(config.hiutil_verbose);
            let books = books
                .iter()
                .map(|book| args.project_dir.join(book))
                .collect::<Vec<_>>();
            let indexed = helpindex::reindex_help_books(&config, &mut invoker, &books)
                .context("Could not reindex help books")?;
            info!("Reindexed {indexed} help book locales");
        }
    }

    Ok(())
}

#[derive(Clone, Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Directory which relative paths in the configuration are resolved against.
    #[arg(long, global = true, default_value = ".")]
    project_dir: PathBuf,
    /// Configuration file, defaults to lproj-tools.toml in the project directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Stop at the first tool which exits unsuccessfully.
    #[arg(long, global = true)]
    fail_fast: bool,
    /// Log more, repeat for even more.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Export the strings of the default locale, then rebuild the XIBs of every other locale.
    RebuildXibs,
    /// Export a .strings file for every XIB of a locale.
    ExportStrings {
        /// Locale directory name, defaults to the default locale.
        locale: Option<String>,
    },
    /// Rebuild localized XIBs from the .strings files of each locale.
    ImportStrings {
        /// Locale whose XIBs are used as templates.
        #[arg(long)]
        source_locale: Option<String>,
        /// Locale directory names, defaults to every locale but the source.
        locales: Vec<String>,
    },
    /// Reindex the help folder of every locale in the resource root.
    ReindexHelp {
        /// Whether hiutil should be verbose.
        #[arg(long)]
        verbose_index: Option<bool>,
    },
    /// Reindex every locale of the given help book bundles.
    ReindexHelpbooks {
        /// Whether hiutil should be verbose.
        #[arg(long)]
        verbose_index: Option<bool>,
        /// Help book bundles, defaults to the configured help books.
        books: Vec<PathBuf>,
    },
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Some("warn"),
        (false, 0) => None,
        (false, 1) => Some("debug"),
        (false, _) => Some("trace"),
    };
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_args_are_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_reindex_helpbooks() {
        let args = Args::parse_from([
            "lproj-tools",
            "--fail-fast",
            "reindex-helpbooks",
            "--verbose-index=false",
            "A.help",
            "B.help",
        ]);
        assert!(args.fail_fast);
        match args.command {
            Command::ReindexHelpbooks {
                verbose_index,
                books,
            } => {
                assert_eq!(verbose_index, Some(false));
                assert_eq!(books, vec![PathBuf::from("A.help"), PathBuf::from("B.help")]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_import_strings_defaults() {
        let args = Args::parse_from(["lproj-tools", "import-strings", "-v"]);
        assert_eq!(args.verbose, 1);
        match args.command {
            Command::ImportStrings {
                source_locale,
                locales,
            } => {
                assert_eq!(source_locale, None);
                assert!(locales.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
