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

//! Rebuilding help search indexes with `hiutil`.
//!
//! Two layouts are supported. Help folders living directly in the
//! locales of the resource root (`<root>/<locale>/BoxerHelp`), and help
//! book bundles (`<bundle>/Contents/Resources/<locale>`). Either way the
//! index is rebuilt from scratch, the indexed directory is touched so
//! that Xcode copies it again, and finally `helpd` is killed to drop its
//! cached copy of the old index.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::runner::{CommandRunner, Invoker, ToolCommand};
use crate::scan::locales_in;

/// Index file name inside each locale of a help book bundle.
pub const HELP_BOOK_INDEX_NAME: &str = "search.helpindex";

/// Language used by `hiutil` for stemming and case folding.
const INDEX_LANGUAGE: &str = "en";

/// Shortest term which makes it into the index.
const MIN_TERM_LENGTH: &str = "2";

/// Builds the `hiutil` invocation which indexes `content_dir` into
/// `index_path`.
pub fn hiutil_command(
    config: &Config,
    index_path: &Path,
    content_dir: &Path,
    verbose: bool,
) -> ToolCommand {
    let mut command = ToolCommand::new(&config.hiutil).args(["-C", "-a", "-s", INDEX_LANGUAGE]);
    if verbose {
        command = command.arg("-vv");
    }
    command
        .args(["-m", MIN_TERM_LENGTH, "-f"])
        .arg(index_path)
        .arg(content_dir)
}

/// Sets the modification time of `path` to now.
pub fn touch(path: &Path) -> Result<()> {
    let touch_error = |source| Error::Touch {
        path: path.to_path_buf(),
        source,
    };
    File::open(path)
        .and_then(|file| file.set_modified(SystemTime::now()))
        .map_err(touch_error)
}

/// Reindexes the help folder of one locale in the resource root.
pub fn reindex_help_for_locale<R: CommandRunner>(
    config: &Config,
    invoker: &mut Invoker<R>,
    locale: &str,
    verbose: bool,
) -> Result<()> {
    let help_path = config.locale_dir(locale).join(&config.help_folder);
    let index_path = help_path.join(&config.help_index);

    invoker.invoke(&hiutil_command(config, &index_path, &help_path, verbose))?;
    touch(&help_path)
}

/// Reindexes the help folders of every locale in the resource root, then
/// kills `helpd`.
///
/// Returns the number of locales indexed.
pub fn reindex_help<R: CommandRunner>(config: &Config, invoker: &mut Invoker<R>) -> Result<usize> {
    let verbose = config.hiutil_verbose.unwrap_or(false);
    let locales = locales_in(&config.resource_root)?;
    for locale in &locales {
        reindex_help_for_locale(config, invoker, locale, verbose)?;
    }
    kill_helpd(config, invoker);
    Ok(locales.len())
}

/// Reindexes every locale of a help book bundle and touches the bundle.
///
/// Returns the number of locales indexed.
pub fn reindex_help_book<R: CommandRunner>(
    config: &Config,
    invoker: &mut Invoker<R>,
    book: &Path,
    verbose: bool,
) -> Result<usize> {
    let resources = book.join("Contents").join("Resources");
    let locales = locales_in(&resources)?;
    for locale in &locales {
        let content_dir = resources.join(locale);
        let index_path = content_dir.join(HELP_BOOK_INDEX_NAME);
        invoker.invoke(&hiutil_command(config, &index_path, &content_dir, verbose))?;
    }
    touch(book)?;
    info!("Reindexed {} locales of {}", locales.len(), book.display());
    Ok(locales.len())
}

/// Reindexes the given help books, or the configured ones when `books`
/// is empty, then kills `helpd`.
///
/// Returns the number of locales indexed.
pub fn reindex_help_books<R: CommandRunner>(
    config: &Config,
    invoker: &mut Invoker<R>,
    books: &[PathBuf],
) -> Result<usize> {
    let books: &[PathBuf] = if books.is_empty() {
        &config.help_books
    } else {
        books
    };
    let verbose = config.hiutil_verbose.unwrap_or(true);

    let mut indexed = 0;
    for book in books {
        indexed += reindex_help_book(config, invoker, book, verbose)?;
    }
    kill_helpd(config, invoker);
    Ok(indexed)
}

/// Asks the help daemon to quit so it reloads the indexes next time.
///
/// Nothing here can fail: `helpd` not running, or `killall` missing,
/// only shows up in the log.
pub fn kill_helpd<R: CommandRunner>(config: &Config, invoker: &mut Invoker<R>) {
    let command = ToolCommand::new(&config.killall).arg(&config.helpd);
    invoker.invoke_best_effort(&command);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::testing::RecordingRunner;
    use crate::runner::ExitPolicy;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::time::{Duration, UNIX_EPOCH};

    fn lenient_invoker() -> Invoker<RecordingRunner> {
        Invoker::new(RecordingRunner::new(), ExitPolicy::Lenient)
    }

    fn create_dirs(root: &Path, dirs: &[&str]) {
        for dir in dirs {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
    }

    fn backdate(path: &Path) -> SystemTime {
        let old = UNIX_EPOCH + Duration::from_secs(1_000_000_000);
        File::open(path).unwrap().set_modified(old).unwrap();
        old
    }

    fn modified(path: &Path) -> SystemTime {
        fs::metadata(path).unwrap().modified().unwrap()
    }

    fn hiutil_line(index: &Path, content: &Path, verbose: bool) -> Vec<String> {
        let mut line = vec!["hiutil", "-C", "-a", "-s", "en"];
        if verbose {
            line.push("-vv");
        }
        line.extend(["-m", "2", "-f"]);
        line.into_iter()
            .map(String::from)
            .chain([index.display().to_string(), content.display().to_string()])
            .collect()
    }

    fn killall_line() -> Vec<String> {
        vec![String::from("killall"), String::from("helpd")]
    }

    #[test]
    fn test_hiutil_command() {
        let config = Config::default();
        let command = hiutil_command(
            &config,
            Path::new("en.lproj/search.helpindex"),
            Path::new("en.lproj"),
            true,
        );
        assert_eq!(
            command.to_string(),
            "hiutil -C -a -s en -vv -m 2 -f en.lproj/search.helpindex en.lproj"
        );
    }

    #[test]
    fn test_touch_updates_modification_time() {
        let tmpdir = tempfile::tempdir().unwrap();
        let old = backdate(tmpdir.path());
        touch(tmpdir.path()).unwrap();
        assert!(modified(tmpdir.path()) > old);
    }

    #[test]
    fn test_touch_missing_path() {
        let tmpdir = tempfile::tempdir().unwrap();
        let err = touch(&tmpdir.path().join("missing")).unwrap_err();
        assert!(matches!(err, Error::Touch { .. }), "unexpected error: {err}");
    }

    #[test]
    fn test_reindex_help() {
        let tmpdir = tempfile::tempdir().unwrap();
        let root = tmpdir.path().join("Resources");
        create_dirs(&root, &["English.lproj/BoxerHelp", "notes"]);
        let help_path = root.join("English.lproj/BoxerHelp");
        let old = backdate(&help_path);
        let config = Config {
            resource_root: root,
            ..Config::default()
        };
        let mut invoker = lenient_invoker();

        let indexed = reindex_help(&config, &mut invoker).unwrap();
        assert_eq!(indexed, 1);
        assert_eq!(
            invoker.runner().command_lines(),
            vec![
                hiutil_line(&help_path.join("BoxerHelp.helpindex"), &help_path, false),
                killall_line(),
            ]
        );
        assert!(modified(&help_path) > old);
    }

    #[test]
    fn test_reindex_help_book() {
        let tmpdir = tempfile::tempdir().unwrap();
        let book = tmpdir.path().join("Boxer.help");
        create_dirs(
            &book,
            &["Contents/Resources/English.lproj", "Contents/Resources/shared"],
        );
        let old = backdate(&book);
        let config = Config::default();
        let mut invoker = lenient_invoker();

        let indexed = reindex_help_book(&config, &mut invoker, &book, true).unwrap();
        assert_eq!(indexed, 1);
        let content = book.join("Contents/Resources/English.lproj");
        assert_eq!(
            invoker.runner().command_lines(),
            vec![hiutil_line(&content.join("search.helpindex"), &content, true)]
        );
        assert!(modified(&book) > old);
    }

    #[test]
    fn test_reindex_help_books_defaults() {
        let tmpdir = tempfile::tempdir().unwrap();
        create_dirs(
            tmpdir.path(),
            &[
                "Resources/Boxer.help/Contents/Resources/English.lproj",
                "Standalone/Resources/Help.help/Contents/Resources/English.lproj",
            ],
        );
        let config = Config::default().resolved_against(tmpdir.path());
        let mut invoker = lenient_invoker();

        let indexed = reindex_help_books(&config, &mut invoker, &[]).unwrap();
        assert_eq!(indexed, 2);
        let indexed_dirs = invoker
            .runner()
            .command_lines()
            .into_iter()
            .filter(|line| line[0] == "hiutil")
            .map(|line| line.last().cloned().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(
            indexed_dirs,
            vec![
                tmpdir
                    .path()
                    .join("Resources/Boxer.help/Contents/Resources/English.lproj")
                    .display()
                    .to_string(),
                tmpdir
                    .path()
                    .join("Standalone/Resources/Help.help/Contents/Resources/English.lproj")
                    .display()
                    .to_string(),
            ]
        );
        assert_eq!(invoker.runner().command_lines().last(), Some(&killall_line()));
    }

    #[test]
    fn test_reindex_help_books_explicit_paths() {
        let tmpdir = tempfile::tempdir().unwrap();
        let book = tmpdir.path().join("Other.help");
        create_dirs(&book, &["Contents/Resources/de.lproj"]);
        let config = Config {
            hiutil_verbose: Some(false),
            ..Config::default().resolved_against(tmpdir.path())
        };
        let mut invoker = lenient_invoker();

        reindex_help_books(&config, &mut invoker, &[book.clone()]).unwrap();
        let content = book.join("Contents/Resources/de.lproj");
        assert_eq!(
            invoker.runner().command_lines(),
            vec![
                hiutil_line(&content.join("search.helpindex"), &content, false),
                killall_line(),
            ]
        );
    }

    #[test]
    fn test_reindex_help_books_missing_book() {
        let tmpdir = tempfile::tempdir().unwrap();
        let config = Config::default().resolved_against(tmpdir.path());
        let mut invoker = lenient_invoker();

        let err = reindex_help_books(&config, &mut invoker, &[]).unwrap_err();
        assert!(matches!(err, Error::Scan { .. }), "unexpected error: {err}");
        assert!(invoker.runner().commands.is_empty());
    }

    #[test]
    fn test_kill_helpd_ignores_failures() {
        let config = Config::default();
        let runner = RecordingRunner::new().with_missing("killall");
        let mut invoker = Invoker::new(runner, ExitPolicy::FailFast);
        kill_helpd(&config, &mut invoker);

        let runner = RecordingRunner::new().with_status("killall", 1);
        let mut invoker = Invoker::new(runner, ExitPolicy::FailFast);
        kill_helpd(&config, &mut invoker);
        assert_eq!(invoker.runner().command_lines(), vec![killall_line()]);
    }
}
