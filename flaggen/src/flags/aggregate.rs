// SPDX-License-Identifier: GPL-3.0-or-later

//! Folds the accepted flags of every transcript line into the scan result.
//!
//! There are two aggregators, one for each output granularity:
//!
//! - `FlagSetAggregator` produces one flat, deduplicated and sorted flag list
//!   for the whole transcript. Macro definitions and word-size flags are
//!   collected during the scan and resolved only at the end.
//! - `DatabaseAggregator` produces one compilation database entry for each
//!   compiler invocation which compiles a recognizable source file.

use super::classifier::{self, Classification};
use super::filter::{Accepted, Filter};
use super::{patterns, tokenizer, Flag, ScanStatistics, Variant};
use crate::output::clang::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Consumes transcript lines one by one, and produces the result at the end.
pub trait Aggregator {
    type Output;

    /// Processes a single transcript line.
    fn accept(&mut self, line: &str);

    /// Resolves the collected state into the result.
    fn finish(self) -> Self::Output;
}

/// A macro whose definitions were not consistent over the transcript.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MacroConflict {
    pub name: String,
    pub definitions: usize,
    pub chosen: String,
}

/// The result of the flag set scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlagSet {
    /// Language flags first, the rest sorted.
    pub flags: Vec<Flag>,
    /// Macros which had more than one distinct value.
    pub conflicts: Vec<MacroConflict>,
    pub statistics: ScanStatistics,
}

/// Distinct values of every macro definition, in the order they were seen.
#[derive(Clone, Debug, Default)]
struct MacroDefinitions {
    values: BTreeMap<String, Vec<String>>,
}

impl MacroDefinitions {
    fn record(&mut self, name: String, value: String) {
        let values = self.values.entry(name).or_default();
        if !values.contains(&value) {
            values.push(value);
        }
    }

    /// Picks one value for every macro.
    ///
    /// When a macro has multiple values, the values are sorted and the last
    /// one is chosen. This makes the result reproducible, even if the order of
    /// the build commands is not.
    fn resolve(self) -> (Vec<Flag>, Vec<MacroConflict>) {
        let mut flags = Vec::with_capacity(self.values.len());
        let mut conflicts = Vec::new();

        for (name, mut values) in self.values {
            values.sort();
            let Some(chosen) = values.last() else {
                continue;
            };
            flags.push(Flag::bare(format!("-D{name}={chosen}")));
            if values.len() > 1 {
                log::warn!("{} distinct definitions of macro {} found", values.len(), name);
                conflicts.push(MacroConflict { name: name.clone(), definitions: values.len(), chosen: chosen.clone() });
            }
        }

        (flags, conflicts)
    }
}

/// Collects the flags of the whole transcript into a single set.
pub struct FlagSetAggregator {
    filter: Filter,
    language: Vec<Flag>,
    flags: BTreeSet<Flag>,
    macros: MacroDefinitions,
    statistics: ScanStatistics,
}

impl FlagSetAggregator {
    /// Creates the aggregator.
    ///
    /// The `language` flags are put in front of the result as they are.
    pub fn new(prefix: impl Into<PathBuf>, language: Vec<Flag>) -> Self {
        Self {
            filter: Filter::new(prefix, Variant::FlagSet),
            language,
            flags: BTreeSet::new(),
            macros: MacroDefinitions::default(),
            statistics: ScanStatistics::default(),
        }
    }
}

impl Aggregator for FlagSetAggregator {
    type Output = FlagSet;

    fn accept(&mut self, line: &str) {
        if classifier::classify(line) == Classification::Skipped {
            self.statistics.skipped += 1;
            return;
        }
        self.statistics.qualifying += 1;

        let tokens = tokenizer::split(line);
        for accepted in self.filter.apply(&tokens) {
            match accepted {
                Accepted::Flag(flag) => {
                    self.flags.insert(flag);
                }
                Accepted::Macro { name, value } => self.macros.record(name, value),
            }
        }
    }

    fn finish(self) -> FlagSet {
        let mut flags = self.flags;
        reduce_word_sizes(&mut flags);

        let (macros, conflicts) = self.macros.resolve();
        flags.extend(macros);

        let mut result = self.language;
        result.extend(flags);

        FlagSet { flags: result, conflicts, statistics: self.statistics }
    }
}

/// Keeps only the largest word-size flag.
///
/// A project might compile different translation units for different word
/// sizes, but the editor configuration can only use one of them. Word sizes
/// which are not a valid number are dropped.
fn reduce_word_sizes(flags: &mut BTreeSet<Flag>) {
    let word_sizes: Vec<Flag> =
        flags.iter().filter(|flag| matches!(flag, Flag::Bare(flag) if patterns::is_word_size(flag))).cloned().collect();
    for flag in &word_sizes {
        flags.remove(flag);
    }

    let largest = word_sizes
        .into_iter()
        .filter_map(|flag| {
            let Flag::Bare(token) = &flag else {
                return None;
            };
            match patterns::word_size(token) {
                Some(width) => Some((width, flag)),
                None => {
                    log::warn!("Word size flag is not recognized: {token}");
                    None
                }
            }
        })
        .max_by_key(|(width, _)| *width);

    if let Some((_, flag)) = largest {
        flags.insert(flag);
    }
}

/// The result of the compilation database scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Database {
    /// Entries in transcript order.
    pub entries: Vec<Entry>,
    pub statistics: ScanStatistics,
}

/// Collects one compilation database entry for each compiler invocation.
pub struct DatabaseAggregator {
    filter: Filter,
    entries: Vec<Entry>,
    statistics: ScanStatistics,
}

impl DatabaseAggregator {
    /// Creates the aggregator.
    ///
    /// The `prefix` is the root path for resolving relative paths, and is
    /// also used as the working directory of every entry.
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            filter: Filter::new(prefix, Variant::Database),
            entries: Vec::new(),
            statistics: ScanStatistics::default(),
        }
    }

    fn entry(&self, line: &str) -> Option<Entry> {
        if classifier::classify(line) == Classification::Skipped {
            return None;
        }

        let tokens = tokenizer::split(line);
        let Some(family) = classifier::compiler_family(&tokens) else {
            log::trace!("Not a compiler call: {line}");
            return None;
        };
        let Some(file) = classifier::source_file(&tokens) else {
            log::debug!("No source file found in {family} compiler call: {line}");
            return None;
        };

        let mut arguments = vec![family.compiler_name().to_string()];
        for accepted in self.filter.apply(&tokens) {
            if let Accepted::Flag(flag) = accepted {
                arguments.extend(flag.as_arguments().into_iter().map(String::from));
            }
        }

        Some(Entry::new(file, arguments, self.filter.prefix()))
    }
}

impl Aggregator for DatabaseAggregator {
    type Output = Database;

    fn accept(&mut self, line: &str) {
        match self.entry(line) {
            Some(entry) => {
                self.statistics.qualifying += 1;
                self.entries.push(entry);
            }
            None => self.statistics.skipped += 1,
        }
    }

    fn finish(self) -> Database {
        Database { entries: self.entries, statistics: self.statistics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn language() -> Vec<Flag> {
        vec![Flag::bare("-x"), Flag::bare("c++"), Flag::bare("-std=c++11")]
    }

    fn scan<A: Aggregator>(mut aggregator: A, lines: &[&str]) -> A::Output {
        for line in lines {
            aggregator.accept(line);
        }
        aggregator.finish()
    }

    #[test]
    fn test_flag_set_language_flags_come_first() {
        let result = scan(FlagSetAggregator::new("/root", language()), &["gcc -Wall -Iinc -c main.c"]);

        assert_eq!(
            result.flags,
            vec![
                Flag::bare("-x"),
                Flag::bare("c++"),
                Flag::bare("-std=c++11"),
                Flag::bare("-I/root/inc"),
                Flag::bare("-Wall"),
            ]
        );
    }

    #[test]
    fn test_flag_set_is_deduplicated_and_sorted() {
        let result = scan(
            FlagSetAggregator::new("/root", vec![]),
            &["gcc -Wextra -Wall -I b -c b.c", "gcc -Wall -I a -Wextra -c a.c", "gcc -I b -Wall -c c.c"],
        );

        assert_eq!(
            result.flags,
            vec![
                Flag::bare("-Wall"),
                Flag::bare("-Wextra"),
                Flag::with_path("-I", "/root/a"),
                Flag::with_path("-I", "/root/b"),
            ]
        );
    }

    #[test]
    fn test_macro_resolution_picks_last_sorted_value() {
        let result = scan(FlagSetAggregator::new("/root", vec![]), &["gcc -DX=foo -c a.c", "gcc -DX=bar -c b.c"]);

        assert_eq!(result.flags, vec![Flag::bare("-DX=foo")]);
        assert_eq!(result.conflicts, vec![MacroConflict { name: "X".into(), definitions: 2, chosen: "foo".into() }]);
    }

    #[test]
    fn test_macro_resolution_is_independent_of_order() {
        let forward = scan(FlagSetAggregator::new("/root", vec![]), &["gcc -DX=bar -c a.c", "gcc -DX=foo -c b.c"]);
        let backward = scan(FlagSetAggregator::new("/root", vec![]), &["gcc -DX=foo -c a.c", "gcc -DX=bar -c b.c"]);

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_repeated_macro_value_is_not_a_conflict() {
        let result = scan(
            FlagSetAggregator::new("/root", vec![]),
            &["gcc -DX=1 -DY=2 -c a.c", "gcc -DX=1 -c b.c", "gcc -DNDEBUG -c c.c"],
        );

        assert_eq!(result.flags, vec![Flag::bare("-DNDEBUG"), Flag::bare("-DX=1"), Flag::bare("-DY=2")]);
        assert!(result.conflicts.is_empty());
    }

    #[test]
    fn test_word_size_keeps_the_largest() {
        let result = scan(
            FlagSetAggregator::new("/root", vec![]),
            &["gcc -m32 -c a.c", "gcc -m64 -c b.c", "gcc -m8 -c c.c", "gcc -m128 -c d.c"],
        );

        assert_eq!(result.flags, vec![Flag::bare("-m128")]);
    }

    #[test]
    fn test_word_size_pair() {
        let result = scan(FlagSetAggregator::new("/root", vec![]), &["gcc -m32 -c a.c", "gcc -m64 -c b.c"]);

        assert_eq!(result.flags, vec![Flag::bare("-m64")]);
    }

    #[test]
    fn test_malformed_word_size_is_dropped() {
        let result = scan(FlagSetAggregator::new("/root", vec![]), &["gcc -m99999999999999999999 -m32 -c a.c"]);

        assert_eq!(result.flags, vec![Flag::bare("-m32")]);
    }

    #[test]
    fn test_skipped_line_does_not_contribute() {
        let result =
            scan(FlagSetAggregator::new("/root", vec![]), &["cc1 -Wall -DFOO=1 -Iinclude -o tmp.tmp file.c"]);

        assert!(result.flags.is_empty());
        assert_eq!(result.statistics, ScanStatistics { qualifying: 0, skipped: 1 });
    }

    #[test]
    fn test_database_entry() {
        let result = scan(DatabaseAggregator::new("/root"), &["gcc -Iinc main.c -o main.o"]);

        assert_eq!(
            result.entries,
            vec![Entry::new("main.c", vec!["cc".to_string(), "-I/root/inc".to_string()], "/root")]
        );
        assert_eq!(result.statistics, ScanStatistics { qualifying: 1, skipped: 0 });
    }

    #[test]
    fn test_database_entries_keep_transcript_order_and_arguments() {
        let result = scan(
            DatabaseAggregator::new("/root"),
            &[
                "g++ -DFOO=1 -I include -Wall -c b.cpp -o b.o",
                "ar rcs liba.a a.o",
                "gcc -DFOO=2 -m32 -c a.c",
                "gcc -o main main.o",
                "gcc -x assembler -c start.c",
            ],
        );

        assert_eq!(
            result.entries,
            vec![
                Entry::new(
                    "b.cpp",
                    vec!["c++", "-DFOO=1", "-I", "/root/include", "-Wall"].into_iter().map(String::from).collect(),
                    "/root"
                ),
                Entry::new("a.c", vec!["cc".to_string(), "-DFOO=2".to_string()], "/root"),
            ]
        );
        assert_eq!(result.statistics, ScanStatistics { qualifying: 2, skipped: 3 });
    }

    proptest! {
        #[test]
        fn test_every_line_is_accounted_for(
            lines in prop::collection::vec(
                prop_oneof![
                    Just("gcc -Wall -Iinc -c main.c".to_string()),
                    Just("gcc -c x.c -o /dev/null".to_string()),
                    Just("cc1 -o a.tmp file.c".to_string()),
                    Just("echo done".to_string()),
                    Just(String::new()),
                    "[ -~]{0,30}",
                ],
                0..30,
            )
        ) {
            let mut flag_set = FlagSetAggregator::new("/root", vec![]);
            let mut database = DatabaseAggregator::new("/root");
            for line in &lines {
                flag_set.accept(line);
                database.accept(line);
            }

            prop_assert_eq!(flag_set.finish().statistics.total(), lines.len());
            prop_assert_eq!(database.finish().statistics.total(), lines.len());
        }
    }
}
