// SPDX-License-Identifier: GPL-3.0-or-later

//! This module is responsible for the build transcript.
//!
//! A transcript is the captured standard output of a build tool dry run. It
//! can be produced by running the build tool (see `producer`), or an earlier
//! captured log can be replayed.
//!
//! The transcript is scanned once for every requested output granularity, and
//! every scan starts from the beginning of the file.

pub mod producer;
mod supervise;

use crate::flags::Aggregator;
use std::io::{BufRead, Seek};
use std::{fs, io, path};
use thiserror::Error;

pub use producer::{MakeDryRun, ProducerError, TranscriptProducer};
pub use supervise::{BuildStep, SuperviseError, Supervisor};

/// The location of the transcript file.
#[derive(Debug)]
enum Location {
    /// Captured by this process. The file is removed when dropped, unless it's kept.
    Captured(tempfile::TempPath),
    /// Given by the user.
    Replayed(path::PathBuf),
}

impl Location {
    fn path(&self) -> &path::Path {
        match self {
            Location::Captured(path) => path,
            Location::Replayed(path) => path,
        }
    }
}

/// Represents a build transcript that can be scanned multiple times.
#[derive(Debug)]
pub struct Transcript {
    file: fs::File,
    location: Location,
}

impl Transcript {
    /// Opens an existing build log to replay.
    pub fn open(path: &path::Path) -> Result<Self, ScanError> {
        let file = fs::File::open(path).map_err(|err| ScanError::Open(path.to_path_buf(), err))?;
        Ok(Self { file, location: Location::Replayed(path.to_path_buf()) })
    }

    /// Takes the ownership of a captured build output.
    pub fn captured(file: tempfile::NamedTempFile) -> Self {
        let (file, path) = file.into_parts();
        Self { file, location: Location::Captured(path) }
    }

    pub fn path(&self) -> &path::Path {
        self.location.path()
    }

    /// Feeds every line of the transcript to the aggregator.
    pub fn scan<A: Aggregator>(&mut self, aggregator: A) -> Result<A::Output, ScanError> {
        let path = self.location.path().to_path_buf();
        self.file.rewind().map_err(|err| ScanError::Read(path.clone(), err))?;

        let reader = io::BufReader::new(&mut self.file);
        scan_lines(reader, aggregator).map_err(|err| ScanError::Read(path, err))
    }

    /// Prevents the removal of a captured transcript, and returns its location.
    pub fn keep(self) -> Result<path::PathBuf, ScanError> {
        match self.location {
            Location::Captured(path) => {
                let location = path.to_path_buf();
                path.keep().map_err(|err| ScanError::Keep(location, err.error))
            }
            Location::Replayed(path) => Ok(path),
        }
    }
}

/// Reads the lines one by one and passes them to the aggregator.
///
/// Lines which are not valid UTF-8 are converted lossy, and line endings
/// are not part of the line.
fn scan_lines<A: Aggregator>(mut reader: impl BufRead, mut aggregator: A) -> io::Result<A::Output> {
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }
        if buffer.last() == Some(&b'\n') {
            buffer.pop();
            if buffer.last() == Some(&b'\r') {
                buffer.pop();
            }
        }
        aggregator.accept(&String::from_utf8_lossy(&buffer));
    }
    Ok(aggregator.finish())
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to open transcript {0}: {1}")]
    Open(path::PathBuf, io::Error),
    #[error("Failed to read transcript {0}: {1}")]
    Read(path::PathBuf, io::Error),
    #[error("Failed to keep transcript {0}: {1}")]
    Keep(path::PathBuf, io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{DatabaseAggregator, Flag, FlagSetAggregator};
    use std::io::{Cursor, Write};

    /// Collects the lines it was given.
    #[derive(Default)]
    struct Lines(Vec<String>);

    impl Aggregator for Lines {
        type Output = Vec<String>;

        fn accept(&mut self, line: &str) {
            self.0.push(line.to_string());
        }

        fn finish(self) -> Vec<String> {
            self.0
        }
    }

    #[test]
    fn test_line_endings_are_removed() {
        let input = Cursor::new(b"first\nsecond\r\n\nlast".to_vec());

        let lines = scan_lines(input, Lines::default()).unwrap();

        assert_eq!(lines, vec!["first", "second", "", "last"]);
    }

    #[test]
    fn test_invalid_utf8_is_converted() {
        let input = Cursor::new(b"gcc -DNAME=\xff main.c\n".to_vec());

        let lines = scan_lines(input, Lines::default()).unwrap();

        assert_eq!(lines, vec!["gcc -DNAME=\u{FFFD} main.c"]);
    }

    #[test]
    fn test_transcript_can_be_scanned_repeatedly() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "gcc -Wall -Iinc -c main.c -o main.o").unwrap();
        writeln!(file, "ar rcs libmain.a main.o").unwrap();

        let mut transcript = Transcript::captured(file);
        let flag_set = transcript.scan(FlagSetAggregator::new("/root", vec![])).unwrap();
        let database = transcript.scan(DatabaseAggregator::new("/root")).unwrap();

        assert_eq!(flag_set.flags, vec![Flag::bare("-I/root/inc"), Flag::bare("-Wall")]);
        assert_eq!(flag_set.statistics.total(), 2);
        assert_eq!(database.entries.len(), 1);
        assert_eq!(database.statistics.total(), 2);
    }

    #[test]
    fn test_captured_transcript_is_removed_unless_kept() {
        let removed = Transcript::captured(tempfile::NamedTempFile::new().unwrap());
        let removed_path = removed.path().to_path_buf();
        drop(removed);
        assert!(!removed_path.exists());

        let kept = Transcript::captured(tempfile::NamedTempFile::new().unwrap());
        let kept_path = kept.keep().unwrap();
        assert!(kept_path.exists());
        fs::remove_file(kept_path).unwrap();
    }

    #[test]
    fn test_replayed_transcript() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("build.log");
        fs::write(&path, "gcc -DFOO=1 -c a.c\n").unwrap();

        let mut transcript = Transcript::open(&path).unwrap();
        let flag_set = transcript.scan(FlagSetAggregator::new("/root", vec![])).unwrap();

        assert_eq!(flag_set.flags, vec![Flag::bare("-DFOO=1")]);
        assert_eq!(transcript.keep().unwrap(), path);
    }

    #[test]
    fn test_missing_transcript() {
        let result = Transcript::open(path::Path::new("/nonexistent/build.log"));

        assert!(matches!(result, Err(ScanError::Open(_, _))));
    }
}
