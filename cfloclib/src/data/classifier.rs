//! Line classifier for ColdFusion sources.
//!
//! Every line of a file ends up in exactly one bucket:
//!
//! - **comment**: opens, continues or closes a `<!-- ... -->` span
//! - **blank**: whitespace only, outside any comment
//! - **code**: everything else (the residual)
//!
//! The scan is a two-state machine driven only by the presence of the
//! open (`<!--`) and close (`-->`) markers on each line. It is not a lexer:
//! a marker inside a string literal still opens a comment, and code sharing
//! a line with a marker is counted as comment. Both are accepted
//! imprecisions of a line-oriented counter.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::CflocError;
use crate::Result;

use super::stats::LineCounts;

/// Opens a (possibly multi-line) comment.
pub const COMMENT_OPEN: &str = "<!--";
/// Closes a comment opened by [`COMMENT_OPEN`].
pub const COMMENT_CLOSE: &str = "-->";

/// Where the scanner is relative to comment spans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum ScanState {
    #[default]
    Normal,
    InBlockComment,
}

/// Bucket a single line falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Comment,
    Blank,
    Code,
}

impl ScanState {
    /// Classify one line and return the state for the next one.
    fn step(self, line: &str) -> (LineKind, ScanState) {
        match self {
            ScanState::Normal if line.contains(COMMENT_OPEN) => {
                if line.contains(COMMENT_CLOSE) {
                    (LineKind::Comment, ScanState::Normal)
                } else {
                    (LineKind::Comment, ScanState::InBlockComment)
                }
            }
            ScanState::InBlockComment => {
                if line.contains(COMMENT_CLOSE) {
                    (LineKind::Comment, ScanState::Normal)
                } else {
                    (LineKind::Comment, ScanState::InBlockComment)
                }
            }
            ScanState::Normal if line.trim().is_empty() => (LineKind::Blank, ScanState::Normal),
            ScanState::Normal => (LineKind::Code, ScanState::Normal),
        }
    }
}

/// Running totals for one scan.
#[derive(Debug, Default)]
struct Tally {
    state: ScanState,
    total: u64,
    comments: u64,
    blanks: u64,
}

impl Tally {
    fn push(&mut self, line: &str) {
        let (kind, next) = self.state.step(line);
        self.state = next;
        self.total += 1;
        match kind {
            LineKind::Comment => self.comments += 1,
            LineKind::Blank => self.blanks += 1,
            LineKind::Code => {}
        }
    }

    fn finish(self) -> LineCounts {
        // An unclosed comment simply runs to the end of input.
        LineCounts::new(self.total, self.comments, self.blanks)
    }
}

/// Strip a trailing `\n` or `\r\n` from a raw line.
fn strip_line_ending(mut line: &[u8]) -> &[u8] {
    if let Some(rest) = line.strip_suffix(b"\n") {
        line = rest;
        if let Some(rest) = line.strip_suffix(b"\r") {
            line = rest;
        }
    }
    line
}

/// Classify every line read from `reader`.
///
/// Lines are read strictly in order. Invalid UTF-8 is decoded lossily, so
/// the only possible failure is an I/O error from the reader itself.
pub fn classify<R: BufRead>(mut reader: R) -> std::io::Result<LineCounts> {
    let mut tally = Tally::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(strip_line_ending(&buf));
        tally.push(&line);
    }

    Ok(tally.finish())
}

/// Classify an in-memory source string.
///
/// This is useful for testing without actual files.
pub fn classify_str(source: &str) -> LineCounts {
    let mut tally = Tally::default();
    for line in source.lines() {
        tally.push(line);
    }
    tally.finish()
}

/// Open and classify the file at `path`.
pub fn classify_path(path: impl AsRef<Path>) -> Result<LineCounts> {
    let path = path.as_ref();
    let file_read = |source| CflocError::FileRead {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(file_read)?;
    classify(BufReader::new(file)).map_err(file_read)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::{self, Cursor, Read};
    use tempfile::tempdir;

    fn lines(src: &[&str]) -> LineCounts {
        classify_str(&src.join("\n"))
    }

    fn assert_invariant(c: &LineCounts) {
        assert_eq!(
            c.total_lines(),
            c.comment_lines() + c.blank_lines() + c.code_lines()
        );
    }

    #[test]
    fn single_line_comment() {
        let c = lines(&["<!--comment-->"]);

        assert_eq!(c.comment_lines(), 1);
        assert_eq!(c.blank_lines(), 0);
        assert_eq!(c.code_lines(), 0);
        assert_eq!(c.total_lines(), 1);
    }

    #[test]
    fn multiline_comment() {
        let c = lines(&["<!--", "still comment", "-->"]);

        assert_eq!(c.comment_lines(), 3);
        assert_eq!(c.total_lines(), 3);
        assert_eq!(c.code_lines(), 0);
    }

    #[test]
    fn blank_lines_inside_comment_are_comments() {
        let c = lines(&["<!---", "", "   ", "--->", "", "x"]);

        assert_eq!(c.comment_lines(), 4);
        assert_eq!(c.blank_lines(), 1);
        assert_eq!(c.code_lines(), 1);
        assert_eq!(c.total_lines(), 6);
    }

    #[test]
    fn whitespace_only_is_blank() {
        let c = lines(&["   "]);

        assert_eq!(c.blank_lines(), 1);
        assert_eq!(c.code_lines(), 0);
        assert_eq!(c.total_lines(), 1);
    }

    #[test]
    fn tabs_are_blank() {
        let c = classify_str("\t\t\n");
        assert_eq!(c.blank_lines(), 1);
    }

    #[test]
    fn mixed_file() {
        let c = lines(&["code1", "<!--c-->", "", "code2"]);

        assert_eq!(c.total_lines(), 4);
        assert_eq!(c.comment_lines(), 1);
        assert_eq!(c.blank_lines(), 1);
        assert_eq!(c.code_lines(), 2);
        assert_invariant(&c);
    }

    #[test]
    fn code_resumes_after_block_comment() {
        let c = lines(&[
            "<cfset a = 1>",
            "",
            "<!--- explain",
            "   the next part",
            "--->",
            "<cfoutput>#a#</cfoutput>",
        ]);

        assert_eq!(c.total_lines(), 6);
        assert_eq!(c.comment_lines(), 3);
        assert_eq!(c.blank_lines(), 1);
        assert_eq!(c.code_lines(), 2);
    }

    #[test]
    fn unterminated_comment_runs_to_end() {
        let c = lines(&["code", "<!--", "never closed", "", "more"]);

        assert_eq!(c.total_lines(), 5);
        assert_eq!(c.comment_lines(), 4);
        assert_eq!(c.blank_lines(), 0);
        assert_eq!(c.code_lines(), 1);
    }

    #[test]
    fn unterminated_comment_on_last_line() {
        let c = lines(&["code", "<!--"]);

        assert_eq!(c.total_lines(), 2);
        assert_eq!(c.comment_lines(), 1);
        assert_eq!(c.code_lines(), 1);
    }

    #[test]
    fn close_marker_without_open_is_code() {
        let c = lines(&["a --> b"]);
        assert_eq!(c.code_lines(), 1);
        assert_eq!(c.comment_lines(), 0);
    }

    #[test]
    fn open_marker_in_string_still_opens_comment() {
        let c = lines(&["<cfset s = \"<!--\">", "<cfset t = 1>", "-->"]);

        assert_eq!(c.comment_lines(), 3);
        assert_eq!(c.code_lines(), 0);
    }

    #[test]
    fn second_comment_on_following_line() {
        let c = lines(&["<!-- a -->", "<!-- b", "-->", "x"]);

        assert_eq!(c.comment_lines(), 3);
        assert_eq!(c.code_lines(), 1);
    }

    #[test]
    fn empty_input() {
        let c = classify_str("");
        assert!(c.is_empty());
        assert_invariant(&c);
    }

    #[test]
    fn reader_matches_str() {
        let src = "a\r\n<!--\r\n\r\n-->\r\n\r\nb";
        let from_reader = classify(Cursor::new(src)).unwrap();

        assert_eq!(from_reader, classify_str(src));
        assert_eq!(from_reader.total_lines(), 6);
        assert_eq!(from_reader.comment_lines(), 3);
        assert_eq!(from_reader.blank_lines(), 1);
    }

    #[test]
    fn trailing_newline_does_not_add_line() {
        let c = classify(Cursor::new("a\nb\n")).unwrap();
        assert_eq!(c.total_lines(), 2);
    }

    #[test]
    fn invalid_utf8_is_tolerated() {
        let bytes: &[u8] = b"\xff\xfe code\n<!-- \xc3 -->\n";
        let c = classify(Cursor::new(bytes)).unwrap();

        assert_eq!(c.total_lines(), 2);
        assert_eq!(c.comment_lines(), 1);
        assert_eq!(c.code_lines(), 1);
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn read_error_is_reported() {
        let result = classify(BufReader::new(FailingReader));
        assert!(result.is_err());
    }

    #[test]
    fn classify_path_reads_file() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("index.cfm");
        fs::write(&file, "<!--- header --->\n\n<cfoutput>hi</cfoutput>\n").unwrap();

        let c = classify_path(&file).unwrap();

        assert_eq!(c.total_lines(), 3);
        assert_eq!(c.comment_lines(), 1);
        assert_eq!(c.blank_lines(), 1);
        assert_eq!(c.code_lines(), 1);
    }

    #[test]
    fn classify_path_missing_file() {
        let result = classify_path("/nonexistent/missing.cfm");

        match result {
            Err(CflocError::FileRead { path, .. }) => {
                assert!(path.ends_with("missing.cfm"));
            }
            other => panic!("Expected FileRead error, got {other:?}"),
        }
    }
}
