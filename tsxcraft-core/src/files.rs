//! # Virtual File Store
//!
//! In-memory stand-in for the project's component files during one session.
//! Paths are opaque keys (no normalization); a missing key means the file
//! does not exist. Writes replace the whole file, reads are paginated views
//! over its lines.

use crate::error::{self, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Default number of lines returned by a read
pub const DEFAULT_READ_LIMIT: usize = 2000;

/// Lines longer than this are cut before numbering
pub const MAX_LINE_CHARS: usize = 2000;

/// Notice returned for a file that exists but has no content
pub const EMPTY_FILE_NOTICE: &str = "System reminder: TSX file exists but has empty contents";

/// Result of a successful read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileView {
    /// The file exists but is the empty string
    Empty,
    /// A window of lines; `first_line` is 1-based
    Lines { first_line: usize, lines: Vec<String> },
}

impl FileView {
    /// Number of lines in the view
    pub fn line_count(&self) -> usize {
        match self {
            FileView::Empty => 0,
            FileView::Lines { lines, .. } => lines.len(),
        }
    }
}

impl fmt::Display for FileView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileView::Empty => f.write_str(EMPTY_FILE_NOTICE),
            FileView::Lines { first_line, lines } => {
                for (i, line) in lines.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "{:>6}\t{}", first_line + i, line)?;
                }
                Ok(())
            }
        }
    }
}

/// Mapping from file path to full text content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VirtualFs {
    files: BTreeMap<String, String>,
}

impl VirtualFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Raw content of a file
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(|s| s.as_str())
    }

    /// All paths, sorted
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(|s| s.as_str())
    }

    /// All (path, content) pairs, sorted by path
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    /// Read a window of numbered lines.
    ///
    /// `offset` is 0-based, `limit` must be positive. Each returned line is
    /// cut to [`MAX_LINE_CHARS`] characters.
    pub fn read(&self, path: &str, offset: usize, limit: usize) -> Result<FileView> {
        if limit == 0 {
            return Err(error::invalid_argument("limit must be greater than zero")
                .with_operation("files::read")
                .with_context("path", path));
        }

        let content = self
            .files
            .get(path)
            .ok_or_else(|| error::file_not_found(path).with_operation("files::read"))?;

        if content.is_empty() {
            return Ok(FileView::Empty);
        }

        let all = split_lines(content);
        if offset >= all.len() {
            return Err(error::offset_out_of_range(offset, all.len())
                .with_operation("files::read")
                .with_context("path", path));
        }

        let end = offset.saturating_add(limit).min(all.len());
        let lines = all[offset..end]
            .iter()
            .map(|line| truncate_chars(line, MAX_LINE_CHARS))
            .collect();

        Ok(FileView::Lines {
            first_line: offset + 1,
            lines,
        })
    }

    /// Create or fully replace a file. Returns the acknowledgement shown to the model.
    pub fn write(&mut self, path: impl Into<String>, content: impl Into<String>) -> String {
        let path = path.into();
        let ack = format!("Updated TSX file {}", path);
        self.files.insert(path, content.into());
        ack
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VirtualFs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Split on `\r\n` and every single-char boundary in [`is_line_break`].
/// A trailing terminator does not start a new line.
fn split_lines(content: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = content.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&content[start..i]);
        start = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(j, '\n')) = chars.peek() {
                chars.next();
                start = j + 1;
            }
        }
    }

    if start < content.len() {
        lines.push(&content[start..]);
    }

    lines
}

/// Vertical tab, form feed, the file/group/record separators, NEL and
/// U+2028/U+2029 end a line too.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn truncate_chars(line: &str, max: usize) -> String {
    match line.char_indices().nth(max) {
        Some((idx, _)) => line[..idx].to_string(),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const CARD: &str = "export function Card() {\n  return <div className=\"p-4\" />;\n}\n";

    #[test]
    fn test_read_after_write() {
        let mut fs = VirtualFs::new();
        fs.write("components/Card.tsx", CARD);

        let view = fs.read("components/Card.tsx", 0, 3).unwrap();
        assert_eq!(view.line_count(), 3);
        assert_eq!(
            view.to_string(),
            "     1\texport function Card() {\n     2\t  return <div className=\"p-4\" />;\n     3\t}"
        );
    }

    #[test]
    fn test_not_found_for_any_window() {
        let fs = VirtualFs::new();
        for (offset, limit) in [(0, 1), (5, 2000), (usize::MAX, usize::MAX)] {
            let err = fs.read("missing.tsx", offset, limit).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::FileNotFound);
            assert_eq!(err.message(), "TSX file 'missing.tsx' not found");
        }
    }

    #[test]
    fn test_empty_file_sentinel() {
        let mut fs = VirtualFs::new();
        fs.write("Empty.tsx", "");

        let view = fs.read("Empty.tsx", 0, DEFAULT_READ_LIMIT).unwrap();
        assert_eq!(view, FileView::Empty);
        assert_eq!(view.to_string(), EMPTY_FILE_NOTICE);
    }

    #[test]
    fn test_offset_boundary() {
        let mut fs = VirtualFs::new();
        fs.write("a.tsx", "one\ntwo\nthree");

        let err = fs.read("a.tsx", 3, 10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OffsetOutOfRange);
        assert_eq!(err.message(), "Line offset 3 exceeds file length (3 lines)");

        let view = fs.read("a.tsx", 2, 10).unwrap();
        assert_eq!(view.to_string(), "     3\tthree");
    }

    #[test]
    fn test_limit_window() {
        let mut fs = VirtualFs::new();
        let content: String = (1..=10).map(|i| format!("line {}\n", i)).collect();
        fs.write("long.tsx", content);

        let view = fs.read("long.tsx", 4, 3).unwrap();
        assert_eq!(
            view,
            FileView::Lines {
                first_line: 5,
                lines: vec!["line 5".into(), "line 6".into(), "line 7".into()],
            }
        );
    }

    #[test]
    fn test_zero_limit_rejected() {
        let mut fs = VirtualFs::new();
        fs.write("a.tsx", "x");
        let err = fs.read("a.tsx", 0, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_long_line_truncated() {
        let mut fs = VirtualFs::new();
        let long = "é".repeat(MAX_LINE_CHARS + 500);
        fs.write("wide.tsx", format!("{}\nshort", long));

        match fs.read("wide.tsx", 0, 1).unwrap() {
            FileView::Lines { lines, .. } => {
                assert_eq!(lines.len(), 1);
                assert_eq!(lines[0].chars().count(), MAX_LINE_CHARS);
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[test]
    fn test_overwrite_replaces_whole_file() {
        let mut fs = VirtualFs::new();
        fs.write("a.tsx", "first\nsecond\nthird");
        let ack = fs.write("a.tsx", "only");

        assert_eq!(ack, "Updated TSX file a.tsx");
        assert_eq!(fs.get("a.tsx"), Some("only"));
        assert!(fs.read("a.tsx", 1, 10).is_err());
    }

    #[test]
    fn test_idempotent_overwrite() {
        let mut fs = VirtualFs::new();
        fs.write("a.tsx", CARD);
        let before = fs.read("a.tsx", 0, DEFAULT_READ_LIMIT).unwrap();
        fs.write("a.tsx", CARD);
        let after = fs.read("a.tsx", 0, DEFAULT_READ_LIMIT).unwrap();
        assert_eq!(before, after);
        assert_eq!(fs.len(), 1);
    }

    #[test]
    fn test_paths_are_opaque() {
        let mut fs = VirtualFs::new();
        fs.write("./a.tsx", "x");
        assert!(!fs.contains("a.tsx"));
        assert!(fs.contains("./a.tsx"));
    }

    #[test]
    fn test_split_lines_terminators() {
        assert_eq!(split_lines("a\r\nb\rc\n"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("\n"), vec![""]);
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_split_lines_unicode_separators() {
        assert_eq!(
            split_lines("a\x0cb\u{2028}c\u{85}d\x1ee\x0b"),
            vec!["a", "b", "c", "d", "e"]
        );
        assert_eq!(split_lines("x\u{2029}"), vec!["x"]);
    }

    #[test]
    fn test_form_feed_counts_as_line() {
        let mut fs = VirtualFs::new();
        fs.write("ff.tsx", "one\x0ctwo");

        let err = fs.read("ff.tsx", 2, 10).unwrap_err();
        assert_eq!(err.message(), "Line offset 2 exceeds file length (2 lines)");
        assert_eq!(fs.read("ff.tsx", 1, 10).unwrap().to_string(), "     2\ttwo");
    }
}
