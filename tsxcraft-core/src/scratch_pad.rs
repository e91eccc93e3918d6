//! # Scratch Pad
//!
//! The diff ledger handed from the analysing agent to the applying agent.
//! Each entry is keyed by file path and carries a rationale plus optional
//! before/after snippets. The ledger only stores text: it never computes or
//! applies diffs itself.

use crate::files::VirtualFs;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Returned by `read` when nothing has been recorded
pub const EMPTY_SCRATCH_PAD: &str = "Scratch pad is empty. No diffs recorded yet.";

const HEAVY_RULE_WIDTH: usize = 50;

/// One proposed change for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub path: String,
    /// Free-form description of the change; rendered verbatim
    pub rationale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl DiffEntry {
    /// An entry carrying only a note
    pub fn note(path: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            rationale: note.into(),
            before: None,
            after: None,
        }
    }

    pub fn with_snippets(mut self, before: impl Into<String>, after: impl Into<String>) -> Self {
        self.before = Some(before.into());
        self.after = Some(after.into());
        self
    }

    /// Build an entry from the shape accepted by the `write_scratch_pad` tool
    pub fn from_input(path: impl Into<String>, input: DiffInput) -> Self {
        match input {
            DiffInput::Note(note) => Self::note(path, note),
            DiffInput::Structured {
                rationale,
                before,
                after,
            } => Self {
                path: path.into(),
                rationale,
                before,
                after,
            },
        }
    }

    fn render(&self) -> String {
        let mut out = self.rationale.clone();
        if let Some(before) = &self.before {
            out.push_str("\n\nBefore:\n");
            out.push_str(before);
        }
        if let Some(after) = &self.after {
            out.push_str("\n\nAfter:\n");
            out.push_str(after);
        }
        out
    }
}

/// Tool-side value for one ledger key: either a plain note or a structured diff
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DiffInput {
    Note(String),
    Structured {
        #[serde(alias = "note", alias = "description")]
        rationale: String,
        #[serde(default)]
        before: Option<String>,
        #[serde(default)]
        after: Option<String>,
    },
}

/// How a write combines with the current ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// The supplied entries become the whole ledger
    #[default]
    Replace,
    /// Supplied entries are upserted; others are kept
    Merge,
}

/// Outcome of checking one entry against the file store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffCheck {
    BeforeFound { path: String },
    BeforeMissing { path: String },
    NoSnippet { path: String },
    FileMissing { path: String },
}

impl DiffCheck {
    pub fn path(&self) -> &str {
        match self {
            DiffCheck::BeforeFound { path }
            | DiffCheck::BeforeMissing { path }
            | DiffCheck::NoSnippet { path }
            | DiffCheck::FileMissing { path } => path,
        }
    }

    /// Whether the entry can be applied as recorded
    pub fn is_applicable(&self) -> bool {
        matches!(self, DiffCheck::BeforeFound { .. } | DiffCheck::NoSnippet { .. })
    }
}

impl fmt::Display for DiffCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffCheck::BeforeFound { path } => {
                write!(f, "{}: before snippet matches current content", path)
            }
            DiffCheck::BeforeMissing { path } => write!(
                f,
                "{}: before snippet NOT found in current content; re-read the file",
                path
            ),
            DiffCheck::NoSnippet { path } => {
                write!(f, "{}: no before snippet recorded; verify manually", path)
            }
            DiffCheck::FileMissing { path } => {
                write!(f, "{}: file does not exist in the virtual file store", path)
            }
        }
    }
}

/// Ordered path -> diff ledger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScratchPad {
    entries: Vec<DiffEntry>,
}

impl ScratchPad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&DiffEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }

    /// Replace the whole ledger. A path repeated in `entries` keeps its last value.
    pub fn write(&mut self, entries: impl IntoIterator<Item = DiffEntry>) -> String {
        let mut fresh = ScratchPad::new();
        let count = fresh.upsert_all(entries);
        *self = fresh;
        ack(count)
    }

    /// Upsert entries, keeping anything not mentioned
    pub fn merge(&mut self, entries: impl IntoIterator<Item = DiffEntry>) -> String {
        let count = self.upsert_all(entries);
        ack(count)
    }

    /// Write with an explicit mode
    pub fn write_with_mode(
        &mut self,
        entries: impl IntoIterator<Item = DiffEntry>,
        mode: WriteMode,
    ) -> String {
        match mode {
            WriteMode::Replace => self.write(entries),
            WriteMode::Merge => self.merge(entries),
        }
    }

    fn upsert_all(&mut self, entries: impl IntoIterator<Item = DiffEntry>) -> usize {
        let mut touched: Vec<String> = Vec::new();
        for entry in entries {
            if !touched.contains(&entry.path) {
                touched.push(entry.path.clone());
            }
            match self.entries.iter_mut().find(|e| e.path == entry.path) {
                Some(existing) => *existing = entry,
                None => self.entries.push(entry),
            }
        }
        touched.len()
    }

    /// Render the full ledger for the model
    pub fn read(&self) -> String {
        if self.entries.is_empty() {
            return EMPTY_SCRATCH_PAD.to_string();
        }

        let mut out = String::from("Current Scratch Pad:\n");
        out.push_str(&"=".repeat(HEAVY_RULE_WIDTH));
        out.push('\n');
        for (i, entry) in self.entries.iter().enumerate() {
            out.push_str(&format!("\n{}. {}\n", i + 1, entry.path));
            out.push_str(&"-".repeat(HEAVY_RULE_WIDTH));
            out.push('\n');
            out.push_str(&entry.render());
            out.push('\n');
        }

        out.trim_end().to_string()
    }

    /// Check each entry's `before` snippet against the current file content
    pub fn verify(&self, files: &VirtualFs) -> Vec<DiffCheck> {
        self.entries
            .iter()
            .map(|entry| {
                let path = entry.path.clone();
                // a blank snippet anchors nothing
                let before = entry.before.as_deref().filter(|b| !b.trim().is_empty());
                match (files.get(&entry.path), before) {
                    (None, _) => DiffCheck::FileMissing { path },
                    (Some(_), None) => DiffCheck::NoSnippet { path },
                    (Some(content), Some(before)) if content.contains(before) => {
                        DiffCheck::BeforeFound { path }
                    }
                    (Some(_), Some(_)) => DiffCheck::BeforeMissing { path },
                }
            })
            .collect()
    }

    /// Render `verify` as a report for the model
    pub fn verification_report(&self, files: &VirtualFs) -> String {
        if self.entries.is_empty() {
            return "Scratch pad is empty. Nothing to verify.".to_string();
        }

        let checks = self.verify(files);
        let applicable = checks.iter().filter(|c| c.is_applicable()).count();
        let mut out = format!(
            "Scratch pad verification ({}/{} applicable):",
            applicable,
            checks.len()
        );
        for (i, check) in checks.iter().enumerate() {
            out.push_str(&format!("\n{}. {}", i + 1, check));
        }
        out
    }
}

fn ack(count: usize) -> String {
    format!("Updated scratch pad with {} file(s)", count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sentinel() {
        let pad = ScratchPad::new();
        assert_eq!(pad.read(), EMPTY_SCRATCH_PAD);
    }

    #[test]
    fn test_single_entry_format() {
        let mut pad = ScratchPad::new();
        let ack = pad.write([DiffEntry::note("a.tsx", "Change padding p-2 -> p-4")]);
        assert_eq!(ack, "Updated scratch pad with 1 file(s)");

        let expected = format!(
            "Current Scratch Pad:\n{}\n\n1. a.tsx\n{}\nChange padding p-2 -> p-4",
            "=".repeat(50),
            "-".repeat(50)
        );
        assert_eq!(pad.read(), expected);
    }

    #[test]
    fn test_write_replaces_ledger() {
        let mut pad = ScratchPad::new();
        pad.write([DiffEntry::note("a.tsx", "note1")]);
        pad.write([DiffEntry::note("b.tsx", "note2")]);

        let text = pad.read();
        assert!(!text.contains("a.tsx"));
        assert!(text.contains("1. b.tsx"));
        assert_eq!(pad.len(), 1);
    }

    #[test]
    fn test_merge_keeps_earlier_entries() {
        let mut pad = ScratchPad::new();
        pad.write([DiffEntry::note("a.tsx", "note1")]);
        let ack = pad.merge([
            DiffEntry::note("b.tsx", "note2"),
            DiffEntry::note("a.tsx", "note1 revised"),
        ]);

        assert_eq!(ack, "Updated scratch pad with 2 file(s)");
        assert_eq!(pad.len(), 2);
        assert_eq!(pad.entries()[0].rationale, "note1 revised");
        assert_eq!(pad.entries()[1].path, "b.tsx");
    }

    #[test]
    fn test_insertion_order_and_duplicates() {
        let mut pad = ScratchPad::new();
        let ack = pad.write([
            DiffEntry::note("z.tsx", "first"),
            DiffEntry::note("a.tsx", "second"),
            DiffEntry::note("z.tsx", "third"),
        ]);

        assert_eq!(ack, "Updated scratch pad with 2 file(s)");
        let paths: Vec<_> = pad.entries().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["z.tsx", "a.tsx"]);
        assert_eq!(pad.get("z.tsx").unwrap().rationale, "third");
    }

    #[test]
    fn test_snippets_rendered() {
        let mut pad = ScratchPad::new();
        pad.write([DiffEntry::note("a.tsx", "Bold price").with_snippets(
            "<span className=\"text-sm\">",
            "<span className=\"text-sm font-bold\">",
        )]);

        let text = pad.read();
        assert!(text.contains("Bold price\n\nBefore:\n<span className=\"text-sm\">"));
        assert!(text.ends_with("After:\n<span className=\"text-sm font-bold\">"));
    }

    #[test]
    fn test_diff_input_shapes() {
        let note: DiffInput = serde_json::from_str("\"plain note\"").unwrap();
        assert_eq!(note, DiffInput::Note("plain note".into()));

        let structured: DiffInput =
            serde_json::from_str(r#"{"note": "why", "before": "a", "after": "b"}"#).unwrap();
        let entry = DiffEntry::from_input("x.tsx", structured);
        assert_eq!(entry.rationale, "why");
        assert_eq!(entry.before.as_deref(), Some("a"));
    }

    #[test]
    fn test_verify_against_files() {
        let mut files = VirtualFs::new();
        files.write("a.tsx", "<div className=\"p-2\" />");
        files.write("b.tsx", "<div className=\"p-8\" />");
        files.write("c.tsx", "");

        let mut pad = ScratchPad::new();
        pad.write([
            DiffEntry::note("a.tsx", "pad").with_snippets("p-2", "p-4"),
            DiffEntry::note("b.tsx", "pad").with_snippets("p-2", "p-4"),
            DiffEntry::note("c.tsx", "create component"),
            DiffEntry::note("d.tsx", "missing"),
        ]);

        let checks = pad.verify(&files);
        assert_eq!(checks[0], DiffCheck::BeforeFound { path: "a.tsx".into() });
        assert_eq!(checks[1], DiffCheck::BeforeMissing { path: "b.tsx".into() });
        assert_eq!(checks[2], DiffCheck::NoSnippet { path: "c.tsx".into() });
        assert_eq!(checks[3], DiffCheck::FileMissing { path: "d.tsx".into() });

        let report = pad.verification_report(&files);
        assert!(report.starts_with("Scratch pad verification (2/4 applicable):"));
    }

    #[test]
    fn test_verify_detects_stale_snippet_after_write() {
        let mut files = VirtualFs::new();
        files.write("a.tsx", "text-sm");
        let mut pad = ScratchPad::new();
        pad.write([DiffEntry::note("a.tsx", "x").with_snippets("text-sm", "text-base")]);
        assert!(pad.verify(&files)[0].is_applicable());

        files.write("a.tsx", "text-base");
        assert!(!pad.verify(&files)[0].is_applicable());
    }

    #[test]
    fn test_blank_before_is_no_snippet() {
        let mut files = VirtualFs::new();
        files.write("a.tsx", "<div />");
        let mut pad = ScratchPad::new();
        pad.write([
            DiffEntry::note("a.tsx", "x").with_snippets("", "<div className=\"p-4\" />"),
        ]);
        assert_eq!(pad.verify(&files), vec![DiffCheck::NoSnippet { path: "a.tsx".into() }]);

        pad.write([DiffEntry::note("a.tsx", "x").with_snippets("  \n", "y")]);
        assert_eq!(pad.verify(&files), vec![DiffCheck::NoSnippet { path: "a.tsx".into() }]);
    }
}
