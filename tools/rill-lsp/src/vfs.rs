//! Versioned in-memory documents.
//!
//! Open assigns version 0; each change adopts the client's version, which
//! increases monotonically. Incremental edits address the text by
//! line/character in UTF-16 units, as the wire protocol does.

use dashmap::DashMap;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent, Url};

/// One open document.
#[derive(Clone, Debug)]
pub struct Document {
    pub text: String,
    pub version: i32,
}

/// The virtual file system: every document the client has opened.
#[derive(Default)]
pub struct Vfs {
    docs: DashMap<Url, Document>,
}

impl Vfs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, uri: Url, text: String) {
        self.docs.insert(uri, Document { text, version: 0 });
    }

    pub fn close(&self, uri: &Url) {
        self.docs.remove(uri);
    }

    /// Snapshot of a document's text and version.
    pub fn get(&self, uri: &Url) -> Option<Document> {
        self.docs.get(uri).map(|d| d.value().clone())
    }

    /// Apply a change batch and bump to the client's version. Returns the
    /// resulting snapshot, or `None` for an unopened document.
    pub fn apply_changes(
        &self,
        uri: &Url,
        version: i32,
        changes: &[TextDocumentContentChangeEvent],
    ) -> Option<Document> {
        let mut doc = self.docs.get_mut(uri)?;
        for change in changes {
            match change.range {
                Some(range) => {
                    let start = offset_at(&doc.text, range.start);
                    let end = offset_at(&doc.text, range.end);
                    doc.text.replace_range(start..end, &change.text);
                }
                None => doc.text = change.text.clone(),
            }
        }
        doc.version = version;
        Some(doc.value().clone())
    }
}

/// Byte offset of a line/character position, counting characters in
/// UTF-16 units. Positions past the end of a line clamp to the line
/// break; positions past the last line clamp to the end of text.
pub fn offset_at(text: &str, pos: Position) -> usize {
    let mut line = 0u32;
    let mut character = 0u32;
    for (idx, ch) in text.char_indices() {
        if line == pos.line && character >= pos.character {
            return idx;
        }
        if line > pos.line {
            return idx;
        }
        if ch == '\n' {
            if line == pos.line {
                return idx;
            }
            line += 1;
            character = 0;
        } else {
            character += ch.len_utf16() as u32;
        }
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::Range;

    fn url() -> Url {
        Url::parse("file:///tmp/script.rill").unwrap()
    }

    fn edit(start: (u32, u32), end: (u32, u32), text: &str) -> TextDocumentContentChangeEvent {
        TextDocumentContentChangeEvent {
            range: Some(Range {
                start: Position::new(start.0, start.1),
                end: Position::new(end.0, end.1),
            }),
            range_length: None,
            text: text.to_string(),
        }
    }

    #[test]
    fn open_starts_at_version_zero() {
        let vfs = Vfs::new();
        vfs.open(url(), "let x = 1".into());
        let doc = vfs.get(&url()).unwrap();
        assert_eq!(doc.version, 0);
        assert_eq!(doc.text, "let x = 1");
    }

    #[test]
    fn incremental_edits_replace_ranges() {
        let vfs = Vfs::new();
        vfs.open(url(), "let x = 1 in x".into());
        let doc = vfs
            .apply_changes(&url(), 1, &[edit((0, 8), (0, 9), "42")])
            .unwrap();
        assert_eq!(doc.text, "let x = 42 in x");
        assert_eq!(doc.version, 1);
    }

    #[test]
    fn full_sync_replaces_the_document() {
        let vfs = Vfs::new();
        vfs.open(url(), "old".into());
        let doc = vfs
            .apply_changes(
                &url(),
                2,
                &[TextDocumentContentChangeEvent {
                    range: None,
                    range_length: None,
                    text: "new".into(),
                }],
            )
            .unwrap();
        assert_eq!(doc.text, "new");
        assert_eq!(doc.version, 2);
    }

    #[test]
    fn offsets_count_utf16_units() {
        // '𝑥' is one char, two UTF-16 units, four UTF-8 bytes.
        let text = "let 𝑥 = 1\nnext";
        assert_eq!(offset_at(text, Position::new(0, 4)), 4);
        assert_eq!(offset_at(text, Position::new(0, 6)), 8);
        assert_eq!(offset_at(text, Position::new(1, 0)), 13);
        assert_eq!(offset_at(text, Position::new(9, 9)), text.len());
    }

    #[test]
    fn multiline_edit_spans_the_break() {
        let vfs = Vfs::new();
        vfs.open(url(), "a\nb\nc".into());
        let doc = vfs
            .apply_changes(&url(), 1, &[edit((0, 1), (2, 0), " ")])
            .unwrap();
        assert_eq!(doc.text, "a c");
    }
}
