//! Prefix completion.
//!
//! The completion prefix is computed by walking left from the cursor
//! through identifier characters (including `.` so qualified names
//! complete as one token). Four candidate lists are concatenated in a
//! fixed order: reserved words, prelude module names, host-supplied
//! identifiers, and prelude exports. Every item carries a text edit
//! replacing exactly the typed prefix, so client-side filtering sees the
//! original prefix span.

use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionTextEdit, Position, Range, TextEdit,
};

use rill_eval::ModuleMap;

/// The language's reserved words.
pub const RESERVED_WORDS: &[&str] = &[
    "assert", "else", "enum", "fun", "if", "in", "let", "match", "module", "None", "open",
    "rename", "Some", "then", "with",
];

fn is_prefix_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// The completion prefix at `character` (UTF-16 units) in `line`.
pub fn completion_prefix(line: &str, character: u32) -> String {
    let mut units = 0u32;
    let mut cut = line.len();
    for (idx, ch) in line.char_indices() {
        if units >= character {
            cut = idx;
            break;
        }
        units += ch.len_utf16() as u32;
    }
    let before = &line[..cut];
    let start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_prefix_char(*c))
        .last()
        .map(|(i, _)| i)
        .unwrap_or(before.len());
    before[start..].to_string()
}

/// Render one candidate, attaching the edit that replaces the prefix.
pub fn mk_completion_item(
    prefix: &str,
    cursor: Position,
    label: &str,
    kind: CompletionItemKind,
    detail: Option<String>,
) -> CompletionItem {
    let prefix_units = prefix.encode_utf16().count() as u32;
    let start = Position::new(cursor.line, cursor.character.saturating_sub(prefix_units));
    CompletionItem {
        label: label.to_string(),
        kind: Some(kind),
        detail,
        text_edit: Some(CompletionTextEdit::Edit(TextEdit {
            range: Range {
                start,
                end: cursor,
            },
            new_text: label.to_string(),
        })),
        ..Default::default()
    }
}

/// All candidates for `prefix`, in the fixed list order.
pub fn completions(
    prefix: &str,
    cursor: Position,
    prelude: &ModuleMap,
    idents: &[Option<String>],
) -> Vec<CompletionItem> {
    let matches = |label: &str| prefix.is_empty() || label.starts_with(prefix);
    let mut items = Vec::new();

    for word in RESERVED_WORDS {
        if matches(word) {
            items.push(mk_completion_item(
                prefix,
                cursor,
                word,
                CompletionItemKind::KEYWORD,
                None,
            ));
        }
    }

    for module in prelude.keys() {
        if matches(module) {
            items.push(mk_completion_item(
                prefix,
                cursor,
                module,
                CompletionItemKind::MODULE,
                None,
            ));
        }
    }

    for ident in idents.iter().flatten() {
        if matches(ident) {
            items.push(mk_completion_item(
                prefix,
                cursor,
                ident,
                CompletionItemKind::VARIABLE,
                None,
            ));
        }
    }

    for (module, exports) in prelude {
        for (name, (ty, _)) in &exports.exports {
            let qualified = format!("{module}.{name}");
            if matches(&qualified) {
                items.push(mk_completion_item(
                    prefix,
                    cursor,
                    &qualified,
                    CompletionItemKind::FUNCTION,
                    Some(ty.to_string()),
                ));
            }
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_eval::Prelude;

    #[test]
    fn prefix_walks_left_through_identifier_characters() {
        assert_eq!(completion_prefix("let x = Ar", 10), "Ar");
        assert_eq!(completion_prefix("Array.ran", 9), "Array.ran");
        assert_eq!(completion_prefix("1 + foo", 7), "foo");
        assert_eq!(completion_prefix("1 + foo", 3), "");
        assert_eq!(completion_prefix("", 0), "");
        assert_eq!(completion_prefix("x", 80), "x");
    }

    #[test]
    fn prelude_prefix_finds_qualified_exports() {
        let prelude = Prelude::core();
        let items = completions(
            "Ar",
            Position::new(0, 2),
            prelude.modules(),
            &[],
        );
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert!(labels.contains(&"Array"));
        assert!(labels.contains(&"Array.range"));
        assert!(labels.contains(&"Array.map"));
        assert!(!labels.contains(&"Text.length"));

        // The edit replaces exactly the typed prefix.
        let Some(CompletionTextEdit::Edit(edit)) =
            items.iter().find(|i| i.label == "Array.range").and_then(|i| i.text_edit.clone())
        else {
            panic!("expected a text edit");
        };
        assert_eq!(edit.range.start, Position::new(0, 0));
        assert_eq!(edit.range.end, Position::new(0, 2));
        assert_eq!(edit.new_text, "Array.range");
    }

    #[test]
    fn lists_concatenate_in_order() {
        let prelude = Prelude::core();
        let items = completions(
            "",
            Position::new(0, 0),
            prelude.modules(),
            &[Some("input0".to_string()), None],
        );
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        let kw = labels.iter().position(|l| *l == "let").unwrap();
        let module = labels.iter().position(|l| *l == "Array").unwrap();
        let ident = labels.iter().position(|l| *l == "input0").unwrap();
        let export = labels.iter().position(|l| *l == "Array.length").unwrap();
        assert!(kw < module && module < ident && ident < export);
    }

    #[test]
    fn export_items_carry_their_type_as_detail() {
        let prelude = Prelude::core();
        let items = completions("Array.len", Position::new(0, 9), prelude.modules(), &[]);
        let item = items.iter().find(|i| i.label == "Array.length").unwrap();
        assert_eq!(item.detail.as_deref(), Some("array of 'a → int"));
    }
}
