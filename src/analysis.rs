//! Placeholder analysis backing the language features.
//!
//! Nothing here understands the document; the answers only demonstrate the
//! response shapes the dispatcher has to carry.
pub mod document_store;

use lsp_types::{
    CodeAction, CodeActionKind, CodeActionOrCommand, CompletionItem, CompletionItemKind,
    Diagnostic, DiagnosticSeverity, Documentation, GotoDefinitionResponse, Hover, HoverContents,
    Location, MarkedString, Position, Range, TextEdit, Url, WorkspaceEdit,
};
use std::collections::HashMap;

const SOURCE: &str = "mini-lsp";
const DISCOURAGED: &str = "VS Code";
const ENCOURAGED: &str = "Neovim";
const CENSORED: &str = "VS C*de";

/// Every occurrence of `needle` as a single-line range, in document order.
fn occurrences(text: &str, needle: &str) -> Vec<Range> {
    text.lines()
        .enumerate()
        .flat_map(|(row, line)| {
            line.match_indices(needle).map(move |(idx, _)| {
                let start = utf16_len(&line[..idx]);
                let end = start + utf16_len(needle);
                line_range(row as u32, start, end)
            })
        })
        .collect()
}

fn utf16_len(s: &str) -> u32 {
    s.encode_utf16().count() as u32
}

pub fn line_range(line: u32, start: u32, end: u32) -> Range {
    Range::new(Position::new(line, start), Position::new(line, end))
}

pub fn diagnostics(text: &str) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = occurrences(text, DISCOURAGED)
        .into_iter()
        .map(|range| Diagnostic {
            range,
            severity: Some(DiagnosticSeverity::ERROR),
            source: Some(SOURCE.to_string()),
            message: format!("Mentions {}; consider a better editor", DISCOURAGED),
            ..Default::default()
        })
        .collect();

    diagnostics.extend(occurrences(text, ENCOURAGED).into_iter().map(|range| {
        Diagnostic {
            range,
            severity: Some(DiagnosticSeverity::HINT),
            source: Some(SOURCE.to_string()),
            message: "Great choice of editor".to_string(),
            ..Default::default()
        }
    }));
    diagnostics
}

pub fn hover(uri: &Url, text: &str) -> Hover {
    Hover {
        contents: HoverContents::Scalar(MarkedString::String(format!(
            "File: {}, Characters: {}",
            uri,
            text.len()
        ))),
        range: None,
    }
}

/// Points one line above the cursor, at column 0.
pub fn definition(uri: &Url, position: Position) -> GotoDefinitionResponse {
    let target = Position::new(position.line.saturating_sub(1), 0);
    GotoDefinitionResponse::Scalar(Location::new(uri.clone(), Range::new(target, target)))
}

pub fn code_actions(uri: &Url, text: &str) -> Vec<CodeActionOrCommand> {
    let mut actions = Vec::new();
    for range in occurrences(text, DISCOURAGED) {
        actions.push(replace_action(
            uri,
            range,
            format!("Replace {} with {}", DISCOURAGED, ENCOURAGED),
            ENCOURAGED,
        ));
        actions.push(replace_action(
            uri,
            range,
            format!("Censor to {}", CENSORED),
            CENSORED,
        ));
    }
    actions
}

fn replace_action(
    uri: &Url,
    range: Range,
    title: String,
    new_text: &str,
) -> CodeActionOrCommand {
    let edit = TextEdit::new(range, new_text.to_string());
    let changes = HashMap::from([(uri.clone(), vec![edit])]);
    CodeActionOrCommand::CodeAction(CodeAction {
        title,
        kind: Some(CodeActionKind::QUICKFIX),
        edit: Some(WorkspaceEdit::new(changes)),
        ..Default::default()
    })
}

pub fn completion() -> Vec<CompletionItem> {
    vec![CompletionItem {
        label: ENCOURAGED.to_string(),
        kind: Some(CompletionItemKind::TEXT),
        detail: Some("A hyperextensible editor".to_string()),
        documentation: Some(Documentation::String(
            "Neovim is a Vim-based text editor built for extensibility".to_string(),
        )),
        ..Default::default()
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri() -> Url {
        Url::parse("file:///tmp/editors.txt").unwrap()
    }

    #[test]
    fn test_diagnostics_locate_each_mention() {
        let text = "I use VS Code\nbut Neovim too\nVS Code again";
        let diagnostics = diagnostics(text);
        assert_eq!(diagnostics.len(), 3);

        assert_eq!(diagnostics[0].severity, Some(DiagnosticSeverity::ERROR));
        assert_eq!(diagnostics[0].range, line_range(0, 6, 13));
        assert_eq!(diagnostics[1].range, line_range(2, 0, 7));
        assert_eq!(diagnostics[2].severity, Some(DiagnosticSeverity::HINT));
        assert_eq!(diagnostics[2].range, line_range(1, 4, 10));
    }

    #[test]
    fn test_diagnostics_use_utf16_columns() {
        let diagnostics = diagnostics("é 🙂 VS Code");
        // "é" is one UTF-16 unit, the emoji two.
        assert_eq!(diagnostics[0].range, line_range(0, 5, 12));
    }

    #[test]
    fn test_clean_text_has_no_diagnostics() {
        assert!(diagnostics("nothing to see").is_empty());
        assert!(diagnostics("").is_empty());
    }

    #[test]
    fn test_hover_reports_length() {
        let hover = hover(&uri(), "abcd");
        assert_eq!(
            hover.contents,
            HoverContents::Scalar(MarkedString::String(
                "File: file:///tmp/editors.txt, Characters: 4".to_string()
            ))
        );
    }

    #[test]
    fn test_definition_points_at_previous_line() {
        let GotoDefinitionResponse::Scalar(location) = definition(&uri(), Position::new(3, 9))
        else {
            panic!("expected a single location");
        };
        assert_eq!(location.range.start, Position::new(2, 0));

        let GotoDefinitionResponse::Scalar(location) = definition(&uri(), Position::new(0, 9))
        else {
            panic!("expected a single location");
        };
        assert_eq!(location.range.start, Position::new(0, 0));
    }

    #[test]
    fn test_code_actions_offer_two_fixes_per_mention() {
        let actions = code_actions(&uri(), "VS Code\nok\nVS Code");
        assert_eq!(actions.len(), 4);
        let CodeActionOrCommand::CodeAction(censor) = &actions[1] else {
            panic!("expected a code action");
        };
        let edits = &censor.edit.as_ref().unwrap().changes.as_ref().unwrap()[&uri()];
        assert_eq!(edits[0].new_text, CENSORED);
        assert_eq!(edits[0].range, line_range(0, 0, 7));
    }

    #[test]
    fn test_completion_offers_one_item() {
        let items = completion();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "Neovim");
    }
}
