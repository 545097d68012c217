//! # Parsing Utils
//!
//! Extracts structured actions from raw model output.
//!
//! Grammar:
//! - `<<<FILE: name>>>` body `<<<END>>>` writes `body` (trimmed) to `name` (trimmed).
//!   The header must sit on one line. The body is opaque, markers inside it are content.
//! - `<<<OPERATION: /verb args>>>` on a single line proposes one slash operation.
//!
//! Anything that does not match exactly stays in the text. An unterminated file block is
//! left visible and produces no action.

use crate::domain::types::{ActionBatch, AgentAction};

const MARKER_OPEN: &str = "<<<";
const MARKER_CLOSE: &str = ">>>";
const FILE_START: &str = "<<<FILE:";
const FILE_END: &str = "<<<END>>>";
const OPERATION_START: &str = "<<<OPERATION:";
const THINK_START: &str = "<think>";
const THINK_END: &str = "</think>";

/// Model output split into prose and actions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedResponse {
    pub cleaned_text: String,
    /// File writes in source order, then operations in source order.
    pub batch: ActionBatch,
}

enum Directive {
    File { name: String, content: String },
    Operation(AgentAction),
    /// Well-formed but blank. Removed from the text, never staged.
    Dropped,
}

#[derive(Default)]
struct Pass {
    cleaned: String,
    files: Vec<AgentAction>,
    operations: Vec<AgentAction>,
    matched: usize,
}

/// Scans `text` for file and operation directives.
pub fn parse_actions(text: &str) -> ParsedResponse {
    let mut cleaned = text.to_string();
    let mut files = Vec::new();
    let mut operations = Vec::new();

    // Stripping a directive can splice surrounding fragments into a new marker; rescan until stable.
    loop {
        let pass = scan(&cleaned);
        if pass.matched == 0 {
            break;
        }
        tracing::debug!(
            "Parser pass matched {} directive(s): {} file(s), {} operation(s)",
            pass.matched,
            pass.files.len(),
            pass.operations.len()
        );
        files.extend(pass.files);
        operations.extend(pass.operations);
        cleaned = pass.cleaned;
    }

    files.extend(operations);
    ParsedResponse {
        cleaned_text: cleaned,
        batch: ActionBatch::new(files),
    }
}

fn scan(text: &str) -> Pass {
    let mut pass = Pass {
        cleaned: String::with_capacity(text.len()),
        ..Default::default()
    };
    let mut rest = text;

    while let Some(idx) = rest.find(MARKER_OPEN) {
        pass.cleaned.push_str(&rest[..idx]);
        let tail = &rest[idx..];
        match read_directive(tail) {
            Some((directive, consumed)) => {
                pass.matched += 1;
                match directive {
                    Directive::File { name, content } => {
                        pass.files.push(AgentAction::FileWrite { name, content })
                    }
                    Directive::Operation(action) => pass.operations.push(action),
                    Directive::Dropped => {}
                }
                rest = &tail[consumed..];
            }
            None => {
                // Not a directive: keep one '<' and look again from the next byte.
                pass.cleaned.push('<');
                rest = &tail[1..];
            }
        }
    }
    pass.cleaned.push_str(rest);
    pass
}

/// Tries to read one directive at the start of `tail`. Returns it with the bytes consumed.
fn read_directive(tail: &str) -> Option<(Directive, usize)> {
    if let Some(after) = tail.strip_prefix(FILE_START) {
        let (name, header_len) = read_header(after)?;
        let body_start = FILE_START.len() + header_len;
        let body = &tail[body_start..];
        let end = body.find(FILE_END)?;
        let consumed = body_start + end + FILE_END.len();
        if name.is_empty() {
            return Some((Directive::Dropped, consumed));
        }
        let content = body[..end].trim().to_string();
        return Some((Directive::File { name, content }, consumed));
    }

    if let Some(after) = tail.strip_prefix(OPERATION_START) {
        let (command, header_len) = read_header(after)?;
        let consumed = OPERATION_START.len() + header_len;
        return Some(match AgentAction::operation(&command) {
            Some(action) => (Directive::Operation(action), consumed),
            None => (Directive::Dropped, consumed),
        });
    }

    None
}

/// Reads up to the closing `>>>` on the same line. Returns the trimmed value and the
/// length including the close marker.
fn read_header(after: &str) -> Option<(String, usize)> {
    let line = after.split('\n').next().unwrap_or("");
    let close = line.find(MARKER_CLOSE)?;
    let value = &line[..close];
    if value.contains(MARKER_OPEN) {
        return None;
    }
    Some((value.trim().to_string(), close + MARKER_CLOSE.len()))
}

/// Splits `<think>` reasoning blocks out of model output.
/// Returns the trimmed reasoning sections and the remaining text.
pub fn extract_reasoning(text: &str) -> (Vec<String>, String) {
    let mut sections = Vec::new();
    let mut remaining = text.to_string();

    loop {
        let mut out = String::with_capacity(remaining.len());
        let mut rest = remaining.as_str();
        let mut found = false;

        while let Some(start) = rest.find(THINK_START) {
            let body = &rest[start + THINK_START.len()..];
            let Some(end) = body.find(THINK_END) else {
                break;
            };
            out.push_str(&rest[..start]);
            sections.push(body[..end].trim().to_string());
            rest = &body[end + THINK_END.len()..];
            found = true;
        }
        out.push_str(rest);

        if !found {
            break;
        }
        remaining = out;
    }

    (sections, remaining)
}
