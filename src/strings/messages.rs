//! # Messages
//!
//! Contains constant strings and format functions for terminal output.
//! Includes error messages, status updates, and outcome lines.

use crate::domain::errors::StateError;
use crate::domain::types::{ExecutionReport, Outcome, OutcomeStatus};

const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";
const ITALIC: &str = "\x1b[3m";

pub fn green(text: &str) -> String {
    format!("{GREEN}{text}{RESET}")
}

pub fn red(text: &str) -> String {
    format!("{RED}{text}{RESET}")
}

pub fn yellow(text: &str) -> String {
    format!("{YELLOW}{text}{RESET}")
}

pub fn cyan(text: &str) -> String {
    format!("{CYAN}{text}{RESET}")
}

pub fn dim(text: &str) -> String {
    format!("{DIM}{text}{RESET}")
}

pub fn thinking() -> String {
    dim("(Thinking...)")
}

pub fn reasoning_block(text: &str) -> String {
    format!(
        "{DIM}{ITALIC}━━━ REASONING ━━━{RESET}\n{}\n{DIM}{ITALIC}━━━━━━━━━━━━━━━━━{RESET}\n",
        dim(text)
    )
}

pub fn actions_detected(count: usize) -> String {
    format!(
        "{}\n{}\n",
        yellow(&format!("━━━ ACTIONS DETECTED ({count}) ━━━")),
        dim("Approve with [1] or reject with [2].")
    )
}

pub fn model_unreachable(err: &str) -> String {
    red(&format!("Error connecting to model: {err}"))
}

pub fn state_warning(err: &StateError) -> String {
    yellow(&format!("⚠ {err}"))
}

pub fn batch_rejected() -> String {
    yellow("✖ Cancelled. No actions performed.")
}

pub fn batch_summary(report: &ExecutionReport) -> String {
    green(&format!(
        "✓ Completed: {} file(s), {} operation(s)",
        report.files_written, report.operations_run
    ))
}

pub fn outcome_line(outcome: &Outcome) -> String {
    match outcome.status {
        OutcomeStatus::Success => green(&format!("✔ {}", outcome.message)),
        OutcomeStatus::Failed => red(&format!("✗ {}: {}", outcome.action, outcome.message)),
        OutcomeStatus::Warning => yellow(&format!("⚠ {}", outcome.message)),
    }
}

pub fn file_saved(name: &str) -> String {
    format!("SAVED: {name}")
}

pub fn operation_executed(command: &str, detail: &str) -> String {
    format!("EXECUTED: {command} ({detail})")
}

pub fn unknown_operation(command: &str) -> String {
    format!("Unknown operation: {command}")
}

pub fn changed_directory(path: &str) -> String {
    format!("Changed to: {path}")
}

pub fn directory_not_found(name: &str) -> String {
    format!("Directory not found: {name}")
}

pub fn contains_working_directory(name: &str) -> String {
    format!("Refusing to touch {name}: it contains the working directory")
}

pub fn file_not_found(name: &str) -> String {
    format!("File not found: {name}")
}

pub fn source_not_found(name: &str) -> String {
    format!("Source file not found: {name}")
}

pub fn created(name: &str) -> String {
    format!("Created: {name}")
}

pub fn copied(from: &str, to: &str) -> String {
    format!("Copied: {from} → {to}")
}

pub fn moved(from: &str, to: &str) -> String {
    format!("Moved: {from} → {to}")
}

pub fn trashed(name: &str) -> String {
    format!("Moved to trash: {name}")
}

pub fn command_succeeded(detail: &str) -> String {
    green(&format!("✓ {detail}"))
}

pub fn command_failed(err: &str) -> String {
    red(&format!("✗ {err}"))
}

pub fn command_error(err: &str) -> String {
    red(&format!("Error: {err}"))
}

pub fn unknown_command(verb: &str) -> String {
    format!(
        "{}\n{}",
        yellow(&format!("Unknown command: {verb}")),
        dim("Type /help for available commands")
    )
}

pub fn usage(text: &str) -> String {
    yellow(&format!("Usage: {text}"))
}

pub const CD_USAGE: &str = "/cd <directory>";
pub const MKDIR_USAGE: &str = "/mkdir <directory_name>";
pub const TOUCH_USAGE: &str = "/touch <filename>";
pub const RM_USAGE: &str = "/rm <filename>";
pub const RMDIR_USAGE: &str = "/rmdir <directory>";
pub const CP_USAGE: &str = "/cp <source> <destination>";
pub const MV_USAGE: &str = "/mv <source> <destination>";
pub const CAT_USAGE: &str = "/cat <filename>";
pub const FIND_USAGE: &str = "/find <pattern>";
pub const MODE_USAGE: &str = "/mode <chat|agent>";

pub fn section_header(title: &str) -> String {
    cyan(&format!("━━━ {title} ━━━"))
}

pub fn section_footer() -> String {
    cyan("━━━━━━━━━━━━━━━━━━━━━")
}

pub fn entry_label(name: &str, is_dir: bool) -> String {
    if is_dir {
        format!("📁 {BLUE}{name}{RESET}")
    } else {
        format!("📄 {name}")
    }
}

pub fn no_matches() -> String {
    dim("No matches found")
}

pub fn mode_switched(mode: &str) -> String {
    dim(&format!("Mode: {mode}"))
}

pub fn cancelled_runtime() -> String {
    "🛑 Process cancelled. The model runtime was asked to stop.\n\nYou can start a new request anytime.".to_string()
}

pub fn cancel_failed(err: &str) -> String {
    format!("⚠️ Could not stop the model runtime automatically: {err}")
}

pub fn image_request_failed(err: &str) -> String {
    format!("❌ Image Request Failed\n\nError: {err}")
}

pub fn chat_error(err: &str) -> String {
    format!("❌ Error: {err}")
}

pub const IMAGE_PAYLOAD_EMPTY: &str = "Failed to extract base64 data from image";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_line_by_status() {
        let mut outcome = Outcome {
            index: 0,
            action: "/cd nope".to_string(),
            status: OutcomeStatus::Failed,
            message: "Directory not found: nope".to_string(),
        };
        assert!(outcome_line(&outcome).contains("✗ /cd nope: Directory not found: nope"));

        outcome.status = OutcomeStatus::Warning;
        assert!(outcome_line(&outcome).contains("⚠ Directory not found: nope"));
    }

    #[test]
    fn test_summary_counts() {
        let report = ExecutionReport {
            files_written: 2,
            operations_run: 1,
            outcomes: Vec::new(),
        };
        assert!(batch_summary(&report).contains("Completed: 2 file(s), 1 operation(s)"));
    }
}
