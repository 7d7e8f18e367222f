use std::fmt::Write as _;

use lexsum_core::{AppViewModel, SessionState, Stage, TabKind};
use lexsum_engine::{ApiError, RecentDocumentRecord, TabSlice};
use serde_json::Value;

const BAR_WIDTH: usize = 20;

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Upload => "upload",
        Stage::Processing => "processing",
        Stage::Results => "results",
    }
}

fn bar(percent: u8) -> String {
    let filled = usize::from(percent) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// One status line for the current view.
pub fn progress_line(view: &AppViewModel) -> String {
    match view.state {
        SessionState::Idle => "idle".to_string(),
        SessionState::Uploading => format!(
            "uploading {}",
            view.file_name.as_deref().unwrap_or("document")
        ),
        SessionState::Processing => {
            let percent = view.progress.display_percentage();
            let mut line = format!("{} {:>3}%", bar(percent), percent);
            if let Some(step) = view.progress.active_step() {
                let _ = write!(line, " {}", step.name);
            } else if !view.progress.message.is_empty() {
                let _ = write!(line, " {}", view.progress.message);
            }
            if !view.progress.steps.is_empty() {
                let _ = write!(
                    line,
                    " ({}/{} steps)",
                    view.progress.completed_steps(),
                    view.progress.steps.len()
                );
            }
            if let Some(warning) = &view.poll_warning {
                let _ = write!(line, " (retrying: {warning})");
            }
            line
        }
        SessionState::Results => format!(
            "{} 100% analysis ready for {}",
            bar(100),
            view.request_id.as_deref().unwrap_or("request")
        ),
        SessionState::Failed => failure_line(view),
    }
}

pub fn failure_line(view: &AppViewModel) -> String {
    match &view.error {
        Some(error) => format!("failed during {}: {}", stage_label(view.stage), error),
        None => format!("failed during {}", stage_label(view.stage)),
    }
}

/// Tab-by-tab report of a finished analysis.
pub fn results_report(slices: &[(TabKind, Result<TabSlice, ApiError>)]) -> String {
    let mut out = String::new();
    for (tab, slice) in slices {
        let _ = writeln!(out, "== {} ==", tab.label());
        match slice {
            Ok(slice) => {
                let _ = writeln!(out, "{}", pretty(&slice.data));
            }
            Err(err) => {
                let _ = writeln!(out, "(unavailable: {err})");
            }
        }
        out.push('\n');
    }
    out
}

pub fn tab_slice(slice: &TabSlice) -> String {
    format!("== {} ==\n{}", slice.tab.label(), pretty(&slice.data))
}

pub fn recent_list(records: &[RecentDocumentRecord]) -> String {
    if records.is_empty() {
        return "no recent documents".to_string();
    }
    let mut out = String::new();
    for record in records {
        let _ = write!(out, "{:>4}  {}", record.id, record.title);
        if !record.status.is_empty() {
            let _ = write!(out, " [{}]", record.status);
        }
        if !record.date.is_empty() {
            let _ = write!(out, " {}", record.date);
        }
        if let Some(request_id) = &record.request_id {
            let _ = write!(out, " ({request_id})");
        }
        out.push('\n');
        for (label, value) in [
            ("parties", &record.parties),
            ("jurisdiction", &record.jurisdiction),
            ("summary", &record.summary),
        ] {
            if !value.is_empty() {
                let _ = writeln!(out, "      {label}: {value}");
            }
        }
    }
    out
}

fn pretty(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
