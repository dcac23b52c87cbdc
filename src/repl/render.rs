//! Terminal rendering of view models and pipeline outcomes

use std::time::Duration;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::colors::{self, ansi::*};
use crate::error::ExecutionError;
use crate::pipeline::{FailureKind, PipelineOutcome};
use crate::view::ViewModel;

/// Cells wider than this are cut with an ellipsis
pub const MAX_CELL_WIDTH: usize = 48;

/// Render a view model. `raw` forces pretty JSON for every shape.
pub fn view(view: &ViewModel, raw: bool) -> String {
    if raw {
        return pretty_json(&serde_json::to_value(view).unwrap_or_default());
    }

    match view {
        ViewModel::Tabular { columns, rows, footer } => {
            let mut out = table(columns, rows);
            let footer = footer.to_string();
            if !footer.is_empty() {
                out.push_str(&colors::status(&footer));
                out.push('\n');
            }
            out
        }
        ViewModel::Empty { footer } => {
            let footer = footer.to_string();
            if footer.is_empty() {
                format!("{}\n", colors::status("(no rows)"))
            } else {
                format!("{}\n", colors::status(&format!("(no rows) · {}", footer)))
            }
        }
        ViewModel::Raw { value } => pretty_json(value),
    }
}

/// Render a finished run: a summary line, then the result or the error
pub fn outcome(outcome: &PipelineOutcome, elapsed: Duration, raw: bool) -> String {
    let summary = outcome
        .parsed()
        .and_then(|p| p.operation().ok())
        .map(|op| op.to_string())
        .unwrap_or_else(|| "query".to_string());
    let timing = format!("{} ms", elapsed.as_millis());

    match outcome {
        PipelineOutcome::Completed { view: v, enriched, .. } => {
            let via = enriched
                .index()
                .map(|idx| format!(" via {}", colors::engine(idx)))
                .unwrap_or_default();
            format!(
                "{} {}{} {}\n{}",
                colors::success("✓"),
                summary,
                via,
                colors::status(&format!("({})", timing)),
                view(v, raw)
            )
        }
        failed => {
            let kind = failed.failure_kind().unwrap_or(FailureKind::Rejected);
            let message = failed.error_message().unwrap_or_default();
            let mut out = format!(
                "{} {}: {} {}\n",
                colors::error("✗"),
                colors::error(kind.label()),
                message,
                colors::status(&format!("({})", timing))
            );
            if let PipelineOutcome::ExecutionFailed {
                error: ExecutionError::Service { payload, .. },
                ..
            } = failed
            {
                if raw {
                    out.push_str(&pretty_json(payload));
                }
            }
            if kind == FailureKind::Unreachable {
                out.push_str(&colors::warning("  is the Mini DB API running? see /status\n"));
            }
            out
        }
    }
}

/// Aligned text table with a bold header row
pub fn table(columns: &[String], rows: &[Vec<String>]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|c| clip(c)).collect())
        .collect();

    let mut widths: Vec<usize> = columns.iter().map(|c| width(c)).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(width(cell));
            }
        }
    }

    let mut out = String::new();
    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{}{}{}", BOLD, pad(c, *w), RESET))
        .collect();
    out.push_str(&header.join(" │ "));
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    out.push_str(&format!("{}{}{}\n", DIM, rule.join("─┼─"), RESET));

    for row in &cells {
        let line: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| pad(row.get(i).map(String::as_str).unwrap_or(""), *w))
            .collect();
        out.push_str(line.join(" │ ").trim_end());
        out.push('\n');
    }
    out
}

fn pretty_json(value: &serde_json::Value) -> String {
    let mut text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    text.push('\n');
    text
}

/// Terminal columns taken by `text`
fn width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

fn pad(text: &str, width: usize) -> String {
    format!("{}{}", text, " ".repeat(width.saturating_sub(self::width(text))))
}

fn clip(text: &str) -> String {
    let flat = text.replace(['\n', '\r'], " ");
    if width(&flat) <= MAX_CELL_WIDTH {
        return flat;
    }
    let mut cut = String::new();
    let mut used = 0;
    for c in flat.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > MAX_CELL_WIDTH - 1 {
            break;
        }
        used += w;
        cut.push(c);
    }
    cut.push('…');
    cut
}
