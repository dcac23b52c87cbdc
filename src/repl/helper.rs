//! Rustyline helper for REPL with tab completion and hints

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::borrow::Cow;

use super::colors;
use crate::query::IndexSelector;

/// Slash commands for tab completion
pub const SLASH_COMMANDS: &[&str] = &[
    "/help",
    "/index",
    "/indexes",
    "/status",
    "/last",
    "/raw",
    "/version",
    "/quit",
    "/exit",
];

/// Custom helper for rustyline with completion and hints
pub struct ConsoleHelper {
    hinter: HistoryHinter,
}

impl ConsoleHelper {
    pub fn new() -> Self {
        Self {
            hinter: HistoryHinter::new(),
        }
    }
}

impl Default for ConsoleHelper {
    fn default() -> Self {
        Self::new()
    }
}

/// Completion candidates for `line` with the cursor at `pos`
pub fn candidates(line: &str, pos: usize) -> (usize, Vec<String>) {
    let line = &line[..pos.min(line.len())];

    // `/index <name>` completes engine names
    if let Some(arg) = line.strip_prefix("/index ") {
        let start = line.len() - arg.len();
        let matches = IndexSelector::all()
            .map(|s| s.as_str().to_string())
            .filter(|name| name.starts_with(arg.trim_start()))
            .collect();
        return (start + (arg.len() - arg.trim_start().len()), matches);
    }

    // Only complete slash commands at the start of the line
    if line.starts_with('/') && !line.contains(' ') {
        let matches = SLASH_COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| cmd.to_string())
            .collect();
        return (0, matches);
    }

    (pos, vec![])
}

impl Completer for ConsoleHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, matches) = candidates(line, pos);
        Ok((
            start,
            matches
                .into_iter()
                .map(|m| Pair {
                    display: m.clone(),
                    replacement: m,
                })
                .collect(),
        ))
    }
}

impl Hinter for ConsoleHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        // Show history hints for queries, not commands
        if !line.starts_with('/') {
            self.hinter.hint(line, pos, ctx)
        } else {
            None
        }
    }
}

impl Highlighter for ConsoleHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        _default: bool,
    ) -> Cow<'b, str> {
        Cow::Owned(colors::colored_prompt(prompt))
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        // Dim hints
        Cow::Owned(format!("\x1b[2m{}\x1b[0m", hint))
    }
}

impl Validator for ConsoleHelper {}

impl Helper for ConsoleHelper {}
