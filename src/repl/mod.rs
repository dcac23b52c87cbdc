//! Interactive REPL for the query console
//!
//! Provides a readline-based interface with:
//! - Command history
//! - Multi-line input support
//! - Index engine selection
//! - Ctrl+C cancellation of the in-flight query

mod colors;
mod helper;
pub mod render;

pub use colors::{banner_accent, banner_line, separator};

use anyhow::Result;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::pipeline::{Orchestrator, Submission};
use crate::query::{IndexSelector, SelectorPolicy};
use helper::ConsoleHelper;

/// A line the user typed, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    /// `/index` with no argument shows the current selector
    Index(Option<String>),
    Indexes,
    Status,
    Last,
    Raw,
    Version,
    Quit,
    Unknown(String),
    /// Anything that isn't a slash command
    Query(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if !trimmed.starts_with('/') {
            return Self::Query(line.to_string());
        }

        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let command = parts.next().unwrap_or("");
        let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

        match command {
            "/help" | "/?" => Self::Help,
            "/index" => Self::Index(arg.map(String::from)),
            "/indexes" => Self::Indexes,
            "/status" => Self::Status,
            "/last" => Self::Last,
            "/raw" => Self::Raw,
            "/version" => Self::Version,
            "/quit" | "/exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// REPL state
pub struct Repl {
    /// Readline editor with history and completion
    editor: Editor<ConsoleHelper, DefaultHistory>,
    orchestrator: Arc<Orchestrator>,
    /// Shown by /status
    api_base_url: String,
    /// History file path
    history_path: PathBuf,
    /// Render every result as JSON
    raw: bool,
    start_time: Instant,
}

impl Repl {
    pub fn new(orchestrator: Arc<Orchestrator>, api_base_url: String) -> Result<Self> {
        let mut editor = Editor::new()?;
        editor.set_helper(Some(ConsoleHelper::new()));

        Ok(Self {
            editor,
            orchestrator,
            api_base_url,
            history_path: crate::config::home_dir().join("history"),
            raw: false,
            start_time: Instant::now(),
        })
    }

    /// Start in raw JSON mode
    pub fn with_raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Load command history
    fn load_history(&mut self) {
        if self.history_path.exists() {
            let _ = self.editor.load_history(&self.history_path);
        }
    }

    /// Save command history
    fn save_history(&mut self) {
        if let Some(parent) = self.history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = self.editor.save_history(&self.history_path) {
            tracing::debug!("Failed to save history: {}", e);
        }
    }

    /// Run the REPL loop
    pub async fn run(&mut self) -> Result<()> {
        self.load_history();

        println!("Type a query (Ctrl+D to exit, /help for commands)");
        println!("  End a line with \\ to continue it, or wrap a block in \"\"\"");
        println!("  Press Ctrl+C to cancel a running query");
        println!();

        loop {
            let prompt = colors::prompt(&self.orchestrator.selector().await);
            let Some(line) = self.read_input(&prompt)? else {
                println!("Goodbye!");
                break;
            };

            if line.trim().is_empty() {
                continue;
            }
            self.editor.add_history_entry(line.as_str())?;

            match Command::parse(&line) {
                Command::Quit => break,
                Command::Query(text) => self.execute(&text).await,
                command => self.handle_command(command).await,
            }
        }

        self.save_history();
        Ok(())
    }

    /// Read input with multi-line support
    fn read_input(&mut self, prompt: &str) -> Result<Option<String>> {
        let first_line = match self.editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                return Ok(Some(String::new()));
            }
            Err(ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let trimmed = first_line.trim();
        if let Some(after_open) = trimmed.strip_prefix("\"\"\"") {
            if let Some(single) = after_open.strip_suffix("\"\"\"") {
                return Ok(Some(single.to_string()));
            }
            return self.read_block(after_open);
        }
        if trimmed.ends_with('\\') {
            return self.read_continuation(trimmed);
        }

        Ok(Some(first_line))
    }

    /// Read a block delimited by """
    fn read_block(&mut self, after_open: &str) -> Result<Option<String>> {
        let mut lines = Vec::new();
        if !after_open.is_empty() {
            lines.push(after_open.to_string());
        }

        loop {
            match self.editor.readline(colors::continuation_prompt()) {
                Ok(line) => {
                    if let Some(before_close) = line.trim_end().strip_suffix("\"\"\"") {
                        if !before_close.trim().is_empty() {
                            lines.push(before_close.to_string());
                        }
                        break;
                    }
                    lines.push(line);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C (cancelled multi-line)");
                    return Ok(Some(String::new()));
                }
                Err(ReadlineError::Eof) => return Ok(None),
                Err(err) => return Err(err.into()),
            }
        }

        Ok(Some(lines.join("\n")))
    }

    /// Read continuation lines (ending with \)
    fn read_continuation(&mut self, first_line: &str) -> Result<Option<String>> {
        let mut lines = vec![first_line.trim_end_matches('\\').to_string()];

        loop {
            match self.editor.readline(colors::continuation_prompt()) {
                Ok(line) => {
                    let trimmed = line.trim_end();
                    if let Some(head) = trimmed.strip_suffix('\\') {
                        lines.push(head.to_string());
                    } else {
                        lines.push(line);
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C (cancelled multi-line)");
                    return Ok(Some(String::new()));
                }
                Err(ReadlineError::Eof) => return Ok(None),
                Err(err) => return Err(err.into()),
            }
        }

        Ok(Some(lines.join("\n")))
    }

    /// Run one query, cancelling it on Ctrl+C
    async fn execute(&mut self, text: &str) {
        let orchestrator = Arc::clone(&self.orchestrator);
        let started = Instant::now();

        let submission = tokio::select! {
            submission = orchestrator.submit(text) => submission,
            _ = tokio::signal::ctrl_c() => {
                orchestrator.cancel().await;
                Submission::Cancelled
            }
        };

        match submission {
            Submission::Ignored => {}
            Submission::Cancelled => println!("{}", colors::warning("query cancelled")),
            Submission::Finished(outcome) => {
                print!("{}", render::outcome(&outcome, started.elapsed(), self.raw));
            }
        }
    }

    /// Handle slash commands
    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Help => {
                println!("Commands:");
                println!("  /help              - Show this help");
                println!("  /index [name]      - Show or set the index engine");
                println!("  /indexes           - List index engines");
                println!("  /status            - Show connection and pipeline state");
                println!("  /last              - Show the last parsed and dispatched operation");
                println!("  /raw               - Toggle raw JSON output");
                println!("  /version           - Show version info");
                println!("  /quit              - Exit");
            }
            Command::Index(None) => {
                let current = self.orchestrator.selector().await;
                println!("Index engine: {}", colors::engine(&current));
            }
            Command::Index(Some(name)) => self.cmd_index(&name).await,
            Command::Indexes => {
                let current = self.orchestrator.selector().await;
                for selector in IndexSelector::all() {
                    let marker = if selector.as_str() == current { "*" } else { " " };
                    println!("{} {:<12} {}", marker, selector.as_str(), colors::status(selector.label()));
                }
            }
            Command::Status => self.cmd_status().await,
            Command::Last => self.cmd_last().await,
            Command::Raw => {
                self.raw = !self.raw;
                println!("Raw output {}", if self.raw { "on" } else { "off" });
            }
            Command::Version => {
                println!("minidb console v{}", env!("CARGO_PKG_VERSION"));
            }
            Command::Unknown(name) => {
                println!("Unknown command: {}. Try /help", name);
            }
            Command::Quit | Command::Query(_) => {}
        }
    }

    /// /index <name> - Change the index engine
    async fn cmd_index(&self, name: &str) {
        match self.orchestrator.policy().resolve(name) {
            Ok(selector) if selector.as_str() == name.trim().to_ascii_lowercase() => {
                self.orchestrator.set_selector(selector.as_str()).await;
                println!("Index engine: {} ({})", colors::engine(selector.as_str()), selector.label());
            }
            Ok(_) => {
                // Permissive: keep what the user typed, enrichment treats it as "-"
                self.orchestrator.set_selector(name.trim()).await;
                println!(
                    "{}",
                    colors::warning(&format!(
                        "'{}' is not a known index engine; operations will be sent without one",
                        name.trim()
                    ))
                );
            }
            Err(e) => {
                println!("{} ({})", colors::error(&e.to_string()), e.reason());
                println!("Known engines: {}", known_engines());
            }
        }
    }

    /// /status - Show current state
    async fn cmd_status(&self) {
        let state = self.orchestrator.state().await;
        println!("{}", banner_line("API", &self.api_base_url));
        println!("{}", banner_line("Index", &self.orchestrator.selector().await));
        println!(
            "{}",
            banner_line(
                "Policy",
                match self.orchestrator.policy() {
                    SelectorPolicy::Permissive => "permissive",
                    SelectorPolicy::Strict => "strict",
                }
            )
        );
        println!("{}", banner_line("State", state.status_message()));
        println!("{}", banner_line("Output", if self.raw { "raw" } else { "table" }));
        println!(
            "{}",
            banner_line("Uptime", &format!("{}s", self.start_time.elapsed().as_secs()))
        );
    }

    /// /last - Show what the last run parsed and dispatched
    async fn cmd_last(&self) {
        let Some(outcome) = self.orchestrator.latest().await else {
            println!("No query has finished yet.");
            return;
        };

        println!("{} {}", colors::header("query"), outcome.query());
        match outcome.parsed() {
            Some(parsed) => println!(
                "{}\n{}",
                colors::header("parsed"),
                serde_json::to_string_pretty(parsed.as_value()).unwrap_or_default()
            ),
            None => println!("{} -", colors::header("parsed")),
        }
        if let Some(enriched) = outcome.enriched() {
            println!(
                "{}\n{}",
                colors::header("dispatched"),
                serde_json::to_string_pretty(enriched.fields()).unwrap_or_default()
            );
        }
        println!("{} {:?}", colors::header("outcome"), outcome.state());
    }
}

/// Run a single query without the interactive loop.
///
/// Returns the process exit code: 0 when the run completed (or the input
/// was blank), 1 otherwise.
pub async fn run_once(orchestrator: &Orchestrator, text: &str, raw: bool) -> i32 {
    let started = Instant::now();
    match orchestrator.submit(text).await {
        Submission::Ignored => 0,
        Submission::Cancelled => 1,
        Submission::Finished(outcome) => {
            let rendered = render::outcome(&outcome, started.elapsed(), raw);
            if outcome.is_success() {
                print!("{}", rendered);
                0
            } else {
                eprint!("{}", rendered);
                1
            }
        }
    }
}

fn known_engines() -> String {
    IndexSelector::all()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
