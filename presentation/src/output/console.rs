//! Console rendering of chat sessions

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use toolrelay_application::ChatObserver;
use toolrelay_domain::util::{json_preview, truncate_str};
use toolrelay_domain::{ConnectionError, ContentBlock, ModelTurn, ToolResult};

/// Renders chat progress to the terminal.
///
/// Implements [`ChatObserver`] so the provider group and the conversation
/// loop report through it. A spinner runs while a model request is in
/// flight unless `show_progress` is off.
pub struct ConsoleReporter {
    show_progress: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl ConsoleReporter {
    pub fn new(show_progress: bool) -> Self {
        Self {
            show_progress,
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn start_spinner(&self, message: String) {
        if !self.show_progress {
            return;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Ok(mut slot) = self.spinner.lock()
            && let Some(old) = slot.replace(pb)
        {
            old.finish_and_clear();
        }
    }

    fn stop_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_and_clear();
        }
    }

    /// Format one model turn for display.
    pub fn format_turn(turn: &ModelTurn) -> String {
        let mut output = String::new();
        for block in &turn.content {
            match block {
                ContentBlock::Text(text) if !text.trim().is_empty() => {
                    output.push_str(&format!("{} {}\n", "Assistant:".green().bold(), text.trim()));
                }
                ContentBlock::ToolUse(tool_use) => {
                    output.push_str(&format!(
                        "  {} {} {}\n",
                        "->".yellow(),
                        tool_use.name.yellow().bold(),
                        json_preview(&tool_use.input, 120).dimmed()
                    ));
                }
                _ => {}
            }
        }
        output
    }

    pub fn print_error(message: &str) {
        eprintln!("{} {}", "Error:".red().bold(), message);
    }

    pub fn print_warning(message: &str) {
        eprintln!("{} {}", "Warning:".yellow().bold(), message);
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ChatObserver for ConsoleReporter {
    fn on_provider_started(&self, provider: &str) {
        println!("{} {}", "started".green(), provider.bold());
    }

    fn on_provider_stopped(&self, provider: &str, error: Option<&ConnectionError>) {
        match error {
            None => println!("{} {}", "stopped".dimmed(), provider),
            Some(e) => println!("{} {}: {}", "stopped".red(), provider, e),
        }
    }

    fn on_user_turn(&self, utterance: &str) {
        println!();
        println!("{} {}", "User:".cyan().bold(), utterance);
    }

    fn on_model_requested(&self, tool_count: usize) {
        self.start_spinner(format!("Thinking ({} tools available)...", tool_count));
    }

    fn on_tool_invoked(&self, provider: &str, tool_name: &str, _invocation_id: &str) {
        if self.show_progress {
            println!(
                "  {} {} {}",
                "<-".dimmed(),
                tool_name,
                format!("via {}", provider).dimmed()
            );
        }
    }

    fn on_tool_failed(&self, tool_name: &str, result: &ToolResult) {
        println!(
            "  {} {}: {}",
            "x".red(),
            tool_name.red(),
            truncate_str(&result.text(), 200)
        );
    }

    fn on_turn_completed(&self, turn: &ModelTurn) {
        self.stop_spinner();
        print!("{}", Self::format_turn(turn));
    }
}
