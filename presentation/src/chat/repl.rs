//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::output::console::ConsoleReporter;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::path::PathBuf;
use toolrelay_application::{ChatError, ConversationLoop};
use toolrelay_domain::ContentBlock;

const HISTORY_CAPACITY: usize = 1000;

/// What the REPL should do after a slash command
#[derive(Debug, PartialEq, Eq)]
enum CommandOutcome {
    Continue,
    Exit,
}

/// Interactive chat REPL over an open conversation loop
#[derive(Default)]
pub struct ChatRepl {
    history_path: Option<PathBuf>,
}

impl ChatRepl {
    pub fn new() -> Self {
        Self {
            history_path: dirs::data_dir().map(|p| p.join("toolrelay").join("history.txt")),
        }
    }

    /// Override where line history is persisted (`None` keeps it in memory)
    pub fn with_history_path(mut self, path: Option<PathBuf>) -> Self {
        self.history_path = path;
        self
    }

    fn editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = &self.history_path else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                ConsoleReporter::print_warning(&format!("History disabled: {}", e));
                editor
            }
        }
    }

    /// Run the interactive REPL until the user exits or the session fails.
    ///
    /// Model output is rendered by the loop's observer; this only reports
    /// errors and handles slash commands.
    pub async fn run(&self, chat: &mut ConversationLoop<'_>) -> std::io::Result<()> {
        let mut editor = self.editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("toolrelay".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome(chat);

        loop {
            match editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(line, chat).await == CommandOutcome::Exit {
                            break;
                        }
                        continue;
                    }

                    match chat.send(line).await {
                        Ok(_) => println!(),
                        Err(ChatError::SessionTerminated) => {
                            ConsoleReporter::print_error(
                                "The session was terminated by an earlier error",
                            );
                            break;
                        }
                        Err(e) => {
                            ConsoleReporter::print_error(&e.to_string());
                            break;
                        }
                    }
                }
                Signal::CtrlC => {
                    println!("^C");
                    continue;
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
                #[allow(unreachable_patterns)]
                _ => continue,
            }
        }

        Ok(())
    }

    fn print_welcome(&self, chat: &ConversationLoop<'_>) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│             toolrelay - Chat Mode           │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Model:   {}", chat.model_id());
        let servers = chat.group().provider_names();
        if servers.is_empty() {
            println!("Servers: (none)");
        } else {
            println!("Servers: {}", servers.join(", "));
        }
        println!();
        print_help();
    }

    async fn handle_command(&self, cmd: &str, chat: &ConversationLoop<'_>) -> CommandOutcome {
        match cmd {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                CommandOutcome::Exit
            }
            "/help" | "/h" | "/?" => {
                print_help();
                CommandOutcome::Continue
            }
            "/tools" => {
                match chat.group().list_all_tools().await {
                    Ok(tools) if tools.is_empty() => println!("No tools available"),
                    Ok(tools) => {
                        println!();
                        for tool in tools {
                            println!("  {:<24} {}", tool.name, tool.description);
                        }
                        println!();
                    }
                    Err(e) => ConsoleReporter::print_error(&e.to_string()),
                }
                CommandOutcome::Continue
            }
            "/history" => {
                print_history(chat);
                CommandOutcome::Continue
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                CommandOutcome::Continue
            }
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /help, /h, /?     - Show this help");
    println!("  /tools            - List tools offered by the servers");
    println!("  /history          - Show the conversation so far");
    println!("  /quit, /exit, /q  - Exit chat");
    println!();
}

fn print_history(chat: &ConversationLoop<'_>) {
    let turns = chat.conversation().turns();
    if turns.is_empty() {
        println!("(empty conversation)");
        return;
    }
    println!();
    for turn in turns {
        for block in &turn.content {
            let line = match block {
                ContentBlock::Text(text) => text.clone(),
                ContentBlock::ToolUse(tool_use) => format!("[tool call] {}", tool_use.name),
                ContentBlock::ToolResult(result) => {
                    format!("[tool result {}] {}", result.status, result.tool_use_id)
                }
            };
            println!("{:>9}: {}", turn.role.as_str(), line);
        }
    }
    println!();
}
