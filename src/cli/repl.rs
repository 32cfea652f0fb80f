//! Interactive REPL for Scout
//!
//! Provides the main user interaction loop.

use std::io::{self, BufRead, Write};

use crate::agent::{handle_turn, ChatContext, Session, TurnOutcome};
use crate::cli::commands::{handle_command, CommandResult};
use crate::core::{Config, Result};

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    ctx: ChatContext,
    config: Config,
    session: Session,
    last_sources: Vec<String>,
}

impl Repl {
    /// Create a REPL with a fresh session
    pub fn new(ctx: ChatContext, config: Config) -> Self {
        Self {
            ctx,
            config,
            session: Session::new(),
            last_sources: Vec::new(),
        }
    }

    /// Current conversation
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// URLs cited by the most recent answer
    pub fn last_sources(&self) -> &[String] {
        &self.last_sources
    }

    /// Drop the current conversation and start over
    pub fn new_session(&mut self) {
        self.session = Session::new();
        self.last_sources.clear();
        tracing::info!("started new session");
    }

    /// Send a message to the assistant and remember the cited sources
    pub async fn submit(&mut self, input: &str) -> TurnOutcome {
        let outcome = handle_turn(&self.ctx, &mut self.session, input).await;
        if let Some(extracted) = &outcome.extracted {
            self.last_sources = extracted.urls.clone();
        }
        outcome
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            // Print prompt
            print!("You: ");
            stdout.flush()?;

            // Read input
            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            let input = input.trim();

            if input.is_empty() {
                continue;
            }

            match handle_command(input, self) {
                CommandResult::Exit => {
                    println!("\nGoodbye!");
                    break;
                }
                CommandResult::Clear => {
                    println!("Conversation cleared.\n");
                }
                CommandResult::Handled(output) => {
                    println!("{}\n", output);
                }
                CommandResult::Continue(input) => {
                    print!("Searching...");
                    stdout.flush()?;
                    let outcome = self.submit(&input).await;
                    println!("\r\nAssistant:\n{}\n", outcome.reply);
                }
            }
        }

        Ok(())
    }

    /// Print the startup banner
    fn print_banner(&self) {
        let config = &self.config;

        println!(
            r#"
╔═══════════════════════════════════════════╗
║                                           ║
║   Scout                                   ║
║   Web-search assistant with sources       ║
║                                           ║
╚═══════════════════════════════════════════╝
"#
        );
        println!("Models:       {}", config.models.config_list.join(", "));
        println!("Search:       {} ({})", config.search.base_url, config.search.search_depth);
        println!("Cache:        {}", if config.cache.enabled { "on" } else { "off" });
        println!();
        println!("Commands: help, clear, history, sources, open <n>, status, exit");
        println!("─────────────────────────────────────────────");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentBackend;
    use crate::core::{AgentResponse, HistoryEntry, Role, ToolResponse, Turn};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Cited;

    #[async_trait]
    impl AgentBackend for Cited {
        async fn run(&self, _prompt: &str, _history: &[Turn]) -> Result<AgentResponse> {
            Ok(AgentResponse {
                chat_history: vec![
                    HistoryEntry::tool_results(
                        "User",
                        vec![ToolResponse::new(
                            "c1",
                            r#"[{"url":"https://a.example"},{"url":"https://b.example"}]"#,
                        )],
                    ),
                    HistoryEntry::text(Role::Assistant, "Assistant", "Final Answer: yes TERMINATE"),
                ],
                ..Default::default()
            })
        }

        fn termination_marker(&self) -> &str {
            "TERMINATE"
        }
    }

    #[tokio::test]
    async fn test_submit_tracks_sources_until_reset() {
        let mut repl = Repl::new(ChatContext::new(Arc::new(Cited)), Config::default());

        let outcome = repl.submit("is it?").await;
        assert!(outcome.reply.starts_with("yes\n\nSources:"));
        assert_eq!(repl.last_sources(), ["https://a.example", "https://b.example"]);
        assert_eq!(repl.session().len(), 2);

        repl.new_session();
        assert!(repl.last_sources().is_empty());
        assert!(repl.session().is_empty());
    }
}
