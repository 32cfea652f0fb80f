//! CLI commands
//!
//! Special commands that can be executed in the REPL.

use crate::agent::chat::render_turn;
use crate::cli::repl::Repl;

/// Result of parsing a command
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Continue processing as normal input
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
    /// Start a new session
    Clear,
}

/// Parse and handle special commands
pub fn handle_command(input: &str, repl: &mut Repl) -> CommandResult {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0].trim_start_matches('/').to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    // Questions that merely start with a command word go to the assistant
    let is_open = cmd == "open" && args.parse::<usize>().is_ok();
    if !args.is_empty() && !is_open {
        return CommandResult::Continue(input.to_string());
    }

    match cmd.as_str() {
        "exit" | "quit" | "q" => CommandResult::Exit,

        "clear" | "reset" => {
            repl.new_session();
            CommandResult::Clear
        }

        "help" | "?" => CommandResult::Handled(help_text()),

        "history" => {
            let session = repl.session();
            if session.is_empty() {
                CommandResult::Handled("No messages yet.".to_string())
            } else {
                CommandResult::Handled(
                    session
                        .turns()
                        .iter()
                        .map(render_turn)
                        .collect::<Vec<_>>()
                        .join("\n\n"),
                )
            }
        }

        "sources" => {
            let sources = repl.last_sources();
            if sources.is_empty() {
                CommandResult::Handled("The last answer cited no sources.".to_string())
            } else {
                CommandResult::Handled(
                    sources
                        .iter()
                        .enumerate()
                        .map(|(i, url)| format!("  [{}] {}", i + 1, url))
                        .collect::<Vec<_>>()
                        .join("\n"),
                )
            }
        }

        "open" => CommandResult::Handled(open_source(args, repl.last_sources())),

        "status" => {
            let config = repl.config();
            CommandResult::Handled(format!(
                "Scout Status:\n\
                 ─────────────────────────────\n\
                 Models:       {}\n\
                 Search depth: {}\n\
                 Max replies:  {}\n\
                 Cache:        {}\n\
                 History:      {} turns",
                config.models.config_list.join(", "),
                config.search.search_depth,
                config.agent.max_consecutive_auto_reply,
                if config.cache.enabled {
                    let dir = config.cache.dir.join(config.cache.seed.to_string());
                    format!("on ({})", dir.display())
                } else {
                    "off".to_string()
                },
                repl.session().len()
            ))
        }

        _ => {
            if input.starts_with('/') {
                CommandResult::Handled(format!(
                    "Unknown command: {}. Type 'help' for available commands.",
                    cmd
                ))
            } else {
                CommandResult::Continue(input.to_string())
            }
        }
    }
}

/// Open the n-th (1-based) source of the last answer in the browser
fn open_source(args: &str, sources: &[String]) -> String {
    let index = match args.parse::<usize>() {
        Ok(n) if n >= 1 && n <= sources.len() => n - 1,
        _ if sources.is_empty() => return "The last answer cited no sources.".to_string(),
        _ => return format!("Usage: open <1-{}>", sources.len()),
    };

    let url = &sources[index];
    match webbrowser::open(url) {
        Ok(()) => format!("Opened {}", url),
        Err(e) => format!("Could not open {}: {}", url, e),
    }
}

/// Generate help text
fn help_text() -> String {
    r#"Scout Commands:
─────────────────────────────────────────────
  help, ?          Show this help message
  exit, quit, q    Exit Scout
  clear, reset     Start a new conversation
  history          Show the whole conversation
  sources          List the sources of the last answer
  open <n>         Open source n in your browser
  status           Show current configuration

Anything else is sent to the assistant, which searches
the web and answers with the sources it used.

Keyboard Shortcuts:
  Ctrl+C           Quit immediately
  Ctrl+D           Exit Scout
─────────────────────────────────────────────"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentBackend, ChatContext};
    use crate::core::{AgentResponse, Config, Result, Turn};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Unused;

    #[async_trait]
    impl AgentBackend for Unused {
        async fn run(&self, _prompt: &str, _history: &[Turn]) -> Result<AgentResponse> {
            Ok(AgentResponse::default())
        }

        fn termination_marker(&self) -> &str {
            "TERMINATE"
        }
    }

    fn repl() -> Repl {
        Repl::new(ChatContext::new(Arc::new(Unused)), Config::default())
    }

    #[test]
    fn test_exit_and_help() {
        let mut repl = repl();
        assert_eq!(handle_command("quit", &mut repl), CommandResult::Exit);
        assert_eq!(handle_command("/exit", &mut repl), CommandResult::Exit);
        assert!(matches!(
            handle_command("help", &mut repl),
            CommandResult::Handled(t) if t.contains("sources")
        ));
    }

    #[test]
    fn test_plain_text_continues() {
        let mut repl = repl();
        assert_eq!(
            handle_command("  who won the 2022 world cup? ", &mut repl),
            CommandResult::Continue("who won the 2022 world cup?".to_string())
        );
    }

    #[test]
    fn test_command_words_inside_questions_continue() {
        let mut repl = repl();
        assert_eq!(
            handle_command("status of the Artemis mission", &mut repl),
            CommandResult::Continue("status of the Artemis mission".to_string())
        );
        assert_eq!(
            handle_command("open source licenses explained", &mut repl),
            CommandResult::Continue("open source licenses explained".to_string())
        );
    }

    #[test]
    fn test_open_without_sources() {
        let mut repl = repl();
        assert_eq!(
            handle_command("open 1", &mut repl),
            CommandResult::Handled("The last answer cited no sources.".to_string())
        );
    }

    #[test]
    fn test_unknown_slash_command() {
        let mut repl = repl();
        assert!(matches!(
            handle_command("/frobnicate", &mut repl),
            CommandResult::Handled(t) if t.starts_with("Unknown command: frobnicate")
        ));
    }

    #[tokio::test]
    async fn test_history_and_clear() {
        let mut repl = repl();
        repl.submit("hello").await;

        match handle_command("history", &mut repl) {
            CommandResult::Handled(text) => {
                assert!(text.starts_with("User:\nhello"));
                assert!(text.contains("Assistant:"));
            }
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(handle_command("clear", &mut repl), CommandResult::Clear);
        assert!(repl.session().is_empty());
    }

    #[test]
    fn test_open_validates_index() {
        let sources = vec!["http://a".to_string()];
        assert_eq!(open_source("7", &sources), "Usage: open <1-1>");
        assert_eq!(open_source("x", &[]), "The last answer cited no sources.");
    }
}
