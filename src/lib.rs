//! Scout - Web-Search Chat Assistant
//!
//! A terminal chat assistant that answers questions by searching the web
//! through Tavily and reasoning with an OpenAI model. Every answer lists the
//! URLs of the search results the assistant consulted.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: LLM provider abstraction with the OpenAI client and a disk cache
//! - **Tools**: Web search tool and the tool registry
//! - **Agent**: Session, prompt formatting, agent loop and answer extraction
//! - **CLI**: Command-line interface and REPL
//!
//! # Usage
//!
//! ```rust,no_run
//! use scout::{handle_turn, ChatContext, Config, Credentials, Session};
//!
//! #[tokio::main]
//! async fn main() -> scout::Result<()> {
//!     let config = Config::load()?;
//!     let ctx = ChatContext::from_config(&config, &Credentials::from_env()?)?;
//!
//!     let mut session = Session::new();
//!     let outcome = handle_turn(&ctx, &mut session, "Who won the 2022 World Cup?").await;
//!     println!("{}", outcome.reply);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use agent::{handle_turn, ChatContext, Session, TurnOutcome};
pub use cli::Repl;
pub use core::{Config, Credentials, Result, ScoutError};
