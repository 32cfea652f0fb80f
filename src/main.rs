//! Scout - Web-Search Chat Assistant
//!
//! Main entry point for the CLI application.

use clap::Parser;
use scout::{handle_turn, ChatContext, Config, Credentials, Repl, Session};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Scout - Web-Search Chat Assistant
#[derive(Parser, Debug)]
#[command(name = "scout")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model to use; repeat to set fallbacks in order
    #[arg(long, short = 'm')]
    model: Vec<String>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Do not read or write cached LLM responses
    #[arg(long)]
    no_cache: bool,

    /// Maximum automatic replies per question
    #[arg(long)]
    max_replies: Option<usize>,

    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,
}

fn init_tracing(debug: bool) {
    let default = if debug { "scout=debug" } else { "scout=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration
    let mut config = Config::load()?;

    // Apply CLI overrides
    if !args.model.is_empty() {
        config.set_models(args.model.clone());
    }

    if args.debug {
        config.agent.debug = true;
    }

    if args.no_cache {
        config.cache.enabled = false;
    }

    if let Some(max_replies) = args.max_replies {
        config.agent.max_consecutive_auto_reply = max_replies;
    }

    init_tracing(config.agent.debug);

    // Both keys must be present before any input is accepted
    let credentials = Credentials::from_env()?;
    let ctx = ChatContext::from_config(&config, &credentials)?;

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        let mut session = Session::new();
        let outcome = handle_turn(&ctx, &mut session, &prompt).await;
        println!("{}", outcome.reply);
        return Ok(());
    }

    // Interactive REPL mode
    let mut repl = Repl::new(ctx, config);
    repl.run().await?;

    Ok(())
}
