//! SpongeBob CLI chatbot
//!
//! Chats with any OpenAI-compatible chat completions endpoint in character as
//! SpongeBob SquarePants. Credentials are read from `~/.soonerai.env`.
//! Type `:help` at the prompt for the available commands.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::Parser;
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod conversation;
mod providers;
mod repl;
mod session;

use crate::config::{prompts, Config};
use crate::conversation::Conversation;
use crate::providers::{ChatBackend, OpenAICompatConfig, OpenAICompatProvider};
use crate::repl::input::{ChatInput, PipedInput};
use crate::session::ChatSession;

/// SpongeBob CLI chatbot (SoonerAI / OpenAI-compatible).
#[derive(Debug, Parser)]
#[command(name = "spongebob", version, about)]
struct Cli {
    /// How many prior user/assistant pairs to keep
    #[arg(long, default_value_t = 8)]
    max_turns: usize,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.6)]
    temperature: f32,

    /// Override the system prompt
    #[arg(long)]
    system: Option<String>,

    /// Load the persona from a TOML template
    #[arg(long, value_name = "PATH")]
    persona_file: Option<PathBuf>,

    /// Override the base URL from the env file
    #[arg(long)]
    base_url: Option<String>,

    /// Override the model name from the env file
    #[arg(long)]
    model: Option<String>,

    /// Request timeout in seconds (no timeout when unset)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Credential file (defaults to ~/.soonerai.env)
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "spongebob_cli=debug"
    } else {
        "spongebob_cli=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::load(cli.env_file.as_deref())?
        .with_overrides(cli.base_url.as_deref(), cli.model.as_deref())?;
    let system_prompt =
        prompts::resolve_system_prompt(cli.system.as_deref(), cli.persona_file.as_deref()).await?;

    let provider = OpenAICompatProvider::new(
        OpenAICompatConfig::new(&config.base_url, &config.api_key, &config.model)
            .with_temperature(Some(cli.temperature))
            .with_timeout(cli.timeout),
    )?;

    // Each kept turn pair is one user and one assistant message
    let conversation = Conversation::new(system_prompt, cli.max_turns.saturating_mul(2));
    tracing::debug!(
        max_messages = conversation.max_turns(),
        prompt_chars = conversation.system_prompt().len(),
        "history bound"
    );
    let mut session = ChatSession::new(conversation, provider);

    let model = session.backend().model().to_string();
    let endpoint = session.backend().endpoint();

    if io::stdin().is_terminal() {
        let prompt = format!("{} ", style(repl::PROMPT.trim_end()).green().bold());
        let (mut input, mut out) = ChatInput::new(prompt)
            .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;
        repl::write_banner(&mut out, &model, &endpoint)?;
        tracing::debug!(max_turns = cli.max_turns, "starting interactive chat loop");
        repl::run(&mut session, &mut input, &mut out).await?;
    } else {
        let mut out = io::stdout();
        repl::write_banner(&mut out, &model, &endpoint)?;
        tracing::debug!(max_turns = cli.max_turns, "starting piped chat loop");
        let mut input = PipedInput::new(tokio::io::BufReader::new(tokio::io::stdin()));
        repl::run(&mut session, &mut input, &mut out).await?;
    }

    Ok(())
}
