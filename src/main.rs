use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use prompt_stream::memory::MemoryStats;
use prompt_stream::{
    ClientConfig, ContentPart, PromptClient, PromptError, PromptOptions, StaticSession,
    StreamHandler, ToolCallInfo,
};
use serde_json::Value;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prompt-stream", version, about = "Stream a prompt from the chat backend")]
struct Cli {
    /// TOML config file; environment variables are used when omitted
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send a prompt and print the answer as it streams
    Prompt(PromptArgs),
    /// Stop the active stream for the current user
    Cancel,
}

#[derive(Args)]
struct PromptArgs {
    /// Prompt text
    text: String,

    /// Image URLs appended after the text, in order
    #[arg(long = "image")]
    images: Vec<String>,

    #[arg(long, default_value = "")]
    personality: String,

    /// Pre-rendered memory stats text
    #[arg(long, conflicts_with = "memory_stats_file")]
    memory_stats: Option<String>,

    /// JSON file with `total_memory_count` and `top_subjects`
    #[arg(long)]
    memory_stats_file: Option<String>,
}

/// Prints deltas to stdout and everything else to stderr
struct TerminalHandler {
    stdout: std::io::Stdout,
}

impl StreamHandler for TerminalHandler {
    fn on_text(&mut self, delta: &str) {
        let _ = write!(self.stdout, "{}", delta);
        let _ = self.stdout.flush();
    }

    fn on_pair_id(&mut self, id: &str) {
        eprintln!("[pair {}]", id);
    }

    fn on_image_partial(&mut self, index: f64, b64: &str) {
        eprintln!("[image {} partial, {} bytes]", index, b64.len());
    }

    fn on_image_completed(&mut self, url: &str) {
        eprintln!("[image {}]", url);
    }

    fn on_tool_calls(&mut self, calls: &[Value]) {
        for call in calls.iter().map(ToolCallInfo::from_value) {
            eprintln!("[tool {} {} ({} args)]", call.id, call.name, call.args.len());
        }
    }
}

fn load_config(path: Option<&str>) -> Result<ClientConfig> {
    let config = match path {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::from_env()?,
    };
    if config.device_id.is_none() {
        warn!("No device id configured; using a generated one for this run only");
    }
    Ok(config)
}

fn load_memory_stats(path: &str) -> Result<MemoryStats> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read memory stats file {}", path))?;
    serde_json::from_str(&contents).context("Failed to parse memory stats")
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;
    let sessions = Arc::new(StaticSession::from_env().context("Failed to load credentials")?);
    let client = PromptClient::new(config, sessions)?;

    match cli.command {
        Command::Prompt(args) => {
            let mut input = vec![ContentPart::text(args.text)];
            input.extend(args.images.into_iter().map(ContentPart::image));

            let mut options = PromptOptions::new(input).with_personality_summary(args.personality);
            options.memory_stats = match args.memory_stats_file {
                Some(path) => Some(load_memory_stats(&path)?.to_prompt()),
                None => args.memory_stats,
            };

            let handler = TerminalHandler {
                stdout: std::io::stdout(),
            };
            match client.prompt(options, handler).await {
                Ok(_) => {
                    println!();
                    Ok(ExitCode::SUCCESS)
                }
                Err(PromptError::PaymentRequired) => {
                    eprintln!("Payment required. Please check your token balance.");
                    Ok(ExitCode::from(2))
                }
                Err(e) => Err(e).context("Prompt failed"),
            }
        }
        Command::Cancel => {
            if client.cancel().await {
                eprintln!("Stopped active stream");
            } else {
                eprintln!("Nothing was stopped");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli).await
}
