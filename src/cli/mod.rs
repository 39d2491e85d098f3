//! CLI argument parsing and command routing

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ai-bridge: stream a reply from an LLM backend
#[derive(Debug, Parser)]
#[command(name = "ai-bridge")]
#[command(about = "Stream a reply from an LLM backend", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (defaults to <config_dir>/ai-bridge/config.json)
    #[arg(long, global = true, env = "AI_BRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Send a prompt and stream the reply
    Chat {
        /// Provider to use (google, openai_responses)
        #[arg(short, long)]
        provider: Option<String>,

        /// System message sent before the prompt
        #[arg(short, long)]
        system: Option<String>,

        /// Provider option override, repeatable
        #[arg(short = 'o', long = "option", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        options: Vec<(String, String)>,

        /// The prompt
        prompt: String,
    },

    /// List available providers
    Providers,
}

impl Cli {
    /// Parse CLI arguments from environment
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got `{s}`")),
    }
}
