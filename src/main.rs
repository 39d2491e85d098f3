//! ai-bridge binary entry point

use std::{io::Write, sync::Arc};

use ai_bridge::{
    cli::{Cli, Commands},
    config::{HostSettings, OptionValue, Options, ProviderKind},
    create_provider,
    logging::{LogSink, ProviderLoggers},
    utils::EnvUtils,
    ChunkKind, CommandType, Message, ProviderContext,
};
use color_eyre::Result;
use futures::StreamExt;

#[tokio::main]
async fn main() -> Result<()> {
    // Install error handler
    color_eyre::install()?;
    dotenv::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Set up logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("ai_bridge=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    let settings = match &cli.config {
        Some(path) => HostSettings::load_from_path(path)?,
        None => HostSettings::load()?,
    };

    match cli.command {
        Commands::Chat {
            provider,
            system,
            options,
            prompt,
        } => {
            let kind = match provider {
                Some(name) => name.parse::<ProviderKind>()?,
                None => settings.provider.unwrap_or(ProviderKind::Google),
            };
            let overrides: Options = options
                .into_iter()
                .map(|(key, value)| (key, OptionValue::Text(value)))
                .collect();

            let mut messages = Vec::new();
            if let Some(system) = system {
                messages.push(Message::system(system));
            }
            messages.push(Message::user(prompt));

            chat(&settings, kind, &overrides, &messages).await?;
        }
        Commands::Providers => {
            for kind in ProviderKind::ALL {
                println!("{kind}");
            }
        }
    }

    Ok(())
}

async fn chat(
    settings: &HostSettings,
    kind: ProviderKind,
    overrides: &Options,
    messages: &[Message],
) -> Result<()> {
    let context = ProviderContext::new(
        CommandType::Chat,
        Arc::new(EnvUtils::new(LogSink::Disabled)),
        ProviderLoggers::new(&settings.logging),
    );
    let provider = create_provider(kind, context, &settings.defaults_for(kind), overrides)?;
    let mut stream = provider.request(messages)?;

    let mut stdout = std::io::stdout();
    loop {
        tokio::select! {
            item = stream.next() => {
                let Some(chunk) = item else { break };
                let chunk = chunk?;
                match chunk.kind {
                    ChunkKind::Assistant => {
                        write!(stdout, "{}", chunk.content)?;
                        stdout.flush()?;
                    }
                    ChunkKind::Thinking => eprint!("{}", chunk.content),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("interrupted, closing stream");
                break;
            }
        }
    }
    writeln!(stdout)?;

    Ok(())
}
