use clap::Parser;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;

use clyde::config::Config;
use clyde::gateway::dispatcher::{Event, EventDispatcher};
use clyde::gateway::{intents, GatewayConnection};

/// Minimal gateway bot: connects, identifies, and logs messages as
/// they arrive.
#[derive(Parser)]
#[command(name = "clyde", version)]
struct Cli {
    /// Gateway URL (overrides CLYDE_GATEWAY_URL).
    #[arg(long)]
    gateway_url: Option<String>,
    /// Intent names or bitmask (overrides CLYDE_INTENTS).
    #[arg(long)]
    intents: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clyde=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(url) = cli.gateway_url {
        config.gateway_url = url;
    }
    if let Some(spec) = cli.intents {
        config.intents = intents::parse_spec(&spec)
            .expect("--intents must be a bitmask or comma-separated intent names");
    }

    print_banner(&config);

    let dispatcher = EventDispatcher::new();
    let mut events = dispatcher.subscribe();

    let conn = GatewayConnection::connect(&config, dispatcher)
        .await
        .expect("failed to open gateway connection");
    let handle = conn.handle();
    let mut session = tokio::spawn(conn.run());

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(Event::MessageCreate(msg)) => {
                        let latency = handle
                            .latency()
                            .map(|d| format!("{}ms", d.as_millis()))
                            .unwrap_or_else(|| "-".to_string());
                        tracing::info!(
                            channel = %msg.channel_id,
                            seq = handle.sequence(),
                            latency = %latency,
                            "{}: {}",
                            msg.author.display_name(),
                            msg.content
                        );
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("event subscriber lagged, skipped {skipped} events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            result = &mut session => {
                match result {
                    Ok(Ok(())) => tracing::info!("session finished"),
                    Ok(Err(e)) => tracing::error!("session ended: {e}"),
                    Err(e) => tracing::error!("session task failed: {e}"),
                }
                break;
            }
            _ = shutdown_signal() => {
                tracing::info!("shutting down");
                session.abort();
                break;
            }
        }
    }
}

fn print_banner(config: &Config) {
    let version = env!("CARGO_PKG_VERSION");

    eprintln!();
    eprintln!("  \x1b[1;36mclyde\x1b[0m \x1b[2mv{version}\x1b[0m");
    eprintln!();
    eprintln!("  \x1b[2mgateway\x1b[0m      {}", config.gateway_url);
    eprintln!("  \x1b[2mintents\x1b[0m      {:#x}", config.intents);
    eprintln!();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
