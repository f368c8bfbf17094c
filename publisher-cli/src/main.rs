use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use publisher_client::{
    ClientConfig, Session, SessionExit, SignalingChannel, WebRtcPipeline, missing_capabilities,
};
use publisher_core::Identity;
use publisher_core::utils::{APP_KEY, DEFAULT_SERVER_URL, DEFAULT_STUN_ADDR};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

/// Publishes a synthetic audio/video stream to a WebRTC media server.
#[derive(Parser, Debug)]
#[command(name = "publisher", version)]
struct Args {
    /// Peer id or stream name to publish as. A random peer id when omitted.
    identity: Option<String>,

    /// Signaling server WebSocket URL.
    #[arg(long, env = "PUBLISHER_SERVER", default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Do not verify the server certificate or host name.
    #[arg(long)]
    disable_ssl: bool,

    /// Application key announced on connect.
    #[arg(long, env = "PUBLISHER_APP_KEY", default_value = APP_KEY)]
    app_key: String,

    /// STUN/TURN server URL. May be repeated.
    #[arg(long = "ice-server", default_values_t = [DEFAULT_STUN_ADDR.to_string()])]
    ice_servers: Vec<String>,
}

impl Args {
    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            app_key: self.app_key.clone(),
            ice_servers: self.ice_servers.clone(),
            ..ClientConfig::new(Some(self.server.clone()), self.disable_ssl)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(exit) => {
            info!("Exiting: {:?}", exit);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<SessionExit> {
    let config = args.client_config();

    let missing = missing_capabilities(&config.transport_config())
        .await
        .context("Capability check failed")?;
    if !missing.is_empty() {
        for name in &missing {
            eprintln!("{} {}", "missing:".yellow().bold(), name);
        }
        anyhow::bail!("Required WebRTC features are unavailable: {}", missing.join(", "));
    }

    let identity = Identity::from_name(args.identity);
    info!("Publishing as {} to {}", identity, config.server_url);

    let mut channel = SignalingChannel::connect(&config)
        .await
        .with_context(|| format!("Failed to connect to {}", config.server_url))?;
    let inbound = channel.receive()?;

    let session = Session::new(
        identity,
        Arc::new(channel.sender()),
        Arc::new(WebRtcPipeline::new(config.transport_config())),
    );
    let exit = session.run(inbound).await?;

    if let Err(e) = channel.sender().close().await {
        tracing::debug!("Signaling close: {}", e);
    }
    Ok(exit)
}
