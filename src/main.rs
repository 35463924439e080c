#![deny(unsafe_code)]

mod channel;
mod common;
mod config;
mod constants;
mod settings;

use anyhow::Result;
use clap::Parser;
use tracing::Level as TraceLevel;
use tracing_subscriber::FmtSubscriber;

use channel::{AckPolicy, ChannelClient};
use config::HostConfig;
use settings::SettingsStore;

#[derive(Parser)]
#[command(name = "spirit-plugin")]
#[command(version)]
#[command(about = "Demo plugin for the Electron Spirit host", long_about = None)]
struct Cli {
    /// Override the host API port instead of reading api.json
    #[arg(long)]
    port: Option<u16>,

    /// Register a topic context after connecting (older host versions)
    #[arg(long)]
    topic: Option<String>,

    /// Confirm host element-remove/refresh requests instead of declining them
    #[arg(long)]
    confirm_host_requests: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(TraceLevel::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let cli = Cli::parse();

    // Without a port there is no endpoint: config problems are fatal here,
    // before any connection attempt
    let host = match cli.port {
        Some(api_port) => HostConfig { api_port },
        None => HostConfig::load()?,
    };

    let settings = SettingsStore::open(SettingsStore::default_path());

    let policy = if cli.confirm_host_requests {
        AckPolicy::confirm()
    } else {
        AckPolicy::decline()
    };

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime");

    rt.block_on(async {
        let mut client = ChannelClient::new(&host, settings).with_ack_policy(policy);
        if let Some(topic) = cli.topic {
            client = client.with_topic(topic);
        }
        client.run().await
    })
}
