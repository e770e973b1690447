//! FL Studio connection check
//!
//! Walks through the connection step by step and prints what it finds.
//! Exits non-zero when the dependency is missing or the connect fails.
//!
//! # Usage
//!
//! ```bash
//! cargo run --features midi-io --bin fl-check
//!
//! # Write out the FL Studio device script
//! cargo run --bin fl-check -- --print-host-script > device_flstudio_mcp.py
//! ```

use flstudio_mcp_core::{
    ChannelApi, ConnectionConfig, ConnectionManager, MidiTransport, MixerApi, Transport,
    TransportApi, HOST_SCRIPT, HOST_SCRIPT_NAME,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const RULE: &str = "============================================================";

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    if std::env::args().any(|arg| arg == "--print-host-script") {
        print!("{}", HOST_SCRIPT);
        return Ok(ExitCode::SUCCESS);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    println!("{}", RULE);
    println!("FL Studio MCP Connection Test");
    println!("{}\n", RULE);

    let config = ConnectionConfig::from_env();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    let transport = Arc::new(MidiTransport::new());

    println!("Step 1: Checking MIDI backend...");
    if let Err(e) = transport.probe() {
        println!("✗ MIDI backend not available: {}", e);
        println!("\nRebuild with: cargo build --features midi-io");
        return Ok(ExitCode::FAILURE);
    }
    println!(
        "✓ MIDI backend available ({})\n",
        transport.version().unwrap_or_else(|| "unknown".to_string())
    );

    let connection = ConnectionManager::with_transport(transport, config);
    let bridge = connection.bridge().clone();
    let transport_api = TransportApi::new(bridge.clone());
    let channel_api = ChannelApi::new(bridge.clone());
    let mixer_api = MixerApi::new(bridge);

    println!("Step 2: Connecting to FL Studio...");
    println!(
        "Ports: '{}' -> '{}'",
        connection.config().request_port,
        connection.config().response_port
    );
    match connection.connect().await {
        Ok(true) => println!("✓ Connected to FL Studio\n"),
        Ok(false) => {
            println!("✗ Failed to connect to FL Studio");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => {
            println!("✗ Connection error: {}", e);
            println!("\nTroubleshooting:");
            println!("1. Make sure FL Studio is running");
            println!(
                "2. Install {} under Settings/Hardware/FL Studio MCP/ (fl-check --print-host-script)",
                HOST_SCRIPT_NAME
            );
            println!("   and select \"FL Studio MCP\" as the controller type on the request port");
            println!("3. Check FLAPI_REQUEST_PORT / FLAPI_RESPONSE_PORT match your MIDI ports");
            return Ok(ExitCode::FAILURE);
        }
    }

    println!("Step 3: Connection status...");
    println!(
        "✓ {}\n",
        serde_json::to_string_pretty(&connection.connection_status())?
    );

    println!("Step 4: Project information...");
    println!("✓ Tempo: {} BPM", transport_api.tempo().await);
    println!("✓ Channels: {}", channel_api.count().await);
    println!("✓ Mixer tracks: {}\n", mixer_api.track_count().await);

    println!("Step 5: Channels...");
    let channels = channel_api.all().await;
    println!("✓ Found {} channels:", channels.len());
    for channel in channels.iter().take(5) {
        println!("  - {} (ID: {}, {})", channel.name, channel.id, channel.color);
    }
    if channels.len() > 5 {
        println!("  ... and {} more", channels.len() - 5);
    }
    println!();

    println!("Step 6: Transport status...");
    let status = transport_api.status().await;
    println!("✓ Playing: {}", status.playing);
    println!("✓ Recording: {}", status.recording);
    println!("✓ Position: {} beats\n", status.position_beats);

    println!("Step 7: Mixer levels...");
    let levels = mixer_api.all_levels().await;
    println!("✓ Found {} mixer tracks:", levels.len());
    for track in levels.iter().take(3) {
        println!(
            "  - {}: Vol={:.2}, Pan={:.2}",
            track.name, track.volume, track.pan
        );
    }
    if levels.len() > 3 {
        println!("  ... and {} more", levels.len() - 3);
    }
    println!();

    println!("Step 8: Health check...");
    let healthy = connection.health_check().await;
    if healthy {
        println!("✓ Connection is healthy\n");
    } else {
        println!("✗ Connection health check failed\n");
    }

    connection.disconnect().await;
    println!("✓ Disconnected\n");

    println!("{}", RULE);
    println!("All checks completed!");
    println!("{}", RULE);

    Ok(if healthy {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
