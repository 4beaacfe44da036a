//! TPAccept Server
//!
//! Demo host for the teleport-request plugin. Drives a scripted session
//! through the plugin hooks and logs what players would see.

use anyhow::{Context, Result};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tpaccept::{
    PlayerSlot, RequestConfig, TpaPlugin, WorldPosition, VERSION,
    game::{events::RequestEvent, table::TickResult},
    host::{InMemoryHost, registry::PERMISSION_USE},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let config = RequestConfig::from_env().context("Invalid TPA_* environment")?;

    info!("TPAccept Server v{}", VERSION);
    info!("Tick Rate: {} Hz", config.tick_rate);
    info!(
        "Request Window: {} ticks ({} seconds)",
        config.request_duration_ticks,
        config.request_duration_secs()
    );

    demo_session(config).await
}

/// Scripted session covering accept, overwrite, expiry and slot reuse.
async fn demo_session(config: RequestConfig) -> Result<()> {
    info!("=== Starting Demo Session ===");

    let duration = config.request_duration_ticks;
    let plugin = TpaPlugin::initialize(config.clone());
    let mut host = InMemoryHost::new(config.max_players);

    let alice = PlayerSlot::new(0);
    let bob = PlayerSlot::new(1);
    let carol = PlayerSlot::new(2);

    for (slot, name, x) in [(alice, "Alice", 100.0), (bob, "Bob", 200.0), (carol, "Carol", 300.0)] {
        plugin.on_greet(slot).await;
        host.join(slot, name, WorldPosition::new(x, 50.0));
        host.grant(slot, PERMISSION_USE);
        info!("Player {} joined at {}", name, slot);
    }

    // Bob asks, Alice accepts
    plugin.on_chat_command(&mut host, bob, "tpa", &["Alice"]).await;
    step(&plugin, &mut host, 30).await?;
    let accepted = plugin.on_chat_command(&mut host, alice, "tpa", &[]).await;
    info!("Alice accepts: {:?}", accepted);

    // Carol's request replaces Bob's, then runs out
    plugin.on_chat_command(&mut host, bob, "tpa", &["Alice"]).await;
    plugin.on_chat_command(&mut host, carol, "tpa", &["Alice"]).await;
    step(&plugin, &mut host, duration).await?;

    // Alice reconnects as someone else before accepting
    plugin.on_chat_command(&mut host, bob, "tpa", &["Alice"]).await;
    host.leave(alice);
    plugin.on_leave(alice).await;
    plugin.on_greet(alice).await;
    host.join(alice, "Dave", WorldPosition::ORIGIN);
    host.grant(alice, PERMISSION_USE);
    let stale = plugin.on_chat_command(&mut host, alice, "tpa", &[]).await;
    info!("Dave tries to accept: {:?}", stale);

    info!("=== Messages ===");
    for message in host.messages() {
        info!("[{:?}] to {}: {}", message.kind, message.name, message.text);
    }
    info!(
        "Teleports performed: {}, sessions online: {}",
        host.teleports().len(),
        host.session_count()
    );

    plugin.dispose().await;
    Ok(())
}

/// Run `ticks` game updates and log the events they produce.
async fn step(plugin: &TpaPlugin, host: &mut InMemoryHost, ticks: u32) -> Result<()> {
    for _ in 0..ticks {
        let TickResult { events, .. } = plugin.on_game_update(host).await;
        log_events(&events)?;
    }

    let pending = plugin.table().with(|t| t.take_events()).await;
    log_events(&pending)
}

fn log_events(events: &[RequestEvent]) -> Result<()> {
    for event in events {
        let json = serde_json::to_string(event)?;
        if event.is_terminal() {
            info!("event at {}: {}", event.target(), json);
        } else {
            debug!("event at {}: {}", event.target(), json);
        }
    }
    Ok(())
}
