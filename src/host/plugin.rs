//! Plugin Lifecycle
//!
//! Explicitly constructed plugin object that owns the request table and
//! exposes the hooks a host registers: game update, greet, leave and chat
//! command. The table sits behind one coarse lock so hooks may run on
//! separate tasks.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::core::slot::PlayerSlot;
use crate::game::config::RequestConfig;
use crate::game::request::PendingRequest;
use crate::game::table::{RequestTable, TickResult};
use crate::host::command::{self, CommandError, CommandOutcome};
use crate::host::registry::Host;

/// Request table guarded by a single mutex.
///
/// The lock is held for the whole of each operation; everything inside is
/// O(1) except the tick sweep.
#[derive(Clone)]
pub struct SharedRequestTable {
    inner: Arc<Mutex<RequestTable>>,
}

impl SharedRequestTable {
    /// Wrap a table.
    pub fn new(table: RequestTable) -> Self {
        Self {
            inner: Arc::new(Mutex::new(table)),
        }
    }

    /// Run `f` with exclusive access to the table.
    pub async fn with<R>(&self, f: impl FnOnce(&mut RequestTable) -> R) -> R {
        let mut table = self.inner.lock().await;
        f(&mut table)
    }

    /// Copy of the request pending for `slot`.
    pub async fn check(&self, slot: PlayerSlot) -> Option<PendingRequest> {
        self.inner.lock().await.check(slot).cloned()
    }

    /// Number of pending requests.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Whether nothing is pending.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Age all requests by one tick.
    pub async fn tick<H: Host + ?Sized>(&self, host: &mut H) -> TickResult {
        self.inner.lock().await.tick(host)
    }

    /// End the session at `slot`; see [`RequestTable::on_session_end`].
    pub async fn on_session_end(&self, slot: PlayerSlot) -> usize {
        self.inner.lock().await.on_session_end(slot)
    }
}

/// The teleport-request plugin.
pub struct TpaPlugin {
    /// Plugin configuration.
    config: RequestConfig,
    /// Pending requests.
    table: SharedRequestTable,
    /// Shutdown signal for the update loop.
    shutdown_tx: broadcast::Sender<()>,
}

impl TpaPlugin {
    /// Build the plugin and its empty table.
    pub fn initialize(config: RequestConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        info!(
            "TPA plugin v{} initialized: {} slots, {} tick window",
            crate::VERSION,
            config.max_players,
            config.request_duration_ticks
        );

        Self {
            table: SharedRequestTable::new(RequestTable::new(config.clone())),
            config,
            shutdown_tx,
        }
    }

    /// Plugin configuration.
    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Handle to the shared table.
    pub fn table(&self) -> &SharedRequestTable {
        &self.table
    }

    /// Game update hook: one tick.
    pub async fn on_game_update<H: Host + ?Sized>(&self, host: &mut H) -> TickResult {
        let result = self.table.tick(host).await;
        if result.expired > 0 {
            debug!("{} request(s) expired", result.expired);
        }
        result
    }

    /// Greet hook: a new session claims `slot`.
    ///
    /// Must run before the player is treated as joined.
    pub async fn on_greet(&self, slot: PlayerSlot) {
        let dropped = self.table.on_session_end(slot).await;
        if dropped > 0 {
            debug!("Greet at {} dropped {} stale request(s)", slot, dropped);
        }
    }

    /// Leave hook: the session at `slot` ended.
    pub async fn on_leave(&self, slot: PlayerSlot) {
        let affected = self.table.on_session_end(slot).await;
        if affected > 0 {
            debug!("Leave at {} affected {} request(s)", slot, affected);
        }
    }

    /// Chat command hook. `None` means the command is not ours.
    pub async fn on_chat_command<H: Host + ?Sized>(
        &self,
        host: &mut H,
        caller: PlayerSlot,
        name: &str,
        args: &[&str],
    ) -> Option<Result<CommandOutcome, CommandError>> {
        self.table
            .with(|table| command::dispatch(table, host, caller, name, args))
            .await
    }

    /// Tick the table at `tick_rate` Hz until [`TpaPlugin::shutdown`].
    pub async fn run_update_loop<H>(&self, host: Arc<Mutex<H>>)
    where
        H: Host + Send,
    {
        let tick_duration = Duration::from_micros(1_000_000 / self.config.tick_rate.max(1) as u64);
        let mut tick_interval = interval(tick_duration);
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        info!("Update loop running at {} Hz", self.config.tick_rate);

        loop {
            tokio::select! {
                _ = tick_interval.tick() => {
                    let mut host = host.lock().await;
                    self.on_game_update(&mut *host).await;
                }
                _ = shutdown_rx.recv() => {
                    info!("Update loop stopped");
                    break;
                }
            }
        }
    }

    /// Stop the update loop.
    pub fn shutdown(&self) {
        if self.shutdown_tx.send(()).is_err() {
            warn!("Shutdown requested with no update loop running");
        }
    }

    /// Teardown: drop every pending request silently.
    pub async fn dispose(&self) -> usize {
        let cleared = self.table.with(|table| table.clear()).await;
        info!("TPA plugin disposed, {} pending request(s) dropped", cleared);
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::position::WorldPosition;
    use crate::game::table::AcceptOutcome;
    use crate::host::memory::InMemoryHost;
    use crate::host::registry::PERMISSION_USE;

    const ALICE: PlayerSlot = PlayerSlot::new(0);
    const BOB: PlayerSlot = PlayerSlot::new(1);

    fn host() -> InMemoryHost {
        let mut host = InMemoryHost::new(256);
        host.join(ALICE, "Alice", WorldPosition::new(5.0, 5.0));
        host.join(BOB, "Bob", WorldPosition::ORIGIN);
        host.grant(ALICE, PERMISSION_USE);
        host.grant(BOB, PERMISSION_USE);
        host
    }

    #[tokio::test]
    async fn test_command_then_accept() {
        let plugin = TpaPlugin::initialize(RequestConfig::default());
        let mut host = host();

        let sent = plugin.on_chat_command(&mut host, BOB, "tpa", &["Alice"]).await;
        assert!(matches!(sent, Some(Ok(CommandOutcome::RequestSent { .. }))));
        assert!(plugin.table().check(ALICE).await.is_some());

        let accepted = plugin.on_chat_command(&mut host, ALICE, "tpa", &[]).await;
        assert!(matches!(accepted, Some(Ok(CommandOutcome::Accepted(_)))));
        assert!(plugin.table().is_empty().await);
        assert_eq!(host.teleports().len(), 1);
    }

    #[tokio::test]
    async fn test_greet_clears_inherited_request() {
        let plugin = TpaPlugin::initialize(RequestConfig::default());
        let mut host = host();

        plugin.on_chat_command(&mut host, BOB, "tpa", &["Alice"]).await;

        // Alice leaves without the leave hook firing; Mallory takes her slot
        host.leave(ALICE);
        host.join(ALICE, "Mallory", WorldPosition::ORIGIN);
        host.grant(ALICE, PERMISSION_USE);
        plugin.on_greet(ALICE).await;

        let result = plugin.on_chat_command(&mut host, ALICE, "tpa", &[]).await;
        assert_eq!(result, Some(Err(CommandError::NoPendingRequest)));
        assert!(host.teleports().is_empty());
    }

    #[tokio::test]
    async fn test_leave_of_requester() {
        let plugin = TpaPlugin::initialize(RequestConfig::default());
        let mut host = host();

        plugin.on_chat_command(&mut host, BOB, "tpa", &["Alice"]).await;
        host.leave(BOB);
        plugin.on_leave(BOB).await;

        let pending = plugin.table().check(ALICE).await.unwrap();
        assert!(pending.requester_left);
        host.clear_log();

        let result = plugin.on_chat_command(&mut host, ALICE, "tpa", &[]).await;
        assert_eq!(
            result,
            Some(Ok(CommandOutcome::Accepted(AcceptOutcome::RequesterMissing { requester: BOB })))
        );
        assert!(host.teleports().is_empty());
        assert!(plugin.table().is_empty().await);

        let to_alice = host.messages_for(ALICE);
        assert_eq!(to_alice.len(), 1);
        assert_eq!(to_alice[0].text, "Could not find player \"Bob\" to teleport.");
    }

    #[tokio::test]
    async fn test_requester_slot_reuse_is_never_teleported() {
        let plugin = TpaPlugin::initialize(RequestConfig::default());
        let mut host = host();

        plugin.on_chat_command(&mut host, BOB, "tpa", &["Alice"]).await;
        host.leave(BOB);
        plugin.on_leave(BOB).await;

        plugin.on_greet(BOB).await;
        host.join(BOB, "Mallory", WorldPosition::new(-9.0, -9.0));
        host.grant(BOB, PERMISSION_USE);
        host.clear_log();

        let result = plugin.on_chat_command(&mut host, ALICE, "tpa", &[]).await;
        assert!(matches!(
            result,
            Some(Ok(CommandOutcome::Accepted(AcceptOutcome::RequesterMissing { .. })))
        ));
        assert!(host.teleports().is_empty());
        assert!(host.messages_for(BOB).is_empty());
    }

    #[tokio::test]
    async fn test_game_update_expires() {
        let config = RequestConfig {
            request_duration_ticks: 3,
            ..Default::default()
        };
        let plugin = TpaPlugin::initialize(config);
        let mut host = host();

        plugin.on_chat_command(&mut host, BOB, "tpa", &["Alice"]).await;
        assert_eq!(plugin.on_game_update(&mut host).await.expired, 0);
        assert_eq!(plugin.on_game_update(&mut host).await.expired, 0);
        assert_eq!(plugin.on_game_update(&mut host).await.expired, 1);
        assert!(plugin.table().is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_loop_expires_in_real_time() {
        let plugin = Arc::new(TpaPlugin::initialize(RequestConfig::default()));
        let host = Arc::new(Mutex::new(host()));

        {
            let mut h = host.lock().await;
            plugin.on_chat_command(&mut *h, BOB, "tpa", &["Alice"]).await;
        }

        let loop_plugin = plugin.clone();
        let loop_host = host.clone();
        let handle = tokio::spawn(async move {
            loop_plugin.run_update_loop(loop_host).await;
        });

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(plugin.table().check(ALICE).await.is_some());

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(plugin.table().check(ALICE).await.is_none());

        plugin.shutdown();
        handle.await.unwrap();

        let h = host.lock().await;
        assert!(h
            .messages_for(BOB)
            .iter()
            .any(|m| m.text == "Alice has not accepted your request in time."));
    }

    #[tokio::test]
    async fn test_dispose_drops_pending() {
        let plugin = TpaPlugin::initialize(RequestConfig::default());
        let mut host = host();

        plugin.on_chat_command(&mut host, BOB, "tpa", &["Alice"]).await;
        assert_eq!(plugin.dispose().await, 1);
        assert!(plugin.table().is_empty().await);
    }
}
