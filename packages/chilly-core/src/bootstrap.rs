//! Application bootstrap and dependency wiring.
//!
//! This module is the composition root: the one place where the media backend,
//! audio session, event bridge and player task are created and wired together.

use std::sync::Arc;

use reqwest::Client;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::catalog::Catalog;
use crate::error::{PlayerError, PlayerResult};
use crate::events::{BroadcastEventBridge, EventEmitter};
use crate::media::{AudioSession, HttpProbeBackend, MediaBackend, NullAudioSession};
use crate::services::{PlayerHandle, PlayerService};
use crate::state::Config;

/// User agent sent with every stream request.
const USER_AGENT: &str = concat!("chilly/", env!("CARGO_PKG_VERSION"));

/// Container for the running player and its wiring.
pub struct BootstrappedPlayer {
    /// Handle for sending commands and reading snapshots.
    pub handle: PlayerHandle,
    /// Event bridge; subscribe for real-time player events.
    pub event_bridge: Arc<BroadcastEventBridge>,
    /// Cancels the player task, which tears down on the way out.
    pub cancel_token: CancellationToken,
    task: JoinHandle<()>,
}

impl BootstrappedPlayer {
    /// Tears the player down and waits for its task to finish.
    pub async fn shutdown(self) {
        log::info!("[Bootstrap] Beginning graceful shutdown...");

        if let Err(e) = self.handle.teardown().await {
            log::warn!("[Bootstrap] Teardown failed: {}", e);
        }
        self.cancel_token.cancel();

        if let Err(e) = self.task.await {
            log::error!("[Bootstrap] Player task panicked: {}", e);
        }
        log::info!("[Bootstrap] Shutdown complete");
    }
}

/// Creates the shared HTTP client for stream requests.
///
/// No overall request timeout is set: a probe resolves as soon as response
/// headers arrive, and live streams never finish their body.
fn create_http_client() -> PlayerResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| PlayerError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

/// Bootstraps the player with the given backend and session.
///
/// Wiring order:
///
/// 1. Event bridge and cancellation token
/// 2. Player task (acquires the session, starts powered channels)
///
/// # Errors
///
/// Returns an error if `config` is invalid.
pub fn bootstrap_player(
    config: &Config,
    backend: Arc<dyn MediaBackend>,
    session: Arc<dyn AudioSession>,
) -> PlayerResult<BootstrappedPlayer> {
    let event_bridge = Arc::new(BroadcastEventBridge::new(config.event_channel_capacity));
    let cancel_token = CancellationToken::new();

    let (handle, task) = PlayerService::spawn(
        config,
        Catalog::builtin(),
        backend,
        session,
        Arc::clone(&event_bridge) as Arc<dyn EventEmitter>,
        cancel_token.clone(),
    )?;

    Ok(BootstrappedPlayer {
        handle,
        event_bridge,
        cancel_token,
        task,
    })
}

/// Bootstraps a player that probes real HTTP streams without decoding audio.
///
/// # Errors
///
/// Returns an error if `config` is invalid or the HTTP client cannot be built.
pub fn bootstrap_http_player(config: &Config) -> PlayerResult<BootstrappedPlayer> {
    let backend = Arc::new(HttpProbeBackend::new(create_http_client()?));
    bootstrap_player(config, backend, Arc::new(NullAudioSession))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{PlayerEvent, SessionEvent};
    use crate::media::test_fixtures::ScriptedBackend;

    #[test]
    fn http_client_builds() {
        let client = create_http_client().unwrap();
        assert!(client.get("http://example.com").build().is_ok());
    }

    #[tokio::test]
    async fn shutdown_emits_session_release() {
        let config = Config {
            music_powered: false,
            ..Default::default()
        };
        let player =
            bootstrap_player(&config, ScriptedBackend::new(), Arc::new(NullAudioSession)).unwrap();
        let mut events = player.event_bridge.subscribe();
        let snapshots = player.handle.subscribe();

        player.shutdown().await;

        assert!(snapshots.borrow().torn_down);
        let mut released = false;
        while let Ok(event) = events.try_recv() {
            if matches!(event, PlayerEvent::Session(SessionEvent::Released { .. })) {
                released = true;
            }
        }
        assert!(released);
    }

    #[tokio::test]
    async fn invalid_config_fails_bootstrap() {
        let config = Config {
            command_channel_capacity: 0,
            ..Default::default()
        };
        assert!(bootstrap_player(&config, ScriptedBackend::new(), Arc::new(NullAudioSession)).is_err());
    }
}
