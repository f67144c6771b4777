//! Player task and its cloneable handle.
//!
//! [`PlayerService::spawn`] moves a [`PlaybackOrchestrator`] onto a dedicated
//! tokio task. Commands from [`PlayerHandle`] and load outcomes from the
//! per-load watchers are both processed on that task, one at a time, so the
//! orchestrator never needs a lock.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;

use super::orchestrator::{LoadCompletion, PlaybackOrchestrator};
use crate::catalog::{Catalog, Feed};
use crate::error::{PlayerError, PlayerResult};
use crate::events::EventEmitter;
use crate::media::{AudioSession, MediaBackend};
use crate::state::{ChannelKind, Config, PlayerSnapshot};

#[derive(Debug)]
pub(crate) enum PlayerCommand {
    SelectFeed(Feed),
    TogglePower(ChannelKind),
    TogglePlayPause(ChannelKind),
    SetVolume(ChannelKind, f32),
    Teardown(oneshot::Sender<()>),
}

/// Cloneable handle for driving the player from a UI or host.
///
/// Command methods only enqueue; their effect is visible through the
/// snapshot once the player task has processed them.
#[derive(Clone)]
pub struct PlayerHandle {
    commands: mpsc::Sender<PlayerCommand>,
    snapshots: watch::Receiver<PlayerSnapshot>,
}

impl PlayerHandle {
    async fn send(&self, command: PlayerCommand) -> PlayerResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PlayerError::Stopped("player task is not running".into()))
    }

    /// Makes `feed` the ATC selection, loading it if ATC is powered.
    pub async fn select_feed(&self, feed: Feed) -> PlayerResult<()> {
        self.send(PlayerCommand::SelectFeed(feed)).await
    }

    pub async fn toggle_power(&self, channel: ChannelKind) -> PlayerResult<()> {
        self.send(PlayerCommand::TogglePower(channel)).await
    }

    pub async fn toggle_atc_power(&self) -> PlayerResult<()> {
        self.toggle_power(ChannelKind::Atc).await
    }

    pub async fn toggle_music_power(&self) -> PlayerResult<()> {
        self.toggle_power(ChannelKind::Music).await
    }

    /// Flips play/pause on a powered channel with a ready stream.
    pub async fn toggle_play_pause(&self, channel: ChannelKind) -> PlayerResult<()> {
        self.send(PlayerCommand::TogglePlayPause(channel)).await
    }

    pub async fn toggle_music_playback(&self) -> PlayerResult<()> {
        self.toggle_play_pause(ChannelKind::Music).await
    }

    /// Sets a channel volume; values outside `0.0..=1.0` are clamped.
    pub async fn set_volume(&self, channel: ChannelKind, volume: f32) -> PlayerResult<()> {
        self.send(PlayerCommand::SetVolume(channel, volume)).await
    }

    pub async fn set_atc_volume(&self, volume: f32) -> PlayerResult<()> {
        self.set_volume(ChannelKind::Atc, volume).await
    }

    pub async fn set_music_volume(&self, volume: f32) -> PlayerResult<()> {
        self.set_volume(ChannelKind::Music, volume).await
    }

    /// Releases both streams and the audio session, then stops the player task.
    ///
    /// Safe to call repeatedly; calls after the first return immediately.
    pub async fn teardown(&self) -> PlayerResult<()> {
        let (done_tx, done_rx) = oneshot::channel();
        if self.send(PlayerCommand::Teardown(done_tx)).await.is_err() {
            return Ok(());
        }
        // A dropped sender means the task stopped before replying, which is
        // also a completed teardown.
        let _ = done_rx.await;
        Ok(())
    }

    /// Current published state.
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlayerSnapshot> {
        self.snapshots.clone()
    }

    /// Stream of snapshots, starting with the current one.
    pub fn snapshot_stream(&self) -> WatchStream<PlayerSnapshot> {
        WatchStream::new(self.snapshots.clone())
    }

    pub fn catalog(&self) -> Catalog {
        self.snapshots.borrow().atc_feeds.clone()
    }
}

/// Owner of the player task.
pub struct PlayerService;

impl PlayerService {
    /// Spawns the player task and returns its handle.
    ///
    /// The task runs until teardown, until every handle is dropped, or until
    /// `cancel` fires. Each of these tears the player down exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::Configuration`] if `config` fails validation.
    pub fn spawn(
        config: &Config,
        catalog: Catalog,
        backend: Arc<dyn MediaBackend>,
        session: Arc<dyn AudioSession>,
        emitter: Arc<dyn EventEmitter>,
        cancel: CancellationToken,
    ) -> PlayerResult<(PlayerHandle, JoinHandle<()>)> {
        config.validate().map_err(PlayerError::Configuration)?;

        let (orchestrator, completions) =
            PlaybackOrchestrator::new(config, catalog, backend, session, emitter);
        let snapshots = orchestrator.subscribe();
        let (commands_tx, commands_rx) = mpsc::channel(config.command_channel_capacity);

        let task = tokio::spawn(run(orchestrator, commands_rx, completions, cancel));
        let handle = PlayerHandle {
            commands: commands_tx,
            snapshots,
        };
        Ok((handle, task))
    }
}

async fn run(
    mut orchestrator: PlaybackOrchestrator,
    mut commands: mpsc::Receiver<PlayerCommand>,
    mut completions: mpsc::UnboundedReceiver<LoadCompletion>,
    cancel: CancellationToken,
) {
    log::info!("[Orchestrator] Player task started");
    orchestrator.start();

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                log::info!("[Orchestrator] Cancelled");
                orchestrator.teardown();
                break;
            }

            command = commands.recv() => match command {
                Some(PlayerCommand::SelectFeed(feed)) => orchestrator.select_feed(feed),
                Some(PlayerCommand::TogglePower(kind)) => orchestrator.toggle_power(kind),
                Some(PlayerCommand::TogglePlayPause(kind)) => orchestrator.toggle_play_pause(kind),
                Some(PlayerCommand::SetVolume(kind, volume)) => orchestrator.set_volume(kind, volume),
                Some(PlayerCommand::Teardown(done)) => {
                    orchestrator.teardown();
                    let _ = done.send(());
                    break;
                }
                None => {
                    log::info!("[Orchestrator] All handles dropped");
                    orchestrator.teardown();
                    break;
                }
            },

            Some(completion) = completions.recv() => orchestrator.on_load_completed(completion),
        }
    }

    log::info!("[Orchestrator] Player task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::events::NoopEventEmitter;
    use crate::media::test_fixtures::ScriptedBackend;
    use crate::media::NullAudioSession;

    fn spawn(
        config: Config,
        backend: Arc<ScriptedBackend>,
    ) -> (PlayerHandle, JoinHandle<()>, CancellationToken) {
        let cancel = CancellationToken::new();
        let (handle, task) = PlayerService::spawn(
            &config,
            Catalog::builtin(),
            backend,
            Arc::new(NullAudioSession),
            Arc::new(NoopEventEmitter),
            cancel.clone(),
        )
        .unwrap();
        (handle, task, cancel)
    }

    async fn wait_for(handle: &PlayerHandle, predicate: impl Fn(&PlayerSnapshot) -> bool) {
        let mut rx = handle.subscribe();
        tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|s| predicate(s)))
            .await
            .expect("timed out waiting for snapshot")
            .expect("player task stopped");
    }

    /// Waits until the backend has created `count` resources.
    async fn wait_for_created(backend: &ScriptedBackend, count: usize) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while backend.created().len() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("timed out waiting for resource");
    }

    #[tokio::test]
    async fn music_plays_and_atc_follows_commands() {
        let backend = ScriptedBackend::new();
        let (handle, _task, _cancel) = spawn(Config::default(), backend.clone());

        wait_for_created(&backend, 1).await;
        backend.last().resolve_ready();
        wait_for(&handle, |s| s.is_music_playing()).await;

        handle.toggle_atc_power().await.unwrap();
        wait_for_created(&backend, 2).await;
        backend.last().resolve_ready();
        wait_for(&handle, |s| s.is_atc_playing()).await;

        let snap = handle.snapshot();
        assert_eq!(snap.selected_feed().unwrap().city, "San Francisco");
        assert_eq!(snap.stream_status().get("San Francisco"), Some(&true));

        handle.set_music_volume(0.25).await.unwrap();
        wait_for(&handle, |s| s.music_volume() == 0.25).await;
        assert_eq!(backend.created()[0].volume(), 0.25);

        handle.toggle_music_playback().await.unwrap();
        wait_for(&handle, |s| !s.is_music_playing()).await;
    }

    #[tokio::test]
    async fn select_feed_through_handle_switches_stream() {
        let backend = ScriptedBackend::new();
        let config = Config {
            atc_powered: true,
            music_powered: false,
            ..Default::default()
        };
        let (handle, _task, _cancel) = spawn(config, backend.clone());
        wait_for_created(&backend, 1).await;

        let tokyo = handle.catalog().find_by_city("Tokyo").cloned().unwrap();
        handle.select_feed(tokyo).await.unwrap();
        wait_for_created(&backend, 2).await;
        backend.last().resolve_ready();

        wait_for(&handle, |s| s.stream_status().get("Tokyo") == Some(&true)).await;
        assert_eq!(backend.live().len(), 1);
        assert!(handle.snapshot().stream_status().get("San Francisco").is_none());
    }

    #[tokio::test]
    async fn teardown_twice_then_commands_report_stopped() {
        let backend = ScriptedBackend::new();
        let (handle, task, _cancel) = spawn(Config::default(), backend.clone());
        wait_for_created(&backend, 1).await;

        handle.teardown().await.unwrap();
        handle.teardown().await.unwrap();
        task.await.unwrap();

        assert!(handle.snapshot().torn_down);
        assert!(backend.live().is_empty());
        assert!(matches!(
            handle.toggle_music_power().await,
            Err(PlayerError::Stopped(_))
        ));
    }

    #[tokio::test]
    async fn cancellation_tears_down() {
        let backend = ScriptedBackend::new();
        let (handle, task, cancel) = spawn(Config::default(), backend.clone());
        wait_for_created(&backend, 1).await;

        cancel.cancel();
        task.await.unwrap();
        assert!(handle.snapshot().torn_down);
        assert!(backend.live().is_empty());
    }

    #[tokio::test]
    async fn dropping_all_handles_tears_down() {
        let backend = ScriptedBackend::new();
        let (handle, task, _cancel) = spawn(Config::default(), backend.clone());
        let mut snapshots = handle.subscribe();
        drop(handle);

        task.await.unwrap();
        assert!(snapshots.borrow_and_update().torn_down);
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let config = Config {
            music_volume: 2.0,
            ..Default::default()
        };
        let result = PlayerService::spawn(
            &config,
            Catalog::builtin(),
            ScriptedBackend::new(),
            Arc::new(NullAudioSession),
            Arc::new(NoopEventEmitter),
            CancellationToken::new(),
        );
        assert!(matches!(result, Err(PlayerError::Configuration(_))));
    }
}
