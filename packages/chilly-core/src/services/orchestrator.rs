//! Playback orchestrator: the single authority over both channels.
//!
//! All mutation happens on one logical context (the player task). Loads do
//! not block: [`PlaybackOrchestrator::load_and_play`] attaches a fresh resource
//! and spawns a watcher that reports the ready/failed outcome back through the
//! completion channel. Each load carries a generation id; outcomes for any
//! load that is no longer attached are dropped. Replacing a resource also
//! cancels its watcher, so most stale outcomes are never delivered at all.
//!
//! After every change the orchestrator publishes a fresh [`PlayerSnapshot`].

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::channel::{ActiveLoad, Channel, LoadPhase};
use crate::catalog::{Catalog, Feed};
use crate::context::{MusicSource, StreamTarget, UrlBuilder};
use crate::error::PlayerError;
use crate::events::{ChannelEvent, EventEmitter, FeedEvent, SessionEvent};
use crate::media::{AudioSession, MediaBackend, MediaResource, MediaResult, SessionGuard};
use crate::state::{ChannelKind, Config, PlayerSnapshot};
use crate::utils::{clamp_volume, now_millis};

/// Outcome of one load attempt, marshalled back onto the player task.
#[derive(Debug)]
pub(crate) struct LoadCompletion {
    pub channel: ChannelKind,
    pub generation: u64,
    pub outcome: MediaResult<()>,
}

pub(crate) struct PlaybackOrchestrator {
    catalog: Catalog,
    urls: UrlBuilder,
    backend: Arc<dyn MediaBackend>,
    emitter: Arc<dyn EventEmitter>,
    completions: mpsc::UnboundedSender<LoadCompletion>,
    snapshot_tx: watch::Sender<PlayerSnapshot>,
    atc: Channel,
    music: Channel,
    selected_feed: Option<Feed>,
    /// city -> last known online state. Entries for inactive feeds persist.
    stream_status: HashMap<String, bool>,
    session: Option<SessionGuard>,
    session_error: Option<String>,
    next_generation: u64,
    torn_down: bool,
}

impl PlaybackOrchestrator {
    /// Builds the orchestrator and acquires the audio session.
    ///
    /// Session activation failure is not fatal: it is reported through the
    /// snapshot's error message and playback is still attempted.
    pub fn new(
        config: &Config,
        catalog: Catalog,
        backend: Arc<dyn MediaBackend>,
        session: Arc<dyn AudioSession>,
        emitter: Arc<dyn EventEmitter>,
    ) -> (Self, mpsc::UnboundedReceiver<LoadCompletion>) {
        let (completions, completions_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(PlayerSnapshot::initial(config, catalog.clone()));

        let (session, session_error) = match SessionGuard::acquire(session) {
            Ok(guard) => {
                emitter.emit_session(SessionEvent::Activated {
                    timestamp: now_millis(),
                });
                (Some(guard), None)
            }
            Err(e) => {
                let err = PlayerError::from(e);
                log::error!("[Orchestrator] {}", err);
                emitter.emit_session(SessionEvent::SetupFailed {
                    error: err.to_string(),
                    timestamp: now_millis(),
                });
                (None, Some(err.to_string()))
            }
        };

        let mut orchestrator = Self {
            catalog,
            urls: UrlBuilder::from_config(config),
            backend,
            emitter,
            completions,
            snapshot_tx,
            atc: Channel::new(ChannelKind::Atc, config.atc_powered, config.atc_volume),
            music: Channel::new(ChannelKind::Music, config.music_powered, config.music_volume),
            selected_feed: None,
            stream_status: HashMap::new(),
            session,
            session_error,
            next_generation: 0,
            torn_down: false,
        };
        orchestrator.publish();
        (orchestrator, completions_rx)
    }

    pub fn subscribe(&self) -> watch::Receiver<PlayerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Starts every channel that is powered at construction.
    pub fn start(&mut self) {
        if self.music.powered {
            self.power_on(ChannelKind::Music);
        }
        if self.atc.powered {
            self.power_on(ChannelKind::Atc);
        }
        self.publish();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    pub fn select_feed(&mut self, feed: Feed) {
        if self.ignore_after_teardown("select_feed") {
            return;
        }
        if !self.catalog.contains(&feed) {
            log::warn!("[Orchestrator] Selected feed {} is not in the catalog", feed.name);
        }
        log::info!("[Orchestrator] Selected {}", feed.display_name());
        self.set_selection(feed.clone());
        if self.atc.powered {
            self.load_and_play(ChannelKind::Atc, StreamTarget::Feed(feed));
        }
        self.publish();
    }

    pub fn toggle_power(&mut self, kind: ChannelKind) {
        if self.ignore_after_teardown("toggle_power") {
            return;
        }
        let channel = self.channel_mut(kind);
        channel.powered = !channel.powered;
        let powered = channel.powered;
        log::info!(
            "[Orchestrator] {} power {}",
            kind,
            if powered { "on" } else { "off" }
        );
        self.emitter.emit_channel(ChannelEvent::PowerChanged {
            channel: kind,
            powered,
            timestamp: now_millis(),
        });

        if powered {
            self.power_on(kind);
        } else {
            self.power_off(kind);
        }
        self.publish();
    }

    pub fn toggle_play_pause(&mut self, kind: ChannelKind) {
        if self.ignore_after_teardown("toggle_play_pause") {
            return;
        }
        let channel = self.channel_mut(kind);
        if !channel.powered {
            log::debug!("[Orchestrator] {} is powered off; play/pause ignored", kind);
            return;
        }
        let Some(load) = channel
            .active
            .as_ref()
            .filter(|load| load.phase == LoadPhase::Ready)
        else {
            log::debug!("[Orchestrator] {} has no ready stream; play/pause ignored", kind);
            return;
        };

        if channel.playing {
            load.resource.pause();
        } else {
            load.resource.play();
        }
        channel.playing = !channel.playing;
        let playing = channel.playing;
        self.emit_playback(kind, playing);
        self.publish();
    }

    pub fn set_volume(&mut self, kind: ChannelKind, volume: f32) {
        if self.ignore_after_teardown("set_volume") {
            return;
        }
        let Some(volume) = clamp_volume(volume) else {
            log::warn!("[Orchestrator] Ignoring non-finite {} volume {}", kind, volume);
            return;
        };
        let channel = self.channel_mut(kind);
        channel.volume = volume;
        if let Some(load) = &channel.active {
            load.resource.set_volume(volume);
        }
        self.emitter.emit_channel(ChannelEvent::VolumeChanged {
            channel: kind,
            volume,
            timestamp: now_millis(),
        });
        self.publish();
    }

    /// Pauses and releases both resources, cancels pending watchers and
    /// releases the audio session. Returns `false` if already torn down.
    pub fn teardown(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        log::info!("[Orchestrator] Tearing down");

        for channel in [&mut self.atc, &mut self.music] {
            if let Some(load) = &channel.active {
                load.resource.pause();
            }
            channel.detach();
            channel.playing = false;
            channel.loading = false;
        }

        if let Some(mut guard) = self.session.take() {
            if guard.release() {
                self.emitter.emit_session(SessionEvent::Released {
                    timestamp: now_millis(),
                });
            }
        }

        self.torn_down = true;
        self.publish();
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────────

    /// Replaces the channel's resource with a fresh one for `target` and
    /// starts waiting for its outcome. Never blocks.
    fn load_and_play(&mut self, kind: ChannelKind, target: StreamTarget) {
        self.next_generation += 1;
        let generation = self.next_generation;

        let url = self.urls.url_for(&target);
        let channel = match kind {
            ChannelKind::Atc => &mut self.atc,
            ChannelKind::Music => &mut self.music,
        };
        channel.detach();
        channel.playing = false;
        channel.loading = true;

        let created = url.and_then(|url| {
            self.backend
                .create(&url, channel.volume)
                .map_err(PlayerError::from)
        });

        match created {
            Ok(resource) => {
                let load = ActiveLoad::new(generation, target, resource.clone());
                let cancel = load.cancel.clone();
                channel.attach(load);
                log::info!(
                    "[Orchestrator] {} loading {} (generation {})",
                    kind,
                    resource.url(),
                    generation
                );
                self.emitter.emit_channel(ChannelEvent::LoadStarted {
                    channel: kind,
                    url: resource.url().to_string(),
                    generation,
                    timestamp: now_millis(),
                });
                self.spawn_watcher(kind, generation, resource, cancel);
            }
            Err(err) => self.fail_load(kind, &target, None, err),
        }
        self.publish();
    }

    fn spawn_watcher(
        &self,
        kind: ChannelKind,
        generation: u64,
        resource: Arc<dyn MediaResource>,
        cancel: CancellationToken,
    ) {
        let completions = self.completions.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    log::trace!("[Orchestrator] {} watcher {} cancelled", kind, generation);
                }
                outcome = resource.wait_ready() => {
                    let completion = LoadCompletion { channel: kind, generation, outcome };
                    if completions.send(completion).is_err() {
                        log::trace!("[Orchestrator] Player task gone; dropping outcome {}", generation);
                    }
                }
            }
        });
    }

    /// Applies a load outcome if it belongs to the channel's current load.
    pub fn on_load_completed(&mut self, completion: LoadCompletion) {
        if self.torn_down {
            return;
        }
        let LoadCompletion {
            channel: kind,
            generation,
            outcome,
        } = completion;

        let channel = match kind {
            ChannelKind::Atc => &mut self.atc,
            ChannelKind::Music => &mut self.music,
        };
        let start = channel.powered;
        let Some(load) = channel.pending(generation) else {
            log::debug!(
                "[Orchestrator] Ignoring stale {} outcome (generation {})",
                kind,
                generation
            );
            return;
        };
        let target = load.target.clone();
        let url = load.resource.url().to_string();

        match outcome {
            Ok(()) => {
                load.phase = LoadPhase::Ready;
                if start {
                    load.resource.play();
                }
                channel.loading = false;
                channel.last_error = None;
                channel.playing = start;

                log::info!("[Orchestrator] {} ready: {}", kind, url);
                self.emitter.emit_channel(ChannelEvent::Ready {
                    channel: kind,
                    url,
                    timestamp: now_millis(),
                });
                if start {
                    self.emit_playback(kind, true);
                }
                if let Some(feed) = target.feed() {
                    self.record_status(&feed.city, true);
                }
            }
            Err(e) => {
                load.phase = LoadPhase::Failed;
                self.fail_load(kind, &target, Some(url), e.into());
            }
        }
        self.publish();
    }

    /// Resets the channel after a failed load and applies the per-target policy:
    /// ATC marks the city offline, music retries once on the fallback endpoint.
    fn fail_load(
        &mut self,
        kind: ChannelKind,
        target: &StreamTarget,
        url: Option<String>,
        err: PlayerError,
    ) {
        let channel = self.channel_mut(kind);
        let was_playing = channel.playing;
        channel.loading = false;
        channel.playing = false;
        channel.last_error = Some(err.to_string());

        log::warn!("[Orchestrator] {} load failed: {}", kind, err);
        self.emitter.emit_channel(ChannelEvent::LoadFailed {
            channel: kind,
            url,
            error: err.to_string(),
            timestamp: now_millis(),
        });
        if was_playing {
            self.emit_playback(kind, false);
        }

        match target {
            StreamTarget::Feed(feed) => self.record_status(&feed.city, false),
            StreamTarget::Music(MusicSource::Primary) => {
                let fallback = StreamTarget::Music(MusicSource::Fallback);
                if let Ok(url) = self.urls.url_for(&fallback) {
                    self.emitter.emit_channel(ChannelEvent::FallbackStarted {
                        channel: kind,
                        url: url.to_string(),
                        timestamp: now_millis(),
                    });
                }
                log::info!("[Orchestrator] Trying fallback music stream");
                self.load_and_play(kind, fallback);
            }
            StreamTarget::Music(MusicSource::Fallback) => {
                log::error!("[Orchestrator] Fallback music stream failed; giving up");
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Power
    // ─────────────────────────────────────────────────────────────────────────

    /// Resumes a ready resource for the channel's current target, keeps
    /// waiting on a matching in-flight load, or starts a fresh load.
    fn power_on(&mut self, kind: ChannelKind) {
        let target = match kind {
            ChannelKind::Atc => {
                let feed = match self.selected_feed.clone() {
                    Some(feed) => feed,
                    None => match self.catalog.first().cloned() {
                        Some(first) => {
                            self.set_selection(first.clone());
                            first
                        }
                        None => {
                            log::warn!("[Orchestrator] Feed catalog is empty; nothing to play");
                            return;
                        }
                    },
                };
                StreamTarget::Feed(feed)
            }
            ChannelKind::Music => StreamTarget::Music(MusicSource::Primary),
        };

        let channel = self.channel_mut(kind);
        let reusable = channel.active.as_ref().and_then(|load| {
            let same_target = match (&load.target, &target) {
                (StreamTarget::Music(_), StreamTarget::Music(_)) => true,
                (current, wanted) => current == wanted,
            };
            same_target.then_some(load.phase)
        });

        match reusable {
            Some(LoadPhase::Ready) => {
                if let Some(load) = &channel.active {
                    load.resource.play();
                }
                channel.playing = true;
                self.emit_playback(kind, true);
            }
            Some(LoadPhase::Loading) => {
                log::debug!("[Orchestrator] {} load still in flight; will play when ready", kind);
            }
            Some(LoadPhase::Failed) | None => self.load_and_play(kind, target),
        }
    }

    /// Pauses the resource (keeping it attached) and stops playback at once.
    fn power_off(&mut self, kind: ChannelKind) {
        let channel = self.channel_mut(kind);
        if let Some(load) = &channel.active {
            load.resource.pause();
        }
        if channel.playing {
            channel.playing = false;
            self.emit_playback(kind, false);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn channel_mut(&mut self, kind: ChannelKind) -> &mut Channel {
        match kind {
            ChannelKind::Atc => &mut self.atc,
            ChannelKind::Music => &mut self.music,
        }
    }

    fn set_selection(&mut self, feed: Feed) {
        self.emitter.emit_feed(FeedEvent::Selected {
            city: feed.city.clone(),
            name: feed.name.clone(),
            timestamp: now_millis(),
        });
        self.selected_feed = Some(feed);
    }

    fn record_status(&mut self, city: &str, online: bool) {
        self.stream_status.insert(city.to_string(), online);
        self.emitter.emit_feed(FeedEvent::StatusChanged {
            city: city.to_string(),
            online,
            timestamp: now_millis(),
        });
    }

    fn emit_playback(&self, kind: ChannelKind, playing: bool) {
        self.emitter.emit_channel(ChannelEvent::PlaybackChanged {
            channel: kind,
            playing,
            timestamp: now_millis(),
        });
    }

    fn ignore_after_teardown(&self, command: &str) -> bool {
        if self.torn_down {
            log::warn!("[Orchestrator] Ignoring {} after teardown", command);
        }
        self.torn_down
    }

    fn publish(&self) {
        let music_source = self
            .music
            .active
            .as_ref()
            .and_then(|load| match &load.target {
                StreamTarget::Music(source) => Some(*source),
                StreamTarget::Feed(_) => None,
            });
        self.snapshot_tx.send_replace(PlayerSnapshot {
            atc: self.atc.snapshot(),
            music: self.music.snapshot(),
            selected_feed: self.selected_feed.clone(),
            stream_status: self.stream_status.clone(),
            music_source,
            session_error: self.session_error.clone(),
            atc_feeds: self.catalog.clone(),
            torn_down: self.torn_down,
        });
    }

    #[cfg(test)]
    pub fn generation(&self, kind: ChannelKind) -> Option<u64> {
        match kind {
            ChannelKind::Atc => self.atc.active.as_ref().map(|load| load.generation),
            ChannelKind::Music => self.music.active.as_ref().map(|load| load.generation),
        }
    }
}
