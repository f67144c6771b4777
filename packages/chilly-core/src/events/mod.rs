//! Event system for player observers.
//!
//! This module provides:
//! - [`EventEmitter`] trait for the orchestrator to emit events
//! - [`BroadcastEventBridge`] for fan-out to any number of subscribers
//! - Event types for channels, feeds, and the audio session
//!
//! Events describe transitions. For the current state, subscribe to
//! snapshots on the [`PlayerHandle`](crate::PlayerHandle) instead.

mod bridge;
mod emitter;

pub use bridge::BroadcastEventBridge;
pub use emitter::{EventEmitter, LoggingEventEmitter, NoopEventEmitter};

use serde::Serialize;

use crate::state::ChannelKind;

/// Events broadcast to observers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "category", rename_all = "camelCase")]
pub enum PlayerEvent {
    /// Per-channel load and transport events.
    Channel(ChannelEvent),

    /// ATC feed selection and status events.
    Feed(FeedEvent),

    /// Audio session lifecycle events.
    Session(SessionEvent),
}

/// Events related to one channel's resource and transport state.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChannelEvent {
    /// A new resource was attached and is loading.
    LoadStarted {
        channel: ChannelKind,
        url: String,
        /// Load attempt id; later attempts have larger ids.
        generation: u64,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// The current resource reported ready.
    Ready {
        channel: ChannelKind,
        url: String,
        timestamp: u64,
    },
    /// The current load failed.
    LoadFailed {
        channel: ChannelKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        error: String,
        timestamp: u64,
    },
    /// The music channel is retrying on its fallback endpoint.
    FallbackStarted {
        channel: ChannelKind,
        url: String,
        timestamp: u64,
    },
    PowerChanged {
        channel: ChannelKind,
        powered: bool,
        timestamp: u64,
    },
    PlaybackChanged {
        channel: ChannelKind,
        playing: bool,
        timestamp: u64,
    },
    VolumeChanged {
        channel: ChannelKind,
        volume: f32,
        timestamp: u64,
    },
}

/// Events related to ATC feed selection and reachability.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FeedEvent {
    /// A feed was selected.
    Selected {
        city: String,
        name: String,
        timestamp: u64,
    },
    /// The last known online state for a city changed or was confirmed.
    StatusChanged {
        city: String,
        online: bool,
        timestamp: u64,
    },
}

/// Events related to the shared audio session.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    Activated { timestamp: u64 },
    SetupFailed { error: String, timestamp: u64 },
    Released { timestamp: u64 },
}

impl From<ChannelEvent> for PlayerEvent {
    fn from(event: ChannelEvent) -> Self {
        PlayerEvent::Channel(event)
    }
}

impl From<FeedEvent> for PlayerEvent {
    fn from(event: FeedEvent) -> Self {
        PlayerEvent::Feed(event)
    }
}

impl From<SessionEvent> for PlayerEvent {
    fn from(event: SessionEvent) -> Self {
        PlayerEvent::Session(event)
    }
}
