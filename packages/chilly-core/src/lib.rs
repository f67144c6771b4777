//! Chilly Core - playback orchestration for Chilly ATC.
//!
//! Chilly mixes two live internet audio streams: an air traffic control feed
//! chosen from a fixed catalog, and a background music station. This crate
//! owns both channels and is shared by every host (the headless runner, and
//! any UI shell that drives a [`PlayerHandle`]).
//!
//! # Architecture
//!
//! - [`catalog`]: The built-in ATC feed list
//! - [`context`]: Stream targets and URL building
//! - [`media`]: Media backend and audio session abstractions
//! - [`services`]: The player task and its handle
//! - [`state`]: Configuration and published snapshots
//! - [`events`]: Event system for observers
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! - [`MediaBackend`](media::MediaBackend): Creating stream resources
//! - [`AudioSession`](media::AudioSession): Platform audio output session
//! - [`EventEmitter`](events::EventEmitter): Emitting player events
//!
//! The HTTP probe backend and null session suit the headless host; a UI shell
//! with a real decoder provides its own implementations.

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod bootstrap;
pub mod catalog;
pub mod context;
pub mod error;
pub mod events;
pub mod media;
pub mod protocol_constants;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types at the crate root
pub use catalog::{Catalog, Feed};
pub use context::{MusicSource, StreamTarget, UrlBuilder};
pub use error::{ErrorCode, PlayerError, PlayerResult};
pub use events::{
    BroadcastEventBridge, ChannelEvent, EventEmitter, FeedEvent, LoggingEventEmitter,
    NoopEventEmitter, PlayerEvent, SessionEvent,
};
pub use media::{
    AudioSession, HttpProbeBackend, MediaBackend, MediaError, MediaResource, MediaResult,
    NullAudioSession, SessionError,
};
pub use services::{PlayerHandle, PlayerService};
pub use state::{ChannelKind, ChannelSnapshot, Config, PlayerSnapshot, StreamBadge};
pub use utils::now_millis;

// Re-export bootstrap types
pub use bootstrap::{bootstrap_http_player, bootstrap_player, BootstrappedPlayer};
