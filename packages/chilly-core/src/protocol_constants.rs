//! Fixed stream endpoints and player defaults.
//!
//! The endpoints are defined by the upstream stream providers. The defaults
//! mirror the values the player starts with when no configuration overrides
//! them.

// ─────────────────────────────────────────────────────────────────────────────
// Stream Providers
// ─────────────────────────────────────────────────────────────────────────────

/// Base URL of the ATC feed provider.
///
/// Feed URLs are built as `<base>/play/<stream_identifier>.pls`.
pub const ATC_PROVIDER_BASE_URL: &str = "https://www.liveatc.net";

/// Path segment between the provider base and the stream identifier.
pub const ATC_PLAY_PATH: &str = "play";

/// Extension of the playlist reference served by the ATC provider.
pub const ATC_PLAYLIST_EXTENSION: &str = "pls";

/// Primary ambient music stream (direct MP3, not playlist-wrapped).
pub const MUSIC_PRIMARY_URL: &str = "https://ice1.somafm.com/groovesalad-128-mp3";

/// Secondary ambient music stream, tried once when the primary fails.
pub const MUSIC_FALLBACK_URL: &str = "https://ice2.somafm.com/groovesalad-128-mp3";

// ─────────────────────────────────────────────────────────────────────────────
// Player Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Initial volume for both channels.
pub const DEFAULT_VOLUME: f32 = 0.5;

/// Capacity of the event broadcast channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Capacity of the command channel into the player task.
pub const COMMAND_CHANNEL_CAPACITY: usize = 32;
