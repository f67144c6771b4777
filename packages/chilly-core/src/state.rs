//! Player configuration and observable state types.
//!
//! [`Config`] holds the tunables the player is constructed with.
//! [`PlayerSnapshot`] is the immutable view of all observable state that the
//! orchestrator publishes after every change; UI collaborators read it and
//! never mutate it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Feed};
use crate::context::MusicSource;
use crate::protocol_constants::{
    ATC_PROVIDER_BASE_URL, COMMAND_CHANNEL_CAPACITY, DEFAULT_VOLUME, EVENT_CHANNEL_CAPACITY,
    MUSIC_FALLBACK_URL, MUSIC_PRIMARY_URL,
};

/// Configuration for the playback orchestrator.
///
/// All fields have sensible defaults.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    // Endpoints
    /// Base URL of the ATC feed provider.
    pub atc_provider_base: String,

    /// Primary ambient music stream.
    pub music_primary_url: String,

    /// Fallback ambient music stream.
    pub music_fallback_url: String,

    // Initial channel state
    /// ATC volume at startup (0.0 - 1.0).
    pub atc_volume: f32,

    /// Music volume at startup (0.0 - 1.0).
    pub music_volume: f32,

    /// Whether the ATC channel is powered at startup.
    pub atc_powered: bool,

    /// Whether the music channel is powered at startup. When set, the music
    /// stream starts loading as soon as the player is constructed.
    pub music_powered: bool,

    // Channels
    /// Capacity of the event broadcast channel.
    pub event_channel_capacity: usize,

    /// Capacity of the command channel into the player task.
    pub command_channel_capacity: usize,
}

impl Config {
    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), String> {
        for (name, url) in [
            ("atc_provider_base", &self.atc_provider_base),
            ("music_primary_url", &self.music_primary_url),
            ("music_fallback_url", &self.music_fallback_url),
        ] {
            if url.trim().is_empty() {
                return Err(format!("{name} must not be empty"));
            }
        }
        for (name, volume) in [
            ("atc_volume", self.atc_volume),
            ("music_volume", self.music_volume),
        ] {
            if !(0.0..=1.0).contains(&volume) {
                return Err(format!("{name} must be within 0.0..=1.0, got {volume}"));
            }
        }
        if self.event_channel_capacity == 0 {
            return Err(
                "event_channel_capacity must be >= 1 (broadcast::channel panics on 0)".to_string(),
            );
        }
        if self.command_channel_capacity == 0 {
            return Err(
                "command_channel_capacity must be >= 1 (mpsc::channel panics on 0)".to_string(),
            );
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            atc_provider_base: ATC_PROVIDER_BASE_URL.to_string(),
            music_primary_url: MUSIC_PRIMARY_URL.to_string(),
            music_fallback_url: MUSIC_FALLBACK_URL.to_string(),
            atc_volume: DEFAULT_VOLUME,
            music_volume: DEFAULT_VOLUME,
            atc_powered: false,
            music_powered: true,
            event_channel_capacity: EVENT_CHANNEL_CAPACITY,
            command_channel_capacity: COMMAND_CHANNEL_CAPACITY,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Observable State
// ─────────────────────────────────────────────────────────────────────────────

/// One of the two independent audio lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChannelKind {
    /// Live air-traffic-control feed.
    Atc,
    /// Fixed ambient music stream.
    Music,
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Atc => f.write_str("ATC"),
            Self::Music => f.write_str("Music"),
        }
    }
}

/// Observable state of a single channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSnapshot {
    /// User-level on/off.
    pub powered: bool,
    /// Whether the channel is audible right now.
    pub playing: bool,
    /// Volume in `0.0..=1.0`.
    pub volume: f32,
    /// A load is in flight.
    pub loading: bool,
    /// Most recent failure on this channel, cleared by the next successful load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// URL of the attached resource, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ChannelSnapshot {
    pub(crate) fn initial(powered: bool, volume: f32) -> Self {
        Self {
            powered,
            playing: false,
            volume,
            loading: false,
            last_error: None,
            url: None,
        }
    }
}

/// Status badge shown next to the selected ATC feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StreamBadge {
    Live,
    Offline,
}

impl std::fmt::Display for StreamBadge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live => f.write_str("LIVE"),
            Self::Offline => f.write_str("OFFLINE"),
        }
    }
}

/// Immutable view of everything a UI collaborator may observe.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub atc: ChannelSnapshot,
    pub music: ChannelSnapshot,
    /// Selected ATC feed; `None` only before the first selection.
    pub selected_feed: Option<Feed>,
    /// Last known online state per feed city.
    pub stream_status: HashMap<String, bool>,
    /// Music endpoint of the current music resource.
    pub music_source: Option<MusicSource>,
    /// Audio session activation failure, if any.
    pub session_error: Option<String>,
    /// The feed catalog.
    pub atc_feeds: Catalog,
    /// Set once the player has been torn down.
    pub torn_down: bool,
}

impl PlayerSnapshot {
    pub(crate) fn initial(config: &Config, catalog: Catalog) -> Self {
        Self {
            atc: ChannelSnapshot::initial(config.atc_powered, config.atc_volume),
            music: ChannelSnapshot::initial(config.music_powered, config.music_volume),
            selected_feed: None,
            stream_status: HashMap::new(),
            music_source: None,
            session_error: None,
            atc_feeds: catalog,
            torn_down: false,
        }
    }

    pub fn channel(&self, kind: ChannelKind) -> &ChannelSnapshot {
        match kind {
            ChannelKind::Atc => &self.atc,
            ChannelKind::Music => &self.music,
        }
    }

    pub fn atc_volume(&self) -> f32 {
        self.atc.volume
    }

    pub fn music_volume(&self) -> f32 {
        self.music.volume
    }

    pub fn is_atc_playing(&self) -> bool {
        self.atc.playing
    }

    pub fn is_music_playing(&self) -> bool {
        self.music.playing
    }

    pub fn is_atc_powered(&self) -> bool {
        self.atc.powered
    }

    pub fn is_music_powered(&self) -> bool {
        self.music.powered
    }

    /// True while either channel has a load in flight.
    pub fn is_loading(&self) -> bool {
        self.atc.loading || self.music.loading
    }

    /// The message to show the user: session failure first, then ATC, then music.
    pub fn error_message(&self) -> Option<&str> {
        self.session_error
            .as_deref()
            .or(self.atc.last_error.as_deref())
            .or(self.music.last_error.as_deref())
    }

    pub fn selected_feed(&self) -> Option<&Feed> {
        self.selected_feed.as_ref()
    }

    pub fn stream_status(&self) -> &HashMap<String, bool> {
        &self.stream_status
    }

    /// Whether the channel is powered and audible.
    pub fn is_channel_active(&self, kind: ChannelKind) -> bool {
        let channel = self.channel(kind);
        channel.playing && channel.powered
    }

    /// The feed the ATC badge describes: the selection, or the first feed.
    pub fn current_feed(&self) -> Option<&Feed> {
        self.selected_feed.as_ref().or_else(|| self.atc_feeds.first())
    }

    /// LIVE when ATC is powered and the current feed's last outcome was online.
    pub fn atc_badge(&self) -> StreamBadge {
        if !self.atc.powered {
            return StreamBadge::Offline;
        }
        let online = self
            .current_feed()
            .and_then(|feed| self.stream_status.get(&feed.city))
            .copied()
            .unwrap_or(false);
        if online {
            StreamBadge::Live
        } else {
            StreamBadge::Offline
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.music_powered);
        assert!(!config.atc_powered);
    }

    #[test]
    fn validate_rejects_out_of_range_volume() {
        let config = Config {
            atc_volume: 1.5,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("atc_volume"));

        let config = Config {
            music_volume: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("music_volume"));
    }

    #[test]
    fn validate_rejects_zero_capacity_and_empty_urls() {
        let config = Config {
            event_channel_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            music_fallback_url: "  ".into(),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("music_fallback_url"));
    }

    #[test]
    fn badge_is_offline_when_unpowered_even_if_online() {
        let mut snapshot = PlayerSnapshot::initial(&Config::default(), Catalog::builtin());
        snapshot
            .stream_status
            .insert("San Francisco".to_string(), true);
        assert_eq!(snapshot.atc_badge(), StreamBadge::Offline);

        snapshot.atc.powered = true;
        assert_eq!(snapshot.atc_badge(), StreamBadge::Live);
    }

    #[test]
    fn badge_follows_selected_feed_city() {
        let catalog = Catalog::builtin();
        let mut snapshot = PlayerSnapshot::initial(&Config::default(), catalog.clone());
        snapshot.atc.powered = true;
        snapshot
            .stream_status
            .insert("San Francisco".to_string(), true);
        snapshot.selected_feed = catalog.find_by_city("Tokyo").cloned();
        assert_eq!(snapshot.atc_badge(), StreamBadge::Offline);
        assert_eq!(snapshot.atc_badge().to_string(), "OFFLINE");
    }

    #[test]
    fn error_message_prefers_session_then_atc() {
        let mut snapshot = PlayerSnapshot::initial(&Config::default(), Catalog::builtin());
        assert_eq!(snapshot.error_message(), None);

        snapshot.music.last_error = Some("music down".into());
        assert_eq!(snapshot.error_message(), Some("music down"));

        snapshot.atc.last_error = Some("atc down".into());
        assert_eq!(snapshot.error_message(), Some("atc down"));

        snapshot.session_error = Some("no audio".into());
        assert_eq!(snapshot.error_message(), Some("no audio"));
    }
}
