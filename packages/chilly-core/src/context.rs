//! Stream endpoint context.
//!
//! [`UrlBuilder`] turns a [`StreamTarget`] into a validated playback URL. ATC
//! feeds are templated from the provider base; the music channel uses two
//! fixed direct-stream endpoints.

use reqwest::Url;
use serde::Serialize;

use crate::catalog::Feed;
use crate::error::{PlayerError, PlayerResult};
use crate::protocol_constants::{
    ATC_PLAYLIST_EXTENSION, ATC_PLAY_PATH, ATC_PROVIDER_BASE_URL, MUSIC_FALLBACK_URL,
    MUSIC_PRIMARY_URL,
};
use crate::state::Config;

/// Which music endpoint a load targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MusicSource {
    /// The primary endpoint, tried first on every fresh load.
    Primary,
    /// The secondary endpoint, tried once after the primary fails.
    Fallback,
}

/// What a channel is loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamTarget {
    /// A feed from the ATC catalog.
    Feed(Feed),
    /// One of the fixed music endpoints.
    Music(MusicSource),
}

impl StreamTarget {
    /// The feed this target plays, if it is an ATC target.
    pub fn feed(&self) -> Option<&Feed> {
        match self {
            Self::Feed(feed) => Some(feed),
            Self::Music(_) => None,
        }
    }
}

/// Builder for constructing playback URLs.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    atc_base: String,
    music_primary: String,
    music_fallback: String,
}

impl UrlBuilder {
    /// Creates a new `UrlBuilder` from explicit endpoints.
    pub fn new(
        atc_base: impl Into<String>,
        music_primary: impl Into<String>,
        music_fallback: impl Into<String>,
    ) -> Self {
        Self {
            atc_base: atc_base.into(),
            music_primary: music_primary.into(),
            music_fallback: music_fallback.into(),
        }
    }

    /// Creates a `UrlBuilder` from the player configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.atc_provider_base.clone(),
            config.music_primary_url.clone(),
            config.music_fallback_url.clone(),
        )
    }

    /// Returns the playlist URL for an ATC feed
    /// (e.g. `https://www.liveatc.net/play/ksfo_twr.pls`).
    pub fn feed_url(&self, feed: &Feed) -> PlayerResult<Url> {
        let raw = format!(
            "{}/{}/{}.{}",
            self.atc_base.trim_end_matches('/'),
            ATC_PLAY_PATH,
            feed.stream_identifier,
            ATC_PLAYLIST_EXTENSION
        );
        parse_stream_url(&raw)
    }

    /// Returns the direct stream URL for a music endpoint.
    pub fn music_url(&self, source: MusicSource) -> PlayerResult<Url> {
        match source {
            MusicSource::Primary => parse_stream_url(&self.music_primary),
            MusicSource::Fallback => parse_stream_url(&self.music_fallback),
        }
    }

    /// Returns the URL for any stream target.
    pub fn url_for(&self, target: &StreamTarget) -> PlayerResult<Url> {
        match target {
            StreamTarget::Feed(feed) => self.feed_url(feed),
            StreamTarget::Music(source) => self.music_url(*source),
        }
    }
}

impl Default for UrlBuilder {
    fn default() -> Self {
        Self::new(ATC_PROVIDER_BASE_URL, MUSIC_PRIMARY_URL, MUSIC_FALLBACK_URL)
    }
}

/// Parses a stream URL, accepting only absolute http(s) URLs with a host.
fn parse_stream_url(raw: &str) -> PlayerResult<Url> {
    let url = Url::parse(raw).map_err(|e| PlayerError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        scheme => Err(PlayerError::InvalidUrl(format!(
            "{raw}: unsupported scheme '{scheme}'"
        ))),
    }
}
