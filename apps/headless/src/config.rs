//! Headless host configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::Path;

use anyhow::{Context, Result};
use chilly_core::{Catalog, Feed};
use serde::Deserialize;

/// Host configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HeadlessConfig {
    /// City of the ATC feed to select at startup. Unset keeps the catalog default.
    /// Override: `CHILLY_FEED`
    pub feed: Option<String>,

    /// Power the ATC channel on at startup.
    /// Override: `CHILLY_ATC`
    pub atc: bool,

    /// Power the music channel on at startup.
    /// Override: `CHILLY_MUSIC`
    pub music: bool,

    /// Initial ATC volume (0.0 to 1.0).
    /// Override: `CHILLY_ATC_VOLUME`
    pub atc_volume: f32,

    /// Initial music volume (0.0 to 1.0).
    /// Override: `CHILLY_MUSIC_VOLUME`
    pub music_volume: f32,

    /// Base URL of the ATC stream provider.
    /// Override: `CHILLY_ATC_PROVIDER`
    pub atc_provider_base: Option<String>,

    /// Primary music stream URL.
    pub music_primary_url: Option<String>,

    /// Fallback music stream URL.
    pub music_fallback_url: Option<String>,

    /// Log every player event, not only snapshot changes.
    pub log_events: bool,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        let core = chilly_core::Config::default();
        Self {
            feed: None,
            atc: core.atc_powered,
            music: core.music_powered,
            atc_volume: core.atc_volume,
            music_volume: core.music_volume,
            atc_provider_base: None,
            music_primary_url: None,
            music_fallback_url: None,
            log_events: false,
        }
    }
}

impl HeadlessConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies `CHILLY_*` overrides read through `var`. Unparseable values are ignored.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("CHILLY_FEED") {
            self.feed = Some(val);
        }

        if let Some(on) = var("CHILLY_ATC").and_then(|v| parse_flag(&v)) {
            self.atc = on;
        }

        if let Some(on) = var("CHILLY_MUSIC").and_then(|v| parse_flag(&v)) {
            self.music = on;
        }

        if let Some(volume) = var("CHILLY_ATC_VOLUME").and_then(|v| v.parse().ok()) {
            self.atc_volume = volume;
        }

        if let Some(volume) = var("CHILLY_MUSIC_VOLUME").and_then(|v| v.parse().ok()) {
            self.music_volume = volume;
        }

        if let Some(val) = var("CHILLY_ATC_PROVIDER") {
            self.atc_provider_base = Some(val);
        }

        // Note: CHILLY_LOG_LEVEL is handled by clap via #[arg(env = ...)] in main.rs
    }

    /// Converts to chilly-core's Config type.
    pub fn to_core_config(&self) -> chilly_core::Config {
        let defaults = chilly_core::Config::default();
        chilly_core::Config {
            atc_provider_base: self
                .atc_provider_base
                .clone()
                .unwrap_or(defaults.atc_provider_base),
            music_primary_url: self
                .music_primary_url
                .clone()
                .unwrap_or(defaults.music_primary_url),
            music_fallback_url: self
                .music_fallback_url
                .clone()
                .unwrap_or(defaults.music_fallback_url),
            atc_volume: self.atc_volume,
            music_volume: self.music_volume,
            atc_powered: self.atc,
            music_powered: self.music,
            ..defaults
        }
    }

    /// Resolves the configured startup feed against `catalog` by city.
    pub fn initial_feed(&self, catalog: &Catalog) -> Result<Option<Feed>> {
        let Some(city) = self.feed.as_deref() else {
            return Ok(None);
        };
        let feed = catalog.find_by_city(city).cloned().with_context(|| {
            let cities: Vec<&str> = catalog.iter().map(|f| f.city.as_str()).collect();
            format!("Unknown feed city '{}'. Known cities: {}", city, cities.join(", "))
        })?;
        Ok(Some(feed))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn write_yaml(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_match_core_defaults() {
        let config = HeadlessConfig::default().to_core_config();
        assert_eq!(config, chilly_core::Config::default());
    }

    #[test]
    fn loads_partial_yaml() {
        let file = write_yaml("feed: Tokyo\natc: true\nmusic_volume: 0.2\n");
        let config = HeadlessConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.feed.as_deref(), Some("Tokyo"));
        assert!(config.atc);
        assert!(config.music);
        assert_eq!(config.music_volume, 0.2);
        assert_eq!(config.atc_volume, 0.5);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let file = write_yaml("atc: [not, a, bool]\n");
        let err = HeadlessConfig::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        assert!(HeadlessConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn overrides_replace_file_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("CHILLY_FEED", "London"),
            ("CHILLY_MUSIC", "off"),
            ("CHILLY_ATC_VOLUME", "0.8"),
            ("CHILLY_MUSIC_VOLUME", "loud"),
        ]);
        let mut config = HeadlessConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.feed.as_deref(), Some("London"));
        assert!(!config.music);
        assert_eq!(config.atc_volume, 0.8);
        assert_eq!(config.music_volume, 0.5);
    }

    #[test]
    fn initial_feed_resolves_city_case_insensitively() {
        let catalog = Catalog::builtin();
        let config = HeadlessConfig {
            feed: Some("tokyo".into()),
            ..Default::default()
        };
        let feed = config.initial_feed(&catalog).unwrap().unwrap();
        assert_eq!(feed.city, "Tokyo");

        let unknown = HeadlessConfig {
            feed: Some("Atlantis".into()),
            ..Default::default()
        };
        assert!(unknown.initial_feed(&catalog).is_err());
        assert!(HeadlessConfig::default()
            .initial_feed(&catalog)
            .unwrap()
            .is_none());
    }
}
