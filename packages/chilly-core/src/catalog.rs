//! Static ATC feed catalog.
//!
//! The catalog is a fixed, ordered list compiled into the crate. Feeds are
//! looked up by city, which is also the key of the online-status map. Cities
//! are not checked for uniqueness; two feeds sharing a city share a status
//! entry.

use std::sync::Arc;

use serde::Serialize;

/// A catalog entry describing one ATC station and its stream source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    /// Station name, e.g. "KSFO Tower".
    pub name: String,
    /// Short description of the frequencies covered.
    pub description: String,
    /// City the station serves. Used as the status key.
    pub city: String,
    /// State or province, when the country has them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Country the station is in.
    pub country: String,
    /// Provider-side identifier used to build the playback URL.
    pub stream_identifier: String,
}

impl Feed {
    /// Creates a feed.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        city: impl Into<String>,
        state: Option<&str>,
        country: impl Into<String>,
        stream_identifier: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            city: city.into(),
            state: state.map(str::to_string),
            country: country.into(),
            stream_identifier: stream_identifier.into(),
        }
    }

    /// Human-readable label: `"<name> - <city>[, <state>], <country>"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut location = vec![self.city.as_str()];
        if let Some(state) = &self.state {
            location.push(state);
        }
        location.push(&self.country);
        format!("{} - {}", self.name, location.join(", "))
    }
}

/// (name, description, city, state, country, stream identifier)
type FeedRecord = (
    &'static str,
    &'static str,
    &'static str,
    Option<&'static str>,
    &'static str,
    &'static str,
);

const BUILTIN_FEEDS: [FeedRecord; 10] = [
    ("KSFO Tower", "Tower", "San Francisco", Some("California"), "United States", "ksfo_twr"),
    ("RJAA Approach", "Approach", "Tokyo", None, "Japan", "rjaa_app_s"),
    ("CYYZ Tower", "Tower", "Toronto", Some("Ontario"), "Canada", "cyyz7"),
    ("MROC Del/Gnd/Twr/App/Center/Misc", "Tower", "San Jose", None, "Costa Rica", "mroc"),
    ("KJFK Gnd/Twr", "Ground/Tower", "New York", Some("New York"), "United States", "kjfk9_s"),
    ("RCSS Tower/App/Dep", "Tower/App/Dep", "Taipei", None, "Taiwan", "rcss2"),
    ("KLAX Tower (South) #1", "Tower", "Los Angeles", Some("California"), "United States", "klax4"),
    ("UAAA Tower/Approach", "Tower/Approach", "Almaty", None, "Kazakhstan", "uaaa"),
    ("SPQU Ground/Tower", "Tower", "Arequipa", None, "Peru", "spqu2_gta"),
    ("PHNL Tower (Primary)", "Tower", "Honolulu", Some("Hawaii"), "United States", "phnl1_twr_pri"),
];

/// Immutable, ordered feed catalog. Cheap to clone.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    feeds: Arc<[Feed]>,
}

impl Catalog {
    /// Creates a catalog from an ordered list of feeds.
    pub fn new(feeds: Vec<Feed>) -> Self {
        Self {
            feeds: feeds.into(),
        }
    }

    /// The ten feeds the player ships with.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_FEEDS
                .iter()
                .map(|&(name, description, city, state, country, id)| {
                    Feed::new(name, description, city, state, country, id)
                })
                .collect(),
        )
    }

    /// First feed in catalog order, used when power is turned on with no selection.
    pub fn first(&self) -> Option<&Feed> {
        self.feeds.first()
    }

    /// Finds the first feed serving `city` (case-insensitive).
    pub fn find_by_city(&self, city: &str) -> Option<&Feed> {
        self.feeds
            .iter()
            .find(|feed| feed.city.eq_ignore_ascii_case(city))
    }

    pub fn contains(&self, feed: &Feed) -> bool {
        self.feeds.iter().any(|f| f == feed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feed> {
        self.feeds.iter()
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Serialize for Catalog {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.feeds.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_starts_with_san_francisco() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog.first().unwrap().stream_identifier, "ksfo_twr");
    }

    #[test]
    fn display_name_includes_optional_state() {
        let catalog = Catalog::builtin();
        let ksfo = catalog.find_by_city("San Francisco").unwrap();
        assert_eq!(
            ksfo.display_name(),
            "KSFO Tower - San Francisco, California, United States"
        );

        let rjaa = catalog.find_by_city("tokyo").unwrap();
        assert_eq!(rjaa.display_name(), "RJAA Approach - Tokyo, Japan");
    }

    #[test]
    fn find_by_city_returns_none_for_unknown_city() {
        assert!(Catalog::builtin().find_by_city("Reykjavik").is_none());
    }

    #[test]
    fn contains_matches_on_full_feed() {
        let catalog = Catalog::builtin();
        let mut feed = catalog.first().unwrap().clone();
        assert!(catalog.contains(&feed));
        feed.stream_identifier = "other".into();
        assert!(!catalog.contains(&feed));
    }
}
