use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// --- CATALOG ---

/// Images and text for one version of a badge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BadgeVersion {
    pub image_url_1x: String,
    pub image_url_2x: String,
    pub image_url_4x: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BadgeSet {
    #[serde(default)]
    pub versions: HashMap<String, BadgeVersion>,
}

/// Known badges for a channel: badge name -> versions.
///
/// Deserializes from the legacy `{name: {versions: {version: {...}}}}` shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct BadgeCatalog {
    sets: HashMap<String, BadgeSet>,
}

impl BadgeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, version: &str, badge: BadgeVersion) {
        self.sets
            .entry(name.to_string())
            .or_default()
            .versions
            .insert(version.to_string(), badge);
    }

    /// Look up one version of a badge. Misses are normal (withdrawn or
    /// channel-only badges) and simply return `None`.
    pub fn get(&self, name: &str, version: &str) -> Option<&BadgeVersion> {
        self.sets.get(name)?.versions.get(version)
    }

    /// Layer another catalog on top of this one. Versions present in both
    /// are taken from `overrides`, so a channel catalog merged over the
    /// global one wins for e.g. custom subscriber badges.
    pub fn merge(&mut self, overrides: BadgeCatalog) {
        for (name, set) in overrides.sets {
            self.sets
                .entry(name)
                .or_default()
                .versions
                .extend(set.versions);
        }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

// --- HELIX API STRUCTS ---

#[derive(Debug, Serialize, Deserialize)]
pub struct HelixBadgeVersion {
    pub id: String,
    pub image_url_1x: String,
    pub image_url_2x: String,
    pub image_url_4x: String,
    pub title: String,
    pub description: String,
    pub click_action: Option<String>,
    pub click_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HelixBadgeSet {
    pub set_id: String,
    pub versions: Vec<HelixBadgeVersion>,
}

/// Top-level response of the Helix `chat/badges` endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct HelixBadgesResponse {
    pub data: Vec<HelixBadgeSet>,
}

impl From<HelixBadgesResponse> for BadgeCatalog {
    fn from(response: HelixBadgesResponse) -> Self {
        let mut catalog = BadgeCatalog::new();
        for set in response.data {
            for version in set.versions {
                catalog.insert(
                    &set.set_id,
                    &version.id,
                    BadgeVersion {
                        image_url_1x: version.image_url_1x,
                        image_url_2x: version.image_url_2x,
                        image_url_4x: version.image_url_4x,
                        description: version.description,
                        title: Some(version.title),
                    },
                );
            }
        }
        catalog
    }
}

// --- SENDER SELECTIONS ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeSelection {
    pub name: String,
    pub version: String,
}

/// Badges a sender currently displays, in the order the server sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BadgeSelections(Vec<BadgeSelection>);

impl BadgeSelections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str, version: &str) {
        self.0.push(BadgeSelection {
            name: name.to_string(),
            version: version.to_string(),
        });
    }

    /// Parse the IRC `badges` tag, e.g. `moderator/1,subscriber/12`.
    pub fn parse_tag(tag: &str) -> Self {
        let mut badges = Self::new();
        for badge in tag.split(',').filter(|s| !s.is_empty()) {
            let mut parts = badge.splitn(2, '/');
            let name = parts.next().unwrap_or("");
            let version = parts.next().unwrap_or("");
            if !name.is_empty() {
                badges.push(name, version);
            }
        }
        badges
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BadgeSelection> {
        self.0.iter()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|b| b.name == name)
    }
}

impl<'de> Deserialize<'de> for BadgeSelections {
    /// Accepts `{"moderator": "1", "subscriber": "12"}` keeping key order.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SelectionsVisitor;

        impl<'de> Visitor<'de> for SelectionsVisitor {
            type Value = BadgeSelections;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of badge names to version strings")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut badges = BadgeSelections::new();
                while let Some((name, version)) = map.next_entry::<String, String>()? {
                    badges.push(&name, &version);
                }
                Ok(badges)
            }
        }

        deserializer.deserialize_map(SelectionsVisitor)
    }
}
