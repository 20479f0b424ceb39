use anyhow::{anyhow, Context, Result};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;
use std::str::FromStr;

/// Inclusive `[start, end]` span of an emote inside the raw message text.
///
/// Both bounds count UTF-16 code units, the same way the chat server indexes
/// the `emotes` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmoteRange {
    pub start: usize,
    pub end: usize,
}

impl EmoteRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, other: &EmoteRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl FromStr for EmoteRange {
    type Err = anyhow::Error;

    /// Parse a `"start-end"` range string such as `"0-4"`.
    fn from_str(s: &str) -> Result<Self> {
        static RANGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)-(\d+)$").unwrap());

        let caps = RANGE
            .captures(s.trim())
            .ok_or_else(|| anyhow!("Malformed emote range: {:?}", s))?;
        let start = caps[1]
            .parse::<usize>()
            .with_context(|| format!("Emote range start out of bounds: {:?}", s))?;
        let end = caps[2]
            .parse::<usize>()
            .with_context(|| format!("Emote range end out of bounds: {:?}", s))?;

        Ok(EmoteRange { start, end })
    }
}

/// Emote id -> ranges, kept in the order the payload supplied them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmoteRanges {
    entries: Vec<(String, Vec<EmoteRange>)>,
}

impl EmoteRanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a range to `id`, creating the entry on first use.
    pub fn push(&mut self, id: &str, range: EmoteRange) {
        match self.entries.iter_mut().find(|(existing, _)| existing == id) {
            Some((_, ranges)) => ranges.push(range),
            None => self.entries.push((id.to_string(), vec![range])),
        }
    }

    /// Append every well-formed `"start-end"` string for `id`.
    ///
    /// Malformed strings are dropped with a warning so one bad range never
    /// takes the rest of the message down with it.
    pub fn push_raw<S: AsRef<str>>(&mut self, id: &str, ranges: &[S]) {
        for raw in ranges {
            match raw.as_ref().parse::<EmoteRange>() {
                Ok(range) => self.push(id, range),
                Err(e) => warn!("[Emotes] Dropping range for emote {}: {}", id, e),
            }
        }
    }

    /// Parse the IRC `emotes` tag, e.g. `25:0-4,12-16/1902:6-10`.
    pub fn parse_tag(tag: &str) -> Self {
        let mut emotes = Self::new();

        for group in tag.split('/').filter(|g| !g.is_empty()) {
            let Some((id, ranges)) = group.split_once(':') else {
                warn!("[Emotes] Ignoring emote group without ranges: {}", group);
                continue;
            };
            let ranges: Vec<&str> = ranges.split(',').collect();
            emotes.push_raw(id, &ranges);
        }

        emotes
    }

    /// True when there is no range to substitute at all.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, ranges)| ranges.is_empty())
    }

    /// Total number of ranges across all ids.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, ranges)| ranges.len()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[EmoteRange])> {
        self.entries
            .iter()
            .map(|(id, ranges)| (id.as_str(), ranges.as_slice()))
    }
}

impl<'de> Deserialize<'de> for EmoteRanges {
    /// Accepts `{"25": ["0-4", "12-16"], ...}` and preserves key order.
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EmoteRangesVisitor;

        impl<'de> Visitor<'de> for EmoteRangesVisitor {
            type Value = EmoteRanges;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of emote ids to lists of \"start-end\" ranges")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut emotes = EmoteRanges::new();
                while let Some((id, ranges)) = map.next_entry::<String, Vec<String>>()? {
                    emotes.push_raw(&id, &ranges);
                }
                Ok(emotes)
            }
        }

        deserializer.deserialize_map(EmoteRangesVisitor)
    }
}
