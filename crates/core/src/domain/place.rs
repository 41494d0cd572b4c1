use serde::{Deserialize, Serialize};

pub const DEFAULT_TICKET: &str = "N/A";
pub const DEFAULT_STOP_NAME: &str = "Stop";
pub const DEFAULT_STOP_MINUTES: i64 = 30;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlaceName(pub String);

impl PlaceName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlaceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A curated sub-location of a place. `minutes` is kept signed because source
/// data may carry zero or negative durations; the packer skips those.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    #[serde(default = "default_stop_name")]
    pub name: String,
    #[serde(default = "default_stop_minutes")]
    pub minutes: i64,
}

impl Stop {
    pub fn new(name: impl Into<String>, minutes: i64) -> Self {
        Self { name: name.into(), minutes }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceEntry {
    pub name: PlaceName,
    pub aliases: Vec<String>,
    pub city: String,
    pub highlights: Vec<String>,
    pub facts: Vec<String>,
    pub ticket: String,
    pub best_time: String,
    pub stops: Vec<Stop>,
}

impl PlaceEntry {
    /// Entry with every optional attribute at its load-time default.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: PlaceName(name.into()),
            aliases: Vec::new(),
            city: String::new(),
            highlights: Vec::new(),
            facts: Vec::new(),
            ticket: DEFAULT_TICKET.to_string(),
            best_time: String::new(),
            stops: Vec::new(),
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    pub fn with_facts<I, S>(mut self, facts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.facts = facts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_highlights<I, S>(mut self, highlights: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.highlights = highlights.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ticket(mut self, ticket: impl Into<String>) -> Self {
        self.ticket = ticket.into();
        self
    }

    pub fn with_best_time(mut self, best_time: impl Into<String>) -> Self {
        self.best_time = best_time.into();
        self
    }

    pub fn with_stops(mut self, stops: Vec<Stop>) -> Self {
        self.stops = stops;
        self
    }

    /// Canonical name followed by aliases, in stored order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

fn default_stop_name() -> String {
    DEFAULT_STOP_NAME.to_string()
}

fn default_stop_minutes() -> i64 {
    DEFAULT_STOP_MINUTES
}
