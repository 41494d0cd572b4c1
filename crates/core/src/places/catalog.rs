use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::place::{
    PlaceEntry, PlaceName, Stop, DEFAULT_STOP_MINUTES, DEFAULT_STOP_NAME, DEFAULT_TICKET,
};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("catalog root must be a JSON object keyed by place name")]
    NotAnObject,
    #[error("catalog contains an entry with an empty name")]
    EmptyName,
    #[error("catalog contains duplicate entry `{0}`")]
    DuplicateName(String),
}

/// Immutable place table. Iteration order is the order of the source data and
/// is what first-match resolution relies on.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: Vec<PlaceEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<PlaceEntry>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.name.as_str().trim().is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(CatalogError::DuplicateName(entry.name.0.clone()));
            }
        }
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
        let root: Value = serde_json::from_str(raw).map_err(CatalogError::Parse)?;
        let Value::Object(places) = root else {
            return Err(CatalogError::NotAnObject);
        };

        let entries = places
            .into_iter()
            .map(|(name, value)| entry_from_value(name.trim(), &value))
            .collect::<Vec<_>>();
        Self::new(entries)
    }

    pub fn entries(&self) -> &[PlaceEntry] {
        &self.entries
    }

    pub fn get(&self, name: &PlaceName) -> Option<&PlaceEntry> {
        self.entries.iter().find(|entry| &entry.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical names in ascending order.
    pub fn list_places(&self) -> Vec<&str> {
        let mut names = self.entries.iter().map(|entry| entry.name.as_str()).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }
}

fn entry_from_value(name: &str, value: &Value) -> PlaceEntry {
    let empty = Map::new();
    let fields = value.as_object().unwrap_or(&empty);

    PlaceEntry {
        name: PlaceName(name.to_string()),
        aliases: string_list(fields.get("aliases")),
        city: string_field(fields.get("city")).unwrap_or_default(),
        highlights: string_list(fields.get("highlights")),
        facts: string_list(fields.get("facts")),
        ticket: string_field(fields.get("ticket")).unwrap_or_else(|| DEFAULT_TICKET.to_string()),
        best_time: string_field(fields.get("best_time")).unwrap_or_default(),
        stops: stop_list(fields.get("stops")),
    }
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(|text| text.trim().to_string())
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn stop_list(value: Option<&Value>) -> Vec<Stop> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items.iter().filter_map(Value::as_object).map(stop_from_fields).collect()
}

fn stop_from_fields(fields: &Map<String, Value>) -> Stop {
    let name = string_field(fields.get("name"))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_STOP_NAME.to_string());
    let minutes = match fields.get("minutes") {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64))
            .unwrap_or(DEFAULT_STOP_MINUTES),
        Some(Value::String(text)) => text.trim().parse::<i64>().unwrap_or(DEFAULT_STOP_MINUTES),
        _ => DEFAULT_STOP_MINUTES,
    };
    Stop { name, minutes }
}
