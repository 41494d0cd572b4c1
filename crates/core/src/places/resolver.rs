use serde::{Deserialize, Serialize};

use crate::domain::place::{PlaceEntry, PlaceName};
use crate::places::catalog::Catalog;
use crate::places::similarity::ratio;

/// Minimum similarity for a fuzzy name match to be accepted.
pub const FUZZY_MATCH_CUTOFF: f64 = 0.6;

/// Facts returned by a lookup are capped at this many entries.
pub const LOOKUP_FACT_LIMIT: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceFacts {
    pub place: PlaceName,
    pub facts: Vec<String>,
    pub ticket: String,
}

/// Lowercase, collapse every run of non-alphanumeric characters into one
/// space, trim.
pub fn normalize(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let mut pending_space = false;
    for character in text.chars().flat_map(char::to_lowercase) {
        if character.is_ascii_alphanumeric() {
            if pending_space && !normalized.is_empty() {
                normalized.push(' ');
            }
            pending_space = false;
            normalized.push(character);
        } else {
            pending_space = true;
        }
    }
    normalized
}

#[derive(Clone, Copy, Debug)]
pub struct PlaceResolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> PlaceResolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Resolves a free-text place phrase to a canonical name.
    ///
    /// Exact and substring matches against names and aliases are tried first,
    /// in catalog order, and the first compatible entry wins even when a later
    /// entry would match more specifically. Only when nothing is compatible is
    /// the closest name by similarity ratio considered.
    pub fn resolve(&self, query: &str) -> Option<&'a PlaceName> {
        let normalized_query = normalize(query);
        if normalized_query.is_empty() {
            return None;
        }
        self.substring_match(&normalized_query).or_else(|| self.fuzzy_match(&normalized_query))
    }

    pub fn resolve_entry(&self, query: &str) -> Option<&'a PlaceEntry> {
        let name = self.resolve(query)?;
        self.catalog.get(name)
    }

    pub fn lookup(&self, query: &str) -> Option<PlaceFacts> {
        let entry = self.resolve_entry(query)?;
        Some(PlaceFacts {
            place: entry.name.clone(),
            facts: entry.facts.iter().take(LOOKUP_FACT_LIMIT).cloned().collect(),
            ticket: entry.ticket.clone(),
        })
    }

    fn substring_match(&self, normalized_query: &str) -> Option<&'a PlaceName> {
        self.catalog
            .entries()
            .iter()
            .find(|entry| {
                entry.keys().map(normalize).any(|key| {
                    !key.is_empty()
                        && (key == normalized_query
                            || key.contains(normalized_query)
                            || normalized_query.contains(key.as_str()))
                })
            })
            .map(|entry| &entry.name)
    }

    fn fuzzy_match(&self, normalized_query: &str) -> Option<&'a PlaceName> {
        let mut best: Option<(f64, String, &'a PlaceName)> = None;
        for entry in self.catalog.entries() {
            let key = normalize(entry.name.as_str());
            let score = ratio(&key, normalized_query);
            if score < FUZZY_MATCH_CUTOFF {
                continue;
            }
            // equal scores prefer the lexically greater key
            let better = match &best {
                None => true,
                Some((best_score, best_key, _)) => {
                    score > *best_score || (score == *best_score && key > *best_key)
                }
            };
            if better {
                best = Some((score, key, &entry.name));
            }
        }
        best.map(|(_, _, name)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize, PlaceResolver};
    use crate::domain::place::PlaceEntry;
    use crate::places::catalog::Catalog;

    fn catalog_fixture() -> Catalog {
        Catalog::new(vec![
            PlaceEntry::named("Sigiriya")
                .with_aliases(["Lion Rock", "Sigiri"])
                .with_facts(["a", "b", "c", "d", "e", "f"])
                .with_ticket("USD 30"),
            PlaceEntry::named("Kandy").with_aliases(["Senkadagala"]),
            PlaceEntry::named("Galle Fort").with_aliases(["Galle"]),
            PlaceEntry::named("Nuwara Eliya"),
        ])
        .expect("fixture catalog is valid")
    }

    #[test]
    fn normalize_collapses_punctuation_and_case() {
        assert_eq!(normalize("  Nuwara--Eliya!! "), "nuwara eliya");
        assert_eq!(normalize("Galle   Fort"), "galle fort");
        assert_eq!(normalize("?!"), "");
    }

    #[test]
    fn equal_normalized_forms_resolve_to_canonical_name() {
        let catalog = catalog_fixture();
        let resolver = PlaceResolver::new(&catalog);
        for (query, expected) in [
            ("SIGIRIYA", "Sigiriya"),
            ("lion-rock", "Sigiriya"),
            ("nuwara_eliya", "Nuwara Eliya"),
            ("galle", "Galle Fort"),
        ] {
            assert_eq!(resolver.resolve(query).map(|name| name.as_str()), Some(expected));
        }
    }

    #[test]
    fn substring_in_either_direction_matches() {
        let catalog = catalog_fixture();
        let resolver = PlaceResolver::new(&catalog);
        assert_eq!(resolver.resolve("tell me about kandy please").map(|n| n.as_str()), Some("Kandy"));
        assert_eq!(resolver.resolve("eliya").map(|n| n.as_str()), Some("Nuwara Eliya"));
    }

    #[test]
    fn first_entry_in_catalog_order_wins_ties() {
        let catalog = Catalog::new(vec![
            PlaceEntry::named("Kandy Lake"),
            PlaceEntry::named("Kandy"),
        ])
        .expect("valid catalog");
        let resolver = PlaceResolver::new(&catalog);
        assert_eq!(resolver.resolve("kandy").map(|n| n.as_str()), Some("Kandy Lake"));
    }

    #[test]
    fn fuzzy_phase_accepts_close_typos_only() {
        let catalog = catalog_fixture();
        let resolver = PlaceResolver::new(&catalog);
        assert_eq!(resolver.resolve("Sigirya").map(|n| n.as_str()), Some("Sigiriya"));
        assert_eq!(resolver.resolve("kandi").map(|n| n.as_str()), Some("Kandy"));
        assert_eq!(resolver.resolve("zzzzzz"), None);
        assert_eq!(resolver.resolve("   "), None);
    }

    #[test]
    fn lookup_caps_facts_and_carries_ticket() {
        let catalog = catalog_fixture();
        let resolver = PlaceResolver::new(&catalog);
        let facts = resolver.lookup("lion rock").expect("lookup should resolve");
        assert_eq!(facts.place.as_str(), "Sigiriya");
        assert_eq!(facts.facts.len(), 5);
        assert_eq!(facts.ticket, "USD 30");

        let kandy = resolver.lookup("kandy").expect("kandy resolves");
        assert_eq!(kandy.ticket, "N/A");
        assert!(kandy.facts.is_empty());
    }

    #[test]
    fn resolve_is_idempotent() {
        let catalog = catalog_fixture();
        let resolver = PlaceResolver::new(&catalog);
        for query in ["Sigirya", "galle", "unknown place name"] {
            assert_eq!(resolver.resolve(query), resolver.resolve(query));
        }
    }
}
