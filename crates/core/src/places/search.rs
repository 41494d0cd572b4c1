use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::place::PlaceEntry;
use crate::places::catalog::Catalog;
use crate::places::resolver::normalize;

pub const PHRASE_MATCH_SCORE: u32 = 3;
pub const MAX_SEARCH_RESULTS: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub name: String,
    pub city: String,
    pub best_time: String,
    pub score: u32,
}

/// Keyword search over name, city, highlights and facts.
///
/// A hit scores [`PHRASE_MATCH_SCORE`] when the whole normalized query appears
/// in the entry text, plus the number of distinct query tokens when any one of
/// them appears. Results keep catalog order among equal scores.
pub fn search(catalog: &Catalog, query: &str) -> Vec<SearchHit> {
    let normalized_query = normalize(query);
    if normalized_query.is_empty() {
        return Vec::new();
    }
    let tokens = normalized_query.split_whitespace().collect::<BTreeSet<_>>();

    let mut hits = catalog
        .entries()
        .iter()
        .filter_map(|entry| {
            let score = score_entry(entry, &normalized_query, &tokens);
            (score > 0).then(|| SearchHit {
                name: entry.name.0.clone(),
                city: entry.city.clone(),
                best_time: entry.best_time.clone(),
                score,
            })
        })
        .collect::<Vec<_>>();

    hits.sort_by(|left, right| right.score.cmp(&left.score));
    hits.truncate(MAX_SEARCH_RESULTS);
    hits
}

fn score_entry(entry: &PlaceEntry, normalized_query: &str, tokens: &BTreeSet<&str>) -> u32 {
    let text = searchable_text(entry);
    let mut score = 0;
    if text.contains(normalized_query) {
        score += PHRASE_MATCH_SCORE;
    }
    if tokens.iter().any(|token| text.contains(token)) {
        score += tokens.len() as u32;
    }
    score
}

fn searchable_text(entry: &PlaceEntry) -> String {
    [
        entry.name.as_str().to_string(),
        entry.city.clone(),
        entry.highlights.join(" "),
        entry.facts.join(" "),
    ]
    .join(" ")
    .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::search;
    use crate::domain::place::PlaceEntry;
    use crate::places::catalog::Catalog;

    fn catalog_fixture() -> Catalog {
        Catalog::new(vec![
            PlaceEntry::named("Sigiriya")
                .with_city("Dambulla")
                .with_highlights(["rock fortress", "frescoes"])
                .with_best_time("Early morning"),
            PlaceEntry::named("Dambulla Cave Temple")
                .with_city("Dambulla")
                .with_facts(["Largest cave temple complex in Sri Lanka"]),
            PlaceEntry::named("Galle Fort").with_city("Galle").with_highlights(["ramparts"]),
        ])
        .expect("fixture catalog is valid")
    }

    #[test]
    fn phrase_match_outranks_token_only_match() {
        let catalog = catalog_fixture();
        let hits = search(&catalog, "rock fortress");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Sigiriya");
        assert_eq!(hits[0].score, 3 + 2);
        assert_eq!(hits[0].best_time, "Early morning");
    }

    #[test]
    fn equal_scores_keep_catalog_order() {
        let catalog = catalog_fixture();
        let hits = search(&catalog, "Dambulla");
        let names = hits.iter().map(|hit| hit.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Sigiriya", "Dambulla Cave Temple"]);
        assert!(hits.iter().all(|hit| hit.score == 4));
    }

    #[test]
    fn token_overlap_without_phrase_scores_token_count() {
        let catalog = catalog_fixture();
        let hits = search(&catalog, "ramparts sunset");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Galle Fort");
        assert_eq!(hits[0].score, 2);
    }

    #[test]
    fn no_overlap_yields_no_hits_and_search_is_idempotent() {
        let catalog = catalog_fixture();
        assert!(search(&catalog, "volcano").is_empty());
        assert!(search(&catalog, " ?! ").is_empty());
        assert_eq!(search(&catalog, "galle"), search(&catalog, "galle"));
    }
}
