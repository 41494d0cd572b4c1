use crate::domain::itinerary::{ItineraryPlan, PlannedStop, PLAN_NOTE};
use crate::domain::place::{PlaceEntry, Stop};
use crate::places::catalog::Catalog;

/// Budgets below this are raised to it before packing.
pub const MIN_BUDGET_MINUTES: u32 = 45;

#[derive(Clone, Copy, Debug)]
pub struct ItineraryPacker<'a> {
    catalog: &'a Catalog,
}

impl<'a> ItineraryPacker<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Case-insensitive equal-or-substring match (either direction) against
    /// canonical names, in catalog order.
    pub fn pick_city(&self, city_query: &str) -> Option<&'a PlaceEntry> {
        let query = city_query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        self.catalog.entries().iter().find(|entry| {
            let name = entry.name.as_str().to_lowercase();
            query == name || name.contains(&query) || query.contains(&name)
        })
    }

    pub fn plan(&self, city_query: &str, minutes: u32) -> Option<ItineraryPlan> {
        let budget = minutes.max(MIN_BUDGET_MINUTES);
        let entry = self.pick_city(city_query)?;

        let (mut stops, mut planned_minutes) = pack_stops(&entry.stops, budget);
        if stops.is_empty() {
            let first = entry.stops.first()?;
            let capped = clamp_minutes(first.minutes).min(budget);
            stops = vec![PlannedStop { name: first.name.clone(), minutes: capped }];
            planned_minutes = capped;
        }

        Some(ItineraryPlan {
            city: entry.name.clone(),
            total_minutes: budget,
            planned_minutes,
            stops,
            note: PLAN_NOTE.to_string(),
        })
    }
}

/// Greedy pass in curated order: a stop is taken whenever it still fits.
/// Later, shorter stops may fill space an earlier long stop could not.
fn pack_stops(stops: &[Stop], budget: u32) -> (Vec<PlannedStop>, u32) {
    let mut chosen = Vec::new();
    let mut used = 0u32;
    for stop in stops {
        if stop.minutes <= 0 {
            continue;
        }
        let duration = clamp_minutes(stop.minutes);
        if used.saturating_add(duration) <= budget {
            chosen.push(PlannedStop { name: stop.name.clone(), minutes: duration });
            used += duration;
        }
    }
    (chosen, used)
}

fn clamp_minutes(minutes: i64) -> u32 {
    u32::try_from(minutes.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{ItineraryPacker, MIN_BUDGET_MINUTES};
    use crate::domain::itinerary::PlannedStop;
    use crate::domain::place::{PlaceEntry, Stop};
    use crate::places::catalog::Catalog;

    fn kandy_with(stops: Vec<Stop>) -> Catalog {
        Catalog::new(vec![
            PlaceEntry::named("Sigiriya").with_stops(vec![Stop::new("Summit", 90)]),
            PlaceEntry::named("Kandy").with_stops(stops),
            PlaceEntry::named("Ella"),
        ])
        .expect("fixture catalog is valid")
    }

    fn stop_names(stops: &[PlannedStop]) -> Vec<&str> {
        stops.iter().map(|stop| stop.name.as_str()).collect()
    }

    #[test]
    fn greedy_pass_keeps_order_and_skips_what_does_not_fit() {
        let catalog =
            kandy_with(vec![Stop::new("A", 60), Stop::new("B", 90), Stop::new("C", 45)]);
        let plan = ItineraryPacker::new(&catalog).plan("Kandy", 150).expect("plan");

        assert_eq!(stop_names(&plan.stops), vec!["A", "B"]);
        assert_eq!(plan.planned_minutes, 150);
        assert_eq!(plan.total_minutes, 150);
    }

    #[test]
    fn later_short_stops_fill_remaining_budget() {
        let catalog =
            kandy_with(vec![Stop::new("A", 60), Stop::new("B", 120), Stop::new("C", 30)]);
        let plan = ItineraryPacker::new(&catalog).plan("kandy", 100).expect("plan");

        assert_eq!(stop_names(&plan.stops), vec!["A", "C"]);
        assert_eq!(plan.planned_minutes, 90);
    }

    #[test]
    fn oversized_first_stop_falls_back_to_capped_single_stop() {
        let catalog = kandy_with(vec![Stop::new("A", 200)]);
        let plan = ItineraryPacker::new(&catalog).plan("Kandy", 60).expect("fallback plan");

        assert_eq!(plan.stops, vec![PlannedStop { name: "A".to_string(), minutes: 60 }]);
        assert_eq!(plan.planned_minutes, 60);
    }

    #[test]
    fn non_positive_durations_are_skipped() {
        let catalog =
            kandy_with(vec![Stop::new("Closed", 0), Stop::new("Broken", -10), Stop::new("B", 45)]);
        let plan = ItineraryPacker::new(&catalog).plan("Kandy", 60).expect("plan");
        assert_eq!(stop_names(&plan.stops), vec!["B"]);
    }

    #[test]
    fn budget_below_floor_is_clamped() {
        let catalog = kandy_with(vec![Stop::new("A", 40), Stop::new("B", 10)]);
        let packer = ItineraryPacker::new(&catalog);

        let tiny = packer.plan("Kandy", 10).expect("plan");
        let floor = packer.plan("Kandy", MIN_BUDGET_MINUTES).expect("plan");
        assert_eq!(tiny, floor);
        assert_eq!(tiny.total_minutes, MIN_BUDGET_MINUTES);
        assert_eq!(stop_names(&tiny.stops), vec!["A"]);
    }

    #[test]
    fn planned_minutes_never_exceed_budget() {
        let catalog = kandy_with(vec![
            Stop::new("A", 200),
            Stop::new("B", 35),
            Stop::new("C", 50),
            Stop::new("D", 15),
        ]);
        let packer = ItineraryPacker::new(&catalog);
        for minutes in [0, 10, 45, 50, 60, 99, 100, 150, 300, 1_000] {
            let plan = packer.plan("Kandy", minutes).expect("plan");
            assert!(plan.planned_minutes <= plan.total_minutes, "budget {minutes}");
            assert!(!plan.stops.is_empty());
        }
    }

    #[test]
    fn unknown_city_or_city_without_stops_yields_none() {
        let catalog = kandy_with(vec![Stop::new("A", 60)]);
        let packer = ItineraryPacker::new(&catalog);
        assert!(packer.plan("Jaffna", 120).is_none());
        assert!(packer.plan("Ella", 120).is_none());
        assert!(packer.plan("   ", 120).is_none());
    }

    #[test]
    fn city_match_accepts_substrings_in_both_directions() {
        let catalog = kandy_with(vec![Stop::new("A", 60)]);
        let packer = ItineraryPacker::new(&catalog);
        assert_eq!(packer.pick_city("kan").map(|e| e.name.as_str()), Some("Kandy"));
        assert_eq!(packer.pick_city("Kandy City").map(|e| e.name.as_str()), Some("Kandy"));
    }
}
