use tourguide_core::ItineraryPacker;

use crate::commands::{load_catalog, CommandResult, EXIT_NOT_FOUND};

pub fn run(city: &str, minutes: u32) -> CommandResult {
    let (_, catalog) = match load_catalog("plan") {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };

    match ItineraryPacker::new(&catalog).plan(city, minutes) {
        Some(plan) => CommandResult::success_with_data(
            "plan",
            format!(
                "{} — {}/{} min across {} stops ({}% of budget)",
                plan.city,
                plan.planned_minutes,
                plan.total_minutes,
                plan.stops.len(),
                plan.utilization_pct()
            ),
            Some(plan),
        ),
        None => CommandResult::failure(
            "plan",
            "city_not_found",
            format!("no catalog city matches `{}`", city.trim()),
            EXIT_NOT_FOUND,
        ),
    }
}
