use tourguide_core::places::search;

use crate::commands::{load_catalog, CommandResult, EXIT_NOT_FOUND};

pub fn run(query: &str) -> CommandResult {
    let (_, catalog) = match load_catalog("search") {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };

    let hits = search(&catalog, query);
    if hits.is_empty() {
        return CommandResult::failure(
            "search",
            "no_matches",
            format!("no places match `{}`", query.trim()),
            EXIT_NOT_FOUND,
        );
    }
    CommandResult::success_with_data("search", format!("{} matching places", hits.len()), Some(hits))
}
