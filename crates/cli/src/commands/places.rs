use crate::commands::{load_catalog, CommandResult};

pub fn run() -> CommandResult {
    let (_, catalog) = match load_catalog("places") {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };

    let names = catalog.list_places();
    CommandResult::success_with_data("places", format!("{} places in catalog", names.len()), Some(names))
}
