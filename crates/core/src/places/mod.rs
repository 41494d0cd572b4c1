//! Place catalog and the deterministic engines that read it.

pub mod catalog;
pub mod itinerary;
pub mod resolver;
pub mod search;
pub mod similarity;

pub use catalog::{Catalog, CatalogError};
pub use itinerary::{ItineraryPacker, MIN_BUDGET_MINUTES};
pub use resolver::{normalize, PlaceFacts, PlaceResolver, FUZZY_MATCH_CUTOFF};
pub use search::{search, SearchHit};
