pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod places;

pub use domain::itinerary::{ItineraryPlan, PlannedStop};
pub use domain::place::{PlaceEntry, PlaceName, Stop};
pub use errors::{ApplicationError, InterfaceError};
pub use flows::{ConversationState, DialogueAction, DialogueEvent, FlowEngine, SlotFillingFlow};
pub use places::{Catalog, CatalogError, ItineraryPacker, PlaceFacts, PlaceResolver, SearchHit};
