use serde::{Deserialize, Serialize};

use crate::domain::place::PlaceName;

pub const PLAN_NOTE: &str =
    "Greedy time packer. Travel time, maps and opening hours are not modeled.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedStop {
    pub name: String,
    pub minutes: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryPlan {
    pub city: PlaceName,
    pub total_minutes: u32,
    pub planned_minutes: u32,
    pub stops: Vec<PlannedStop>,
    pub note: String,
}

impl ItineraryPlan {
    pub fn utilization_pct(&self) -> u32 {
        if self.total_minutes == 0 {
            return 0;
        }
        self.planned_minutes.saturating_mul(100) / self.total_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::{ItineraryPlan, PlannedStop, PLAN_NOTE};
    use crate::domain::place::PlaceName;

    fn plan(total_minutes: u32, planned_minutes: u32) -> ItineraryPlan {
        ItineraryPlan {
            city: PlaceName("Kandy".to_string()),
            total_minutes,
            planned_minutes,
            stops: vec![PlannedStop { name: "Kandy Lake".to_string(), minutes: planned_minutes }],
            note: PLAN_NOTE.to_string(),
        }
    }

    #[test]
    fn utilization_rounds_down_and_handles_zero_budget() {
        assert_eq!(plan(120, 105).utilization_pct(), 87);
        assert_eq!(plan(150, 150).utilization_pct(), 100);
        assert_eq!(plan(0, 0).utilization_pct(), 0);
    }
}
