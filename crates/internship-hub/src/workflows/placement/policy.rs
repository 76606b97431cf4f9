use serde::{Deserialize, Serialize};

/// Numeric limits enforced by the eligibility rules and posting constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementPolicy {
    pub max_active_applications: usize,
    pub max_postings_per_representative: usize,
    pub max_slots: u8,
    /// Students up to and including this year may only apply to basic-level postings.
    pub junior_year_limit: u8,
}

impl Default for PlacementPolicy {
    fn default() -> Self {
        Self {
            max_active_applications: 3,
            max_postings_per_representative: 5,
            max_slots: 10,
            junior_year_limit: 2,
        }
    }
}
