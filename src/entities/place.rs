use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;

/// A deduplicated nearby-search result. One `Place` may have been sighted
/// under several search terms; `matched_terms` records all of them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub rating: Option<f64>,
    pub user_ratings_total: u64,
    pub matched_terms: BTreeSet<String>,
    pub photo_reference: Option<String>,
    pub maps_link: Option<String>,
    pub selected: bool,
}

impl Place {
    pub fn matched_terms_label(&self) -> String {
        self.matched_terms
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoredPlace {
    pub place: Place,
    pub distance_m: Option<f64>,
    pub rating_score: f64,
    pub reviews_score: f64,
    pub proximity_score: f64,
    pub score: f64,
}
