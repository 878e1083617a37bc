use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Bicycling => "bicycling",
            Self::Transit => "transit",
        }
    }
}

impl Default for TravelMode {
    fn default() -> Self {
        Self::Driving
    }
}

/// Provider answer for one ordered stop list. A missing duration means the
/// provider could not produce a route; the waypoint order is the identity
/// permutation unless the provider reordered the stops.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteEstimate {
    pub duration_secs: Option<f64>,
    pub waypoint_order: Vec<usize>,
}

impl RouteEstimate {
    pub fn unknown(waypoint_count: usize) -> Self {
        Self {
            duration_secs: None,
            waypoint_order: identity_order(waypoint_count),
        }
    }
}

pub fn identity_order(waypoint_count: usize) -> Vec<usize> {
    (0..waypoint_count).collect()
}

/// Result of letting the provider reorder a full stop list: the chosen
/// permutation, the waypoints in that order, and the total duration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutePlan {
    pub order: Vec<usize>,
    pub waypoints: Vec<Coordinates>,
    pub destination: Option<Coordinates>,
    pub duration_secs: Option<f64>,
}

impl RoutePlan {
    pub fn empty() -> Self {
        Self {
            order: Vec::new(),
            waypoints: Vec::new(),
            destination: None,
            duration_secs: None,
        }
    }
}
