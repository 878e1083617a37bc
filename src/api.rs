use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Weights;
use crate::entities::{
    CandidateSet, Coordinates, DetourResult, RouteEstimate, RoutePlan, ScoredPlace, TravelMode,
};
use crate::error::Error;

#[async_trait]
pub trait SearchAPI {
    /// Nearby-search aggregation over every term, deduplicated by place id.
    /// Always returns a (possibly empty) set; per-term provider failures
    /// contribute zero results.
    async fn aggregate(
        &self,
        terms: &[String],
        center: Coordinates,
        radius: f64,
        open_now: bool,
        language: &str,
    ) -> Result<CandidateSet, Error>;
}

#[async_trait]
pub trait RankingAPI {
    /// Annotates every candidate with distance, sub-scores and the weighted
    /// composite score. Output order is unspecified.
    fn score(
        &self,
        candidates: &CandidateSet,
        center: Coordinates,
        radius: f64,
        weights: Weights,
    ) -> Vec<ScoredPlace>;

    /// Aggregate + score with the configured weights, best first.
    async fn rank(
        &self,
        terms: &[String],
        center: Coordinates,
        radius: f64,
        open_now: bool,
        language: &str,
    ) -> Result<Vec<ScoredPlace>, Error>;
}

#[async_trait]
pub trait LocationAPI {
    async fn geocode_address(
        &self,
        address: &str,
        language: &str,
        region: &str,
    ) -> Result<(Coordinates, String), Error>;

    /// Formatted address for a coordinate, falling back to a "lat,lon"
    /// string when the provider has no answer.
    async fn reverse_geocode(&self, coordinates: Coordinates, language: &str) -> String;
}

#[async_trait]
pub trait RouteAPI {
    /// Total duration and waypoint order for origin → waypoints →
    /// destination. Provider failures surface as an unknown duration, not
    /// as an error; an empty origin is rejected.
    async fn route(
        &self,
        origin: &str,
        waypoints: &[Coordinates],
        destination: Coordinates,
        mode: TravelMode,
        optimize: bool,
    ) -> Result<RouteEstimate, Error>;

    /// Lets the provider pick the best order for a full stop list. The last
    /// stop stays the destination; on failure the stops keep their given
    /// order with an unknown duration.
    async fn plan_route(
        &self,
        origin: &str,
        stops: &[Coordinates],
        mode: TravelMode,
    ) -> Result<RoutePlan, Error>;
}

#[async_trait]
pub trait DetourAPI {
    /// Marginal cost of inserting each unselected candidate into the route
    /// through `selected_stops`, as a ratio over the base duration plus a
    /// qualitative label. Candidates that are selected, lack a coordinate,
    /// or could not be routed come back unknown.
    async fn evaluate(
        &self,
        origin: &str,
        selected_stops: &[Coordinates],
        candidates: &[ScoredPlace],
        mode: TravelMode,
    ) -> Result<HashMap<String, DetourResult>, Error>;
}

pub trait API: SearchAPI + RankingAPI + LocationAPI + RouteAPI + DetourAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
