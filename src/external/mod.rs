pub mod google_maps;

use std::sync::Arc;

use async_trait::async_trait;

use crate::entities::{Coordinates, TravelMode};
use crate::error::Error;
use google_maps::{DirectionsRoute, GeocodedPlace, NearbyPage};

/// The provider capabilities the engine consumes. Implemented over the
/// Google Maps web services by [`google_maps::GoogleMaps`]; tests swap in a
/// deterministic fake.
#[async_trait]
pub trait MapsAPI {
    async fn nearby_search(
        &self,
        center: Coordinates,
        keyword: &str,
        radius: f64,
        open_now: bool,
        language: &str,
    ) -> Result<NearbyPage, Error>;

    async fn nearby_search_page(
        &self,
        page_token: &str,
        language: &str,
    ) -> Result<NearbyPage, Error>;

    /// `Ok(None)` means the provider found no route; transport and status
    /// errors are surfaced as `Err`.
    async fn directions(
        &self,
        origin: &str,
        waypoints: &[String],
        destination: &str,
        mode: TravelMode,
        optimize_waypoints: bool,
    ) -> Result<Option<DirectionsRoute>, Error>;

    async fn geocode(
        &self,
        address: &str,
        language: &str,
        region: &str,
    ) -> Result<Option<GeocodedPlace>, Error>;

    async fn reverse_geocode(
        &self,
        coordinates: Coordinates,
        language: &str,
    ) -> Result<Option<String>, Error>;
}

pub type DynMapsAPI = Arc<dyn MapsAPI + Send + Sync>;
