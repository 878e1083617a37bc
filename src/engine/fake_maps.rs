use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::engine::Engine;
use crate::entities::{Coordinates, Place, ScoredPlace, TravelMode};
use crate::error::{upstream_error, Error};
use crate::external::google_maps::{
    DirectionsRoute, GeocodedPlace, Geometry, LatLng, Leg, LegDuration, NearbyPage, NearbyPlace,
};
use crate::external::MapsAPI;

/// Deterministic stand-in for the Google Maps services. Behavior is
/// scripted up front; every call is counted.
#[derive(Default)]
pub struct FakeMaps {
    pub nearby_pages: Mutex<HashMap<(String, bool), NearbyPage>>,
    pub token_pages: Mutex<HashMap<String, NearbyPage>>,
    pub durations: Mutex<HashMap<Vec<String>, f64>>,
    pub default_duration: Option<f64>,
    pub waypoint_order: Option<Vec<usize>>,
    pub geocoded: Option<GeocodedPlace>,
    pub reverse_address: Option<String>,
    pub fail_directions: bool,
    pub nearby_calls: AtomicUsize,
    pub directions_calls: AtomicUsize,
}

impl FakeMaps {
    pub fn script_nearby(&self, keyword: &str, open_now: bool, page: NearbyPage) {
        self.nearby_pages
            .lock()
            .unwrap()
            .insert((keyword.to_string(), open_now), page);
    }

    pub fn script_page(&self, token: &str, page: NearbyPage) {
        self.token_pages
            .lock()
            .unwrap()
            .insert(token.to_string(), page);
    }

    pub fn script_duration(&self, waypoints: &[Coordinates], secs: f64) {
        let key = waypoints.iter().map(|w| String::from(*w)).collect();
        self.durations.lock().unwrap().insert(key, secs);
    }
}

#[async_trait]
impl MapsAPI for FakeMaps {
    async fn nearby_search(
        &self,
        _center: Coordinates,
        keyword: &str,
        _radius: f64,
        open_now: bool,
        _language: &str,
    ) -> Result<NearbyPage, Error> {
        self.nearby_calls.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .nearby_pages
            .lock()
            .unwrap()
            .get(&(keyword.to_string(), open_now))
            .cloned()
            .unwrap_or_default())
    }

    async fn nearby_search_page(
        &self,
        page_token: &str,
        _language: &str,
    ) -> Result<NearbyPage, Error> {
        self.nearby_calls.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .token_pages
            .lock()
            .unwrap()
            .get(page_token)
            .cloned()
            .unwrap_or_default())
    }

    async fn directions(
        &self,
        _origin: &str,
        waypoints: &[String],
        _destination: &str,
        _mode: TravelMode,
        optimize_waypoints: bool,
    ) -> Result<Option<DirectionsRoute>, Error> {
        self.directions_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_directions {
            return Err(upstream_error());
        }

        let secs = self
            .durations
            .lock()
            .unwrap()
            .get(waypoints)
            .copied()
            .or(self.default_duration);

        Ok(secs.map(|value| DirectionsRoute {
            legs: vec![Leg {
                duration: LegDuration { value },
            }],
            waypoint_order: if optimize_waypoints {
                self.waypoint_order.clone()
            } else {
                None
            },
        }))
    }

    async fn geocode(
        &self,
        _address: &str,
        _language: &str,
        _region: &str,
    ) -> Result<Option<GeocodedPlace>, Error> {
        Ok(self.geocoded.clone())
    }

    async fn reverse_geocode(
        &self,
        _coordinates: Coordinates,
        _language: &str,
    ) -> Result<Option<String>, Error> {
        Ok(self.reverse_address.clone())
    }
}

pub fn test_config() -> Config {
    Config {
        page_delay: Duration::from_millis(1),
        ..Config::default()
    }
}

pub fn engine_with(maps: Arc<FakeMaps>) -> Engine {
    Engine::new(maps, test_config())
}

pub fn raw_place(id: &str, lat: f64, lng: f64) -> NearbyPlace {
    NearbyPlace {
        place_id: Some(id.to_string()),
        name: Some(format!("Lugar {}", id)),
        vicinity: None,
        geometry: Some(Geometry {
            location: LatLng { lat, lng },
        }),
        rating: None,
        user_ratings_total: None,
        photos: None,
    }
}

pub fn page_of(results: Vec<NearbyPlace>) -> NearbyPage {
    NearbyPage {
        results,
        next_page_token: None,
    }
}

pub fn scored_candidate(id: &str, coordinates: Option<Coordinates>) -> ScoredPlace {
    ScoredPlace {
        place: Place {
            id: id.to_string(),
            name: format!("Lugar {}", id),
            address: None,
            coordinates,
            rating: None,
            user_ratings_total: 0,
            matched_terms: [String::from("parque")].into(),
            photo_reference: None,
            maps_link: None,
            selected: false,
        },
        distance_m: None,
        rating_score: 0.0,
        reviews_score: 0.0,
        proximity_score: 0.0,
        score: 0.0,
    }
}
