mod detour_api;
mod helpers;
mod location_api;
mod ranking_api;
mod route_api;
mod search_api;

#[cfg(test)]
pub(crate) mod fake_maps;

use std::sync::Arc;

use crate::{
    api::API,
    cache::TtlCache,
    config::Config,
    entities::{RouteEstimate, TravelMode},
    error::Error,
    external::{google_maps::GoogleMaps, DynMapsAPI},
};

pub use helpers::distance_meters;
pub use ranking_api::filter_by_rating;

pub struct Engine {
    maps: DynMapsAPI,
    route_cache: TtlCache<RouteKey, RouteEstimate>,
    config: Config,
}

impl Engine {
    pub fn new(maps: DynMapsAPI, config: Config) -> Self {
        let route_cache = TtlCache::new(config.route_cache_ttl);

        Self {
            maps,
            route_cache,
            config,
        }
    }

    /// Engine over the production Google Maps web services, configured from
    /// the environment.
    pub fn from_env() -> Result<Self, Error> {
        let maps: DynMapsAPI = Arc::new(GoogleMaps::new()?);

        Ok(Self::new(maps, Config::default()))
    }
}

/// Full signature of one directions request, the route cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct RouteKey {
    origin: String,
    waypoints: Vec<String>,
    destination: String,
    mode: TravelMode,
    optimize: bool,
}

impl API for Engine {}
