use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::env;

use crate::{
    entities::{Coordinates, TravelMode},
    error::{invalid_input_error, upstream_error, Error},
};

use super::MapsAPI;

const DEFAULT_API_BASE: &str = "maps.googleapis.com";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NearbyPlace {
    pub place_id: Option<String>,
    pub name: Option<String>,
    pub vicinity: Option<String>,
    pub geometry: Option<Geometry>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u64>,
    pub photos: Option<Vec<Photo>>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for Coordinates {
    fn from(location: LatLng) -> Self {
        Coordinates::new(location.lat, location.lng)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Photo {
    pub photo_reference: Option<String>,
}

/// One page of nearby-search results. A present `next_page_token` means the
/// provider holds more pages behind it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NearbyPage {
    pub results: Vec<NearbyPlace>,
    pub next_page_token: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DirectionsRoute {
    pub legs: Vec<Leg>,
    pub waypoint_order: Option<Vec<usize>>,
}

impl DirectionsRoute {
    pub fn total_duration_secs(&self) -> f64 {
        self.legs.iter().map(|leg| leg.duration.value).sum()
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Leg {
    pub duration: LegDuration,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LegDuration {
    pub value: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeocodedPlace {
    pub formatted_address: String,
    pub geometry: Geometry,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Response<T> {
    status: String,
    results: Option<T>,
    routes: Option<T>,
    next_page_token: Option<String>,
}

pub struct GoogleMaps {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleMaps {
    /// Client against the production web services. The API key comes from
    /// `GOOGLE_MAPS_API_KEY`; `GOOGLE_MAPS_API_BASE` overrides the host.
    pub fn new() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        let api_key = env::var("GOOGLE_MAPS_API_KEY")?;
        let api_base =
            env::var("GOOGLE_MAPS_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into());

        Ok(Self::with_base_url(api_key, format!("https://{}", api_base)))
    }

    /// Client with an explicit base URL, for pointing at a mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn photo_url(&self, photo_reference: &str, maxwidth: u32) -> Result<String, Error> {
        let mut url = Url::parse(&format!("{}/maps/api/place/photo", self.base_url))
            .map_err(|_| invalid_input_error())?;
        url.query_pairs_mut()
            .append_pair("maxwidth", &maxwidth.to_string())
            .append_pair("photoreference", photo_reference)
            .append_pair("key", &self.api_key);

        Ok(url.to_string())
    }

    async fn fetch<T>(&self, request: reqwest::RequestBuilder) -> Result<Response<T>, Error>
    where
        T: serde::de::DeserializeOwned,
    {
        let res = request.query(&[("key", &self.api_key)]).send().await?;

        let status_code = res.status().as_u16();

        if status_code >= 400 && status_code < 500 {
            return Err(invalid_input_error());
        } else if status_code != 200 {
            return Err(upstream_error());
        }

        Ok(res.json().await?)
    }
}

#[async_trait]
impl MapsAPI for GoogleMaps {
    #[tracing::instrument(skip(self))]
    async fn nearby_search(
        &self,
        center: Coordinates,
        keyword: &str,
        radius: f64,
        open_now: bool,
        language: &str,
    ) -> Result<NearbyPage, Error> {
        let location: String = center.into();

        let url = format!("{}/maps/api/place/nearbysearch/json", self.base_url);

        let mut request = self
            .client
            .get(url)
            .query(&[("location", location)])
            .query(&[("keyword", keyword)])
            .query(&[("radius", radius)])
            .query(&[("language", language)]);
        if open_now {
            request = request.query(&[("opennow", "true")]);
        }

        let data: Response<Vec<NearbyPlace>> = self.fetch(request).await?;

        if !(data.status == "OK" || data.status == "ZERO_RESULTS") {
            return Err(upstream_error());
        }

        Ok(NearbyPage {
            results: data.results.unwrap_or_default(),
            next_page_token: data.next_page_token,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn nearby_search_page(
        &self,
        page_token: &str,
        language: &str,
    ) -> Result<NearbyPage, Error> {
        let url = format!("{}/maps/api/place/nearbysearch/json", self.base_url);

        let request = self
            .client
            .get(url)
            .query(&[("pagetoken", page_token)])
            .query(&[("language", language)]);

        let data: Response<Vec<NearbyPlace>> = self.fetch(request).await?;

        if !(data.status == "OK" || data.status == "ZERO_RESULTS") {
            return Err(upstream_error());
        }

        Ok(NearbyPage {
            results: data.results.unwrap_or_default(),
            next_page_token: data.next_page_token,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn directions(
        &self,
        origin: &str,
        waypoints: &[String],
        destination: &str,
        mode: TravelMode,
        optimize_waypoints: bool,
    ) -> Result<Option<DirectionsRoute>, Error> {
        let url = format!("{}/maps/api/directions/json", self.base_url);

        let mut request = self
            .client
            .get(url)
            .query(&[("origin", origin)])
            .query(&[("destination", destination)])
            .query(&[("mode", mode.name())])
            .query(&[("departure_time", chrono::Utc::now().timestamp())]);
        if !waypoints.is_empty() {
            let prefix = if optimize_waypoints {
                "optimize:true|"
            } else {
                ""
            };
            let joined = format!("{}{}", prefix, waypoints.join("|"));
            request = request.query(&[("waypoints", joined)]);
        }

        let data: Response<Vec<DirectionsRoute>> = self.fetch(request).await?;

        match data.status.as_str() {
            "OK" => Ok(data.routes.unwrap_or_default().into_iter().next()),
            "ZERO_RESULTS" | "NOT_FOUND" => Ok(None),
            _ => Err(upstream_error()),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn geocode(
        &self,
        address: &str,
        language: &str,
        region: &str,
    ) -> Result<Option<GeocodedPlace>, Error> {
        let url = format!("{}/maps/api/geocode/json", self.base_url);

        let request = self
            .client
            .get(url)
            .query(&[("address", address)])
            .query(&[("language", language)])
            .query(&[("region", region)]);

        let data: Response<Vec<GeocodedPlace>> = self.fetch(request).await?;

        match data.status.as_str() {
            "OK" => Ok(data.results.unwrap_or_default().into_iter().next()),
            "ZERO_RESULTS" => Ok(None),
            _ => Err(upstream_error()),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn reverse_geocode(
        &self,
        coordinates: Coordinates,
        language: &str,
    ) -> Result<Option<String>, Error> {
        let latlng: String = coordinates.into();

        let url = format!("{}/maps/api/geocode/json", self.base_url);

        let request = self
            .client
            .get(url)
            .query(&[("latlng", latlng)])
            .query(&[("language", language)]);

        let data: Response<Vec<GeocodedPlace>> = self.fetch(request).await?;

        match data.status.as_str() {
            "OK" => Ok(data
                .results
                .unwrap_or_default()
                .into_iter()
                .next()
                .map(|place| place.formatted_address)),
            "ZERO_RESULTS" => Ok(None),
            _ => Err(upstream_error()),
        }
    }
}

/// Pin link for one place, suitable for `Place::maps_link`.
pub fn maps_search_link(coordinates: Coordinates) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={},{}",
        coordinates.latitude, coordinates.longitude
    )
}

/// Shareable directions link. The destination is a place id when one is
/// known, free text otherwise; one of the two is required.
pub fn directions_link(
    origin: &str,
    destination_place_id: Option<&str>,
    destination_text: Option<&str>,
    mode: TravelMode,
    waypoints: &[Coordinates],
    optimize_waypoints: bool,
) -> Result<String, Error> {
    if origin.trim().is_empty() {
        return Err(invalid_input_error());
    }

    let destination = match (destination_place_id, destination_text) {
        (Some(place_id), _) => format!("place_id:{}", place_id),
        (None, Some(text)) if !text.trim().is_empty() => text.to_string(),
        _ => return Err(invalid_input_error()),
    };

    let mut url = Url::parse("https://www.google.com/maps/dir/?api=1")
        .map_err(|_| invalid_input_error())?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("origin", origin);
        pairs.append_pair("destination", &destination);
        pairs.append_pair("travelmode", mode.name());
        if !waypoints.is_empty() {
            let prefix = if optimize_waypoints {
                "optimize:true|"
            } else {
                ""
            };
            let joined = waypoints
                .iter()
                .map(|w| format!("{:.6},{:.6}", w.latitude, w.longitude))
                .collect::<Vec<_>>()
                .join("|");
            pairs.append_pair("waypoints", &format!("{}{}", prefix, joined));
        }
    }

    Ok(url.to_string())
}

#[test]
fn maps_search_link_test() {
    let link = maps_search_link(Coordinates::new(40.4168, -3.7038));
    assert_eq!(
        link,
        "https://www.google.com/maps/search/?api=1&query=40.4168,-3.7038"
    );
}

#[test]
fn directions_link_test() {
    let link = directions_link(
        "Puerta del Sol, Madrid",
        None,
        Some("Retiro"),
        TravelMode::Walking,
        &[Coordinates::new(40.415363, -3.707398)],
        true,
    )
    .unwrap();

    assert!(link.starts_with("https://www.google.com/maps/dir/?api=1"));
    assert!(link.contains("travelmode=walking"));
    assert!(link.contains("optimize%3Atrue%7C40.415363%2C-3.707398"));
}

#[test]
fn directions_link_prefers_place_id_test() {
    let link = directions_link(
        "Callao",
        Some("ChIJxyz"),
        Some("ignored"),
        TravelMode::Driving,
        &[],
        false,
    )
    .unwrap();

    assert!(link.contains("destination=place_id%3AChIJxyz"));
}

#[test]
fn directions_link_requires_origin_and_destination_test() {
    assert!(directions_link("", None, Some("x"), TravelMode::Driving, &[], false).is_err());
    assert!(directions_link("x", None, None, TravelMode::Driving, &[], false).is_err());
}
