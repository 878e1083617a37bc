//! Integration tests for the Google Maps client against wiremock HTTP mocks.

use paseo::entities::{Coordinates, TravelMode};
use paseo::external::google_maps::GoogleMaps;
use paseo::external::MapsAPI;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> GoogleMaps {
    GoogleMaps::with_base_url("test-key".into(), base_url.into())
}

#[tokio::test]
async fn nearby_search_parses_results_and_token() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": "OK",
        "results": [
            {
                "place_id": "X",
                "name": "Parque del Retiro",
                "vicinity": "Plaza de la Independencia, 7",
                "geometry": { "location": { "lat": 40.4153, "lng": -3.6844 } },
                "rating": 4.7,
                "user_ratings_total": 183_000,
                "photos": [ { "photo_reference": "ref-1" } ]
            }
        ],
        "next_page_token": "tok-1"
    });

    Mock::given(method("GET"))
        .and(path("/maps/api/place/nearbysearch/json"))
        .and(query_param("key", "test-key"))
        .and(query_param("keyword", "parque"))
        .and(query_param("opennow", "true"))
        .and(query_param("language", "es"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let page = client
        .nearby_search(Coordinates::new(40.4168, -3.7038), "parque", 1500.0, true, "es")
        .await
        .expect("should parse nearby page");

    assert_eq!(page.results.len(), 1);
    let place = &page.results[0];
    assert_eq!(place.place_id.as_deref(), Some("X"));
    assert_eq!(place.rating, Some(4.7));
    assert_eq!(place.user_ratings_total, Some(183_000));
    assert_eq!(page.next_page_token.as_deref(), Some("tok-1"));
}

#[tokio::test]
async fn nearby_search_zero_results_is_an_empty_page() {
    let server = MockServer::start().await;

    let body = serde_json::json!({ "status": "ZERO_RESULTS", "results": [] });

    Mock::given(method("GET"))
        .and(path("/maps/api/place/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let page = client
        .nearby_search(Coordinates::new(40.4168, -3.7038), "parque", 1500.0, false, "es")
        .await
        .expect("zero results should not be an error");

    assert!(page.results.is_empty());
    assert!(page.next_page_token.is_none());
}

#[tokio::test]
async fn nearby_search_denied_is_an_error() {
    let server = MockServer::start().await;

    let body = serde_json::json!({ "status": "REQUEST_DENIED" });

    Mock::given(method("GET"))
        .and(path("/maps/api/place/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client
        .nearby_search(Coordinates::new(40.4168, -3.7038), "parque", 1500.0, false, "es")
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn nearby_search_page_follows_token() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": "OK",
        "results": [
            {
                "place_id": "Y",
                "name": "Jardín Botánico",
                "geometry": { "location": { "lat": 40.4114, "lng": -3.6906 } }
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/maps/api/place/nearbysearch/json"))
        .and(query_param("pagetoken", "tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let page = client
        .nearby_search_page("tok-1", "es")
        .await
        .expect("should parse follow-up page");

    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].place_id.as_deref(), Some("Y"));
}

#[tokio::test]
async fn directions_sums_leg_durations_and_keeps_order() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": "OK",
        "routes": [
            {
                "legs": [
                    { "duration": { "value": 600 } },
                    { "duration": { "value": 660 } }
                ],
                "waypoint_order": [1, 0]
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/maps/api/directions/json"))
        .and(query_param("origin", "Puerta del Sol, Madrid"))
        .and(query_param("destination", "40.4153,-3.6844"))
        .and(query_param("mode", "walking"))
        .and(query_param(
            "waypoints",
            "optimize:true|40.42,-3.71|40.43,-3.72",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let waypoints = vec!["40.42,-3.71".to_string(), "40.43,-3.72".to_string()];
    let route = client
        .directions(
            "Puerta del Sol, Madrid",
            &waypoints,
            "40.4153,-3.6844",
            TravelMode::Walking,
            true,
        )
        .await
        .expect("should parse directions")
        .expect("should find a route");

    assert_eq!(route.total_duration_secs(), 1260.0);
    assert_eq!(route.waypoint_order, Some(vec![1, 0]));
}

#[tokio::test]
async fn directions_zero_results_is_no_route() {
    let server = MockServer::start().await;

    let body = serde_json::json!({ "status": "ZERO_RESULTS", "routes": [] });

    Mock::given(method("GET"))
        .and(path("/maps/api/directions/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let route = client
        .directions("Sol", &[], "40.4153,-3.6844", TravelMode::Driving, false)
        .await
        .expect("no route should not be an error");

    assert!(route.is_none());
}

#[tokio::test]
async fn geocode_returns_first_match() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": "OK",
        "results": [
            {
                "formatted_address": "Calle Mayor, 1, 28013 Madrid, España",
                "geometry": { "location": { "lat": 40.4158, "lng": -3.7102 } }
            },
            {
                "formatted_address": "somewhere else",
                "geometry": { "location": { "lat": 0.0, "lng": 0.0 } }
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .and(query_param("address", "calle mayor 1"))
        .and(query_param("region", "es"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let place = client
        .geocode("calle mayor 1", "es", "es")
        .await
        .expect("should parse geocode response")
        .expect("should find a match");

    assert_eq!(place.formatted_address, "Calle Mayor, 1, 28013 Madrid, España");
    assert_eq!(place.geometry.location.lat, 40.4158);
}

#[tokio::test]
async fn reverse_geocode_returns_formatted_address() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": "OK",
        "results": [
            {
                "formatted_address": "Puerta del Sol, Madrid",
                "geometry": { "location": { "lat": 40.4168, "lng": -3.7038 } }
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .and(query_param("latlng", "40.4168,-3.7038"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let address = client
        .reverse_geocode(Coordinates::new(40.4168, -3.7038), "es")
        .await
        .expect("should parse reverse geocode response");

    assert_eq!(address.as_deref(), Some("Puerta del Sol, Madrid"));
}

#[tokio::test]
async fn upstream_5xx_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/directions/json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client
        .directions("Sol", &[], "40.4153,-3.6844", TravelMode::Driving, false)
        .await;

    assert!(result.is_err());
}
