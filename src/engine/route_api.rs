use async_trait::async_trait;

use super::{Engine, RouteKey};

use crate::{
    api::RouteAPI,
    entities::{identity_order, Coordinates, RouteEstimate, RoutePlan, TravelMode},
    error::{invalid_input_error, Error},
};

#[async_trait]
impl RouteAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn route(
        &self,
        origin: &str,
        waypoints: &[Coordinates],
        destination: Coordinates,
        mode: TravelMode,
        optimize: bool,
    ) -> Result<RouteEstimate, Error> {
        if origin.trim().is_empty() {
            return Err(invalid_input_error());
        }

        let waypoint_strings: Vec<String> =
            waypoints.iter().map(|w| String::from(*w)).collect();
        let destination_string: String = destination.into();

        let key = RouteKey {
            origin: origin.to_string(),
            waypoints: waypoint_strings.clone(),
            destination: destination_string.clone(),
            mode,
            optimize,
        };

        if let Some(hit) = self.route_cache.get(&key) {
            return Ok(hit);
        }

        let estimate = match self
            .maps
            .directions(origin, &waypoint_strings, &destination_string, mode, optimize)
            .await
        {
            Ok(Some(route)) => RouteEstimate {
                duration_secs: Some(route.total_duration_secs()),
                waypoint_order: route
                    .waypoint_order
                    .unwrap_or_else(|| identity_order(waypoints.len())),
            },
            Ok(None) => RouteEstimate::unknown(waypoints.len()),
            Err(err) => {
                tracing::warn!("directions query failed: {}", err);
                RouteEstimate::unknown(waypoints.len())
            }
        };

        // negative answers are memoized too; the provider will not change
        // its mind within the cache window
        self.route_cache.insert(key, estimate.clone());

        Ok(estimate)
    }

    #[tracing::instrument(skip(self))]
    async fn plan_route(
        &self,
        origin: &str,
        stops: &[Coordinates],
        mode: TravelMode,
    ) -> Result<RoutePlan, Error> {
        let Some((&destination, waypoints)) = stops.split_last() else {
            return Ok(RoutePlan::empty());
        };

        if waypoints.is_empty() {
            let estimate = self.route(origin, &[], destination, mode, false).await?;

            return Ok(RoutePlan {
                order: Vec::new(),
                waypoints: Vec::new(),
                destination: Some(destination),
                duration_secs: estimate.duration_secs,
            });
        }

        let estimate = self.route(origin, waypoints, destination, mode, true).await?;

        if estimate.duration_secs.is_none() {
            // the optimizer had no answer; keep the stops as given
            let fallback = self.route(origin, waypoints, destination, mode, false).await?;

            return Ok(RoutePlan {
                order: identity_order(waypoints.len()),
                waypoints: waypoints.to_vec(),
                destination: Some(destination),
                duration_secs: fallback.duration_secs,
            });
        }

        let reordered = estimate
            .waypoint_order
            .iter()
            .filter_map(|&index| waypoints.get(index).copied())
            .collect();

        Ok(RoutePlan {
            order: estimate.waypoint_order,
            waypoints: reordered,
            destination: Some(destination),
            duration_secs: estimate.duration_secs,
        })
    }
}

#[test]
fn route_empty_origin_is_rejected_test() {
    use super::fake_maps::{engine_with, FakeMaps};
    use std::sync::Arc;
    use tokio_test::block_on;

    let engine = engine_with(Arc::new(FakeMaps::default()));
    let destination = Coordinates::new(40.4153, -3.6844);

    let result = block_on(engine.route("  ", &[], destination, TravelMode::Driving, false));

    assert!(result.is_err());
}

#[test]
fn route_provider_failure_is_soft_test() {
    use super::fake_maps::{engine_with, FakeMaps};
    use std::sync::Arc;
    use tokio_test::block_on;

    let maps = Arc::new(FakeMaps {
        fail_directions: true,
        ..FakeMaps::default()
    });
    let engine = engine_with(maps);
    let destination = Coordinates::new(40.4153, -3.6844);
    let waypoints = [Coordinates::new(40.42, -3.71)];

    let estimate = block_on(engine.route(
        "Puerta del Sol",
        &waypoints,
        destination,
        TravelMode::Driving,
        false,
    ))
    .unwrap();

    assert_eq!(estimate.duration_secs, None);
    assert_eq!(estimate.waypoint_order, vec![0]);
}

#[test]
fn route_serves_repeat_queries_from_cache_test() {
    use super::fake_maps::{engine_with, FakeMaps};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use tokio_test::block_on;

    let maps = Arc::new(FakeMaps {
        default_duration: Some(900.0),
        ..FakeMaps::default()
    });
    let engine = engine_with(maps.clone());
    let destination = Coordinates::new(40.4153, -3.6844);

    let first = block_on(engine.route(
        "Puerta del Sol",
        &[],
        destination,
        TravelMode::Walking,
        false,
    ))
    .unwrap();
    let second = block_on(engine.route(
        "Puerta del Sol",
        &[],
        destination,
        TravelMode::Walking,
        false,
    ))
    .unwrap();

    assert_eq!(first.duration_secs, Some(900.0));
    assert_eq!(second.duration_secs, Some(900.0));
    assert_eq!(maps.directions_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn route_cache_distinguishes_modes_test() {
    use super::fake_maps::{engine_with, FakeMaps};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use tokio_test::block_on;

    let maps = Arc::new(FakeMaps {
        default_duration: Some(900.0),
        ..FakeMaps::default()
    });
    let engine = engine_with(maps.clone());
    let destination = Coordinates::new(40.4153, -3.6844);

    block_on(engine.route("Sol", &[], destination, TravelMode::Walking, false)).unwrap();
    block_on(engine.route("Sol", &[], destination, TravelMode::Driving, false)).unwrap();

    assert_eq!(maps.directions_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn plan_route_applies_provider_order_test() {
    use super::fake_maps::{engine_with, FakeMaps};
    use std::sync::Arc;
    use tokio_test::block_on;

    let maps = Arc::new(FakeMaps {
        default_duration: Some(1800.0),
        waypoint_order: Some(vec![1, 0]),
        ..FakeMaps::default()
    });
    let engine = engine_with(maps);

    let stops = [
        Coordinates::new(40.41, -3.70),
        Coordinates::new(40.42, -3.71),
        Coordinates::new(40.43, -3.72),
    ];

    let plan = block_on(engine.plan_route("Sol", &stops, TravelMode::Walking)).unwrap();

    assert_eq!(plan.order, vec![1, 0]);
    assert_eq!(
        plan.waypoints,
        vec![Coordinates::new(40.42, -3.71), Coordinates::new(40.41, -3.70)]
    );
    assert_eq!(plan.destination, Some(Coordinates::new(40.43, -3.72)));
    assert_eq!(plan.duration_secs, Some(1800.0));
}

#[test]
fn plan_route_falls_back_to_given_order_test() {
    use super::fake_maps::{engine_with, FakeMaps};
    use std::sync::Arc;
    use tokio_test::block_on;

    let maps = Arc::new(FakeMaps {
        fail_directions: true,
        ..FakeMaps::default()
    });
    let engine = engine_with(maps);

    let stops = [
        Coordinates::new(40.41, -3.70),
        Coordinates::new(40.42, -3.71),
        Coordinates::new(40.43, -3.72),
    ];

    let plan = block_on(engine.plan_route("Sol", &stops, TravelMode::Walking)).unwrap();

    assert_eq!(plan.order, vec![0, 1]);
    assert_eq!(plan.waypoints, stops[..2].to_vec());
    assert_eq!(plan.duration_secs, None);
}

#[test]
fn plan_route_with_no_stops_is_empty_test() {
    use super::fake_maps::{engine_with, FakeMaps};
    use std::sync::Arc;
    use tokio_test::block_on;

    let engine = engine_with(Arc::new(FakeMaps::default()));

    let plan = block_on(engine.plan_route("Sol", &[], TravelMode::Walking)).unwrap();

    assert_eq!(plan.destination, None);
    assert_eq!(plan.duration_secs, None);
    assert!(plan.order.is_empty());
}
