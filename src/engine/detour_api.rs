use std::collections::HashMap;

use async_trait::async_trait;

use super::Engine;

use crate::{
    api::{DetourAPI, RouteAPI},
    entities::{Coordinates, DetourResult, ScoredPlace, TravelMode},
    error::{invalid_input_error, Error},
};

#[async_trait]
impl DetourAPI for Engine {
    /// Cost is one directions query per candidate and insertion position;
    /// the route cache collapses duplicates within its window.
    #[tracing::instrument(skip(self, candidates))]
    async fn evaluate(
        &self,
        origin: &str,
        selected_stops: &[Coordinates],
        candidates: &[ScoredPlace],
        mode: TravelMode,
    ) -> Result<HashMap<String, DetourResult>, Error> {
        if origin.trim().is_empty() {
            return Err(invalid_input_error());
        }

        let mut results: HashMap<String, DetourResult> = candidates
            .iter()
            .map(|candidate| (candidate.place.id.clone(), DetourResult::unknown()))
            .collect();

        let Some((&destination, base)) = selected_stops.split_last() else {
            return Ok(results);
        };

        let base_estimate = self.route(origin, base, destination, mode, false).await?;
        let base_secs = match base_estimate.duration_secs {
            Some(secs) if secs > 0.0 => secs,
            // without a base route there is nothing to compare against;
            // stop before issuing any per-candidate queries
            _ => return Ok(results),
        };

        let append_only = selected_stops.len() > self.config.full_insertion_max_stops;

        for candidate in candidates {
            if candidate.place.selected {
                continue;
            }
            let Some(coordinates) = candidate.place.coordinates.filter(Coordinates::is_finite)
            else {
                continue;
            };

            let mut best_secs: Option<f64> = None;

            if append_only {
                let mut augmented = base.to_vec();
                augmented.push(coordinates);

                let estimate = self.route(origin, &augmented, destination, mode, false).await?;
                best_secs = estimate.duration_secs.filter(|secs| *secs > 0.0);
            } else {
                for position in 0..=base.len() {
                    let mut augmented = base.to_vec();
                    augmented.insert(position, coordinates);

                    let estimate =
                        self.route(origin, &augmented, destination, mode, false).await?;
                    if let Some(secs) = estimate.duration_secs.filter(|secs| *secs > 0.0) {
                        best_secs = Some(best_secs.map_or(secs, |best: f64| best.min(secs)));
                    }
                }
            }

            let ratio = best_secs.map(|secs| ((secs - base_secs) / base_secs).max(0.0));
            results.insert(candidate.place.id.clone(), DetourResult::from_ratio(ratio));
        }

        Ok(results)
    }
}

#[cfg(test)]
use super::fake_maps::{engine_with, scored_candidate, FakeMaps};
#[cfg(test)]
use crate::entities::DetourLabel;

#[test]
fn single_insertion_ratio_test() {
    use std::sync::Arc;
    use tokio_test::block_on;

    let maps = Arc::new(FakeMaps::default());
    let stop = Coordinates::new(40.4153, -3.6844);
    let candidate_at = Coordinates::new(40.4200, -3.7000);

    // base route origin -> stop, one candidate insertable at one position
    maps.script_duration(&[], 1200.0);
    maps.script_duration(&[candidate_at], 1260.0);

    let engine = engine_with(maps);
    let candidates = vec![scored_candidate("C", Some(candidate_at))];

    let results = block_on(engine.evaluate(
        "Puerta del Sol",
        &[stop],
        &candidates,
        TravelMode::Walking,
    ))
    .unwrap();

    let result = &results["C"];
    assert!((result.ratio.unwrap() - 0.05).abs() < 1e-9);
    assert_eq!(result.label, DetourLabel::Great);
}

#[test]
fn base_failure_short_circuits_test() {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use tokio_test::block_on;

    let maps = Arc::new(FakeMaps {
        fail_directions: true,
        ..FakeMaps::default()
    });
    let engine = engine_with(maps.clone());

    let stop = Coordinates::new(40.4153, -3.6844);
    let candidates = vec![
        scored_candidate("C1", Some(Coordinates::new(40.42, -3.70))),
        scored_candidate("C2", Some(Coordinates::new(40.43, -3.71))),
    ];

    let results = block_on(engine.evaluate(
        "Puerta del Sol",
        &[stop],
        &candidates,
        TravelMode::Walking,
    ))
    .unwrap();

    assert!(results["C1"].is_unknown());
    assert!(results["C2"].is_unknown());
    // only the base query went out
    assert_eq!(maps.directions_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn tries_every_insertion_position_test() {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use tokio_test::block_on;

    let maps = Arc::new(FakeMaps {
        default_duration: Some(1500.0),
        ..FakeMaps::default()
    });
    let engine = engine_with(maps.clone());

    let selected = [
        Coordinates::new(40.41, -3.70),
        Coordinates::new(40.42, -3.71),
        Coordinates::new(40.43, -3.72),
    ];
    let candidate_at = Coordinates::new(40.44, -3.73);
    let candidates = vec![scored_candidate("C", Some(candidate_at))];

    let results =
        block_on(engine.evaluate("Sol", &selected, &candidates, TravelMode::Driving)).unwrap();

    assert!(!results["C"].is_unknown());
    // base + one query per insertion position (len(base) + 1 = 3)
    assert_eq!(maps.directions_calls.load(Ordering::SeqCst), 4);
}

#[test]
fn keeps_cheapest_insertion_test() {
    use std::sync::Arc;
    use tokio_test::block_on;

    let maps = Arc::new(FakeMaps::default());

    let a = Coordinates::new(40.41, -3.70);
    let b = Coordinates::new(40.42, -3.71);
    let candidate_at = Coordinates::new(40.44, -3.73);

    maps.script_duration(&[a], 1000.0);
    maps.script_duration(&[candidate_at, a], 1600.0);
    maps.script_duration(&[a, candidate_at], 1250.0);

    let engine = engine_with(maps);
    let candidates = vec![scored_candidate("C", Some(candidate_at))];

    let results =
        block_on(engine.evaluate("Sol", &[a, b], &candidates, TravelMode::Driving)).unwrap();

    let result = &results["C"];
    assert!((result.ratio.unwrap() - 0.25).abs() < 1e-9);
    assert_eq!(result.label, DetourLabel::VeryGood);
}

#[test]
fn long_routes_only_append_test() {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use tokio_test::block_on;

    let maps = Arc::new(FakeMaps {
        default_duration: Some(3600.0),
        ..FakeMaps::default()
    });
    let engine = engine_with(maps.clone());

    // eight selected stops, past the full-insertion threshold of six
    let selected: Vec<Coordinates> = (0..8)
        .map(|i| Coordinates::new(40.40 + f64::from(i) * 0.01, -3.70))
        .collect();
    let candidates = vec![
        scored_candidate("C1", Some(Coordinates::new(40.50, -3.80))),
        scored_candidate("C2", Some(Coordinates::new(40.51, -3.81))),
    ];

    let results =
        block_on(engine.evaluate("Sol", &selected, &candidates, TravelMode::Driving)).unwrap();

    assert!(!results["C1"].is_unknown());
    assert!(!results["C2"].is_unknown());
    // base + exactly one query per candidate
    assert_eq!(maps.directions_calls.load(Ordering::SeqCst), 3);
}

#[test]
fn selected_and_unlocated_candidates_stay_unknown_test() {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use tokio_test::block_on;

    let maps = Arc::new(FakeMaps {
        default_duration: Some(1200.0),
        ..FakeMaps::default()
    });
    let engine = engine_with(maps.clone());

    let stop = Coordinates::new(40.4153, -3.6844);
    let mut already_selected = scored_candidate("S", Some(Coordinates::new(40.42, -3.70)));
    already_selected.place.selected = true;
    let unlocated = scored_candidate("U", None);

    let candidates = vec![already_selected, unlocated];

    let results = block_on(engine.evaluate(
        "Puerta del Sol",
        &[stop],
        &candidates,
        TravelMode::Walking,
    ))
    .unwrap();

    assert!(results["S"].is_unknown());
    assert!(results["U"].is_unknown());
    assert_eq!(maps.directions_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn empty_origin_is_rejected_test() {
    use std::sync::Arc;
    use tokio_test::block_on;

    let engine = engine_with(Arc::new(FakeMaps::default()));

    let result = block_on(engine.evaluate("", &[], &[], TravelMode::Walking));

    assert!(result.is_err());
}
