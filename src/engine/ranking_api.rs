use async_trait::async_trait;

use super::{helpers::distance_meters, Engine};

use crate::{
    api::{RankingAPI, SearchAPI},
    config::Weights,
    entities::{CandidateSet, Coordinates, ScoredPlace},
    error::Error,
};

#[async_trait]
impl RankingAPI for Engine {
    fn score(
        &self,
        candidates: &CandidateSet,
        center: Coordinates,
        radius: f64,
        weights: Weights,
    ) -> Vec<ScoredPlace> {
        let max_reviews = candidates
            .places()
            .map(|place| place.user_ratings_total)
            .max()
            .unwrap_or(0)
            .max(1);
        // floor the denominator at ln 2 so an all-zero-review set scores 0
        let reviews_denominator = (1.0 + max_reviews as f64).ln();
        let weight_sum = weights.sum();

        candidates
            .places()
            .map(|place| {
                let distance_m = place
                    .coordinates
                    .filter(Coordinates::is_finite)
                    .map(|coordinates| distance_meters(center, coordinates))
                    .filter(|distance| distance.is_finite());

                let proximity_score = distance_m
                    .map(|distance| (1.0 - distance / radius).clamp(0.0, 1.0))
                    .unwrap_or(0.0);
                let rating_score = (place.rating.unwrap_or(0.0) / 5.0).clamp(0.0, 1.0);
                let reviews_score = ((1.0 + place.user_ratings_total as f64).ln()
                    / reviews_denominator)
                    .clamp(0.0, 1.0);

                let score = if weight_sum > 0.0 {
                    ((weights.rating * rating_score
                        + weights.reviews * reviews_score
                        + weights.proximity * proximity_score)
                        / weight_sum)
                        .clamp(0.0, 1.0)
                } else {
                    0.0
                };

                ScoredPlace {
                    place: place.clone(),
                    distance_m,
                    rating_score,
                    reviews_score,
                    proximity_score,
                    score,
                }
            })
            .collect()
    }

    #[tracing::instrument(skip(self))]
    async fn rank(
        &self,
        terms: &[String],
        center: Coordinates,
        radius: f64,
        open_now: bool,
        language: &str,
    ) -> Result<Vec<ScoredPlace>, Error> {
        let candidates = self
            .aggregate(terms, center, radius, open_now, language)
            .await?;

        let mut scored = self.score(&candidates, center, radius, self.config.weights);
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));

        Ok(scored)
    }
}

/// Keeps the places rated at or above the floor; unrated places are dropped.
pub fn filter_by_rating(scored: Vec<ScoredPlace>, min_rating: f64) -> Vec<ScoredPlace> {
    scored
        .into_iter()
        .filter(|entry| entry.place.rating.map_or(false, |rating| rating >= min_rating))
        .collect()
}

#[cfg(test)]
fn candidate_set(entries: &[(&str, f64, u64, f64, f64)]) -> CandidateSet {
    use crate::engine::fake_maps::raw_place;

    let mut set = CandidateSet::new();
    for (id, rating, reviews, lat, lng) in entries {
        let mut raw = raw_place(id, *lat, *lng);
        raw.rating = Some(*rating);
        raw.user_ratings_total = Some(*reviews);
        set.absorb(raw, "parque");
    }
    set
}

#[cfg(test)]
fn test_engine() -> Engine {
    use crate::engine::fake_maps::{engine_with, FakeMaps};
    use std::sync::Arc;

    engine_with(Arc::new(FakeMaps::default()))
}

#[test]
fn composite_score_is_normalized_test() {
    let engine = test_engine();
    let center = Coordinates::new(40.4168, -3.7038);
    let set = candidate_set(&[
        ("A", 5.0, 10_000, 40.4168, -3.7038),
        ("B", 1.0, 3, 41.0, -3.0),
        ("C", 3.7, 250, 40.42, -3.71),
    ]);

    for weights in [
        Weights::default(),
        Weights {
            rating: 1.0,
            reviews: 0.0,
            proximity: 0.0,
        },
        Weights {
            rating: 0.2,
            reviews: 5.0,
            proximity: 3.0,
        },
    ] {
        for scored in engine.score(&set, center, 1500.0, weights) {
            assert!(
                (0.0..=1.0).contains(&scored.score),
                "score {} out of range",
                scored.score
            );
            assert!((0.0..=1.0).contains(&scored.rating_score));
            assert!((0.0..=1.0).contains(&scored.reviews_score));
            assert!((0.0..=1.0).contains(&scored.proximity_score));
        }
    }
}

#[test]
fn zero_weights_score_zero_test() {
    let engine = test_engine();
    let center = Coordinates::new(40.4168, -3.7038);
    let set = candidate_set(&[("A", 5.0, 10_000, 40.4168, -3.7038)]);

    let weights = Weights {
        rating: 0.0,
        reviews: 0.0,
        proximity: 0.0,
    };

    for scored in engine.score(&set, center, 1500.0, weights) {
        assert_eq!(scored.score, 0.0);
    }
}

#[test]
fn score_is_order_invariant_test() {
    let engine = test_engine();
    let center = Coordinates::new(40.4168, -3.7038);

    let forward = candidate_set(&[
        ("A", 4.0, 100, 40.4168, -3.7038),
        ("B", 3.0, 10, 40.42, -3.71),
    ]);
    let reversed = candidate_set(&[
        ("B", 3.0, 10, 40.42, -3.71),
        ("A", 4.0, 100, 40.4168, -3.7038),
    ]);

    let score_of = |scored: &[ScoredPlace], id: &str| {
        scored
            .iter()
            .find(|entry| entry.place.id == id)
            .map(|entry| entry.score)
            .unwrap()
    };

    let fwd = engine.score(&forward, center, 1500.0, Weights::default());
    let rev = engine.score(&reversed, center, 1500.0, Weights::default());

    assert_eq!(score_of(&fwd, "A"), score_of(&rev, "A"));
    assert_eq!(score_of(&fwd, "B"), score_of(&rev, "B"));
}

#[test]
fn missing_coordinates_score_zero_proximity_test() {
    let engine = test_engine();
    let center = Coordinates::new(40.4168, -3.7038);

    let mut set = CandidateSet::new();
    let mut raw = crate::engine::fake_maps::raw_place("A", 0.0, 0.0);
    raw.geometry = None;
    set.absorb(raw, "parque");

    let scored = engine.score(&set, center, 1500.0, Weights::default());

    assert_eq!(scored[0].distance_m, None);
    assert_eq!(scored[0].proximity_score, 0.0);
}

#[test]
fn beyond_radius_scores_zero_proximity_test() {
    let engine = test_engine();
    let center = Coordinates::new(40.4168, -3.7038);
    // Barcelona is a long way outside a 1500 m radius around Madrid
    let set = candidate_set(&[("A", 4.0, 10, 41.3874, 2.1686)]);

    let scored = engine.score(&set, center, 1500.0, Weights::default());

    assert_eq!(scored[0].proximity_score, 0.0);
    assert!(scored[0].distance_m.unwrap() > 1500.0);
}

#[test]
fn zero_review_set_scores_zero_reviews_test() {
    let engine = test_engine();
    let center = Coordinates::new(40.4168, -3.7038);
    let set = candidate_set(&[
        ("A", 4.0, 0, 40.4168, -3.7038),
        ("B", 3.0, 0, 40.42, -3.71),
    ]);

    for scored in engine.score(&set, center, 1500.0, Weights::default()) {
        assert_eq!(scored.reviews_score, 0.0);
    }
}

#[test]
fn rank_sorts_best_first_test() {
    use crate::engine::fake_maps::{engine_with, page_of, raw_place, FakeMaps};
    use std::sync::Arc;
    use tokio_test::block_on;

    let maps = Arc::new(FakeMaps::default());
    let mut near = raw_place("near", 40.4170, -3.7040);
    near.rating = Some(4.8);
    near.user_ratings_total = Some(900);
    let mut far = raw_place("far", 40.5, -3.9);
    far.rating = Some(2.0);
    far.user_ratings_total = Some(3);
    maps.script_nearby("parque", true, page_of(vec![far, near]));

    let engine = engine_with(maps);
    let center = Coordinates::new(40.4168, -3.7038);
    let terms = vec!["parque".to_string()];

    let ranked = block_on(engine.rank(&terms, center, 1500.0, true, "es")).unwrap();

    assert_eq!(ranked[0].place.id, "near");
    assert!(ranked[0].score > ranked[1].score);
}

#[test]
fn filter_by_rating_drops_unrated_test() {
    let engine = test_engine();
    let center = Coordinates::new(40.4168, -3.7038);

    let mut set = candidate_set(&[("A", 4.0, 10, 40.4168, -3.7038)]);
    let unrated = crate::engine::fake_maps::raw_place("B", 40.42, -3.71);
    set.absorb(unrated, "parque");

    let scored = engine.score(&set, center, 1500.0, Weights::default());
    let kept = filter_by_rating(scored, 3.5);

    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].place.id, "A");
}
