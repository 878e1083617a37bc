use async_trait::async_trait;

use super::Engine;

use crate::{
    api::SearchAPI,
    entities::{CandidateSet, Coordinates},
    error::Error,
    external::google_maps::NearbyPlace,
};

#[async_trait]
impl SearchAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn aggregate(
        &self,
        terms: &[String],
        center: Coordinates,
        radius: f64,
        open_now: bool,
        language: &str,
    ) -> Result<CandidateSet, Error> {
        let mut candidates = CandidateSet::new();

        for term in terms {
            let mut results = self
                .nearby_all_pages(center, term, radius, open_now, language)
                .await;

            // an open-now search that finds nothing is retried once without
            // the filter
            if results.is_empty() && open_now {
                results = self
                    .nearby_all_pages(center, term, radius, false, language)
                    .await;
            }

            for raw in results {
                candidates.absorb(raw, term);
            }
        }

        Ok(candidates)
    }
}

impl Engine {
    /// Drains every page behind one keyword. The continuation token is only
    /// valid after a short wait, hence the sleep between pages. Failures
    /// leave the results collected so far.
    #[tracing::instrument(skip(self))]
    async fn nearby_all_pages(
        &self,
        center: Coordinates,
        keyword: &str,
        radius: f64,
        open_now: bool,
        language: &str,
    ) -> Vec<NearbyPlace> {
        let first = match self
            .maps
            .nearby_search(center, keyword, radius, open_now, language)
            .await
        {
            Ok(page) => page,
            Err(err) => {
                tracing::warn!("nearby search for {:?} failed: {}", keyword, err);
                return Vec::new();
            }
        };

        let mut results = first.results;
        let mut token = first.next_page_token;

        while let Some(page_token) = token {
            tokio::time::sleep(self.config.page_delay).await;

            match self.maps.nearby_search_page(&page_token, language).await {
                Ok(page) => {
                    results.extend(page.results);
                    token = page.next_page_token;
                }
                Err(err) => {
                    tracing::warn!("nearby page for {:?} failed: {}", keyword, err);
                    token = None;
                }
            }
        }

        results
    }
}

#[test]
fn aggregate_merges_terms_test() {
    use super::fake_maps::{engine_with, page_of, raw_place, FakeMaps};
    use std::sync::Arc;
    use tokio_test::block_on;

    let maps = Arc::new(FakeMaps::default());

    let mut under_park = raw_place("X", 40.4153, -3.6844);
    under_park.rating = Some(4.0);
    let mut under_garden = raw_place("X", 40.4153, -3.6844);
    under_garden.rating = Some(4.5);

    maps.script_nearby("parque", true, page_of(vec![under_park]));
    maps.script_nearby("jardín botánico", true, page_of(vec![under_garden]));

    let engine = engine_with(maps);
    let center = Coordinates::new(40.4168, -3.7038);
    let terms = vec!["parque".to_string(), "jardín botánico".to_string()];

    let candidates = block_on(engine.aggregate(&terms, center, 1500.0, true, "es")).unwrap();

    assert_eq!(candidates.len(), 1);
    let place = candidates.get("X").unwrap();
    assert_eq!(place.rating, Some(4.5));
    assert!(place.matched_terms.contains("parque"));
    assert!(place.matched_terms.contains("jardín botánico"));
}

#[test]
fn aggregate_drains_all_pages_test() {
    use super::fake_maps::{engine_with, raw_place, FakeMaps};
    use crate::external::google_maps::NearbyPage;
    use std::sync::Arc;
    use tokio_test::block_on;

    let maps = Arc::new(FakeMaps::default());
    maps.script_nearby(
        "parque",
        true,
        NearbyPage {
            results: vec![raw_place("A", 40.41, -3.70)],
            next_page_token: Some("tok-1".into()),
        },
    );
    maps.script_page(
        "tok-1",
        NearbyPage {
            results: vec![raw_place("B", 40.42, -3.71)],
            next_page_token: None,
        },
    );

    let engine = engine_with(maps.clone());
    let center = Coordinates::new(40.4168, -3.7038);
    let terms = vec!["parque".to_string()];

    let candidates = block_on(engine.aggregate(&terms, center, 1500.0, true, "es")).unwrap();

    assert_eq!(candidates.len(), 2);
    assert_eq!(maps.nearby_calls.load(std::sync::atomic::Ordering::SeqCst), 2);
}

#[test]
fn aggregate_relaxes_open_now_test() {
    use super::fake_maps::{engine_with, page_of, raw_place, FakeMaps};
    use std::sync::Arc;
    use tokio_test::block_on;

    let maps = Arc::new(FakeMaps::default());
    // nothing scripted for open_now=true: the strict search comes up empty
    maps.script_nearby("parque", false, page_of(vec![raw_place("A", 40.41, -3.70)]));

    let engine = engine_with(maps.clone());
    let center = Coordinates::new(40.4168, -3.7038);
    let terms = vec!["parque".to_string()];

    let candidates = block_on(engine.aggregate(&terms, center, 1500.0, true, "es")).unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(maps.nearby_calls.load(std::sync::atomic::Ordering::SeqCst), 2);
}

#[test]
fn aggregate_is_idempotent_test() {
    use super::fake_maps::{engine_with, page_of, raw_place, FakeMaps};
    use std::sync::Arc;
    use tokio_test::block_on;

    let maps = Arc::new(FakeMaps::default());
    let mut rated = raw_place("A", 40.41, -3.70);
    rated.rating = Some(4.2);
    rated.user_ratings_total = Some(57);
    maps.script_nearby("parque", true, page_of(vec![rated]));

    let engine = engine_with(maps);
    let center = Coordinates::new(40.4168, -3.7038);
    let terms = vec!["parque".to_string()];

    let first = block_on(engine.aggregate(&terms, center, 1500.0, true, "es")).unwrap();
    let second = block_on(engine.aggregate(&terms, center, 1500.0, true, "es")).unwrap();

    assert_eq!(first.len(), second.len());
    assert_eq!(
        first.get("A").unwrap().rating,
        second.get("A").unwrap().rating
    );
    assert_eq!(
        first.get("A").unwrap().user_ratings_total,
        second.get("A").unwrap().user_ratings_total
    );
}
