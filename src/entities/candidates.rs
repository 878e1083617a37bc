use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::entities::{Coordinates, Place};
use crate::external::google_maps::{maps_search_link, NearbyPlace};

/// The deduplicated working set of one search signature (terms, center,
/// radius, open-now). Keyed by provider place id.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CandidateSet {
    by_id: HashMap<String, Place>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Place> {
        self.by_id.get(id)
    }

    pub fn places(&self) -> impl Iterator<Item = &Place> {
        self.by_id.values()
    }

    /// Folds one raw sighting into the set. Results without a place id are
    /// discarded. A repeated sighting unions the matched terms, keeps the
    /// higher rating and review count, and the first photo reference seen;
    /// folding the same result twice changes nothing.
    pub fn absorb(&mut self, raw: NearbyPlace, term: &str) {
        let Some(id) = raw.place_id.clone().filter(|id| !id.is_empty()) else {
            return;
        };

        let coordinates: Option<Coordinates> = raw.geometry.map(|g| g.location.into());
        let photo_reference = raw
            .photos
            .as_ref()
            .and_then(|photos| photos.first())
            .and_then(|photo| photo.photo_reference.clone());

        match self.by_id.get_mut(&id) {
            Some(place) => {
                place.matched_terms.insert(term.to_string());
                if let Some(rating) = raw.rating {
                    if place.rating.map_or(true, |current| rating > current) {
                        place.rating = Some(rating);
                    }
                }
                if let Some(total) = raw.user_ratings_total {
                    if total > place.user_ratings_total {
                        place.user_ratings_total = total;
                    }
                }
                if place.photo_reference.is_none() {
                    place.photo_reference = photo_reference;
                }
            }
            None => {
                self.by_id.insert(
                    id.clone(),
                    Place {
                        id,
                        name: raw.name.unwrap_or_default(),
                        address: raw.vicinity,
                        coordinates,
                        rating: raw.rating,
                        user_ratings_total: raw.user_ratings_total.unwrap_or(0),
                        matched_terms: BTreeSet::from([term.to_string()]),
                        photo_reference,
                        maps_link: coordinates.map(maps_search_link),
                        selected: false,
                    },
                );
            }
        }
    }

    /// Carries selections over from the set a previous aggregation produced,
    /// keyed by place id. Selections are only ever added, never cleared.
    pub fn carry_selection_from(&mut self, previous: &CandidateSet) {
        for place in self.by_id.values_mut() {
            if previous
                .by_id
                .get(&place.id)
                .map_or(false, |prev| prev.selected)
            {
                place.selected = true;
            }
        }
    }

    pub fn set_selected(&mut self, id: &str, selected: bool) -> bool {
        match self.by_id.get_mut(id) {
            Some(place) => {
                place.selected = selected;
                true
            }
            None => false,
        }
    }

    /// Coordinates of the selected places, for route building. Places
    /// without a usable coordinate are skipped.
    pub fn selected_coordinates(&self) -> Vec<Coordinates> {
        self.by_id
            .values()
            .filter(|place| place.selected)
            .filter_map(|place| place.coordinates)
            .filter(Coordinates::is_finite)
            .collect()
    }
}

#[cfg(test)]
fn raw(id: &str, rating: Option<f64>, reviews: Option<u64>) -> NearbyPlace {
    use crate::external::google_maps::{Geometry, LatLng};

    NearbyPlace {
        place_id: Some(id.to_string()),
        name: Some("Parque del Retiro".into()),
        vicinity: Some("Plaza de la Independencia, 7".into()),
        geometry: Some(Geometry {
            location: LatLng {
                lat: 40.4153,
                lng: -3.6844,
            },
        }),
        rating,
        user_ratings_total: reviews,
        photos: None,
    }
}

#[test]
fn absorb_merges_repeated_sightings_test() {
    let mut set = CandidateSet::new();
    set.absorb(raw("X", Some(4.0), Some(120)), "parque");
    set.absorb(raw("X", Some(4.5), Some(80)), "jardín botánico");

    assert_eq!(set.len(), 1);
    let place = set.get("X").unwrap();
    assert_eq!(place.rating, Some(4.5));
    assert_eq!(place.user_ratings_total, 120);
    let terms: Vec<&str> = place.matched_terms.iter().map(String::as_str).collect();
    assert_eq!(terms, vec!["jardín botánico", "parque"]);
}

#[test]
fn absorb_is_idempotent_test() {
    let mut set = CandidateSet::new();
    set.absorb(raw("X", Some(4.0), Some(120)), "parque");
    let once = set.get("X").unwrap().clone();

    set.absorb(raw("X", Some(4.0), Some(120)), "parque");
    let twice = set.get("X").unwrap();

    assert_eq!(set.len(), 1);
    assert_eq!(twice.rating, once.rating);
    assert_eq!(twice.user_ratings_total, once.user_ratings_total);
    assert_eq!(twice.matched_terms, once.matched_terms);
}

#[test]
fn absorb_discards_results_without_id_test() {
    let mut set = CandidateSet::new();
    let mut anonymous = raw("X", None, None);
    anonymous.place_id = None;
    set.absorb(anonymous, "parque");

    assert!(set.is_empty());
}

#[test]
fn absorb_keeps_first_photo_reference_test() {
    use crate::external::google_maps::Photo;

    let mut set = CandidateSet::new();
    set.absorb(raw("X", None, None), "parque");

    let mut with_photo = raw("X", None, None);
    with_photo.photos = Some(vec![Photo {
        photo_reference: Some("ref-1".into()),
    }]);
    set.absorb(with_photo, "parque");

    let mut other_photo = raw("X", None, None);
    other_photo.photos = Some(vec![Photo {
        photo_reference: Some("ref-2".into()),
    }]);
    set.absorb(other_photo, "parque");

    assert_eq!(
        set.get("X").unwrap().photo_reference.as_deref(),
        Some("ref-1")
    );
}

#[test]
fn carry_selection_from_test() {
    let mut previous = CandidateSet::new();
    previous.absorb(raw("X", None, None), "parque");
    previous.absorb(raw("Y", None, None), "parque");
    assert!(previous.set_selected("X", true));

    let mut fresh = CandidateSet::new();
    fresh.absorb(raw("X", Some(4.2), None), "museo");
    fresh.absorb(raw("Z", None, None), "museo");
    fresh.carry_selection_from(&previous);

    assert!(fresh.get("X").unwrap().selected);
    assert!(!fresh.get("Z").unwrap().selected);
}
