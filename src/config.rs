use std::time::Duration;

// default composite score weights
pub const W_RATING: f64 = 0.5;
pub const W_REVIEWS: f64 = 0.3;
pub const W_PROX: f64 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Weights {
    pub rating: f64,
    pub reviews: f64,
    pub proximity: f64,
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.rating + self.reviews + self.proximity
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            rating: W_RATING,
            reviews: W_REVIEWS,
            proximity: W_PROX,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub weights: Weights,
    /// Wait between nearby-search pages; the continuation token only
    /// becomes valid a moment after the previous page is served.
    pub page_delay: Duration,
    pub route_cache_ttl: Duration,
    /// Above this many selected stops the detour evaluator stops probing
    /// every insertion position and only tries appending the candidate.
    pub full_insertion_max_stops: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            page_delay: Duration::from_secs(2),
            route_cache_ttl: Duration::from_secs(180),
            full_insertion_max_stops: 6,
        }
    }
}
