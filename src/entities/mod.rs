mod candidates;
mod detour;
mod location;
mod place;
mod route;

pub use candidates::CandidateSet;
pub use detour::{DetourLabel, DetourResult};
pub use location::Coordinates;
pub use place::{Place, ScoredPlace};
pub use route::{identity_order, RouteEstimate, RoutePlan, TravelMode};
