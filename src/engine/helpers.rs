use crate::entities::Coordinates;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two WGS84 points, in meters. Non-finite
/// inputs propagate as NaN.
pub fn distance_meters(a: Coordinates, b: Coordinates) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

#[test]
fn distance_is_symmetric_test() {
    let sol = Coordinates::new(40.4168, -3.7038);
    let retiro = Coordinates::new(40.4153, -3.6844);

    assert_eq!(distance_meters(sol, retiro), distance_meters(retiro, sol));
}

#[test]
fn distance_to_self_is_zero_test() {
    let sol = Coordinates::new(40.4168, -3.7038);

    assert_eq!(distance_meters(sol, sol), 0.0);
}

#[test]
fn one_degree_of_latitude_test() {
    let a = Coordinates::new(0.0, 0.0);
    let b = Coordinates::new(1.0, 0.0);

    let d = distance_meters(a, b);
    assert!((d - 111_195.0).abs() < 10.0, "got {}", d);
}

#[test]
fn non_finite_input_propagates_test() {
    let a = Coordinates::new(f64::NAN, 0.0);
    let b = Coordinates::new(0.0, 0.0);

    assert!(distance_meters(a, b).is_nan());
}
