use async_trait::async_trait;

use super::Engine;

use crate::{
    api::LocationAPI,
    entities::Coordinates,
    error::{invalid_input_error, Error},
};

#[async_trait]
impl LocationAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn geocode_address(
        &self,
        address: &str,
        language: &str,
        region: &str,
    ) -> Result<(Coordinates, String), Error> {
        if address.trim().is_empty() {
            return Err(invalid_input_error());
        }

        let place = self
            .maps
            .geocode(address, language, region)
            .await?
            .ok_or_else(|| invalid_input_error())?;

        Ok((place.geometry.location.into(), place.formatted_address))
    }

    #[tracing::instrument(skip(self))]
    async fn reverse_geocode(&self, coordinates: Coordinates, language: &str) -> String {
        match self.maps.reverse_geocode(coordinates, language).await {
            Ok(Some(address)) => address,
            Ok(None) => fallback_address(coordinates),
            Err(err) => {
                tracing::warn!("reverse geocode failed: {}", err);
                fallback_address(coordinates)
            }
        }
    }
}

fn fallback_address(coordinates: Coordinates) -> String {
    format!("{:.6},{:.6}", coordinates.latitude, coordinates.longitude)
}

#[test]
fn geocode_address_requires_text_test() {
    use super::fake_maps::{engine_with, FakeMaps};
    use std::sync::Arc;
    use tokio_test::block_on;

    let engine = engine_with(Arc::new(FakeMaps::default()));

    assert!(block_on(engine.geocode_address("", "es", "es")).is_err());
}

#[test]
fn geocode_address_resolves_test() {
    use super::fake_maps::{engine_with, FakeMaps};
    use crate::external::google_maps::{GeocodedPlace, Geometry, LatLng};
    use std::sync::Arc;
    use tokio_test::block_on;

    let maps = Arc::new(FakeMaps {
        geocoded: Some(GeocodedPlace {
            formatted_address: "Calle Mayor, 1, Madrid".into(),
            geometry: Geometry {
                location: LatLng {
                    lat: 40.4158,
                    lng: -3.7102,
                },
            },
        }),
        ..FakeMaps::default()
    });
    let engine = engine_with(maps);

    let (coordinates, formatted) =
        block_on(engine.geocode_address("calle mayor 1", "es", "es")).unwrap();

    assert_eq!(coordinates, Coordinates::new(40.4158, -3.7102));
    assert_eq!(formatted, "Calle Mayor, 1, Madrid");
}

#[test]
fn geocode_address_with_no_match_is_an_error_test() {
    use super::fake_maps::{engine_with, FakeMaps};
    use std::sync::Arc;
    use tokio_test::block_on;

    let engine = engine_with(Arc::new(FakeMaps::default()));

    assert!(block_on(engine.geocode_address("nowhere at all", "es", "es")).is_err());
}

#[test]
fn reverse_geocode_falls_back_to_coordinates_test() {
    use super::fake_maps::{engine_with, FakeMaps};
    use std::sync::Arc;
    use tokio_test::block_on;

    let engine = engine_with(Arc::new(FakeMaps::default()));

    let address = block_on(engine.reverse_geocode(Coordinates::new(40.4168, -3.7038), "es"));

    assert_eq!(address, "40.416800,-3.703800");
}

#[test]
fn reverse_geocode_uses_provider_answer_test() {
    use super::fake_maps::{engine_with, FakeMaps};
    use std::sync::Arc;
    use tokio_test::block_on;

    let maps = Arc::new(FakeMaps {
        reverse_address: Some("Puerta del Sol, Madrid".into()),
        ..FakeMaps::default()
    });
    let engine = engine_with(maps);

    let address = block_on(engine.reverse_geocode(Coordinates::new(40.4168, -3.7038), "es"));

    assert_eq!(address, "Puerta del Sol, Madrid");
}
