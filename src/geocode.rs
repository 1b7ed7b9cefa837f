//! Nominatim forward geocoding.
//!
//! The public instance asks for an identifying User-Agent and at most one
//! request per second; searches are user-driven so neither is enforced here.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use crate::error::ServiceError;
use crate::geo::Coordinate;
use crate::transport::Transport;
use serde::Deserialize;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

pub struct Geocoder<T> {
    transport: T,
    base_url: String,
}

impl<T: Transport> Geocoder<T> {
    pub fn new(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    /// Resolve free text to the first matching coordinate.
    ///
    /// Blank input returns `Ok(None)` without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the request fails or the body is not a
    /// Nominatim result array.
    pub async fn search(&self, text: &str) -> Result<Option<Coordinate>, ServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let mut body = self
            .transport
            .get(
                &self.base_url,
                &[("q", text), ("format", "json"), ("limit", "1")],
            )
            .await?;
        let places: Vec<Place> = simd_json::serde::from_slice(&mut body)?;

        let Some(first) = places.first() else {
            log::debug!("geocode: no match for {text:?}");
            return Ok(None);
        };
        let coord = parse_place(first)?;
        log::debug!(
            "geocode: {text:?} -> {:.5},{:.5} ({})",
            coord.lat,
            coord.lon,
            first.display_name.as_deref().unwrap_or("?")
        );
        Ok(Some(coord))
    }

    /// Like [`Geocoder::search`] but treats "no match" as an error.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EmptyResult`] when nothing matched, or any
    /// error from [`Geocoder::search`].
    pub async fn resolve(&self, text: &str) -> Result<Coordinate, ServiceError> {
        self.search(text).await?.ok_or(ServiceError::EmptyResult)
    }
}

fn parse_place(place: &Place) -> Result<Coordinate, ServiceError> {
    let lat = place
        .lat
        .trim()
        .parse::<f64>()
        .map_err(|_| ServiceError::malformed(format!("bad lat {:?}", place.lat)))?;
    let lon = place
        .lon
        .trim()
        .parse::<f64>()
        .map_err(|_| ServiceError::malformed(format!("bad lon {:?}", place.lon)))?;
    Ok(Coordinate::new(lat, lon))
}
