//! Overpass API client and response decoding.

use crate::error::ServiceError;
use crate::geo::Coordinate;
use crate::transport::Transport;
use serde::Deserialize;
use std::collections::BTreeMap;

pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// OSM tags of a feature
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Way,
    Relation,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct RawPosition {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct RawElement {
    #[serde(rename = "type", default)]
    kind: Option<ElementKind>,
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    center: Option<RawPosition>,
    #[serde(default)]
    tags: Tags,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<RawElement>,
}

/// A geographic entity returned by a spatial query
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub kind: Option<ElementKind>,
    pub id: Option<u64>,
    pub coordinate: Coordinate,
    pub tags: Tags,
}

impl RawElement {
    /// Own point if present, otherwise the center Overpass computed for
    /// ways and relations
    fn coordinate(&self) -> Option<Coordinate> {
        match (self.lat, self.lon, self.center) {
            (Some(lat), Some(lon), _) => Some(Coordinate::new(lat, lon)),
            (_, _, Some(c)) => Some(Coordinate::new(c.lat, c.lon)),
            _ => None,
        }
    }

    fn into_feature(self) -> Option<Feature> {
        let coordinate = self.coordinate()?;
        Some(Feature {
            kind: self.kind,
            id: self.id,
            coordinate,
            tags: self.tags,
        })
    }
}

/// Decode an interpreter response body into features.
///
/// Elements without any usable position are skipped.
///
/// # Errors
///
/// Returns [`ServiceError::MalformedResponse`] if the body is not an Overpass
/// JSON document with an `elements` array.
pub fn parse_elements(body: &mut [u8]) -> Result<Vec<Feature>, ServiceError> {
    let response: OverpassResponse = simd_json::serde::from_slice(body)?;
    let total = response.elements.len();
    let features: Vec<Feature> = response
        .elements
        .into_iter()
        .filter_map(RawElement::into_feature)
        .collect();
    if features.len() < total {
        log::warn!(
            "overpass: skipped {} of {total} elements without a position",
            total - features.len()
        );
    }
    Ok(features)
}

pub struct OverpassClient<T> {
    transport: T,
    url: String,
}

impl<T: Transport> OverpassClient<T> {
    pub fn new(transport: T, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// POST an Overpass QL query and decode the matching features.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the request fails or the body is malformed.
    pub async fn fetch(&self, query: String) -> Result<Vec<Feature>, ServiceError> {
        let mut body = self.transport.post_text(&self.url, query).await?;
        parse_elements(&mut body)
    }
}
