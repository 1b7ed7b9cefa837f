//! Feature fetch and render pipeline.
//!
//! A fetch clears the map surface, queries the current bounds for one
//! category and turns every returned feature into a marker. The interactive
//! app runs the network step on a worker; [`fetch_and_render`] runs the
//! whole cycle in one call.

use crate::category::Category;
use crate::error::ServiceError;
use crate::locale::Locale;
use crate::map::{MapSurface, Marker, Popup, PopupLine};
use crate::overpass::{Feature, OverpassClient, Tags};
use crate::query;
use crate::transport::Transport;
use std::borrow::Cow;

/// Whether a fetch is outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingState {
    Idle,
    Loading { generation: u64 },
}

/// Generation counter plus loading flag.
///
/// Only the most recently started fetch may apply its results or end the
/// loading state.
#[derive(Debug, Clone, Default)]
pub struct FetchState {
    generation: u64,
    loading: Option<u64>,
}

impl FetchState {
    /// Start a new fetch, invalidating any earlier one
    pub fn start(&mut self) -> u64 {
        self.generation += 1;
        self.loading = Some(self.generation);
        self.generation
    }

    /// Generation of the most recently started fetch
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Finish `generation`; returns false when a newer fetch superseded it
    pub fn finish(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.loading = None;
        true
    }

    pub fn loading(&self) -> LoadingState {
        match self.loading {
            Some(generation) => LoadingState::Loading { generation },
            None => LoadingState::Idle,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }
}

/// A spatial query waiting to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub query: String,
}

/// Result of sending a [`FetchRequest`]
#[derive(Debug)]
pub struct FetchOutcome {
    pub generation: u64,
    pub result: Result<Vec<Feature>, ServiceError>,
}

/// Options shared by every fetch
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub query_timeout_secs: u32,
    pub locale: Locale,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            query_timeout_secs: query::DEFAULT_TIMEOUT_SECS,
            locale: Locale::default(),
        }
    }
}

/// `opening_hours` -> `Opening hours`; only an ASCII first letter is capitalized
pub fn humanize_key(key: &str) -> String {
    let mut spaced = key.replace('_', " ");
    if let Some(first) = spaced.get_mut(..1) {
        first.make_ascii_uppercase();
    }
    spaced
}

/// Display label for a tag key
pub fn tag_label(key: &str, locale: Locale) -> Cow<'static, str> {
    match locale.tag_label(key) {
        Some(label) => Cow::Borrowed(label),
        None => Cow::Owned(humanize_key(key)),
    }
}

/// `name` tag, or the locale placeholder when missing or empty
pub fn display_name(tags: &Tags, locale: Locale) -> String {
    match tags.get("name") {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => locale.unnamed().to_string(),
    }
}

pub fn build_popup(feature: &Feature, locale: Locale) -> Popup {
    Popup {
        title: display_name(&feature.tags, locale),
        lines: feature
            .tags
            .iter()
            .map(|(key, value)| PopupLine {
                label: tag_label(key, locale).into_owned(),
                value: value.to_string(),
            })
            .collect(),
    }
}

pub fn marker_for(feature: &Feature, locale: Locale) -> Marker {
    Marker {
        coordinate: feature.coordinate,
        popup: build_popup(feature, locale),
    }
}

/// Clear the surface and build the query for its current bounds
pub fn begin<S: MapSurface>(
    surface: &mut S,
    category: &Category,
    options: &RenderOptions,
) -> String {
    surface.clear_markers();
    query::build(&surface.bounds(), category, options.query_timeout_secs)
}

/// Add one marker per feature
pub fn render_features<S: MapSurface>(surface: &mut S, features: &[Feature], locale: Locale) {
    for feature in features {
        surface.add_marker(marker_for(feature, locale));
    }
}

/// Run one full fetch cycle against `surface`.
///
/// The surface is cleared before the request; on error it stays empty. The
/// loading state is back to idle on every return path.
///
/// # Errors
///
/// Returns [`ServiceError`] if the query fails or the response is malformed.
pub async fn fetch_and_render<T, S>(
    client: &OverpassClient<T>,
    surface: &mut S,
    category: &Category,
    options: &RenderOptions,
    state: &mut FetchState,
) -> Result<Vec<Feature>, ServiceError>
where
    T: Transport,
    S: MapSurface,
{
    let generation = state.start();
    let query = begin(surface, category, options);
    log::debug!("fetch #{generation}: {} in {:?}", category.key, surface.bounds());

    let result = client.fetch(query).await;
    state.finish(generation);

    let features = result?;
    render_features(surface, &features, options.locale);
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{default_category, resolve};
    use crate::geo::{BoundingBox, Coordinate};
    use crate::transport::fake::{Call, FakeTransport};

    /// Surface with fixed bounds that records every mutation
    struct RecordingSurface {
        bbox: BoundingBox,
        markers: Vec<Marker>,
        clears: usize,
    }

    impl RecordingSurface {
        fn new(bbox: BoundingBox) -> Self {
            Self {
                bbox,
                markers: Vec::new(),
                clears: 0,
            }
        }
    }

    impl MapSurface for RecordingSurface {
        fn set_view(&mut self, _center: Coordinate, _zoom: f64) {}

        fn bounds(&self) -> BoundingBox {
            self.bbox
        }

        fn add_marker(&mut self, marker: Marker) {
            self.markers.push(marker);
        }

        fn clear_markers(&mut self) {
            self.clears += 1;
            self.markers.clear();
        }

        fn markers(&self) -> &[Marker] {
            &self.markers
        }

        fn take_move_end(&mut self) -> bool {
            false
        }
    }

    fn feature(tags: &[(&str, &str)]) -> Feature {
        Feature {
            kind: None,
            id: None,
            coordinate: Coordinate::new(0.0, 0.0),
            tags: tags.iter().copied().collect(),
        }
    }

    fn stale_marker() -> Marker {
        Marker {
            coordinate: Coordinate::new(9.0, 9.0),
            popup: Popup {
                title: "old".to_string(),
                lines: Vec::new(),
            },
        }
    }

    #[test]
    fn test_humanize_key() {
        assert_eq!(humanize_key("wheelchair"), "Wheelchair");
        assert_eq!(humanize_key("addr_street_name"), "Addr street name");
        assert_eq!(humanize_key("addr:street"), "Addr:street");
        assert_eq!(humanize_key(""), "");
    }

    #[test]
    fn test_humanize_key_leaves_non_ascii_initial() {
        assert_eq!(humanize_key("éxito_total"), "éxito total");
        assert_eq!(humanize_key("2nd_floor"), "2nd floor");
    }

    #[test]
    fn test_tag_labels() {
        assert_eq!(tag_label("opening_hours", Locale::Es), "Horario");
        assert_eq!(tag_label("wheelchair", Locale::Es), "Wheelchair");
        assert_eq!(tag_label("amenity", Locale::En), "Type");
    }

    #[test]
    fn test_display_name_placeholder() {
        assert_eq!(display_name(&feature(&[]).tags, Locale::Es), "Sin nombre");
        assert_eq!(display_name(&feature(&[("name", "")]).tags, Locale::En), "No name");
        assert_eq!(display_name(&feature(&[("name", "Cafe X")]).tags, Locale::Es), "Cafe X");
    }

    #[test]
    fn test_popup_lists_every_tag() {
        let popup = build_popup(
            &feature(&[("name", "Cafe X"), ("amenity", "cafe"), ("wheelchair", "yes")]),
            Locale::Es,
        );
        assert_eq!(popup.title, "Cafe X");
        assert_eq!(popup.lines.len(), 3);
        let text = popup.text();
        assert!(text.contains("Nombre: Cafe X"));
        assert!(text.contains("Tipo: cafe"));
        assert!(text.contains("Wheelchair: yes"));
    }

    #[test]
    fn test_fetch_state_ignores_superseded_generation() {
        let mut state = FetchState::default();
        let first = state.start();
        let second = state.start();
        assert!(!state.finish(first));
        assert_eq!(state.loading(), LoadingState::Loading { generation: second });
        assert!(state.finish(second));
        assert_eq!(state.loading(), LoadingState::Idle);
    }

    #[tokio::test]
    async fn test_end_to_end_single_cafe() {
        let bbox = BoundingBox::new(-2.2, -80.0, -2.1, -79.8);
        let transport = FakeTransport::new().respond(
            r#"{"elements":[{"type":"node","id":1,"lat":-2.15,"lon":-79.9,
                "tags":{"name":"Cafe X","amenity":"cafe"}}]}"#,
        );
        let client = OverpassClient::new(transport, "http://overpass.test/api/interpreter");
        let mut surface = RecordingSurface::new(bbox);
        surface.add_marker(stale_marker());
        let mut state = FetchState::default();
        assert_eq!(state.loading(), LoadingState::Idle);

        let features = fetch_and_render(
            &client,
            &mut surface,
            default_category(),
            &RenderOptions::default(),
            &mut state,
        )
        .await
        .unwrap();

        assert_eq!(features.len(), 1);
        assert_eq!(surface.clears, 1);
        assert_eq!(surface.markers.len(), 1);
        let marker = &surface.markers[0];
        assert_eq!(marker.coordinate, Coordinate::new(-2.15, -79.9));
        assert!(marker.popup.text().contains("Cafe X"));
        assert!(marker.popup.text().contains("Tipo: cafe"));
        assert_eq!(state.loading(), LoadingState::Idle);

        let Call::Post { body, .. } = &client_calls(&client)[0] else {
            panic!("expected a POST");
        };
        assert_eq!(body, &query::build(&bbox, default_category(), 25));
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_surface_cleared() {
        let transport = FakeTransport::new().fail(ServiceError::Status { status: 504 });
        let client = OverpassClient::new(transport, "http://overpass.test/api/interpreter");
        let mut surface = RecordingSurface::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0));
        surface.add_marker(stale_marker());
        let mut state = FetchState::default();

        let result = fetch_and_render(
            &client,
            &mut surface,
            resolve("fuel").unwrap(),
            &RenderOptions::default(),
            &mut state,
        )
        .await;

        assert!(result.is_err());
        assert!(surface.markers.is_empty());
        assert_eq!(state.loading(), LoadingState::Idle);
    }

    #[tokio::test]
    async fn test_malformed_body_is_an_error() {
        let transport = FakeTransport::new().respond("<html>busy</html>");
        let client = OverpassClient::new(transport, "http://overpass.test/api/interpreter");
        let mut surface = RecordingSurface::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0));
        let mut state = FetchState::default();

        let err = fetch_and_render(
            &client,
            &mut surface,
            default_category(),
            &RenderOptions::default(),
            &mut state,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::MalformedResponse { .. }));
        assert!(!state.is_loading());
    }

    fn client_calls(client: &OverpassClient<FakeTransport>) -> Vec<Call> {
        client.transport().calls()
    }
}
