use crate::category::{self, Category};
use crate::config::ViewSettings;
use crate::error::{ServiceError, UnknownCategory};
use crate::geo::Coordinate;
use crate::map::{Lod, MapRenderer, MapSurface, MapView, Marker, Viewport};
use crate::pipeline::{self, FetchOutcome, FetchRequest, FetchState};
use ratatui::layout::Rect;

/// Pixel radius for picking a marker with the mouse
const MARKER_HIT_RADIUS: i32 = 3;

/// Network work requested by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Fetch(FetchRequest),
    Geocode { ticket: SearchTicket, text: String },
}

/// Identifies a submitted search.
///
/// A result only applies while its search is the latest one and no fetch
/// has started since it was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket {
    pub search: u64,
    pub fetch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

/// Application state and view controller
pub struct App {
    pub map: MapView,
    pub map_renderer: MapRenderer,
    pub active: &'static Category,
    pub fetch: FetchState,
    pub input_mode: InputMode,
    pub search_text: String,
    /// Index into the surface's markers whose popup is open
    pub selected: Option<usize>,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for cursor marker
    pub mouse_pos: Option<(u16, u16)>,
    /// Screen area of the map canvas
    map_area: Rect,
    settings: ViewSettings,
    commands: Vec<Command>,
    searches: u64,
    pending_search: Option<SearchTicket>,
}

impl App {
    pub fn new(settings: ViewSettings, map_area: Rect) -> Self {
        let (width, height) = canvas_size(map_area);
        Self {
            map: MapView::new(Viewport::new(settings.center, settings.zoom, width, height)),
            map_renderer: MapRenderer::new(),
            active: settings.category,
            fetch: FetchState::default(),
            input_mode: InputMode::Normal,
            search_text: String::new(),
            selected: None,
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
            map_area,
            settings,
            commands: Vec::new(),
            searches: 0,
            pending_search: None,
        }
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    /// Show the default view and load the startup category
    pub fn on_map_ready(&mut self) {
        self.map.set_view(self.settings.center, self.settings.zoom);
        self.map.take_move_end();
        self.request_fetch();
    }

    /// Per-frame hook: a completed pan or zoom re-fetches the active category
    pub fn tick(&mut self) {
        if self.map.take_move_end() {
            self.request_fetch();
        }
    }

    /// Geocode `text`; blank input does nothing
    pub fn on_search_submit(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.searches += 1;
        let ticket = SearchTicket {
            search: self.searches,
            fetch: self.fetch.generation(),
        };
        log::debug!("search #{}: {text:?}", ticket.search);
        self.pending_search = Some(ticket);
        self.commands.push(Command::Geocode {
            ticket,
            text: text.to_string(),
        });
    }

    /// Apply a geocode result; misses and failures are logged and dropped.
    ///
    /// Results for a superseded search, or arriving after the view has
    /// moved on to a new fetch, are ignored.
    pub fn complete_search(
        &mut self,
        ticket: SearchTicket,
        result: Result<Option<Coordinate>, ServiceError>,
    ) {
        if self.pending_search != Some(ticket) || !self.fetch.is_current(ticket.fetch) {
            log::debug!("search #{}: superseded, dropping result", ticket.search);
            return;
        }
        self.pending_search = None;

        match result {
            Ok(Some(coord)) => self.map.set_view(coord, self.settings.search_zoom),
            Ok(None) => log::info!("search: no match"),
            Err(e) => log::warn!("search failed: {e}"),
        }
    }

    /// Switch overlays and fetch immediately
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCategory`] if `key` is not in the registry.
    pub fn on_category_select(&mut self, key: &str) -> Result<(), UnknownCategory> {
        self.active = category::resolve(key)?;
        self.request_fetch();
        Ok(())
    }

    /// Select the category at a zero-based position in the sidebar
    pub fn select_category_index(&mut self, index: usize) {
        if let Some(category) = category::list_categories().get(index) {
            // registry keys always resolve
            let _ = self.on_category_select(category.key);
        }
    }

    pub fn next_category(&mut self) {
        let categories = category::list_categories();
        let current = categories
            .iter()
            .position(|c| c.key == self.active.key)
            .unwrap_or(0);
        self.select_category_index((current + 1) % categories.len());
    }

    /// Clear markers and queue a spatial query for the current view
    pub fn request_fetch(&mut self) {
        let generation = self.fetch.start();
        self.selected = None;
        let query = pipeline::begin(&mut self.map, self.active, &self.settings.render);
        log::debug!(
            "fetch #{generation}: {} in {:?}",
            self.active.key,
            self.map.bounds()
        );
        self.commands.push(Command::Fetch(FetchRequest { generation, query }));
    }

    /// Apply a finished fetch unless a newer one has started since
    pub fn complete_fetch(&mut self, outcome: FetchOutcome) {
        if !self.fetch.finish(outcome.generation) {
            log::debug!("fetch #{}: superseded, dropping result", outcome.generation);
            return;
        }

        // Failures are only logged; the map stays empty until the next fetch
        match outcome.result {
            Ok(features) => {
                log::debug!("fetch #{}: {} features", outcome.generation, features.len());
                pipeline::render_features(&mut self.map, &features, self.settings.render.locale);
            }
            Err(e) => log::warn!("fetch #{} failed: {e}", outcome.generation),
        }
    }

    /// Drain queued network commands
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn is_loading(&self) -> bool {
        self.fetch.is_loading()
    }

    pub fn markers(&self) -> &[Marker] {
        self.map.markers()
    }

    pub fn selected_marker(&self) -> Option<&Marker> {
        self.selected.and_then(|idx| self.markers().get(idx))
    }

    /// Update the map canvas area when the terminal resizes
    pub fn resize(&mut self, map_area: Rect) {
        self.map_area = map_area;
        let (width, height) = canvas_size(map_area);
        self.map.resize(width, height);
    }

    pub fn map_area(&self) -> Rect {
        self.map_area
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.map.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.map.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.map.zoom_out();
    }

    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.to_pixel(col, row) {
            self.map.zoom_in_at(px, py);
        }
    }

    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.to_pixel(col, row) {
            self.map.zoom_out_at(px, py);
        }
    }

    /// Return to the startup center and zoom
    pub fn reset_view(&mut self) {
        self.map.set_view(self.settings.center, self.settings.zoom);
    }

    /// Left button pressed: start a drag and pick a marker under the cursor
    pub fn press(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        if let Some((px, py)) = self.to_pixel(col, row) {
            if let Some(idx) = self.map.marker_at(px, py, MARKER_HIT_RADIUS) {
                self.selected = Some(idx);
            }
        }
    }

    /// Handle mouse drag
    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_col, last_row)) = self.last_mouse {
            // one cell is 2x4 braille pixels
            let dx = (last_col as i32 - col as i32) * 2;
            let dy = (last_row as i32 - row as i32) * 4;
            self.map.drag(dx, dy);
        }
        self.last_mouse = Some((col, row));
    }

    /// Reset drag state when mouse button released
    pub fn end_drag(&mut self) {
        self.last_mouse = None;
        self.map.end_drag();
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Mouse position in canvas pixels, if over the map
    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos.and_then(|(col, row)| self.to_pixel(col, row))
    }

    /// Open the popup of the next marker
    pub fn select_next_marker(&mut self) {
        let count = self.markers().len();
        if count == 0 {
            return;
        }
        self.selected = Some(self.selected.map_or(0, |idx| (idx + 1) % count));
    }

    pub fn select_prev_marker(&mut self) {
        let count = self.markers().len();
        if count == 0 {
            return;
        }
        self.selected = Some(self.selected.map_or(count - 1, |idx| (idx + count - 1) % count));
    }

    pub fn close_popup(&mut self) {
        self.selected = None;
    }

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Search;
    }

    pub fn cancel_search(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn push_search_char(&mut self, ch: char) {
        self.search_text.push(ch);
    }

    pub fn pop_search_char(&mut self) {
        self.search_text.pop();
    }

    /// Leave search mode and geocode the typed text
    pub fn submit_search(&mut self) {
        self.input_mode = InputMode::Normal;
        let text = self.search_text.clone();
        self.on_search_submit(&text);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("z{:.0}", self.map.viewport.zoom)
    }

    /// Get current center coordinates as a string
    pub fn center_coords(&self) -> String {
        let center = self.map.viewport.center();
        format!(
            "{:.4}°{}, {:.4}°{}",
            center.lat.abs(),
            if center.lat >= 0.0 { "N" } else { "S" },
            center.lon.abs(),
            if center.lon >= 0.0 { "E" } else { "W" }
        )
    }

    pub fn lod_level(&self) -> &'static str {
        Lod::from_zoom(self.map.viewport.zoom).label()
    }

    /// Terminal cell to canvas pixel, `None` outside the map
    fn to_pixel(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let area = self.map_area;
        let inside = col >= area.x
            && col < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        inside.then(|| (((col - area.x) as i32) * 2, ((row - area.y) as i32) * 4))
    }
}

/// Braille canvas size in pixels for a map area of terminal cells
fn canvas_size(area: Rect) -> (usize, usize) {
    (area.width as usize * 2, area.height as usize * 4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overpass::Feature;
    use crate::pipeline::LoadingState;

    fn app() -> App {
        App::new(ViewSettings::default(), Rect::new(30, 1, 80, 30))
    }

    fn fetch_generation(command: &Command) -> u64 {
        match command {
            Command::Fetch(req) => req.generation,
            other => panic!("expected fetch, got {other:?}"),
        }
    }

    fn cafe_x() -> Feature {
        Feature {
            kind: None,
            id: Some(1),
            coordinate: Coordinate::new(-2.15, -79.9),
            tags: [("name", "Cafe X"), ("amenity", "cafe")].into_iter().collect(),
        }
    }

    #[test]
    fn test_map_ready_fetches_default_category() {
        let mut app = app();
        app.on_map_ready();
        let commands = app.take_commands();
        assert_eq!(commands.len(), 1);
        let Command::Fetch(req) = &commands[0] else {
            panic!("expected fetch");
        };
        assert!(req.query.contains("node[\"amenity\"=\"cafe\"]"));
        assert!(app.is_loading());

        // the initial set_view does not cause a second fetch
        app.tick();
        assert!(app.take_commands().is_empty());
    }

    #[test]
    fn test_loading_transitions_and_markers() {
        let mut app = app();
        assert_eq!(app.fetch.loading(), LoadingState::Idle);
        app.on_map_ready();
        let generation = fetch_generation(&app.take_commands()[0]);
        assert_eq!(app.fetch.loading(), LoadingState::Loading { generation });

        app.complete_fetch(FetchOutcome {
            generation,
            result: Ok(vec![cafe_x()]),
        });

        assert_eq!(app.fetch.loading(), LoadingState::Idle);
        assert_eq!(app.markers().len(), 1);
        assert_eq!(app.markers()[0].coordinate, Coordinate::new(-2.15, -79.9));
        assert!(app.markers()[0].popup.text().contains("Tipo: cafe"));
    }

    #[test]
    fn test_stale_fetch_is_ignored() {
        let mut app = app();
        app.on_map_ready();
        let first = fetch_generation(&app.take_commands()[0]);
        app.on_category_select("fuel").unwrap();
        let second = fetch_generation(&app.take_commands()[0]);

        app.complete_fetch(FetchOutcome {
            generation: first,
            result: Ok(vec![cafe_x()]),
        });
        assert!(app.markers().is_empty());
        assert!(app.is_loading());

        app.complete_fetch(FetchOutcome {
            generation: second,
            result: Ok(Vec::new()),
        });
        assert!(!app.is_loading());
    }

    #[test]
    fn test_failed_fetch_clears_and_goes_idle() {
        let mut app = app();
        app.on_map_ready();
        let generation = fetch_generation(&app.take_commands()[0]);
        app.complete_fetch(FetchOutcome {
            generation,
            result: Ok(vec![cafe_x()]),
        });

        app.pan(10, 0);
        app.tick();
        let generation = fetch_generation(&app.take_commands()[0]);
        assert!(app.markers().is_empty());
        app.complete_fetch(FetchOutcome {
            generation,
            result: Err(ServiceError::RateLimited),
        });
        assert!(app.markers().is_empty());
        assert!(!app.is_loading());
    }

    #[test]
    fn test_category_select() {
        let mut app = app();
        app.on_category_select("clinic").unwrap();
        assert_eq!(app.active.key, "clinic");
        let commands = app.take_commands();
        assert_eq!(commands.len(), 1);
        let Command::Fetch(req) = &commands[0] else {
            panic!("expected fetch");
        };
        assert!(req.query.contains("[\"amenity\"=\"clinic\"]"));

        assert!(app.on_category_select("bakery").is_err());
        assert_eq!(app.active.key, "clinic");
        assert!(app.take_commands().is_empty());
    }

    #[test]
    fn test_next_category_wraps() {
        let mut app = app();
        app.next_category();
        app.next_category();
        assert_eq!(app.active.key, "fuel");
        app.next_category();
        assert_eq!(app.active.key, "cafe");
    }

    #[test]
    fn test_blank_search_is_noop() {
        let mut app = app();
        app.on_search_submit("   ");
        assert!(app.take_commands().is_empty());
    }

    fn search_ticket(command: &Command) -> SearchTicket {
        match command {
            Command::Geocode { ticket, .. } => *ticket,
            other => panic!("expected geocode, got {other:?}"),
        }
    }

    fn submit(app: &mut App, text: &str) -> SearchTicket {
        app.on_search_submit(text);
        let commands = app.take_commands();
        assert_eq!(commands.len(), 1);
        search_ticket(&commands[0])
    }

    #[test]
    fn test_search_recenters_then_fetches_once() {
        let mut app = app();
        app.search_text = "Quito".to_string();
        app.start_search();
        app.submit_search();
        assert_eq!(app.input_mode, InputMode::Normal);
        let commands = app.take_commands();
        assert_eq!(commands.len(), 1);
        let ticket = search_ticket(&commands[0]);
        assert_eq!(
            commands[0],
            Command::Geocode {
                ticket,
                text: "Quito".to_string()
            }
        );

        app.complete_search(ticket, Ok(Some(Coordinate::new(-0.22, -78.51))));
        assert_eq!(app.map.viewport.center(), Coordinate::new(-0.22, -78.51));
        app.tick();
        app.tick();
        let commands = app.take_commands();
        assert_eq!(commands.len(), 1);
        assert!(matches!(commands[0], Command::Fetch(_)));
    }

    #[test]
    fn test_search_miss_keeps_view() {
        let mut app = app();
        let before = app.map.viewport.center();
        let ticket = submit(&mut app, "nowhere");
        app.complete_search(ticket, Ok(None));
        let ticket = submit(&mut app, "nowhere");
        app.complete_search(ticket, Err(ServiceError::EmptyResult));
        app.tick();
        assert_eq!(app.map.viewport.center(), before);
        assert!(app.take_commands().is_empty());
    }

    #[test]
    fn test_older_search_result_is_ignored() {
        let mut app = app();
        let before = app.map.viewport.center();
        let first = submit(&mut app, "Quito");
        let second = submit(&mut app, "Cuenca");

        app.complete_search(first, Ok(Some(Coordinate::new(-0.22, -78.51))));
        assert_eq!(app.map.viewport.center(), before);

        app.complete_search(second, Ok(Some(Coordinate::new(-2.9, -79.0))));
        assert_eq!(app.map.viewport.center(), Coordinate::new(-2.9, -79.0));
    }

    #[test]
    fn test_search_result_after_pan_is_ignored() {
        let mut app = app();
        app.on_map_ready();
        app.take_commands();
        let ticket = submit(&mut app, "Quito");

        app.pan(10, 0);
        app.tick();
        assert_eq!(app.take_commands().len(), 1);
        let panned = app.map.viewport.center();

        app.complete_search(ticket, Ok(Some(Coordinate::new(-0.22, -78.51))));
        assert_eq!(app.map.viewport.center(), panned);
        app.tick();
        assert!(app.take_commands().is_empty());
    }

    #[test]
    fn test_search_result_applies_once() {
        let mut app = app();
        let ticket = submit(&mut app, "Quito");
        app.complete_search(ticket, Ok(Some(Coordinate::new(-0.22, -78.51))));
        app.tick();
        app.take_commands();
        app.complete_search(ticket, Ok(Some(Coordinate::new(-0.22, -78.51))));
        app.tick();
        assert!(app.take_commands().is_empty());
    }

    #[test]
    fn test_drag_refetches_on_release_only() {
        let mut app = app();
        app.press(60, 10);
        app.handle_drag(62, 10);
        app.handle_drag(64, 11);
        app.tick();
        assert!(app.take_commands().is_empty());
        app.end_drag();
        app.tick();
        assert_eq!(app.take_commands().len(), 1);
    }

    #[test]
    fn test_marker_selection_cycles() {
        let mut app = app();
        app.on_map_ready();
        let generation = fetch_generation(&app.take_commands()[0]);
        let mut other = cafe_x();
        other.coordinate = Coordinate::new(-2.16, -79.91);
        app.complete_fetch(FetchOutcome {
            generation,
            result: Ok(vec![cafe_x(), other]),
        });

        app.select_prev_marker();
        assert_eq!(app.selected, Some(1));
        app.select_next_marker();
        assert_eq!(app.selected, Some(0));
        assert_eq!(app.selected_marker().unwrap().popup.title, "Cafe X");
        app.close_popup();
        assert!(app.selected_marker().is_none());
    }

    #[test]
    fn test_mouse_outside_map_is_ignored() {
        let mut app = app();
        app.set_mouse_pos(5, 5);
        assert_eq!(app.mouse_pixel_pos(), None);
        app.set_mouse_pos(31, 2);
        assert_eq!(app.mouse_pixel_pos(), Some((2, 4)));
    }
}
