use crate::geo::{BoundingBox, Coordinate};
use crate::map::marker::Marker;
use crate::map::projection::Viewport;

/// The map widget the view controller drives
pub trait MapSurface {
    /// Recenter at `center` with the given zoom; completes a move
    fn set_view(&mut self, center: Coordinate, zoom: f64);

    /// Geographic extent currently shown
    fn bounds(&self) -> BoundingBox;

    fn add_marker(&mut self, marker: Marker);

    /// Remove every marker
    fn clear_markers(&mut self);

    fn markers(&self) -> &[Marker];

    /// Whether a pan or zoom completed since the last call
    fn take_move_end(&mut self) -> bool;
}

/// Terminal map surface: a viewport plus the marker set drawn on it
pub struct MapView {
    pub viewport: Viewport,
    markers: Vec<Marker>,
    move_end: bool,
    dragged: bool,
}

impl MapView {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            markers: Vec::new(),
            move_end: false,
            dragged: false,
        }
    }

    /// Update the canvas size in braille pixels
    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) != (self.viewport.width, self.viewport.height) {
            self.viewport.width = width;
            self.viewport.height = height;
            self.move_end = true;
        }
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
        self.move_end = true;
    }

    /// Pan as part of a drag gesture; the move ends on `end_drag`
    pub fn drag(&mut self, dx: i32, dy: i32) {
        if dx != 0 || dy != 0 {
            self.viewport.pan(dx, dy);
            self.dragged = true;
        }
    }

    pub fn end_drag(&mut self) {
        if std::mem::take(&mut self.dragged) {
            self.move_end = true;
        }
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.move_end = true;
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.move_end = true;
    }

    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.viewport.zoom_in_at(px, py);
        self.move_end = true;
    }

    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.viewport.zoom_out_at(px, py);
        self.move_end = true;
    }

    /// Index of the marker closest to (px, py) within `radius` pixels
    pub fn marker_at(&self, px: i32, py: i32, radius: i32) -> Option<usize> {
        self.markers
            .iter()
            .enumerate()
            .map(|(idx, m)| {
                let (mx, my) = self.viewport.project(m.coordinate.lon, m.coordinate.lat);
                let (dx, dy) = ((mx - px) as i64, (my - py) as i64);
                (idx, dx * dx + dy * dy)
            })
            .filter(|&(_, d2)| d2 <= (radius as i64) * (radius as i64))
            .min_by_key(|&(_, d2)| d2)
            .map(|(idx, _)| idx)
    }
}

impl MapSurface for MapView {
    fn set_view(&mut self, center: Coordinate, zoom: f64) {
        self.viewport = Viewport::new(center, zoom, self.viewport.width, self.viewport.height);
        self.move_end = true;
    }

    fn bounds(&self) -> BoundingBox {
        self.viewport.bounds()
    }

    fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
    }

    fn markers(&self) -> &[Marker] {
        &self.markers
    }

    fn take_move_end(&mut self) -> bool {
        std::mem::take(&mut self.move_end)
    }
}
