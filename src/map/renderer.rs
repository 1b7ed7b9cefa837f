use crate::braille::BrailleCanvas;
use crate::map::geometry::{clip_segment, draw_line};
use crate::map::projection::Viewport;

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Level of detail for basemap data
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lod {
    Low,    // 110m - world view
    Medium, // 50m - continental
    High,   // 10m - regional and closer
}

impl Lod {
    /// Select LOD based on zoom level
    pub fn from_zoom(zoom: f64) -> Self {
        if zoom < 3.0 {
            Lod::Low
        } else if zoom < 6.0 {
            Lod::Medium
        } else {
            Lod::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Lod::Low => "110m",
            Lod::Medium => "50m",
            Lod::High => "10m",
        }
    }
}

/// Display settings for basemap layers
#[derive(Clone, Debug)]
pub struct DisplaySettings {
    pub show_coastlines: bool,
    pub show_borders: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_coastlines: true,
            show_borders: true,
        }
    }
}

/// Basemap layers rasterized for one frame
pub struct MapLayers {
    pub coastlines: BrailleCanvas,
    pub borders: BrailleCanvas,
}

/// Basemap renderer with multi-resolution coastline data
#[derive(Default)]
pub struct MapRenderer {
    coastlines_low: Vec<LineString>,
    coastlines_medium: Vec<LineString>,
    coastlines_high: Vec<LineString>,
    borders_medium: Vec<LineString>,
    borders_high: Vec<LineString>,
    pub settings: DisplaySettings,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finest coastline set available at or below the given LOD
    fn coastlines(&self, lod: Lod) -> &[LineString] {
        let candidates = match lod {
            Lod::High => [&self.coastlines_high, &self.coastlines_medium, &self.coastlines_low],
            Lod::Medium => [&self.coastlines_medium, &self.coastlines_low, &self.coastlines_low],
            Lod::Low => [&self.coastlines_low, &self.coastlines_low, &self.coastlines_low],
        };
        candidates
            .into_iter()
            .find(|set| !set.is_empty())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn borders(&self, lod: Lod) -> &[LineString] {
        if lod == Lod::High && !self.borders_high.is_empty() {
            &self.borders_high
        } else {
            &self.borders_medium
        }
    }

    /// Rasterize the basemap for a map area of `width` x `height` cells
    pub fn render(&self, width: usize, height: usize, viewport: &Viewport) -> MapLayers {
        let lod = Lod::from_zoom(viewport.zoom);
        let mut layers = MapLayers {
            coastlines: BrailleCanvas::new(width, height),
            borders: BrailleCanvas::new(width, height),
        };

        if self.settings.show_coastlines {
            for line in self.coastlines(lod) {
                draw_linestring(&mut layers.coastlines, line, viewport);
            }
        }

        if self.settings.show_borders {
            for line in self.borders(lod) {
                draw_linestring(&mut layers.borders, line, viewport);
            }
        }

        layers
    }

    pub fn add_coastline(&mut self, line: LineString, lod: Lod) {
        match lod {
            Lod::Low => self.coastlines_low.push(line),
            Lod::Medium => self.coastlines_medium.push(line),
            Lod::High => self.coastlines_high.push(line),
        }
    }

    pub fn add_border(&mut self, line: LineString, lod: Lod) {
        match lod {
            Lod::High => self.borders_high.push(line),
            Lod::Low | Lod::Medium => self.borders_medium.push(line),
        }
    }

    /// Check if any coastline data is loaded
    pub fn has_data(&self) -> bool {
        !self.coastlines_low.is_empty()
            || !self.coastlines_medium.is_empty()
            || !self.coastlines_high.is_empty()
    }

    pub fn toggle_borders(&mut self) {
        self.settings.show_borders = !self.settings.show_borders;
    }
}

/// Draw a linestring, clipping each segment to the canvas
fn draw_linestring(canvas: &mut BrailleCanvas, line: &LineString, viewport: &Viewport) {
    if line.len() < 2 {
        return;
    }

    let (width, height) = (viewport.width as f64, viewport.height as f64);

    for pair in line.windows(2) {
        let ((lon0, lat0), (lon1, lat1)) = (pair[0], pair[1]);

        // Segments crossing the antimeridian would smear across the screen
        if (lon1 - lon0).abs() > 180.0 {
            continue;
        }

        let a = viewport.project_f64(lon0, lat0);
        let b = viewport.project_f64(lon1, lat1);
        if let Some((start, end)) = clip_segment(a, b, width, height) {
            draw_line(
                canvas,
                start.0.round() as i32,
                start.1.round() as i32,
                end.0.round() as i32,
                end.1.round() as i32,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;

    #[test]
    fn test_lod_thresholds() {
        assert_eq!(Lod::from_zoom(1.0), Lod::Low);
        assert_eq!(Lod::from_zoom(4.0), Lod::Medium);
        assert_eq!(Lod::from_zoom(13.0), Lod::High);
    }

    #[test]
    fn test_high_lod_falls_back_to_low() {
        let mut renderer = MapRenderer::new();
        renderer.add_coastline(vec![(-10.0, 0.0), (10.0, 0.0)], Lod::Low);
        assert_eq!(renderer.coastlines(Lod::High).len(), 1);
    }

    #[test]
    fn test_render_draws_visible_line() {
        let mut renderer = MapRenderer::new();
        renderer.add_coastline(vec![(-10.0, 0.0), (10.0, 0.0)], Lod::Low);
        let viewport = Viewport::new(Coordinate::new(0.0, 0.0), 1.0, 40, 40);
        let layers = renderer.render(20, 10, &viewport);
        assert!(layers.coastlines.dots().count() > 0);
        assert_eq!(layers.borders.dots().count(), 0);
    }

    #[test]
    fn test_borders_hidden_when_toggled_off() {
        let mut renderer = MapRenderer::new();
        renderer.add_border(vec![(-10.0, 0.0), (10.0, 0.0)], Lod::Medium);
        renderer.toggle_borders();
        let viewport = Viewport::new(Coordinate::new(0.0, 0.0), 1.0, 40, 40);
        let layers = renderer.render(20, 10, &viewport);
        assert_eq!(layers.borders.dots().count(), 0);
    }

    #[test]
    fn test_long_segment_through_view_draws_at_street_zoom() {
        let mut renderer = MapRenderer::new();
        renderer.add_coastline(vec![(-80.0, -5.0), (-80.0, 0.0)], Lod::Low);
        for zoom in [8.0, 13.0, 19.0] {
            let viewport = Viewport::new(Coordinate::new(-2.5, -80.0), zoom, 160, 120);
            let layers = renderer.render(80, 30, &viewport);
            assert_eq!(layers.coastlines.dots().count(), 30, "zoom {zoom}");
        }
    }

    #[test]
    fn test_antimeridian_segment_skipped() {
        let mut renderer = MapRenderer::new();
        renderer.add_coastline(vec![(179.0, 0.0), (-179.0, 0.0)], Lod::Low);
        let viewport = Viewport::new(Coordinate::new(0.0, 0.0), 0.0, 256, 256);
        let layers = renderer.render(128, 64, &viewport);
        assert_eq!(layers.coastlines.dots().count(), 0);
    }
}
