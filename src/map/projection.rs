use crate::geo::{clamp_lat, wrap_lon, BoundingBox, Coordinate, MAX_MERCATOR_LAT};
use std::f64::consts::PI;

pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 19.0;

/// Width of the whole world in braille pixels at zoom 0.
/// A braille dot is roughly two screen pixels, so this is half a 256px tile.
const WORLD_PX_AT_ZOOM_0: f64 = 128.0;

/// Viewport representing the visible map area and zoom level
#[derive(Clone, Debug)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (clamped to the Mercator limit)
    pub center_lat: f64,
    /// Slippy-map zoom level
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

/// Normalized Web Mercator x in [0, 1]
#[inline(always)]
fn mercator_x(lon: f64) -> f64 {
    (lon + 180.0) / 360.0
}

/// Normalized Web Mercator y in [0, 1], 0 at the north edge
#[inline(always)]
fn mercator_y(lat: f64) -> f64 {
    let lat_rad = clamp_lat(lat).to_radians();
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

#[inline(always)]
fn inverse_x(x: f64) -> f64 {
    x * 360.0 - 180.0
}

#[inline(always)]
fn inverse_y(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees()
}

impl Viewport {
    pub fn new(center: Coordinate, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon: wrap_lon(center.lon),
            center_lat: clamp_lat(center.lat),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width,
            height,
        }
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.center_lat, self.center_lon)
    }

    /// Pixels spanned by the whole world at the current zoom
    #[inline(always)]
    fn scale(&self) -> f64 {
        WORLD_PX_AT_ZOOM_0 * self.zoom.exp2()
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = self.scale();
        let x = mercator_x(self.center_lon) + dx as f64 / scale;
        let y = mercator_y(self.center_lat) + dy as f64 / scale;

        self.center_lon = wrap_lon(inverse_x(x));
        self.center_lat = inverse_y(y.clamp(0.0, 1.0)).clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1.0).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - 1.0).max(MIN_ZOOM);
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, -1.0);
    }

    /// Zoom by `delta` levels keeping the point under (px, py) fixed
    fn zoom_at(&mut self, px: i32, py: i32, delta: f64) {
        let (lon, lat) = self.unproject(px, py);

        self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);

        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Unproject pixel coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let scale = self.scale();
        let x = (px as f64 - self.width as f64 / 2.0) / scale + mercator_x(self.center_lon);
        let y = (py as f64 - self.height as f64 / 2.0) / scale + mercator_y(self.center_lat);
        (inverse_x(x), inverse_y(y))
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let (px, py) = self.project_f64(lon, lat);
        (px.round() as i32, py.round() as i32)
    }

    /// Unrounded [`Viewport::project`]; far-off points stay exact for clipping
    pub fn project_f64(&self, lon: f64, lat: f64) -> (f64, f64) {
        let scale = self.scale();
        let px = (mercator_x(lon) - mercator_x(self.center_lon)) * scale + self.width as f64 / 2.0;
        let py = (mercator_y(lat) - mercator_y(self.center_lat)) * scale + self.height as f64 / 2.0;
        (px, py)
    }

    /// Geographic extent of the canvas
    pub fn bounds(&self) -> BoundingBox {
        let (west, north) = self.unproject(0, 0);
        let (east, south) = self.unproject(self.width as i32, self.height as i32);
        BoundingBox::from_corners(Coordinate::new(north, west), Coordinate::new(south, east))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guayaquil() -> Viewport {
        Viewport::new(Coordinate::new(-2.170998, -79.922359), 13.0, 200, 120)
    }

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(Coordinate::new(0.0, 0.0), 1.0, 100, 100);
        assert_eq!(vp.project(0.0, 0.0), (50, 50));
    }

    #[test]
    fn test_unproject_inverts_project() {
        let vp = guayaquil();
        let (px, py) = vp.project(-79.93, -2.16);
        let (lon, lat) = vp.unproject(px, py);
        assert!((lon - -79.93).abs() < 1e-3);
        assert!((lat - -2.16).abs() < 1e-3);
    }

    #[test]
    fn test_pan() {
        let mut vp = Viewport::new(Coordinate::new(0.0, 0.0), 2.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon > 0.0);
        vp.pan(0, 10);
        assert!(vp.center_lat < 0.0);
    }

    #[test]
    fn test_bounds_surround_center() {
        let vp = guayaquil();
        let bbox = vp.bounds();
        assert!(bbox.contains(vp.center()));
        assert!(bbox.south < bbox.north);
        assert!(bbox.west < bbox.east);
        // 200px wide at zoom 13: 200 / (128 * 8192) of 360 degrees
        assert!((bbox.east - bbox.west - 200.0 / (128.0 * 8192.0) * 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_at_keeps_point_under_cursor() {
        let mut vp = guayaquil();
        let before = vp.unproject(30, 20);
        vp.zoom_in_at(30, 20);
        let after = vp.unproject(30, 20);
        // one pixel at the new zoom
        let tolerance = 2.0 * 360.0 / vp.scale();
        assert!((before.0 - after.0).abs() < tolerance);
        assert!((before.1 - after.1).abs() < tolerance);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut vp = Viewport::new(Coordinate::new(0.0, 0.0), MAX_ZOOM, 10, 10);
        vp.zoom_in();
        assert_eq!(vp.zoom, MAX_ZOOM);
        vp.zoom = MIN_ZOOM;
        vp.zoom_out();
        assert_eq!(vp.zoom, MIN_ZOOM);
    }
}
