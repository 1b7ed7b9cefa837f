/// Latitude limit of the Web Mercator world
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// A WGS84 position in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Rectangular lat/lon region used to scope a spatial query
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub const fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Build a box from two arbitrary corners, clamped to the Mercator world
    pub fn from_corners(a: Coordinate, b: Coordinate) -> Self {
        Self {
            south: clamp_lat(a.lat.min(b.lat)),
            west: clamp_lon(a.lon.min(b.lon)),
            north: clamp_lat(a.lat.max(b.lat)),
            east: clamp_lon(a.lon.max(b.lon)),
        }
    }

    pub fn contains(&self, coord: Coordinate) -> bool {
        coord.lat >= self.south
            && coord.lat <= self.north
            && coord.lon >= self.west
            && coord.lon <= self.east
    }
}

/// Wrap longitude into [-180, 180]
#[inline(always)]
pub fn wrap_lon(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}

#[inline(always)]
pub fn clamp_lon(lon: f64) -> f64 {
    lon.clamp(-180.0, 180.0)
}

#[inline(always)]
pub fn clamp_lat(lat: f64) -> f64 {
    lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT)
}
