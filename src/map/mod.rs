mod geometry;
mod marker;
mod projection;
mod renderer;
mod surface;

pub use marker::{Marker, Popup, PopupLine};
pub use projection::{Viewport, MAX_ZOOM, MIN_ZOOM};
pub use renderer::{Lod, LineString, MapLayers, MapRenderer};
pub use surface::{MapSurface, MapView};
