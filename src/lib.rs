//! Terminal map for finding nearby points of interest.
//!
//! Places are resolved with Nominatim, overlays come from the Overpass API,
//! and everything is drawn with Braille characters on a Web Mercator
//! viewport.

pub mod app;
pub mod braille;
pub mod category;
pub mod config;
pub mod data;
pub mod error;
pub mod geo;
pub mod geocode;
pub mod headless;
pub mod locale;
pub mod logging;
pub mod map;
pub mod overpass;
pub mod pipeline;
pub mod query;
pub mod transport;
pub mod ui;
pub mod worker;
