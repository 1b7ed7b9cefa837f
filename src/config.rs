use crate::category::{self, Category};
use crate::error::UnknownCategory;
use crate::geo::Coordinate;
use crate::geocode::DEFAULT_NOMINATIM_URL;
use crate::locale::Locale;
use crate::overpass::DEFAULT_OVERPASS_URL;
use crate::pipeline::RenderOptions;
use crate::query::DEFAULT_TIMEOUT_SECS;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command line configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "tui-poi")]
#[command(about = "Find cafés, clinics and fuel stations on a terminal map")]
pub struct Config {
    /// Initial map center latitude
    #[arg(long, default_value_t = -2.170998, allow_hyphen_values = true)]
    pub lat: f64,

    /// Initial map center longitude
    #[arg(long, default_value_t = -79.922359, allow_hyphen_values = true)]
    pub lon: f64,

    /// Initial zoom level
    #[arg(long, default_value_t = 13.0)]
    pub zoom: f64,

    /// Zoom level used after a successful search
    #[arg(long, default_value_t = 13.0)]
    pub search_zoom: f64,

    /// Category shown at startup (cafe, clinic, fuel)
    #[arg(long, default_value = "cafe")]
    pub category: String,

    #[arg(long, default_value = DEFAULT_OVERPASS_URL)]
    pub overpass_url: String,

    #[arg(long, default_value = DEFAULT_NOMINATIM_URL)]
    pub nominatim_url: String,

    /// Sent with every request; Nominatim rejects anonymous clients
    #[arg(long, default_value = concat!("tui-poi/", env!("CARGO_PKG_VERSION")))]
    pub user_agent: String,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub http_timeout: u64,

    /// Overpass server-side timeout directive in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub query_timeout: u32,

    /// Directory holding Natural Earth GeoJSON basemap files
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = Locale::Es)]
    pub lang: Locale,

    /// Write logs to this file (filtered by RUST_LOG)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Fetch once and print the markers instead of opening the map
    #[arg(long)]
    pub headless: bool,

    /// Place to search before the headless fetch
    #[arg(long, requires = "headless")]
    pub place: Option<String>,

    /// Headless viewport width in terminal cells
    #[arg(long, default_value_t = 80)]
    pub width: u16,

    /// Headless viewport height in terminal cells
    #[arg(long, default_value_t = 24)]
    pub height: u16,
}

/// Startup view and fetch settings for the view controller
#[derive(Debug, Clone, Copy)]
pub struct ViewSettings {
    pub center: Coordinate,
    pub zoom: f64,
    pub search_zoom: f64,
    pub category: &'static Category,
    pub render: RenderOptions,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            center: Coordinate::new(-2.170998, -79.922359),
            zoom: 13.0,
            search_zoom: 13.0,
            category: category::default_category(),
            render: RenderOptions::default(),
        }
    }
}

impl Config {
    /// # Errors
    ///
    /// Returns [`UnknownCategory`] if `--category` is not a registry key.
    pub fn view_settings(&self) -> Result<ViewSettings, UnknownCategory> {
        Ok(ViewSettings {
            center: Coordinate::new(self.lat, self.lon),
            zoom: self.zoom,
            search_zoom: self.search_zoom,
            category: category::resolve(&self.category)?,
            render: RenderOptions {
                query_timeout_secs: self.query_timeout,
                locale: self.lang,
            },
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_view_settings_default() {
        let config = Config::parse_from(["tui-poi"]);
        let settings = config.view_settings().unwrap();
        let defaults = ViewSettings::default();
        assert_eq!(settings.center, defaults.center);
        assert_eq!(settings.zoom, defaults.zoom);
        assert_eq!(settings.category.key, "cafe");
        assert_eq!(settings.render.query_timeout_secs, 25);
        assert_eq!(settings.render.locale, Locale::Es);
    }

    #[test]
    fn test_negative_coordinates_and_locale() {
        let config = Config::parse_from([
            "tui-poi", "--lat", "-33.45", "--lon", "-70.66", "--lang", "en", "--category", "fuel",
        ]);
        let settings = config.view_settings().unwrap();
        assert_eq!(settings.center, Coordinate::new(-33.45, -70.66));
        assert_eq!(settings.render.locale, Locale::En);
        assert_eq!(settings.category.key, "fuel");
    }

    #[test]
    fn test_unknown_category_rejected() {
        let config = Config::parse_from(["tui-poi", "--category", "bakery"]);
        assert!(config.view_settings().is_err());
    }

    #[test]
    fn test_place_requires_headless() {
        assert!(Config::try_parse_from(["tui-poi", "--place", "Quito"]).is_err());
        assert!(Config::try_parse_from(["tui-poi", "--headless", "--place", "Quito"]).is_ok());
    }
}
