//! One-shot fetch without the terminal UI.

use crate::config::{Config, ViewSettings};
use crate::map::{MapSurface, MapView, Marker, Viewport};
use crate::pipeline::{self, FetchState};
use crate::transport::Transport;
use crate::worker::Services;
use anyhow::{Context, Result};
use std::io::{self, Write};

/// Fetch the configured category once and print every marker to stdout
pub async fn run<T: Transport>(
    config: &Config,
    settings: &ViewSettings,
    services: &Services<T>,
) -> Result<()> {
    let viewport = Viewport::new(
        settings.center,
        settings.zoom,
        config.width as usize * 2,
        config.height as usize * 4,
    );
    let mut map = MapView::new(viewport);

    if let Some(place) = &config.place {
        let coord = services
            .geocoder
            .resolve(place)
            .await
            .with_context(|| format!("geocoding {place:?}"))?;
        map.set_view(coord, settings.search_zoom);
    }

    let mut state = FetchState::default();
    match pipeline::fetch_and_render(
        &services.overpass,
        &mut map,
        settings.category,
        &settings.render,
        &mut state,
    )
    .await
    {
        Ok(features) => log::info!("{} {} features", features.len(), settings.category.key),
        Err(e) => log::warn!("fetch failed: {e}"),
    }

    let stdout = io::stdout();
    write_markers(&mut stdout.lock(), map.markers())?;
    Ok(())
}

/// One block per marker: position, title, then the popup lines
pub fn write_markers<W: Write>(out: &mut W, markers: &[Marker]) -> io::Result<()> {
    for marker in markers {
        writeln!(
            out,
            "{:.6},{:.6}\t{}",
            marker.coordinate.lat, marker.coordinate.lon, marker.popup.title
        )?;
        for line in &marker.popup.lines {
            writeln!(out, "  {line}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::map::{Popup, PopupLine};

    #[test]
    fn test_write_markers() {
        let markers = vec![Marker {
            coordinate: Coordinate::new(-2.15, -79.9),
            popup: Popup {
                title: "Cafe X".to_string(),
                lines: vec![PopupLine {
                    label: "Tipo".to_string(),
                    value: "cafe".to_string(),
                }],
            },
        }];
        let mut out = Vec::new();
        write_markers(&mut out, &markers).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "-2.150000,-79.900000\tCafe X\n  Tipo: cafe\n"
        );
    }
}
