//! Overpass QL construction for category overlays.

use crate::category::Category;
use crate::geo::BoundingBox;
use std::fmt::Write;

/// Server-side timeout directive, in seconds
pub const DEFAULT_TIMEOUT_SECS: u32 = 25;

/// Build a query selecting every node, way and relation inside `bbox` whose
/// category tag matches, with ways and relations reduced to their center.
///
/// Tag and value are inserted verbatim: categories come from the fixed
/// registry and are never user input.
pub fn build(bbox: &BoundingBox, category: &Category, timeout_secs: u32) -> String {
    let filter = format!("[\"{}\"=\"{}\"]", category.tag(), category.value());
    let area = format!("({},{},{},{})", bbox.south, bbox.west, bbox.north, bbox.east);

    let mut query = String::with_capacity(256);
    let _ = writeln!(query, "[out:json][timeout:{timeout_secs}];");
    query.push_str("(\n");
    for element in ["node", "way", "relation"] {
        let _ = writeln!(query, "  {element}{filter}{area};");
    }
    query.push_str(");\nout center;\n");
    query
}
