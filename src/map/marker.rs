use crate::geo::Coordinate;
use std::fmt;

/// One `label: value` row of a popup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupLine {
    pub label: String,
    pub value: String,
}

impl fmt::Display for PopupLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value)
    }
}

/// Attribute overlay attached to a marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub title: String,
    pub lines: Vec<PopupLine>,
}

impl Popup {
    /// Title followed by one line per attribute
    pub fn text(&self) -> String {
        let mut text = self.title.clone();
        for line in &self.lines {
            text.push('\n');
            text.push_str(&line.to_string());
        }
        text
    }

    /// Widest rendered line, in characters
    pub fn width(&self) -> usize {
        self.lines
            .iter()
            .map(|l| l.label.chars().count() + 2 + l.value.chars().count())
            .chain(std::iter::once(self.title.chars().count()))
            .max()
            .unwrap_or(0)
    }
}

/// A rendered point with its popup
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub coordinate: Coordinate,
    pub popup: Popup,
}
