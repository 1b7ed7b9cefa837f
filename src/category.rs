use crate::error::UnknownCategory;

/// Tag used when a category does not name one
pub const DEFAULT_TAG: &str = "amenity";

/// A selectable point-of-interest overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub key: &'static str,
    pub label: &'static str,
    pub english_label: &'static str,
    tag: Option<&'static str>,
    value: Option<&'static str>,
}

impl Category {
    /// OSM tag key the overlay filters on (defaults to `amenity`)
    pub fn tag(&self) -> &'static str {
        self.tag.unwrap_or(DEFAULT_TAG)
    }

    /// OSM tag value the overlay filters on (defaults to the key)
    pub fn value(&self) -> &'static str {
        self.value.unwrap_or(self.key)
    }
}

static CATEGORIES: [Category; 3] = [
    Category {
        key: "cafe",
        label: "Café",
        english_label: "Café",
        tag: None,
        value: None,
    },
    Category {
        key: "clinic",
        label: "Clínica",
        english_label: "Clinic",
        tag: Some("amenity"),
        value: Some("clinic"),
    },
    Category {
        key: "fuel",
        label: "Gasolinera",
        english_label: "Fuel station",
        tag: Some("amenity"),
        value: Some("fuel"),
    },
];

/// All categories in display order
pub fn list_categories() -> &'static [Category] {
    &CATEGORIES
}

/// The category selected at startup
pub fn default_category() -> &'static Category {
    &CATEGORIES[0]
}

pub fn resolve(key: &str) -> Result<&'static Category, UnknownCategory> {
    CATEGORIES
        .iter()
        .find(|c| c.key == key)
        .ok_or_else(|| UnknownCategory(key.to_string()))
}

/// Whether `key` is the tag some category filters on
pub fn is_category_tag(key: &str) -> bool {
    CATEGORIES.iter().any(|c| c.tag() == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_unset() {
        let cafe = resolve("cafe").unwrap();
        assert_eq!(cafe.tag(), "amenity");
        assert_eq!(cafe.value(), "cafe");
    }

    #[test]
    fn test_explicit_pairs() {
        let fuel = resolve("fuel").unwrap();
        assert_eq!((fuel.tag(), fuel.value()), ("amenity", "fuel"));
    }

    #[test]
    fn test_unknown_key() {
        let err = resolve("bakery").unwrap_err();
        assert_eq!(err.0, "bakery");
    }

    #[test]
    fn test_keys_are_unique() {
        let cats = list_categories();
        for (i, a) in cats.iter().enumerate() {
            assert!(cats[i + 1..].iter().all(|b| b.key != a.key));
        }
    }

    #[test]
    fn test_default_is_first() {
        assert_eq!(default_category().key, "cafe");
    }
}
