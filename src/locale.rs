use crate::category::{self, Category};

/// Language for popup labels and interface text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    /// Human label for well-known tag keys
    pub fn tag_label(self, key: &str) -> Option<&'static str> {
        let label = match (self, key) {
            (Self::Es, "name") => "Nombre",
            (Self::Es, "opening_hours") => "Horario",
            (Self::Es, "operator") => "Operador",
            (Self::En, "name") => "Name",
            (Self::En, "opening_hours") => "Opening hours",
            (Self::En, "operator") => "Operator",
            (Self::Es, k) if category::is_category_tag(k) => "Tipo",
            (Self::En, k) if category::is_category_tag(k) => "Type",
            _ => return None,
        };
        Some(label)
    }

    /// Title for features without a name
    pub fn unnamed(self) -> &'static str {
        match self {
            Self::Es => "Sin nombre",
            Self::En => "No name",
        }
    }

    pub fn loading(self) -> &'static str {
        match self {
            Self::Es => "Cargando...",
            Self::En => "Loading...",
        }
    }

    pub fn search_placeholder(self) -> &'static str {
        match self {
            Self::Es => "Buscar ciudad o ubicación",
            Self::En => "Search city or place",
        }
    }

    pub fn search_title(self) -> &'static str {
        match self {
            Self::Es => "Buscar",
            Self::En => "Search",
        }
    }

    pub fn categories_title(self) -> &'static str {
        match self {
            Self::Es => "Categorías",
            Self::En => "Categories",
        }
    }

    pub fn category_label(self, category: &Category) -> &'static str {
        match self {
            Self::Es => category.label,
            Self::En => category.english_label,
        }
    }

    pub fn results(self, count: usize) -> String {
        match (self, count) {
            (Self::Es, 1) => "1 resultado".to_string(),
            (Self::Es, n) => format!("{n} resultados"),
            (Self::En, 1) => "1 result".to_string(),
            (Self::En, n) => format!("{n} results"),
        }
    }
}
