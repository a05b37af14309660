use serde::{Deserialize, Serialize};

/// The eight built-in document categories.
///
/// `Other` is the catch-all: classification falls back to it whenever no
/// signal clears the confidence threshold, and unknown category names parse
/// to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    IdPersonal,
    Financial,
    Receipts,
    Medical,
    Education,
    Vehicle,
    Property,
    Other,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Self::IdPersonal,
            Self::Financial,
            Self::Receipts,
            Self::Medical,
            Self::Education,
            Self::Vehicle,
            Self::Property,
            Self::Other,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::IdPersonal => "ID & Personal",
            Self::Financial => "Financial",
            Self::Receipts => "Receipts",
            Self::Medical => "Medical",
            Self::Education => "Education",
            Self::Vehicle => "Vehicle",
            Self::Property => "Property",
            Self::Other => "Other",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::IdPersonal => "📋",
            Self::Financial => "💰",
            Self::Receipts => "🧾",
            Self::Medical => "🏥",
            Self::Education => "🎓",
            Self::Vehicle => "🚗",
            Self::Property => "🏠",
            Self::Other => "📄",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::IdPersonal => "Passport, License, Aadhaar, PAN, Voter ID",
            Self::Financial => "Bank statements, Tax docs, Investment records",
            Self::Receipts => "Shopping, Restaurant, Online orders",
            Self::Medical => "Prescriptions, Lab reports, Medical bills",
            Self::Education => "Certificates, Marksheets, Transcripts",
            Self::Vehicle => "RC, Insurance, PUC, Service records",
            Self::Property => "Rent agreement, Electricity, Water bills",
            Self::Other => "Uncategorized documents",
        }
    }

    /// Parse a stored category name (display name or identifier), falling
    /// back to `Other` for anything unrecognized — including names of
    /// user-defined custom categories.
    pub fn from_name(name: &str) -> Category {
        Self::all()
            .iter()
            .copied()
            .find(|c| {
                c.display_name().eq_ignore_ascii_case(name)
                    || c.ident().eq_ignore_ascii_case(name)
            })
            .unwrap_or(Self::Other)
    }

    /// Stable identifier used in storage and matching (`id_personal`, ...).
    pub fn ident(&self) -> &'static str {
        match self {
            Self::IdPersonal => "id_personal",
            Self::Financial => "financial",
            Self::Receipts => "receipts",
            Self::Medical => "medical",
            Self::Education => "education",
            Self::Vehicle => "vehicle",
            Self::Property => "property",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A user-defined category, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomCategory {
    pub name: String,
    pub emoji: String,
}

impl CustomCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emoji: "📁".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_has_eight_members() {
        assert_eq!(Category::all().len(), 8);
    }

    #[test]
    fn from_name_matches_display_name_case_insensitive() {
        assert_eq!(Category::from_name("Medical"), Category::Medical);
        assert_eq!(Category::from_name("medical"), Category::Medical);
        assert_eq!(Category::from_name("ID & Personal"), Category::IdPersonal);
    }

    #[test]
    fn from_name_matches_ident() {
        assert_eq!(Category::from_name("id_personal"), Category::IdPersonal);
        assert_eq!(Category::from_name("receipts"), Category::Receipts);
    }

    #[test]
    fn from_name_unknown_falls_back_to_other() {
        assert_eq!(Category::from_name("Warranty Cards"), Category::Other);
        assert_eq!(Category::from_name(""), Category::Other);
    }

    #[test]
    fn display_uses_display_name() {
        assert_eq!(Category::IdPersonal.to_string(), "ID & Personal");
    }

    #[test]
    fn custom_category_default_emoji() {
        let c = CustomCategory::new("Warranty");
        assert_eq!(c.emoji, "📁");
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Category::IdPersonal).unwrap();
        assert_eq!(json, "\"id_personal\"");
        let parsed: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Category::IdPersonal);
    }
}
