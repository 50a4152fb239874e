use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawItem", into = "RawItem")]
pub struct Item {
    pub id: String,
    pub glyph: String,
    pub keywords: Vec<String>,
    normalized_terms: Vec<String>,
}

impl Item {
    pub fn new(id: &str, glyph: &str, keywords: &[&str]) -> Self {
        Self::from_owned(
            id.to_string(),
            glyph.to_string(),
            keywords.iter().map(|keyword| keyword.to_string()).collect(),
        )
    }

    pub fn from_owned(id: String, glyph: String, keywords: Vec<String>) -> Self {
        let normalized_terms = std::iter::once(&id)
            .chain(keywords.iter())
            .map(|term| normalize_for_search(term))
            .collect();
        Self {
            id,
            glyph,
            keywords,
            normalized_terms,
        }
    }

    /// Normalized id followed by every normalized keyword, in declaration order.
    pub fn normalized_terms(&self) -> &[String] {
        &self.normalized_terms
    }
}

#[derive(Serialize, Deserialize)]
struct RawItem {
    id: String,
    #[serde(alias = "char")]
    glyph: String,
    #[serde(default)]
    keywords: Vec<String>,
}

impl From<RawItem> for Item {
    fn from(value: RawItem) -> Self {
        Self::from_owned(value.id, value.glyph, value.keywords)
    }
}

impl From<Item> for RawItem {
    fn from(value: Item) -> Self {
        Self {
            id: value.id,
            glyph: value.glyph,
            keywords: value.keywords,
        }
    }
}

/// Lowercases and trims both queries and terms. Surrounding whitespace is
/// never significant: `" smi"` ranks like `"smi"`, and a blank query takes the
/// usage ordering.
pub fn normalize_for_search(input: &str) -> String {
    input.trim().to_lowercase()
}
