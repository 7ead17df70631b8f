use serde::{Deserialize, Serialize};

/// A single recognised text fragment on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    pub text: String,
    pub confidence: f32,
    /// Polygon corners in page pixel coordinates, `[[x, y], ...]`.
    #[serde(default)]
    pub bbox: Vec<[f32; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-based page number.
    pub page: u32,
    pub items: Vec<TextItem>,
}

/// Structured output of one extraction, serialised as a JSON array of pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionResult {
    pub pages: Vec<PageResult>,
}

impl TextItem {
    pub fn new(text: impl Into<String>, confidence: f32, bbox: Vec<[f32; 2]>) -> Self {
        Self {
            text: text.into(),
            confidence,
            bbox,
        }
    }
}

impl ExtractionResult {
    pub fn new(pages: Vec<PageResult>) -> Self {
        Self { pages }
    }

    /// All item texts in page order, one per line.
    pub fn flat_text(&self) -> String {
        self.pages
            .iter()
            .flat_map(|page| page.items.iter())
            .map(|item| item.text.as_str())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|p| p.items.len()).sum()
    }
}
