use serde::{Deserialize, Serialize};

/// Unstructured content pulled out of a rendered results page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawExtraction {
    pub event_name: Option<String>,
    pub title: String,
    /// Rendered body text, truncated to a bounded number of characters.
    pub text_preview: String,
    /// Every `H:MM:SS` substring of the body, in document order.
    pub times: Vec<String>,
    pub place: Option<String>,
    pub date: Option<String>,
    /// Every table row on the page, each flattened to its cell texts.
    pub tables: Vec<Vec<String>>,
}
