//! Turns what the in-page scripts return into a [`RawExtraction`].

use std::sync::LazyLock;

use ::scraper::{ElementRef, Html, Selector};
use itertools::Itertools;
use regex::Regex;
use serde::Deserialize;

use crate::model::RawExtraction;
use crate::parse::CLOCK_TIME;

static PLACE_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:overall\s+)?(?:place|position|rank|місце|место|позиція|позиция)[ \t]*[:#№]?[ \t]*(\d+)",
    )
    .unwrap()
});

static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2}[./]\d{1,2}[./]\d{4}|\d{4}-\d{2}-\d{2})\b").unwrap()
});

static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th, td").unwrap());

/// Text-level view of the rendered page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PageText {
    pub title: String,
    pub heading: String,
    pub text: String,
}

pub(crate) fn build(page: PageText, tables_html: &str, preview_chars: usize) -> RawExtraction {
    let heading = page.heading.trim();
    RawExtraction {
        event_name: (!heading.is_empty()).then(|| heading.to_string()),
        title: page.title.trim().to_string(),
        text_preview: page.text.chars().take(preview_chars).collect(),
        times: CLOCK_TIME
            .find_iter(&page.text)
            .map(|m| m.as_str().to_string())
            .collect(),
        place: PLACE_PHRASE
            .captures(&page.text)
            .map(|c| c[1].to_string()),
        date: DATE.captures(&page.text).map(|c| c[1].to_string()),
        tables: table_rows(tables_html),
    }
}

/// Every row of every table in `html`, flattened to cell text.
pub(crate) fn table_rows(html: &str) -> Vec<Vec<String>> {
    let document = Html::parse_fragment(html);
    document
        .select(&ROW)
        .map(|row| row.select(&CELL).map(cell_text).collect_vec())
        .filter(|cells| !cells.is_empty())
        .collect()
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().flat_map(str::split_whitespace).join(" ")
}
