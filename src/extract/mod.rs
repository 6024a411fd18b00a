//! Pulls raw text and table content out of a script-rendered results page.

mod snapshot;

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::browser::{wait_for, BrowserPage, SharedBrowser};
use crate::config::ExtractorSettings;
use crate::error::{BrowserError, ExtractionError};
use crate::model::RawExtraction;

use snapshot::PageText;

/// Any of these means the results have started to render.
pub const READY_SELECTORS: &[&str] = &[
    ".results",
    "#results",
    ".result",
    "table",
    ".content",
    "#content",
    "main",
];

pub(crate) const TEXT_SCRIPT: &str = r#"(() => {
  const heading = document.querySelector('h1, .event-name, .race-name, .event-title, h2');
  return {
    title: document.title || '',
    heading: heading ? heading.innerText : '',
    text: document.body ? document.body.innerText : '',
  };
})()"#;

pub(crate) const TABLES_SCRIPT: &str =
    "Array.from(document.querySelectorAll('table')).map(t => t.outerHTML).join('\\n')";

/// Loads result pages in a shared browser and snapshots their content.
pub struct PageExtractor {
    browser: Arc<SharedBrowser>,
    settings: ExtractorSettings,
    ready_condition: String,
}

impl PageExtractor {
    pub fn new(browser: Arc<SharedBrowser>, settings: ExtractorSettings) -> Self {
        let selectors = serde_json::to_string(READY_SELECTORS).unwrap_or_else(|_| "[]".into());
        Self {
            browser,
            settings,
            ready_condition: format!("{selectors}.some(s => document.querySelector(s) !== null)"),
        }
    }

    /// Load `url` and return its raw content. The page is closed on every
    /// path, including when the returned future is dropped.
    #[instrument(skip(self))]
    pub async fn extract(&self, url: &str) -> Result<RawExtraction, ExtractionError> {
        let lease = self.browser.lease().await?;
        let page = lease.new_page().await?;
        let result = self.extract_from(&*page, url).await;
        page.close().await;
        result
    }

    async fn extract_from(
        &self,
        page: &dyn BrowserPage,
        url: &str,
    ) -> Result<RawExtraction, ExtractionError> {
        let timeout = self.settings.navigation_timeout();
        tokio::time::timeout(timeout, page.navigate(url))
            .await
            .map_err(|_| ExtractionError::NavigationTimeout {
                url: url.to_string(),
                timeout,
            })??;

        let ready = wait_for(
            page,
            &self.ready_condition,
            self.settings.selector_timeout(),
            self.settings.poll_interval(),
        )
        .await;
        if !ready {
            warn!(url, "no results element appeared, reading page as is");
        }
        tokio::time::sleep(self.settings.settle_delay()).await;

        let text: PageText =
            serde_json::from_value(page.evaluate(TEXT_SCRIPT).await?).map_err(BrowserError::from)?;
        let tables = page.evaluate(TABLES_SCRIPT).await?;
        let raw = snapshot::build(
            text,
            tables.as_str().unwrap_or_default(),
            self.settings.preview_chars,
        );

        debug!(
            url,
            rows = raw.tables.len(),
            times = raw.times.len(),
            title = %raw.title,
            "extracted page"
        );
        Ok(raw)
    }
}
