use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::browser::{BrowserLauncher, ChromiumLauncher, SharedBrowser};
use crate::config::Settings;
use crate::error::{BrowserError, Result};
use crate::extract::PageExtractor;
use crate::link;
use crate::model::{EventInfo, RaceCardData, RaceCardOutput, RawExtraction};
use crate::parse;
use crate::render::CardRenderer;

/// The entry point for turning results links into race cards.
///
/// Holds one browser for reading result pages and one for rendering cards.
/// Both start on first use and stay up until [`close`](Self::close).
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> race_cards::Result<()> {
/// use race_cards::{RaceCardService, Settings};
///
/// let service = RaceCardService::new(Settings::default());
/// let cards = service
///     .generate_from_url("https://live.myrace.info/?f=bases/x.clax&B=320")
///     .await?;
/// println!("single post: {} bytes", cards.single_post.len());
/// service.close().await.ok();
/// # Ok(())
/// # }
/// ```
pub struct RaceCardService {
    extract_browser: Arc<SharedBrowser>,
    render_browser: Arc<SharedBrowser>,
    extractor: PageExtractor,
    renderer: CardRenderer,
}

impl RaceCardService {
    /// Create a service backed by a local Chromium.
    pub fn new(settings: Settings) -> Self {
        let launcher = Arc::new(ChromiumLauncher::new(settings.browser.clone()));
        Self::with_launchers(launcher.clone(), launcher, settings)
    }

    /// Create a service using the given browser launchers for page
    /// extraction and card rendering.
    pub fn with_launchers(
        extract: Arc<dyn BrowserLauncher>,
        render: Arc<dyn BrowserLauncher>,
        settings: Settings,
    ) -> Self {
        let extract_browser = Arc::new(SharedBrowser::new("extract", extract));
        let render_browser = Arc::new(SharedBrowser::new("render", render));
        Self {
            extractor: PageExtractor::new(Arc::clone(&extract_browser), settings.extractor),
            renderer: CardRenderer::new(Arc::clone(&render_browser), settings.renderer),
            extract_browser,
            render_browser,
        }
    }

    /// Validate `url`, read the result it points to and render its cards.
    #[instrument(skip(self))]
    pub async fn generate_from_url(&self, url: &str) -> Result<RaceCardOutput> {
        let bib = link::validate(url)?;
        let parts = link::extract_parts(url);
        let page_url = parts.page_url();

        let raw = self.extractor.extract(&page_url).await?;
        let participant = parse::reconstruct(&raw, &bib);
        debug!(
            bib,
            name = %participant.name,
            place = participant.place,
            checkpoints = participant.checkpoints.len(),
            "reconstructed result"
        );

        let data = RaceCardData {
            participant,
            event: event_info(&raw, &page_url),
        };
        self.generate_from_data(&data).await
    }

    /// Render cards for a result obtained some other way.
    #[instrument(skip_all, fields(bib = %data.participant.bib))]
    pub async fn generate_from_data(&self, data: &RaceCardData) -> Result<RaceCardOutput> {
        Ok(self.renderer.render_all(data).await?)
    }

    /// Shut down both browsers. Waits for in-flight work; safe to repeat.
    pub async fn close(&self) -> std::result::Result<(), BrowserError> {
        let extract = self.extract_browser.close().await;
        let render = self.render_browser.close().await;
        if let Err(e) = &extract {
            warn!(error = %e, "failed to close extraction browser");
        }
        if let Err(e) = &render {
            warn!(error = %e, "failed to close rendering browser");
        }
        extract.and(render)
    }
}

fn event_info(raw: &RawExtraction, url: &str) -> EventInfo {
    let mut event = EventInfo {
        date: raw.date.clone(),
        source_url: Some(url.to_string()),
        ..EventInfo::default()
    };
    if let Some(name) = [raw.event_name.as_deref(), Some(raw.title.as_str())]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|n| !n.is_empty())
    {
        event.name = name.to_string();
    }
    event
}
