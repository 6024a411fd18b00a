//! Renders race cards by screenshotting filled-in HTML templates.

mod presentation;
mod template;

use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, instrument, warn};

use crate::browser::{wait_for, BrowserLease, BrowserPage, Canvas, SharedBrowser};
use crate::config::RendererSettings;
use crate::error::RenderError;
use crate::model::{Checkpoint, Medal, RaceCardData, RaceCardOutput};

pub use presentation::{medal_class, medal_icon, PLACEHOLDER};

use presentation::{format_km, or_placeholder, profile_points};
use template::{Context, Template};

/// 405×506 logical pixels at 2.667× exports a 1080-pixel-wide image.
pub const CARD_CANVAS: Canvas = Canvas {
    width: 405,
    height: 506,
    scale: 2.667,
};

const STYLES: &str = include_str!("../../templates/card.css");

const SINGLE_POST: Template = Template::new(
    "single_post.html",
    include_str!("../../templates/single_post.html"),
);
const HEADLINE_SLIDE: Template = Template::new(
    "carousel_headline.html",
    include_str!("../../templates/carousel_headline.html"),
);
const DETAILS_SLIDE: Template = Template::new(
    "carousel_details.html",
    include_str!("../../templates/carousel_details.html"),
);
const ELEVATION_PANEL: Template = Template::new(
    "details_elevation.html",
    include_str!("../../templates/details_elevation.html"),
);
const STATS_PANEL: Template = Template::new(
    "details_stats.html",
    include_str!("../../templates/details_stats.html"),
);
const SPLITS_SLIDE: Template = Template::new(
    "carousel_splits.html",
    include_str!("../../templates/carousel_splits.html"),
);
const SPLIT_ROW: Template = Template::new(
    "split_row.html",
    include_str!("../../templates/split_row.html"),
);

const READY_CONDITION: &str = "document.readyState === 'complete'";
const FONTS_READY: &str = "document.fonts ? document.fonts.ready.then(() => true) : true";

/// Produces the single post and the three carousel slides for a result.
pub struct CardRenderer {
    browser: Arc<SharedBrowser>,
    settings: RendererSettings,
}

impl CardRenderer {
    pub fn new(browser: Arc<SharedBrowser>, settings: RendererSettings) -> Self {
        Self { browser, settings }
    }

    /// The single post image.
    #[instrument(skip_all, fields(bib = %data.participant.bib))]
    pub async fn render_single_post(&self, data: &RaceCardData) -> Result<Vec<u8>, RenderError> {
        let html = single_post_html(data)?;
        let lease = self.browser.lease().await?;
        self.capture(&lease, &html).await
    }

    /// Headline, details and splits slides, in that order.
    #[instrument(skip_all, fields(bib = %data.participant.bib))]
    pub async fn render_carousel(&self, data: &RaceCardData) -> Result<[Vec<u8>; 3], RenderError> {
        let [headline, details, splits] = carousel_html(data)?;
        let lease = self.browser.lease().await?;
        Ok([
            self.capture(&lease, &headline).await?,
            self.capture(&lease, &details).await?,
            self.capture(&lease, &splits).await?,
        ])
    }

    /// The single post followed by the carousel: always four images on success.
    pub async fn render_all(&self, data: &RaceCardData) -> Result<RaceCardOutput, RenderError> {
        let single_post = self.render_single_post(data).await?;
        let carousel_slides = self.render_carousel(data).await?;
        Ok(RaceCardOutput {
            single_post,
            carousel_slides,
        })
    }

    async fn capture(&self, lease: &BrowserLease<'_>, html: &str) -> Result<Vec<u8>, RenderError> {
        let page = lease.new_page().await?;
        let result = self.capture_on(&*page, html).await;
        page.close().await;
        result
    }

    async fn capture_on(&self, page: &dyn BrowserPage, html: &str) -> Result<Vec<u8>, RenderError> {
        page.set_canvas(CARD_CANVAS).await?;
        page.set_content(html).await?;

        let timeout = self.settings.ready_timeout();
        if !wait_for(page, READY_CONDITION, timeout, self.settings.poll_interval()).await {
            warn!("card page did not finish loading, capturing anyway");
        }
        match tokio::time::timeout(timeout, page.evaluate(FONTS_READY)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!(error = %e, "font readiness check failed"),
            Err(_) => warn!("web fonts still loading, capturing anyway"),
        }
        tokio::time::sleep(self.settings.font_delay()).await;

        let image = page.screenshot(CARD_CANVAS).await?;
        debug!(
            bytes = image.len(),
            width = CARD_CANVAS.pixel_width(),
            "captured card"
        );
        Ok(image)
    }
}

fn single_post_html(data: &RaceCardData) -> Result<String, RenderError> {
    SINGLE_POST.render(&base_context(data))
}

fn carousel_html(data: &RaceCardData) -> Result<[String; 3], RenderError> {
    let mut context = base_context(data);
    let participant = &data.participant;

    let panel = match (participant.elevation_start, participant.elevation_finish) {
        (Some(start), Some(finish)) if participant.has_elevation_data() => {
            context
                .text("profile_points", profile_points(start, finish, participant.elevation_gain))
                .text("elevation_start", start.to_string())
                .text("elevation_finish", finish.to_string());
            ELEVATION_PANEL.render(&context)?
        }
        _ => STATS_PANEL.render(&context)?,
    };
    context.markup("details_panel", panel);

    let rows: String = participant
        .checkpoints
        .iter()
        .map(split_row_html)
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .join("\n");
    let has_splits = participant.has_checkpoints();
    context
        .markup("split_rows", rows)
        .text("splits_class", if has_splits { "" } else { "hidden" })
        .text("empty_class", if has_splits { "hidden" } else { "" });

    Ok([
        HEADLINE_SLIDE.render(&context)?,
        DETAILS_SLIDE.render(&context)?,
        SPLITS_SLIDE.render(&context)?,
    ])
}

fn split_row_html(checkpoint: &Checkpoint) -> Result<String, RenderError> {
    let mut context = Context::default();
    context
        .text("point", &checkpoint.name)
        .text("time", &checkpoint.time)
        .text("pace", or_placeholder(checkpoint.pace.as_deref()));
    SPLIT_ROW.render(&context)
}

/// Values every card template may use.
fn base_context(data: &RaceCardData) -> Context {
    let participant = &data.participant;
    let event = &data.event;
    let medal = participant.medal();
    let place = match participant.place {
        0 => PLACEHOLDER.to_string(),
        n => n.to_string(),
    };
    let distance = participant
        .distance_km
        .map(format_km)
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    let mut context = Context::default();
    context
        .markup("styles", STYLES.to_string())
        .text("medal_class", medal_class(medal))
        .text("medal_icon", medal_icon(medal))
        .text(
            "medal",
            match medal {
                Medal::None => PLACEHOLDER.to_string(),
                tier => tier.to_string(),
            },
        )
        .text("name", &participant.name)
        .text("bib", &participant.bib)
        .text("time", &participant.time)
        .text("place", place)
        .text("club", or_placeholder(participant.club.as_deref()))
        .text("race", or_placeholder(participant.race.as_deref()))
        .text("category", or_placeholder(participant.category.as_deref()))
        .text(
            "place_category",
            or_placeholder(participant.place_category.as_deref()),
        )
        .text(
            "place_gender",
            participant
                .place_gender
                .map_or_else(|| PLACEHOLDER.to_string(), |p| p.to_string()),
        )
        .text(
            "gender",
            participant
                .gender
                .map_or_else(|| PLACEHOLDER.to_string(), |g| g.to_string()),
        )
        .text("pace", or_placeholder(participant.pace.as_deref()))
        .text("distance", distance)
        .text(
            "elevation_gain",
            participant
                .elevation_gain
                .map_or_else(|| PLACEHOLDER.to_string(), |g| format!("{g} m")),
        )
        .text("event_name", &event.name)
        .text("organizer", &event.organizer)
        .text("timing_provider", &event.timing_provider)
        .text("event_date", or_placeholder(event.date.as_deref()));
    context
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::Value;

    use super::*;
    use crate::browser::fake::FakeBrowser;
    use crate::model::{EventInfo, ParticipantResult};

    fn renderer(fake: &FakeBrowser) -> CardRenderer {
        let browser = Arc::new(SharedBrowser::new("render", Arc::new(fake.clone())));
        CardRenderer::new(browser, RendererSettings::default())
    }

    fn bare_data() -> RaceCardData {
        RaceCardData {
            participant: ParticipantResult {
                bib: "320".into(),
                name: "Participant #320".into(),
                time: "—".into(),
                ..Default::default()
            },
            event: EventInfo::default(),
        }
    }

    fn full_data() -> RaceCardData {
        let mut data = bare_data();
        data.participant = ParticipantResult {
            bib: "7".into(),
            name: "Ivan <Petrenko>".into(),
            time: "1:58:24".into(),
            place: 1,
            club: Some("Run & Fun".into()),
            category: Some("M30-39".into()),
            place_category: Some("1/89".into()),
            distance_km: Some(21.1),
            elevation_gain: Some(180),
            elevation_start: Some(120),
            elevation_finish: Some(140),
            checkpoints: vec![Checkpoint {
                name: "CP1".into(),
                distance_km: None,
                time: "00:38:12".into(),
                pace: Some("7:38 /km".into()),
            }],
            ..Default::default()
        };
        data
    }

    #[test]
    fn test_single_post_without_medal() {
        let html = single_post_html(&bare_data()).unwrap();
        assert!(html.contains("Participant #320"));
        assert!(html.contains(r#"<main class="card ">"#));
        assert!(html.contains("Race Results"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_single_post_escapes_fields() {
        let html = single_post_html(&full_data()).unwrap();
        assert!(html.contains("Ivan &lt;Petrenko&gt;"));
        assert!(html.contains("Run &amp; Fun"));
        assert!(html.contains("medal-gold"));
        assert!(html.contains("🥇"));
    }

    #[test]
    fn test_details_slide_branches_on_elevation() {
        let [_, details, splits] = carousel_html(&full_data()).unwrap();
        assert!(details.contains("Elevation"));
        assert!(details.contains("Start 120 m"));
        assert!(splits.contains("<td>CP1</td><td>00:38:12</td><td>7:38 /km</td>"));
        assert!(splits.contains(r#"<p class="empty hidden">"#));

        let [_, details, splits] = carousel_html(&bare_data()).unwrap();
        assert!(!details.contains("Elevation"));
        assert!(details.contains("Distance"));
        assert!(splits.contains(r#"<table class="splits hidden">"#));
        for html in carousel_html(&bare_data()).unwrap() {
            assert!(!html.contains("{{"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_all_yields_four_images() {
        let fake = FakeBrowser::new(|_| Ok(Value::Bool(true)));
        let output = renderer(&fake).render_all(&bare_data()).await.unwrap();

        assert_eq!(output.images().count(), 4);
        let state = fake.state();
        assert_eq!(state.launches, 1);
        assert_eq!(state.screenshots, 4);
        assert_eq!(state.pages_opened, 4);
        assert_eq!(state.pages_closed, 4);
        assert!(state.canvases.iter().all(|c| *c == CARD_CANVAS));
        assert!(state.contents[0].contains("Participant #320"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_render_closes_pages() {
        let fake = FakeBrowser::new(|_| Ok(Value::Bool(true)));
        let renderer = renderer(&fake);

        // Gives up while the second card waits for fonts.
        let abandoned =
            tokio::time::timeout(Duration::from_millis(1500), renderer.render_all(&full_data()))
                .await;
        assert!(abandoned.is_err());
        tokio::time::sleep(Duration::from_secs(60)).await;

        let state = fake.state();
        assert_eq!(state.screenshots, 1);
        assert_eq!(state.pages_opened, 2);
        assert_eq!(state.pages_closed, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fonts_do_not_fail() {
        let fake = FakeBrowser::new(|script| match script {
            FONTS_READY => Err(crate::error::BrowserError::Protocol("no fonts".into())),
            _ => Ok(Value::Bool(false)),
        });
        let image = renderer(&fake).render_single_post(&full_data()).await.unwrap();
        assert!(!image.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_screenshot_failure_closes_page() {
        let fake = FakeBrowser::new(|_| Ok(Value::Bool(true)));
        fake.state().fail_screenshots = true;
        let err = renderer(&fake).render_carousel(&full_data()).await.unwrap_err();

        assert!(matches!(err, RenderError::Browser(_)));
        assert_eq!(fake.state().pages_opened, 1);
        assert_eq!(fake.state().pages_closed, 1);
    }
}
