use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, Viewport};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use super::{BrowserEngine, BrowserLauncher, BrowserPage, Canvas};
use crate::config::BrowserSettings;
use crate::error::BrowserError;

/// Launches a local Chromium through the DevTools protocol.
#[derive(Debug, Clone, Default)]
pub struct ChromiumLauncher {
    settings: BrowserSettings,
}

impl ChromiumLauncher {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    fn config(&self) -> Result<BrowserConfig, BrowserError> {
        let mut builder = BrowserConfig::builder()
            .launch_timeout(Duration::from_secs(self.settings.launch_timeout_secs))
            .viewport(None)
            .args(self.settings.args.clone());
        if !self.settings.headless {
            builder = builder.with_head();
        }
        if !self.settings.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &self.settings.executable {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(BrowserError::Launch)
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    #[instrument(skip(self))]
    async fn launch(&self) -> Result<Box<dyn BrowserEngine>, BrowserError> {
        let (browser, mut handler) = Browser::launch(self.config()?)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        // The handler stream drives every DevTools message; it ends when the
        // browser goes away.
        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "browser event loop error");
                }
            }
        });

        info!(headless = self.settings.headless, "launched chromium");
        Ok(Box::new(ChromiumEngine {
            browser: Mutex::new(browser),
            events: Mutex::new(Some(events)),
        }))
    }
}

struct ChromiumEngine {
    browser: Mutex<Browser>,
    events: Mutex<Option<JoinHandle<()>>>,
}

#[async_trait]
impl BrowserEngine for ChromiumEngine {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>, BrowserError> {
        let page = self.browser.lock().await.new_page("about:blank").await?;
        Ok(Box::new(ChromiumPage { page }))
    }

    async fn close(&self) -> Result<(), BrowserError> {
        let mut browser = self.browser.lock().await;
        browser.close().await?;
        browser.wait().await.map_err(|e| BrowserError::Protocol(e.to_string()))?;
        if let Some(events) = self.events.lock().await.take() {
            events.abort();
        }
        info!("closed chromium");
        Ok(())
    }
}

struct ChromiumPage {
    page: Page,
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn set_content(&self, html: &str) -> Result<(), BrowserError> {
        self.page.set_content(html).await?;
        Ok(())
    }

    async fn set_canvas(&self, canvas: Canvas) -> Result<(), BrowserError> {
        let params = SetDeviceMetricsOverrideParams::new(
            i64::from(canvas.width),
            i64::from(canvas.height),
            canvas.scale,
            false,
        );
        self.page.execute(params).await?;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value, BrowserError> {
        let params = EvaluateParams::builder()
            .expression(script)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(BrowserError::Protocol)?;
        let result = self.page.evaluate_expression(params).await?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn screenshot(&self, canvas: Canvas) -> Result<Vec<u8>, BrowserError> {
        let clip = Viewport {
            x: 0.0,
            y: 0.0,
            width: f64::from(canvas.width),
            height: f64::from(canvas.height),
            scale: 1.0,
        };
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .clip(clip)
            .build();
        Ok(self.page.screenshot(params).await?)
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.page.clone().close().await?;
        Ok(())
    }
}
