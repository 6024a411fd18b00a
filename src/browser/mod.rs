//! Headless-browser capability.
//!
//! Extraction and rendering only talk to a browser through [`BrowserPage`],
//! so they can run against Chromium ([`ChromiumLauncher`]) or a fake in tests.

mod chromium;
#[cfg(test)]
pub(crate) mod fake;
mod shared;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::error::BrowserError;

pub use chromium::ChromiumLauncher;
pub use shared::{BrowserLease, OpenPage, SharedBrowser};

/// Logical page size plus the device-pixel scale used for screenshots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub scale: f64,
}

impl Canvas {
    /// Width of the exported image in device pixels.
    pub fn pixel_width(&self) -> u32 {
        (f64::from(self.width) * self.scale).round() as u32
    }
}

/// Starts a browser process.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserEngine>, BrowserError>;
}

/// A running browser that hands out isolated pages.
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>, BrowserError>;

    async fn close(&self) -> Result<(), BrowserError>;
}

/// One tab. Callers must [`close`](BrowserPage::close) it when done.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Navigate and wait for the load event.
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// Replace the document with `html`.
    async fn set_content(&self, html: &str) -> Result<(), BrowserError>;

    async fn set_canvas(&self, canvas: Canvas) -> Result<(), BrowserError>;

    /// Evaluate a script, awaiting it if it returns a promise.
    /// `undefined` comes back as [`Value::Null`].
    async fn evaluate(&self, script: &str) -> Result<Value, BrowserError>;

    /// PNG screenshot clipped to the logical canvas rectangle.
    async fn screenshot(&self, canvas: Canvas) -> Result<Vec<u8>, BrowserError>;

    async fn close(&self) -> Result<(), BrowserError>;
}

/// Poll `condition` (a script returning a boolean) until it is true or
/// `timeout` passes. Returns whether the condition was met.
///
/// Script errors count as "not yet"; the page may still be rendering.
pub async fn wait_for(
    page: &dyn BrowserPage,
    condition: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        match page.evaluate(condition).await {
            Ok(Value::Bool(true)) => return true,
            Ok(_) => {}
            Err(BrowserError::Closed) => return false,
            Err(e) => warn!(error = %e, "wait condition failed, retrying"),
        }
        if tokio::time::Instant::now() + poll_interval > deadline {
            return false;
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// Close `page`, logging instead of failing.
pub(crate) async fn close_quietly(page: &dyn BrowserPage) {
    if let Err(e) = page.close().await {
        warn!(error = %e, "failed to close page");
    }
}
