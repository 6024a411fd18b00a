//! In-memory browser used by unit tests.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{BrowserEngine, BrowserLauncher, BrowserPage, Canvas};
use crate::error::BrowserError;

type Responder = dyn Fn(&str) -> Result<Value, BrowserError> + Send + Sync;

#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub launches: usize,
    pub engine_closes: usize,
    pub pages_opened: usize,
    pub pages_closed: usize,
    pub navigations: Vec<String>,
    pub contents: Vec<String>,
    pub canvases: Vec<Canvas>,
    pub scripts: Vec<String>,
    pub screenshots: usize,
    pub hang_navigation: bool,
    pub fail_screenshots: bool,
    pub fail_launch: bool,
}

/// Launcher, engine and page factory sharing one recorded state.
#[derive(Clone)]
pub(crate) struct FakeBrowser {
    state: Arc<Mutex<FakeState>>,
    responder: Arc<Responder>,
}

impl FakeBrowser {
    /// `responder` answers every `evaluate` call.
    pub fn new(
        responder: impl Fn(&str) -> Result<Value, BrowserError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            state: Arc::default(),
            responder: Arc::new(responder),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.state().scripts.clone()
    }

    pub fn page(&self) -> FakePage {
        self.state().pages_opened += 1;
        FakePage {
            browser: self.clone(),
        }
    }
}

#[async_trait]
impl BrowserLauncher for FakeBrowser {
    async fn launch(&self) -> Result<Box<dyn BrowserEngine>, BrowserError> {
        let mut state = self.state();
        if state.fail_launch {
            return Err(BrowserError::Launch("no chrome here".into()));
        }
        state.launches += 1;
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl BrowserEngine for FakeBrowser {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>, BrowserError> {
        Ok(Box::new(self.page()))
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.state().engine_closes += 1;
        Ok(())
    }
}

pub(crate) struct FakePage {
    browser: FakeBrowser,
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let hang = {
            let mut state = self.browser.state();
            state.navigations.push(url.to_string());
            state.hang_navigation
        };
        if hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Ok(())
    }

    async fn set_content(&self, html: &str) -> Result<(), BrowserError> {
        self.browser.state().contents.push(html.to_string());
        Ok(())
    }

    async fn set_canvas(&self, canvas: Canvas) -> Result<(), BrowserError> {
        self.browser.state().canvases.push(canvas);
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value, BrowserError> {
        self.browser.state().scripts.push(script.to_string());
        (self.browser.responder)(script)
    }

    async fn screenshot(&self, canvas: Canvas) -> Result<Vec<u8>, BrowserError> {
        let mut state = self.browser.state();
        if state.fail_screenshots {
            return Err(BrowserError::Protocol("screenshot failed".into()));
        }
        state.screenshots += 1;
        Ok(format!("png:{}x{}:{}", canvas.width, canvas.height, state.screenshots).into_bytes())
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.browser.state().pages_closed += 1;
        Ok(())
    }
}
