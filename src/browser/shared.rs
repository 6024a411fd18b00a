use std::ops::Deref;
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{info, warn};

use super::{close_quietly, BrowserEngine, BrowserLauncher, BrowserPage};
use crate::error::BrowserError;

type Slot = Option<Box<dyn BrowserEngine>>;

/// A browser launched on first use and reused until [`close`](Self::close).
///
/// Page work happens under a shared [`BrowserLease`]; `close` takes the lock
/// exclusively, so it waits for in-flight leases instead of pulling the
/// browser out from under them. A lease taken after `close` relaunches.
pub struct SharedBrowser {
    name: &'static str,
    launcher: Arc<dyn BrowserLauncher>,
    slot: RwLock<Slot>,
}

impl SharedBrowser {
    pub fn new(name: &'static str, launcher: Arc<dyn BrowserLauncher>) -> Self {
        Self {
            name,
            launcher,
            slot: RwLock::new(None),
        }
    }

    /// Borrow the running browser, launching it if needed.
    pub async fn lease(&self) -> Result<BrowserLease<'_>, BrowserError> {
        {
            let slot = self.slot.read().await;
            if slot.is_some() {
                return Ok(BrowserLease { slot });
            }
        }

        let mut slot = self.slot.write().await;
        if slot.is_none() {
            info!(browser = self.name, "launching browser");
            *slot = Some(self.launcher.launch().await?);
        }
        Ok(BrowserLease {
            slot: slot.downgrade(),
        })
    }

    #[cfg(test)]
    pub(crate) async fn is_running(&self) -> bool {
        self.slot.read().await.is_some()
    }

    /// Shut the browser down. Does nothing if it is not running.
    pub async fn close(&self) -> Result<(), BrowserError> {
        let engine = self.slot.write().await.take();
        match engine {
            Some(engine) => {
                info!(browser = self.name, "closing browser");
                engine.close().await
            }
            None => Ok(()),
        }
    }
}

/// Shared access to a running browser; the browser stays up while this lives.
pub struct BrowserLease<'a> {
    slot: RwLockReadGuard<'a, Slot>,
}

impl BrowserLease<'_> {
    /// Open a fresh page. It is closed when the returned [`OpenPage`] is closed or dropped.
    pub async fn new_page(&self) -> Result<OpenPage, BrowserError> {
        match self.slot.as_deref() {
            Some(engine) => Ok(OpenPage::new(engine.new_page().await?)),
            None => Err(BrowserError::Closed),
        }
    }
}

/// A page that is closed when dropped, even if the request using it was
/// abandoned half way. Call [`close`](Self::close) to close it in place.
pub struct OpenPage {
    page: Arc<dyn BrowserPage>,
    closed: bool,
}

impl OpenPage {
    fn new(page: Box<dyn BrowserPage>) -> Self {
        Self {
            page: Arc::from(page),
            closed: false,
        }
    }

    /// Close the page now, logging instead of failing.
    pub async fn close(mut self) {
        close_quietly(self.page.as_ref()).await;
        self.closed = true;
    }
}

impl Deref for OpenPage {
    type Target = dyn BrowserPage;

    fn deref(&self) -> &Self::Target {
        self.page.as_ref()
    }
}

impl Drop for OpenPage {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let page = Arc::clone(&self.page);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move { close_quietly(page.as_ref()).await });
            }
            Err(_) => warn!("page dropped outside a runtime, leaving it open"),
        }
    }
}
