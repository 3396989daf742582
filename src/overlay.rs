use crate::actions::ActionError;
use crate::backend::DomBackend;
use crate::locator::{Locator, LocatorChain};
use crate::resolver::{ElementResolver, ResolveError};
use crate::wait::WaitPolicy;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// What a dismissal attempt found and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissOutcome {
    /// No overlay became visible within the probe window.
    NothingOpen,
    /// An overlay was visible and is gone now.
    Dismissed,
    /// An overlay is still visible after trying the close controls.
    StillOpen,
}

/// Best-effort closer for the cookie banners, signup modals and other overlays
/// third-party sites put between a test and the page it actually wants.
///
/// Dismissal never fails a test on its own: problems are logged as warnings
/// and reported through [`DismissOutcome`]. Only cancellation propagates as an
/// error.
pub struct OverlayDismisser<'a, D> {
    resolver: ElementResolver<'a, D>,
    overlays: LocatorChain,
    close_buttons: LocatorChain,
    probe_timeout: Duration,
}

impl<'a, D: DomBackend> OverlayDismisser<'a, D> {
    /// A dismisser over the given backend using the built-in selector chains.
    pub fn new(backend: &'a D) -> Self {
        Self {
            resolver: ElementResolver::new(backend),
            overlays: Self::default_overlays(),
            close_buttons: Self::default_close_buttons(),
            probe_timeout: Duration::from_secs(2),
        }
    }

    /// Overlay containers commonly seen in the wild.
    pub fn default_overlays() -> LocatorChain {
        LocatorChain::new(Locator::css("[role='dialog']"))
            .or(Locator::css("div[class*='modal']"))
            .or(Locator::css("div[class*='popup']"))
            .or(Locator::css("div[class*='overlay']"))
            .or(Locator::css("div[class*='lightbox']"))
    }

    /// Close controls commonly found on such overlays.
    pub fn default_close_buttons() -> LocatorChain {
        LocatorChain::new(Locator::css("[aria-label='Close']"))
            .or(Locator::css("button[class*='close']"))
            .or(Locator::css("button[class*='dismiss']"))
            .or(Locator::css("span[class*='close']"))
            .or(Locator::css(".close"))
            .or(Locator::css(".dismiss"))
    }

    /// Replace both selector chains, for sites whose overlays are known.
    #[must_use]
    pub fn with_chains(mut self, overlays: LocatorChain, close_buttons: LocatorChain) -> Self {
        self.overlays = overlays;
        self.close_buttons = close_buttons;
        self
    }

    /// Replace the probe window used for each step of a dismissal.
    ///
    /// # Panics
    /// Panics when `timeout` is zero.
    #[must_use]
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        assert!(!timeout.is_zero(), "probe timeout must be positive");
        self.probe_timeout = timeout;
        self
    }

    /// Attach a cancellation token to the underlying resolver.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.resolver = self.resolver.with_cancellation(token);
        self
    }

    /// Probe for a visible overlay and try to close it.
    pub async fn dismiss(&self) -> Result<DismissOutcome, ResolveError> {
        let probe = WaitPolicy::visible().with_timeout(self.probe_timeout);
        match self.resolver.resolve(&self.overlays, probe).await {
            Ok(found) => {
                tracing::debug!(overlay = %found.locator, "overlay detected");
            }
            Err(ResolveError::ElementNotFound { .. }) => return Ok(DismissOutcome::NothingOpen),
            Err(cancelled @ ResolveError::Cancelled { .. }) => return Err(cancelled),
        }

        let close = WaitPolicy::clickable().with_timeout(self.probe_timeout);
        if let Err(err) = self.resolver.click_with(&self.close_buttons, close).await {
            if let ActionError::Resolve(cancelled @ ResolveError::Cancelled { .. }) = err {
                return Err(cancelled);
            }
            tracing::warn!(error = %err, "failed to click a close control");
            return Ok(DismissOutcome::StillOpen);
        }

        let gone = WaitPolicy::invisible().with_timeout(self.probe_timeout);
        match self.resolver.wait_until(&self.overlays, gone).await {
            Ok(_) => Ok(DismissOutcome::Dismissed),
            Err(ResolveError::ElementNotFound { .. }) => {
                tracing::warn!("overlay still visible after clicking a close control");
                Ok(DismissOutcome::StillOpen)
            }
            Err(cancelled @ ResolveError::Cancelled { .. }) => Err(cancelled),
        }
    }

    /// Keep dismissing until nothing is open or an attempt fails, returning
    /// how many overlays were closed. `max` bounds the number of attempts for
    /// pages that re-open popups as fast as they are closed.
    pub async fn dismiss_all(&self, max: usize) -> Result<usize, ResolveError> {
        let mut closed = 0;
        for _ in 0..max {
            match self.dismiss().await? {
                DismissOutcome::Dismissed => closed += 1,
                DismissOutcome::NothingOpen => break,
                DismissOutcome::StillOpen => {
                    tracing::warn!(closed, "giving up on remaining overlays");
                    break;
                }
            }
        }
        Ok(closed)
    }
}
