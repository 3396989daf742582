use crate::actions::ActionError;
use crate::backend::{BackendError, DomBackend, ElementState};
use crate::config::SessionConfig;
use crate::locator::{Locator, Strategy};
use crate::resolver::{ElementResolver, ResolveError};
use std::path::PathBuf;
use thirtyfour::error::{WebDriverError, WebDriverErrorInner};
use thirtyfour::{By, ChromeCapabilities, ChromiumLikeCapabilities, WebDriver, WebElement};
use thiserror::Error;

/// A live browser session: a `thirtyfour` WebDriver plus the suite config.
///
/// This has a `Deref` impl to [`thirtyfour::WebDriver`], so the full driver
/// API stays reachable for whatever the narrow backend seam does not cover.
#[derive(Debug)]
pub struct Session {
    pub(crate) driver: WebDriver,
    config: SessionConfig,
}

/// Errors surfaced by a [`Session`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The test body panicked.
    #[error("The test body panicked:\n{reason}")]
    Panic {
        /// Formatted panic payload.
        reason: String,
    },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Action(#[from] ActionError),

    /// The screenshot file or its directory could not be written.
    #[error("failed to store screenshot")]
    Screenshot {
        #[source]
        source: std::io::Error,
    },

    #[error("thirtyfour WebDriverError")]
    Thirtyfour {
        #[from]
        source: WebDriverError,
    },
}

impl Session {
    /// Connect to a running WebDriver endpoint, e.g. a local chromedriver.
    pub async fn connect(server_url: &str, config: SessionConfig) -> Result<Self, SessionError> {
        let mut caps = ChromeCapabilities::new();
        if config.headless {
            caps.set_headless()?;
        }
        let driver = WebDriver::new(server_url, caps).await?;
        Ok(Self { driver, config })
    }

    /// The config this session was created with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// A resolver over this session.
    pub fn resolver(&self) -> ElementResolver<'_, Self> {
        ElementResolver::new(self)
    }

    /// Navigate to `target`. Relative paths are resolved against the
    /// configured base url.
    pub async fn goto(&self, target: &str) -> Result<(), SessionError> {
        let url = if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else {
            format!(
                "{}/{}",
                self.config.base_url.trim_end_matches('/'),
                target.trim_start_matches('/')
            )
        };
        tracing::debug!(%url, "navigating");
        self.driver.goto(url).await?;
        Ok(())
    }

    /// Store a screenshot of the current viewport under the configured
    /// directory, returning the file path.
    pub async fn screenshot(&self, name: &str) -> Result<PathBuf, SessionError> {
        tokio::fs::create_dir_all(&self.config.screenshot_dir)
            .await
            .map_err(|source| SessionError::Screenshot { source })?;
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = self
            .config
            .screenshot_dir
            .join(format!("{name}_{timestamp}.png"));
        self.driver.screenshot(&path).await?;
        tracing::info!(path = %path.display(), "screenshot stored");
        Ok(path)
    }

    /// End the session, closing the browser window.
    pub async fn quit(self) -> Result<(), SessionError> {
        self.driver.quit().await.map_err(Into::into)
    }

    /// Run a test body against this session, then clean up.
    ///
    /// When the body fails or panics, a screenshot named after `name` is
    /// captured first. The driver is quit no matter what happened.
    pub async fn run(
        self,
        name: &str,
        f: impl AsyncFnOnce(&Session) -> Result<(), SessionError>,
    ) -> Result<(), SessionError> {
        use futures::FutureExt;

        let maybe_panicked = core::panic::AssertUnwindSafe(f(&self)).catch_unwind().await;

        let result = match maybe_panicked {
            Ok(result) => result,
            Err(panic) => Err(SessionError::Panic {
                reason: format!("{panic:?}"),
            }),
        };

        if let Err(err) = &result {
            tracing::warn!(error = %err, "test body failed, capturing screenshot");
            if let Err(screenshot_err) = self.screenshot(name).await {
                tracing::warn!(error = %screenshot_err, "screenshot capture failed");
            }
        }

        // No matter what happened, clean up the session!
        self.quit().await?;

        result
    }
}

impl std::ops::Deref for Session {
    type Target = WebDriver;

    fn deref(&self) -> &Self::Target {
        &self.driver
    }
}

fn by(locator: &Locator) -> By {
    match locator.strategy() {
        Strategy::Css => By::Css(locator.value()),
        Strategy::XPath => By::XPath(locator.value()),
        Strategy::Id => By::Id(locator.value()),
        Strategy::Name => By::Name(locator.value()),
        Strategy::Tag => By::Tag(locator.value()),
    }
}

fn map_webdriver_err(err: WebDriverError) -> BackendError {
    match err.into_inner() {
        WebDriverErrorInner::StaleElementReference(_) => BackendError::Stale,
        WebDriverErrorInner::ElementClickIntercepted(_) => BackendError::ClickIntercepted,
        other => BackendError::Thirtyfour {
            source: other.into(),
        },
    }
}

impl DomBackend for Session {
    type Handle = WebElement;

    async fn navigate(&self, url: &str) -> Result<(), BackendError> {
        self.driver.goto(url).await.map_err(map_webdriver_err)
    }

    async fn query(&self, locator: &Locator) -> Result<Vec<Self::Handle>, BackendError> {
        self.driver
            .find_all(by(locator))
            .await
            .map_err(map_webdriver_err)
    }

    async fn state(&self, handle: &Self::Handle) -> Result<ElementState, BackendError> {
        let visible = handle.is_displayed().await.map_err(map_webdriver_err)?;
        let enabled = handle.is_enabled().await.map_err(map_webdriver_err)?;
        Ok(ElementState { visible, enabled })
    }

    async fn text(&self, handle: &Self::Handle) -> Result<String, BackendError> {
        handle.text().await.map_err(map_webdriver_err)
    }

    async fn attr(
        &self,
        handle: &Self::Handle,
        name: &str,
    ) -> Result<Option<String>, BackendError> {
        handle.attr(name).await.map_err(map_webdriver_err)
    }

    async fn click(&self, handle: &Self::Handle) -> Result<(), BackendError> {
        handle.click().await.map_err(map_webdriver_err)
    }

    async fn dispatch_click(&self, handle: &Self::Handle) -> Result<(), BackendError> {
        let arg: serde_json::Value = handle.to_json().map_err(map_webdriver_err)?;
        self.driver
            .execute("arguments[0].click();", vec![arg])
            .await
            .map_err(map_webdriver_err)?;
        Ok(())
    }

    async fn set_value(&self, handle: &Self::Handle, text: &str) -> Result<(), BackendError> {
        handle.clear().await.map_err(map_webdriver_err)?;
        handle.send_keys(text).await.map_err(map_webdriver_err)
    }
}
