use crate::wait::{self, Condition, WaitPolicy};
use std::path::PathBuf;
use std::time::Duration;
use typed_builder::TypedBuilder;

/// Settings for one browser session and the page objects driving it.
///
/// Built explicitly and handed to whoever needs it; there is no global config
/// singleton. Environment overrides come in through
/// [`with_overrides_from`](SessionConfig::with_overrides_from).
#[derive(Debug, Clone, TypedBuilder)]
pub struct SessionConfig {
    /// Base url that relative paths passed to `goto` are resolved against.
    /// Empty means only absolute urls are accepted.
    #[builder(setter(into), default)]
    pub base_url: String,

    /// Timeout for policies built through [`SessionConfig::policy`].
    #[builder(default = wait::DEFAULT_TIMEOUT)]
    pub default_timeout: Duration,

    /// Poll interval for policies built through [`SessionConfig::policy`].
    #[builder(default = wait::DEFAULT_POLL_INTERVAL)]
    pub poll_interval: Duration,

    /// Whether browser sessions run headless.
    #[builder(default = true)]
    pub headless: bool,

    /// Where failure screenshots are written.
    #[builder(setter(into), default = PathBuf::from("screenshots"))]
    pub screenshot_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SessionConfig {
    /// Defaults overridden from the process environment.
    ///
    /// Recognized variables: `UITEST_BASE_URL`, `UITEST_TIMEOUT_MS`,
    /// `UITEST_POLL_INTERVAL_MS`, `UITEST_HEADLESS`, `UITEST_SCREENSHOT_DIR`.
    pub fn from_env() -> Self {
        Self::default().with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an opaque key/value lookup.
    ///
    /// Values that do not parse are logged and skipped, keeping the previous
    /// setting.
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("UITEST_BASE_URL") {
            self.base_url = url;
        }
        if let Some(raw) = lookup("UITEST_TIMEOUT_MS") {
            match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => self.default_timeout = Duration::from_millis(ms),
                _ => tracing::warn!(%raw, "ignoring invalid UITEST_TIMEOUT_MS"),
            }
        }
        if let Some(raw) = lookup("UITEST_POLL_INTERVAL_MS") {
            match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => self.poll_interval = Duration::from_millis(ms),
                _ => tracing::warn!(%raw, "ignoring invalid UITEST_POLL_INTERVAL_MS"),
            }
        }
        if let Some(raw) = lookup("UITEST_HEADLESS") {
            match raw.parse::<bool>() {
                Ok(headless) => self.headless = headless,
                Err(_) => tracing::warn!(%raw, "ignoring invalid UITEST_HEADLESS"),
            }
        }
        if let Some(dir) = lookup("UITEST_SCREENSHOT_DIR") {
            self.screenshot_dir = dir.into();
        }
        self
    }

    /// Wait policy for `condition` with this config's timeout and poll
    /// interval.
    pub fn policy(&self, condition: Condition) -> WaitPolicy {
        WaitPolicy::new(condition)
            .with_timeout(self.default_timeout)
            .with_poll_interval(self.poll_interval)
    }
}
