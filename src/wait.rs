use crate::backend::ElementState;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Timeout used when a policy does not override it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Poll interval used when a policy does not override it.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// The state an element has to reach for a wait to succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// The element exists in the document tree, visible or not.
    Present,
    /// The element exists and is rendered (non-zero size, not hidden).
    Visible,
    /// The element is visible and enabled. Whether something overlaps it is
    /// not checked here; an overlapped element surfaces as an intercepted
    /// click instead.
    Clickable,
    /// The element is absent, or present but not visible.
    Invisible,
}

impl Condition {
    /// Evaluate this condition against a queried element's state.
    ///
    /// `None` means no element matched the locator at all. This is a pure
    /// predicate; the polling loop lives in the resolver.
    pub fn is_satisfied_by(self, state: Option<ElementState>) -> bool {
        match self {
            Condition::Present => state.is_some(),
            Condition::Visible => state.is_some_and(|s| s.visible),
            Condition::Clickable => state.is_some_and(|s| s.visible && s.enabled),
            Condition::Invisible => state.is_none_or(|s| !s.visible),
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Condition::Present => "present",
            Condition::Visible => "visible",
            Condition::Clickable => "clickable",
            Condition::Invisible => "invisible",
        })
    }
}

/// How long and how often to poll, and what to poll for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Total time budget for the wait. Always positive.
    pub timeout: Duration,
    /// Pause between polling ticks. Always positive.
    pub poll_interval: Duration,
    /// The state polled for.
    pub condition: Condition,
}

impl WaitPolicy {
    /// A policy for `condition` with the default timeout and poll interval.
    pub fn new(condition: Condition) -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            condition,
        }
    }

    /// Wait until a chain entry is present in the DOM.
    pub fn present() -> Self {
        Self::new(Condition::Present)
    }

    /// Wait until a chain entry is visible.
    pub fn visible() -> Self {
        Self::new(Condition::Visible)
    }

    /// Wait until a chain entry is visible and enabled.
    pub fn clickable() -> Self {
        Self::new(Condition::Clickable)
    }

    /// Wait until no chain entry shows a visible element.
    pub fn invisible() -> Self {
        Self::new(Condition::Invisible)
    }

    /// Replace the timeout.
    ///
    /// # Panics
    /// Panics when `timeout` is zero.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        assert!(!timeout.is_zero(), "wait timeout must be positive");
        self.timeout = timeout;
        self
    }

    /// Replace the poll interval.
    ///
    /// # Panics
    /// Panics when `poll_interval` is zero.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        assert!(!poll_interval.is_zero(), "poll interval must be positive");
        self.poll_interval = poll_interval;
        self
    }
}

impl Display for WaitPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} within {:?}, polling every {:?}",
            self.condition, self.timeout, self.poll_interval
        )
    }
}
