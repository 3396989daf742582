use crate::locator::Locator;
use thiserror::Error;

/// Snapshot of the element state the wait conditions look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementState {
    /// The element is rendered with non-zero size and not hidden.
    pub visible: bool,
    /// The element is not disabled.
    pub enabled: bool,
}

/// Errors surfaced by a [`DomBackend`] implementation.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The handle refers to an element from before the last navigation or DOM
    /// swap. Re-resolve instead of caching handles across page loads.
    #[error("element handle is stale; re-resolve after navigation")]
    Stale,

    /// A native click could not be delivered because another element covers
    /// the target.
    #[error("click intercepted by an overlaying element")]
    ClickIntercepted,

    /// The document is mid-navigation or otherwise unable to answer queries.
    /// The resolver treats this as "no match this tick" and retries.
    #[error("document cannot answer queries right now: {reason}")]
    DocumentUnavailable {
        /// What the driver reported.
        reason: String,
    },

    /// Anything else the underlying driver reported.
    #[error("driver failure: {reason}")]
    Driver {
        /// What the driver reported.
        reason: String,
    },

    #[cfg(feature = "thirtyfour")]
    #[error("thirtyfour WebDriverError")]
    Thirtyfour {
        #[from]
        source: thirtyfour::error::WebDriverError,
    },
}

/// The narrow driver seam the resolver and the action primitives are written
/// against.
///
/// Implemented by [`Session`](crate::prelude::Session) for a live `thirtyfour`
/// driver (feature `thirtyfour`) and by the in-memory mock document the test
/// suite runs on. All operations are read-only with respect to the document
/// except [`click`](DomBackend::click), [`dispatch_click`](DomBackend::dispatch_click)
/// and [`set_value`](DomBackend::set_value).
#[expect(async_fn_in_trait)]
pub trait DomBackend {
    /// Handle to a single element. Only valid until the next navigation.
    type Handle: Clone;

    /// Load the given absolute url, invalidating all outstanding handles.
    async fn navigate(&self, url: &str) -> Result<(), BackendError>;

    /// All elements currently matching `locator`, in document order.
    async fn query(&self, locator: &Locator) -> Result<Vec<Self::Handle>, BackendError>;

    /// Visibility and enablement of the element.
    async fn state(&self, handle: &Self::Handle) -> Result<ElementState, BackendError>;

    /// The element's rendered text content.
    async fn text(&self, handle: &Self::Handle) -> Result<String, BackendError>;

    /// The value of the named attribute, if set.
    async fn attr(&self, handle: &Self::Handle, name: &str)
    -> Result<Option<String>, BackendError>;

    /// Deliver a native click to the element.
    async fn click(&self, handle: &Self::Handle) -> Result<(), BackendError>;

    /// Dispatch a programmatic click event directly to the element, bypassing
    /// hit testing. Used as the fallback when a native click is intercepted.
    async fn dispatch_click(&self, handle: &Self::Handle) -> Result<(), BackendError>;

    /// Replace the element's current value with `text`, verbatim. No trimming
    /// or escaping happens on the way in.
    async fn set_value(&self, handle: &Self::Handle, text: &str) -> Result<(), BackendError>;
}
