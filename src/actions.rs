use crate::backend::{BackendError, DomBackend};
use crate::locator::{Locator, LocatorChain};
use crate::resolver::{ElementResolver, ResolveError};
use crate::wait::WaitPolicy;
use thiserror::Error;

/// Errors raised by the action primitives.
///
/// All variants are terminal for the call that raised them: a failed action is
/// not retried, only the initial resolution polls.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The element never resolved.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The element resolved, but the action on it failed. For clicks this is
    /// only raised after the programmatic dispatch fallback failed as well.
    #[error("{action} on {locator} failed: {source}")]
    ActionFailed {
        /// Which primitive failed.
        action: &'static str,
        /// The locator the element was resolved through.
        locator: Locator,
        #[source]
        source: BackendError,
    },

    /// The resolved handle outlived a navigation. Re-resolve and retry at the
    /// call site if the navigation was expected.
    #[error("{action} on {locator} hit a stale handle; re-resolve after navigating")]
    StaleResolution {
        /// Which primitive hit the stale handle.
        action: &'static str,
        /// The locator the element was resolved through.
        locator: Locator,
    },
}

impl ActionError {
    fn from_backend(action: &'static str, locator: &Locator, err: BackendError) -> Self {
        match err {
            BackendError::Stale => Self::StaleResolution {
                action,
                locator: locator.clone(),
            },
            other => Self::ActionFailed {
                action,
                locator: locator.clone(),
                source: other,
            },
        }
    }
}

/// Action primitives. Each resolves the chain with a policy fitting the
/// action, then performs exactly one operation on the resolved element.
impl<D: DomBackend> ElementResolver<'_, D> {
    /// Click the first clickable element the chain yields.
    pub async fn click(&self, chain: &LocatorChain) -> Result<(), ActionError> {
        self.click_with(chain, WaitPolicy::clickable()).await
    }

    /// [`click`](Self::click) with an explicit wait policy.
    ///
    /// When the native click fails (typically intercepted by an overlay), one
    /// programmatic click dispatch is attempted as recovery; that fallback is
    /// logged, and a second failure surfaces as
    /// [`ActionError::ActionFailed`].
    pub async fn click_with(
        &self,
        chain: &LocatorChain,
        policy: WaitPolicy,
    ) -> Result<(), ActionError> {
        let found = self.resolve(chain, policy).await?;
        match self.backend.click(&found.handle).await {
            Ok(()) => Ok(()),
            Err(BackendError::Stale) => Err(ActionError::StaleResolution {
                action: "click",
                locator: found.locator,
            }),
            Err(native) => {
                tracing::warn!(
                    locator = %found.locator,
                    error = %native,
                    "native click failed, falling back to programmatic dispatch"
                );
                self.backend
                    .dispatch_click(&found.handle)
                    .await
                    .map_err(|err| ActionError::from_backend("click", &found.locator, err))
            }
        }
    }

    /// Type `text` into the first visible element the chain yields, replacing
    /// whatever the field currently holds. The text goes in verbatim.
    pub async fn type_text(&self, chain: &LocatorChain, text: &str) -> Result<(), ActionError> {
        self.type_text_with(chain, WaitPolicy::visible(), text).await
    }

    /// [`type_text`](Self::type_text) with an explicit wait policy.
    pub async fn type_text_with(
        &self,
        chain: &LocatorChain,
        policy: WaitPolicy,
        text: &str,
    ) -> Result<(), ActionError> {
        let found = self.resolve(chain, policy).await?;
        self.backend
            .set_value(&found.handle, text)
            .await
            .map_err(|err| ActionError::from_backend("type", &found.locator, err))
    }

    /// Rendered text of the first visible element the chain yields.
    pub async fn text(&self, chain: &LocatorChain) -> Result<String, ActionError> {
        self.text_with(chain, WaitPolicy::visible()).await
    }

    /// [`text`](Self::text) with an explicit wait policy.
    pub async fn text_with(
        &self,
        chain: &LocatorChain,
        policy: WaitPolicy,
    ) -> Result<String, ActionError> {
        let found = self.resolve(chain, policy).await?;
        self.backend
            .text(&found.handle)
            .await
            .map_err(|err| ActionError::from_backend("read", &found.locator, err))
    }

    /// Value of the named attribute on the first present element the chain
    /// yields.
    pub async fn attr(
        &self,
        chain: &LocatorChain,
        name: &str,
    ) -> Result<Option<String>, ActionError> {
        let found = self.resolve(chain, WaitPolicy::present()).await?;
        self.backend
            .attr(&found.handle, name)
            .await
            .map_err(|err| ActionError::from_backend("read", &found.locator, err))
    }
}
