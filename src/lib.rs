mod actions;
mod backend;
mod config;
mod locator;
mod overlay;
mod resolver;
#[cfg(feature = "thirtyfour")]
mod session;
mod wait;

/// Common imports.
pub mod prelude {
    pub use crate::actions::ActionError;
    pub use crate::backend::BackendError;
    pub use crate::backend::DomBackend;
    pub use crate::backend::ElementState;
    pub use crate::config::SessionConfig;
    pub use crate::locator::Locator;
    pub use crate::locator::LocatorChain;
    pub use crate::locator::Strategy;
    pub use crate::overlay::DismissOutcome;
    pub use crate::overlay::OverlayDismisser;
    pub use crate::resolver::ElementResolver;
    pub use crate::resolver::ResolveError;
    pub use crate::resolver::Resolved;
    #[cfg(feature = "thirtyfour")]
    pub use crate::session::Session;
    #[cfg(feature = "thirtyfour")]
    pub use crate::session::SessionError;
    pub use crate::wait::Condition;
    pub use crate::wait::WaitPolicy;
    pub use tokio_util::sync::CancellationToken;
}
