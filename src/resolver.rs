use crate::backend::DomBackend;
use crate::locator::{Locator, LocatorChain};
use crate::wait::{Condition, WaitPolicy};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// A resolved element together with the chain entry that produced it.
///
/// The handle is only valid until the next navigation or DOM swap. Do not
/// cache it across page loads; re-resolve instead.
#[derive(Debug, Clone)]
pub struct Resolved<H> {
    /// Driver handle to the matched element.
    pub handle: H,
    /// The locator that matched.
    pub locator: Locator,
    /// Position of the matching locator within its chain.
    pub chain_index: usize,
}

/// Errors raised while resolving a chain.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No chain entry satisfied the wait condition before the timeout. Raised
    /// only once the policy's full timeout has elapsed, never earlier.
    #[error("no locator in [{chain}] satisfied \"{policy}\" (gave up after {elapsed:?})")]
    ElementNotFound {
        /// The chain that was polled.
        chain: LocatorChain,
        /// The policy that governed the wait.
        policy: WaitPolicy,
        /// How long the resolver actually polled.
        elapsed: Duration,
    },

    /// The wait was aborted through the resolver's cancellation token.
    #[error("wait for [{chain}] was cancelled after {elapsed:?}")]
    Cancelled {
        /// The chain that was being polled.
        chain: LocatorChain,
        /// How long the resolver polled before the cancellation.
        elapsed: Duration,
    },
}

enum Tick<H> {
    /// A chain entry satisfied the condition with a concrete element.
    Match(Resolved<H>),
    /// No chain entry produced any element on a clean walk.
    Absent,
    /// Nothing satisfying yet; sleep and retry.
    NotYet,
}

/// Resolves [`LocatorChain`]s against a [`DomBackend`], polling until the
/// policy's condition holds or its timeout elapses.
///
/// Between polls the resolver does nothing but sleep; queries are read-only.
/// A query that fails mid-navigation is treated as "no match this tick" and
/// retried, so a page load racing the poll loop costs a tick, not the wait.
pub struct ElementResolver<'a, D> {
    pub(crate) backend: &'a D,
    cancel: Option<CancellationToken>,
}

impl<'a, D: DomBackend> ElementResolver<'a, D> {
    /// A resolver over the given backend.
    pub fn new(backend: &'a D) -> Self {
        Self {
            backend,
            cancel: None,
        }
    }

    /// Attach a cancellation token.
    ///
    /// A cancelled token aborts any in-flight wait with
    /// [`ResolveError::Cancelled`] instead of running out the full timeout.
    /// Cancellation is observed between polling ticks.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Resolve the first element in chain order satisfying the policy.
    ///
    /// Each tick walks the chain front to back and returns the first entry
    /// whose first matched element satisfies the condition; later entries are
    /// not consulted for that tick. With [`Condition::Invisible`] this only
    /// ever yields a present-but-hidden element; to also accept absence, use
    /// [`wait_until`](Self::wait_until).
    pub async fn resolve(
        &self,
        chain: &LocatorChain,
        policy: WaitPolicy,
    ) -> Result<Resolved<D::Handle>, ResolveError> {
        self.poll_chain(chain, policy, false)
            .await
            .map(|found| found.expect("always an element when absence is not accepted"))
    }

    /// Wait until the policy's condition holds, accepting satisfaction without
    /// an element.
    ///
    /// Returns `Ok(Some(..))` when a concrete element satisfied the condition
    /// and `Ok(None)` when [`Condition::Invisible`] was satisfied because no
    /// chain entry matched anything.
    pub async fn wait_until(
        &self,
        chain: &LocatorChain,
        policy: WaitPolicy,
    ) -> Result<Option<Resolved<D::Handle>>, ResolveError> {
        self.poll_chain(chain, policy, true).await
    }

    async fn poll_chain(
        &self,
        chain: &LocatorChain,
        policy: WaitPolicy,
        absence_satisfies: bool,
    ) -> Result<Option<Resolved<D::Handle>>, ResolveError> {
        let started = Instant::now();
        let deadline = started + policy.timeout;

        loop {
            match self.tick(chain, policy.condition).await {
                Tick::Match(found) => {
                    tracing::debug!(
                        locator = %found.locator,
                        chain_index = found.chain_index,
                        elapsed = ?started.elapsed(),
                        "chain entry matched"
                    );
                    return Ok(Some(found));
                }
                Tick::Absent
                    if absence_satisfies && policy.condition == Condition::Invisible =>
                {
                    return Ok(None);
                }
                Tick::Absent | Tick::NotYet => {}
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(ResolveError::ElementNotFound {
                    chain: chain.clone(),
                    policy,
                    elapsed: started.elapsed(),
                });
            }

            self.nap(policy.poll_interval.min(deadline - now), chain, started)
                .await?;
        }
    }

    /// One walk over the chain. Query or state failures fail soft: the entry
    /// is skipped for this tick and retried on the next one.
    async fn tick(&self, chain: &LocatorChain, condition: Condition) -> Tick<D::Handle> {
        let mut hidden_match: Option<Resolved<D::Handle>> = None;
        let mut found_any = false;
        let mut had_errors = false;

        for (chain_index, locator) in chain.iter().enumerate() {
            let handles = match self.backend.query(locator).await {
                Ok(handles) => handles,
                Err(err) => {
                    tracing::trace!(%locator, error = %err, "query failed, treating as no match");
                    had_errors = true;
                    continue;
                }
            };
            let Some(handle) = handles.into_iter().next() else {
                continue;
            };
            let state = match self.backend.state(&handle).await {
                Ok(state) => state,
                Err(err) => {
                    tracing::trace!(%locator, error = %err, "state read failed, treating as no match");
                    had_errors = true;
                    continue;
                }
            };
            found_any = true;

            if condition == Condition::Invisible {
                if state.visible {
                    return Tick::NotYet;
                }
                if hidden_match.is_none() {
                    hidden_match = Some(Resolved {
                        handle,
                        locator: locator.clone(),
                        chain_index,
                    });
                }
            } else if condition.is_satisfied_by(Some(state)) {
                return Tick::Match(Resolved {
                    handle,
                    locator: locator.clone(),
                    chain_index,
                });
            }
        }

        if let Some(found) = hidden_match {
            return Tick::Match(found);
        }
        // Absence is only trusted on a tick where every query answered.
        if found_any || had_errors {
            Tick::NotYet
        } else {
            Tick::Absent
        }
    }

    async fn nap(
        &self,
        duration: Duration,
        chain: &LocatorChain,
        started: Instant,
    ) -> Result<(), ResolveError> {
        match &self.cancel {
            Some(token) => tokio::select! {
                () = token.cancelled() => Err(ResolveError::Cancelled {
                    chain: chain.clone(),
                    elapsed: started.elapsed(),
                }),
                () = tokio::time::sleep(duration) => Ok(()),
            },
            None => {
                tokio::time::sleep(duration).await;
                Ok(())
            }
        }
    }
}
