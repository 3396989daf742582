use locator_chain::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Handle into the mock document. Invalidated by navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockHandle {
    index: usize,
    epoch: u64,
}

/// One scriptable element of the mock document.
#[derive(Debug, Clone)]
pub struct MockElement {
    selectors: Vec<String>,
    visible: bool,
    enabled: bool,
    removed: bool,
    text: String,
    attrs: HashMap<String, String>,
    appears_after: Option<Duration>,
    intercept_clicks: u32,
    fail_dispatch: bool,
    stale_on_click: bool,
    hides_on_click: Option<String>,
    clicks: u32,
}

impl MockElement {
    pub fn new(selector: &str) -> Self {
        Self {
            selectors: vec![selector.to_string()],
            visible: true,
            enabled: true,
            removed: false,
            text: String::new(),
            attrs: HashMap::new(),
            appears_after: None,
            intercept_clicks: 0,
            fail_dispatch: false,
            stale_on_click: false,
            hides_on_click: None,
            clicks: 0,
        }
    }

    /// Also answer to an additional selector.
    pub fn also_matching(mut self, selector: &str) -> Self {
        self.selectors.push(selector.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    /// Only show up in queries after `delay` has passed since the document was
    /// created.
    pub fn appearing_after(mut self, delay: Duration) -> Self {
        self.appears_after = Some(delay);
        self
    }

    /// Intercept the next `count` native clicks. Programmatic dispatch is not
    /// affected.
    pub fn intercepting_clicks(mut self, count: u32) -> Self {
        self.intercept_clicks = count;
        self
    }

    /// Fail programmatic click dispatch too.
    pub fn failing_dispatch(mut self) -> Self {
        self.fail_dispatch = true;
        self
    }

    /// Report the handle as stale when natively clicked, simulating a
    /// navigation racing the action.
    pub fn going_stale_on_click(mut self) -> Self {
        self.stale_on_click = true;
        self
    }

    /// Hide every element matching `selector` when this one is clicked.
    pub fn hiding_on_click(mut self, selector: &str) -> Self {
        self.hides_on_click = Some(selector.to_string());
        self
    }

    fn matches(&self, value: &str) -> bool {
        self.selectors.iter().any(|s| s == value)
    }
}

#[derive(Debug, Default)]
struct DomState {
    elements: Vec<MockElement>,
    epoch: u64,
    outage_until: Option<Instant>,
    visited: Vec<String>,
}

/// In-memory document standing in for a live browser. Clones share state.
#[derive(Debug, Clone)]
pub struct MockDom {
    state: Arc<Mutex<DomState>>,
    started: Instant,
}

impl MockDom {
    pub fn new() -> Self {
        Self {
            state: Arc::default(),
            started: Instant::now(),
        }
    }

    /// Builder-style element registration.
    pub fn with(self, element: MockElement) -> Self {
        self.add(element);
        self
    }

    pub fn add(&self, element: MockElement) {
        self.state.lock().unwrap().elements.push(element);
    }

    /// Make the document refuse queries for the next `window`, as during a
    /// page load.
    pub fn outage_for(&self, window: Duration) {
        self.state.lock().unwrap().outage_until = Some(Instant::now() + window);
    }

    pub fn reveal(&self, selector: &str) {
        self.set_visibility(selector, true);
    }

    pub fn hide(&self, selector: &str) {
        self.set_visibility(selector, false);
    }

    fn set_visibility(&self, selector: &str, visible: bool) {
        let mut state = self.state.lock().unwrap();
        for element in state.elements.iter_mut().filter(|e| e.matches(selector)) {
            element.visible = visible;
        }
    }

    pub fn remove(&self, selector: &str) {
        let mut state = self.state.lock().unwrap();
        for element in state.elements.iter_mut().filter(|e| e.matches(selector)) {
            element.removed = true;
        }
    }

    /// Total native + dispatched clicks observed on elements matching
    /// `selector`.
    pub fn clicks(&self, selector: &str) -> u32 {
        let state = self.state.lock().unwrap();
        state
            .elements
            .iter()
            .filter(|e| e.matches(selector))
            .map(|e| e.clicks)
            .sum()
    }

    /// Current `value` attribute of the first element matching `selector`.
    pub fn value_of(&self, selector: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .elements
            .iter()
            .find(|e| e.matches(selector))
            .and_then(|e| e.attrs.get("value").cloned())
    }

    /// Urls passed to `navigate`, in order.
    pub fn visited(&self) -> Vec<String> {
        self.state.lock().unwrap().visited.clone()
    }

    fn element_op<T>(
        &self,
        handle: &MockHandle,
        op: impl FnOnce(&mut DomState, usize) -> Result<T, BackendError>,
    ) -> Result<T, BackendError> {
        let mut state = self.state.lock().unwrap();
        if handle.epoch != state.epoch || state.elements[handle.index].removed {
            return Err(BackendError::Stale);
        }
        op(&mut state, handle.index)
    }
}

impl Default for MockDom {
    fn default() -> Self {
        Self::new()
    }
}

impl DomBackend for MockDom {
    type Handle = MockHandle;

    async fn navigate(&self, url: &str) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        state.epoch += 1;
        state.visited.push(url.to_string());
        Ok(())
    }

    async fn query(&self, locator: &Locator) -> Result<Vec<Self::Handle>, BackendError> {
        let state = self.state.lock().unwrap();
        if let Some(until) = state.outage_until {
            if Instant::now() < until {
                return Err(BackendError::DocumentUnavailable {
                    reason: "page load in progress".to_string(),
                });
            }
        }
        let now = Instant::now();
        let epoch = state.epoch;
        Ok(state
            .elements
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.removed)
            .filter(|(_, e)| {
                e.appears_after
                    .is_none_or(|delay| now >= self.started + delay)
            })
            .filter(|(_, e)| e.matches(locator.value()))
            .map(|(index, _)| MockHandle { index, epoch })
            .collect())
    }

    async fn state(&self, handle: &Self::Handle) -> Result<ElementState, BackendError> {
        self.element_op(handle, |state, index| {
            let element = &state.elements[index];
            Ok(ElementState {
                visible: element.visible,
                enabled: element.enabled,
            })
        })
    }

    async fn text(&self, handle: &Self::Handle) -> Result<String, BackendError> {
        self.element_op(handle, |state, index| Ok(state.elements[index].text.clone()))
    }

    async fn attr(
        &self,
        handle: &Self::Handle,
        name: &str,
    ) -> Result<Option<String>, BackendError> {
        self.element_op(handle, |state, index| {
            Ok(state.elements[index].attrs.get(name).cloned())
        })
    }

    async fn click(&self, handle: &Self::Handle) -> Result<(), BackendError> {
        self.element_op(handle, |state, index| {
            let element = &mut state.elements[index];
            if element.stale_on_click {
                return Err(BackendError::Stale);
            }
            if !element.visible || !element.enabled {
                return Err(BackendError::Driver {
                    reason: "element not interactable".to_string(),
                });
            }
            if element.intercept_clicks > 0 {
                element.intercept_clicks -= 1;
                return Err(BackendError::ClickIntercepted);
            }
            element.clicks += 1;
            let hides = element.hides_on_click.clone();
            if let Some(selector) = hides {
                for target in state.elements.iter_mut().filter(|e| e.matches(&selector)) {
                    target.visible = false;
                }
            }
            Ok(())
        })
    }

    async fn dispatch_click(&self, handle: &Self::Handle) -> Result<(), BackendError> {
        self.element_op(handle, |state, index| {
            let element = &mut state.elements[index];
            if element.fail_dispatch {
                return Err(BackendError::Driver {
                    reason: "script click rejected".to_string(),
                });
            }
            element.clicks += 1;
            let hides = element.hides_on_click.clone();
            if let Some(selector) = hides {
                for target in state.elements.iter_mut().filter(|e| e.matches(&selector)) {
                    target.visible = false;
                }
            }
            Ok(())
        })
    }

    async fn set_value(&self, handle: &Self::Handle, text: &str) -> Result<(), BackendError> {
        self.element_op(handle, |state, index| {
            state.elements[index]
                .attrs
                .insert("value".to_string(), text.to_string());
            Ok(())
        })
    }
}
