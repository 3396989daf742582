use std::fmt::{Display, Formatter};

/// How a [`Locator`]'s selector string is interpreted by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// A CSS selector, e.g. `.job-card`.
    Css,
    /// An XPath expression, e.g. `//article[@data-job-id]`.
    XPath,
    /// An `id` attribute value.
    Id,
    /// A `name` attribute value.
    Name,
    /// A tag name, e.g. `article`.
    Tag,
}

impl Strategy {
    fn prefix(self) -> &'static str {
        match self {
            Strategy::Css => "css",
            Strategy::XPath => "xpath",
            Strategy::Id => "id",
            Strategy::Name => "name",
            Strategy::Tag => "tag",
        }
    }
}

/// One way of finding an element: a strategy plus a selector string.
///
/// Locators are built once, at page-object construction time, and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    strategy: Strategy,
    value: String,
}

impl Locator {
    /// A locator using the given strategy.
    pub fn new(strategy: Strategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    /// A CSS selector locator.
    pub fn css(value: impl Into<String>) -> Self {
        Self::new(Strategy::Css, value)
    }

    /// An XPath locator.
    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, value)
    }

    /// An `id` attribute locator.
    pub fn id(value: impl Into<String>) -> Self {
        Self::new(Strategy::Id, value)
    }

    /// A `name` attribute locator.
    pub fn name(value: impl Into<String>) -> Self {
        Self::new(Strategy::Name, value)
    }

    /// A tag name locator.
    pub fn tag(value: impl Into<String>) -> Self {
        Self::new(Strategy::Tag, value)
    }

    /// The strategy this locator queries with.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// The selector string.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Display for Locator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.strategy.prefix(), self.value)
    }
}

/// An ordered list of fallback locators for one logical element.
///
/// Insertion order is priority order: the first entry that yields a satisfying
/// element wins, even if a later entry would match too. Page objects list their
/// most specific selector first and fall back to progressively more generic
/// ones, which is what keeps them working when the site's markup drifts.
///
/// A chain is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorChain {
    locators: Vec<Locator>,
}

impl LocatorChain {
    /// A chain with a single entry.
    pub fn new(first: Locator) -> Self {
        Self {
            locators: vec![first],
        }
    }

    /// Append a fallback tried after all previous entries.
    #[must_use]
    pub fn or(mut self, next: Locator) -> Self {
        self.locators.push(next);
        self
    }

    /// Entries in priority order.
    pub fn iter(&self) -> std::slice::Iter<'_, Locator> {
        self.locators.iter()
    }
}

impl From<Locator> for LocatorChain {
    fn from(locator: Locator) -> Self {
        Self::new(locator)
    }
}

impl<'a> IntoIterator for &'a LocatorChain {
    type Item = &'a Locator;
    type IntoIter = std::slice::Iter<'a, Locator>;

    fn into_iter(self) -> Self::IntoIter {
        self.locators.iter()
    }
}

impl Display for LocatorChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, locator) in self.locators.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            locator.fmt(f)?;
        }
        Ok(())
    }
}
