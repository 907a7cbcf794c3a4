// src/cascade.rs
//! Ordered fallback chains where the first success wins outright.
//!
//! Both the page extractor and the endpoint probe are built on this: a list of
//! strategies tried in fixed priority order, stopping at the first one that
//! yields a result. Results are never merged across strategies.

/// One way of getting an `O` out of an `I`. `None` means "not applicable here,
/// try the next one".
pub trait Strategy<I: ?Sized, O> {
    fn name(&self) -> &str;
    fn attempt(&self, input: &I) -> Option<O>;
}

/// Which strategy won and what it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit<O> {
    pub index: usize,
    pub name: String,
    pub output: O,
}

/// Strategies may borrow (`'a`), so a probe can build a chain over a borrowed
/// transport for one call.
pub struct Cascade<'a, I: ?Sized, O> {
    strategies: Vec<Box<dyn Strategy<I, O> + Send + Sync + 'a>>,
}

impl<I: ?Sized, O> Default for Cascade<'_, I, O> {
    fn default() -> Self {
        Self { strategies: Vec::new() }
    }
}

impl<'a, I: ?Sized, O> Cascade<'a, I, O> {
    pub fn new() -> Self { Self::default() }

    pub fn then(mut self, strategy: impl Strategy<I, O> + Send + Sync + 'a) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn len(&self) -> usize { self.strategies.len() }
    pub fn is_empty(&self) -> bool { self.strategies.is_empty() }

    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Try strategies in order; later ones are not consulted after a hit.
    pub fn run(&self, input: &I) -> Option<Hit<O>> {
        for (index, strategy) in self.strategies.iter().enumerate() {
            match strategy.attempt(input) {
                Some(output) => {
                    log::debug!("cascade: '{}' matched (#{})", strategy.name(), index);
                    return Some(Hit { index, name: strategy.name().to_string(), output });
                }
                None => log::debug!("cascade: '{}' found nothing", strategy.name()),
            }
        }
        None
    }
}
