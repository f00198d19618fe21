/// Ordered, duplicate-free list of command handlers.
///
/// Registration order is precedence: the first handler that reports a command as handled
/// stops the chain.
#[derive(Debug, Clone)]
pub struct Dispatcher<H> {
    handlers: Vec<H>,
}

impl<H> Default for Dispatcher<H> {
    fn default() -> Self {
        Dispatcher {
            handlers: Vec::new(),
        }
    }
}

impl<H: PartialEq + Clone> Dispatcher<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler` unless it is already registered. Returns whether it was added.
    pub fn add(&mut self, handler: H) -> bool {
        if self.handlers.contains(&handler) {
            return false;
        }
        self.handlers.push(handler);
        true
    }

    pub fn remove(&mut self, handler: &H) -> bool {
        match self.handlers.iter().position(|h| h == handler) {
            Some(idx) => {
                self.handlers.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, handler: &H) -> bool {
        self.handlers.contains(handler)
    }

    pub fn handlers(&self) -> &[H] {
        &self.handlers
    }

    /// Offers `command` to each handler in order until `try_handle` returns true.
    /// Returns the handler that took it.
    pub fn execute<F>(&self, command: &str, mut try_handle: F) -> Option<H>
    where
        F: FnMut(&H, &str) -> bool,
    {
        self.handlers
            .iter()
            .find(|h| try_handle(*h, command))
            .cloned()
    }
}
