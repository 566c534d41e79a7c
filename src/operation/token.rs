//! Cooperative cancellation flag

use std::cell::Cell;
use std::rc::Rc;

/// Shared flag observed by an [`AsyncOp`](super::AsyncOp) on its next poll
///
/// Clones share the flag. Cancelling is sticky.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Rc<Cell<bool>>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}
