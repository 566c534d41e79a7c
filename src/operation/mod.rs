//! Poll-based asynchronous operations
//!
//! An [`AsyncOp`] is a handle to a result that may not be available yet.
//! Loads run on a single cooperative thread: callers poll the handle once per
//! tick until it reports [`OpStatus::Done`] or [`OpStatus::Failed`].
//!
//! ## Construction
//!
//! - [`AsyncOp::immediate`], [`AsyncOp::failed`], [`AsyncOp::from_result`]:
//!   already settled
//! - [`AsyncOp::wrap`]: drives a [`NativeOperation`] (any
//!   `FnMut() -> OpStatus<T>` closure is one)
//! - [`AsyncOp::join`], [`AsyncOp::join_all`], [`AsyncOp::map`],
//!   [`AsyncOp::map_err`], [`AsyncOp::and_then`]: composed from other
//!   operations
//!
//! ## Semantics
//!
//! An operation settles exactly once; later polls return the settled value.
//! Clones share the same instance, which is how two requests for the same
//! in-flight resource observe one load ([`AsyncOp::ptr_eq`]).
//!
//! A composed operation settles only after all of its constituents do. The
//! first failing constituent fails it with that error, and the combinator or
//! continuation is never invoked.
//!
//! Cancelling settles a pending operation as `OperationCancelled` on its next
//! poll and drops its driver. Constituents of a composed operation keep their
//! own tokens and are not cancelled with it.

pub mod token;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub use token::CancellationToken;

use crate::error::{AddressableError, Result};

/// Observed state of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpStatus<T> {
    Pending,
    Done(T),
    Failed(AddressableError),
}

impl<T> OpStatus<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, OpStatus::Pending)
    }

    /// `None` while pending, the settled outcome otherwise
    pub fn into_result(self) -> Option<Result<T>> {
        match self {
            OpStatus::Pending => None,
            OpStatus::Done(value) => Some(Ok(value)),
            OpStatus::Failed(err) => Some(Err(err)),
        }
    }
}

impl<T> From<Result<T>> for OpStatus<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => OpStatus::Done(value),
            Err(err) => OpStatus::Failed(err),
        }
    }
}

/// An in-flight engine job that can be polled for progress
pub trait NativeOperation<T> {
    fn poll(&mut self) -> OpStatus<T>;
}

impl<T, F> NativeOperation<T> for F
where
    F: FnMut() -> OpStatus<T>,
{
    fn poll(&mut self) -> OpStatus<T> {
        self()
    }
}

enum State<T> {
    Pending,
    Done(T),
    Failed(AddressableError),
}

struct Inner<T> {
    state: State<T>,
    driver: Option<Box<dyn NativeOperation<T>>>,
    label: String,
}

/// Shared handle to a possibly pending result
pub struct AsyncOp<T> {
    inner: Rc<RefCell<Inner<T>>>,
    token: CancellationToken,
}

impl<T> Clone for AsyncOp<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            token: self.token.clone(),
        }
    }
}

impl<T> fmt::Debug for AsyncOp<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        let state = match inner.state {
            State::Pending => "pending",
            State::Done(_) => "done",
            State::Failed(_) => "failed",
        };
        f.debug_struct("AsyncOp")
            .field("label", &inner.label)
            .field("state", &state)
            .finish()
    }
}

impl<T: Clone + 'static> AsyncOp<T> {
    fn with_state(state: State<T>, driver: Option<Box<dyn NativeOperation<T>>>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                state,
                driver,
                label: String::from("operation"),
            })),
            token: CancellationToken::new(),
        }
    }

    /// An operation that has already succeeded
    pub fn immediate(value: T) -> Self {
        Self::with_state(State::Done(value), None)
    }

    /// An operation that has already failed
    pub fn failed(err: AddressableError) -> Self {
        Self::with_state(State::Failed(err), None)
    }

    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::immediate(value),
            Err(err) => Self::failed(err),
        }
    }

    /// Drive a native primitive until it settles
    pub fn wrap(native: impl NativeOperation<T> + 'static) -> Self {
        Self::with_state(State::Pending, Some(Box::new(native)))
    }

    /// Name the resource this operation produces, used in cancellation errors
    #[must_use]
    pub fn named(self, label: impl Into<String>) -> Self {
        self.inner.borrow_mut().label = label.into();
        self
    }

    pub fn label(&self) -> String {
        self.inner.borrow().label.clone()
    }

    /// Advance the operation and report its state
    pub fn poll(&self) -> OpStatus<T> {
        if let Some(status) = self.settled() {
            return status;
        }
        if self.token.is_cancelled() {
            return self.settle_cancelled();
        }

        // The driver is moved out while it runs so that it may poll other
        // handles sharing this one without a reentrant borrow.
        let driver = self.inner.borrow_mut().driver.take();
        let Some(mut driver) = driver else {
            return OpStatus::Pending;
        };
        let status = driver.poll();

        let mut inner = self.inner.borrow_mut();
        match status {
            OpStatus::Pending => {
                if self.token.is_cancelled() {
                    drop(inner);
                    return self.settle_cancelled();
                }
                inner.driver = Some(driver);
                OpStatus::Pending
            }
            OpStatus::Done(value) => {
                inner.state = State::Done(value.clone());
                OpStatus::Done(value)
            }
            OpStatus::Failed(err) => {
                inner.state = State::Failed(err.clone());
                OpStatus::Failed(err)
            }
        }
    }

    fn settled(&self) -> Option<OpStatus<T>> {
        match &self.inner.borrow().state {
            State::Pending => None,
            State::Done(value) => Some(OpStatus::Done(value.clone())),
            State::Failed(err) => Some(OpStatus::Failed(err.clone())),
        }
    }

    fn settle_cancelled(&self) -> OpStatus<T> {
        let mut inner = self.inner.borrow_mut();
        inner.driver = None;
        let err = AddressableError::OperationCancelled {
            id: inner.label.clone(),
        };
        inner.state = State::Failed(err.clone());
        OpStatus::Failed(err)
    }

    /// Request cancellation; takes effect on the next poll if still pending
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Whether the operation has settled, without driving it
    pub fn is_settled(&self) -> bool {
        !matches!(self.inner.borrow().state, State::Pending)
    }

    /// Whether both handles refer to the same operation instance
    pub fn ptr_eq(&self, other: &AsyncOp<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Combine two operations once both succeed
    pub fn join<U, R, F>(a: AsyncOp<T>, b: AsyncOp<U>, combine: F) -> AsyncOp<R>
    where
        U: Clone + 'static,
        R: Clone + 'static,
        F: FnOnce(T, U) -> R + 'static,
    {
        let mut combine = Some(combine);
        AsyncOp::wrap(move || {
            let left = match a.poll() {
                OpStatus::Failed(err) => return OpStatus::Failed(err),
                status => status,
            };
            let right = match b.poll() {
                OpStatus::Failed(err) => return OpStatus::Failed(err),
                status => status,
            };
            match (left, right) {
                (OpStatus::Done(l), OpStatus::Done(r)) => match combine.take() {
                    Some(f) => OpStatus::Done(f(l, r)),
                    None => OpStatus::Failed(AddressableError::OperationReused),
                },
                _ => OpStatus::Pending,
            }
        })
    }

    /// Collect the results of every operation, in order
    pub fn join_all(ops: Vec<AsyncOp<T>>) -> AsyncOp<Vec<T>> {
        AsyncOp::wrap(move || {
            let mut values = Vec::with_capacity(ops.len());
            let mut pending = false;
            for op in &ops {
                match op.poll() {
                    OpStatus::Done(value) => values.push(value),
                    OpStatus::Pending => pending = true,
                    OpStatus::Failed(err) => return OpStatus::Failed(err),
                }
            }
            if pending {
                OpStatus::Pending
            } else {
                OpStatus::Done(values)
            }
        })
    }

    /// Transform the successful result
    pub fn map<U, F>(self, f: F) -> AsyncOp<U>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> U + 'static,
    {
        let label = self.label();
        let mut f = Some(f);
        AsyncOp::wrap(move || match self.poll() {
            OpStatus::Pending => OpStatus::Pending,
            OpStatus::Failed(err) => OpStatus::Failed(err),
            OpStatus::Done(value) => match f.take() {
                Some(f) => OpStatus::Done(f(value)),
                None => OpStatus::Failed(AddressableError::OperationReused),
            },
        })
        .named(label)
    }

    /// Transform the failure, leaving success untouched
    pub fn map_err<F>(self, f: F) -> AsyncOp<T>
    where
        F: FnOnce(AddressableError) -> AddressableError + 'static,
    {
        let label = self.label();
        let mut f = Some(f);
        AsyncOp::wrap(move || match self.poll() {
            OpStatus::Failed(err) => match f.take() {
                Some(f) => OpStatus::Failed(f(err)),
                None => OpStatus::Failed(AddressableError::OperationReused),
            },
            status => status,
        })
        .named(label)
    }

    /// Chain a dependent operation started from the successful result
    pub fn and_then<U, F>(self, f: F) -> AsyncOp<U>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> AsyncOp<U> + 'static,
    {
        enum Step<T, U, F> {
            First(AsyncOp<T>, Option<F>),
            Second(AsyncOp<U>),
        }

        let label = self.label();
        let mut step: Step<T, U, F> = Step::First(self, Some(f));
        AsyncOp::wrap(move || {
            if let Step::First(first, f) = &mut step {
                match first.poll() {
                    OpStatus::Pending => return OpStatus::Pending,
                    OpStatus::Failed(err) => return OpStatus::Failed(err),
                    OpStatus::Done(value) => match f.take() {
                        Some(f) => step = Step::Second(f(value)),
                        None => return OpStatus::Failed(AddressableError::OperationReused),
                    },
                }
            }
            match &step {
                Step::Second(second) => second.poll(),
                Step::First(..) => OpStatus::Pending,
            }
        })
        .named(label)
    }
}

#[cfg(test)]
mod tests;
