//! Lifecycle hooks invoked around enter and exit phases.
//!
//! Hooks are supplied by the controller's caller and are never mutated by
//! the engine. `enter` and `exit` receive a [`DoneToken`]; returning
//! [`Completion::Manual`] makes the engine wait for that token instead of
//! watching for transition-end events.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::types::RunId;

/// How an `enter`/`exit` hook wants its phase to complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Completion {
    /// Wait for the element's own transition or animation to end.
    #[default]
    Auto,
    /// Wait until the hook calls [`DoneToken::done`].
    Manual,
}

/// Explicit completion signal handed to `enter`/`exit` hooks.
///
/// Calling [`done`](Self::done) queues the completion; the owning controller
/// picks it up at the end of the current call, or on the next `flush` when
/// called later from outside a controller call. Tokens of interrupted runs
/// are ignored.
pub struct DoneToken {
    run: RunId,
    queue: DoneQueue,
}

impl DoneToken {
    pub fn run_id(&self) -> RunId {
        self.run
    }

    pub fn done(self) {
        self.queue.push(self.run);
    }
}

impl fmt::Debug for DoneToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DoneToken").field("run", &self.run).finish()
    }
}

/// Shared queue of runs whose hooks signalled `done`.
#[derive(Debug, Clone, Default)]
pub(crate) struct DoneQueue(Rc<RefCell<VecDeque<RunId>>>);

impl DoneQueue {
    pub(crate) fn token(&self, run: RunId) -> DoneToken {
        DoneToken {
            run,
            queue: self.clone(),
        }
    }

    fn push(&self, run: RunId) {
        self.0.borrow_mut().push_back(run);
    }

    pub(crate) fn pop(&self) -> Option<RunId> {
        self.0.borrow_mut().pop_front()
    }
}

/// Callbacks fired while an element moves through its enter/exit phases.
///
/// All methods default to no-ops, so implementors override only what they
/// need. Panics raised by a hook are not caught; the element keeps whatever
/// classes it had at that point.
pub trait TransitionHooks<E> {
    /// Before any enter class is applied.
    fn before_enter(&mut self, _element: &E) {}

    /// Right after `enter` and `enter_active` are applied.
    fn enter(&mut self, _element: &E, _done: DoneToken) -> Completion {
        Completion::Auto
    }

    /// After all enter classes are removed.
    fn after_enter(&mut self, _element: &E) {}

    /// Before any exit class is applied.
    fn before_exit(&mut self, _element: &E) {}

    /// Right after `exit` and `exit_active` are applied.
    fn exit(&mut self, _element: &E, _done: DoneToken) -> Completion {
        Completion::Auto
    }

    /// After all exit classes are removed, before removal is confirmed.
    fn after_exit(&mut self, _element: &E) {}
}

/// No hooks at all.
impl<E> TransitionHooks<E> for () {}

type ElementFn<E> = Box<dyn FnMut(&E)>;
type PhaseFn<E> = Box<dyn FnMut(&E, DoneToken) -> Completion>;

/// Closure-backed hooks, one optional callback per lifecycle point.
pub struct LifecycleHooks<E> {
    before_enter: Option<ElementFn<E>>,
    enter: Option<PhaseFn<E>>,
    after_enter: Option<ElementFn<E>>,
    before_exit: Option<ElementFn<E>>,
    exit: Option<PhaseFn<E>>,
    after_exit: Option<ElementFn<E>>,
}

impl<E> Default for LifecycleHooks<E> {
    fn default() -> Self {
        Self {
            before_enter: None,
            enter: None,
            after_enter: None,
            before_exit: None,
            exit: None,
            after_exit: None,
        }
    }
}

impl<E> LifecycleHooks<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_before_enter(mut self, f: impl FnMut(&E) + 'static) -> Self {
        self.before_enter = Some(Box::new(f));
        self
    }

    pub fn on_enter(mut self, f: impl FnMut(&E, DoneToken) -> Completion + 'static) -> Self {
        self.enter = Some(Box::new(f));
        self
    }

    pub fn on_after_enter(mut self, f: impl FnMut(&E) + 'static) -> Self {
        self.after_enter = Some(Box::new(f));
        self
    }

    pub fn on_before_exit(mut self, f: impl FnMut(&E) + 'static) -> Self {
        self.before_exit = Some(Box::new(f));
        self
    }

    pub fn on_exit(mut self, f: impl FnMut(&E, DoneToken) -> Completion + 'static) -> Self {
        self.exit = Some(Box::new(f));
        self
    }

    pub fn on_after_exit(mut self, f: impl FnMut(&E) + 'static) -> Self {
        self.after_exit = Some(Box::new(f));
        self
    }
}

impl<E> fmt::Debug for LifecycleHooks<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("before_enter", &self.before_enter.is_some())
            .field("enter", &self.enter.is_some())
            .field("after_enter", &self.after_enter.is_some())
            .field("before_exit", &self.before_exit.is_some())
            .field("exit", &self.exit.is_some())
            .field("after_exit", &self.after_exit.is_some())
            .finish()
    }
}

impl<E> TransitionHooks<E> for LifecycleHooks<E> {
    fn before_enter(&mut self, element: &E) {
        if let Some(f) = self.before_enter.as_mut() {
            f(element);
        }
    }

    fn enter(&mut self, element: &E, done: DoneToken) -> Completion {
        match self.enter.as_mut() {
            Some(f) => f(element, done),
            None => Completion::Auto,
        }
    }

    fn after_enter(&mut self, element: &E) {
        if let Some(f) = self.after_enter.as_mut() {
            f(element);
        }
    }

    fn before_exit(&mut self, element: &E) {
        if let Some(f) = self.before_exit.as_mut() {
            f(element);
        }
    }

    fn exit(&mut self, element: &E, done: DoneToken) -> Completion {
        match self.exit.as_mut() {
            Some(f) => f(element, done),
            None => Completion::Auto,
        }
    }

    fn after_exit(&mut self, element: &E) {
        if let Some(f) = self.after_exit.as_mut() {
            f(element);
        }
    }
}
