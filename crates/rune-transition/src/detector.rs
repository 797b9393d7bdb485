//! Completion detection for class-driven transitions.
//!
//! The `CompletionDetector` watches elements for the end of whatever CSS
//! transition or animation their classes triggered. A watch resolves on the
//! first matching end event fired by the element itself, or, when nothing is
//! running at all, immediately on the next drain so a missing stylesheet
//! rule never hangs a phase.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use tracing::trace;

use crate::host::{CompletionEvent, EndEventKind, TransitionHost};
use crate::types::RunId;

/// Which end events may resolve a watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFilter {
    /// Any `transitionend` or `animationend`.
    #[default]
    AnyEnd,
    /// Only a `transitionend` for a `transform` property; moves use this so
    /// unrelated property transitions do not cut them short.
    Transform,
}

impl EventFilter {
    pub fn accepts<E>(&self, event: &CompletionEvent<E>) -> bool {
        match self {
            Self::AnyEnd => true,
            Self::Transform => {
                event.kind == EndEventKind::TransitionEnd
                    && event
                        .property_name
                        .as_deref()
                        .is_none_or(|p| p.ends_with("transform"))
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Listener {
    run: RunId,
    filter: EventFilter,
}

/// Per-element end-event listeners plus the queue of watches that settled
/// without any event.
#[derive(Debug)]
pub struct CompletionDetector<E> {
    listeners: HashMap<E, Listener>,
    settled: VecDeque<(E, RunId)>,
}

impl<E> Default for CompletionDetector<E> {
    fn default() -> Self {
        Self {
            listeners: HashMap::new(),
            settled: VecDeque::new(),
        }
    }
}

impl<E: Clone + Eq + Hash + std::fmt::Debug> CompletionDetector<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch `element` until its current transition or animation ends.
    ///
    /// Replaces any previous watch on the element.
    pub fn await_settled<H>(&mut self, host: &H, element: &E, run: RunId, filter: EventFilter)
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        self.cancel(element);
        if host.has_running_animation(element) {
            self.listeners
                .insert(element.clone(), Listener { run, filter });
        } else {
            trace!(?element, "nothing running, settling immediately");
            self.settled.push_back((element.clone(), run));
        }
    }

    /// Tear down the watch on `element` so a late event cannot resolve it.
    pub fn cancel(&mut self, element: &E) {
        self.listeners.remove(element);
        self.settled.retain(|(e, _)| e != element);
    }

    /// Match an end event against the listeners.
    ///
    /// Returns the resolved element and run; events bubbling up from
    /// descendants and events for unwatched elements are ignored.
    pub fn resolve(&mut self, event: &CompletionEvent<E>) -> Option<(E, RunId)> {
        if !event.is_own() {
            trace!(target_el = ?event.target, observed = ?event.current_target, "ignoring bubbled end event");
            return None;
        }
        let listener = self.listeners.get(&event.current_target)?;
        if !listener.filter.accepts(event) {
            trace!(element = ?event.current_target, property = ?event.property_name, "end event filtered out");
            return None;
        }
        let listener = self.listeners.remove(&event.current_target)?;
        Some((event.current_target.clone(), listener.run))
    }

    /// Next watch that settled without an event.
    pub fn take_settled(&mut self) -> Option<(E, RunId)> {
        self.settled.pop_front()
    }

    pub fn is_watching(&self, element: &E) -> bool {
        self.listeners.contains_key(element) || self.settled.iter().any(|(e, _)| e == element)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
