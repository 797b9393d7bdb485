//! Lifecycle events emitted by the transition engine.
//!
//! The engine pushes an event whenever a phase starts, finishes or is
//! interrupted. Controllers drain the queue after every engine call and
//! sequence modes and removal confirmations from it.
//!
//! # Usage
//!
//! ```ignore
//! engine.on_frame(&mut host, &mut hooks);
//! for event in engine.drain_events() {
//!     if let TransitionEvent::Finished { element, phase: Phase::Exit } = event {
//!         host.confirm_removal(&element);
//!     }
//! }
//! ```

use std::collections::VecDeque;

use crate::types::Phase;

/// A phase changed state on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionEvent<E> {
    /// Start classes were applied.
    Started { element: E, phase: Phase },
    /// Every class of the phase was removed and its "after" hook ran.
    Finished { element: E, phase: Phase },
    /// The phase was cut short by another phase or an explicit cancel; its
    /// "after" hook did not run.
    Interrupted { element: E, phase: Phase },
}

impl<E> TransitionEvent<E> {
    pub fn element(&self) -> &E {
        match self {
            Self::Started { element, .. }
            | Self::Finished { element, .. }
            | Self::Interrupted { element, .. } => element,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            Self::Started { phase, .. }
            | Self::Finished { phase, .. }
            | Self::Interrupted { phase, .. } => *phase,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted { .. })
    }
}

/// Queue for collecting lifecycle events between drains.
#[derive(Debug)]
pub struct EventQueue<E> {
    events: VecDeque<TransitionEvent<E>>,
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self {
            events: VecDeque::new(),
        }
    }
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: TransitionEvent<E>) {
        self.events.push_back(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn pop(&mut self) -> Option<TransitionEvent<E>> {
        self.events.pop_front()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = TransitionEvent<E>> + '_ {
        self.events.drain(..)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl<E: PartialEq> EventQueue<E> {
    /// Events recorded for a specific element.
    pub fn events_for(&self, element: &E) -> Vec<&TransitionEvent<E>> {
        self.events.iter().filter(|e| e.element() == element).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accessors() {
        let event = TransitionEvent::Finished {
            element: 3u32,
            phase: Phase::Exit,
        };
        assert_eq!(*event.element(), 3);
        assert_eq!(event.phase(), Phase::Exit);
        assert!(event.is_finished());
        assert!(!event.is_interrupted());
    }

    #[test]
    fn test_queue_order_and_drain() {
        let mut queue = EventQueue::new();
        assert!(queue.is_empty());

        queue.push(TransitionEvent::Started {
            element: 1u32,
            phase: Phase::Enter,
        });
        queue.push(TransitionEvent::Interrupted {
            element: 1,
            phase: Phase::Enter,
        });
        queue.push(TransitionEvent::Started {
            element: 2,
            phase: Phase::Exit,
        });
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.events_for(&1).len(), 2);

        let first = queue.pop().unwrap();
        assert!(matches!(first, TransitionEvent::Started { element: 1, .. }));

        let rest: Vec<_> = queue.drain().collect();
        assert_eq!(rest.len(), 2);
        assert!(queue.is_empty());
    }
}
