//! Single-slot transition controller.
//!
//! `Transition` manages one logical child at a time. When the host swaps
//! that child, the outgoing element exits and the incoming one enters,
//! ordered by the configured [`TransitionMode`]. Exiting elements stay in
//! [`Transition::rendered`] until their exit finishes and the controller
//! confirms their removal.
//!
//! # Usage
//!
//! ```ignore
//! let mut slot = Transition::new(TransitionOptions::named("fade"), ());
//! slot.set_child(&mut dom, Some(a));
//! slot.set_child(&mut dom, Some(b)); // a exits, b enters
//! while dom.next_frame() {
//!     slot.on_frame(&mut dom);
//! }
//! ```

use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use tracing::debug;

use crate::classes::{TransitionClasses, TransitionMode, TransitionOptions};
use crate::engine::TransitionEngine;
use crate::events::TransitionEvent;
use crate::hooks::TransitionHooks;
use crate::host::{CompletionEvent, TransitionHost};
use crate::types::{Phase, TransitionState};

/// Transition controller for a single child slot.
pub struct Transition<E> {
    classes: Rc<TransitionClasses>,
    appear: bool,
    mode: Option<TransitionMode>,
    hooks: Box<dyn TransitionHooks<E>>,
    engine: TransitionEngine<E>,
    mounted: bool,
    /// Latest child requested by the host.
    current: Option<E>,
    /// `outin`: `current` is waiting for the outgoing elements to leave and
    /// is not rendered yet.
    pending: bool,
    /// `inout`: previous children kept until `current` finishes entering.
    held: Vec<E>,
    /// Elements running their exit phase.
    outgoing: Vec<E>,
}

impl<E: Clone + Eq + Hash + Debug> Transition<E> {
    pub fn new(options: TransitionOptions, hooks: impl TransitionHooks<E> + 'static) -> Self {
        Self {
            classes: Rc::new(options.resolve_classes()),
            appear: options.appear,
            mode: options.mode,
            hooks: Box::new(hooks),
            engine: TransitionEngine::new(),
            mounted: false,
            current: None,
            pending: false,
            held: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    pub fn mode(&self) -> Option<TransitionMode> {
        self.mode
    }

    pub fn classes(&self) -> &TransitionClasses {
        &self.classes
    }

    /// Latest child the host asked for, whether or not it has entered yet.
    pub fn child(&self) -> Option<&E> {
        self.current.as_ref()
    }

    /// Elements the host must keep attached, in document order: outgoing
    /// elements first, the current child last.
    pub fn rendered(&self) -> Vec<E> {
        let mut rendered: Vec<E> = self.outgoing.iter().chain(&self.held).cloned().collect();
        if !self.pending {
            rendered.extend(self.current.iter().cloned());
        }
        rendered
    }

    pub fn state(&self, element: &E) -> TransitionState {
        self.engine.state(element)
    }

    /// Whether any element is still mid-transition or waiting to enter.
    pub fn is_transitioning(&self) -> bool {
        self.engine.active_count() > 0 || self.pending
    }

    /// Mount, replace or unmount the slot's child.
    ///
    /// The first call is the initial render: it only enters when `appear`
    /// is set.
    pub fn set_child<H>(&mut self, host: &mut H, child: Option<E>)
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        let first = !self.mounted;
        self.mounted = true;
        if child == self.current {
            return;
        }

        let previous = self.current.take();
        let was_pending = std::mem::take(&mut self.pending);
        self.current = child.clone();

        if first {
            if let Some(next) = &child {
                if self.appear {
                    self.enter(host, next);
                }
            }
            self.process_events(host);
            return;
        }

        match self.mode {
            None => {
                if let Some(prev) = previous {
                    self.exit(host, prev);
                }
                if let Some(next) = &child {
                    self.enter(host, next);
                }
            }
            Some(TransitionMode::OutIn) => {
                match previous {
                    Some(stale) if was_pending => {
                        debug!(element = ?stale, "discarding child that never entered");
                    }
                    Some(prev) => self.exit(host, prev),
                    None => {}
                }
                if let Some(next) = &child {
                    if self.outgoing.iter().any(|e| e != next) {
                        self.pending = true;
                    } else {
                        self.enter(host, next);
                    }
                }
            }
            Some(TransitionMode::InOut) => {
                match (previous, &child) {
                    // Replaced again before it finished entering.
                    (Some(prev), Some(_)) if self.engine.state(&prev) == TransitionState::Entering => {
                        self.exit(host, prev);
                    }
                    (Some(prev), Some(_)) => self.held.push(prev),
                    (Some(prev), None) => {
                        self.release_held(host);
                        self.exit(host, prev);
                    }
                    (None, _) => {}
                }
                if let Some(next) = &child {
                    self.enter(host, next);
                }
            }
        }
        self.process_events(host);
    }

    pub fn on_frame<H>(&mut self, host: &mut H)
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        self.engine.on_frame(host, self.hooks.as_mut());
        self.process_events(host);
    }

    pub fn on_event<H>(&mut self, host: &mut H, event: &CompletionEvent<E>) -> bool
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        let resolved = self.engine.on_event(host, self.hooks.as_mut(), event);
        self.process_events(host);
        resolved
    }

    /// Pick up `done` signals raised outside of a controller call.
    pub fn flush<H>(&mut self, host: &mut H)
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        self.engine.flush(host, self.hooks.as_mut());
        self.process_events(host);
    }

    fn enter<H>(&mut self, host: &mut H, element: &E)
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        // Re-adding an element that is on its way out takes it back.
        self.outgoing.retain(|e| e != element);
        self.held.retain(|e| e != element);
        self.engine
            .run_enter(host, self.hooks.as_mut(), element, &self.classes);
    }

    fn exit<H>(&mut self, host: &mut H, element: E)
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        self.held.retain(|e| e != &element);
        if !self.outgoing.contains(&element) {
            self.outgoing.push(element.clone());
        }
        self.engine
            .run_exit(host, self.hooks.as_mut(), &element, &self.classes);
    }

    fn release_held<H>(&mut self, host: &mut H)
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        for element in std::mem::take(&mut self.held) {
            self.exit(host, element);
        }
    }

    /// React to finished phases until the engine stops producing events.
    fn process_events<H>(&mut self, host: &mut H)
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        while let Some(event) = self.engine.pop_event() {
            let TransitionEvent::Finished { element, phase } = event else {
                continue;
            };
            match phase {
                Phase::Exit => {
                    if let Some(pos) = self.outgoing.iter().position(|e| e == &element) {
                        self.outgoing.remove(pos);
                        host.confirm_removal(&element);
                    }
                    if self.pending && self.outgoing.is_empty() {
                        self.pending = false;
                        if let Some(next) = self.current.clone() {
                            self.enter(host, &next);
                        }
                    }
                }
                Phase::Enter => {
                    if self.mode == Some(TransitionMode::InOut)
                        && self.current.as_ref() == Some(&element)
                    {
                        self.release_held(host);
                    }
                }
                Phase::Move => {}
            }
        }
    }
}

impl<E: Debug> Debug for Transition<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("classes", &self.classes)
            .field("appear", &self.appear)
            .field("mode", &self.mode)
            .field("current", &self.current)
            .field("pending", &self.pending)
            .field("held", &self.held)
            .field("outgoing", &self.outgoing)
            .finish_non_exhaustive()
    }
}
