use std::cell::RefCell;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use anyhow::{Result, bail};
use rune_transition::{
    Completion, CompletionEvent, ElementId, HeadlessDom, LifecycleHooks, Transition,
    TransitionGroup, TransitionOptions,
};
use tracing::{debug, info};

pub mod group;
pub mod modes;
pub mod single;

/// Upper bound on frames and event rounds per settle.
const MAX_STEPS: usize = 240;

pub trait Scene {
    fn name(&self) -> &'static str;
    fn run(&mut self) -> Result<()>;
}

/// Hook calls in the order they happened, as `"<hook> <element>"`.
pub type HookLog = Rc<RefCell<Vec<String>>>;

/// Hooks that log every call and append it to `log`.
pub fn recording_hooks(log: &HookLog) -> LifecycleHooks<ElementId> {
    let record = |log: &HookLog, hook: &'static str| {
        let log = log.clone();
        move |el: &ElementId| {
            info!(element = el.0, hook, "lifecycle hook");
            log.borrow_mut().push(format!("{} {}", hook, el.0));
        }
    };
    let on_enter = record(log, "enter");
    let on_exit = record(log, "exit");
    LifecycleHooks::<ElementId>::new()
        .on_before_enter(record(log, "before_enter"))
        .on_enter(move |el, _| {
            on_enter(el);
            Completion::Auto
        })
        .on_after_enter(record(log, "after_enter"))
        .on_before_exit(record(log, "before_exit"))
        .on_exit(move |el, _| {
            on_exit(el);
            Completion::Auto
        })
        .on_after_exit(record(log, "after_exit"))
}

/// A document with stylesheet rules for every class `options` resolves to,
/// so each phase waits for an end event.
pub fn styled_dom(options: &TransitionOptions) -> HeadlessDom {
    let classes = options.resolve_classes();
    let mut dom = HeadlessDom::new();
    for class in classes.enter_active.iter().chain(classes.exit_active.iter()) {
        dom.set_animated(class, "opacity");
    }
    for class in classes.move_.iter() {
        dom.set_animated(class, "transform");
    }
    dom
}

/// Controller surface the settle loop drives.
pub trait Driven {
    fn frame(&mut self, dom: &mut HeadlessDom);
    fn event(&mut self, dom: &mut HeadlessDom, event: &CompletionEvent<ElementId>) -> bool;
    fn busy(&self) -> bool;
}

impl Driven for Transition<ElementId> {
    fn frame(&mut self, dom: &mut HeadlessDom) {
        self.on_frame(dom);
    }

    fn event(&mut self, dom: &mut HeadlessDom, event: &CompletionEvent<ElementId>) -> bool {
        self.on_event(dom, event)
    }

    fn busy(&self) -> bool {
        self.is_transitioning()
    }
}

impl<K: Clone + Eq + Hash + Debug> Driven for TransitionGroup<K, ElementId> {
    fn frame(&mut self, dom: &mut HeadlessDom) {
        self.on_frame(dom);
    }

    fn event(&mut self, dom: &mut HeadlessDom, event: &CompletionEvent<ElementId>) -> bool {
        self.on_event(dom, event)
    }

    fn busy(&self) -> bool {
        self.is_transitioning()
    }
}

/// Deliver frames, then the end events of whatever is running, until the
/// controller has nothing left in flight.
pub fn settle(controller: &mut impl Driven, dom: &mut HeadlessDom) -> Result<()> {
    for _ in 0..MAX_STEPS {
        if dom.next_frame() {
            debug!(frame = dom.frame_count(), "frame");
            controller.frame(dom);
            continue;
        }
        if !controller.busy() {
            return Ok(());
        }
        let events = dom.end_events();
        if events.is_empty() {
            bail!("transitions stalled with nothing running");
        }
        for event in &events {
            controller.event(dom, event);
        }
    }
    bail!("transitions did not settle within {} steps", MAX_STEPS)
}
