//! Transition lifecycle engine shared by the single and group controllers.
//!
//! The `TransitionEngine` drives elements through class-based phases:
//! - **Enter**: `enter` + `enter_active` and the `enter` hook, next frame
//!   `enter` → `enter_to`, completion strips `enter_active` + `enter_to`
//! - **Exit**: the same sequence with the exit classes
//! - **Move**: inverse translate now, next frame `move` class and cleared
//!   translate, completion strips `move`
//!
//! There is no timer. The owning controller forwards animation frames,
//! end events and `flush` calls; each of those drains the microtask queue
//! (immediate detector resolutions and explicit `done` signals) before it
//! returns.
//!
//! # Architecture
//!
//! ```text
//! TransitionEngine
//!   ├── runs         (element → active phase, one per element)
//!   ├── detector     (end-event listeners + settled queue)
//!   ├── done queue   (explicit DoneToken signals)
//!   └── event queue  (Started / Finished / Interrupted)
//! ```

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::classes::{ClassList, TransitionClasses};
use crate::detector::{CompletionDetector, EventFilter};
use crate::events::{EventQueue, TransitionEvent};
use crate::hooks::{Completion, DoneQueue, TransitionHooks};
use crate::host::{CompletionEvent, TransitionHost};
use crate::types::{Offset, Phase, RunId, TransitionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Start classes applied, waiting for the next frame.
    Starting,
    /// `to` classes applied, waiting for completion.
    Running,
}

#[derive(Debug)]
struct ActiveRun {
    id: RunId,
    phase: Phase,
    stage: Stage,
    completion: Completion,
    classes: Rc<TransitionClasses>,
}

/// Drives enter, exit and move phases for any number of elements.
///
/// Only the run currently registered for an element may touch that
/// element's classes; starting a new phase interrupts the old one first.
#[derive(Debug)]
pub struct TransitionEngine<E> {
    runs: HashMap<E, ActiveRun>,
    detector: CompletionDetector<E>,
    done: DoneQueue,
    events: EventQueue<E>,
}

impl<E> Default for TransitionEngine<E> {
    fn default() -> Self {
        Self {
            runs: HashMap::new(),
            detector: CompletionDetector::default(),
            done: DoneQueue::default(),
            events: EventQueue::default(),
        }
    }
}

fn add_classes<H>(host: &mut H, element: &H::Element, classes: &ClassList)
where
    H: TransitionHost + ?Sized,
{
    for class in classes.iter() {
        host.add_class(element, class);
    }
}

fn remove_classes<H>(host: &mut H, element: &H::Element, classes: &ClassList)
where
    H: TransitionHost + ?Sized,
{
    for class in classes.iter() {
        host.remove_class(element, class);
    }
}

impl<E: Clone + Eq + Hash + Debug> TransitionEngine<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the enter sequence on `element`, interrupting any phase it is in.
    pub fn run_enter<H>(
        &mut self,
        host: &mut H,
        hooks: &mut dyn TransitionHooks<E>,
        element: &E,
        classes: &Rc<TransitionClasses>,
    ) -> RunId
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        self.interrupt(host, element);
        hooks.before_enter(element);

        let phase_classes = classes.phase(Phase::Enter);
        add_classes(host, element, phase_classes.from);
        add_classes(host, element, phase_classes.active);
        let id = self.begin(element, Phase::Enter, classes);

        let completion = hooks.enter(element, self.done.token(id));
        if let Some(run) = self.runs.get_mut(element) {
            run.completion = completion;
        }

        if phase_classes.is_empty() {
            self.advance(host, element);
        } else {
            host.request_frame();
        }
        self.drain_microtasks(host, hooks);
        id
    }

    /// Start the exit sequence on `element`, interrupting any phase it is in.
    pub fn run_exit<H>(
        &mut self,
        host: &mut H,
        hooks: &mut dyn TransitionHooks<E>,
        element: &E,
        classes: &Rc<TransitionClasses>,
    ) -> RunId
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        self.interrupt(host, element);
        hooks.before_exit(element);

        let phase_classes = classes.phase(Phase::Exit);
        add_classes(host, element, phase_classes.from);
        add_classes(host, element, phase_classes.active);
        let id = self.begin(element, Phase::Exit, classes);

        let completion = hooks.exit(element, self.done.token(id));
        if let Some(run) = self.runs.get_mut(element) {
            run.completion = completion;
        }

        if phase_classes.is_empty() {
            self.advance(host, element);
        } else {
            host.request_frame();
        }
        self.drain_microtasks(host, hooks);
        id
    }

    /// Render `element` at its previous position and queue the move.
    ///
    /// The inverse translate is applied now; the move class lands and the
    /// translate is cleared on the next frame.
    pub fn prepare_move<H>(
        &mut self,
        host: &mut H,
        element: &E,
        classes: &Rc<TransitionClasses>,
        offset: Offset,
    ) -> RunId
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        self.interrupt(host, element);
        host.set_translate(element, Some(offset));
        let id = self.begin(element, Phase::Move, classes);
        host.request_frame();
        id
    }

    /// Advance every run that was waiting for this frame.
    pub fn on_frame<H>(&mut self, host: &mut H, hooks: &mut dyn TransitionHooks<E>)
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        let mut starting: Vec<(RunId, E)> = self
            .runs
            .iter()
            .filter(|(_, run)| run.stage == Stage::Starting)
            .map(|(element, run)| (run.id, element.clone()))
            .collect();
        starting.sort_by_key(|(id, _)| *id);

        for (id, element) in starting {
            if self.runs.get(&element).is_some_and(|run| run.id == id) {
                self.advance(host, &element);
            }
        }
        self.drain_microtasks(host, hooks);
    }

    /// Feed an end event observed on a managed element.
    ///
    /// Returns `true` when the event completed a phase.
    pub fn on_event<H>(
        &mut self,
        host: &mut H,
        hooks: &mut dyn TransitionHooks<E>,
        event: &CompletionEvent<E>,
    ) -> bool
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        let resolved = self.detector.resolve(event);
        if let Some((element, run)) = &resolved {
            self.finish(host, hooks, element, *run);
        }
        self.drain_microtasks(host, hooks);
        resolved.is_some()
    }

    /// Process `done` signals raised outside of an engine call.
    pub fn flush<H>(&mut self, host: &mut H, hooks: &mut dyn TransitionHooks<E>)
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        self.drain_microtasks(host, hooks);
    }

    /// Stop whatever phase `element` is in without running its "after" hook.
    ///
    /// Returns the phase that was interrupted.
    pub fn cancel<H>(&mut self, host: &mut H, element: &E) -> Option<Phase>
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        self.interrupt(host, element)
    }

    pub fn state(&self, element: &E) -> TransitionState {
        self.runs
            .get(element)
            .map(|run| TransitionState::from(run.phase))
            .unwrap_or_default()
    }

    pub fn is_active(&self, element: &E) -> bool {
        self.runs.contains_key(element)
    }

    pub fn active_count(&self) -> usize {
        self.runs.len()
    }

    /// Whether any run still waits for an animation frame.
    pub fn needs_frame(&self) -> bool {
        self.runs.values().any(|run| run.stage == Stage::Starting)
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = TransitionEvent<E>> + '_ {
        self.events.drain()
    }

    pub fn pop_event(&mut self) -> Option<TransitionEvent<E>> {
        self.events.pop()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    fn begin(&mut self, element: &E, phase: Phase, classes: &Rc<TransitionClasses>) -> RunId {
        let id = RunId::new();
        self.runs.insert(
            element.clone(),
            ActiveRun {
                id,
                phase,
                stage: Stage::Starting,
                completion: Completion::Auto,
                classes: Rc::clone(classes),
            },
        );
        debug!(?element, ?phase, run = id.0, "phase started");
        self.events.push(TransitionEvent::Started {
            element: element.clone(),
            phase,
        });
        id
    }

    /// Swap start classes for `to` classes and begin waiting for completion.
    fn advance<H>(&mut self, host: &mut H, element: &E)
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        let Some(run) = self.runs.get_mut(element) else {
            return;
        };
        if run.stage != Stage::Starting {
            return;
        }
        run.stage = Stage::Running;
        let (id, phase, completion) = (run.id, run.phase, run.completion);
        let classes = Rc::clone(&run.classes);
        let phase_classes = classes.phase(phase);

        match phase {
            Phase::Enter | Phase::Exit => {
                remove_classes(host, element, phase_classes.from);
                add_classes(host, element, phase_classes.to);
                if completion == Completion::Auto {
                    self.detector
                        .await_settled(host, element, id, EventFilter::AnyEnd);
                }
            }
            Phase::Move => {
                add_classes(host, element, phase_classes.active);
                host.set_translate(element, None);
                self.detector
                    .await_settled(host, element, id, EventFilter::Transform);
            }
        }
    }

    fn drain_microtasks<H>(&mut self, host: &mut H, hooks: &mut dyn TransitionHooks<E>)
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        loop {
            if let Some((element, run)) = self.detector.take_settled() {
                self.finish(host, hooks, &element, run);
                continue;
            }
            if let Some(run) = self.done.pop() {
                match self.element_for(run) {
                    Some(element) => self.finish(host, hooks, &element, run),
                    None => trace!(run = run.0, "ignoring done signal for a stale run"),
                }
                continue;
            }
            break;
        }
    }

    fn finish<H>(&mut self, host: &mut H, hooks: &mut dyn TransitionHooks<E>, element: &E, run: RunId)
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        if !self.runs.get(element).is_some_and(|active| active.id == run) {
            trace!(?element, run = run.0, "completion for a superseded run");
            return;
        }
        let Some(active) = self.runs.remove(element) else {
            return;
        };
        self.detector.cancel(element);
        Self::strip(host, element, &active);

        match active.phase {
            Phase::Enter => hooks.after_enter(element),
            Phase::Exit => hooks.after_exit(element),
            Phase::Move => {}
        }
        debug!(?element, phase = ?active.phase, run = run.0, "phase finished");
        self.events.push(TransitionEvent::Finished {
            element: element.clone(),
            phase: active.phase,
        });
    }

    fn interrupt<H>(&mut self, host: &mut H, element: &E) -> Option<Phase>
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        let active = self.runs.remove(element)?;
        // Listener goes first so a late end event cannot land on the next run.
        self.detector.cancel(element);
        Self::strip(host, element, &active);
        debug!(?element, phase = ?active.phase, run = active.id.0, "phase interrupted");
        self.events.push(TransitionEvent::Interrupted {
            element: element.clone(),
            phase: active.phase,
        });
        Some(active.phase)
    }

    /// Remove every class the run may have added.
    fn strip<H>(host: &mut H, element: &E, run: &ActiveRun)
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        for class in run.classes.phase(run.phase).iter() {
            host.remove_class(element, class);
        }
        if run.phase == Phase::Move {
            host.set_translate(element, None);
        }
    }

    fn element_for(&self, run: RunId) -> Option<E> {
        self.runs
            .iter()
            .find(|(_, active)| active.id == run)
            .map(|(element, _)| element.clone())
    }
}
