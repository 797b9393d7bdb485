//! Keyed group transition controller.
//!
//! `TransitionGroup` runs an independent enter/exit lifecycle per key and
//! animates reordered survivors with a FLIP move pass. The host drives one
//! update as:
//!
//! ```ignore
//! group.commit(&mut dom, [(k1, a), (k2, b)])?; // enter/exit decisions
//! dom.layout(&group.rendered())?;              // host settles layout
//! group.on_layout(&mut dom);                   // inverse translates
//! while dom.next_frame() {
//!     group.on_frame(&mut dom);                // move classes land
//! }
//! ```
//!
//! Exiting children, including elements a key swapped for a new one, keep
//! their previous index in [`TransitionGroup::rendered`] until their exit
//! finishes, so the space they vacate only collapses once
//! the host confirms their removal.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::classes::{TransitionClasses, TransitionOptions};
use crate::engine::TransitionEngine;
use crate::error::{Result, TransitionError};
use crate::events::TransitionEvent;
use crate::hooks::TransitionHooks;
use crate::host::{CompletionEvent, TransitionHost};
use crate::types::{Phase, Rect, TransitionState};

/// Bookkeeping for one key of the group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupEntry<E> {
    pub element: E,
    /// Layout box the element was last seen at ("First" of the next move).
    pub last_position: Option<Rect>,
    /// The key left the collection and the element is running its exit.
    pub exiting: bool,
}

impl<E> GroupEntry<E> {
    fn new(element: E) -> Self {
        Self {
            element,
            last_position: None,
            exiting: false,
        }
    }
}

/// One position in the rendered order.
#[derive(Debug, Clone, PartialEq)]
enum Slot<K, E> {
    Keyed(K),
    /// Element that lost its key to a new element and is finishing its exit.
    Replaced(E),
}

/// Transition controller for a keyed, ordered collection of children.
pub struct TransitionGroup<K, E> {
    classes: Rc<TransitionClasses>,
    appear: bool,
    hooks: Box<dyn TransitionHooks<E>>,
    engine: TransitionEngine<E>,
    entries: HashMap<K, GroupEntry<E>>,
    /// Rendered order, exiting keys and replaced elements included.
    order: Vec<Slot<K, E>>,
    committed: bool,
}

impl<K, E> TransitionGroup<K, E>
where
    K: Clone + Eq + Hash + Debug,
    E: Clone + Eq + Hash + Debug,
{
    pub fn new(options: TransitionOptions, hooks: impl TransitionHooks<E> + 'static) -> Self {
        if let Some(mode) = options.mode {
            warn!(%mode, "transition mode has no effect on a group; ignoring");
        }
        Self {
            classes: Rc::new(options.resolve_classes()),
            appear: options.appear,
            hooks: Box::new(hooks),
            engine: TransitionEngine::new(),
            entries: HashMap::new(),
            order: Vec::new(),
            committed: false,
        }
    }

    pub fn classes(&self) -> &TransitionClasses {
        &self.classes
    }

    /// Apply a new keyed child list.
    ///
    /// Elements are tracked by identity. New elements enter (on the first
    /// commit only when `appear` is set) and elements that left exit in
    /// place. An element handed from one key to another is a survivor, and
    /// an element that a key swapped for a new one exits at that key's
    /// index while the new one enters.
    ///
    /// Fails without touching anything when a key or an element repeats.
    pub fn commit<H, I>(&mut self, host: &mut H, children: I) -> Result<()>
    where
        H: TransitionHost<Element = E> + ?Sized,
        I: IntoIterator<Item = (K, E)>,
    {
        let children: Vec<(K, E)> = children.into_iter().collect();
        let mut keys = HashSet::with_capacity(children.len());
        let mut elements = HashSet::with_capacity(children.len());
        for (key, element) in &children {
            if !keys.insert(key) {
                return Err(TransitionError::DuplicateKey(format!("{:?}", key)));
            }
            if !elements.insert(element) {
                return Err(TransitionError::DuplicateElement(format!("{:?}", element)));
            }
        }

        let first = !self.committed;
        self.committed = true;
        self.record_positions(host);

        let mut previous = std::mem::take(&mut self.entries);
        let mut owners: HashMap<E, K> = previous
            .iter()
            .map(|(key, entry)| (entry.element.clone(), key.clone()))
            .collect();
        let mut order = std::mem::take(&mut self.order);

        let mut to_enter = Vec::new();
        for (key, element) in &children {
            let known = owners
                .remove(element)
                .and_then(|owner| previous.remove(&owner));
            let entry = match known {
                Some(mut entry) => {
                    if entry.exiting {
                        entry.exiting = false;
                        to_enter.push(element.clone());
                    }
                    entry
                }
                None => {
                    let before = order.len();
                    order.retain(|slot| !matches!(slot, Slot::Replaced(e) if e == element));
                    if order.len() < before || !first || self.appear {
                        to_enter.push(element.clone());
                    }
                    GroupEntry::new(element.clone())
                }
            };
            self.entries.insert(key.clone(), entry);
        }

        let mut to_exit = Vec::new();
        for slot in order.iter_mut() {
            let Slot::Keyed(key) = &*slot else {
                continue;
            };
            let Some(mut entry) = previous.remove(key) else {
                continue;
            };
            if keys.contains(key) {
                debug!(?key, old = ?entry.element, "element replaced under key");
                if !entry.exiting {
                    to_exit.push(entry.element.clone());
                }
                *slot = Slot::Replaced(entry.element);
            } else {
                if !entry.exiting {
                    entry.exiting = true;
                    to_exit.push(entry.element.clone());
                }
                self.entries.insert(key.clone(), entry);
            }
        }
        // A key whose element went to another key has nothing left to render.
        order.retain(|slot| match slot {
            Slot::Keyed(key) => self.entries.contains_key(key),
            Slot::Replaced(_) => true,
        });

        self.order = splice_order(&order, &children, &keys);

        for element in &to_enter {
            self.engine
                .run_enter(host, self.hooks.as_mut(), element, &self.classes);
        }
        for element in &to_exit {
            self.engine
                .run_exit(host, self.hooks.as_mut(), element, &self.classes);
        }
        self.process_events(host);
        Ok(())
    }

    /// Measure the settled layout and start moves for survivors whose box
    /// changed since it was last recorded.
    ///
    /// Returns how many moves were started.
    pub fn on_layout<H>(&mut self, host: &mut H) -> usize
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        let mut moved = 0;
        for slot in &self.order {
            let Slot::Keyed(key) = slot else {
                continue;
            };
            let Some(entry) = self.entries.get_mut(key) else {
                continue;
            };
            if entry.exiting || !self.engine.state(&entry.element).can_move() {
                continue;
            }
            let Some(last) = host.bounding_rect(&entry.element) else {
                continue;
            };
            if let Some(first) = entry.last_position {
                let offset = last.invert_from(&first);
                if !offset.is_zero() {
                    self.engine
                        .prepare_move(host, &entry.element, &self.classes, offset);
                    moved += 1;
                }
            }
            entry.last_position = Some(last);
        }
        if moved > 0 {
            host.force_reflow();
        }
        moved
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

    pub fn flush<H>(&mut self, host: &mut H)
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        self.engine.flush(host, self.hooks.as_mut());
        self.process_events(host);
    }

    /// Elements the host must keep attached, in document order.
    pub fn rendered(&self) -> Vec<E> {
        self.order
            .iter()
            .filter_map(|slot| match slot {
                Slot::Keyed(key) => self.entries.get(key).map(|entry| entry.element.clone()),
                Slot::Replaced(element) => Some(element.clone()),
            })
            .collect()
    }

    /// Keys in rendered order, exiting keys included.
    pub fn rendered_keys(&self) -> Vec<K> {
        self.order
            .iter()
            .filter_map(|slot| match slot {
                Slot::Keyed(key) => Some(key.clone()),
                Slot::Replaced(_) => None,
            })
            .collect()
    }

    pub fn entry(&self, key: &K) -> Option<&GroupEntry<E>> {
        self.entries.get(key)
    }

    pub fn element(&self, key: &K) -> Option<&E> {
        self.entries.get(key).map(|entry| &entry.element)
    }

    pub fn state(&self, key: &K) -> TransitionState {
        self.entries
            .get(key)
            .map(|entry| self.engine.state(&entry.element))
            .unwrap_or_default()
    }

    /// Phase of any element the group manages, keyed or replaced.
    pub fn element_state(&self, element: &E) -> TransitionState {
        self.engine.state(element)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether any element is still entering, exiting or moving.
    pub fn is_transitioning(&self) -> bool {
        self.engine.active_count() > 0
    }

    /// Take the current box of every survivor as its "First". Moving
    /// entries report where they are drawn mid-flight.
    fn record_positions<H>(&mut self, host: &H)
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        for entry in self.entries.values_mut() {
            if entry.exiting || !self.engine.state(&entry.element).can_move() {
                continue;
            }
            if let Some(rect) = host.bounding_rect(&entry.element) {
                entry.last_position = Some(rect);
            }
        }
    }

    fn process_events<H>(&mut self, host: &mut H)
    where
        H: TransitionHost<Element = E> + ?Sized,
    {
        while let Some(event) = self.engine.pop_event() {
            let TransitionEvent::Finished { element, phase } = event else {
                continue;
            };
            match phase {
                Phase::Enter => {
                    let position = host.bounding_rect(&element);
                    if let Some(entry) = self.entries.values_mut().find(|e| e.element == element) {
                        entry.last_position = position;
                    }
                }
                Phase::Exit => {
                    let key = self
                        .entries
                        .iter()
                        .find(|(_, entry)| entry.exiting && entry.element == element)
                        .map(|(key, _)| key.clone());
                    let before = self.order.len();
                    match &key {
                        Some(key) => {
                            self.entries.remove(key);
                            self.order
                                .retain(|slot| !matches!(slot, Slot::Keyed(k) if k == key));
                        }
                        None => self
                            .order
                            .retain(|slot| !matches!(slot, Slot::Replaced(e) if e == &element)),
                    }
                    if self.order.len() < before {
                        host.confirm_removal(&element);
                    }
                }
                Phase::Move => {}
            }
        }
    }
}

/// New ordering with every slot that left the collection kept at the index
/// it previously occupied.
fn splice_order<K, E>(
    previous: &[Slot<K, E>],
    children: &[(K, E)],
    keys: &HashSet<&K>,
) -> Vec<Slot<K, E>>
where
    K: Clone + Eq + Hash,
    E: Clone,
{
    let mut order: Vec<Slot<K, E>> = children
        .iter()
        .map(|(key, _)| Slot::Keyed(key.clone()))
        .collect();
    for (index, slot) in previous.iter().enumerate() {
        let stays = match slot {
            Slot::Keyed(key) => !keys.contains(key),
            Slot::Replaced(_) => true,
        };
        if stays {
            order.insert(index.min(order.len()), slot.clone());
        }
    }
    order
}

impl<K: Debug, E: Debug> Debug for TransitionGroup<K, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionGroup")
            .field("classes", &self.classes)
            .field("appear", &self.appear)
            .field("entries", &self.entries)
            .field("order", &self.order)
            .field("committed", &self.committed)
            .finish_non_exhaustive()
    }
}
