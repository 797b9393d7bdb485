//! Narrow interface to the document and rendering framework.
//!
//! Controllers never touch a real DOM; they mutate classes, read layout and
//! confirm removals through [`TransitionHost`]. The host in turn feeds
//! animation frames and end events back into the controller.

use std::fmt;
use std::hash::Hash;

use crate::types::{Offset, Rect};

/// The document side of a transition controller.
pub trait TransitionHost {
    /// Cheap handle to an element. Controllers observe elements through it;
    /// the host owns their lifetime.
    type Element: Clone + Eq + Hash + fmt::Debug;

    fn add_class(&mut self, element: &Self::Element, class: &str);

    fn remove_class(&mut self, element: &Self::Element, class: &str);

    /// Whether the element's computed style currently runs a transition or
    /// animation with a non-zero duration.
    fn has_running_animation(&self, element: &Self::Element) -> bool;

    /// Layout box of the element, `None` when it is not attached.
    fn bounding_rect(&self, element: &Self::Element) -> Option<Rect>;

    /// `Some` applies an inline translate with transitions disabled; `None`
    /// clears both the inline transform and the transition override.
    fn set_translate(&mut self, element: &Self::Element, offset: Option<Offset>);

    /// Flush pending style so an inverse transform is painted before the
    /// move class lands.
    fn force_reflow(&mut self) {}

    /// Ask for one more animation frame to be delivered to the controller.
    fn request_frame(&mut self) {}

    /// The element finished exiting and may now be detached.
    fn confirm_removal(&mut self, element: &Self::Element);
}

/// Kind of end event observed on an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndEventKind {
    TransitionEnd,
    AnimationEnd,
}

/// A `transitionend`/`animationend` event as seen by a listener.
///
/// `current_target` is the managed element the listener sits on; `target`
/// differs from it when the event bubbled up from a descendant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEvent<E> {
    pub kind: EndEventKind,
    pub target: E,
    pub current_target: E,
    /// CSS property that finished, for transition events.
    pub property_name: Option<String>,
}

impl<E: Clone> CompletionEvent<E> {
    pub fn transition_end(element: E) -> Self {
        Self {
            kind: EndEventKind::TransitionEnd,
            target: element.clone(),
            current_target: element,
            property_name: None,
        }
    }

    pub fn animation_end(element: E) -> Self {
        Self {
            kind: EndEventKind::AnimationEnd,
            target: element.clone(),
            current_target: element,
            property_name: None,
        }
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property_name = Some(property.into());
        self
    }

    /// The same event, re-targeted as bubbling up from `descendant`.
    pub fn bubbled_from(mut self, descendant: E) -> Self {
        self.target = descendant;
        self
    }
}

impl<E: PartialEq> CompletionEvent<E> {
    /// Fired by the observed element itself rather than a descendant.
    pub fn is_own(&self) -> bool {
        self.target == self.current_target
    }
}
