//! In-memory document used to drive controllers without a browser.
//!
//! `HeadlessDom` keeps a class set per element, a table of "animated"
//! classes standing in for stylesheet rules, and lays rendered children out
//! as a flex column with Taffy so move detection sees real position
//! changes. Every mutation is appended to an operation log.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::{Context, Result};
use taffy::prelude::*;

use crate::host::{CompletionEvent, TransitionHost};
use crate::types::{Offset, Rect};

/// Height given to elements created without an explicit one.
pub const DEFAULT_ELEMENT_HEIGHT: f32 = 20.0;

/// Handle to an element of a [`HeadlessDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub u32);

/// One recorded document mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum DomOp {
    AddClass(ElementId, String),
    RemoveClass(ElementId, String),
    Translate(ElementId, Option<Offset>),
    Reflow,
    Frame(u64),
    Removed(ElementId),
}

#[derive(Debug, Clone)]
struct Node {
    classes: BTreeSet<String>,
    height: f32,
    parent: Option<ElementId>,
    translate: Option<Offset>,
    rect: Option<Rect>,
}

/// Headless [`TransitionHost`].
#[derive(Debug)]
pub struct HeadlessDom {
    nodes: BTreeMap<ElementId, Node>,
    next_id: u32,
    width: f32,
    /// Class name → CSS property its rule transitions.
    animated: HashMap<String, String>,
    frame_requested: bool,
    frame: u64,
    removed: Vec<ElementId>,
    ops: Vec<DomOp>,
}

impl Default for HeadlessDom {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: 0,
            width: 320.0,
            animated: HashMap::new(),
            frame_requested: false,
            frame: 0,
            removed: Vec::new(),
            ops: Vec::new(),
        }
    }
}

impl HeadlessDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a stylesheet rule: elements carrying `class` run a transition
    /// on `property`.
    pub fn with_animated(mut self, class: impl Into<String>, property: impl Into<String>) -> Self {
        self.set_animated(class, property);
        self
    }

    pub fn set_animated(&mut self, class: impl Into<String>, property: impl Into<String>) {
        self.animated.insert(class.into(), property.into());
    }

    pub fn create_element(&mut self) -> ElementId {
        self.create_element_with_height(DEFAULT_ELEMENT_HEIGHT)
    }

    pub fn create_element_with_height(&mut self, height: f32) -> ElementId {
        self.insert_node(height, None)
    }

    /// A descendant of `parent`, used to produce bubbling end events.
    pub fn create_child(&mut self, parent: ElementId) -> ElementId {
        self.insert_node(DEFAULT_ELEMENT_HEIGHT, Some(parent))
    }

    fn insert_node(&mut self, height: f32, parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                classes: BTreeSet::new(),
                height,
                parent,
                translate: None,
                rect: None,
            },
        );
        id
    }

    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.nodes.get(&element).and_then(|node| node.parent)
    }

    pub fn classes(&self, element: ElementId) -> Vec<String> {
        self.nodes
            .get(&element)
            .map(|node| node.classes.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.nodes
            .get(&element)
            .is_some_and(|node| node.classes.contains(class))
    }

    pub fn translate(&self, element: ElementId) -> Option<Offset> {
        self.nodes.get(&element).and_then(|node| node.translate)
    }

    /// Lay `order` out top to bottom; elements not listed lose their box.
    pub fn layout(&mut self, order: &[ElementId]) -> Result<()> {
        let mut tree: TaffyTree<()> = TaffyTree::new();
        let mut leaves = Vec::with_capacity(order.len());
        for id in order {
            let height = self
                .nodes
                .get(id)
                .map(|node| node.height)
                .with_context(|| format!("Unknown element: {:?}", id))?;
            let leaf = tree
                .new_leaf(Style {
                    size: Size {
                        width: Dimension::Percent(1.0),
                        height: Dimension::Length(height),
                    },
                    flex_shrink: 0.0,
                    ..Default::default()
                })
                .context("Failed to create Taffy leaf node")?;
            leaves.push(leaf);
        }

        let root = tree
            .new_with_children(
                Style {
                    display: Display::Flex,
                    flex_direction: FlexDirection::Column,
                    size: Size {
                        width: Dimension::Length(self.width),
                        height: Dimension::Auto,
                    },
                    ..Default::default()
                },
                &leaves,
            )
            .context("Failed to create Taffy node")?;

        let available = Size {
            width: AvailableSpace::Definite(self.width),
            height: AvailableSpace::MaxContent,
        };
        tree.compute_layout(root, available)
            .context("Failed to compute layout")?;

        for node in self.nodes.values_mut() {
            node.rect = None;
        }
        for (id, leaf) in order.iter().zip(&leaves) {
            let layout = tree.layout(*leaf).context("Failed to get layout")?;
            if let Some(node) = self.nodes.get_mut(id) {
                node.rect = Some(Rect::new(
                    layout.location.x,
                    layout.location.y,
                    layout.size.width,
                    layout.size.height,
                ));
            }
        }
        Ok(())
    }

    /// Consume a pending frame request.
    pub fn take_frame_request(&mut self) -> bool {
        std::mem::take(&mut self.frame_requested)
    }

    /// Start the next animation frame if one was requested.
    pub fn next_frame(&mut self) -> bool {
        if !self.take_frame_request() {
            return false;
        }
        self.frame += 1;
        self.ops.push(DomOp::Frame(self.frame));
        true
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Elements whose current classes match an animated rule.
    pub fn running_elements(&self) -> Vec<ElementId> {
        self.nodes
            .keys()
            .copied()
            .filter(|id| self.has_running_animation(id))
            .collect()
    }

    /// The end events a browser would fire once every running transition
    /// finishes.
    pub fn end_events(&self) -> Vec<CompletionEvent<ElementId>> {
        self.running_elements()
            .into_iter()
            .filter_map(|id| {
                let property = self.running_property(id)?;
                Some(CompletionEvent::transition_end(id).with_property(property))
            })
            .collect()
    }

    fn running_property(&self, element: ElementId) -> Option<String> {
        let node = self.nodes.get(&element)?;
        node.classes
            .iter()
            .find_map(|class| self.animated.get(class).cloned())
    }

    pub fn removed(&self) -> &[ElementId] {
        &self.removed
    }

    pub fn is_removed(&self, element: ElementId) -> bool {
        self.removed.contains(&element)
    }

    pub fn ops(&self) -> &[DomOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }
}

impl TransitionHost for HeadlessDom {
    type Element = ElementId;

    fn add_class(&mut self, element: &ElementId, class: &str) {
        if let Some(node) = self.nodes.get_mut(element) {
            if node.classes.insert(class.to_string()) {
                self.ops.push(DomOp::AddClass(*element, class.to_string()));
            }
        }
    }

    fn remove_class(&mut self, element: &ElementId, class: &str) {
        if let Some(node) = self.nodes.get_mut(element) {
            if node.classes.remove(class) {
                self.ops.push(DomOp::RemoveClass(*element, class.to_string()));
            }
        }
    }

    fn has_running_animation(&self, element: &ElementId) -> bool {
        self.nodes.get(element).is_some_and(|node| {
            node.classes
                .iter()
                .any(|class| self.animated.contains_key(class))
        })
    }

    fn bounding_rect(&self, element: &ElementId) -> Option<Rect> {
        self.nodes.get(element).and_then(|node| node.rect)
    }

    fn set_translate(&mut self, element: &ElementId, offset: Option<Offset>) {
        if let Some(node) = self.nodes.get_mut(element) {
            node.translate = offset;
            self.ops.push(DomOp::Translate(*element, offset));
        }
    }

    fn force_reflow(&mut self) {
        self.ops.push(DomOp::Reflow);
    }

    fn request_frame(&mut self) {
        self.frame_requested = true;
    }

    fn confirm_removal(&mut self, element: &ElementId) {
        if let Some(node) = self.nodes.get_mut(element) {
            node.rect = None;
        }
        self.removed.push(*element);
        self.ops.push(DomOp::Removed(*element));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_mutations_are_logged_once() {
        let mut dom = HeadlessDom::new();
        let el = dom.create_element();
        dom.add_class(&el, "a");
        dom.add_class(&el, "a");
        dom.remove_class(&el, "a");
        dom.remove_class(&el, "a");
        assert_eq!(
            dom.ops(),
            &[
                DomOp::AddClass(el, "a".to_string()),
                DomOp::RemoveClass(el, "a".to_string()),
            ]
        );
    }

    #[test]
    fn test_column_layout() -> Result<()> {
        let mut dom = HeadlessDom::new();
        let a = dom.create_element();
        let b = dom.create_element_with_height(30.0);
        let c = dom.create_element();

        dom.layout(&[a, b, c])?;
        assert_eq!(dom.bounding_rect(&a).map(|r| r.y), Some(0.0));
        assert_eq!(dom.bounding_rect(&b).map(|r| r.y), Some(20.0));
        assert_eq!(dom.bounding_rect(&c).map(|r| r.y), Some(50.0));

        dom.layout(&[c, a])?;
        assert_eq!(dom.bounding_rect(&c).map(|r| r.y), Some(0.0));
        assert_eq!(dom.bounding_rect(&a).map(|r| r.y), Some(20.0));
        assert_eq!(dom.bounding_rect(&b), None);
        Ok(())
    }

    #[test]
    fn test_running_animation_and_end_events() {
        let mut dom = HeadlessDom::new().with_animated("s-move", "transform");
        let el = dom.create_element();
        let child = dom.create_child(el);
        assert_eq!(dom.parent(child), Some(el));
        assert!(!dom.has_running_animation(&el));

        dom.add_class(&el, "s-move");
        assert!(dom.has_running_animation(&el));
        assert_eq!(
            dom.end_events(),
            vec![CompletionEvent::transition_end(el).with_property("transform")]
        );
    }

    #[test]
    fn test_frames_and_removal() {
        let mut dom = HeadlessDom::new();
        let el = dom.create_element();
        assert!(!dom.next_frame());
        dom.request_frame();
        assert!(dom.next_frame());
        assert_eq!(dom.frame_count(), 1);

        dom.confirm_removal(&el);
        assert!(dom.is_removed(el));
        assert_eq!(dom.ops().last(), Some(&DomOp::Removed(el)));
    }
}
