use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Result;
use rune_transition::{
    Completion, DomOp, ElementId, HeadlessDom, LifecycleHooks, Offset, Rect, TransitionError,
    TransitionGroup, TransitionHost, TransitionMode, TransitionOptions, TransitionState,
};

type Log = Rc<RefCell<Vec<String>>>;

fn recording_hooks(log: &Log) -> LifecycleHooks<ElementId> {
    let (a, b, c, d, e, f) = (
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
    );
    LifecycleHooks::<ElementId>::new()
        .on_before_enter(move |el| a.borrow_mut().push(format!("before_enter {}", el.0)))
        .on_enter(move |el, _| {
            b.borrow_mut().push(format!("enter {}", el.0));
            Completion::Auto
        })
        .on_after_enter(move |el| c.borrow_mut().push(format!("after_enter {}", el.0)))
        .on_before_exit(move |el| d.borrow_mut().push(format!("before_exit {}", el.0)))
        .on_exit(move |el, _| {
            e.borrow_mut().push(format!("exit {}", el.0));
            Completion::Auto
        })
        .on_after_exit(move |el| f.borrow_mut().push(format!("after_exit {}", el.0)))
}

fn list_dom() -> HeadlessDom {
    HeadlessDom::new()
        .with_animated("list-enter-active", "opacity")
        .with_animated("list-exit-active", "opacity")
        .with_animated("list-move", "transform")
}

/// Commit, lay the rendered children out and run the move pass.
fn update(
    group: &mut TransitionGroup<&'static str, ElementId>,
    dom: &mut HeadlessDom,
    children: Vec<(&'static str, ElementId)>,
) -> Result<usize> {
    group.commit(dom, children)?;
    dom.layout(&group.rendered())?;
    Ok(group.on_layout(dom))
}

fn run_frames(group: &mut TransitionGroup<&'static str, ElementId>, dom: &mut HeadlessDom) {
    while dom.next_frame() {
        group.on_frame(dom);
    }
}

fn finish_running(group: &mut TransitionGroup<&'static str, ElementId>, dom: &mut HeadlessDom) {
    for event in dom.end_events() {
        group.on_event(dom, &event);
    }
}

/// Host that reports some elements at a mid-flight box instead of their
/// layout box, the way a browser reports an element under a running move.
struct InFlight<'a> {
    dom: &'a mut HeadlessDom,
    drawn: HashMap<ElementId, Rect>,
}

impl TransitionHost for InFlight<'_> {
    type Element = ElementId;

    fn add_class(&mut self, element: &ElementId, class: &str) {
        self.dom.add_class(element, class);
    }

    fn remove_class(&mut self, element: &ElementId, class: &str) {
        self.dom.remove_class(element, class);
    }

    fn has_running_animation(&self, element: &ElementId) -> bool {
        self.dom.has_running_animation(element)
    }

    fn bounding_rect(&self, element: &ElementId) -> Option<Rect> {
        self.drawn
            .get(element)
            .copied()
            .or_else(|| self.dom.bounding_rect(element))
    }

    fn set_translate(&mut self, element: &ElementId, offset: Option<Offset>) {
        self.dom.set_translate(element, offset);
    }

    fn force_reflow(&mut self) {
        self.dom.force_reflow();
    }

    fn request_frame(&mut self) {
        self.dom.request_frame();
    }

    fn confirm_removal(&mut self, element: &ElementId) {
        self.dom.confirm_removal(element);
    }
}

fn move_classes_added(dom: &HeadlessDom) -> Vec<ElementId> {
    dom.ops()
        .iter()
        .filter_map(|op| match op {
            DomOp::AddClass(el, class) if class == "list-move" => Some(*el),
            _ => None,
        })
        .collect()
}

#[test]
fn rotation_moves_every_element_without_enter_or_exit() -> Result<()> {
    let mut dom = list_dom();
    let (a, b, c) = (dom.create_element(), dom.create_element(), dom.create_element());
    let log: Log = Rc::default();
    let mut group = TransitionGroup::new(TransitionOptions::named("list"), recording_hooks(&log));

    assert_eq!(update(&mut group, &mut dom, vec![("a", a), ("b", b), ("c", c)])?, 0);
    dom.clear_ops();

    let moved = update(&mut group, &mut dom, vec![("c", c), ("a", a), ("b", b)])?;
    assert_eq!(moved, 3);
    assert_eq!(dom.translate(a), Some(Offset::new(0.0, -20.0)));
    assert_eq!(dom.translate(b), Some(Offset::new(0.0, -20.0)));
    assert_eq!(dom.translate(c), Some(Offset::new(0.0, 40.0)));
    assert!(dom.ops().contains(&DomOp::Reflow));
    for key in ["a", "b", "c"] {
        assert_eq!(group.state(&key), TransitionState::Moving);
    }

    run_frames(&mut group, &mut dom);
    let mut moved = move_classes_added(&dom);
    moved.sort();
    assert_eq!(moved, vec![a, b, c]);
    for el in [a, b, c] {
        assert_eq!(dom.translate(el), None);
    }

    finish_running(&mut group, &mut dom);
    for el in [a, b, c] {
        assert!(dom.classes(el).is_empty());
    }
    assert!(log.borrow().is_empty());
    assert!(!group.is_transitioning());
    Ok(())
}

#[test]
fn unchanged_positions_get_no_move_class() -> Result<()> {
    let mut dom = list_dom();
    let (a, b, c) = (dom.create_element(), dom.create_element(), dom.create_element());
    let mut group = TransitionGroup::new(TransitionOptions::named("list"), ());

    update(&mut group, &mut dom, vec![("a", a), ("b", b), ("c", c)])?;
    dom.clear_ops();

    // Swap the tail; `a` keeps its box.
    assert_eq!(update(&mut group, &mut dom, vec![("a", a), ("c", c), ("b", b)])?, 2);
    run_frames(&mut group, &mut dom);
    let mut moved = move_classes_added(&dom);
    moved.sort();
    assert_eq!(moved, vec![b, c]);
    assert_eq!(group.state(&"a"), TransitionState::Idle);
    Ok(())
}

#[test]
fn entering_and_exiting_elements_are_not_moved() -> Result<()> {
    let mut dom = list_dom();
    let (a, b, c, d) = (
        dom.create_element(),
        dom.create_element(),
        dom.create_element(),
        dom.create_element(),
    );
    let log: Log = Rc::default();
    let mut group = TransitionGroup::new(TransitionOptions::named("list"), recording_hooks(&log));

    update(&mut group, &mut dom, vec![("a", a), ("b", b), ("c", c)])?;
    dom.clear_ops();

    // `a` leaves, `d` is inserted in front. `a` still occupies its slot.
    let moved = update(&mut group, &mut dom, vec![("d", d), ("b", b), ("c", c)])?;
    assert_eq!(group.rendered(), vec![a, d, b, c]);
    assert_eq!(group.state(&"a"), TransitionState::Exiting);
    assert_eq!(group.state(&"d"), TransitionState::Entering);
    // `b` and `c` were pushed down by `d`.
    assert_eq!(moved, 2);
    assert_eq!(dom.translate(a), None);
    assert_eq!(dom.translate(d), None);

    run_frames(&mut group, &mut dom);
    finish_running(&mut group, &mut dom);
    assert!(dom.is_removed(a));
    assert_eq!(group.rendered(), vec![d, b, c]);
    assert_eq!(group.entry(&"a"), None);
    assert!(log.borrow().contains(&"after_exit 0".to_string()));
    assert!(log.borrow().contains(&"after_enter 3".to_string()));

    // Once `a` is detached the survivors slide up.
    dom.clear_ops();
    dom.layout(&group.rendered())?;
    assert_eq!(group.on_layout(&mut dom), 3);
    Ok(())
}

#[test]
fn exiting_key_keeps_its_index() -> Result<()> {
    let mut dom = list_dom();
    let (a, b, c) = (dom.create_element(), dom.create_element(), dom.create_element());
    let mut group = TransitionGroup::new(TransitionOptions::named("list"), ());

    update(&mut group, &mut dom, vec![("a", a), ("b", b), ("c", c)])?;
    update(&mut group, &mut dom, vec![("a", a), ("c", c)])?;
    assert_eq!(group.rendered_keys(), &["a", "b", "c"]);
    assert!(group.entry(&"b").is_some_and(|entry| entry.exiting));
    assert_eq!(group.len(), 3);
    Ok(())
}

#[test]
fn readded_key_interrupts_exit_and_enters_again() -> Result<()> {
    let mut dom = list_dom();
    let (a, b) = (dom.create_element(), dom.create_element());
    let log: Log = Rc::default();
    let mut group = TransitionGroup::new(TransitionOptions::named("list"), recording_hooks(&log));

    update(&mut group, &mut dom, vec![("a", a), ("b", b)])?;
    update(&mut group, &mut dom, vec![("a", a)])?;
    run_frames(&mut group, &mut dom);
    assert_eq!(group.state(&"b"), TransitionState::Exiting);

    update(&mut group, &mut dom, vec![("a", a), ("b", b)])?;
    assert_eq!(group.state(&"b"), TransitionState::Entering);
    assert!(!dom.has_class(b, "list-exit-active"));
    assert!(!dom.has_class(b, "list-exit-to"));

    run_frames(&mut group, &mut dom);
    finish_running(&mut group, &mut dom);
    assert!(!dom.is_removed(b));
    assert_eq!(group.rendered(), vec![a, b]);
    assert!(!log.borrow().contains(&"after_exit 1".to_string()));
    assert!(log.borrow().contains(&"after_enter 1".to_string()));
    Ok(())
}

#[test]
fn duplicate_keys_reject_the_commit() -> Result<()> {
    let mut dom = list_dom();
    let (a, b) = (dom.create_element(), dom.create_element());
    let mut group = TransitionGroup::new(TransitionOptions::named("list"), ());

    update(&mut group, &mut dom, vec![("a", a)])?;
    let err = group
        .commit(&mut dom, vec![("a", a), ("x", b), ("x", b)])
        .unwrap_err();
    assert!(matches!(err, TransitionError::DuplicateKey(ref key) if key.contains('x')));
    assert_eq!(group.rendered(), vec![a]);
    assert_eq!(group.state(&"x"), TransitionState::Idle);
    Ok(())
}

#[test]
fn appear_controls_first_commit_only() -> Result<()> {
    let mut dom = list_dom();
    let (a, b) = (dom.create_element(), dom.create_element());
    let mut group = TransitionGroup::new(TransitionOptions::named("list"), ());

    update(&mut group, &mut dom, vec![("a", a)])?;
    assert!(dom.classes(a).is_empty());

    update(&mut group, &mut dom, vec![("a", a), ("b", b)])?;
    assert!(dom.has_class(b, "list-enter"));
    assert!(dom.has_class(b, "list-enter-active"));
    Ok(())
}

#[test]
fn unrelated_property_end_does_not_finish_a_move() -> Result<()> {
    let mut dom = list_dom();
    let (a, b) = (dom.create_element(), dom.create_element());
    let mut group = TransitionGroup::new(TransitionOptions::named("list"), ());

    update(&mut group, &mut dom, vec![("a", a), ("b", b)])?;
    update(&mut group, &mut dom, vec![("b", b), ("a", a)])?;
    run_frames(&mut group, &mut dom);

    let opacity = rune_transition::CompletionEvent::transition_end(a).with_property("opacity");
    assert!(!group.on_event(&mut dom, &opacity));
    assert_eq!(group.state(&"a"), TransitionState::Moving);

    let transform = rune_transition::CompletionEvent::transition_end(a).with_property("transform");
    assert!(group.on_event(&mut dom, &transform));
    assert_eq!(group.state(&"a"), TransitionState::Idle);
    assert!(!dom.has_class(a, "list-move"));
    Ok(())
}

#[test]
fn reorder_during_move_starts_from_drawn_box() -> Result<()> {
    let mut dom = list_dom();
    let (a, b, c) = (dom.create_element(), dom.create_element(), dom.create_element());
    let mut group = TransitionGroup::new(TransitionOptions::named("list"), ());

    update(&mut group, &mut dom, vec![("a", a), ("b", b), ("c", c)])?;
    update(&mut group, &mut dom, vec![("c", c), ("a", a), ("b", b)])?;
    run_frames(&mut group, &mut dom);
    assert_eq!(group.state(&"c"), TransitionState::Moving);

    // c is halfway up from y = 40 to y = 0 when the list flips back.
    let mut host = InFlight {
        dom: &mut dom,
        drawn: HashMap::from([(c, Rect::new(0.0, 20.0, 320.0, 20.0))]),
    };
    group.commit(&mut host, vec![("a", a), ("b", b), ("c", c)])?;
    dom.layout(&group.rendered())?;
    assert_eq!(group.on_layout(&mut dom), 3);

    assert_eq!(dom.translate(c), Some(Offset::new(0.0, -20.0)));
    assert_eq!(dom.translate(a), Some(Offset::new(0.0, -20.0)));
    assert!(!dom.has_class(c, "list-move"));
    assert_eq!(group.state(&"c"), TransitionState::Moving);
    Ok(())
}

#[test]
fn replaced_element_exits_in_place_before_removal() -> Result<()> {
    let mut dom = list_dom();
    let (a, a2, b) = (dom.create_element(), dom.create_element(), dom.create_element());
    let log: Log = Rc::default();
    let mut group = TransitionGroup::new(TransitionOptions::named("list"), recording_hooks(&log));

    update(&mut group, &mut dom, vec![("k", a), ("b", b)])?;
    update(&mut group, &mut dom, vec![("k", a2), ("b", b)])?;
    assert_eq!(group.rendered(), vec![a, a2, b]);
    assert_eq!(group.element(&"k"), Some(&a2));
    assert_eq!(group.element_state(&a), TransitionState::Exiting);
    assert!(dom.has_class(a, "list-exit-active"));
    assert!(log.borrow().contains(&"before_exit 0".to_string()));
    assert!(log.borrow().contains(&"exit 0".to_string()));
    assert!(log.borrow().contains(&"before_enter 1".to_string()));

    run_frames(&mut group, &mut dom);
    assert!(dom.has_class(a, "list-exit-to"));
    assert!(!dom.is_removed(a));
    assert!(!log.borrow().contains(&"after_exit 0".to_string()));

    finish_running(&mut group, &mut dom);
    assert!(dom.is_removed(a));
    assert!(dom.classes(a).is_empty());
    assert!(log.borrow().contains(&"after_exit 0".to_string()));
    assert_eq!(group.rendered(), vec![a2, b]);
    assert!(!group.is_transitioning());
    Ok(())
}

#[test]
fn element_under_two_keys_rejects_the_commit() -> Result<()> {
    let mut dom = list_dom();
    let (a, b) = (dom.create_element(), dom.create_element());
    let mut group = TransitionGroup::new(TransitionOptions::named("list"), ());

    update(&mut group, &mut dom, vec![("a", a)])?;
    let err = group
        .commit(&mut dom, vec![("a", a), ("x", b), ("y", b)])
        .unwrap_err();
    assert!(matches!(err, TransitionError::DuplicateElement(_)));
    assert_eq!(group.rendered(), vec![a]);
    assert!(dom.classes(b).is_empty());
    Ok(())
}

#[test]
fn elements_swapped_between_keys_move_without_hooks() -> Result<()> {
    let mut dom = list_dom();
    let (a, b) = (dom.create_element(), dom.create_element());
    let log: Log = Rc::default();
    let mut group = TransitionGroup::new(TransitionOptions::named("list"), recording_hooks(&log));

    update(&mut group, &mut dom, vec![("x", a), ("y", b)])?;
    let moved = update(&mut group, &mut dom, vec![("x", b), ("y", a)])?;
    assert_eq!(moved, 2);
    assert_eq!(group.rendered(), vec![b, a]);
    assert_eq!(dom.translate(a), Some(Offset::new(0.0, -20.0)));
    assert_eq!(dom.translate(b), Some(Offset::new(0.0, 20.0)));
    assert!(log.borrow().is_empty());
    Ok(())
}

#[test]
fn mode_is_ignored_for_groups() -> Result<()> {
    let mut dom = list_dom();
    let (a, b) = (dom.create_element(), dom.create_element());
    let options = TransitionOptions::named("list").with_mode(TransitionMode::OutIn);
    let mut group = TransitionGroup::new(options, ());

    update(&mut group, &mut dom, vec![("a", a)])?;
    update(&mut group, &mut dom, vec![("b", b)])?;
    assert_eq!(group.state(&"a"), TransitionState::Exiting);
    assert_eq!(group.state(&"b"), TransitionState::Entering);
    Ok(())
}
