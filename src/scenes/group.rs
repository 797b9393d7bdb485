use anyhow::{Result, ensure};
use rune_transition::{ElementId, HeadlessDom, TransitionGroup, TransitionOptions};
use tracing::info;

use super::{HookLog, Scene, recording_hooks, settle, styled_dom};

/// Reorder, insert and remove keyed children of a list.
pub struct GroupScene {
    options: TransitionOptions,
}

impl GroupScene {
    pub fn new(options: TransitionOptions) -> Self {
        Self { options }
    }
}

/// Commit `children`, lay the result out and play everything it started.
///
/// Exits finishing during the settle detach their element, so the layout is
/// redone until no further moves start.
fn update(
    group: &mut TransitionGroup<&'static str, ElementId>,
    dom: &mut HeadlessDom,
    children: &[(&'static str, ElementId)],
) -> Result<usize> {
    group.commit(dom, children.iter().copied())?;
    let mut moved = 0;
    loop {
        dom.layout(&group.rendered())?;
        let started = group.on_layout(dom);
        moved += started;
        let before = group.len();
        settle(group, dom)?;
        if started == 0 && group.len() == before {
            return Ok(moved);
        }
    }
}

impl Scene for GroupScene {
    fn name(&self) -> &'static str {
        "group"
    }

    fn run(&mut self) -> Result<()> {
        let mut dom = styled_dom(&self.options);
        let log = HookLog::default();
        let mut group = TransitionGroup::new(self.options.clone(), recording_hooks(&log));
        let (a, b, c, d) = (
            dom.create_element(),
            dom.create_element(),
            dom.create_element(),
            dom.create_element(),
        );

        update(&mut group, &mut dom, &[("a", a), ("b", b), ("c", c)])?;
        log.borrow_mut().clear();

        let moved = update(&mut group, &mut dom, &[("c", c), ("a", a), ("b", b)])?;
        info!(moved, keys = ?group.rendered_keys(), "rotated");
        ensure!(moved == 3, "rotation should move every child, moved {}", moved);
        ensure!(log.borrow().is_empty(), "rotation ran enter or exit hooks");

        let moved = update(&mut group, &mut dom, &[("d", d), ("c", c), ("b", b)])?;
        info!(moved, keys = ?group.rendered_keys(), hooks = ?log.borrow(), "replaced a with d");
        ensure!(dom.is_removed(a), "removed child was not released");
        ensure!(
            group.rendered() == vec![d, c, b],
            "unexpected order {:?}",
            group.rendered()
        );
        for el in [b, c, d] {
            ensure!(dom.classes(el).is_empty(), "classes left on {:?}", el);
        }
        Ok(())
    }
}
