use anyhow::{Result, ensure};
use rune_transition::{HeadlessDom, Transition, TransitionOptions};
use tracing::info;

use super::{HookLog, Scene, recording_hooks, settle, styled_dom};

/// Mount, replace and unmount one child of a single slot.
pub struct SingleScene {
    options: TransitionOptions,
}

impl SingleScene {
    pub fn new(options: TransitionOptions) -> Self {
        Self { options }
    }
}

impl Scene for SingleScene {
    fn name(&self) -> &'static str {
        "single"
    }

    fn run(&mut self) -> Result<()> {
        let mut dom: HeadlessDom = styled_dom(&self.options);
        let log = HookLog::default();
        let mut slot = Transition::new(self.options.clone(), recording_hooks(&log));
        let a = dom.create_element();
        let b = dom.create_element();

        slot.set_child(&mut dom, Some(a));
        settle(&mut slot, &mut dom)?;
        info!(appear = self.options.appear, classes = ?dom.classes(a), "mounted");

        slot.set_child(&mut dom, Some(b));
        info!(rendered = ?slot.rendered(), "replacing");
        settle(&mut slot, &mut dom)?;
        ensure!(dom.is_removed(a), "outgoing element was not released");

        slot.set_child(&mut dom, None);
        settle(&mut slot, &mut dom)?;
        ensure!(dom.is_removed(b), "unmounted element was not released");
        ensure!(
            dom.classes(a).is_empty() && dom.classes(b).is_empty(),
            "transition classes left behind"
        );

        info!(
            frames = dom.frame_count(),
            hooks = log.borrow().len(),
            "single slot settled"
        );
        Ok(())
    }
}
