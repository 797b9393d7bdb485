use anyhow::{Context, Result, ensure};
use rune_transition::{ElementId, Transition, TransitionMode, TransitionOptions};
use tracing::info;

use super::{HookLog, Scene, recording_hooks, settle, styled_dom};

/// Replace one child under each ordering and check the hook sequence.
pub struct ModesScene {
    options: TransitionOptions,
}

/// Hook calls of one replacement plus the outgoing and incoming elements.
struct Replacement {
    calls: Vec<String>,
    outgoing: ElementId,
    incoming: ElementId,
}

impl Replacement {
    fn index_of(&self, hook: &str, element: ElementId) -> Result<usize> {
        let entry = format!("{} {}", hook, element.0);
        self.calls
            .iter()
            .position(|call| *call == entry)
            .with_context(|| format!("hook {:?} never ran", entry))
    }
}

impl ModesScene {
    pub fn new(options: TransitionOptions) -> Self {
        Self { options }
    }

    fn replace_once(&self, mode: Option<TransitionMode>) -> Result<Replacement> {
        let mut options = self.options.clone();
        options.mode = mode;
        let mut dom = styled_dom(&options);
        let log = HookLog::default();
        let mut slot = Transition::new(options, recording_hooks(&log));
        let (outgoing, incoming) = (dom.create_element(), dom.create_element());

        slot.set_child(&mut dom, Some(outgoing));
        settle(&mut slot, &mut dom)?;
        log.borrow_mut().clear();

        slot.set_child(&mut dom, Some(incoming));
        settle(&mut slot, &mut dom)?;
        ensure!(
            slot.rendered() == vec![incoming],
            "slot did not settle on the new child"
        );

        let calls = log.borrow().clone();
        Ok(Replacement {
            calls,
            outgoing,
            incoming,
        })
    }
}

impl Scene for ModesScene {
    fn name(&self) -> &'static str {
        "modes"
    }

    fn run(&mut self) -> Result<()> {
        for mode in [None, Some(TransitionMode::OutIn), Some(TransitionMode::InOut)] {
            let replacement = self.replace_once(mode)?;
            let label = mode.map_or_else(|| "simultaneous".to_string(), |m| m.to_string());
            info!(mode = %label, calls = ?replacement.calls, "replacement finished");

            let after_exit = replacement.index_of("after_exit", replacement.outgoing)?;
            let before_enter = replacement.index_of("before_enter", replacement.incoming)?;
            match mode {
                Some(TransitionMode::OutIn) => ensure!(
                    before_enter > after_exit,
                    "outin entered before the exit finished"
                ),
                Some(TransitionMode::InOut) => ensure!(
                    before_enter < after_exit,
                    "inout finished the exit before the enter started"
                ),
                None => {}
            }
        }
        Ok(())
    }
}
