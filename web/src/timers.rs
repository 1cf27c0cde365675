use ascend_core::{TimerCommand, TimerId};
use gloo::timers::callback::{Interval, Timeout};
use std::collections::BTreeMap;
use yew::Callback;

// Only held so that dropping the handle cancels the timer.
#[allow(dead_code)]
#[derive(Debug)]
enum TimerHandle {
    Interval(Interval),
    Timeout(Timeout),
}

/// Runs the session's timers on the browser event loop. Dropping a handle cancels it.
#[derive(Debug, Default)]
pub(crate) struct TimerHost {
    handles: BTreeMap<TimerId, TimerHandle>,
}

impl TimerHost {
    pub(crate) fn apply(&mut self, commands: Vec<TimerCommand>, fire: &Callback<TimerId>) {
        for command in commands {
            match command {
                TimerCommand::Start { id, kind, after_ms } => {
                    let fire = fire.clone();
                    let handle = if kind.repeats() {
                        TimerHandle::Interval(Interval::new(after_ms, move || fire.emit(id)))
                    } else {
                        TimerHandle::Timeout(Timeout::new(after_ms, move || fire.emit(id)))
                    };
                    log::trace!("start timer {:?} ({:?}, {}ms)", id, kind, after_ms);
                    self.handles.insert(id, handle);
                }
                TimerCommand::Cancel(id) => {
                    log::trace!("cancel timer {:?}", id);
                    self.handles.remove(&id);
                }
            }
        }
    }

    /// Forgets a one-shot timer once it went off.
    pub(crate) fn fired(&mut self, id: TimerId) {
        if matches!(self.handles.get(&id), Some(TimerHandle::Timeout(_))) {
            self.handles.remove(&id);
        }
    }
}
