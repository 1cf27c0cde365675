use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Handle of a timer requested by a [`Session`](crate::Session), unique for the session's lifetime.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    /// Periodic clock tick while a round is active.
    Tick,
    /// One-shot end of the lock window after a wrong pick.
    PenaltyReset,
}

impl TimerKind {
    pub const fn repeats(self) -> bool {
        matches!(self, Self::Tick)
    }
}

/// Work for the host's timer facility. Firings are reported back with the same id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerCommand {
    Start {
        id: TimerId,
        kind: TimerKind,
        after_ms: u32,
    },
    Cancel(TimerId),
}

/// Armed timers of a session, at most one per kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct TimerSlots {
    next_id: u64,
    ticker: Option<TimerId>,
    penalty: Option<TimerId>,
    outbox: Vec<TimerCommand>,
}

impl TimerSlots {
    fn slot_mut(&mut self, kind: TimerKind) -> &mut Option<TimerId> {
        match kind {
            TimerKind::Tick => &mut self.ticker,
            TimerKind::PenaltyReset => &mut self.penalty,
        }
    }

    pub(crate) fn armed(&self, kind: TimerKind) -> Option<TimerId> {
        match kind {
            TimerKind::Tick => self.ticker,
            TimerKind::PenaltyReset => self.penalty,
        }
    }

    /// Arms a fresh timer of `kind`, replacing any previous one.
    pub(crate) fn arm(&mut self, kind: TimerKind, after_ms: u32) -> TimerId {
        self.disarm(kind);
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        *self.slot_mut(kind) = Some(id);
        self.outbox.push(TimerCommand::Start { id, kind, after_ms });
        id
    }

    pub(crate) fn disarm(&mut self, kind: TimerKind) {
        if let Some(id) = self.slot_mut(kind).take() {
            self.outbox.push(TimerCommand::Cancel(id));
        }
    }

    pub(crate) fn disarm_all(&mut self) {
        self.disarm(TimerKind::Tick);
        self.disarm(TimerKind::PenaltyReset);
    }

    /// Resolves a firing to its kind, or `None` for a timer that is no longer armed.
    /// One-shot timers are consumed.
    pub(crate) fn fired(&mut self, id: TimerId) -> Option<TimerKind> {
        if self.ticker == Some(id) {
            Some(TimerKind::Tick)
        } else if self.penalty == Some(id) {
            self.penalty = None;
            Some(TimerKind::PenaltyReset)
        } else {
            None
        }
    }

    pub(crate) fn take_commands(&mut self) -> Vec<TimerCommand> {
        core::mem::take(&mut self.outbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rearming_cancels_previous_timer() {
        let mut slots = TimerSlots::default();
        let first = slots.arm(TimerKind::Tick, 1000);
        let second = slots.arm(TimerKind::Tick, 1000);

        assert_ne!(first, second);
        assert_eq!(
            slots.take_commands(),
            [
                TimerCommand::Start {
                    id: first,
                    kind: TimerKind::Tick,
                    after_ms: 1000
                },
                TimerCommand::Cancel(first),
                TimerCommand::Start {
                    id: second,
                    kind: TimerKind::Tick,
                    after_ms: 1000
                },
            ]
        );
        assert_eq!(slots.fired(first), None);
        assert_eq!(slots.fired(second), Some(TimerKind::Tick));
    }

    #[test]
    fn one_shot_is_consumed_on_fire() {
        let mut slots = TimerSlots::default();
        let id = slots.arm(TimerKind::PenaltyReset, 1000);

        assert_eq!(slots.fired(id), Some(TimerKind::PenaltyReset));
        assert_eq!(slots.fired(id), None);
        assert_eq!(slots.armed(TimerKind::PenaltyReset), None);
    }

    #[test]
    fn disarm_all_only_cancels_armed_timers() {
        let mut slots = TimerSlots::default();
        let tick = slots.arm(TimerKind::Tick, 1000);
        slots.take_commands();

        slots.disarm_all();

        assert_eq!(slots.take_commands(), [TimerCommand::Cancel(tick)]);
        assert!(slots.take_commands().is_empty());
    }
}
