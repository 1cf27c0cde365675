use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No round started yet.
    Idle,
    /// Round in progress, clock running.
    Active,
    /// Round finished, clock stopped, waiting for [`Session::advance`].
    RoundOver,
}

impl Default for Phase {
    fn default() -> Self {
        Self::Idle
    }
}

/// Read-only view handed to the presentation layer after every transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub grid_size: GridSize,
    pub cards: Vec<Card>,
    pub expected_value: CardValue,
    pub locked: bool,
    pub wrong_card: Option<Position>,
    pub mistake_count: u32,
    pub elapsed_seconds: u32,
    pub phase: Phase,
    pub level: u32,
    pub best_score: Option<BestScore>,
    pub is_new_best_score: bool,
}

/// Owns the current round, the round clock and best-score bookkeeping.
///
/// The session never waits on anything itself. Timers it needs are queued as [`TimerCommand`]s which the
/// host collects with [`Session::take_timer_commands`] after every call, and their firings come back through
/// [`Session::on_timer`]. Firings of timers that were cancelled in the meantime are dropped.
#[derive(Debug)]
pub struct Session<S> {
    config: SessionConfig,
    store: S,
    round: Option<RoundState>,
    phase: Phase,
    elapsed_seconds: u32,
    level: u32,
    best_score: Option<BestScore>,
    is_new_best_score: bool,
    next_round_id: RoundId,
    timers: TimerSlots,
}

impl<S: ScoreStore> Session<S> {
    pub fn new(config: SessionConfig, store: S) -> Self {
        let best_score = match store.load() {
            Ok(best_score) => best_score,
            Err(err) => {
                log::warn!("Could not load best score, starting without one: {}", err);
                None
            }
        };
        log::debug!("session created, best score: {:?}", best_score);

        Self {
            config,
            store,
            round: None,
            phase: Phase::Idle,
            elapsed_seconds: 0,
            level: 0,
            best_score,
            is_new_best_score: false,
            next_round_id: RoundId::default(),
            timers: TimerSlots::default(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> Option<&RoundState> {
        self.round.as_ref()
    }

    /// Grid size of the current round, or the configured starting size before the first one.
    pub fn grid_size(&self) -> GridSize {
        self.round
            .as_ref()
            .map_or(self.config.starting_grid_size, RoundState::grid_size)
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    /// Rounds started during this session.
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn best_score(&self) -> Option<BestScore> {
        self.best_score
    }

    pub fn is_new_best_score(&self) -> bool {
        self.is_new_best_score
    }

    pub fn armed_timer(&self, kind: TimerKind) -> Option<TimerId> {
        self.timers.armed(kind)
    }

    /// Drains the timer work queued by previous calls.
    pub fn take_timer_commands(&mut self) -> Vec<TimerCommand> {
        self.timers.take_commands()
    }

    /// Starts a round at the configured starting size.
    pub fn new_game(&mut self, seed: u64) {
        let grid_size = self.config.starting_grid_size;
        self.begin_round(|round_id| RoundState::new_round(round_id, grid_size, seed));
    }

    /// Starts a freshly shuffled round, abandoning the current one if it is still running.
    pub fn start_round(&mut self, grid_size: GridSize, seed: u64) -> Result<()> {
        if !is_valid_grid_size(grid_size) {
            return Err(GameError::InvalidGridSize);
        }
        self.begin_round(|round_id| RoundState::new_round(round_id, grid_size, seed));
        Ok(())
    }

    pub fn start_round_with<G: LayoutGenerator>(&mut self, generator: G, grid_size: GridSize) {
        self.start_round_with_layout(generator.generate(grid_size));
    }

    pub fn start_round_with_layout(&mut self, layout: CardLayout) {
        self.begin_round(|round_id| RoundState::new(round_id, layout));
    }

    fn begin_round(&mut self, build: impl FnOnce(RoundId) -> RoundState) {
        self.timers.disarm_all();

        let round_id = self.next_round_id;
        self.next_round_id = round_id.next();
        let round = build(round_id);
        log::debug!(
            "starting round {:?} with grid size {} (from {:?})",
            round_id,
            round.grid_size(),
            self.phase
        );

        self.round = Some(round);
        self.elapsed_seconds = 0;
        self.is_new_best_score = false;
        self.level = self.level.saturating_add(1);
        self.phase = Phase::Active;
        self.timers
            .arm(TimerKind::Tick, self.config.tick_interval_ms);
    }

    /// Moves on to the next level, one size larger than the round just finished.
    pub fn advance(&mut self, seed: u64) -> Result<()> {
        if self.phase != Phase::RoundOver {
            return Err(GameError::NotRoundOver);
        }

        let grid_size = self.grid_size();
        if grid_size == GridSize::MAX {
            log::warn!("Grid size {} is the largest supported, not growing", grid_size);
        }
        self.start_round(grid_size.saturating_add(1), seed)
    }

    /// Forwards a card selection to the running round. Outside of an active round nothing changes.
    pub fn select_card(&mut self, position: Position) -> Result<SelectOutcome> {
        let Some(round) = self.round.as_mut() else {
            return Ok(SelectOutcome::NoChange);
        };
        if self.phase != Phase::Active {
            round.layout().validate_position(position)?;
            return Ok(SelectOutcome::NoChange);
        }

        let outcome = round.select_card(position)?;
        match outcome {
            SelectOutcome::Mistake => {
                self.timers
                    .arm(TimerKind::PenaltyReset, self.config.penalty_delay_ms);
            }
            SelectOutcome::Completed => self.on_round_complete(),
            SelectOutcome::NoChange | SelectOutcome::Matched => {}
        }
        Ok(outcome)
    }

    /// Applies a timer firing reported by the host. Returns whether anything changed.
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        match self.timers.fired(id) {
            Some(TimerKind::Tick) if self.phase == Phase::Active => {
                self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
                true
            }
            Some(TimerKind::PenaltyReset) => self
                .round
                .as_mut()
                .is_some_and(RoundState::reset_after_mistake),
            Some(TimerKind::Tick) | None => {
                log::trace!("dropping stale timer {:?}", id);
                false
            }
        }
    }

    fn on_round_complete(&mut self) {
        self.timers.disarm_all();
        self.phase = Phase::RoundOver;

        let mistakes = self.round.as_ref().map_or(0, RoundState::mistake_count);
        let score = BestScore::new(self.elapsed_seconds, mistakes);
        log::debug!("round over: {:?}", score);

        if !score.beats(self.best_score.as_ref()) {
            return;
        }

        self.best_score = Some(score);
        self.is_new_best_score = true;
        if let Err(err) = self.store.save(&score) {
            log::warn!("Could not save best score: {}", err);
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let round = self.round.as_ref();
        Snapshot {
            grid_size: self.grid_size(),
            cards: round.map(|r| r.cards().to_vec()).unwrap_or_default(),
            expected_value: round.map_or(1, RoundState::expected_value),
            locked: round.is_some_and(RoundState::is_locked),
            wrong_card: round.and_then(RoundState::wrong_card),
            mistake_count: round.map_or(0, RoundState::mistake_count),
            elapsed_seconds: self.elapsed_seconds,
            phase: self.phase,
            level: self.level,
            best_score: self.best_score,
            is_new_best_score: self.is_new_best_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session<MemoryScoreStore> {
        Session::new(SessionConfig::new(2), MemoryScoreStore::default())
    }

    fn layout(values: &[CardValue]) -> CardLayout {
        CardLayout::from_values(2, values).unwrap()
    }

    fn select_value(session: &mut Session<impl ScoreStore>, value: CardValue) -> SelectOutcome {
        let position = session
            .round()
            .and_then(|round| round.layout().position_of(value))
            .unwrap();
        session.select_card(position).unwrap()
    }

    fn started_timer(commands: &[TimerCommand], wanted: TimerKind) -> TimerId {
        commands
            .iter()
            .find_map(|command| match *command {
                TimerCommand::Start { id, kind, .. } if kind == wanted => Some(id),
                _ => None,
            })
            .unwrap()
    }

    fn finish_round(session: &mut Session<impl ScoreStore>, seconds: u32) -> u32 {
        let ticker = session.armed_timer(TimerKind::Tick).unwrap();
        for _ in 0..seconds {
            session.on_timer(ticker);
        }
        let total = session.round().unwrap().layout().card_count();
        let mut completions = 0;
        for value in 1..=total {
            if select_value(session, value).is_completion() {
                completions += 1;
            }
        }
        completions
    }

    #[test]
    fn starts_idle_without_round() {
        let mut session = session();

        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.select_card(0), Ok(SelectOutcome::NoChange));
        assert!(session.take_timer_commands().is_empty());
        assert_eq!(session.snapshot().cards.len(), 0);
    }

    #[test]
    fn start_round_arms_clock_and_ticks_count_seconds() {
        let mut session = session();
        session.start_round(3, 1).unwrap();

        let commands = session.take_timer_commands();
        let ticker = started_timer(&commands, TimerKind::Tick);
        assert_eq!(
            commands,
            [TimerCommand::Start {
                id: ticker,
                kind: TimerKind::Tick,
                after_ms: 1000
            }]
        );

        for _ in 0..5 {
            assert!(session.on_timer(ticker));
        }
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.elapsed_seconds(), 5);
        assert_eq!(session.snapshot().cards.len(), 9);
    }

    #[test]
    fn rejects_undersized_grid() {
        let mut session = session();
        assert_eq!(session.start_round(1, 0), Err(GameError::InvalidGridSize));
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn two_by_two_in_order_completes_once_and_stops_clock() {
        let mut session = session();
        session.start_round(2, 99).unwrap();
        let ticker = session.armed_timer(TimerKind::Tick).unwrap();
        session.take_timer_commands();

        assert_eq!(finish_round(&mut session, 3), 1);

        assert_eq!(session.phase(), Phase::RoundOver);
        assert_eq!(session.snapshot().mistake_count, 0);
        assert_eq!(session.take_timer_commands(), [TimerCommand::Cancel(ticker)]);

        // tick scheduled before completion but delivered after
        assert!(!session.on_timer(ticker));
        assert_eq!(session.elapsed_seconds(), 3);
    }

    #[test]
    fn wrong_pick_locks_until_penalty_timer_fires() {
        let mut session = session();
        session.start_round_with_layout(layout(&[3, 1, 4, 2]));
        session.take_timer_commands();

        assert_eq!(session.select_card(1), Ok(SelectOutcome::Matched));
        assert_eq!(session.select_card(2), Ok(SelectOutcome::Mistake));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.mistake_count, 1);
        assert!(snapshot.locked);
        assert_eq!(snapshot.wrong_card, Some(2));

        let commands = session.take_timer_commands();
        let penalty = started_timer(&commands, TimerKind::PenaltyReset);
        assert_eq!(
            commands,
            [TimerCommand::Start {
                id: penalty,
                kind: TimerKind::PenaltyReset,
                after_ms: 1000
            }]
        );

        // input during the lock window is ignored
        assert_eq!(session.select_card(3), Ok(SelectOutcome::NoChange));
        assert_eq!(session.snapshot().mistake_count, 1);

        assert!(session.on_timer(penalty));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.expected_value, 1);
        assert!(!snapshot.locked);
        assert_eq!(snapshot.wrong_card, None);
        assert!(snapshot.cards.iter().all(Card::is_face_down));
        assert_eq!(snapshot.mistake_count, 1);

        // a second delivery of the same firing does nothing
        assert!(!session.on_timer(penalty));
    }

    #[test]
    fn new_round_cancels_pending_penalty() {
        let mut session = session();
        session.start_round_with_layout(layout(&[3, 1, 4, 2]));
        assert_eq!(session.select_card(0), Ok(SelectOutcome::Mistake));
        let old_ticker = session.armed_timer(TimerKind::Tick).unwrap();
        let penalty = session.armed_timer(TimerKind::PenaltyReset).unwrap();
        session.take_timer_commands();

        session.start_round_with_layout(layout(&[1, 2, 3, 4]));
        assert_eq!(session.select_card(0), Ok(SelectOutcome::Matched));

        let commands = session.take_timer_commands();
        assert!(commands.contains(&TimerCommand::Cancel(old_ticker)));
        assert!(commands.contains(&TimerCommand::Cancel(penalty)));

        assert!(!session.on_timer(penalty));
        assert!(!session.on_timer(old_ticker));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.expected_value, 2);
        assert_eq!(snapshot.mistake_count, 0);
        assert!(snapshot.cards[0].is_matched);
        assert_eq!(session.elapsed_seconds(), 0);
    }

    #[test]
    fn card_ids_are_fresh_per_round() {
        let mut session = session();
        session.start_round(2, 4).unwrap();
        let first = session.snapshot().cards[0].id;
        session.start_round(2, 4).unwrap();
        let second = session.snapshot().cards[0].id;

        assert_ne!(first, second);
        assert_eq!(first.slot, second.slot);
    }

    #[test]
    fn first_completion_sets_and_persists_best_score() {
        let mut session = session();
        session.start_round(2, 8).unwrap();

        finish_round(&mut session, 12);

        assert!(session.is_new_best_score());
        assert_eq!(session.best_score(), Some(BestScore::new(12, 0)));
        assert_eq!(session.store().load(), Ok(Some(BestScore::new(12, 0))));
    }

    #[test]
    fn best_score_ordering_applies_across_rounds() {
        let mut store = MemoryScoreStore::default();
        store.save(&BestScore::new(100, 2)).unwrap();
        let mut session = Session::new(SessionConfig::new(2), store);
        assert_eq!(session.best_score(), Some(BestScore::new(100, 2)));

        // tie on time with one mistake beats two
        session.start_round_with_layout(layout(&[1, 2, 3, 4]));
        assert_eq!(session.select_card(1), Ok(SelectOutcome::Mistake));
        let penalty = session.armed_timer(TimerKind::PenaltyReset).unwrap();
        session.on_timer(penalty);
        finish_round(&mut session, 100);
        assert!(session.is_new_best_score());
        assert_eq!(session.best_score(), Some(BestScore::new(100, 1)));

        // slower round leaves the record alone
        session.advance(3).unwrap();
        assert!(!session.is_new_best_score());
        finish_round(&mut session, 101);
        assert!(!session.is_new_best_score());
        assert_eq!(session.store().load(), Ok(Some(BestScore::new(100, 1))));
    }

    #[test]
    fn advance_grows_grid_only_after_round_over() {
        let mut session = session();
        assert_eq!(session.advance(0), Err(GameError::NotRoundOver));

        session.start_round(2, 1).unwrap();
        assert_eq!(session.advance(0), Err(GameError::NotRoundOver));

        finish_round(&mut session, 0);
        session.advance(2).unwrap();

        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.grid_size(), 3);
        assert_eq!(session.level(), 2);
        assert_eq!(session.elapsed_seconds(), 0);
        assert_eq!(session.snapshot().cards.len(), 9);
    }

    #[test]
    fn advance_at_largest_grid_repeats_largest_grid() {
        let mut session = session();
        let total = card_count(GridSize::MAX);
        let in_order: Vec<CardValue> = (1..=total).collect();
        session.start_round_with_layout(CardLayout::from_values(GridSize::MAX, &in_order).unwrap());

        for position in 0..total - 1 {
            assert_eq!(session.select_card(position), Ok(SelectOutcome::Matched));
        }
        assert_eq!(session.select_card(total - 1), Ok(SelectOutcome::Completed));
        assert_eq!(session.round().unwrap().matched_count(), total);
        assert_eq!(session.phase(), Phase::RoundOver);

        session.advance(2).unwrap();

        assert_eq!(session.grid_size(), GridSize::MAX);
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.round().unwrap().matched_count(), 0);
    }

    #[test]
    fn clock_keeps_running_while_board_is_locked() {
        let mut session = session();
        session.start_round_with_layout(layout(&[3, 1, 4, 2]));
        let ticker = session.armed_timer(TimerKind::Tick).unwrap();

        assert_eq!(session.select_card(0), Ok(SelectOutcome::Mistake));
        assert!(session.snapshot().locked);

        assert!(session.on_timer(ticker));
        assert_eq!(session.elapsed_seconds(), 1);
        assert!(session.snapshot().locked);
    }

    #[test]
    fn new_game_uses_configured_size() {
        let mut session = Session::new(SessionConfig::new(4), MemoryScoreStore::default());
        session.new_game(5);

        assert_eq!(session.grid_size(), 4);
        assert_eq!(session.phase(), Phase::Active);
    }

    #[test]
    fn unavailable_store_degrades_to_memory_only() {
        let mut session = Session::new(SessionConfig::new(2), NullStore);
        assert_eq!(session.best_score(), None);

        session.start_round(2, 6).unwrap();
        finish_round(&mut session, 7);

        assert!(session.is_new_best_score());
        assert_eq!(session.best_score(), Some(BestScore::new(7, 0)));
    }

    #[test]
    fn selection_after_round_over_is_ignored() {
        let mut session = session();
        session.start_round(2, 1).unwrap();
        finish_round(&mut session, 1);
        let before = session.snapshot();

        assert_eq!(session.select_card(0), Ok(SelectOutcome::NoChange));
        assert_eq!(session.select_card(9), Err(GameError::InvalidPosition));
        assert_eq!(session.snapshot(), before);
    }
}
