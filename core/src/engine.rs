use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// One round of the ordering puzzle.
///
/// Cards must be selected in ascending value order. A wrong pick locks the board until
/// [`RoundState::reset_after_mistake`] turns every card face down again and the sequence restarts at 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    round_id: RoundId,
    layout: CardLayout,
    cards: Vec<Card>,
    expected_value: CardValue,
    locked: bool,
    mistake_count: u32,
    wrong_card: Option<Position>,
}

impl RoundState {
    pub fn new(round_id: RoundId, layout: CardLayout) -> Self {
        let cards = layout
            .values()
            .zip(0..)
            .map(|(value, slot)| Card::new(CardId { round: round_id, slot }, value))
            .collect();

        Self {
            round_id,
            layout,
            cards,
            expected_value: 1,
            locked: false,
            mistake_count: 0,
            wrong_card: None,
        }
    }

    /// Deals a freshly shuffled round of `grid_size`² cards.
    pub fn new_round(round_id: RoundId, grid_size: GridSize, seed: u64) -> Self {
        Self::new(round_id, ShuffleGenerator::new(seed).generate(grid_size))
    }

    pub fn round_id(&self) -> RoundId {
        self.round_id
    }

    pub fn grid_size(&self) -> GridSize {
        self.layout.grid_size()
    }

    pub fn layout(&self) -> &CardLayout {
        &self.layout
    }

    /// Cards in board order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card_at(&self, position: Position) -> Result<&Card> {
        let position = self.layout.validate_position(position)?;
        Ok(&self.cards[usize::from(position)])
    }

    pub fn expected_value(&self) -> CardValue {
        self.expected_value
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn mistake_count(&self) -> u32 {
        self.mistake_count
    }

    pub fn wrong_card(&self) -> Option<Position> {
        self.wrong_card
    }

    pub fn matched_count(&self) -> CardValue {
        self.expected_value - 1
    }

    pub fn is_complete(&self) -> bool {
        self.expected_value > self.layout.card_count()
    }

    /// Whether a selection at `position` would change anything right now.
    pub fn can_select(&self, position: Position) -> bool {
        !self.locked
            && !self.is_complete()
            && self
                .card_at(position)
                .is_ok_and(|card| card.is_face_down())
    }

    pub fn select_card(&mut self, position: Position) -> Result<SelectOutcome> {
        let position = self.layout.validate_position(position)?;
        let index = usize::from(position);

        if self.locked || !self.cards[index].is_face_down() {
            return Ok(SelectOutcome::NoChange);
        }

        if self.cards[index].value == self.expected_value {
            self.cards[index].mark_matched();
            self.expected_value += 1;

            if self.is_complete() {
                log::debug!("round {:?} complete", self.round_id);
                Ok(SelectOutcome::Completed)
            } else {
                Ok(SelectOutcome::Matched)
            }
        } else {
            self.mistake_count = self.mistake_count.saturating_add(1);
            self.locked = true;
            self.wrong_card = Some(position);
            log::debug!(
                "wrong card at {}: expected {}, got {}",
                position,
                self.expected_value,
                self.cards[index].value
            );
            Ok(SelectOutcome::Mistake)
        }
    }

    /// Ends the lock window: all progress is discarded and the sequence restarts at 1.
    pub fn reset_after_mistake(&mut self) -> bool {
        if !self.locked {
            return false;
        }

        for card in &mut self.cards {
            card.turn_face_down();
        }
        self.wrong_card = None;
        self.expected_value = 1;
        self.locked = false;
        true
    }
}
