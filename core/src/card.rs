use serde::{Deserialize, Serialize};

use crate::*;

/// Identifies a round within a session. Every new round gets a fresh one.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoundId(pub u32);

impl RoundId {
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Stable card identity, never shared between rounds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId {
    pub round: RoundId,
    pub slot: Position,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub value: CardValue,
    pub is_revealed: bool,
    pub is_matched: bool,
}

impl Card {
    pub const fn new(id: CardId, value: CardValue) -> Self {
        Self {
            id,
            value,
            is_revealed: false,
            is_matched: false,
        }
    }

    /// Whether the card still accepts a selection.
    pub const fn is_face_down(&self) -> bool {
        !self.is_revealed && !self.is_matched
    }

    pub(crate) fn mark_matched(&mut self) {
        self.is_revealed = true;
        self.is_matched = true;
    }

    pub(crate) fn turn_face_down(&mut self) {
        self.is_revealed = false;
        self.is_matched = false;
    }
}
