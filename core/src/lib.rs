#![no_std]

extern crate alloc;

use alloc::vec;
use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use card::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use score::*;
pub use session::*;
pub use timer::*;
pub use types::*;

mod card;
mod engine;
mod error;
mod generator;
mod score;
mod session;
mod timer;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub starting_grid_size: GridSize,
    pub tick_interval_ms: u32,
    pub penalty_delay_ms: u32,
}

impl SessionConfig {
    pub const DEFAULT_GRID_SIZE: GridSize = 3;
    pub const ONE_SECOND_MS: u32 = 1_000;

    pub const fn new_unchecked(
        starting_grid_size: GridSize,
        tick_interval_ms: u32,
        penalty_delay_ms: u32,
    ) -> Self {
        Self {
            starting_grid_size,
            tick_interval_ms,
            penalty_delay_ms,
        }
    }

    pub fn new(starting_grid_size: GridSize) -> Self {
        Self::new_unchecked(
            starting_grid_size.max(MIN_GRID_SIZE),
            Self::ONE_SECOND_MS,
            Self::ONE_SECOND_MS,
        )
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_GRID_SIZE)
    }
}

/// Board position → card value assignment for one round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardLayout {
    values: Array2<CardValue>,
}

impl CardLayout {
    /// Builds a layout from values listed in board order, checking they are exactly `1..=N²`.
    pub fn from_values(grid_size: GridSize, values: &[CardValue]) -> Result<Self> {
        if !is_valid_grid_size(grid_size) {
            return Err(GameError::InvalidGridSize);
        }

        let total = card_count(grid_size);
        if values.len() != usize::from(total) {
            return Err(GameError::InvalidLayout);
        }

        let mut seen = vec![false; values.len()];
        for &value in values {
            if value == 0 || value > total {
                return Err(GameError::InvalidLayout);
            }
            let slot = &mut seen[usize::from(value - 1)];
            if *slot {
                return Err(GameError::InvalidLayout);
            }
            *slot = true;
        }

        Ok(Self::from_permutation(grid_size, values))
    }

    pub(crate) fn from_permutation(grid_size: GridSize, values: &[CardValue]) -> Self {
        let size = usize::from(grid_size);
        let values = Array2::from_shape_fn((size, size), |(row, col)| values[row * size + col]);
        Self { values }
    }

    pub fn grid_size(&self) -> GridSize {
        self.values.nrows().try_into().unwrap_or(GridSize::MAX)
    }

    pub fn card_count(&self) -> CardValue {
        card_count(self.grid_size())
    }

    pub fn validate_position(&self, position: Position) -> Result<Position> {
        if position < self.card_count() {
            Ok(position)
        } else {
            Err(GameError::InvalidPosition)
        }
    }

    /// Values in board order.
    pub fn values(&self) -> impl Iterator<Item = CardValue> + '_ {
        self.values.iter().copied()
    }

    /// Where a given value sits on the board.
    pub fn position_of(&self, value: CardValue) -> Option<Position> {
        self.values()
            .position(|v| v == value)
            .and_then(|pos| pos.try_into().ok())
    }
}

impl Index<Position> for CardLayout {
    type Output = CardValue;

    fn index(&self, position: Position) -> &Self::Output {
        &self.values[position.to_nd_index(self.grid_size())]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    NoChange,
    Matched,
    Completed,
    Mistake,
}

impl SelectOutcome {
    pub const fn has_update(self) -> bool {
        use SelectOutcome::*;
        match self {
            NoChange => false,
            Matched => true,
            Completed => true,
            Mistake => true,
        }
    }

    pub const fn is_completion(self) -> bool {
        matches!(self, Self::Completed)
    }
}
