use alloc::vec::Vec;
use rand::prelude::*;

use super::*;

/// Produces the values `1..=N²` in uniformly random order.
///
/// Fisher–Yates: walk from the last index down to 1, swapping each slot with a uniformly chosen slot at or before it.
pub fn shuffled_values<R: Rng + ?Sized>(grid_size: GridSize, rng: &mut R) -> Vec<CardValue> {
    let mut values: Vec<CardValue> = (1..=card_count(grid_size)).collect();
    for i in (1..values.len()).rev() {
        let j = rng.random_range(0..=i);
        values.swap(i, j);
    }
    values
}

/// Seeded shuffle, the same seed always deals the same board.
#[derive(Clone, Debug, PartialEq)]
pub struct ShuffleGenerator {
    seed: u64,
}

impl ShuffleGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl LayoutGenerator for ShuffleGenerator {
    fn generate(self, grid_size: GridSize) -> CardLayout {
        let grid_size = if is_valid_grid_size(grid_size) {
            grid_size
        } else {
            log::warn!(
                "Grid size {} is too small, using {} instead",
                grid_size,
                MIN_GRID_SIZE
            );
            MIN_GRID_SIZE
        };

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let values = shuffled_values(grid_size, &mut rng);
        CardLayout::from_permutation(grid_size, &values)
    }
}
