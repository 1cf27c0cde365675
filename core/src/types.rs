/// Side length of the square board.
pub type GridSize = u8;

/// Face value printed on a card, also used for card counts.
pub type CardValue = u16;

/// Row-major board position, `row * grid_size + col`.
pub type Position = u16;

/// Smallest board that still makes an ordering puzzle.
pub const MIN_GRID_SIZE: GridSize = 2;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self, grid_size: GridSize) -> Self::Output;
}

impl ToNdIndex for Position {
    type Output = [usize; 2];

    fn to_nd_index(self, grid_size: GridSize) -> Self::Output {
        let size = usize::from(grid_size);
        let position = usize::from(self);
        [position / size, position % size]
    }
}

/// Number of cards on a board of the given size.
pub const fn card_count(grid_size: GridSize) -> CardValue {
    let size = grid_size as CardValue;
    size.saturating_mul(size)
}

pub const fn is_valid_grid_size(grid_size: GridSize) -> bool {
    grid_size >= MIN_GRID_SIZE
}
