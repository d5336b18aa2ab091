//! Board and piece model
//!
//! Pure data: pieces, stacks, the 7×7 board and per-side piece supply.
//! Game rules live in `movegen`, `apply` and `session`.

use serde::{Deserialize, Serialize};

use crate::types::{Coord, Side};

/// Board edge length
pub const BOARD_SIZE: usize = 7;

/// Piece size, which fixes its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    Large,
    Medium,
    Small,
}

impl PieceType {
    pub const ALL: [PieceType; 3] = [PieceType::Large, PieceType::Medium, PieceType::Small];

    pub fn value(self) -> u32 {
        match self {
            PieceType::Large => 3,
            PieceType::Medium => 2,
            PieceType::Small => 1,
        }
    }

    /// Number of pieces of this type each side owns in total
    pub fn max_supply(self) -> u32 {
        match self {
            PieceType::Large => 1,
            PieceType::Medium => 4,
            PieceType::Small => 5,
        }
    }

    pub fn letter(self) -> char {
        match self {
            PieceType::Large => 'L',
            PieceType::Medium => 'M',
            PieceType::Small => 'S',
        }
    }
}

/// A single piece on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Piece {
    #[serde(rename = "type")]
    pub kind: PieceType,
    pub value: u32,
    pub owner: Side,
}

impl Piece {
    pub fn new(kind: PieceType, owner: Side) -> Self {
        Self {
            kind,
            value: kind.value(),
            owner,
        }
    }
}

/// Pieces occupying one cell, bottom to top
///
/// The bottom piece decides who controls the stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Stack {
    pieces: Vec<Piece>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(piece: Piece) -> Self {
        Self {
            pieces: vec![piece],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Owner of the bottom piece
    pub fn controller(&self) -> Option<Side> {
        self.pieces.first().map(|p| p.owner)
    }

    pub fn bottom_value(&self) -> u32 {
        self.pieces.first().map_or(0, |p| p.value)
    }

    pub fn top_value(&self) -> u32 {
        self.pieces.last().map_or(0, |p| p.value)
    }

    /// Sum of all piece values
    pub fn value(&self) -> u32 {
        self.pieces.iter().map(|p| p.value).sum()
    }

    pub fn is_controlled_by(&self, side: Side) -> bool {
        self.controller() == Some(side)
    }

    /// Whether `mover` may be placed on top of this stack
    ///
    /// Only a taller top accepts the mover's bottom piece.
    pub fn accepts(&self, mover: &Stack) -> bool {
        !self.is_empty() && !mover.is_empty() && mover.bottom_value() < self.top_value()
    }

    /// Put `other` on top of this stack
    pub fn append(&mut self, other: Stack) {
        self.pieces.extend(other.pieces);
    }

    /// Remove and return every piece, leaving the cell empty
    pub fn take(&mut self) -> Stack {
        std::mem::take(self)
    }

    /// Compact composition label, e.g. `M+S`
    pub fn composition(&self) -> String {
        self.pieces
            .iter()
            .map(|p| p.kind.letter().to_string())
            .collect::<Vec<_>>()
            .join("+")
    }
}

/// The 7×7 grid of stacks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Stack; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells on the outer ring, where jumping pieces are sacrificed
    pub fn is_afterlife(coord: Coord) -> bool {
        coord.r == 0 || coord.c == 0 || coord.r == BOARD_SIZE - 1 || coord.c == BOARD_SIZE - 1
    }

    pub fn in_bounds(coord: Coord) -> bool {
        coord.r < BOARD_SIZE && coord.c < BOARD_SIZE
    }

    pub fn get(&self, coord: Coord) -> &Stack {
        &self.cells[coord.r][coord.c]
    }

    pub fn get_mut(&mut self, coord: Coord) -> &mut Stack {
        &mut self.cells[coord.r][coord.c]
    }

    pub fn set(&mut self, coord: Coord, stack: Stack) {
        self.cells[coord.r][coord.c] = stack;
    }

    pub fn place(&mut self, coord: Coord, piece: Piece) {
        self.get_mut(coord).append(Stack::single(piece));
    }

    /// Occupied cells in row-major order
    pub fn occupied(&self) -> impl Iterator<Item = (Coord, &Stack)> {
        self.cells.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, stack)| !stack.is_empty())
                .map(move |(c, stack)| (Coord::new(r, c), stack))
        })
    }

    /// Number of `side`'s pieces of `kind` anywhere on the board
    pub fn count_pieces(&self, side: Side, kind: PieceType) -> u32 {
        self.occupied()
            .flat_map(|(_, stack)| stack.pieces())
            .filter(|p| p.owner == side && p.kind == kind)
            .count() as u32
    }
}

/// A value held once per side, serialized as `{"1": .., "2": ..}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PerSide<T> {
    #[serde(rename = "1")]
    pub one: T,
    #[serde(rename = "2")]
    pub two: T,
}

impl<T> PerSide<T> {
    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::One => &self.one,
            Side::Two => &self.two,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::One => &mut self.one,
            Side::Two => &mut self.two,
        }
    }
}

/// Pieces of each type a side can still revive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SupplyCounts {
    pub large: u32,
    pub medium: u32,
    pub small: u32,
}

impl SupplyCounts {
    pub fn full() -> Self {
        Self {
            large: PieceType::Large.max_supply(),
            medium: PieceType::Medium.max_supply(),
            small: PieceType::Small.max_supply(),
        }
    }

    pub fn get(&self, kind: PieceType) -> u32 {
        match kind {
            PieceType::Large => self.large,
            PieceType::Medium => self.medium,
            PieceType::Small => self.small,
        }
    }

    fn slot(&mut self, kind: PieceType) -> &mut u32 {
        match kind {
            PieceType::Large => &mut self.large,
            PieceType::Medium => &mut self.medium,
            PieceType::Small => &mut self.small,
        }
    }
}

impl Default for SupplyCounts {
    fn default() -> Self {
        Self::full()
    }
}

/// Off-board pieces for both sides
pub type Supply = PerSide<SupplyCounts>;

impl Supply {
    /// Take one piece out of `side`'s supply; false when none are left
    pub fn withdraw(&mut self, side: Side, kind: PieceType) -> bool {
        let slot = self.get_mut(side).slot(kind);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    /// Return a piece to its owner's supply, never above the type's maximum
    pub fn restore(&mut self, piece: &Piece) {
        let slot = self.get_mut(piece.owner).slot(piece.kind);
        *slot = (*slot + 1).min(piece.kind.max_supply());
    }
}

/// Points collected by each side
pub type Scores = PerSide<u32>;

/// Everything the rules mutate: board, supply and scores
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Position {
    pub board: Board,
    pub supply: Supply,
    pub scores: Scores,
}

impl Position {
    /// Empty board with both supplies full
    pub fn new() -> Self {
        Self::default()
    }

    /// Pieces of `side` and `kind` on the board plus in supply
    pub fn accounted(&self, side: Side, kind: PieceType) -> u32 {
        self.board.count_pieces(side, kind) + self.supply.get(side).get(kind)
    }
}
