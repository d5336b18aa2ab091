//! Legal move generation
//!
//! For a selected stack, walks the four orthogonal directions and collects
//! every destination the stack may reach: simple steps and stacking onto an
//! adjacent friend, plus ray jumps that cross other stacks, capture enemy
//! stacks on the way and may land on the afterlife ring or on a friendly stack.

use serde::Serialize;

use crate::board::{Board, Stack, BOARD_SIZE};
use crate::types::{Coord, Side};

/// Up, down, left, right
const DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// What a move does when applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoveKind {
    /// Step to an adjacent empty cell
    Move,
    /// Step onto an adjacent friendly stack
    Stack,
    /// Ray jump to an empty cell inside the ring
    Jump,
    /// Ray jump to an empty afterlife cell; the moving stack is destroyed
    Sacrifice,
    /// Ray jump onto a friendly stack
    JumpStack,
}

impl MoveKind {
    /// Kinds produced by the ray walk, which score and remove crossed enemies
    pub fn is_capturing(self) -> bool {
        matches!(self, MoveKind::Jump | MoveKind::Sacrifice | MoveKind::JumpStack)
    }

    pub fn label(self) -> &'static str {
        match self {
            MoveKind::Move => "move",
            MoveKind::Stack => "stack",
            MoveKind::Jump => "jump",
            MoveKind::Sacrifice => "sacrifice",
            MoveKind::JumpStack => "jump-stack",
        }
    }
}

/// One candidate destination for the selected stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Move {
    pub r: usize,
    pub c: usize,
    pub kind: MoveKind,
    /// Total value of enemy stacks crossed
    pub score: u32,
    /// Enemy stacks crossed, removed when the move is applied
    pub victims: Vec<Coord>,
}

impl Move {
    fn step(to: Coord, kind: MoveKind) -> Self {
        Self {
            r: to.r,
            c: to.c,
            kind,
            score: 0,
            victims: Vec::new(),
        }
    }

    pub fn to(&self) -> Coord {
        Coord::new(self.r, self.c)
    }

    /// Whether applying this move removes at least one enemy stack
    pub fn captures(&self) -> bool {
        self.kind.is_capturing() && !self.victims.is_empty()
    }
}

/// Running totals while walking one ray
#[derive(Debug, Default)]
struct RayWalk {
    jumped: u32,
    enemy_score: u32,
    victims: Vec<Coord>,
    seen_vacancy: bool,
}

impl RayWalk {
    fn cross(&mut self, at: Coord, stack: &Stack, mover: Side) {
        let value = stack.value();
        self.jumped += value;
        if !stack.is_controlled_by(mover) {
            self.enemy_score += value;
            self.victims.push(at);
        }
    }

    fn landing(&self, at: Coord, kind: MoveKind) -> Move {
        Move {
            r: at.r,
            c: at.c,
            kind,
            score: self.enemy_score,
            victims: self.victims.clone(),
        }
    }
}

/// Generate every legal move for the stack at `origin`
///
/// Returns nothing when the origin is empty or not controlled by `mover`.
/// In combo mode simple steps and plain stacking are not offered.
pub fn generate_moves(board: &Board, origin: Coord, mover: Side, combo: bool) -> Vec<Move> {
    let stack = board.get(origin);
    if !stack.is_controlled_by(mover) {
        return Vec::new();
    }

    let mut moves = Vec::new();
    for (dr, dc) in DIRECTIONS {
        if !combo {
            if let Some(step) = simple_step(board, origin, stack, mover, dr, dc) {
                moves.push(step);
            }
        }
        walk_ray(board, origin, stack, mover, dr, dc, &mut moves);
    }
    moves
}

/// Moves that may continue a combo from `origin`
///
/// A continuation must take at least one enemy stack; capturing kinds that
/// jump nothing (empty slides, bare sacrifices) are left out.
pub fn combo_moves(board: &Board, origin: Coord, mover: Side) -> Vec<Move> {
    generate_moves(board, origin, mover, true)
        .into_iter()
        .filter(Move::captures)
        .collect()
}

fn simple_step(
    board: &Board,
    origin: Coord,
    mover_stack: &Stack,
    mover: Side,
    dr: isize,
    dc: isize,
) -> Option<Move> {
    let to = origin.offset(dr, dc, 1, BOARD_SIZE)?;
    if Board::is_afterlife(to) {
        return None;
    }
    let target = board.get(to);
    if target.is_empty() {
        Some(Move::step(to, MoveKind::Move))
    } else if target.is_controlled_by(mover) && target.accepts(mover_stack) {
        Some(Move::step(to, MoveKind::Stack))
    } else {
        None
    }
}

fn walk_ray(
    board: &Board,
    origin: Coord,
    mover_stack: &Stack,
    mover: Side,
    dr: isize,
    dc: isize,
    moves: &mut Vec<Move>,
) {
    let mover_value = mover_stack.value();
    let mut walk = RayWalk::default();

    for distance in 1..BOARD_SIZE {
        let Some(at) = origin.offset(dr, dc, distance, BOARD_SIZE) else {
            break;
        };
        let cell = board.get(at);
        let gate_open = mover_value >= walk.jumped;

        if distance > 1 && gate_open {
            if cell.is_empty() {
                let kind = if Board::is_afterlife(at) {
                    MoveKind::Sacrifice
                } else {
                    MoveKind::Jump
                };
                moves.push(walk.landing(at, kind));
            } else if cell.is_controlled_by(mover) && cell.accepts(mover_stack) {
                moves.push(walk.landing(at, MoveKind::JumpStack));
            }
        }

        if cell.is_empty() {
            walk.seen_vacancy = true;
            continue;
        }
        if walk.seen_vacancy {
            break;
        }
        walk.cross(at, cell, mover);
        if walk.jumped > mover_value {
            break;
        }
    }
}
