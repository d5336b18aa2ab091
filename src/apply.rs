//! Move application
//!
//! Mutates a `Position` for one chosen move or revival, decides whether the
//! mover keeps the turn for a combo, and renders a log line for the room feed.
//! Callers are expected to pass moves taken from a fresh `generate_moves` call.

use crate::board::{Board, Piece, PieceType, Position};
use crate::error::GameError;
use crate::movegen::{combo_moves, Move, MoveKind};
use crate::types::{Coord, Side};

/// What happens to the turn after a move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    /// Turn passes to the opponent
    EndTurn,
    /// Mover keeps the turn and must pick one of `moves` from `at` (or end the turn)
    Combo { at: Coord, moves: Vec<Move> },
}

/// Result of applying one move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub continuation: Continuation,
    pub log: String,
}

/// Apply `mv` for the stack at `origin`
pub fn apply_move(position: &mut Position, mover: Side, origin: Coord, mv: &Move) -> Applied {
    let moving = position.board.get_mut(origin).take();
    let log = describe_move(mover, &moving.composition(), origin, mv);
    let to = mv.to();

    if mv.kind.is_capturing() {
        for victim in &mv.victims {
            let removed = position.board.get_mut(*victim).take();
            for piece in removed.pieces() {
                position.supply.restore(piece);
            }
        }
        *position.scores.get_mut(mover) += mv.score;
    }

    match mv.kind {
        MoveKind::Move | MoveKind::Jump => position.board.set(to, moving),
        MoveKind::Stack | MoveKind::JumpStack => position.board.get_mut(to).append(moving),
        MoveKind::Sacrifice => {
            for piece in moving.pieces() {
                position.supply.restore(piece);
            }
        }
    }

    let continuation = match mv.kind {
        MoveKind::Move | MoveKind::Stack => Continuation::EndTurn,
        // The sacrifice landing is empty, so this never finds a follow-up.
        MoveKind::Jump | MoveKind::JumpStack | MoveKind::Sacrifice => {
            let moves = combo_moves(&position.board, to, mover);
            if moves.is_empty() {
                Continuation::EndTurn
            } else {
                Continuation::Combo { at: to, moves }
            }
        }
    };

    Applied { continuation, log }
}

/// Bring a piece back from `side`'s supply onto an empty inner cell
///
/// Returns the log line on success; nothing changes on error.
pub fn place_revival(
    position: &mut Position,
    side: Side,
    kind: PieceType,
    at: Coord,
) -> Result<String, GameError> {
    if !Board::in_bounds(at) {
        return Err(GameError::OutOfBounds(at));
    }
    if Board::is_afterlife(at) {
        return Err(GameError::AfterlifeCell(at));
    }
    if !position.board.get(at).is_empty() {
        return Err(GameError::CellOccupied(at));
    }
    if !position.supply.withdraw(side, kind) {
        return Err(GameError::SupplyExhausted(kind));
    }
    position.board.place(at, Piece::new(kind, side));
    Ok(format!("{} revives {} at {}", side, kind.letter(), at))
}

fn describe_move(mover: Side, composition: &str, from: Coord, mv: &Move) -> String {
    let outcome = if mv.kind.is_capturing() {
        format!("{} +{}", mv.kind.label(), mv.score)
    } else {
        mv.kind.label().to_string()
    };
    format!("{} {} {}->{} {}", mover, composition, from, mv.to(), outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::generate_moves;

    fn put(position: &mut Position, r: usize, c: usize, kind: PieceType, owner: Side) {
        assert!(position.supply.withdraw(owner, kind));
        position.board.place(Coord::new(r, c), Piece::new(kind, owner));
    }

    fn pick(position: &Position, origin: Coord, mover: Side, to: Coord) -> Move {
        generate_moves(&position.board, origin, mover, false)
            .into_iter()
            .find(|m| m.to() == to)
            .expect("move should be generated")
    }

    fn assert_conserved(position: &Position) {
        for side in Side::BOTH {
            for kind in PieceType::ALL {
                assert_eq!(position.accounted(side, kind), kind.max_supply());
            }
        }
    }

    #[test]
    fn test_jump_captures_and_returns_to_owner() {
        let mut position = Position::new();
        put(&mut position, 3, 3, PieceType::Medium, Side::One);
        put(&mut position, 3, 4, PieceType::Small, Side::Two);

        let mv = pick(&position, Coord::new(3, 3), Side::One, Coord::new(3, 5));
        let applied = apply_move(&mut position, Side::One, Coord::new(3, 3), &mv);

        assert!(position.board.get(Coord::new(3, 3)).is_empty());
        assert!(position.board.get(Coord::new(3, 4)).is_empty());
        assert_eq!(position.board.get(Coord::new(3, 5)).composition(), "M");
        assert_eq!(position.scores.one, 1);
        assert_eq!(position.scores.two, 0);
        assert_eq!(position.supply.two.small, 5);
        assert_eq!(position.supply.one.small, 5);
        assert_eq!(applied.continuation, Continuation::EndTurn);
        assert_eq!(applied.log, "P1 M (3,3)->(3,5) jump +1");
        assert_conserved(&position);
    }

    #[test]
    fn test_jump_enters_combo_when_capture_follows() {
        let mut position = Position::new();
        put(&mut position, 1, 1, PieceType::Large, Side::One);
        put(&mut position, 1, 2, PieceType::Small, Side::Two);
        put(&mut position, 2, 3, PieceType::Small, Side::Two);

        let mv = pick(&position, Coord::new(1, 1), Side::One, Coord::new(1, 3));
        let applied = apply_move(&mut position, Side::One, Coord::new(1, 1), &mv);

        match applied.continuation {
            Continuation::Combo { at, moves } => {
                assert_eq!(at, Coord::new(1, 3));
                assert!(moves.iter().any(|m| m.to() == Coord::new(3, 3)));
                assert!(moves.iter().all(Move::captures));
            }
            other => panic!("expected combo, got {:?}", other),
        }
        assert_conserved(&position);
    }

    #[test]
    fn test_sacrifice_returns_mover_and_ends_turn() {
        let mut position = Position::new();
        put(&mut position, 3, 4, PieceType::Medium, Side::One);
        put(&mut position, 3, 5, PieceType::Small, Side::Two);

        let mv = pick(&position, Coord::new(3, 4), Side::One, Coord::new(3, 6));
        assert_eq!(mv.kind, MoveKind::Sacrifice);
        let applied = apply_move(&mut position, Side::One, Coord::new(3, 4), &mv);

        assert!(position.board.get(Coord::new(3, 6)).is_empty());
        assert_eq!(position.supply.one.medium, 4);
        assert_eq!(position.supply.two.small, 5);
        assert_eq!(position.scores.one, 1);
        assert_eq!(applied.continuation, Continuation::EndTurn);
        assert_conserved(&position);
    }

    #[test]
    fn test_stack_appends_and_ends_turn() {
        let mut position = Position::new();
        put(&mut position, 3, 3, PieceType::Small, Side::Two);
        put(&mut position, 3, 4, PieceType::Large, Side::Two);

        let mv = pick(&position, Coord::new(3, 3), Side::Two, Coord::new(3, 4));
        assert_eq!(mv.kind, MoveKind::Stack);
        let applied = apply_move(&mut position, Side::Two, Coord::new(3, 3), &mv);

        assert_eq!(position.board.get(Coord::new(3, 4)).composition(), "L+S");
        assert_eq!(applied.continuation, Continuation::EndTurn);
        assert_eq!(applied.log, "P2 S (3,3)->(3,4) stack");
    }

    #[test]
    fn test_jump_stack_merges_captures() {
        let mut position = Position::new();
        put(&mut position, 2, 2, PieceType::Small, Side::One);
        put(&mut position, 2, 3, PieceType::Medium, Side::Two);
        put(&mut position, 2, 4, PieceType::Large, Side::One);
        // Mover value 1 cannot cross the value-2 Medium.
        assert!(generate_moves(&position.board, Coord::new(2, 2), Side::One, false)
            .iter()
            .all(|m| m.to() != Coord::new(2, 4)));

        let mut position = Position::new();
        put(&mut position, 2, 2, PieceType::Medium, Side::One);
        put(&mut position, 2, 3, PieceType::Small, Side::Two);
        put(&mut position, 2, 4, PieceType::Large, Side::One);
        let mv = pick(&position, Coord::new(2, 2), Side::One, Coord::new(2, 4));
        assert_eq!(mv.kind, MoveKind::JumpStack);
        apply_move(&mut position, Side::One, Coord::new(2, 2), &mv);

        assert_eq!(position.board.get(Coord::new(2, 4)).composition(), "L+M");
        assert_eq!(position.scores.one, 1);
        assert_conserved(&position);
    }

    #[test]
    fn test_revival_rules() {
        let mut position = Position::new();
        assert_eq!(
            place_revival(&mut position, Side::One, PieceType::Small, Coord::new(0, 2)),
            Err(GameError::AfterlifeCell(Coord::new(0, 2)))
        );
        let log = place_revival(&mut position, Side::One, PieceType::Large, Coord::new(2, 2))
            .expect("empty inner cell");
        assert_eq!(log, "P1 revives L at (2,2)");
        assert_eq!(position.supply.one.large, 0);
        assert_eq!(
            place_revival(&mut position, Side::Two, PieceType::Small, Coord::new(2, 2)),
            Err(GameError::CellOccupied(Coord::new(2, 2)))
        );
        assert_eq!(
            place_revival(&mut position, Side::One, PieceType::Large, Coord::new(3, 3)),
            Err(GameError::SupplyExhausted(PieceType::Large))
        );
        assert_conserved(&position);
    }
}
