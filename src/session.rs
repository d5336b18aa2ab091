//! Game session state machine
//!
//! One `GameSession` per room. Every client intent arrives as a `GameAction`
//! and is validated against the server-held position before anything changes.

use serde::{Deserialize, Serialize};

use crate::apply::{apply_move, place_revival, Continuation};
use crate::board::{Board, PieceType, Position, Scores, Supply};
use crate::error::GameError;
use crate::movegen::{combo_moves, generate_moves, Move};
use crate::types::{Coord, Side};

/// Score that ends the game
pub const WIN_SCORE: u32 = 8;

/// Discrete player intents
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameAction {
    /// Select (or deselect) a stack of the side to move
    SelectCell { r: usize, c: usize },
    /// Move the selected stack to one of its legal destinations
    PerformMove { r: usize, c: usize },
    /// Pick a supply piece to revive
    #[serde(rename_all = "camelCase")]
    ReviveSelect { piece_type: PieceType },
    /// Place the picked supply piece
    #[serde(rename_all = "camelCase")]
    RevivePlace {
        r: usize,
        c: usize,
        #[serde(default)]
        piece_type: Option<PieceType>,
    },
    /// Stop extending a jump combo
    EndTurn,
}

/// Coarse session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    AwaitingSelection,
    ComboWait,
    GameOver,
}

/// Result of an accepted action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Feed line for moves and revivals
    pub log: Option<String>,
}

/// Full state sent to clients after every accepted action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub board: Board,
    pub scores: Scores,
    pub supply: Supply,
    pub turn: Side,
    pub selected: Option<Coord>,
    pub revive_type: Option<PieceType>,
    pub valid_moves: Vec<Move>,
    pub combo_mode: bool,
    pub phase: Phase,
    pub game_over: bool,
    pub winner: Option<Side>,
}

/// Authoritative state of one game
#[derive(Debug, Clone)]
pub struct GameSession {
    position: Position,
    turn: Side,
    selected: Option<Coord>,
    valid_moves: Vec<Move>,
    revive_type: Option<PieceType>,
    combo: bool,
    winner: Option<Side>,
}

impl GameSession {
    /// Fresh game: empty board, full supplies, side 1 to move
    pub fn new() -> Self {
        Self::with_position(Position::new(), Side::One)
    }

    /// Start from an arbitrary position
    pub fn with_position(position: Position, turn: Side) -> Self {
        Self {
            position,
            turn,
            selected: None,
            valid_moves: Vec::new(),
            revive_type: None,
            combo: false,
            winner: None,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn phase(&self) -> Phase {
        if self.winner.is_some() {
            Phase::GameOver
        } else if self.combo {
            Phase::ComboWait
        } else {
            Phase::AwaitingSelection
        }
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            board: self.position.board.clone(),
            scores: self.position.scores,
            supply: self.position.supply,
            turn: self.turn,
            selected: self.selected,
            revive_type: self.revive_type,
            valid_moves: self.valid_moves.clone(),
            combo_mode: self.combo,
            phase: self.phase(),
            game_over: self.is_over(),
            winner: self.winner,
        }
    }

    /// Apply one action for the side to move
    ///
    /// Turn ownership is checked by the caller; on error nothing changes.
    pub fn apply(&mut self, action: GameAction) -> Result<ActionOutcome, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }

        let outcome = match action {
            GameAction::SelectCell { r, c } => self.select_cell(Coord::new(r, c))?,
            GameAction::PerformMove { r, c } => self.perform_move(Coord::new(r, c))?,
            GameAction::ReviveSelect { piece_type } => self.revive_select(piece_type)?,
            GameAction::RevivePlace { r, c, piece_type } => {
                self.revive_place(Coord::new(r, c), piece_type)?
            }
            GameAction::EndTurn => {
                if !self.combo {
                    return Err(GameError::NotInCombo);
                }
                self.end_turn();
                ActionOutcome::default()
            }
        };

        self.check_winner();
        Ok(outcome)
    }

    fn select_cell(&mut self, at: Coord) -> Result<ActionOutcome, GameError> {
        if self.combo {
            return Err(GameError::ComboInProgress);
        }
        if !Board::in_bounds(at) {
            return Err(GameError::OutOfBounds(at));
        }
        if self.selected == Some(at) {
            self.clear_selection();
            return Ok(ActionOutcome::default());
        }
        if !self.position.board.get(at).is_controlled_by(self.turn) {
            return Err(GameError::NotOwnStack(at));
        }

        self.revive_type = None;
        self.selected = Some(at);
        self.valid_moves = generate_moves(&self.position.board, at, self.turn, false);
        Ok(ActionOutcome::default())
    }

    fn perform_move(&mut self, to: Coord) -> Result<ActionOutcome, GameError> {
        let origin = self.selected.ok_or(GameError::NoSelection)?;
        let legal = if self.combo {
            combo_moves(&self.position.board, origin, self.turn)
        } else {
            generate_moves(&self.position.board, origin, self.turn, false)
        };
        let chosen = legal
            .into_iter()
            .find(|m| m.to() == to)
            .ok_or(GameError::IllegalMove(to))?;

        let applied = apply_move(&mut self.position, self.turn, origin, &chosen);
        match applied.continuation {
            Continuation::EndTurn => self.end_turn(),
            Continuation::Combo { at, moves } => {
                self.selected = Some(at);
                self.valid_moves = moves;
                self.combo = true;
            }
        }
        Ok(ActionOutcome {
            log: Some(applied.log),
        })
    }

    fn revive_select(&mut self, kind: PieceType) -> Result<ActionOutcome, GameError> {
        if self.combo {
            return Err(GameError::ComboInProgress);
        }
        if self.revive_type == Some(kind) {
            self.revive_type = None;
            return Ok(ActionOutcome::default());
        }
        if self.position.supply.get(self.turn).get(kind) == 0 {
            return Err(GameError::SupplyExhausted(kind));
        }
        self.clear_selection();
        self.revive_type = Some(kind);
        Ok(ActionOutcome::default())
    }

    fn revive_place(
        &mut self,
        at: Coord,
        requested: Option<PieceType>,
    ) -> Result<ActionOutcome, GameError> {
        if self.combo {
            return Err(GameError::ComboInProgress);
        }
        let kind = requested
            .or(self.revive_type)
            .ok_or(GameError::NoReviveSelected)?;
        let log = place_revival(&mut self.position, self.turn, kind, at)?;
        self.end_turn();
        Ok(ActionOutcome { log: Some(log) })
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.valid_moves.clear();
    }

    fn end_turn(&mut self) {
        self.clear_selection();
        self.revive_type = None;
        self.combo = false;
        self.turn = self.turn.opponent();
    }

    fn check_winner(&mut self) {
        let winner = Side::BOTH
            .into_iter()
            .find(|side| *self.position.scores.get(*side) >= WIN_SCORE);
        if let Some(side) = winner {
            self.winner = Some(side);
            self.clear_selection();
            self.revive_type = None;
            self.combo = false;
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
