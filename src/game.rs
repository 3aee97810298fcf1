//! Shot resolution and win detection over a single board.

use crate::board::{Board, Cell};
use crate::common::ShotOutcome;
use crate::config::BOARD_SIZE;

/// Current status of a game from one player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

/// Evaluate a game from the owner of `mine`.
pub fn status(mine: &Board, theirs: &Board) -> GameStatus {
    if all_sunk(mine) {
        GameStatus::Lost
    } else if all_sunk(theirs) {
        GameStatus::Won
    } else {
        GameStatus::InProgress
    }
}

/// Fire at `(x, y)` on `board`. Water and already-hit cells are a miss and
/// leave the board untouched; an intact ship cell becomes `HitShip`.
///
/// Callers must pass on-board coordinates; anything else is a miss.
pub fn resolve_shot(board: &mut Board, x: usize, y: usize) -> ShotOutcome {
    if board.get(x, y) != Some(Cell::Ship) {
        return ShotOutcome::Miss;
    }
    board.set(x, y, Cell::HitShip);
    if is_sunk(board, x, y) {
        ShotOutcome::Kill
    } else {
        ShotOutcome::Damage
    }
}

/// `true` when the ship through `(x, y)` has no intact cells left.
///
/// Walks outward along both axes over hit cells; reaching an intact ship
/// cell before water or the edge means the ship is still afloat. A valid
/// fleet has no bent ships, so only one axis ever contributes cells.
pub fn is_sunk(board: &Board, x: usize, y: usize) -> bool {
    const DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
    DIRECTIONS.iter().all(|&(dx, dy)| {
        let (mut cx, mut cy) = (x as isize, y as isize);
        loop {
            cx += dx;
            cy += dy;
            if cx < 0 || cy < 0 || cx >= BOARD_SIZE as isize || cy >= BOARD_SIZE as isize {
                return true;
            }
            match board.get(cx as usize, cy as usize) {
                Some(Cell::HitShip) => continue,
                Some(Cell::Ship) => return false,
                _ => return true,
            }
        }
    })
}

/// `true` when no intact ship cell remains.
pub fn all_sunk(board: &Board) -> bool {
    board.count(Cell::Ship) == 0
}
