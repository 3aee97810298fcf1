//! Common types for the game core: board errors and shot outcomes.

/// Result of resolving a shot against a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum ShotOutcome {
    /// Shot landed on water or on a cell that was already hit.
    Miss,
    /// Shot hit a ship that still has intact cells.
    Damage,
    /// Shot hit the last intact cell of a ship.
    Kill,
}

impl ShotOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShotOutcome::Miss => "Miss",
            ShotOutcome::Damage => "Damage",
            ShotOutcome::Kill => "Kill",
        }
    }
}

impl core::fmt::Display for ShotOutcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while decoding or building a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Grid does not have exactly `BOARD_SIZE` rows.
    WrongRowCount(usize),
    /// Row `row` does not have exactly `BOARD_SIZE` cells.
    WrongColumnCount { row: usize, len: usize },
    /// Cell value outside the known encoding.
    UnknownCell { row: usize, col: usize, value: u64 },
    /// Random fleet generation gave up.
    UnableToPlaceFleet,
    /// Stored or submitted JSON could not be decoded.
    #[cfg(feature = "std")]
    Json(std::string::String),
}

impl core::fmt::Display for BoardError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BoardError::WrongRowCount(n) => write!(f, "expected 10 rows, got {}", n),
            BoardError::WrongColumnCount { row, len } => {
                write!(f, "row {} has {} cells, expected 10", row, len)
            }
            BoardError::UnknownCell { row, col, value } => {
                write!(f, "unknown cell value {} at ({}, {})", value, row, col)
            }
            BoardError::UnableToPlaceFleet => write!(f, "Unable to place fleet"),
            #[cfg(feature = "std")]
            BoardError::Json(e) => write!(f, "malformed board json: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BoardError {}
