//! Fleet layout validation.
//!
//! A submitted board is accepted only when its ships form exactly the
//! required fleet: four ships of length 1, three of length 2, two of
//! length 3 and one of length 4. Every ship is a straight run along one
//! axis. Ships may not share an edge, since two edge-touching ships are
//! indistinguishable from one longer or bent ship, but they may touch
//! diagonally. Diagonal contact is an accepted layout, not an oversight.

use crate::board::{Board, Cell};
use crate::config::{BOARD_SIZE, FLEET, MAX_SHIP_LEN};
use core::fmt;

/// Number of ships found for each length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct FleetCounts {
    #[cfg_attr(feature = "std", serde(rename = "1"))]
    pub ones: usize,
    #[cfg_attr(feature = "std", serde(rename = "2"))]
    pub twos: usize,
    #[cfg_attr(feature = "std", serde(rename = "3"))]
    pub threes: usize,
    #[cfg_attr(feature = "std", serde(rename = "4"))]
    pub fours: usize,
}

impl FleetCounts {
    pub const fn new(ones: usize, twos: usize, threes: usize, fours: usize) -> Self {
        Self {
            ones,
            twos,
            threes,
            fours,
        }
    }

    /// The counts a complete fleet must have.
    pub const fn required() -> Self {
        Self::new(FLEET[0], FLEET[1], FLEET[2], FLEET[3])
    }

    /// Ships of length `len`; zero for lengths outside 1..=4.
    pub fn get(&self, len: usize) -> usize {
        match len {
            1 => self.ones,
            2 => self.twos,
            3 => self.threes,
            4 => self.fours,
            _ => 0,
        }
    }

    fn add(&mut self, len: usize) {
        match len {
            1 => self.ones += 1,
            2 => self.twos += 1,
            3 => self.threes += 1,
            4 => self.fours += 1,
            _ => {}
        }
    }

    pub fn is_complete(&self) -> bool {
        *self == Self::required()
    }
}

impl fmt::Display for FleetCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for len in 1..=MAX_SHIP_LEN {
            if len > 1 {
                f.write_str(" ")?;
            }
            write!(f, "{}:{}", len, self.get(len))?;
        }
        Ok(())
    }
}

/// Why a board was accepted or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    /// The board holds a cell a fresh layout can never contain.
    Malformed { x: usize, y: usize },
    /// The ship cell at `(x, y)` extends along both axes.
    Bent { x: usize, y: usize },
    /// The ship starting at `(x, y)` is longer than four cells.
    TooLong { x: usize, y: usize, len: usize },
    /// Every ship is well formed but the fleet composition is wrong.
    WrongFleet,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Valid => write!(f, "valid fleet"),
            Verdict::Malformed { x, y } => write!(f, "unexpected cell at ({}, {})", x, y),
            Verdict::Bent { x, y } => write!(f, "ship bends at ({}, {})", x, y),
            Verdict::TooLong { x, y, len } => {
                write!(f, "ship at ({}, {}) has length {}", x, y, len)
            }
            Verdict::WrongFleet => write!(f, "fleet composition does not match"),
        }
    }
}

/// Outcome of [`validate`]: the verdict plus the ships counted before the
/// scan finished or stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validation {
    pub verdict: Verdict,
    pub counts: FleetCounts,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.verdict == Verdict::Valid
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Mark {
    ship: bool,
    horizontal: bool,
    vertical: bool,
    counted: bool,
}

type Marks = [[Mark; BOARD_SIZE]; BOARD_SIZE];

/// Check that `board` holds exactly one complete fleet.
pub fn validate(board: &Board) -> Validation {
    let mut counts = FleetCounts::default();
    let verdict = match mark_axes(board) {
        Ok(mut marks) => match count_runs(&mut marks, &mut counts) {
            Ok(()) if counts.is_complete() => Verdict::Valid,
            Ok(()) => Verdict::WrongFleet,
            Err(v) => v,
        },
        Err(v) => v,
    };
    Validation { verdict, counts }
}

// Tag each ship cell with the axis it extends along. A cell joined to
// neighbours on both axes, directly or through its neighbour, is bent.
fn mark_axes(board: &Board) -> Result<Marks, Verdict> {
    let mut marks: Marks = [[Mark::default(); BOARD_SIZE]; BOARD_SIZE];
    for (x, row) in board.rows().iter().enumerate() {
        for (y, cell) in row.iter().enumerate() {
            match cell {
                Cell::Empty => continue,
                Cell::HitShip => return Err(Verdict::Malformed { x, y }),
                Cell::Ship => {}
            }
            marks[x][y].ship = true;
            let left = y > 0 && marks[x][y - 1].ship;
            let up = x > 0 && marks[x - 1][y].ship;
            if left && up {
                return Err(Verdict::Bent { x, y });
            }
            if left {
                if marks[x][y - 1].vertical {
                    return Err(Verdict::Bent { x, y });
                }
                marks[x][y - 1].horizontal = true;
                marks[x][y].horizontal = true;
            }
            if up {
                if marks[x - 1][y].horizontal {
                    return Err(Verdict::Bent { x, y });
                }
                marks[x - 1][y].vertical = true;
                marks[x][y].vertical = true;
            }
        }
    }
    Ok(marks)
}

// Row-major order reaches the top or left end of every ship first.
fn count_runs(marks: &mut Marks, counts: &mut FleetCounts) -> Result<(), Verdict> {
    for x in 0..BOARD_SIZE {
        for y in 0..BOARD_SIZE {
            let mark = marks[x][y];
            if !mark.ship || mark.counted {
                continue;
            }
            let len = if mark.vertical {
                let mut len = 0;
                while x + len < BOARD_SIZE && marks[x + len][y].ship {
                    marks[x + len][y].counted = true;
                    len += 1;
                }
                len
            } else if mark.horizontal {
                let mut len = 0;
                while y + len < BOARD_SIZE && marks[x][y + len].ship {
                    marks[x][y + len].counted = true;
                    len += 1;
                }
                len
            } else {
                marks[x][y].counted = true;
                1
            };
            if len > MAX_SHIP_LEN {
                return Err(Verdict::TooLong { x, y, len });
            }
            counts.add(len);
        }
    }
    Ok(())
}
