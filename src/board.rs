//! Battle grid: a fixed 10×10 array of cells, plus its text and JSON codecs.
//!
//! Coordinates are `(x, y)` with `x` selecting the row and `y` the column,
//! both counted from the top-left corner.

use crate::common::BoardError;
use crate::config::{BOARD_SIZE, FLEET_LENGTHS};
use core::fmt;
use rand::Rng;

/// State of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Ship,
    HitShip,
}

impl Cell {
    /// Integer used for this cell in JSON grids.
    pub fn code(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Ship => 1,
            Cell::HitShip => 2,
        }
    }

    pub fn from_code(code: u64) -> Option<Cell> {
        match code {
            0 => Some(Cell::Empty),
            1 => Some(Cell::Ship),
            2 => Some(Cell::HitShip),
            _ => None,
        }
    }

    fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Ship => '#',
            Cell::HitShip => 'X',
        }
    }

    fn from_symbol(c: char) -> Option<Cell> {
        match c {
            '.' => Some(Cell::Empty),
            '#' => Some(Cell::Ship),
            'X' => Some(Cell::HitShip),
            _ => None,
        }
    }
}

/// Row-major grid as exchanged on the wire and in storage.
#[cfg(feature = "std")]
pub type RawGrid = std::vec::Vec<std::vec::Vec<u64>>;

#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// An all-water board.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(cells: [[Cell; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Self { cells }
    }

    pub fn rows(&self) -> &[[Cell; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    /// Cell at `(x, y)`, or `None` when off the board.
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        self.cells.get(x).and_then(|row| row.get(y)).copied()
    }

    /// Overwrite the cell at `(x, y)`. Off-board writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if let Some(slot) = self.cells.get_mut(x).and_then(|row| row.get_mut(y)) {
            *slot = cell;
        }
    }

    /// Number of cells equal to `cell`.
    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().flatten().filter(|c| **c == cell).count()
    }

    /// Parse the text form produced by `Display`: one line per row using
    /// `.` for water, `#` for a ship and `X` for a hit ship. Blank lines and
    /// surrounding whitespace are ignored.
    pub fn from_ascii(text: &str) -> Result<Self, BoardError> {
        let mut board = Board::new();
        let mut rows = 0;
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if rows < BOARD_SIZE {
                let mut cols = 0;
                for (col, ch) in line.chars().filter(|c| !c.is_whitespace()).enumerate() {
                    let cell = Cell::from_symbol(ch).ok_or(BoardError::UnknownCell {
                        row: rows,
                        col,
                        value: ch as u64,
                    })?;
                    if col < BOARD_SIZE {
                        board.cells[rows][col] = cell;
                    }
                    cols += 1;
                }
                if cols != BOARD_SIZE {
                    return Err(BoardError::WrongColumnCount { row: rows, len: cols });
                }
            }
            rows += 1;
        }
        if rows != BOARD_SIZE {
            return Err(BoardError::WrongRowCount(rows));
        }
        Ok(board)
    }

    /// Build a board holding a complete random fleet. Ships never share an
    /// edge; they may touch diagonally.
    pub fn random_fleet<R: Rng>(rng: &mut R) -> Result<Self, BoardError> {
        'restart: for _ in 0..100 {
            let mut board = Board::new();
            for &len in FLEET_LENGTHS.iter() {
                let mut placed = false;
                let mut attempts = 0;
                while attempts < 100 && !placed {
                    attempts += 1;
                    let horizontal: bool = rng.random();
                    let (max_x, max_y) = if horizontal {
                        (BOARD_SIZE - 1, BOARD_SIZE - len)
                    } else {
                        (BOARD_SIZE - len, BOARD_SIZE - 1)
                    };
                    let x = rng.random_range(0..=max_x);
                    let y = rng.random_range(0..=max_y);
                    let span = |i: usize| if horizontal { (x, y + i) } else { (x + i, y) };
                    if (0..len).all(|i| {
                        let (cx, cy) = span(i);
                        board.is_clear_around(cx, cy)
                    }) {
                        for i in 0..len {
                            let (cx, cy) = span(i);
                            board.cells[cx][cy] = Cell::Ship;
                        }
                        placed = true;
                    }
                }
                if !placed {
                    continue 'restart;
                }
            }
            return Ok(board);
        }
        Err(BoardError::UnableToPlaceFleet)
    }

    // The cell and its four edge neighbours are all water.
    fn is_clear_around(&self, x: usize, y: usize) -> bool {
        let neighbours = [
            (x.checked_sub(1), Some(y)),
            (Some(x + 1), Some(y)),
            (Some(x), y.checked_sub(1)),
            (Some(x), Some(y + 1)),
        ];
        self.cells[x][y] == Cell::Empty
            && neighbours.iter().all(|n| match n {
                (Some(nx), Some(ny)) => self.get(*nx, *ny).map_or(true, |c| c == Cell::Empty),
                _ => true,
            })
    }
}

#[cfg(feature = "std")]
#[derive(serde::Serialize, serde::Deserialize)]
struct StoredBoard {
    field: RawGrid,
}

#[cfg(feature = "std")]
impl Board {
    /// Decode a row-major integer grid. The grid must be exactly 10×10 and
    /// hold only the codes 0, 1 and 2.
    pub fn from_grid(grid: &[std::vec::Vec<u64>]) -> Result<Self, BoardError> {
        if grid.len() != BOARD_SIZE {
            return Err(BoardError::WrongRowCount(grid.len()));
        }
        let mut board = Board::new();
        for (x, row) in grid.iter().enumerate() {
            if row.len() != BOARD_SIZE {
                return Err(BoardError::WrongColumnCount { row: x, len: row.len() });
            }
            for (y, &value) in row.iter().enumerate() {
                board.cells[x][y] = Cell::from_code(value).ok_or(BoardError::UnknownCell {
                    row: x,
                    col: y,
                    value,
                })?;
            }
        }
        Ok(board)
    }

    pub fn to_grid(&self) -> RawGrid {
        self.cells
            .iter()
            .map(|row| row.iter().map(|c| c.code() as u64).collect())
            .collect()
    }

    /// Storage form: `{"field": [[...], ...]}`.
    pub fn to_json(&self) -> std::string::String {
        let stored = StoredBoard {
            field: self.to_grid(),
        };
        // A map of integer vectors always serializes.
        serde_json::to_string(&stored).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self, BoardError> {
        let stored: StoredBoard =
            serde_json::from_str(json).map_err(|e| BoardError::Json(e.to_string()))?;
        Board::from_grid(&stored.field)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.iter() {
            for cell in row.iter() {
                write!(f, "{}", cell.symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {{")?;
        write!(f, "{}", self)?;
        write!(f, "}}")
    }
}
