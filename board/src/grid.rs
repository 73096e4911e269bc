//! A fixed-size two-dimensional container, with no idea what it holds

use core::fmt;

use crate::Coordinate;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("a {rows}x{columns} grid is not supported")]
    InvalidDimensions { rows: u8, columns: u8 },
    #[error("coordinate {0} is outside the grid")]
    OutOfBounds(Coordinate),
    #[error("cell {0} is already occupied")]
    Occupied(Coordinate),
}

/// Checks that a grid of this size can be addressed with [`Coordinate`]s.
const fn check_dimensions(rows: u8, columns: u8) -> Result<(), GridError> {
    if rows == 0 || columns == 0 || rows > i8::MAX as u8 || columns > i8::MAX as u8 {
        Err(GridError::InvalidDimensions { rows, columns })
    } else {
        Ok(())
    }
}

/// A `rows` by `columns` grid of cells, each holding at most one `T`
///
/// Cells are stored row-major. Every method taking a [`Coordinate`] fails with
/// [`GridError::OutOfBounds`] for a coordinate off the grid, except [`Grid::position_exists`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid<T> {
    rows: u8,
    columns: u8,
    cells: Vec<Option<T>>,
}

impl<T> Grid<T> {
    /// An empty grid of the given size
    pub fn new(rows: u8, columns: u8) -> Result<Self, GridError> {
        check_dimensions(rows, columns)?;
        let mut cells = Vec::with_capacity(rows as usize * columns as usize);
        cells.resize_with(rows as usize * columns as usize, || None);
        Ok(Self {
            rows,
            columns,
            cells,
        })
    }

    pub const fn rows(&self) -> u8 {
        self.rows
    }

    pub const fn columns(&self) -> u8 {
        self.columns
    }

    /// Returns whether the coordinate lies on this grid
    ///
    /// ```
    /// use board::{Coordinate, Grid};
    /// let grid = Grid::<()>::new(8, 8).unwrap();
    /// assert!(grid.position_exists(Coordinate::new(7, 0)));
    /// assert!(!grid.position_exists(Coordinate::new(8, 0)));
    /// assert!(!grid.position_exists(Coordinate::new(0, -1)));
    /// ```
    pub const fn position_exists(&self, coordinate: Coordinate) -> bool {
        0 <= coordinate.row
            && (coordinate.row as u8) < self.rows
            && 0 <= coordinate.column
            && (coordinate.column as u8) < self.columns
    }

    fn index(&self, coordinate: Coordinate) -> Result<usize, GridError> {
        if self.position_exists(coordinate) {
            Ok(coordinate.row as usize * self.columns as usize + coordinate.column as usize)
        } else {
            Err(GridError::OutOfBounds(coordinate))
        }
    }

    /// The value in the given cell, if any
    pub fn occupant(&self, coordinate: Coordinate) -> Result<Option<&T>, GridError> {
        let index = self.index(coordinate)?;
        Ok(self.cells[index].as_ref())
    }

    /// Whether the given cell holds anything
    pub fn has_piece(&self, coordinate: Coordinate) -> Result<bool, GridError> {
        Ok(self.occupant(coordinate)?.is_some())
    }

    /// Put a value into an empty cell
    ///
    /// Fails with [`GridError::Occupied`] if the cell already holds something, leaving the grid
    /// unchanged.
    pub fn place(&mut self, value: T, coordinate: Coordinate) -> Result<(), GridError> {
        let index = self.index(coordinate)?;
        let cell = &mut self.cells[index];
        if cell.is_some() {
            return Err(GridError::Occupied(coordinate));
        }
        *cell = Some(value);
        Ok(())
    }

    /// Take the value out of the given cell, leaving it empty
    pub fn remove(&mut self, coordinate: Coordinate) -> Result<Option<T>, GridError> {
        let index = self.index(coordinate)?;
        Ok(self.cells[index].take())
    }

    /// An iterator over every coordinate on the grid, row by row
    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> {
        let columns = self.columns as i8;
        (0..self.rows as i8)
            .flat_map(move |row| (0..columns).map(move |column| Coordinate::new(row, column)))
    }

    /// An iterator over the occupied cells and what they hold
    pub fn occupied(&self) -> impl Iterator<Item = (Coordinate, &T)> {
        self.coordinates()
            .zip(&self.cells)
            .filter_map(|(coordinate, cell)| cell.as_ref().map(|value| (coordinate, value)))
    }

    /// A grid of the same shape holding `f` applied to every occupant
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            rows: self.rows,
            columns: self.columns,
            cells: self.cells.iter().map(|cell| cell.as_ref().map(&mut f)).collect(),
        }
    }
}

/// A boolean matrix with the shape of some [`Grid`]
///
/// Out-of-range coordinates are never members, and can't be inserted.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Mask {
    rows: u8,
    columns: u8,
    cells: Vec<bool>,
}

impl Mask {
    /// An empty mask shaped like the given grid
    pub fn for_grid<T>(grid: &Grid<T>) -> Self {
        Self {
            rows: grid.rows,
            columns: grid.columns,
            cells: vec![false; grid.cells.len()],
        }
    }

    pub const fn rows(&self) -> u8 {
        self.rows
    }

    pub const fn columns(&self) -> u8 {
        self.columns
    }

    fn index(&self, coordinate: Coordinate) -> Option<usize> {
        if 0 <= coordinate.row
            && (coordinate.row as u8) < self.rows
            && 0 <= coordinate.column
            && (coordinate.column as u8) < self.columns
        {
            Some(coordinate.row as usize * self.columns as usize + coordinate.column as usize)
        } else {
            None
        }
    }

    /// Whether the coordinate is marked
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        self.index(coordinate).is_some_and(|index| self.cells[index])
    }

    /// Mark the coordinate, returning `false` if it is off the grid
    pub fn insert(&mut self, coordinate: Coordinate) -> bool {
        match self.index(coordinate) {
            Some(index) => {
                self.cells[index] = true;
                true
            }
            None => false,
        }
    }

    /// Mark everything marked in `other` as well
    pub fn union_with(&mut self, other: &Mask) {
        debug_assert_eq!((self.rows, self.columns), (other.rows, other.columns));
        for (cell, other) in self.cells.iter_mut().zip(&other.cells) {
            *cell |= *other;
        }
    }

    /// Whether any cell is marked
    pub fn any(&self) -> bool {
        self.cells.iter().any(|cell| *cell)
    }

    /// The number of marked cells
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell).count()
    }

    /// An iterator over the marked coordinates, row by row
    pub fn iter(&self) -> impl Iterator<Item = Coordinate> + '_ {
        let columns = self.columns as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell)
            .map(move |(index, _)| {
                Coordinate::new((index / columns) as i8, (index % columns) as i8)
            })
    }
}
impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mask {{\n{self}}}")
    }
}
impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;
        for row in self.cells.chunks(self.columns as usize) {
            for cell in row {
                f.write_char(if *cell { 'X' } else { '.' })?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}
