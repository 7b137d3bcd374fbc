//! Level parsing functionality for converting character grids into structured data.

use glam::UVec2;
use smallvec::SmallVec;

use crate::constants::LevelDefinition;
use crate::error::ParseError;

/// The meaning of one character in a level grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridCell {
    Wall,
    Empty,
    Start,
    Key,
    Exit,
    MovingObstacle,
}

/// Structured representation of a level grid with its markers extracted.
///
/// Cell coordinates are `(column, row)`, so `x` indexes characters within a row and `y` indexes rows.
#[derive(Debug, Clone)]
pub struct ParsedLevel {
    pub name: &'static str,
    /// Cells in row-major order.
    pub cells: Vec<GridCell>,
    pub size: UVec2,
    pub start: UVec2,
    pub key: UVec2,
    pub exit: UVec2,
    pub obstacles: SmallVec<[UVec2; 2]>,
}

impl ParsedLevel {
    pub fn cell(&self, at: UVec2) -> Option<GridCell> {
        if at.x >= self.size.x || at.y >= self.size.y {
            return None;
        }
        self.cells.get((at.y * self.size.x + at.x) as usize).copied()
    }

    /// Iterates over every cell with its coordinate.
    pub fn iter(&self) -> impl Iterator<Item = (UVec2, GridCell)> + '_ {
        let width = self.size.x;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (UVec2::new(i as u32 % width, i as u32 / width), *cell))
    }
}

/// Parser for converting level grids into structured level data.
pub struct LevelParser;

impl LevelParser {
    /// Converts a grid character into its cell type.
    ///
    /// Unrecognised characters are open floor, so decorative padding never breaks a level.
    pub fn parse_character(c: char) -> GridCell {
        match c {
            'W' => GridCell::Wall,
            'S' => GridCell::Start,
            'K' => GridCell::Key,
            'E' => GridCell::Exit,
            'M' => GridCell::MovingObstacle,
            _ => GridCell::Empty,
        }
    }

    /// Parses a level definition into cells and marker positions.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid is empty, its rows differ in width, or it does not
    /// contain exactly one start, key and exit marker.
    pub fn parse_level(level: &LevelDefinition) -> Result<ParsedLevel, ParseError> {
        let width = level.rows.first().map(|row| row.chars().count()).ok_or(ParseError::EmptyGrid)?;
        if width == 0 {
            return Err(ParseError::EmptyGrid);
        }

        let mut cells = Vec::with_capacity(width * level.rows.len());
        let mut start = None;
        let mut key = None;
        let mut exit = None;
        let mut obstacles = SmallVec::new();

        for (y, row) in level.rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(ParseError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }

            for (x, character) in row.chars().enumerate() {
                let cell = Self::parse_character(character);
                let at = UVec2::new(x as u32, y as u32);

                let marker = match cell {
                    GridCell::Start => Some(&mut start),
                    GridCell::Key => Some(&mut key),
                    GridCell::Exit => Some(&mut exit),
                    GridCell::MovingObstacle => {
                        obstacles.push(at);
                        None
                    }
                    GridCell::Wall | GridCell::Empty => None,
                };

                if let Some(slot) = marker {
                    if slot.replace(at).is_some() {
                        return Err(ParseError::DuplicateMarker(character));
                    }
                }

                cells.push(cell);
            }
        }

        Ok(ParsedLevel {
            name: level.name,
            size: UVec2::new(width as u32, level.rows.len() as u32),
            cells,
            start: start.ok_or(ParseError::MissingMarker('S'))?,
            key: key.ok_or(ParseError::MissingMarker('K'))?,
            exit: exit.ok_or(ParseError::MissingMarker('E'))?,
            obstacles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LEVELS;

    #[test]
    fn test_parse_first_level_markers() {
        let parsed = LevelParser::parse_level(&LEVELS[0]).unwrap();
        assert_eq!(parsed.size, UVec2::new(14, 7));
        assert_eq!(parsed.start, UVec2::new(3, 2));
        assert_eq!(parsed.key, UVec2::new(10, 2));
        assert_eq!(parsed.exit, UVec2::new(10, 4));
        assert_eq!(parsed.obstacles.as_slice(), &[UVec2::new(3, 4)]);
    }

    #[test]
    fn test_cell_lookup_out_of_bounds() {
        let parsed = LevelParser::parse_level(&LEVELS[0]).unwrap();
        assert_eq!(parsed.cell(UVec2::new(0, 0)), Some(GridCell::Wall));
        assert_eq!(parsed.cell(UVec2::new(14, 0)), None);
    }
}
