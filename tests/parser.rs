use glam::UVec2;
use labyrinth::constants::{LevelDefinition, LEVELS};
use labyrinth::error::ParseError;
use labyrinth::map::parser::{GridCell, LevelParser};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

fn definition(rows: &'static [&'static str]) -> LevelDefinition {
    LevelDefinition { name: "test", rows }
}

#[test]
fn test_parse_character() {
    let test_cases = [
        ('W', GridCell::Wall),
        (' ', GridCell::Empty),
        ('S', GridCell::Start),
        ('K', GridCell::Key),
        ('E', GridCell::Exit),
        ('M', GridCell::MovingObstacle),
        ('x', GridCell::Empty),
        ('#', GridCell::Empty),
    ];

    for (character, expected) in test_cases {
        assert_eq!(LevelParser::parse_character(character), expected, "{character:?}");
    }
}

#[test]
fn test_every_level_parses() {
    for level in &LEVELS {
        let parsed = LevelParser::parse_level(level);
        assert_that(&parsed.is_ok()).is_true();

        let parsed = parsed.unwrap();
        assert_eq!(parsed.cells.len(), (parsed.size.x * parsed.size.y) as usize);
        assert_eq!(parsed.cell(parsed.start), Some(GridCell::Start));
        assert_eq!(parsed.cell(parsed.key), Some(GridCell::Key));
        assert_eq!(parsed.cell(parsed.exit), Some(GridCell::Exit));
        assert_that(&parsed.obstacles.len()).is_equal_to(1);
    }
}

#[test]
fn test_iter_visits_cells_row_major() {
    let parsed = LevelParser::parse_level(&definition(&["WSW", "KEM"])).unwrap();

    let cells: Vec<(UVec2, GridCell)> = parsed.iter().collect();

    assert_eq!(cells[1], (UVec2::new(1, 0), GridCell::Start));
    assert_eq!(cells[3], (UVec2::new(0, 1), GridCell::Key));
    assert_eq!(cells[5], (UVec2::new(2, 1), GridCell::MovingObstacle));
}

#[test]
fn test_parse_empty_grid() {
    let result = LevelParser::parse_level(&definition(&[]));
    assert_eq!(result.unwrap_err(), ParseError::EmptyGrid);

    let result = LevelParser::parse_level(&definition(&[""]));
    assert_eq!(result.unwrap_err(), ParseError::EmptyGrid);
}

#[test]
fn test_parse_ragged_rows() {
    let result = LevelParser::parse_level(&definition(&["WSKE", "WW"]));

    assert_eq!(
        result.unwrap_err(),
        ParseError::RaggedRow {
            row: 1,
            expected: 4,
            found: 2,
        }
    );
}

#[test]
fn test_parse_duplicate_marker() {
    let result = LevelParser::parse_level(&definition(&["SKE", "KWW"]));
    assert_eq!(result.unwrap_err(), ParseError::DuplicateMarker('K'));
}

#[test]
fn test_parse_missing_markers() {
    let result = LevelParser::parse_level(&definition(&["S K", "WWW"]));
    assert_eq!(result.unwrap_err(), ParseError::MissingMarker('E'));

    let result = LevelParser::parse_level(&definition(&["E K", "WWW"]));
    assert_eq!(result.unwrap_err(), ParseError::MissingMarker('S'));
}

#[test]
fn test_parse_error_messages() {
    assert_eq!(
        ParseError::DuplicateMarker('S').to_string(),
        "Level grid has more than one 'S' marker"
    );
}
