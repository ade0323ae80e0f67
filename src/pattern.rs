//! Run-length pattern text.
//!
//! One line per grid row. A line is a sequence of tokens:
//!
//! * `v` places one cell of value `v` and moves one column right;
//! * `v*n` places `n` cells of value `v` and moves `n` columns right.
//!
//! Consecutive digits form a single value or count, values must be `0` or `1`,
//! and an empty value (`*n`) means `0`. Whitespace between tokens separates them
//! without placing anything. Rows and columns past the grid edges wrap.

use crate::error::{LifeError, MalformedReason, Result};
use crate::grid::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Literal(bool),
    Run { alive: bool, count: u64 },
}

impl Token {
    fn alive(&self) -> bool {
        match *self {
            Token::Literal(alive) | Token::Run { alive, .. } => alive,
        }
    }

    fn span(&self) -> u64 {
        match *self {
            Token::Literal(_) => 1,
            Token::Run { count, .. } => count,
        }
    }
}

/// Tokens of one line, up to the first malformed one.
#[derive(Debug, Default)]
pub struct ParsedLine {
    pub tokens: Vec<Token>,
    pub error: Option<LifeError>,
}

fn parse_value(digits: &str) -> std::result::Result<bool, MalformedReason> {
    if digits.is_empty() {
        return Ok(false);
    }
    match digits.parse::<u64>() {
        Ok(0) => Ok(false),
        Ok(1) => Ok(true),
        _ => Err(MalformedReason::ValueOutOfRange(digits.to_string())),
    }
}

fn digits_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    end
}

/// Split one line into tokens, stopping at the first malformed token.
/// `line_no` is only used to label the error.
pub fn parse_line(line: &str, line_no: usize) -> ParsedLine {
    let bytes = line.as_bytes();
    let mut parsed = ParsedLine::default();
    let mut pos = 0;

    let malformed = |column: usize, reason: MalformedReason| LifeError::MalformedPattern {
        line: line_no,
        column,
        reason,
    };

    while pos < bytes.len() {
        let b = bytes[pos];
        if b.is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        if !b.is_ascii_digit() && b != b'*' {
            let c = line[pos..].chars().next().unwrap_or('\u{fffd}');
            parsed.error = Some(malformed(pos, MalformedReason::UnexpectedChar(c)));
            return parsed;
        }

        let start = pos;
        let value_end = digits_end(bytes, start);
        let value = &line[start..value_end];

        let token = if value_end < bytes.len() && bytes[value_end] == b'*' {
            let count_end = digits_end(bytes, value_end + 1);
            let count = &line[value_end + 1..count_end];
            if count.is_empty() {
                parsed.error = Some(malformed(start, MalformedReason::MissingCount));
                return parsed;
            }
            pos = count_end;
            let count = match count.parse::<u64>() {
                Ok(count) => count,
                Err(_) => {
                    parsed.error = Some(malformed(
                        value_end + 1,
                        MalformedReason::CountOutOfRange(count.to_string()),
                    ));
                    return parsed;
                }
            };
            parse_value(value).map(|alive| Token::Run { alive, count })
        } else {
            pos = value_end;
            parse_value(value).map(Token::Literal)
        };

        match token {
            Ok(token) => parsed.tokens.push(token),
            Err(reason) => {
                parsed.error = Some(malformed(start, reason));
                return parsed;
            }
        }
    }

    parsed
}

/// Write one row's tokens into the grid starting at column 0.
fn apply_tokens(grid: &mut Grid, row: i64, tokens: &[Token]) {
    let width = grid.width() as u64;
    let mut cursor = 0u64;
    for token in tokens {
        // A run longer than the row only rewrites the same columns with the same value
        let writes = token.span().min(width);
        for i in 0..writes {
            let x = ((cursor + i) % width) as i64;
            grid.set(x, row, token.alive());
        }
        cursor = (cursor + token.span() % width) % width;
    }
}

/// Clear `grid` and load a pattern document into it.
///
/// Malformed tokens do not abort the load: everything before the bad token on
/// that line is kept, the rest of the line is skipped, and later lines still
/// load. In that case the result is [`LifeError::PartialLoad`] listing every
/// malformed token; the grid keeps what was applied.
///
/// Returns the number of live cells after loading.
pub fn decode_into(grid: &mut Grid, text: &str) -> Result<usize> {
    grid.clear();
    let mut errors = Vec::new();
    for (row, line) in text.lines().enumerate() {
        let parsed = parse_line(line, row);
        apply_tokens(grid, row as i64, &parsed.tokens);
        if let Some(err) = parsed.error {
            log::debug!("pattern line {row}: {err}");
            errors.push(err);
        }
    }

    let applied_cells = grid.live_count();
    if errors.is_empty() {
        Ok(applied_cells)
    } else {
        Err(LifeError::PartialLoad {
            applied_cells,
            errors,
        })
    }
}

/// Decode a document into a fresh grid of the given size, failing on the
/// first malformed token.
pub fn decode(text: &str, width: u32, height: u32) -> Result<Grid> {
    let mut grid = Grid::new(width, height)?;
    match decode_into(&mut grid, text) {
        Ok(_) => Ok(grid),
        Err(LifeError::PartialLoad { mut errors, .. }) if !errors.is_empty() => Err(errors.remove(0)),
        Err(err) => Err(err),
    }
}

fn push_run(out: &mut String, alive: bool, count: usize) {
    if !out.is_empty() {
        out.push(' ');
    }
    let digit = if alive { '1' } else { '0' };
    if count == 1 {
        out.push(digit);
    } else {
        out.push(digit);
        out.push('*');
        out.push_str(&count.to_string());
    }
}

fn encode_row(row: &[u32]) -> String {
    let len = row.iter().rposition(|&c| c != 0).map_or(0, |last| last + 1);
    let mut line = String::new();
    let mut cells = row[..len].iter().map(|&c| c != 0).peekable();
    while let Some(alive) = cells.next() {
        let mut count = 1;
        while cells.peek() == Some(&alive) {
            cells.next();
            count += 1;
        }
        push_run(&mut line, alive, count);
    }
    line
}

/// Encode the grid's contents as a pattern document.
///
/// Trailing dead cells of each row and trailing empty rows are dropped.
pub fn encode(grid: &Grid) -> String {
    let mut lines: Vec<String> = (0..grid.height()).map(|y| encode_row(grid.row(y))).collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live(grid: &Grid) -> Vec<(u32, u32)> {
        grid.live_cells().collect()
    }

    #[test]
    fn literals_and_runs() {
        let grid = decode("1*3 0 1\n0*2 1", 10, 4).unwrap();
        assert_eq!(live(&grid), vec![(0, 0), (1, 0), (2, 0), (4, 0), (2, 1)]);
    }

    #[test]
    fn consecutive_digits_form_one_value() {
        let err = decode("101", 10, 4).unwrap_err();
        match err {
            LifeError::MalformedPattern { line, column, reason } => {
                assert_eq!((line, column), (0, 0));
                assert_eq!(reason, MalformedReason::ValueOutOfRange("101".into()));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_run_value_is_dead() {
        let grid = decode("*4 1", 10, 2).unwrap();
        assert_eq!(live(&grid), vec![(4, 0)]);
    }

    #[test]
    fn run_count_is_greedy() {
        // `1*10` is a run of ten, not a run of one followed by a literal 0
        let grid = decode("1*10", 12, 1).unwrap();
        assert_eq!(grid.live_count(), 10);
    }

    #[test]
    fn missing_count_is_malformed() {
        let parsed = parse_line("1 1*", 3);
        assert_eq!(parsed.tokens, vec![Token::Literal(true)]);
        match parsed.error {
            Some(LifeError::MalformedPattern { line: 3, column: 2, reason }) => {
                assert_eq!(reason, MalformedReason::MissingCount)
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn stray_character_is_malformed() {
        let parsed = parse_line("1 x 1", 0);
        assert_eq!(parsed.tokens.len(), 1);
        assert!(matches!(
            parsed.error,
            Some(LifeError::MalformedPattern {
                column: 2,
                reason: MalformedReason::UnexpectedChar('x'),
                ..
            })
        ));
    }

    #[test]
    fn partial_load_keeps_good_rows() {
        let mut grid = Grid::new(8, 8).unwrap();
        grid.set(7, 7, true);
        let err = decode_into(&mut grid, "1*2\n1 2 1\n0 1").unwrap_err();
        match err {
            LifeError::PartialLoad { applied_cells, errors } => {
                assert_eq!(applied_cells, 4);
                assert_eq!(errors.len(), 1);
                assert!(matches!(
                    errors[0],
                    LifeError::MalformedPattern { line: 1, column: 2, .. }
                ));
            }
            other => panic!("unexpected {other:?}"),
        }
        // Old contents were cleared, the token before the bad one still applied
        assert_eq!(live(&grid), vec![(0, 0), (1, 0), (0, 1), (1, 2)]);
    }

    #[test]
    fn out_of_bounds_wraps() {
        let grid = decode("0*5 1\n\n\n1", 4, 2).unwrap();
        // column 5 wraps to 1, row 3 wraps to 1
        assert_eq!(live(&grid), vec![(1, 0), (0, 1)]);
    }

    #[test]
    fn huge_run_is_cheap_and_wraps() {
        let grid = decode("1*1000000000000 0 1", 5, 1).unwrap();
        // cursor lands on column 0, which is then set dead; column 1 alive
        assert_eq!(live(&grid), vec![(1, 0), (2, 0), (3, 0), (4, 0)]);
    }

    #[test]
    fn crlf_and_leading_blank_rows() {
        let grid = decode("\r\n0 1\r\n", 4, 4).unwrap();
        assert_eq!(live(&grid), vec![(1, 1)]);
    }

    #[test]
    fn encode_collapses_runs() {
        let mut grid = Grid::new(10, 4).unwrap();
        for x in 0..3 {
            grid.set(x, 0, true);
        }
        grid.set(5, 0, true);
        grid.set(1, 2, true);
        assert_eq!(encode(&grid), "1*3 0*2 1\n\n0 1");
    }

    #[test]
    fn encode_of_empty_grid_is_empty() {
        let grid = Grid::new(3, 3).unwrap();
        assert_eq!(encode(&grid), "");
    }

    #[test]
    fn encode_decode_preserves_live_cells() {
        let docs = [
            "1*3 0 1",
            "0 1\n1 0 1\n",
            "*3 1*2\n\n\n1 1 0*4 1",
            "0*2 1\n0*3 1\n0 1*3",
        ];
        for doc in docs {
            let grid = decode(doc, 16, 8).unwrap();
            let again = decode(&encode(&grid), 16, 8).unwrap();
            assert_eq!(live(&again), live(&grid), "doc {doc:?}");
        }
    }
}
