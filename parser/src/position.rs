//! FILENAME: parser/src/position.rs
//! PURPOSE: A cell coordinate and its A1-style textual form.
//! CONTEXT: Every cell reference a formula can contain, and every key the
//! engine's Sheet stores cells under, is a Position. Row and column are
//! 0-based internally; the textual form is 1-indexed with base-26 column
//! letters ("A".."Z", "AA".."ZZ", ...).

use std::fmt;

/// One past the highest valid row index (spreadsheet-style bound, not a
/// real-world row count).
pub const MAX_ROWS: i64 = 16384;
/// One past the highest valid column index; 16383 is "XFD".
pub const MAX_COLS: i64 = 16384;

/// A cell coordinate. `row` and `col` are 0-based.
///
/// Field order matters: `row` before `col` gives the derived `Ord` a
/// row-major comparison for free, which is exactly the sort order
/// `Formula::referenced_cells` needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: i64,
    pub col: i64,
}

impl Position {
    /// The sentinel returned by `parse` on syntactically invalid text.
    /// Deliberately outside the valid range in both coordinates so it can
    /// never collide with a real position.
    pub const INVALID: Position = Position { row: -1, col: -1 };

    pub fn new(row: i64, col: i64) -> Self {
        Position { row, col }
    }

    /// True iff both coordinates fall within `0..MAX_ROWS` / `0..MAX_COLS`.
    pub fn is_valid(&self) -> bool {
        (0..MAX_ROWS).contains(&self.row) && (0..MAX_COLS).contains(&self.col)
    }

    /// Parses an A1-style reference such as "A1" or "zz99". Case-insensitive
    /// on the column letters. Returns `Position::INVALID` — never panics —
    /// on anything that isn't syntactically `letters+digits` with no
    /// trailing characters, so the sentinel itself is the only observable
    /// failure mode (no exceptions at this boundary).
    pub fn parse(text: &str) -> Position {
        let split_at = text.find(|c: char| c.is_ascii_digit());
        let Some(split_at) = split_at else {
            return Position::INVALID;
        };
        let (col_part, row_part) = text.split_at(split_at);
        if col_part.is_empty() || row_part.is_empty() {
            return Position::INVALID;
        }
        if !col_part.chars().all(|c| c.is_ascii_alphabetic()) {
            return Position::INVALID;
        }
        if !row_part.chars().all(|c| c.is_ascii_digit()) {
            return Position::INVALID;
        }
        let Some(col) = col_from_letters(col_part) else {
            return Position::INVALID;
        };
        let Ok(row_num) = row_part.parse::<i64>() else {
            return Position::INVALID;
        };
        if row_num < 1 {
            return Position::INVALID;
        }
        Position::new(row_num - 1, col)
    }

    /// Renders the A1-style textual form. Only meaningful for valid
    /// positions; callers must not call this on `Position::INVALID`.
    pub fn to_a1(&self) -> String {
        format!("{}{}", col_to_letters(self.col), self.row + 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

/// Converts 0-based column letters ("A" -> 0, "AA" -> 26) to an index.
/// Returns `None` on overflow or an empty string rather than panicking.
fn col_from_letters(letters: &str) -> Option<i64> {
    let mut result: i64 = 0;
    for c in letters.chars() {
        let digit = (c.to_ascii_uppercase() as i64) - ('A' as i64) + 1;
        result = result.checked_mul(26)?.checked_add(digit)?;
    }
    result.checked_sub(1)
}

/// Converts a 0-based column index to its letter form ("A", "AA", ...).
fn col_to_letters(mut col: i64) -> String {
    let mut result = String::new();
    loop {
        let remainder = col % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result
}
