//! FILENAME: engine/src/sheet.rs
//! PURPOSE: The top-level aggregate: sparse cell store, forward dependency
//! graph, printable-bounds bookkeeping, and the all-or-nothing edit
//! protocol.
//! CONTEXT: Grounded on the C++ original's `sheet.cpp` for the exact
//! all-or-nothing ordering, and on a `Grid`-shaped sparse store for the
//! storage layout and bounds bookkeeping.

use std::collections::HashMap;
use std::fmt;

use parser::{CellLookup, CellValue, ParseError, Position};

use crate::cell::Cell;
use crate::dependency_graph::{CycleError, DependencyGraph};

#[derive(Debug, Clone, PartialEq)]
pub enum SheetError {
    InvalidPosition(Position),
    Formula(ParseError),
    Circular(CycleError),
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetError::InvalidPosition(pos) => write!(f, "invalid position: {pos:?}"),
            SheetError::Formula(e) => write!(f, "{e}"),
            SheetError::Circular(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SheetError {}

impl From<ParseError> for SheetError {
    fn from(e: ParseError) -> Self {
        SheetError::Formula(e)
    }
}

impl From<CycleError> for SheetError {
    fn from(e: CycleError) -> Self {
        SheetError::Circular(e)
    }
}

pub struct Sheet {
    cells: HashMap<Position, Cell>,
    deps: DependencyGraph,
    max_used_row: i64,
    max_used_col: i64,
}

impl Sheet {
    pub fn new() -> Self {
        Sheet {
            cells: HashMap::new(),
            deps: DependencyGraph::new(),
            max_used_row: -1,
            max_used_col: -1,
        }
    }

    fn check_position(pos: Position) -> Result<(), SheetError> {
        if pos.is_valid() {
            Ok(())
        } else {
            Err(SheetError::InvalidPosition(pos))
        }
    }

    /// The all-or-nothing edit protocol. On any failure, `self` is left
    /// byte-identical to its state before the call: the formula is parsed
    /// into a throwaway value and the cycle check runs before anything is
    /// installed.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<(), SheetError> {
        Self::check_position(pos)?;

        let new_cell = Cell::set(text)?;
        let new_deps: std::collections::HashSet<Position> =
            new_cell.referenced_cells().into_iter().collect();

        if self.deps.would_create_cycle(pos, &new_deps) {
            return Err(SheetError::Circular(CycleError { position: pos }));
        }

        let was_present = self.cells.contains_key(&pos);
        let becomes_empty = new_cell.is_empty();

        if becomes_empty {
            self.cells.remove(&pos);
            self.deps.clear_dependencies(pos);
        } else {
            self.cells.insert(pos, new_cell);
            self.deps.set_dependencies(pos, new_deps);
        }

        if becomes_empty {
            if was_present {
                self.recompute_bounds();
            }
        } else {
            self.widen_bounds(pos);
        }

        Ok(())
    }

    fn widen_bounds(&mut self, pos: Position) {
        if pos.row > self.max_used_row {
            self.max_used_row = pos.row;
        }
        if pos.col > self.max_used_col {
            self.max_used_col = pos.col;
        }
    }

    fn recompute_bounds(&mut self) {
        self.max_used_row = -1;
        self.max_used_col = -1;
        for pos in self.cells.keys() {
            self.widen_bounds(*pos);
        }
    }

    pub fn get_cell(&self, pos: Position) -> Result<Option<&Cell>, SheetError> {
        Self::check_position(pos)?;
        Ok(self.cells.get(&pos))
    }

    pub fn get_cell_mut(&mut self, pos: Position) -> Result<Option<&mut Cell>, SheetError> {
        Self::check_position(pos)?;
        Ok(self.cells.get_mut(&pos))
    }

    pub fn clear_cell(&mut self, pos: Position) -> Result<(), SheetError> {
        Self::check_position(pos)?;
        if self.cells.remove(&pos).is_some() {
            self.deps.clear_dependencies(pos);
            self.recompute_bounds();
        }
        Ok(())
    }

    /// `(rows, cols)`, i.e. `(max_used_row + 1, max_used_col + 1)`, or
    /// `(0, 0)` when the sheet has no cells.
    pub fn printable_size(&self) -> (i64, i64) {
        if self.cells.is_empty() {
            (0, 0)
        } else {
            (self.max_used_row + 1, self.max_used_col + 1)
        }
    }

    pub fn print_texts(&self) -> String {
        self.print(|cell| cell.text())
    }

    pub fn print_values(&self) -> String {
        self.print(|cell| cell.value(self).to_string())
    }

    fn print(&self, render: impl Fn(&Cell) -> String) -> String {
        let (rows, cols) = self.printable_size();
        let mut out = String::new();
        for r in 0..rows {
            for c in 0..cols {
                if c > 0 {
                    out.push('\t');
                }
                if let Some(cell) = self.cells.get(&Position::new(r, c)) {
                    out.push_str(&render(cell));
                }
            }
            out.push('\n');
        }
        out
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Sheet::new()
    }
}

impl CellLookup for Sheet {
    /// Referenced cells that do not exist in the store are treated as
    /// empty text, never auto-created.
    fn value_at(&self, pos: Position) -> CellValue {
        match self.cells.get(&pos) {
            Some(cell) => cell.value(self),
            None => CellValue::Text(String::new()),
        }
    }
}

/// Returns a newly constructed, empty Sheet.
pub fn create_sheet() -> Sheet {
    Sheet::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a1(row: i64, col: i64) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn literal_text_and_escape() {
        let mut sheet = Sheet::new();
        sheet.set_cell(a1(0, 0), "hello").unwrap();
        assert_eq!(sheet.value_at(a1(0, 0)), CellValue::Text("hello".to_string()));
        assert_eq!(sheet.get_cell(a1(0, 0)).unwrap().unwrap().text(), "hello");

        sheet.set_cell(a1(1, 0), "'=1+2").unwrap();
        assert_eq!(
            sheet.value_at(a1(1, 0)),
            CellValue::Text("=1+2".to_string())
        );
        assert_eq!(
            sheet.get_cell(a1(1, 0)).unwrap().unwrap().text(),
            "'=1+2"
        );
        assert_eq!(sheet.printable_size(), (2, 1));
    }

    #[test]
    fn arithmetic_and_references() {
        let mut sheet = Sheet::new();
        sheet.set_cell(a1(0, 1), "4").unwrap();
        sheet.set_cell(a1(0, 0), "=B1*2").unwrap();
        assert_eq!(sheet.value_at(a1(0, 0)), CellValue::Number(8.0));
    }

    #[test]
    fn error_propagation() {
        let mut sheet = Sheet::new();
        sheet.set_cell(a1(0, 0), "=ZZZZ1").unwrap();
        sheet.set_cell(a1(0, 1), "=A1+1").unwrap();
        assert_eq!(
            sheet.value_at(a1(0, 1)),
            CellValue::Error(parser::FormulaError::Ref)
        );
    }

    #[test]
    fn cycle_rejection_is_atomic() {
        let mut sheet = Sheet::new();
        sheet.set_cell(a1(0, 0), "=B1").unwrap();
        let before_size = sheet.printable_size();
        let result = sheet.set_cell(a1(0, 1), "=A1");
        assert!(matches!(result, Err(SheetError::Circular(_))));
        // State is unchanged: B1 was never created.
        assert_eq!(sheet.printable_size(), before_size);
        assert!(sheet.get_cell(a1(0, 1)).unwrap().is_none());
    }

    #[test]
    fn self_reference_is_rejected() {
        let mut sheet = Sheet::new();
        let result = sheet.set_cell(a1(0, 0), "=A1");
        assert!(matches!(result, Err(SheetError::Circular(_))));
        assert!(sheet.get_cell(a1(0, 0)).unwrap().is_none());
    }

    #[test]
    fn empty_cell_arithmetic_and_bounds_shrinkage() {
        let mut sheet = Sheet::new();
        sheet.set_cell(a1(0, 0), "=B2+1").unwrap();
        assert_eq!(sheet.value_at(a1(0, 0)), CellValue::Number(1.0));
        assert_eq!(sheet.printable_size(), (1, 1));

        sheet.set_cell(a1(3, 3), "x").unwrap();
        assert_eq!(sheet.printable_size(), (4, 4));

        sheet.clear_cell(a1(3, 3)).unwrap();
        assert_eq!(sheet.printable_size(), (1, 1));
    }

    #[test]
    fn canonical_parentheses_round_trip() {
        let mut sheet = Sheet::new();
        sheet.set_cell(a1(0, 0), "=1-(2-3)").unwrap();
        assert_eq!(sheet.get_cell(a1(0, 0)).unwrap().unwrap().text(), "=1-(2-3)");
    }

    #[test]
    fn invalid_position_fails_before_any_state_change() {
        let mut sheet = Sheet::new();
        let bad = Position::new(-1, -1);
        assert!(matches!(
            sheet.set_cell(bad, "hello"),
            Err(SheetError::InvalidPosition(_))
        ));
        assert_eq!(sheet.printable_size(), (0, 0));
    }

    #[test]
    fn clearing_an_absent_cell_is_a_no_op() {
        let mut sheet = Sheet::new();
        assert!(sheet.clear_cell(a1(5, 5)).is_ok());
        assert_eq!(sheet.printable_size(), (0, 0));
    }

    #[test]
    fn setting_empty_text_removes_the_cell() {
        let mut sheet = Sheet::new();
        sheet.set_cell(a1(0, 0), "hello").unwrap();
        sheet.set_cell(a1(0, 0), "").unwrap();
        assert!(sheet.get_cell(a1(0, 0)).unwrap().is_none());
        assert_eq!(sheet.printable_size(), (0, 0));
    }

    #[test]
    fn print_texts_and_print_values_render_tab_separated_rows() {
        let mut sheet = Sheet::new();
        sheet.set_cell(a1(0, 0), "1").unwrap();
        sheet.set_cell(a1(0, 1), "2").unwrap();
        sheet.set_cell(a1(1, 0), "=A1+B1").unwrap();
        assert_eq!(sheet.print_texts(), "1\t2\n=A1+B1\t\n");
        assert_eq!(sheet.print_values(), "1\t2\n3\t\n");
    }
}
