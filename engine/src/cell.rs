//! FILENAME: engine/src/cell.rs
//! PURPOSE: A single cell's content: empty, literal text, or a formula.
//! CONTEXT: Deliberately a plain enum with no cached value field, unlike a
//! struct that stores `value: CellValue` populated at `Set`-time: there is
//! no caching of evaluated formula results across reads, so `value()`
//! recomputes on every call.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use parser::{parse_formula, CellLookup, CellValue, Formula, ParseError, Position};

/// True if `text` should be treated as a formula (starts with `=` and has
/// more than just the `=`).
fn is_formula_string(text: &str) -> bool {
    text.starts_with('=') && text.len() > 1
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    /// Stores the raw edit text verbatim, including a leading `'` escape
    /// if present — `GetText` must retain it even though `GetValue` strips
    /// it.
    Text(String),
    Formula(Formula),
}

impl Cell {
    /// Builds a `Cell` from raw edit text, following spec's classification
    /// rule: empty text -> `Empty`; text of length >= 2 beginning with `=`
    /// -> parsed as a formula from the substring after `=`; anything else
    /// -> literal text, stored verbatim (this includes the single
    /// character `"="` and apostrophe-prefixed text, both literal).
    pub fn set(text: &str) -> Result<Cell, ParseError> {
        if text.is_empty() {
            return Ok(Cell::Empty);
        }
        if is_formula_string(text) {
            let formula = parse_formula(&text[1..])?;
            return Ok(Cell::Formula(formula));
        }
        Ok(Cell::Text(text.to_string()))
    }

    /// Restores the `Empty` variant.
    pub fn clear() -> Cell {
        Cell::Empty
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// The text that would reproduce this cell if passed back to `set`.
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Formula(f) => format!("={}", f.canonical_text()),
        }
    }

    /// The cell's value, computed fresh against `lookup` on every call (no
    /// caching). `lookup` is the callable the owning Sheet supplies,
    /// standing in for the "back-reference to its owning Sheet" the
    /// formula evaluator needs to resolve `CellRef` nodes. A leading `'`
    /// escape is stripped here (but not from `text()`).
    pub fn value(&self, lookup: &dyn CellLookup) -> CellValue {
        match self {
            Cell::Empty => CellValue::Text(String::new()),
            Cell::Text(s) => match s.strip_prefix('\'') {
                Some(rest) => CellValue::Text(rest.to_string()),
                None => CellValue::Text(s.clone()),
            },
            Cell::Formula(f) => f.evaluate(lookup),
        }
    }

    /// The positions this cell's formula reads; empty for non-formula
    /// cells.
    pub fn referenced_cells(&self) -> Vec<Position> {
        match self {
            Cell::Formula(f) => f.referenced_cells(),
            _ => Vec::new(),
        }
    }
}

/// Wire format is the cell's own `text()` — the single authoritative,
/// round-trippable form spec §3 already requires (`set(cell.text())`
/// reproduces an equivalent cell). Matches the teacher's `Cell`, which
/// likewise carries its formula across the Tauri IPC/persistence boundary
/// as a plain `Option<String>` rather than a serialized AST.
impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.text())
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Cell::set(&text).map_err(serde::de::Error::custom)
    }
}
