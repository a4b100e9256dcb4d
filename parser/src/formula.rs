//! FILENAME: parser/src/formula.rs
//! PURPOSE: A parsed formula: evaluation, canonical text, referenced cells.
//! CONTEXT: A standalone evaluable object, rather than a value cached on a
//! cell at write time. Shaped after the C++ original's `Formula`/
//! `FormulaInterface` pair (`formula.cpp`), which exposes exactly these
//! three operations.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::parser::{ParseError, Parser};
use crate::position::Position;
use crate::value::{CellLookup, CellValue, FormulaError};

#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    root: Expr,
}

impl Formula {
    /// Parses formula text (without the leading `=`) into a `Formula`.
    pub fn parse(text: &str) -> Result<Formula, ParseError> {
        let root = Parser::new(text).parse()?;
        Ok(Formula { root })
    }

    /// Evaluates the formula against the given lookup, converting the
    /// terminal `Result<f64, FormulaError>` into a `CellValue` exactly
    /// once, at this boundary — mirroring the C++ original's
    /// `Formula::Evaluate`, which catches a raised `FormulaError` at the
    /// top and returns it as the value rather than propagating an
    /// exception to the caller.
    pub fn evaluate(&self, lookup: &dyn CellLookup) -> CellValue {
        match eval(&self.root, lookup) {
            Ok(n) => CellValue::Number(n),
            Err(e) => CellValue::Error(e),
        }
    }

    /// The canonical textual form, without the leading `=`.
    pub fn canonical_text(&self) -> String {
        self.root.to_canonical_string()
    }

    /// Every valid cell position this formula reads, sorted in row-major
    /// order with duplicates removed.
    pub fn referenced_cells(&self) -> Vec<Position> {
        let mut out = Vec::new();
        self.root.referenced_cells(&mut out);
        out.sort();
        out.dedup();
        out
    }
}

/// Parses and wraps formula text in one step.
pub fn parse_formula(text: &str) -> Result<Formula, ParseError> {
    Formula::parse(text)
}

/// Evaluates an expression to a plain `f64`, never threading the full
/// `CellValue` enum through recursive calls: no subexpression other than a
/// bare `CellRef` can ever evaluate to text, so carrying `CellValue`
/// through every `Binary`/`Unary` level would mean matching out an
/// unreachable `Text` arm at every step. Mirrors the C++ original's
/// internal AST execution, which is likewise `double`-only.
fn eval(expr: &Expr, lookup: &dyn CellLookup) -> Result<f64, FormulaError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::InvalidCellRef(_) => Err(FormulaError::Ref),
        Expr::CellRef(pos) => match lookup.value_at(*pos) {
            CellValue::Number(n) => Ok(n),
            CellValue::Error(e) => Err(e),
            CellValue::Text(s) if s.is_empty() => Ok(0.0),
            CellValue::Text(s) => {
                // Attempt to parse the referenced cell's text as a
                // full-string decimal number, tolerating surrounding
                // whitespace. `f64::from_str` already rejects
                // partial/trailing-garbage parses.
                s.trim().parse::<f64>().map_err(|_| FormulaError::Value)
            }
        },
        Expr::Unary { op, child } => {
            let v = eval(child, lookup)?;
            Ok(match op {
                UnaryOp::Plus => v,
                UnaryOp::Minus => -v,
            })
        }
        Expr::Binary { op, left, right } => {
            let l = eval(left, lookup)?;
            let r = eval(right, lookup)?;
            let result = match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => l / r,
            };
            if result.is_finite() {
                Ok(result)
            } else {
                Err(FormulaError::Arithmetic)
            }
        }
    }
}
