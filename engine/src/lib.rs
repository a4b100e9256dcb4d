//! FILENAME: engine/src/lib.rs
//! PURPOSE: The cell-content model and the Sheet aggregate.

pub mod cell;
pub mod dependency_graph;
pub mod sheet;

pub use cell::Cell;
pub use dependency_graph::{CycleError, DependencyGraph};
pub use sheet::{create_sheet, Sheet, SheetError};
