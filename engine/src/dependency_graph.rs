//! FILENAME: engine/src/dependency_graph.rs
//! PURPOSE: The forward-only "cell -> cells it reads" edge map and cycle
//! detection.
//! CONTEXT: Deliberately forward-only, unlike a richer graph that also
//! keeps a reverse `dependents` map and a topological recalculation order:
//! there is no cross-read result cache here, so there is nothing to
//! incrementally recalculate, only the cycle-membership test an edit
//! needs. Mirrors the C++ original's single `dependencies_` map exactly.

use std::collections::{HashMap, HashSet};
use std::fmt;

use parser::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleError {
    pub position: Position,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "circular reference through {}", self.position)
    }
}

impl std::error::Error for CycleError {}

#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    precedents: HashMap<Position, HashSet<Position>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        DependencyGraph::default()
    }

    /// The positions `pos`'s formula reads; empty if `pos` has no entry.
    pub fn get_precedents(&self, pos: Position) -> HashSet<Position> {
        self.precedents.get(&pos).cloned().unwrap_or_default()
    }

    /// Replaces `pos`'s outgoing edges. Called only after a cycle check has
    /// already passed, so this never needs to validate anything itself.
    pub fn set_dependencies(&mut self, pos: Position, deps: HashSet<Position>) {
        if deps.is_empty() {
            self.precedents.remove(&pos);
        } else {
            self.precedents.insert(pos, deps);
        }
    }

    /// Removes `pos`'s outgoing edges entirely (used when a cell becomes
    /// non-formula or is cleared).
    pub fn clear_dependencies(&mut self, pos: Position) {
        self.precedents.remove(&pos);
    }

    /// True if adding `pos -> dep` for every `dep` in `new_deps` would
    /// create a cycle, i.e. if `pos` is reachable from any of `new_deps`
    /// via existing precedent edges (equivalently: any `dep` can already
    /// reach `pos`, or `dep == pos`).
    pub fn would_create_cycle(&self, pos: Position, new_deps: &HashSet<Position>) -> bool {
        new_deps
            .iter()
            .any(|dep| *dep == pos || self.can_reach(*dep, pos))
    }

    /// DFS over precedent edges: can `from` reach `to`?
    fn can_reach(&self, from: Position, to: Position) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(next) = self.precedents.get(&current) {
                stack.extend(next.iter().copied());
            }
        }
        false
    }

    pub fn dependency_count(&self) -> usize {
        self.precedents.values().map(|deps| deps.len()).sum()
    }

    pub fn clear(&mut self) {
        self.precedents.clear();
    }
}
