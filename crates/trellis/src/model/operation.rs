//! Pending structural operations.
//!
//! Every `begin_*` call on a model pushes an [`Operation`] onto the model's
//! operation stack; the matching `end_*` call pops it and applies it to the
//! persistent index registry. Operations nest in strict LIFO order.

use std::collections::HashMap;
use std::fmt;

use super::index::ModelIndex;

/// The kind of structural change an operation describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Rows or columns are inserted.
    Insert,
    /// Rows or columns are deleted.
    Delete,
    /// Rows or columns are moved, possibly to another parent.
    Move,
}

/// Whether an operation affects rows or columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The operation shifts row numbers.
    Row,
    /// The operation shifts column numbers.
    Column,
}

impl Direction {
    /// Returns the coordinate of `index` along this direction.
    #[inline]
    pub fn dimension(self, index: &ModelIndex) -> usize {
        match self {
            Direction::Row => index.row(),
            Direction::Column => index.column(),
        }
    }

    /// Returns a copy of `index` with its coordinate along this direction
    /// replaced by `value`.
    pub(crate) fn with_dimension(self, index: &ModelIndex, value: usize) -> ModelIndex {
        match self {
            Direction::Row => index.relocated(value, index.column()),
            Direction::Column => index.relocated(index.row(), value),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Insert => f.write_str("insert"),
            OperationKind::Delete => f.write_str("delete"),
            OperationKind::Move => f.write_str("move"),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Row => f.write_str("rows"),
            Direction::Column => f.write_str("columns"),
        }
    }
}

/// A structural change that has begun but not yet been committed.
#[derive(Debug, Clone)]
pub struct Operation {
    /// What the operation does.
    pub kind: OperationKind,
    /// Whether it affects rows or columns.
    pub direction: Direction,
    /// Parent under which the affected range lives.
    pub source_parent: ModelIndex,
    /// First affected row or column.
    pub first: usize,
    /// Last affected row or column (inclusive).
    pub last: usize,
    /// Destination parent, for moves.
    pub target_parent: Option<ModelIndex>,
    /// Final position of the first moved item, for moves.
    pub target: Option<usize>,
    /// Handle keys that expire when a delete commits.
    pub(crate) doomed: Vec<ModelIndex>,
    /// Parent of every tracked handle when a move began.
    pub(crate) parents: HashMap<ModelIndex, ModelIndex>,
}

impl Operation {
    /// Describes an insertion of `first..=last` under `parent`.
    pub fn insert(direction: Direction, parent: ModelIndex, first: usize, last: usize) -> Self {
        Self::new(OperationKind::Insert, direction, parent, first, last)
    }

    /// Describes a deletion of `first..=last` under `parent`.
    pub fn delete(direction: Direction, parent: ModelIndex, first: usize, last: usize) -> Self {
        Self::new(OperationKind::Delete, direction, parent, first, last)
    }

    /// Describes a move of `first..=last` under `source_parent` so that the
    /// block starts at `target` under `target_parent`.
    pub fn moving(
        direction: Direction,
        source_parent: ModelIndex,
        first: usize,
        last: usize,
        target_parent: ModelIndex,
        target: usize,
    ) -> Self {
        Self {
            target_parent: Some(target_parent),
            target: Some(target),
            ..Self::new(OperationKind::Move, direction, source_parent, first, last)
        }
    }

    fn new(
        kind: OperationKind,
        direction: Direction,
        source_parent: ModelIndex,
        first: usize,
        last: usize,
    ) -> Self {
        Self {
            kind,
            direction,
            source_parent,
            first,
            last,
            target_parent: None,
            target: None,
            doomed: Vec::new(),
            parents: HashMap::new(),
        }
    }

    /// Number of rows or columns affected.
    #[inline]
    pub fn count(&self) -> usize {
        self.last - self.first + 1
    }

    /// Returns `true` if `value` lies within `first..=last`.
    #[inline]
    pub fn contains(&self, value: usize) -> bool {
        (self.first..=self.last).contains(&value)
    }

    /// Returns `true` if this is a move that stays under one parent.
    pub fn is_move_within(&self) -> bool {
        self.target_parent.as_ref() == Some(&self.source_parent)
    }

    /// Returns `true` if this move leaves every item where it was.
    pub fn is_noop_move(&self) -> bool {
        self.kind == OperationKind::Move && self.is_move_within() && self.target == Some(self.first)
    }
}

/// Applies a move to a vector the way a committed move operation describes
/// it: `first..=last` is taken out and reinserted so that its first element
/// lands at `target`.
pub(crate) fn move_block<T>(items: &mut Vec<T>, first: usize, last: usize, target: usize) {
    let block: Vec<T> = items.drain(first..=last).collect();
    let tail = items.split_off(target);
    items.extend(block);
    items.extend(tail);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_and_contains() {
        let op = Operation::delete(Direction::Row, ModelIndex::invalid(), 4, 6);
        assert_eq!(op.kind, OperationKind::Delete);
        assert_eq!(op.count(), 3);
        assert!(op.contains(4));
        assert!(op.contains(6));
        assert!(!op.contains(3));
        assert!(!op.contains(7));
        assert!(op.target.is_none());
    }

    #[test]
    fn test_move_within() {
        let op = Operation::moving(
            Direction::Row,
            ModelIndex::invalid(),
            2,
            3,
            ModelIndex::invalid(),
            2,
        );
        assert!(op.is_move_within());
        assert!(op.is_noop_move());

        let op = Operation::moving(
            Direction::Column,
            ModelIndex::invalid(),
            0,
            0,
            ModelIndex::invalid(),
            3,
        );
        assert!(!op.is_noop_move());
    }

    #[test]
    fn test_move_block() {
        let mut items: Vec<usize> = (0..10).collect();
        move_block(&mut items, 0, 1, 5);
        assert_eq!(items, vec![2, 3, 4, 5, 6, 0, 1, 7, 8, 9]);

        move_block(&mut items, 5, 6, 0);
        assert_eq!(items, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_display() {
        assert_eq!(OperationKind::Move.to_string(), "move");
        assert_eq!(Direction::Column.to_string(), "columns");
    }
}
