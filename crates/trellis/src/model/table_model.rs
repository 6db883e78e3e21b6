//! Table model implementation for 2D grid data.
//!
//! `TableModel` stores a grid of cells under named columns. Rows and columns
//! can both be inserted, removed and moved; each change runs as a structural
//! transaction so persistent indices into the grid follow their cells.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use trellis_core::{ModelError, Result};

use super::config::ModelConfig;
use super::index::ModelIndex;
use super::operation::move_block;
use super::state::ModelState;
use super::traits::{ItemFlags, ItemModel, UpdateFlags};
use super::variant::{ModelRole, Variant};

/// Type alias for a cell data extractor function.
pub type CellExtractor<T> = Arc<dyn Fn(&T, ModelRole) -> Variant + Send + Sync>;

struct Grid<T> {
    headers: Vec<String>,
    rows: Vec<Vec<T>>,
}

/// A table model for displaying 2D grid data.
///
/// # Example
///
/// ```
/// use trellis::model::{ItemModel, ModelIndex, TableModel};
///
/// let model = TableModel::new(vec!["Name".to_string(), "Age".to_string()]);
/// model.push_row(vec!["Alice".to_string(), "30".to_string()]).unwrap();
/// model.push_row(vec!["Bob".to_string(), "25".to_string()]).unwrap();
///
/// let age = model.register_persistent_index(&model.index(1, 1, &ModelIndex::invalid()));
/// model.move_columns(1, 1, 0).unwrap();
/// assert_eq!(age.column(), Some(0));
/// assert_eq!(model.column_name(0).as_deref(), Some("Age"));
/// ```
pub struct TableModel<T> {
    grid: RwLock<Grid<T>>,
    extractor: CellExtractor<T>,
    state: ModelState,
}

fn cell_data<T: Clone + Into<Variant>>(cell: &T, role: ModelRole) -> Variant {
    match role {
        ModelRole::Display | ModelRole::Edit | ModelRole::Sort => cell.clone().into(),
        _ => Variant::Invalid,
    }
}

impl<T: Clone + Into<Variant> + Send + Sync + 'static> TableModel<T> {
    /// Creates an empty table with the given column headers.
    pub fn new(headers: Vec<String>) -> Arc<Self> {
        Self::with_config(headers, ModelConfig::default())
    }

    /// Creates an empty table with the given column headers and configuration.
    pub fn with_config(headers: Vec<String>, config: ModelConfig) -> Arc<Self> {
        Self::build(headers, Vec::new(), Arc::new(cell_data::<T>), config)
    }

    /// Creates a table from existing rows.
    ///
    /// Every row must have one cell per header.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<T>>) -> Result<Arc<Self>> {
        check_rows(headers.len(), &rows)?;
        Ok(Self::build(
            headers,
            rows,
            Arc::new(cell_data::<T>),
            ModelConfig::default(),
        ))
    }
}

fn check_rows<T>(columns: usize, rows: &[Vec<T>]) -> Result<()> {
    match rows.iter().find(|row| row.len() != columns) {
        Some(row) => Err(ModelError::column_out_of_range(row.len(), columns)),
        None => Ok(()),
    }
}

impl<T: Send + Sync + 'static> TableModel<T> {
    /// Creates a table whose cell data comes from an extractor.
    pub fn with_extractor<F>(headers: Vec<String>, rows: Vec<Vec<T>>, extractor: F) -> Result<Arc<Self>>
    where
        F: Fn(&T, ModelRole) -> Variant + Send + Sync + 'static,
    {
        check_rows(headers.len(), &rows)?;
        Ok(Self::build(
            headers,
            rows,
            Arc::new(extractor),
            ModelConfig::default(),
        ))
    }

    fn build(
        headers: Vec<String>,
        rows: Vec<Vec<T>>,
        extractor: CellExtractor<T>,
        config: ModelConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| Self {
            grid: RwLock::new(Grid { headers, rows }),
            extractor,
            state: ModelState::with_config(weak.clone(), config),
        })
    }

    /// Returns the number of rows.
    pub fn row_count_value(&self) -> usize {
        self.grid.read().rows.len()
    }

    /// Returns the number of columns.
    pub fn column_count_value(&self) -> usize {
        self.grid.read().headers.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.grid.read().rows.is_empty()
    }

    /// Returns the column headers.
    pub fn headers(&self) -> Vec<String> {
        self.grid.read().headers.clone()
    }

    /// Returns a copy of the cell at `(row, column)`.
    pub fn cell(&self, row: usize, column: usize) -> Option<T>
    where
        T: Clone,
    {
        self.grid.read().rows.get(row)?.get(column).cloned()
    }

    /// Appends a row.
    pub fn push_row(&self, cells: Vec<T>) -> Result<()> {
        let row = self.row_count_value();
        self.insert_row(row, cells)
    }

    /// Inserts a row at `row`. The row must have one cell per column.
    pub fn insert_row(&self, row: usize, cells: Vec<T>) -> Result<()> {
        let (rows, columns) = {
            let grid = self.grid.read();
            (grid.rows.len(), grid.headers.len())
        };
        if row > rows {
            return Err(ModelError::row_out_of_range(row, rows));
        }
        if cells.len() != columns {
            return Err(ModelError::column_out_of_range(cells.len(), columns));
        }
        self.insert_rows_with(&ModelIndex::invalid(), row, row, || {
            self.grid.write().rows.insert(row, cells);
        });
        Ok(())
    }

    /// Removes and returns the row at `row`.
    pub fn remove_row(&self, row: usize) -> Result<Vec<T>> {
        let rows = self.row_count_value();
        self.delete_rows_with(&ModelIndex::invalid(), row, row, || {
            self.grid.write().rows.remove(row)
        })
        .ok_or_else(|| ModelError::row_out_of_range(row, rows))
    }

    /// Moves rows `first..=last` so that the first of them ends up at `target`.
    pub fn move_rows(&self, first: usize, last: usize, target: usize) -> Result<()> {
        let rows = self.row_count_value();
        check_move(first, last, target, rows)?;
        let root = ModelIndex::invalid();
        self.move_rows_with(&root, first, last, &root, target, || {
            move_block(&mut self.grid.write().rows, first, last, target);
        });
        Ok(())
    }

    /// Inserts a column named `header` at `column`, with one cell per row.
    pub fn insert_column(&self, column: usize, header: impl Into<String>, cells: Vec<T>) -> Result<()> {
        let (rows, columns) = {
            let grid = self.grid.read();
            (grid.rows.len(), grid.headers.len())
        };
        if column > columns {
            return Err(ModelError::column_out_of_range(column, columns));
        }
        if cells.len() != rows {
            return Err(ModelError::row_out_of_range(cells.len(), rows));
        }
        let header = header.into();
        self.insert_columns_with(&ModelIndex::invalid(), column, column, || {
            let mut grid = self.grid.write();
            grid.headers.insert(column, header);
            for (row, cell) in grid.rows.iter_mut().zip(cells) {
                row.insert(column, cell);
            }
        });
        Ok(())
    }

    /// Removes the column at `column`, returning its header and cells.
    pub fn remove_column(&self, column: usize) -> Result<(String, Vec<T>)> {
        let columns = self.column_count_value();
        self.delete_columns_with(&ModelIndex::invalid(), column, column, || {
            let mut grid = self.grid.write();
            let header = grid.headers.remove(column);
            let cells: Vec<T> = grid.rows.iter_mut().map(|row| row.remove(column)).collect();
            (header, cells)
        })
        .ok_or_else(|| ModelError::column_out_of_range(column, columns))
    }

    /// Moves columns `first..=last` so that the first of them ends up at `target`.
    pub fn move_columns(&self, first: usize, last: usize, target: usize) -> Result<()> {
        let columns = self.column_count_value();
        check_move(first, last, target, columns)?;
        let root = ModelIndex::invalid();
        self.move_columns_with(&root, first, last, &root, target, || {
            let mut grid = self.grid.write();
            move_block(&mut grid.headers, first, last, target);
            for row in grid.rows.iter_mut() {
                move_block(row, first, last, target);
            }
        });
        Ok(())
    }

    /// Replaces the cell at `(row, column)`, returning the previous value.
    pub fn set_cell(&self, row: usize, column: usize, value: T) -> Result<T> {
        let previous = {
            let mut grid = self.grid.write();
            let rows = grid.rows.len();
            let columns = grid.headers.len();
            let cells = grid
                .rows
                .get_mut(row)
                .ok_or_else(|| ModelError::row_out_of_range(row, rows))?;
            let cell = cells
                .get_mut(column)
                .ok_or_else(|| ModelError::column_out_of_range(column, columns))?;
            std::mem::replace(cell, value)
        };
        self.invalidate(UpdateFlags::DONT_INVALIDATE_INDEXES);
        Ok(previous)
    }

    /// Renames a column.
    pub fn set_header(&self, column: usize, header: impl Into<String>) -> Result<()> {
        {
            let mut grid = self.grid.write();
            let columns = grid.headers.len();
            let slot = grid
                .headers
                .get_mut(column)
                .ok_or_else(|| ModelError::column_out_of_range(column, columns))?;
            *slot = header.into();
        }
        self.invalidate(UpdateFlags::DONT_INVALIDATE_INDEXES);
        Ok(())
    }

    /// Removes every row, keeping the columns.
    pub fn clear(&self) {
        let rows = self.row_count_value();
        if rows == 0 {
            return;
        }
        self.delete_rows_with(&ModelIndex::invalid(), 0, rows - 1, || {
            self.grid.write().rows.clear();
        });
    }
}

fn check_move(first: usize, last: usize, target: usize, count: usize) -> Result<()> {
    if first > last || last >= count {
        return Err(ModelError::invalid_move(format!(
            "range {first}..={last} is outside 0..{count}"
        )));
    }
    let moved = last - first + 1;
    if target > count - moved {
        return Err(ModelError::invalid_move(format!(
            "cannot place {moved} item(s) at {target} out of {count}"
        )));
    }
    Ok(())
}

impl<T: Send + Sync + 'static> ItemModel for TableModel<T> {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        if parent.is_valid() {
            0
        } else {
            self.row_count_value()
        }
    }

    fn column_count(&self, parent: &ModelIndex) -> usize {
        if parent.is_valid() {
            0
        } else {
            self.column_count_value()
        }
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if parent.is_valid() {
            return ModelIndex::invalid();
        }
        {
            let grid = self.grid.read();
            if row >= grid.rows.len() || column >= grid.headers.len() {
                return ModelIndex::invalid();
            }
        }
        self.create_index(row, column, None, 0)
    }

    fn parent(&self, _index: &ModelIndex) -> ModelIndex {
        ModelIndex::invalid()
    }

    fn data(&self, index: &ModelIndex, role: ModelRole) -> Variant {
        if !index.belongs_to(self) {
            return Variant::Invalid;
        }
        let grid = self.grid.read();
        match grid.rows.get(index.row()).and_then(|row| row.get(index.column())) {
            Some(cell) => (self.extractor)(cell, role),
            None => Variant::Invalid,
        }
    }

    fn state(&self) -> &ModelState {
        &self.state
    }

    fn flags(&self, index: &ModelIndex) -> ItemFlags {
        if index.belongs_to(self) {
            ItemFlags::new().with_never_has_children(true)
        } else {
            ItemFlags::disabled()
        }
    }

    fn has_children(&self, parent: &ModelIndex) -> bool {
        !parent.is_valid() && !self.is_empty()
    }

    fn column_name(&self, column: usize) -> Option<String> {
        self.grid.read().headers.get(column).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Arc<TableModel<String>> {
        let headers = vec!["Name".to_string(), "Department".to_string(), "Salary".to_string()];
        let rows = vec![
            vec!["Alice".to_string(), "Engineering".to_string(), "100".to_string()],
            vec!["Bob".to_string(), "Sales".to_string(), "80".to_string()],
            vec!["Carol".to_string(), "Support".to_string(), "70".to_string()],
        ];
        TableModel::from_rows(headers, rows).unwrap()
    }

    fn text(model: &TableModel<String>, row: usize, column: usize) -> Option<String> {
        model.display_text(&model.index(row, column, &ModelIndex::invalid()))
    }

    #[test]
    fn test_table_shape() {
        let model = sample();
        let root = ModelIndex::invalid();
        assert_eq!(model.row_count(&root), 3);
        assert_eq!(model.column_count(&root), 3);
        assert_eq!(text(&model, 1, 1).as_deref(), Some("Sales"));
        assert_eq!(model.column_name(2).as_deref(), Some("Salary"));
        assert!(!model.index(3, 0, &root).is_valid());
        assert!(!model.index(0, 3, &root).is_valid());

        let cell = model.index(0, 0, &root);
        assert_eq!(model.row_count(&cell), 0);
        assert!(!model.has_children(&cell));
    }

    #[test]
    fn test_from_rows_rejects_ragged_rows() {
        let result = TableModel::from_rows(
            vec!["A".to_string(), "B".to_string()],
            vec![vec!["only one".to_string()]],
        );
        assert!(matches!(result, Err(ModelError::ColumnOutOfRange { .. })));
    }

    #[test]
    fn test_row_operations_track_cells() {
        let model = sample();
        let root = ModelIndex::invalid();
        let carol_salary = model.register_persistent_index(&model.index(2, 2, &root));

        model
            .insert_row(0, vec!["Dan".into(), "Ops".into(), "60".into()])
            .unwrap();
        assert_eq!(carol_salary.row(), Some(3));
        assert_eq!(carol_salary.column(), Some(2));

        model.move_rows(3, 3, 0).unwrap();
        assert_eq!(carol_salary.row(), Some(0));
        assert_eq!(text(&model, 0, 0).as_deref(), Some("Carol"));

        let removed = model.remove_row(0).unwrap();
        assert_eq!(removed[0], "Carol");
        assert!(!carol_salary.is_valid());
    }

    #[test]
    fn test_column_operations_track_cells() {
        let model = sample();
        let root = ModelIndex::invalid();
        let bob_salary = model.register_persistent_index(&model.index(1, 2, &root));
        let bob_name = model.register_persistent_index(&model.index(1, 0, &root));

        model
            .insert_column(1, "Id", vec!["1".into(), "2".into(), "3".into()])
            .unwrap();
        assert_eq!(bob_salary.column(), Some(3));
        assert_eq!(bob_name.column(), Some(0));
        assert_eq!(model.column_name(1).as_deref(), Some("Id"));

        model.move_columns(3, 3, 0).unwrap();
        assert_eq!(bob_salary.column(), Some(0));
        assert_eq!(bob_name.column(), Some(1));
        assert_eq!(model.headers(), vec!["Salary", "Name", "Id", "Department"]);
        assert_eq!(text(&model, 1, 0).as_deref(), Some("80"));

        let (header, cells) = model.remove_column(1).unwrap();
        assert_eq!(header, "Name");
        assert_eq!(cells, vec!["Alice", "Bob", "Carol"]);
        assert!(!bob_name.is_valid());
        assert_eq!(bob_salary.column(), Some(0));
    }

    #[test]
    fn test_out_of_range() {
        let model = sample();
        assert!(model.remove_row(3).is_err());
        assert!(model.remove_column(3).is_err());
        assert!(model.insert_column(0, "X", vec!["only".into()]).is_err());
        assert!(model.set_cell(0, 9, "x".into()).is_err());
        assert!(matches!(
            model.move_columns(1, 2, 2),
            Err(ModelError::InvalidMove(_))
        ));
        assert_eq!(model.state().pending_operations(), 0);
    }

    #[test]
    fn test_move_to_huge_target_is_rejected() {
        let model = sample();
        assert!(matches!(
            model.move_rows(0, 1, usize::MAX),
            Err(ModelError::InvalidMove(_))
        ));
        assert!(matches!(
            model.move_columns(0, 0, usize::MAX),
            Err(ModelError::InvalidMove(_))
        ));
        assert_eq!(text(&model, 0, 0).as_deref(), Some("Alice"));
        assert_eq!(model.state().pending_operations(), 0);
    }

    #[test]
    fn test_set_cell_and_header() {
        let model = sample();
        let previous = model.set_cell(0, 2, "120".into()).unwrap();
        assert_eq!(previous, "100");
        assert_eq!(model.cell(0, 2).as_deref(), Some("120"));

        model.set_header(2, "Pay").unwrap();
        assert_eq!(model.column_name(2).as_deref(), Some("Pay"));
    }

    #[test]
    fn test_extractor() {
        let model = TableModel::with_extractor(
            vec!["Value".to_string()],
            vec![vec![3i64], vec![4]],
            |value, role| match role {
                ModelRole::Display => Variant::from(format!("#{value}")),
                ModelRole::Sort => Variant::from(*value),
                _ => Variant::Invalid,
            },
        )
        .unwrap();
        let index = model.index(1, 0, &ModelIndex::invalid());
        assert_eq!(model.display_text(&index).as_deref(), Some("#4"));
        assert_eq!(model.data(&index, ModelRole::Sort).as_int(), Some(4));
    }
}
