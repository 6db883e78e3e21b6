//! Hierarchy dumps for debugging models.
//!
//! ```
//! use trellis::model::{ModelTreeDebug, TreeModel};
//!
//! let model = TreeModel::<String>::new();
//! let root = model.add_root("src".to_string());
//! model.add_child(root, "lib.rs".to_string()).unwrap();
//!
//! let dump = ModelTreeDebug::new(&*model).to_string();
//! assert!(dump.contains("lib.rs"));
//! ```

use std::fmt;

use trellis_core::{PerfSpan, TreeFormatOptions, TreeStyle};

use super::index::ModelIndex;
use super::traits::ItemModel;

/// Renders the rows of a model as an indented tree.
///
/// Every row is printed with its display text; columns past the first are
/// appended separated by `|`. Use [`TreeFormatOptions::detailed`] to also
/// print internal ids and mark cells tracked by a persistent index with `*`.
pub struct ModelTreeDebug<'a, M: ItemModel + ?Sized> {
    model: &'a M,
    options: TreeFormatOptions,
}

impl<'a, M: ItemModel + ?Sized> ModelTreeDebug<'a, M> {
    /// Create a formatter with default options.
    pub fn new(model: &'a M) -> Self {
        Self::with_options(model, TreeFormatOptions::default())
    }

    /// Create a formatter with custom options.
    pub fn with_options(model: &'a M, options: TreeFormatOptions) -> Self {
        Self { model, options }
    }

    /// Render the whole model.
    pub fn format_all(&self) -> String {
        let _perf = PerfSpan::new("model_tree_debug");
        self.to_string()
    }

    /// Render the rows below `parent` only, without a header line.
    pub fn format_subtree(&self, parent: &ModelIndex) -> String {
        struct Subtree<'b, 'a, M: ItemModel + ?Sized>(&'b ModelTreeDebug<'a, M>, &'b ModelIndex);

        impl<M: ItemModel + ?Sized> fmt::Display for Subtree<'_, '_, M> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.format_children(f, self.1, 1)
            }
        }

        Subtree(self, parent).to_string()
    }

    fn format_children(&self, f: &mut fmt::Formatter<'_>, parent: &ModelIndex, depth: usize) -> fmt::Result {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }
        let rows = self.model.row_count(parent);
        for row in 0..rows {
            let index = self.model.index(row, 0, parent);
            if !index.is_valid() {
                continue;
            }
            self.format_row(f, &index, depth, row + 1 == rows)?;
            if self.model.has_children(&index) {
                self.format_children(f, &index, depth + 1)?;
            }
        }
        Ok(())
    }

    fn format_row(&self, f: &mut fmt::Formatter<'_>, index: &ModelIndex, depth: usize, is_last: bool) -> fmt::Result {
        f.write_str(&self.options.prefix(depth, is_last))?;
        f.write_str(&self.cell_text(index))?;

        let parent = index.parent();
        let columns = self.model.column_count(&parent);
        for column in 1..columns {
            let cell = self.model.index(index.row(), column, &parent);
            write!(f, " | {}", self.cell_text(&cell))?;
        }

        if self.options.show_positions {
            write!(f, " ({}, {})", index.row(), index.column())?;
        }
        if self.options.show_ids {
            write!(f, " [#{}]", index.internal_id())?;
        }
        if self.options.show_persistent && self.model.state().is_tracked(index) {
            f.write_str(" *")?;
        }
        writeln!(f)
    }

    fn cell_text(&self, index: &ModelIndex) -> String {
        self.model
            .display_text(index)
            .unwrap_or_else(|| "(no data)".to_string())
    }
}

impl<M: ItemModel + ?Sized> fmt::Display for ModelTreeDebug<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = ModelIndex::invalid();
        let state = self.model.state();
        writeln!(
            f,
            "{} ({} top-level rows, {} persistent handles):",
            state.config().display_name(),
            self.model.row_count(&root),
            self.model.persistent_index_count(),
        )?;
        if self.model.row_count(&root) == 0 {
            let indent = if self.options.style == TreeStyle::Compact { "" } else { "  " };
            return writeln!(f, "{indent}(empty)");
        }
        self.format_children(f, &root, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ListModel, ModelConfig, TableModel, TreeModel};

    fn ascii() -> TreeFormatOptions {
        TreeFormatOptions {
            style: TreeStyle::Ascii,
            show_positions: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_format_tree() {
        let model = TreeModel::<String>::new();
        let root = model.add_root("root".to_string());
        model.add_child(root, "a".to_string()).unwrap();
        model.add_child(root, "b".to_string()).unwrap();

        let output = ModelTreeDebug::with_options(&*model, ascii()).format_all();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "model (1 top-level rows, 0 persistent handles):");
        assert_eq!(lines[1], "`-- root");
        assert_eq!(lines[2], "|  +-- a");
        assert_eq!(lines[3], "|  `-- b");
    }

    #[test]
    fn test_empty_model() {
        let model = ListModel::<String>::with_config(
            Vec::new(),
            ModelConfig::builder().name("fruit").build(),
        );
        let output = ModelTreeDebug::new(&*model).format_all();
        assert!(output.starts_with("fruit (0 top-level rows"));
        assert!(output.contains("(empty)"));
    }

    #[test]
    fn test_marks_tracked_cells() {
        let model = ListModel::new(vec!["a".to_string(), "b".to_string()]);
        let index = model.index(1, 0, &ModelIndex::invalid());
        let _tracked = model.register_persistent_index(&index);

        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..TreeFormatOptions::detailed()
        };
        let output = ModelTreeDebug::with_options(&*model, options).format_all();
        assert!(output.contains("+-- a (0, 0) [#0]\n"));
        assert!(output.contains("`-- b (1, 0) [#0] *\n"));
    }

    #[test]
    fn test_table_columns_and_max_depth() {
        let model = TableModel::from_rows(
            vec!["name".into(), "qty".into()],
            vec![vec!["apple".to_string(), "3".to_string()]],
        )
        .unwrap();
        let output = ModelTreeDebug::with_options(&*model, ascii()).format_all();
        assert!(output.contains("`-- apple | 3"));

        let tree = TreeModel::<String>::new();
        let root = tree.add_root("root".to_string());
        tree.add_child(root, "hidden".to_string()).unwrap();
        let options = TreeFormatOptions {
            max_depth: Some(1),
            ..ascii()
        };
        let output = ModelTreeDebug::with_options(&*tree, options).format_all();
        assert!(output.contains("root"));
        assert!(!output.contains("hidden"));
    }

    #[test]
    fn test_format_subtree() {
        let model = TreeModel::<String>::new();
        let root = model.add_root("root".to_string());
        model.add_child(root, "leaf".to_string()).unwrap();

        let output = ModelTreeDebug::with_options(&*model, ascii()).format_subtree(&model.index_of(root));
        assert_eq!(output, "`-- leaf\n");
    }
}
