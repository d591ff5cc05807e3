//! Row-Granular Table - Editing large tables without re-rendering them.
//!
//! Rows are identified by a [`RowId`]; only ids flow through the table.
//! Row data is pulled per row through `use_data`, so a change confined to one
//! row re-renders just that row:
//!
//! ```text
//! Table
//! ├── thead
//! │   └── TableHeaderRow      select-all checkbox, sort buttons
//! └── tbody
//!     ├── TableBody           reads the row sequence
//!     │   ├── TableRow #1     use_data(1), use_selected(1), editing
//!     │   ├── TableRow #2
//!     │   └── ...
//!     └── TableSummaryRow     use_data_summary()
//! ```
//!
//! Row states:
//! - viewing: one cell per visible column
//! - editing: one cell spanning the row holding `editor(on_close, ..)`
//! - excluded: a hidden placeholder `tr`
//!
//! Rendering a row in the editing state without an `editor` is a fatal
//! [`RenderError::MissingEditor`](crate::error::RenderError::MissingEditor).

mod column;
mod component;
mod header;
mod options;
mod row;
mod rows;
mod sort;
mod summary;

pub use column::{CellValue, ColumnType, SummaryValue, TableColumn};
pub use component::Table;
pub use options::{CloseHandler, RenderCounter, RowFn, SelectAllMode, TableRowOptions};
pub use rows::{RowId, RowIter, RowSource};
pub use sort::{SortDirection, SortOrder};
