//! Column descriptors.

use std::fmt;
use std::rc::Rc;

use crate::engine::Element;
use crate::types::Props;

/// Content alignment class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnType {
    #[default]
    String,
    /// Right-aligned.
    Number,
}

impl ColumnType {
    pub fn text_align(self) -> &'static str {
        match self {
            ColumnType::String => "left",
            ColumnType::Number => "right",
        }
    }
}

/// A per-cell value: fixed, or computed from `(row, index, data)`.
pub enum CellValue<R, D, T> {
    Constant(T),
    Computed(Rc<dyn Fn(&R, usize, &D) -> T>),
}

impl<R, D, T: Clone> CellValue<R, D, T> {
    pub fn computed(f: impl Fn(&R, usize, &D) -> T + 'static) -> Self {
        CellValue::Computed(Rc::new(f))
    }

    pub fn resolve(&self, row: &R, index: usize, data: &D) -> T {
        match self {
            CellValue::Constant(value) => value.clone(),
            CellValue::Computed(f) => f(row, index, data),
        }
    }
}

impl<R, D, T: Clone> Clone for CellValue<R, D, T> {
    fn clone(&self) -> Self {
        match self {
            CellValue::Constant(value) => CellValue::Constant(value.clone()),
            CellValue::Computed(f) => CellValue::Computed(f.clone()),
        }
    }
}

/// Summary cell content: fixed, or computed from the summary data.
pub enum SummaryValue<D> {
    Constant(Element),
    Computed(Rc<dyn Fn(&D) -> Element>),
}

impl<D> SummaryValue<D> {
    pub fn computed(f: impl Fn(&D) -> Element + 'static) -> Self {
        SummaryValue::Computed(Rc::new(f))
    }

    pub fn resolve(&self, data: &D) -> Element {
        match self {
            SummaryValue::Constant(element) => element.clone(),
            SummaryValue::Computed(f) => f(data),
        }
    }
}

impl<D> Clone for SummaryValue<D> {
    fn clone(&self) -> Self {
        match self {
            SummaryValue::Constant(element) => SummaryValue::Constant(element.clone()),
            SummaryValue::Computed(f) => SummaryValue::Computed(f.clone()),
        }
    }
}

/// How to render one column of a table.
///
/// Construct with struct literal syntax and `..Default::default()`, or with
/// the builder methods:
/// ```ignore
/// TableColumn::new()
///     .name("age")
///     .title("Age")
///     .number()
///     .sortable()
///     .cell(|_, _, person: &PersonInfo| person.age.to_string().into())
/// ```
pub struct TableColumn<R, D> {
    /// Content of each body cell.
    pub cell: Option<CellValue<R, D, Element>>,
    /// Style merged over the default alignment of each body cell.
    pub cell_style: Option<CellValue<R, D, Props>>,
    /// Content of the summary cell.
    pub cell_summary: Option<SummaryValue<D>>,
    /// Holds the per-row edit button.
    pub is_edit_column: bool,
    /// Holds the per-row selection checkbox (and the select-all box).
    pub is_select_column: bool,
    /// Dropped from the table, e.g. behind a feature toggle.
    pub is_excluded: bool,
    pub is_sortable: bool,
    /// Identifies the column in a [`SortOrder`](super::SortOrder).
    pub name: Option<String>,
    /// Header text.
    pub title: Option<String>,
    pub column_type: ColumnType,
}

impl<R, D> TableColumn<R, D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The selection column.
    pub fn select() -> Self {
        Self {
            is_select_column: true,
            ..Self::default()
        }
    }

    /// The edit-button column.
    pub fn edit() -> Self {
        Self {
            is_edit_column: true,
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn sortable(mut self) -> Self {
        self.is_sortable = true;
        self
    }

    pub fn number(mut self) -> Self {
        self.column_type = ColumnType::Number;
        self
    }

    pub fn excluded(mut self, excluded: bool) -> Self {
        self.is_excluded = excluded;
        self
    }

    pub fn cell(mut self, f: impl Fn(&R, usize, &D) -> Element + 'static) -> Self {
        self.cell = Some(CellValue::computed(f));
        self
    }

    pub fn cell_constant(mut self, element: impl Into<Element>) -> Self {
        self.cell = Some(CellValue::Constant(element.into()));
        self
    }

    pub fn cell_style(mut self, f: impl Fn(&R, usize, &D) -> Props + 'static) -> Self {
        self.cell_style = Some(CellValue::computed(f));
        self
    }

    pub fn summary(mut self, f: impl Fn(&D) -> Element + 'static) -> Self {
        self.cell_summary = Some(SummaryValue::computed(f));
        self
    }

    pub fn summary_constant(mut self, element: impl Into<Element>) -> Self {
        self.cell_summary = Some(SummaryValue::Constant(element.into()));
        self
    }
}

impl<R, D> Default for TableColumn<R, D> {
    fn default() -> Self {
        Self {
            cell: None,
            cell_style: None,
            cell_summary: None,
            is_edit_column: false,
            is_select_column: false,
            is_excluded: false,
            is_sortable: false,
            name: None,
            title: None,
            column_type: ColumnType::default(),
        }
    }
}

impl<R, D> Clone for TableColumn<R, D> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            cell_style: self.cell_style.clone(),
            cell_summary: self.cell_summary.clone(),
            is_edit_column: self.is_edit_column,
            is_select_column: self.is_select_column,
            is_excluded: self.is_excluded,
            is_sortable: self.is_sortable,
            name: self.name.clone(),
            title: self.title.clone(),
            column_type: self.column_type,
        }
    }
}

impl<R, D> fmt::Debug for TableColumn<R, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableColumn")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("column_type", &self.column_type)
            .field("is_edit_column", &self.is_edit_column)
            .field("is_select_column", &self.is_select_column)
            .field("is_excluded", &self.is_excluded)
            .field("is_sortable", &self.is_sortable)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_resolve() {
        let constant: CellValue<u32, String, i64> = CellValue::Constant(5);
        let computed: CellValue<u32, String, i64> =
            CellValue::computed(|row, index, data: &String| *row as i64 + index as i64 + data.len() as i64);

        let data = "ab".to_string();
        assert_eq!(constant.resolve(&1, 0, &data), 5);
        assert_eq!(computed.resolve(&1, 2, &data), 5);
    }

    #[test]
    fn test_builder_flags() {
        let column: TableColumn<String, ()> = TableColumn::new().name("age").title("Age").number().sortable();

        assert_eq!(column.name.as_deref(), Some("age"));
        assert_eq!(column.column_type.text_align(), "right");
        assert!(column.is_sortable);
        assert!(!column.is_excluded);
        assert!(TableColumn::<String, ()>::select().is_select_column);
        assert!(TableColumn::<String, ()>::edit().is_edit_column);
    }
}
