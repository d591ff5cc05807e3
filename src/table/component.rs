//! The `Table` component and its body.

use std::fmt;
use std::rc::Rc;

use crate::engine::{h, Component, Cx, Element};
use crate::error::RenderError;

use super::column::TableColumn;
use super::header::{SortHandler, TableHeaderRow};
use super::options::{SelectAllMode, TableRowOptions};
use super::row::TableRow;
use super::rows::{RowId, RowSource};
use super::sort::SortOrder;
use super::summary::TableSummaryRow;

/// A row-granular table.
///
/// Renders a `table` with a header row, one keyed [`TableRow`] per row of
/// `rows` and, when `use_data_summary` is configured, a summary row.
///
/// ```ignore
/// let table = Table::new(columns, RowSource::list(ids), Rc::new(row_options))
///     .sort_order(order, move |next| set_order.set(next));
/// root.render(Element::component(table))?;
/// ```
pub struct Table<R, D> {
    pub columns: Rc<[TableColumn<R, D>]>,
    pub rows: RowSource<R>,
    pub row_options: Rc<TableRowOptions<R, D>>,
    pub sort_order: Option<SortOrder>,
    pub on_sort_order_change: Option<SortHandler>,
    pub caption: Option<String>,
}

impl<R: RowId, D> Table<R, D> {
    pub fn new(
        columns: Rc<[TableColumn<R, D>]>,
        rows: RowSource<R>,
        row_options: Rc<TableRowOptions<R, D>>,
    ) -> Self {
        Self {
            columns,
            rows,
            row_options,
            sort_order: None,
            on_sort_order_change: None,
            caption: None,
        }
    }

    /// Enable sort buttons on sortable columns.
    pub fn sort_order(mut self, order: SortOrder, on_change: impl Fn(SortOrder) + 'static) -> Self {
        self.sort_order = Some(order);
        self.on_sort_order_change = Some(Rc::new(on_change));
        self
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

impl<R: PartialEq, D> PartialEq for Table<R, D> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.columns, &other.columns)
            && self.rows == other.rows
            && Rc::ptr_eq(&self.row_options, &other.row_options)
            && self.sort_order == other.sort_order
            && match (&self.on_sort_order_change, &other.on_sort_order_change) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
            && self.caption == other.caption
    }
}

impl<R: fmt::Debug, D> fmt::Debug for Table<R, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("columns", &self.columns)
            .field("rows", &self.rows)
            .field("sort_order", &self.sort_order)
            .field("caption", &self.caption)
            .finish_non_exhaustive()
    }
}

/// Memo dependency compared by allocation.
struct SameRc<T: ?Sized>(Rc<T>);

impl<T: ?Sized> PartialEq for SameRc<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<R, D> Component for Table<R, D>
where
    R: RowId,
    D: Clone + PartialEq + Default + 'static,
{
    fn render(&self, cx: &mut Cx<'_>) -> Result<Element, RenderError> {
        // Filter once per column list, not per row or per render
        let columns: Rc<[TableColumn<R, D>]> =
            cx.use_memo(SameRc(self.columns.clone()), |SameRc(all)| {
                all.iter().filter(|column| !column.is_excluded).cloned().collect()
            });

        let on_select_all: Rc<dyn Fn(bool)> = {
            let options = self.row_options.clone();
            let rows = self.rows.clone();
            Rc::new(move |selected| {
                let Some(on_selected) = &options.on_selected else { return };
                match options.select_all {
                    SelectAllMode::Aggregate => on_selected(None, selected),
                    SelectAllMode::PerRow => {
                        for row in rows.iter() {
                            on_selected(Some(&row), selected);
                        }
                    }
                }
            })
        };

        let header = Element::component(TableHeaderRow {
            columns: columns.clone(),
            sort_order: self.sort_order.clone(),
            on_sort_order_change: self.on_sort_order_change.clone(),
            on_select_all,
        });
        let body = Element::component(TableBody {
            rows: self.rows.clone(),
            columns: columns.clone(),
            options: self.row_options.clone(),
        });
        let summary = self.row_options.use_data_summary.is_some().then(|| {
            Element::component(TableSummaryRow {
                columns: columns.clone(),
                options: self.row_options.clone(),
            })
        });
        let caption = self.caption.as_ref().map(|caption| h("caption").child(caption.as_str()));

        Ok(h("table")
            .child(caption)
            .child(h("thead").child(header))
            .child(h("tbody").child(body).child(summary))
            .into())
    }

    fn name(&self) -> &'static str {
        "Table"
    }
}

/// Keyed rows. Reads the row sequence through a selector, so a successor
/// source backed by signals re-renders only the body when rows change.
struct TableBody<R, D> {
    rows: RowSource<R>,
    columns: Rc<[TableColumn<R, D>]>,
    options: Rc<TableRowOptions<R, D>>,
}

impl<R: PartialEq, D> PartialEq for TableBody<R, D> {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
            && Rc::ptr_eq(&self.columns, &other.columns)
            && Rc::ptr_eq(&self.options, &other.options)
    }
}

impl<R, D> Component for TableBody<R, D>
where
    R: RowId,
    D: Clone + PartialEq + Default + 'static,
{
    fn render(&self, cx: &mut Cx<'_>) -> Result<Element, RenderError> {
        let source = self.rows.clone();
        let rows: Vec<R> = cx.use_selector(move || source.iter().collect());

        let rows = rows.into_iter().enumerate().map(|(index, row)| {
            Element::keyed_component(
                row.key(),
                TableRow {
                    row,
                    index,
                    columns: self.columns.clone(),
                    options: self.options.clone(),
                },
            )
        });
        Ok(Element::fragment(rows))
    }

    fn name(&self) -> &'static str {
        "TableBody"
    }
}
