//! A single body row.
//!
//! Each row is its own component keyed by its [`RowId`], so a data change
//! confined to one row renders only that row. Reactive inputs:
//! - `use_data(row)` and `use_selected(row)` through selector subscriptions
//! - local `editing` state
//!
//! The row index is not part of the row's identity. Reordering moves rows
//! without rendering them again.

use std::rc::Rc;

use crate::engine::{h, Component, Cx, Element, StateSetter};
use crate::error::RenderError;
use crate::types::Props;

use super::column::TableColumn;
use super::options::{CloseHandler, TableRowOptions};
use super::rows::RowId;

pub(crate) struct TableRow<R, D> {
    pub row: R,
    pub index: usize,
    pub columns: Rc<[TableColumn<R, D>]>,
    pub options: Rc<TableRowOptions<R, D>>,
}

impl<R: PartialEq, D> PartialEq for TableRow<R, D> {
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row
            && Rc::ptr_eq(&self.columns, &other.columns)
            && Rc::ptr_eq(&self.options, &other.options)
    }
}

impl<R, D> Component for TableRow<R, D>
where
    R: RowId,
    D: Clone + PartialEq + Default + 'static,
{
    fn render(&self, cx: &mut Cx<'_>) -> Result<Element, RenderError> {
        let options = &self.options;
        let (row, index) = (&self.row, self.index);

        let data = {
            let use_data = options.use_data.clone();
            let row = row.clone();
            cx.use_selector(move || use_data.as_ref().map(|f| f(&row)).unwrap_or_default())
        };
        let selected = {
            let use_selected = options.use_selected.clone();
            let row = row.clone();
            cx.use_selector(move || use_selected.as_ref().is_some_and(|f| f(&row)))
        };
        let (editing, set_editing) = cx.use_state(|| false);

        let excluded = options
            .is_excluded
            .as_ref()
            .is_some_and(|f| f(row, index, &data));
        if excluded {
            return Ok(h("tr")
                .style(Props::new().with("display", "none"))
                .into());
        }

        if editing {
            let Some(editor) = &options.editor else {
                return Err(RenderError::MissingEditor {
                    row: format!("{row:?}"),
                });
            };
            let close = set_editing.clone();
            let on_close: CloseHandler = Rc::new(move || close.set(false));
            return Ok(h("tr")
                .child(
                    h("td")
                        .prop("col_span", self.columns.len())
                        .style(Props::new().with("background_color", "yellow"))
                        .child(editor(on_close, row, index, &data)),
                )
                .into());
        }

        if let Some(counter) = &options.render_counter {
            counter.record(row.key());
        }
        let editable = options
            .is_editable
            .as_ref()
            .is_none_or(|f| f(row, index, &data));
        let style = options
            .style
            .as_ref()
            .map(|f| f(row, index, &data))
            .unwrap_or_default();
        let extra = options
            .props
            .as_ref()
            .map(|f| f(row, index, &data))
            .unwrap_or_default();

        let cells = self.columns.iter().enumerate().map(|(column_index, column)| {
            self.cell(column, column_index, &data, selected, editable, &set_editing)
        });

        Ok(h("tr").style(style).props(&extra).children(cells).into())
    }

    fn name(&self) -> &'static str {
        "TableRow"
    }
}

impl<R: RowId, D> TableRow<R, D> {
    fn cell(
        &self,
        column: &TableColumn<R, D>,
        column_index: usize,
        data: &D,
        selected: bool,
        editable: bool,
        set_editing: &StateSetter<bool>,
    ) -> Element {
        let (row, index) = (&self.row, self.index);

        let content: Element = if column.is_select_column {
            let on_selected = self.options.on_selected.clone();
            let row = row.clone();
            h("input")
                .prop("type", "checkbox")
                .prop("checked", selected)
                .on_change(move |event| {
                    if let Some(on_selected) = &on_selected {
                        on_selected(Some(&row), event.target_checked());
                    }
                })
                .into()
        } else if editable && column.is_edit_column {
            let label = match &self.options.label {
                Some(label) => label(row, index, data),
                None => format!("row {}", index + 1),
            };
            let setter = set_editing.clone();
            h("button")
                .on_click(move |_| setter.set(true))
                .child(format!("Edit {label}"))
                .into()
        } else {
            column
                .cell
                .as_ref()
                .map(|cell| cell.resolve(row, index, data))
                .unwrap_or_default()
        };

        let mut style = Props::new().with("text_align", column.column_type.text_align());
        if let Some(cell_style) = &column.cell_style {
            style.merge(&cell_style.resolve(row, index, data));
        }

        h("td").key(column_index).style(style).child(content).into()
    }
}
