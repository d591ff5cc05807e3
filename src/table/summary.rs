//! Summary row, rendered after the body rows when `use_data_summary` is set.
//!
//! A component of its own: the summary subscription never gates the rows.

use std::rc::Rc;

use crate::engine::{h, Component, Cx, Element};
use crate::error::RenderError;
use crate::types::Props;

use super::column::TableColumn;
use super::options::TableRowOptions;

pub(crate) struct TableSummaryRow<R, D> {
    pub columns: Rc<[TableColumn<R, D>]>,
    pub options: Rc<TableRowOptions<R, D>>,
}

impl<R, D> PartialEq for TableSummaryRow<R, D> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.columns, &other.columns) && Rc::ptr_eq(&self.options, &other.options)
    }
}

impl<R, D> Component for TableSummaryRow<R, D>
where
    R: 'static,
    D: Clone + PartialEq + Default + 'static,
{
    fn render(&self, cx: &mut Cx<'_>) -> Result<Element, RenderError> {
        let use_data_summary = self.options.use_data_summary.clone();
        let data = cx.use_selector(move || use_data_summary.as_ref().map(|f| f()).unwrap_or_default());

        let cells = self.columns.iter().enumerate().map(|(index, column)| {
            let content = column
                .cell_summary
                .as_ref()
                .map(|summary| summary.resolve(&data))
                .unwrap_or_default();
            h("td")
                .key(index)
                .style(Props::new().with("text_align", column.column_type.text_align()))
                .child(content)
        });

        Ok(h("tr").children(cells).into())
    }

    fn name(&self) -> &'static str {
        "TableSummaryRow"
    }
}
