//! Header row: titles, sort buttons and the select-all checkbox.

use std::rc::Rc;

use crate::engine::{h, Component, Cx, Element, StateSetter};
use crate::error::RenderError;
use crate::types::Props;

use super::column::TableColumn;
use super::sort::SortOrder;

pub(crate) type SortHandler = Rc<dyn Fn(SortOrder)>;

pub(crate) struct TableHeaderRow<R, D> {
    pub columns: Rc<[TableColumn<R, D>]>,
    pub sort_order: Option<SortOrder>,
    pub on_sort_order_change: Option<SortHandler>,
    pub on_select_all: Rc<dyn Fn(bool)>,
}

impl<R, D> PartialEq for TableHeaderRow<R, D> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.columns, &other.columns)
            && self.sort_order == other.sort_order
            && match (&self.on_sort_order_change, &other.on_sort_order_change) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
            && Rc::ptr_eq(&self.on_select_all, &other.on_select_all)
    }
}

impl<R: 'static, D: 'static> Component for TableHeaderRow<R, D> {
    fn render(&self, cx: &mut Cx<'_>) -> Result<Element, RenderError> {
        let (is_all_selected, set_all_selected) = cx.use_state(|| false);

        let cells = self.columns.iter().enumerate().map(|(index, column)| {
            let style = Props::new()
                .with("font_weight", "bold")
                .with("text_align", column.column_type.text_align());
            h("td")
                .key(index)
                .style(style)
                .child(self.column_control(column, is_all_selected, &set_all_selected))
        });

        Ok(h("tr").children(cells).into())
    }

    fn name(&self) -> &'static str {
        "TableHeaderRow"
    }
}

impl<R, D> TableHeaderRow<R, D> {
    fn column_control(
        &self,
        column: &TableColumn<R, D>,
        is_all_selected: bool,
        set_all_selected: &StateSetter<bool>,
    ) -> Element {
        let title: Element = column.title.clone().filter(|t| !t.is_empty()).into();

        if column.is_select_column {
            let setter = set_all_selected.clone();
            let on_select_all = self.on_select_all.clone();
            return h("input")
                .prop("type", "checkbox")
                .prop("checked", is_all_selected)
                .prop("indeterminate", true)
                .on_change(move |event| {
                    let selected = event.target_checked();
                    setter.set(selected);
                    on_select_all(selected);
                })
                .into();
        }

        match (&self.sort_order, &self.on_sort_order_change, &column.name) {
            (Some(order), Some(on_change), Some(name)) if column.is_sortable => {
                let requested = order.toggled(name);
                let on_change = on_change.clone();
                let button = h("button")
                    .on_click(move |_| on_change(requested.clone()))
                    .child(order.button_text(name));
                Element::fragment([title, button.into()])
            }
            _ => title,
        }
    }
}
