//! Per-row configuration and data bindings.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use crate::engine::Element;
use crate::types::{Key, Props};

/// Closes the row editor.
pub type CloseHandler = Rc<dyn Fn()>;

/// A callback over `(row, index, data)`.
///
/// `index` is the position from the row's last render. A reorder moves rows
/// without rendering them, so it can lag behind the current display order.
pub type RowFn<R, D, T> = Rc<dyn Fn(&R, usize, &D) -> T>;

/// How toggling the header checkbox is reported to `on_selected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectAllMode {
    /// One `on_selected(None, selected)` call.
    #[default]
    Aggregate,
    /// One `on_selected(Some(row), selected)` call per current row.
    PerRow,
}

/// How to render and bind each row of a table.
///
/// `use_data`, `use_selected` and `use_data_summary` are read through
/// selector subscriptions: they must be side-effect free and are
/// re-evaluated whenever a signal they read changes. A row re-renders only
/// when one of its own bindings changes value.
pub struct TableRowOptions<R, D> {
    /// Content spanning the whole row while it is edited. Call the handler
    /// to close the editor.
    pub editor: Option<Rc<dyn Fn(CloseHandler, &R, usize, &D) -> Element>>,
    /// Defaults to editable.
    pub is_editable: Option<RowFn<R, D, bool>>,
    /// An excluded row renders as a hidden placeholder.
    pub is_excluded: Option<RowFn<R, D, bool>>,
    /// Label of the edit button; defaults to `row {index + 1}`. The index is
    /// the one from the row's last render, so prefer a label from the data.
    pub label: Option<RowFn<R, D, String>>,
    /// Selection changed by the user. `None` means all rows.
    pub on_selected: Option<Rc<dyn Fn(Option<&R>, bool)>>,
    /// Extra properties merged onto the row's `tr`.
    pub props: Option<RowFn<R, D, Props>>,
    /// Style of the row's `tr`.
    pub style: Option<RowFn<R, D, Props>>,
    pub use_data: Option<Rc<dyn Fn(&R) -> D>>,
    /// Enables the summary row.
    pub use_data_summary: Option<Rc<dyn Fn() -> D>>,
    pub use_selected: Option<Rc<dyn Fn(&R) -> bool>>,
    pub select_all: SelectAllMode,
    pub render_counter: Option<RenderCounter>,
}

impl<R, D> TableRowOptions<R, D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn editor(mut self, f: impl Fn(CloseHandler, &R, usize, &D) -> Element + 'static) -> Self {
        self.editor = Some(Rc::new(f));
        self
    }

    pub fn is_editable(mut self, f: impl Fn(&R, usize, &D) -> bool + 'static) -> Self {
        self.is_editable = Some(Rc::new(f));
        self
    }

    pub fn is_excluded(mut self, f: impl Fn(&R, usize, &D) -> bool + 'static) -> Self {
        self.is_excluded = Some(Rc::new(f));
        self
    }

    pub fn label(mut self, f: impl Fn(&R, usize, &D) -> String + 'static) -> Self {
        self.label = Some(Rc::new(f));
        self
    }

    pub fn on_selected(mut self, f: impl Fn(Option<&R>, bool) + 'static) -> Self {
        self.on_selected = Some(Rc::new(f));
        self
    }

    pub fn row_props(mut self, f: impl Fn(&R, usize, &D) -> Props + 'static) -> Self {
        self.props = Some(Rc::new(f));
        self
    }

    pub fn row_style(mut self, f: impl Fn(&R, usize, &D) -> Props + 'static) -> Self {
        self.style = Some(Rc::new(f));
        self
    }

    pub fn use_data(mut self, f: impl Fn(&R) -> D + 'static) -> Self {
        self.use_data = Some(Rc::new(f));
        self
    }

    pub fn use_data_summary(mut self, f: impl Fn() -> D + 'static) -> Self {
        self.use_data_summary = Some(Rc::new(f));
        self
    }

    pub fn use_selected(mut self, f: impl Fn(&R) -> bool + 'static) -> Self {
        self.use_selected = Some(Rc::new(f));
        self
    }

    pub fn select_all(mut self, mode: SelectAllMode) -> Self {
        self.select_all = mode;
        self
    }

    pub fn render_counter(mut self, counter: RenderCounter) -> Self {
        self.render_counter = Some(counter);
        self
    }
}

impl<R, D> Default for TableRowOptions<R, D> {
    fn default() -> Self {
        Self {
            editor: None,
            is_editable: None,
            is_excluded: None,
            label: None,
            on_selected: None,
            props: None,
            style: None,
            use_data: None,
            use_data_summary: None,
            use_selected: None,
            select_all: SelectAllMode::default(),
            render_counter: None,
        }
    }
}

impl<R, D> fmt::Debug for TableRowOptions<R, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableRowOptions")
            .field("editor", &self.editor.is_some())
            .field("use_data", &self.use_data.is_some())
            .field("use_data_summary", &self.use_data_summary.is_some())
            .field("use_selected", &self.use_selected.is_some())
            .field("select_all", &self.select_all)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// RenderCounter
// =============================================================================

/// Records which rows rendered in the viewing state.
///
/// Shared handle: clones observe the same record.
#[derive(Debug, Clone, Default)]
pub struct RenderCounter {
    rendered: Rc<RefCell<HashSet<Key>>>,
}

impl RenderCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, key: Key) {
        self.rendered.borrow_mut().insert(key);
    }

    /// Distinct rows rendered since the last reset.
    pub fn count(&self) -> usize {
        self.rendered.borrow().len()
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.rendered.borrow().contains(key)
    }

    pub fn reset(&self) {
        self.rendered.borrow_mut().clear();
    }
}
