//! The People table: a signal-backed store driving a row-granular table.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use spark_signals::{signal, Signal};
use spark_vdom::table::CloseHandler;
use spark_vdom::{
    cache_result_of, deferred, h, when, Component, Cx, Element, Event, Key, NodeId, Props,
    Priority, QueryError, ReconcileError, RenderCounter, RenderError, RowSource, SelectAllMode, SortDirection,
    SortOrder, Table, TableColumn, TableRowOptions, TestRenderer, WhenOptions,
};

// =============================================================================
// Store
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
struct Person {
    id: String,
    name: String,
    date_of_birth: i32,
}

fn person(id: &str, name: &str, date_of_birth: i32) -> Person {
    Person {
        id: id.to_string(),
        name: name.to_string(),
        date_of_birth,
    }
}

fn seed() -> Vec<Person> {
    vec![
        person("p1", "Adam", 2012),
        person("p2", "Susan", 1994),
        person("p3", "Joey", 1966),
        person("p4", "Ronja", 1977),
    ]
}

struct StoreState {
    people: Signal<Vec<Person>>,
    selected: Signal<BTreeSet<String>>,
}

/// External store. Reads are side-effect free; writes go through methods.
#[derive(Clone)]
struct Store(Rc<StoreState>);

impl Store {
    fn new(people: Vec<Person>) -> Self {
        Store(Rc::new(StoreState {
            people: signal(people),
            selected: signal(BTreeSet::new()),
        }))
    }

    fn load(&self, people: Vec<Person>) {
        self.0.people.set(people);
    }

    fn person(&self, id: &str) -> Option<Person> {
        self.0.people.get().into_iter().find(|p| p.id == id)
    }

    fn is_selected(&self, id: &str) -> bool {
        self.0.selected.get().contains(id)
    }

    /// `None` selects or clears every person.
    fn select_person(&self, id: Option<&str>, selected: bool) {
        let mut next = self.0.selected.get();
        match (id, selected) {
            (Some(id), true) => {
                next.insert(id.to_string());
            }
            (Some(id), false) => {
                next.remove(id);
            }
            (None, true) => next = self.0.people.get().into_iter().map(|p| p.id).collect(),
            (None, false) => next.clear(),
        }
        self.0.selected.set(next);
    }

    fn update_person(&self, id: &str, f: impl FnOnce(&mut Person)) {
        let mut people = self.0.people.get();
        if let Some(person) = people.iter_mut().find(|p| p.id == id) {
            f(person);
        }
        self.0.people.set(people);
    }

    fn add_person(&self) -> String {
        let mut people = self.0.people.get();
        let id = format!("p{}", people.len() + 1);
        people.push(person(&id, "Unnamed", 2000));
        self.0.people.set(people);
        id
    }

    fn sorted_ids(&self, order: &SortOrder) -> Rc<[String]> {
        let mut people = self.0.people.get();
        match order.column_name.as_str() {
            "date_of_birth" => people.sort_by_key(|p| p.date_of_birth),
            _ => people.sort_by(|a, b| a.name.cmp(&b.name)),
        }
        if order.direction == SortDirection::Desc {
            people.reverse();
        }
        people.into_iter().map(|p| p.id).collect()
    }

    /// Insertion order, walked one id at a time.
    fn next_id(&self, previous: Option<&String>) -> Option<String> {
        let people = self.0.people.get();
        let position = match previous {
            None => 0,
            Some(previous) => people.iter().position(|p| &p.id == previous)? + 1,
        };
        people.get(position).map(|p| p.id.clone())
    }
}

// =============================================================================
// Components
// =============================================================================

/// Labelled text input with a local draft and an explicit save button.
struct TextField {
    label: &'static str,
    value: String,
    on_save: Rc<dyn Fn(String)>,
}

impl PartialEq for TextField {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label && self.value == other.value && Rc::ptr_eq(&self.on_save, &other.on_save)
    }
}

impl Component for TextField {
    fn render(&self, cx: &mut Cx<'_>) -> Result<Element, RenderError> {
        let initial = self.value.clone();
        let (draft, set_draft) = cx.use_state(move || initial);

        let on_change = set_draft.clone();
        let on_save = self.on_save.clone();
        Ok(h("div")
            .child(
                h("input")
                    .prop("placeholder", self.label)
                    .prop("value", draft)
                    .on_change(move |event| on_change.set(event.target_value().to_string())),
            )
            .child(
                h("button")
                    .on_click(move |_| on_save(set_draft.get()))
                    .child(format!("Save {}", self.label)),
            )
            .into())
    }
}

struct PersonEditForm {
    store: Store,
    id: String,
    on_close: CloseHandler,
}

impl PartialEq for PersonEditForm {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store.0, &other.store.0) && self.id == other.id && Rc::ptr_eq(&self.on_close, &other.on_close)
    }
}

impl Component for PersonEditForm {
    fn render(&self, cx: &mut Cx<'_>) -> Result<Element, RenderError> {
        let current = {
            let (store, id) = (self.store.clone(), self.id.clone());
            cx.use_selector(move || store.person(&id).unwrap_or_default())
        };

        let save_name: Rc<dyn Fn(String)> = {
            let (store, id) = (self.store.clone(), self.id.clone());
            Rc::new(move |name: String| store.update_person(&id, |p| p.name = name))
        };
        let save_date: Rc<dyn Fn(String)> = {
            let (store, id) = (self.store.clone(), self.id.clone());
            Rc::new(move |value: String| {
                if let Ok(year) = value.trim().parse::<i32>() {
                    store.update_person(&id, |p| p.date_of_birth = year);
                }
            })
        };
        let on_close = self.on_close.clone();

        Ok(h("form")
            .child(Element::component(TextField {
                label: "name",
                value: current.name.clone(),
                on_save: save_name,
            }))
            .child(Element::component(TextField {
                label: "date of birth",
                value: current.date_of_birth.to_string(),
                on_save: save_date,
            }))
            .child(
                h("button")
                    .on_click(move |_| on_close())
                    .child(format!("Close {}", current.name)),
            )
            .into())
    }
}

fn columns() -> Rc<[TableColumn<String, Person>]> {
    Rc::from(vec![
        TableColumn::select(),
        TableColumn::new()
            .name("name")
            .title("Name")
            .sortable()
            .cell(|_, _, p: &Person| p.name.clone().into())
            .summary(|p: &Person| p.name.clone().into()),
        TableColumn::new()
            .name("date_of_birth")
            .title("Date of birth")
            .sortable()
            .number()
            .cell(|_, _, p: &Person| p.date_of_birth.to_string().into()),
        TableColumn::edit(),
    ])
}

fn row_options(store: &Store, counter: &RenderCounter) -> TableRowOptions<String, Person> {
    let (data, selected, on_selected, editor) = (store.clone(), store.clone(), store.clone(), store.clone());
    TableRowOptions::new()
        .use_data(move |id: &String| data.person(id).unwrap_or_default())
        .use_selected(move |id: &String| selected.is_selected(id))
        .on_selected(move |id: Option<&String>, checked| on_selected.select_person(id.map(String::as_str), checked))
        .label(|_, _, p: &Person| p.name.clone())
        .editor(move |on_close, id: &String, _, _| {
            Element::component(PersonEditForm {
                store: editor.clone(),
                id: id.clone(),
                on_close,
            })
        })
        .render_counter(counter.clone())
}

/// People sorted by the header's sort buttons.
struct People {
    store: Store,
    counter: RenderCounter,
    configure: fn(TableRowOptions<String, Person>) -> TableRowOptions<String, Person>,
}

impl People {
    fn new(store: &Store, counter: &RenderCounter) -> Self {
        Self {
            store: store.clone(),
            counter: counter.clone(),
            configure: |options| options,
        }
    }
}

impl PartialEq for People {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store.0, &other.store.0)
    }
}

impl Component for People {
    fn render(&self, cx: &mut Cx<'_>) -> Result<Element, RenderError> {
        let (order, set_order) = cx.use_state(|| SortOrder::asc("name"));

        let (columns, options) = cx.use_memo((), |_| {
            let options = (self.configure)(row_options(&self.store, &self.counter));
            (columns(), Rc::new(options))
        });
        let select_ids = cx.use_memo((), |_| {
            let store = self.store.clone();
            Rc::new(cache_result_of(move |order: SortOrder| store.sorted_ids(&order)))
        });
        let ids = {
            let order = order.clone();
            cx.use_selector(move || select_ids(order.clone()))
        };

        let table = Table::new(columns, RowSource::List(ids), options)
            .sort_order(order, move |next| set_order.set(next))
            .caption("People");
        Ok(Element::component(table))
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn render(store: &Store, counter: &RenderCounter) -> TestRenderer {
    TestRenderer::create(Element::component(People::new(store, counter))).unwrap()
}

fn checked_count(renderer: &TestRenderer) -> usize {
    renderer
        .find_all_by_properties(Props::new().with("checked", true))
        .len()
}

fn edit_labels(renderer: &TestRenderer) -> Vec<String> {
    renderer
        .find_all_by_kind("button")
        .iter()
        .filter_map(|button| button.text())
        .filter(|text| text.starts_with("Edit "))
        .map(str::to_string)
        .collect()
}

fn row_nodes(renderer: &TestRenderer) -> Vec<NodeId> {
    let tbody = renderer.get_by_kind("tbody").unwrap();
    tbody.children().to_vec()
}

fn row_checkbox(renderer: &TestRenderer, position: usize) -> spark_vdom::NodeRef {
    let checkboxes = renderer.find_all_by_properties(Props::new().with("type", "checkbox"));
    // The header checkbox comes first.
    checkboxes[position + 1].clone()
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_initial_render() {
    let store = Store::new(seed());
    let counter = RenderCounter::new();
    let renderer = render(&store, &counter);

    assert_eq!(counter.count(), 4, "every row renders once");
    assert_eq!(edit_labels(&renderer), vec!["Edit Adam", "Edit Joey", "Edit Ronja", "Edit Susan"]);
    assert!(renderer.find_by_text("People").is_some(), "caption");
    assert!(renderer.find_by_text("sorted asc").is_some());
    assert!(renderer.find_by_text("sort").is_some());
    assert_eq!(checked_count(&renderer), 0);
}

#[test]
fn test_select_one_renders_one_row() {
    let store = Store::new(seed());
    let counter = RenderCounter::new();
    let mut renderer = render(&store, &counter);
    counter.reset();

    let adam = row_checkbox(&renderer, 0);
    renderer.change(&adam, Event::checked(true)).unwrap();

    assert_eq!(checked_count(&renderer), 1);
    assert_eq!(counter.count(), 1);
    assert!(counter.contains(&Key::from("p1")));
    assert!(store.is_selected("p1"));
}

#[test]
fn test_select_all() {
    let store = Store::new(seed());
    let counter = RenderCounter::new();
    let mut renderer = render(&store, &counter);
    counter.reset();

    let header = renderer
        .get_by_properties(Props::new().with("type", "checkbox").with("indeterminate", true))
        .unwrap();
    let commits = renderer.root().commit_count();
    renderer.change(&header, Event::checked(true)).unwrap();

    assert_eq!(checked_count(&renderer), 5, "header plus four rows");
    assert_eq!(counter.count(), 4);
    assert_eq!(renderer.root().commit_count(), commits + 1, "one batched commit");
    let report = renderer.last_commit().unwrap();
    assert_eq!(report.priority, Priority::UserInteraction);
    assert!(report.components_rendered >= 4, "every row rendered: {report:?}");

    renderer.change(&header, Event::checked(false)).unwrap();
    assert_eq!(checked_count(&renderer), 0);
}

#[test]
fn test_select_all_per_row() {
    let store = Store::new(seed());
    let counter = RenderCounter::new();
    let calls: Rc<RefCell<Vec<Option<String>>>> = Rc::default();

    thread_local! {
        static CALLS: RefCell<Option<Rc<RefCell<Vec<Option<String>>>>>> = const { RefCell::new(None) };
    }
    CALLS.with(|cell| *cell.borrow_mut() = Some(calls.clone()));

    let people = People {
        configure: |options| {
            let forward = options.on_selected.clone();
            options.select_all(SelectAllMode::PerRow).on_selected(move |id, checked| {
                CALLS.with(|cell| {
                    if let Some(calls) = cell.borrow().as_ref() {
                        calls.borrow_mut().push(id.cloned());
                    }
                });
                if let Some(forward) = &forward {
                    forward(id, checked);
                }
            })
        },
        ..People::new(&store, &counter)
    };
    let mut renderer = TestRenderer::create(Element::component(people)).unwrap();

    let header = renderer
        .get_by_properties(Props::new().with("indeterminate", true))
        .unwrap();
    renderer.change(&header, Event::checked(true)).unwrap();

    let expected: Vec<Option<String>> = ["p1", "p3", "p4", "p2"]
        .iter()
        .map(|id| Some(id.to_string()))
        .collect();
    assert_eq!(*calls.borrow(), expected, "one call per row in display order");
    assert_eq!(checked_count(&renderer), 5);
}

#[test]
fn test_edit_round_trip() {
    let store = Store::new(seed());
    let counter = RenderCounter::new();
    let mut renderer = render(&store, &counter);

    let edit = renderer.get_by_text("Edit Adam").unwrap();
    renderer.click(&edit).unwrap();
    assert!(renderer.find_by_text("Edit Adam").is_none(), "editor replaces the row");
    assert!(renderer.find_by_text("Close Adam").is_some());
    let cell = renderer.get_by_properties(Props::new().with("col_span", 4)).unwrap();
    assert_eq!(cell.kind(), "td");

    let input = renderer
        .get_by_properties(Props::new().with("placeholder", "name"))
        .unwrap();
    renderer.change(&input, Event::value("AdamX")).unwrap();
    let save = renderer.get_by_text("Save name").unwrap();
    renderer.click(&save).unwrap();

    assert_eq!(store.person("p1").map(|p| p.name), Some("AdamX".to_string()));
    assert!(renderer.find_by_text("Close AdamX").is_some());

    counter.reset();
    let close = renderer.get_by_text("Close AdamX").unwrap();
    renderer.click(&close).unwrap();

    assert_eq!(counter.count(), 1, "only the edited row reconciles");
    assert_eq!(
        edit_labels(&renderer),
        vec!["Edit AdamX", "Edit Joey", "Edit Ronja", "Edit Susan"]
    );
}

#[test]
fn test_rename_resorts_rows() {
    let store = Store::new(seed());
    let counter = RenderCounter::new();
    let mut renderer = render(&store, &counter);
    let before = row_nodes(&renderer);
    counter.reset();

    renderer.resolve(|| store.update_person("p1", |p| p.name = "Zed".to_string())).unwrap();

    assert_eq!(edit_labels(&renderer), vec!["Edit Joey", "Edit Ronja", "Edit Susan", "Edit Zed"]);
    assert_eq!(counter.count(), 1, "moved rows are not rendered again");
    let after = row_nodes(&renderer);
    assert_eq!(after, vec![before[1], before[2], before[3], before[0]]);
    assert_eq!(renderer.last_commit().unwrap().moved, 1);
}

#[test]
fn test_sort_toggle_is_idempotent() {
    let store = Store::new(seed());
    let counter = RenderCounter::new();
    let mut renderer = render(&store, &counter);
    let original = row_nodes(&renderer);
    counter.reset();

    let button = renderer.get_by_text("sorted asc").unwrap();
    renderer.click(&button).unwrap();

    assert_eq!(edit_labels(&renderer), vec!["Edit Susan", "Edit Ronja", "Edit Joey", "Edit Adam"]);
    let reversed: Vec<NodeId> = original.iter().rev().copied().collect();
    assert_eq!(row_nodes(&renderer), reversed, "rows keep their nodes when reordered");
    assert_eq!(counter.count(), 0, "reordering renders no row");

    let button = renderer.get_by_text("sorted desc").unwrap();
    renderer.click(&button).unwrap();

    assert_eq!(row_nodes(&renderer), original);
    assert_eq!(counter.count(), 0);
}

#[test]
fn test_default_labels_keep_last_rendered_index() {
    let store = Store::new(seed());
    let counter = RenderCounter::new();
    let people = People {
        configure: |mut options| {
            options.label = None;
            options
        },
        ..People::new(&store, &counter)
    };
    let mut renderer = TestRenderer::create(Element::component(people)).unwrap();
    assert_eq!(edit_labels(&renderer), vec!["Edit row 1", "Edit row 2", "Edit row 3", "Edit row 4"]);

    let button = renderer.get_by_text("sorted asc").unwrap();
    renderer.click(&button).unwrap();

    assert_eq!(
        edit_labels(&renderer),
        vec!["Edit row 4", "Edit row 3", "Edit row 2", "Edit row 1"],
        "moved rows are not rendered again"
    );
}

#[test]
fn test_sort_by_other_column() {
    let store = Store::new(seed());
    let counter = RenderCounter::new();
    let mut renderer = render(&store, &counter);

    let button = renderer.get_by_text("sort").unwrap();
    renderer.click(&button).unwrap();

    assert_eq!(edit_labels(&renderer), vec!["Edit Joey", "Edit Ronja", "Edit Susan", "Edit Adam"]);
    assert_eq!(renderer.find_all_by_text("sorted asc").len(), 1);
    assert_eq!(renderer.find_all_by_text("sort").len(), 1);
}

#[test]
fn test_missing_editor_is_fatal() {
    let store = Store::new(seed());
    let counter = RenderCounter::new();
    let people = People {
        configure: |mut options| {
            options.editor = None;
            options
        },
        ..People::new(&store, &counter)
    };
    let mut renderer = TestRenderer::create(Element::component(people)).unwrap();

    let edit = renderer.get_by_text("Edit Adam").unwrap();
    let error = renderer.click(&edit).unwrap_err();

    assert_eq!(
        error,
        QueryError::Reconcile(ReconcileError::Render(RenderError::MissingEditor {
            row: "\"p1\"".to_string()
        }))
    );
    assert!(renderer.root().is_halted());
}

#[test]
fn test_excluded_rows_render_hidden() {
    let store = Store::new(seed());
    let counter = RenderCounter::new();
    let people = People {
        configure: |options| options.is_excluded(|_, _, p: &Person| p.date_of_birth < 1970),
        ..People::new(&store, &counter)
    };
    let renderer = TestRenderer::create(Element::component(people)).unwrap();

    assert_eq!(edit_labels(&renderer), vec!["Edit Adam", "Edit Ronja", "Edit Susan"]);
    let hidden = renderer.find_all_by_properties(
        Props::new().with("style", Props::new().with("display", "none")),
    );
    assert_eq!(hidden.len(), 1);
    assert_eq!(row_nodes(&renderer).len(), 4, "excluded row keeps its slot");
    assert_eq!(counter.count(), 3);
}

#[test]
fn test_summary_row_follows_store() {
    let store = Store::new(seed());
    let counter = RenderCounter::new();

    thread_local! {
        static SUMMARY: RefCell<Option<Store>> = const { RefCell::new(None) };
    }
    SUMMARY.with(|cell| *cell.borrow_mut() = Some(store.clone()));

    let people = People {
        configure: |options| {
            options.use_data_summary(|| {
                let count = SUMMARY
                    .with(|cell| cell.borrow().as_ref().map(|store| store.0.people.get().len()))
                    .unwrap_or_default();
                Person {
                    name: format!("{count} people"),
                    ..Person::default()
                }
            })
        },
        ..People::new(&store, &counter)
    };
    let mut renderer = TestRenderer::create(Element::component(people)).unwrap();
    assert_eq!(row_nodes(&renderer).len(), 5, "four rows plus the summary");
    assert!(renderer.find_by_text("4 people").is_some());
    counter.reset();

    renderer.resolve(|| store.add_person()).unwrap();

    assert!(renderer.find_by_text("5 people").is_some());
    assert_eq!(row_nodes(&renderer).len(), 6);
    assert!(renderer.find_by_text("Edit Unnamed").is_some());
    assert_eq!(counter.count(), 1, "existing rows are untouched");
}

// =============================================================================
// Successor source and async load
// =============================================================================

/// Rows in insertion order, read one successor at a time.
struct Roster {
    store: Store,
    counter: RenderCounter,
}

impl PartialEq for Roster {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store.0, &other.store.0)
    }
}

impl Component for Roster {
    fn render(&self, cx: &mut Cx<'_>) -> Result<Element, RenderError> {
        let (columns, options, rows) = cx.use_memo((), |_| {
            let store = self.store.clone();
            (
                columns(),
                Rc::new(row_options(&self.store, &self.counter)),
                RowSource::successor(move |previous: Option<&String>| store.next_id(previous)),
            )
        });
        Ok(Element::component(Table::new(columns, rows, options)))
    }
}

#[test]
fn test_successor_rows_and_add_person() {
    let store = Store::new(seed());
    let counter = RenderCounter::new();
    let mut renderer = TestRenderer::create(Element::component(Roster {
        store: store.clone(),
        counter: counter.clone(),
    }))
    .unwrap();

    assert_eq!(edit_labels(&renderer), vec!["Edit Adam", "Edit Susan", "Edit Joey", "Edit Ronja"]);
    assert!(renderer.find_by_text("sort").is_none(), "no sort buttons without a sort order");

    counter.reset();
    let id = renderer.resolve(|| store.add_person()).unwrap();

    assert_eq!(id, "p5");
    assert_eq!(edit_labels(&renderer).last().map(String::as_str), Some("Edit Unnamed"));
    assert_eq!(counter.count(), 1, "only the new row renders");
    assert!(counter.contains(&Key::from("p5")));
}

#[test]
fn test_async_initial_load() {
    let store = Store::new(Vec::new());
    let counter = RenderCounter::new();
    let (loaded, resolver) = deferred::<(), String>();

    let app = {
        let (store, counter) = (store.clone(), counter.clone());
        when(
            loaded,
            WhenOptions::new(move |()| Element::component(People::new(&store, &counter)))
                .pending(|| h("p").child("Loading...").into()),
        )
    };
    let mut renderer = TestRenderer::create(app).unwrap();
    assert!(renderer.find_by_text("Loading...").is_some());
    assert!(renderer.find_by_kind("table").is_none());

    renderer
        .resolve(|| {
            store.load(seed());
            resolver.resolve(());
        })
        .unwrap();

    assert!(renderer.find_by_text("Loading...").is_none());
    assert_eq!(edit_labels(&renderer).len(), 4);
    assert_eq!(counter.count(), 4);
}

#[test]
fn test_paints_to_terminal_surface() {
    let store = Store::new(seed());
    let counter = RenderCounter::new();
    let mut root = spark_vdom::Root::new(spark_vdom::TerminalHost::new());
    root.render(Element::component(People::new(&store, &counter)))
        .unwrap();

    let lines = root.host().lines();
    assert_eq!(lines[0], "People");
    assert!(lines.contains(&"[ ] │ Adam │ 2012 │ <Edit Adam>".to_string()), "{lines:#?}");

    root.act(|| store.select_person(Some("p1"), true)).unwrap();
    assert!(root.host().lines().contains(&"[x] │ Adam │ 2012 │ <Edit Adam>".to_string()));

    let mut painted = Vec::new();
    root.host().paint(&mut painted).unwrap();
    assert!(String::from_utf8_lossy(&painted).contains("Edit Susan"));
}
