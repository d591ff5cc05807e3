//! Row identity and row sequences.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use crate::types::Key;

/// A row identifier. Rows are matched across renders by [`RowId::key`].
pub trait RowId: Clone + Eq + Hash + fmt::Debug + 'static {
    fn key(&self) -> Key;
}

impl RowId for String {
    fn key(&self) -> Key {
        Key::from(self.as_str())
    }
}

impl RowId for &'static str {
    fn key(&self) -> Key {
        Key::from(*self)
    }
}

impl RowId for i64 {
    fn key(&self) -> Key {
        Key::Int(*self)
    }
}

impl RowId for i32 {
    fn key(&self) -> Key {
        Key::from(*self)
    }
}

impl RowId for u32 {
    fn key(&self) -> Key {
        Key::from(*self)
    }
}

impl RowId for usize {
    fn key(&self) -> Key {
        Key::from(*self)
    }
}

/// Where rows come from.
///
/// Either way the table walks rows once from "no previous row" through
/// [`RowSource::iter`] and never indexes into the sequence.
pub enum RowSource<R> {
    List(Rc<[R]>),
    /// Next row after the given one; `None` ends the sequence.
    Successor(Rc<dyn Fn(Option<&R>) -> Option<R>>),
}

impl<R: RowId> RowSource<R> {
    pub fn list(rows: impl IntoIterator<Item = R>) -> Self {
        RowSource::List(rows.into_iter().collect())
    }

    pub fn successor(next: impl Fn(Option<&R>) -> Option<R> + 'static) -> Self {
        RowSource::Successor(Rc::new(next))
    }

    /// Lazy, finite walk over the rows.
    pub fn iter(&self) -> RowIter<'_, R> {
        RowIter {
            source: self,
            position: 0,
            previous: None,
            seen: HashSet::new(),
            done: false,
        }
    }
}

impl<R> Clone for RowSource<R> {
    fn clone(&self) -> Self {
        match self {
            RowSource::List(rows) => RowSource::List(rows.clone()),
            RowSource::Successor(next) => RowSource::Successor(next.clone()),
        }
    }
}

impl<R: PartialEq> PartialEq for RowSource<R> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RowSource::List(a), RowSource::List(b)) => Rc::ptr_eq(a, b) || a == b,
            (RowSource::Successor(a), RowSource::Successor(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<R: fmt::Debug> fmt::Debug for RowSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowSource::List(rows) => f.debug_tuple("List").field(rows).finish(),
            RowSource::Successor(_) => f.write_str("Successor"),
        }
    }
}

impl<R: RowId> Default for RowSource<R> {
    fn default() -> Self {
        RowSource::List(Rc::from(Vec::new()))
    }
}

/// Iterator returned by [`RowSource::iter`].
pub struct RowIter<'a, R> {
    source: &'a RowSource<R>,
    position: usize,
    previous: Option<R>,
    seen: HashSet<R>,
    done: bool,
}

impl<R: RowId> Iterator for RowIter<'_, R> {
    type Item = R;

    fn next(&mut self) -> Option<R> {
        if self.done {
            return None;
        }
        let next = match self.source {
            RowSource::List(rows) => {
                let row = rows.get(self.position).cloned();
                self.position += 1;
                row
            }
            RowSource::Successor(successor) => successor(self.previous.as_ref()),
        };
        let Some(row) = next else {
            self.done = true;
            return None;
        };
        if matches!(self.source, RowSource::Successor(_)) {
            if !self.seen.insert(row.clone()) {
                log::warn!("row successor revisited {row:?}; cutting the sequence");
                self.done = true;
                return None;
            }
            self.previous = Some(row.clone());
        }
        Some(row)
    }
}
