//! Result caching for selectors.
//!
//! A selector that builds a fresh collection on every call returns a new
//! allocation even when nothing changed. Wrapping it with
//! [`cache_result_of`] hands back the previous result whenever the new one
//! compares equal, so `Rc`-backed results keep their pointer identity and
//! cheap identity checks downstream keep working.
//!
//! ```ignore
//! let select_ids = cache_result_of(move |order: SortOrder| sorted_ids(&store, &order));
//! let ids: Rc<[String]> = select_ids(order.clone());
//! assert!(Rc::ptr_eq(&ids, &select_ids(order)));
//! ```

use std::cell::RefCell;

/// Holds the last result; at most one value is cached.
#[derive(Debug)]
pub struct CachedResult<T> {
    last: RefCell<Option<T>>,
}

impl<T: Clone + PartialEq> CachedResult<T> {
    pub fn new() -> Self {
        Self {
            last: RefCell::new(None),
        }
    }

    /// Return the cached value if it equals `value`, otherwise cache and
    /// return `value`.
    pub fn resolve(&self, value: T) -> T {
        let mut last = self.last.borrow_mut();
        match last.as_ref() {
            Some(cached) if *cached == value => cached.clone(),
            _ => {
                *last = Some(value.clone());
                value
            }
        }
    }

    pub fn clear(&self) {
        self.last.borrow_mut().take();
    }
}

impl<T: Clone + PartialEq> Default for CachedResult<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap `selector` so equal consecutive results come back as the cached one.
pub fn cache_result_of<A, T>(selector: impl Fn(A) -> T) -> impl Fn(A) -> T
where
    T: Clone + PartialEq,
{
    let cache = CachedResult::new();
    move |args| cache.resolve(selector(args))
}

// =============================================================================
// Tests
// =============================================================================
