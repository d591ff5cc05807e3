//! UI Primitives - Building blocks above the engine.
//!
//! This module provides:
//! - [`when`] / [`lazy`] - Suspension on deferred data or UI modules
//! - [`cache_result_of`] - Identity-preserving selector results
//!
//! # Reactivity
//!
//! Deferred values are spark-signals signals. Components observe them through
//! `use_selector`, so settling a deferred value schedules only the
//! components that read it:
//!
//! ```ignore
//! let (module, resolver) = deferred::<UiModule, String>();
//! root.render(lazy(module, "Loading..."))?;
//! root.act(|| resolver.resolve(UiModule::new(|| h("p").child("ready").into())))?;
//! ```

mod control_flow;
mod memo;

pub use control_flow::{deferred, lazy, when, AsyncState, Deferred, Resolver, UiModule, WhenOptions};
pub use memo::{cache_result_of, CachedResult};
