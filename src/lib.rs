//! # Weft
//!
//! A minimal UI framework: components render markup, a reconciler patches the
//! live document tree to match, and an observable store carries shared state.
//!
//! ## Feature Flags
//!
//! - `pages` (default) - component system, reconciler, store and router
//! - `debug-hooks` - verbose lifecycle logging in debug builds
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use weft::prelude::*;
//!
//! struct Counter;
//!
//! impl Component for Counter {
//!     fn observer_keys(&self) -> Vec<String> {
//!         vec!["count".to_string()]
//!     }
//!
//!     fn render(&self, ctx: &Context<Self>) -> Result<String, RenderError> {
//!         let count: i64 = ctx.store().get_state("count").unwrap_or(0);
//!         Ok(format!(r#"<div id="counter">{count}</div>"#))
//!     }
//! }
//!
//! let store = StateStore::new();
//! let count = store.init_state("count", 0_i64).unwrap();
//!
//! let root = Node::element("div").with_attr("id", "counter");
//! let _counter = mount(root, Counter, &store)?;
//!
//! store.set_state(&count).update(|n| n + 1)?;
//! ```

#[cfg(feature = "pages")]
pub mod pages;

#[cfg(feature = "pages")]
pub use weft_pages::{
	Component, Context, Event, Mounted, Node, PagesConfig, RenderError, Route, Router,
	RouterState, StateKey, StateStore, StoreError, mount,
};

pub mod prelude {
	//! Everything needed to write and mount components.

	#[cfg(feature = "pages")]
	pub use weft_pages::prelude::*;
}
