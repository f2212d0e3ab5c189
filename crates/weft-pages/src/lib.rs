//! Weft Pages - markup components over a reconciled document tree
//!
//! A minimal UI framework: components render markup strings, a reconciler
//! patches a live document tree to match each new rendering, and an
//! observable store lets components react to shared state.
//!
//! ## Features
//!
//! - **Observable store**: named values with subscriber sets and explicit
//!   subscription tokens
//! - **Positional reconciliation**: children are paired by index; changed
//!   subtrees are replaced wholesale, changed leaf text is patched in place
//! - **Component lifecycle**: local state, store observation until unmount,
//!   delegated events and nested children
//! - **Router**: path patterns with `:param` segments published into the store
//!
//! ## Architecture
//!
//! - [`store`]: `StateStore`, the shared observable values
//! - [`dom`]: abstract document tree, selectors and bubbling events
//! - [`markup`]: markup string to detached tree
//! - [`reconciler`]: tree diff and patch
//! - [`component`]: `Component` trait, `mount`, `Context`
//! - [`router`]: history-driven router
//! - [`config`]: `PagesConfig`, loadable from TOML
//! - [`logging`]: logging macros backed by `tracing`
//!
//! Everything is single-threaded and synchronous: a `set_state` call returns
//! after every affected component has re-rendered.
//!
//! ## Example
//!
//! ```ignore
//! use weft_pages::prelude::*;
//! use serde_json::{Value, json};
//!
//! struct Badge;
//!
//! impl Component for Badge {
//!     fn observer_keys(&self) -> Vec<String> {
//!         vec!["unread".to_string()]
//!     }
//!
//!     fn render(&self, ctx: &Context<Self>) -> Result<String, RenderError> {
//!         let unread: u32 = ctx.store().get_state("unread").unwrap_or(0);
//!         Ok(format!(r#"<span class="badge">{unread}</span>"#))
//!     }
//! }
//!
//! let store = StateStore::new();
//! let unread = store.init_state("unread", 0_u32).unwrap();
//!
//! let body = Node::element("body");
//! let badge = Node::element("span").with_attr("class", "badge");
//! body.append_child(&badge);
//! let _mounted = mount(badge, Badge, &store)?;
//!
//! store.set_state(&unread).set(3)?;
//! assert_eq!(body.inner_html(), r#"<span class="badge">3</span>"#);
//! ```

#![warn(missing_docs)]

// Core modules
pub mod config;
pub mod dom;
pub mod logging;
pub mod markup;
pub mod reconciler;
pub mod store;

// Component system
pub mod component;

// Client-side routing
pub mod router;

// Unified prelude for simplified imports
pub mod prelude;

#[doc(hidden)]
pub use tracing as __tracing;

// Re-export commonly used types
pub use component::{
	Component, Context, LocalState, LocalStateError, Mounted, Phase, RenderError, StatePatch, mount,
};
pub use config::{ConfigError, PagesConfig};
pub use dom::{Event, ListenerId, Node, NodeKind, Selector, SelectorError};
pub use markup::MarkupError;
pub use reconciler::{NodeDiff, Patch, PatchStats, Reconciler, compare_nodes, reconciliate};
pub use router::{Route, Router, RouterError, RouterState, match_path, parse_params};
pub use store::{StateKey, StateStore, StateUpdate, StoreError, StoreKey, SubscriptionId, Updater};
