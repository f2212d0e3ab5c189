//! Component lifecycle for weft-pages
//!
//! A component renders a markup string; mounting it onto a target [`Node`]
//! reconciles that markup into the live tree and keeps it in sync afterwards.
//!
//! ## Features
//!
//! - **Component trait**: optional lifecycle hooks with no-op defaults
//! - **Local state**: JSON object fields shallow-merged by `set_state`
//! - **Store observation**: re-render on every change of an observed key,
//!   subscribed until unmount
//! - **Delegated events**: one listener on the component root per handler
//! - **Child components**: mounted onto the freshly reconciled tree
//!
//! Re-renders run synchronously on the caller's stack. A render hook that
//! keeps calling `set_state` is cut off by the depth bound in
//! [`PagesConfig::max_render_depth`](crate::config::PagesConfig::max_render_depth).
//!
//! ## Usage
//!
//! ```ignore
//! use weft_pages::component::{Component, Context, RenderError, mount};
//! use weft_pages::dom::Node;
//! use weft_pages::store::StateStore;
//!
//! struct Hello;
//!
//! impl Component for Hello {
//!     fn render(&self, _ctx: &Context<Self>) -> Result<String, RenderError> {
//!         Ok(r#"<div id="app"><p>hello</p></div>"#.to_string())
//!     }
//! }
//!
//! let store = StateStore::new();
//! let body = Node::element("body");
//! let app = Node::element("div").with_attr("id", "app");
//! body.append_child(&app);
//!
//! let mounted = mount(app, Hello, &store)?;
//! assert_eq!(body.inner_html(), r#"<div id="app"><p>hello</p></div>"#);
//! mounted.unmount();
//! ```
//!
//! [`Node`]: crate::dom::Node

mod instance;
mod state;
mod r#trait;

pub use instance::{Context, Mounted, Phase, mount};
pub use state::{LocalState, LocalStateError, StatePatch};
pub use r#trait::Component;

use crate::dom::SelectorError;
use crate::markup::MarkupError;

/// Error type for render passes and lifecycle hooks.
///
/// A failed pass applies nothing: the live tree keeps its previous content.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
	/// A component hook reported a failure.
	#[error("{component}: {message}")]
	Hook {
		/// Component name
		component: &'static str,
		/// Failure description
		message: String,
	},
	/// The rendered markup is not a single-rooted tree.
	#[error("invalid markup: {0}")]
	Markup(#[from] MarkupError),
	/// Synchronous re-renders nested deeper than the configured bound.
	#[error("{component}: render recursion exceeded depth {depth}")]
	RecursionLimit {
		/// Component name
		component: &'static str,
		/// Configured maximum depth
		depth: usize,
	},
	/// The instance was already unmounted.
	#[error("{component} is unmounted")]
	Unmounted {
		/// Component name
		component: &'static str,
	},
	/// A local state patch could not be merged.
	#[error(transparent)]
	State(#[from] LocalStateError),
	/// An event or mount selector could not be parsed.
	#[error(transparent)]
	Selector(#[from] SelectorError),
	/// A child mount selector matched nothing in the component's tree.
	#[error("no element matches mount point `{selector}`")]
	MissingMountPoint {
		/// Selector that matched nothing
		selector: String,
	},
}

impl RenderError {
	/// Creates a [`RenderError::Hook`] for component `C`.
	pub fn hook<C: Component>(message: impl Into<String>) -> Self {
		Self::Hook {
			component: C::name(),
			message: message.into(),
		}
	}
}
