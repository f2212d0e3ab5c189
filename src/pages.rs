//! Markup components over a reconciled document tree
//!
//! This module provides access to weft-pages: components render markup
//! strings, the reconciler patches the live tree to match, and the store
//! shares observable values between components.
//!
//! ## Architecture
//!
//! - **Component System**: lifecycle hooks, local state and delegated events
//! - **State Store**: named observable values with explicit subscriptions
//! - **Reconciler**: positional diff and patch of the live tree
//! - **Routing**: in-memory history published into the store
//!
//! ## Example
//!
//! ```rust,ignore
//! use weft::pages::prelude::*;
//!
//! struct Greeting;
//!
//! impl Component for Greeting {
//!     fn render(&self, ctx: &Context<Self>) -> Result<String, RenderError> {
//!         let name = ctx.state().get::<String>("name").unwrap_or_default();
//!         Ok(format!("<p>hello {name}</p>"))
//!     }
//! }
//! ```

// Re-export all weft-pages functionality
pub use weft_pages::*;
