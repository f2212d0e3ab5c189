//! Client-side routing for weft-pages
//!
//! The router is a thin collaborator of the component system: it keeps an
//! in-memory session history, resolves the current path against its routes
//! and publishes the outcome into the [`StateStore`] under the configured
//! router state key. A top-level component observes that key and renders
//! whichever page it names.
//!
//! ## Route Patterns
//!
//! - `/` - root
//! - `/about` - static segments
//! - `/user/:id` - `:`-prefixed segments bind parameters
//!
//! Unmatched paths redirect to `/`.
//!
//! ## Usage
//!
//! ```ignore
//! use weft_pages::router::{Route, Router};
//!
//! #[derive(Clone, Copy, PartialEq)]
//! enum Page { Home, User }
//!
//! let router = Router::new(&store, vec![
//!     Route::new("/", Page::Home),
//!     Route::new("/user/:id", Page::User),
//! ])?;
//!
//! router.push("/user/42")?;
//! assert_eq!(router.state().params["id"], "42");
//! ```
//!
//! [`StateStore`]: crate::store::StateStore

mod core;
mod history;
mod pattern;

pub use self::core::{Route, RouteMatch, Router, RouterError, RouterState};
pub use history::{History, HistoryEntry};
pub use pattern::{match_params, match_path, parse_params};
