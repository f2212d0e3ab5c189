//! Convenience re-exports for common usage.
//!
//! ```ignore
//! use weft_pages::prelude::*;
//! ```

// Components
pub use crate::component::{Component, Context, Mounted, RenderError, StatePatch, mount};

// Store
pub use crate::store::{StateKey, StateStore, StateUpdate, StoreError, StoreKey};

// Tree
pub use crate::dom::{Event, Node};

// Routing
pub use crate::router::{Route, Router, RouterState};

// Settings
pub use crate::config::PagesConfig;
