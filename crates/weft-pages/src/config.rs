//! Runtime settings shared by the store, the components and the router.
//!
//! Settings can be built in code or loaded from TOML:
//!
//! ```ignore
//! use weft_pages::PagesConfig;
//!
//! let config = PagesConfig::from_toml(r#"
//!     max_render_depth = 8
//!     router_state_key = "nav"
//! "#)?;
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default bound on nested synchronous render passes of one component.
pub const DEFAULT_MAX_RENDER_DEPTH: usize = 16;

/// Default store key the router publishes navigation state under.
pub const DEFAULT_ROUTER_STATE_KEY: &str = "router-state";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// The configuration file could not be read.
	#[error("failed to read config file {}: {source}", path.display())]
	Io {
		/// Path that failed to load
		path: PathBuf,
		/// Underlying IO error
		#[source]
		source: std::io::Error,
	},
	/// The configuration content is not valid TOML for [`PagesConfig`].
	#[error("failed to parse config: {message}")]
	Parse {
		/// Parser message
		message: String,
	},
}

/// Settings for a Weft application.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagesConfig {
	/// Maximum depth of nested render passes for a single component instance.
	///
	/// A render or mount hook that calls `set_state` re-renders synchronously.
	/// Once the nesting exceeds this bound the pass fails with
	/// [`RenderError::RecursionLimit`](crate::component::RenderError::RecursionLimit).
	pub max_render_depth: usize,

	/// Store key holding the router's `{page, params}` state.
	pub router_state_key: String,

	/// Log every individual patch operation applied by the reconciler.
	pub trace_patches: bool,
}

impl Default for PagesConfig {
	fn default() -> Self {
		Self {
			max_render_depth: DEFAULT_MAX_RENDER_DEPTH,
			router_state_key: DEFAULT_ROUTER_STATE_KEY.to_string(),
			trace_patches: false,
		}
	}
}

impl PagesConfig {
	/// Creates the default configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the maximum nested render depth.
	pub fn with_max_render_depth(mut self, depth: usize) -> Self {
		self.max_render_depth = depth;
		self
	}

	/// Sets the router state key.
	pub fn with_router_state_key(mut self, key: impl Into<String>) -> Self {
		self.router_state_key = key.into();
		self
	}

	/// Enables or disables per-operation patch tracing.
	pub fn with_trace_patches(mut self, enabled: bool) -> Self {
		self.trace_patches = enabled;
		self
	}

	/// Load configuration from a TOML file.
	///
	/// # Errors
	///
	/// Returns error if file cannot be read or parsed.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
			path: path.as_ref().to_path_buf(),
			source: e,
		})?;

		Self::from_toml(&content)
	}

	/// Parse configuration from TOML string.
	pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
		toml::from_str(content).map_err(|e| ConfigError::Parse {
			message: e.to_string(),
		})
	}
}
