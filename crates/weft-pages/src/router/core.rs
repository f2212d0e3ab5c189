//! Core Router Implementation.
//!
//! The router resolves the current history location against its routes and
//! publishes the result as a [`RouterState`] under the configured
//! `router_state_key` of the store. Components observe that key to switch
//! pages.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;

use super::history::History;
use super::pattern::match_params;
use crate::store::{StateKey, StateStore, StoreError};
use crate::{debug_log, info_log, warn_log};

/// Error type for router operations.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
	/// No route matches the path.
	#[error("no route matches `{0}`")]
	NotFound(String),
	/// The router state key is registered with a value of another type.
	#[error("store key `{0}` does not hold router state")]
	KeyConflict(String),
	/// Publishing the new state failed in a subscriber.
	#[error(transparent)]
	Store(#[from] StoreError),
}

/// A single route definition.
#[derive(Clone)]
pub struct Route<P> {
	pattern: String,
	page: P,
}

impl<P> Route<P> {
	/// Creates a route mapping `pattern` to `page`.
	pub fn new(pattern: impl Into<String>, page: P) -> Self {
		Self {
			pattern: pattern.into(),
			page,
		}
	}

	/// Returns the path pattern.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Returns the page value.
	pub fn page(&self) -> &P {
		&self.page
	}
}

impl<P> fmt::Debug for Route<P> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Route")
			.field("pattern", &self.pattern)
			.finish_non_exhaustive()
	}
}

/// Navigation state published into the store.
#[derive(Debug, Clone, PartialEq)]
pub struct RouterState<P> {
	/// Page of the matched route; `None` before the first navigation or when
	/// even `/` has no route
	pub page: Option<P>,
	/// Parameters bound by the matched route
	pub params: HashMap<String, String>,
	/// Location path that was resolved
	pub path: String,
}

impl<P> Default for RouterState<P> {
	fn default() -> Self {
		Self {
			page: None,
			params: HashMap::new(),
			path: String::new(),
		}
	}
}

/// A matched route with extracted parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch<P> {
	/// The matched route's page
	pub page: P,
	/// Extracted path parameters
	pub params: HashMap<String, String>,
}

/// History-driven router publishing `{page, params}` into a [`StateStore`].
///
/// All methods take `&self`, so the router can be shared with components
/// (for instance behind an `Rc`) and called from their event handlers.
pub struct Router<P: Clone + 'static> {
	store: StateStore,
	key: StateKey<RouterState<P>>,
	routes: RefCell<Vec<Route<P>>>,
	history: RefCell<History>,
	current_index: Cell<i64>,
}

impl<P: Clone + 'static> fmt::Debug for Router<P> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("key", &self.key)
			.field("routes", &self.routes.borrow())
			.field("history", &self.history.borrow())
			.field("current_index", &self.current_index.get())
			.finish()
	}
}

impl<P: Clone + 'static> Router<P> {
	/// Creates a router starting at `/` and publishes the initial state.
	pub fn new(store: &StateStore, routes: Vec<Route<P>>) -> Result<Self, RouterError> {
		Self::with_location(store, routes, "/")
	}

	/// Creates a router starting at `path` and publishes the initial state.
	///
	/// Registers the router state key if the store does not have it yet.
	pub fn with_location(
		store: &StateStore,
		routes: Vec<Route<P>>,
		path: &str,
	) -> Result<Self, RouterError> {
		let name = store.config().router_state_key.clone();
		let key = match store.init_state(name.as_str(), RouterState::<P>::default()) {
			Some(key) => key,
			None => store
				.key::<RouterState<P>>(&name)
				.ok_or(RouterError::KeyConflict(name))?,
		};

		let router = Self {
			store: store.clone(),
			key,
			routes: RefCell::new(routes),
			history: RefCell::new(History::new(path)),
			current_index: Cell::new(0),
		};
		router.handle_popstate()?;
		Ok(router)
	}

	/// Returns the store key the router publishes under.
	pub fn state_key(&self) -> &StateKey<RouterState<P>> {
		&self.key
	}

	/// Returns the currently published state.
	pub fn state(&self) -> RouterState<P> {
		self.store.get_state(&self.key).unwrap_or_default()
	}

	/// Returns the current location path.
	pub fn location(&self) -> String {
		self.history.borrow().location().to_string()
	}

	/// Returns the navigation index of the current entry.
	pub fn current_index(&self) -> i64 {
		self.current_index.get()
	}

	/// Returns whether an entry with `index` lies behind the current one.
	pub fn is_back(&self, index: i64) -> bool {
		index < self.current_index.get()
	}

	/// Returns the number of registered routes.
	pub fn route_count(&self) -> usize {
		self.routes.borrow().len()
	}

	/// Resolves `path`; when several routes match, the last one wins.
	pub fn resolve(&self, path: &str) -> Result<RouteMatch<P>, RouterError> {
		self.routes
			.borrow()
			.iter()
			.rev()
			.find_map(|route| {
				match_params(route.pattern(), path).map(|params| RouteMatch {
					page: route.page().clone(),
					params,
				})
			})
			.ok_or_else(|| RouterError::NotFound(path.to_string()))
	}

	/// Replaces the route table and re-resolves the current location.
	pub fn set_routes(&self, routes: Vec<Route<P>>) -> Result<(), RouterError> {
		*self.routes.borrow_mut() = routes;
		self.handle_popstate()
	}

	/// Navigates to `path` with a new history entry.
	pub fn push(&self, path: &str) -> Result<(), RouterError> {
		let index = self.current_index.get() + 1;
		self.history.borrow_mut().push_state(index, path);
		info_log!("router: push {}", path);
		self.handle_popstate()
	}

	/// Navigates to `path` by overwriting the current entry.
	pub fn replace(&self, path: &str) -> Result<(), RouterError> {
		let index = self.current_index.get();
		self.history.borrow_mut().replace_state(index, path);
		info_log!("router: replace {}", path);
		self.handle_popstate()
	}

	/// Navigates to `path`, overwriting the current entry and resetting the
	/// navigation index to 0.
	pub fn clear(&self, path: &str) -> Result<(), RouterError> {
		self.history.borrow_mut().replace_state(0, path);
		info_log!("router: clear {}", path);
		self.handle_popstate()
	}

	/// Goes back one entry. At index 0 there is nothing to go back to, so `/`
	/// is pushed with index -1 instead.
	pub fn pop(&self) -> Result<(), RouterError> {
		let index = self.current_index.get();
		if index == 0 {
			self.history.borrow_mut().push_state(index - 1, "/");
			return self.handle_popstate();
		}

		if !self.history.borrow_mut().back() {
			debug_log!("router: history has no previous entry");
		}
		self.handle_popstate()
	}

	/// Resolves the current location and publishes the result.
	///
	/// An unmatched path redirects to `/`. If `/` itself is unmatched the
	/// router publishes a state without a page.
	pub fn handle_popstate(&self) -> Result<(), RouterError> {
		let (path, index) = {
			let history = self.history.borrow();
			(history.location().to_string(), history.current().index)
		};

		let state = match self.resolve(&path) {
			Ok(RouteMatch { page, params }) => RouterState {
				page: Some(page),
				params,
				path,
			},
			Err(RouterError::NotFound(_)) if path != "/" => {
				info_log!("router: no route for {}, redirecting to /", path);
				return self.replace("/");
			}
			Err(_error) => {
				warn_log!("router: {}", _error);
				RouterState {
					page: None,
					params: HashMap::new(),
					path,
				}
			}
		};

		self.store.set_state(&self.key).set(state)?;
		self.current_index.set(index);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	enum Page {
		Home,
		User,
		Settings,
	}

	fn routes() -> Vec<Route<Page>> {
		vec![
			Route::new("/", Page::Home),
			Route::new("/user/:id", Page::User),
			Route::new("/settings", Page::Settings),
		]
	}

	#[rstest]
	fn test_initial_state_published() {
		let store = StateStore::new();
		let router = Router::new(&store, routes()).unwrap();

		let state = store
			.get_state::<RouterState<Page>>("router-state")
			.unwrap();
		assert_eq!(state.page, Some(Page::Home));
		assert_eq!(state.path, "/");
		assert_eq!(router.current_index(), 0);
	}

	#[rstest]
	fn test_push_binds_params() {
		let store = StateStore::new();
		let router = Router::new(&store, routes()).unwrap();

		router.push("/user/42").unwrap();

		let state = router.state();
		assert_eq!(state.page, Some(Page::User));
		assert_eq!(state.params["id"], "42");
		assert_eq!(router.current_index(), 1);
		assert!(router.is_back(0));
	}

	#[rstest]
	fn test_unmatched_path_redirects_to_root() {
		let store = StateStore::new();
		let router = Router::new(&store, routes()).unwrap();
		router.push("/settings").unwrap();

		router.push("/nowhere").unwrap();

		// The redirect overwrites the unmatched entry, keeping the last index
		assert_eq!(router.location(), "/");
		assert_eq!(router.state().page, Some(Page::Home));
		assert_eq!(router.current_index(), 1);
	}

	#[rstest]
	fn test_unmatched_root_publishes_no_page() {
		let store = StateStore::new();
		let router = Router::with_location(&store, vec![Route::new("/only", Page::Settings)], "/x").unwrap();

		assert_eq!(router.location(), "/");
		assert_eq!(router.state().page, None);
	}

	#[rstest]
	fn test_last_matching_route_wins() {
		let store = StateStore::new();
		let router = Router::new(
			&store,
			vec![
				Route::new("/", Page::Home),
				Route::new("/user/:id", Page::User),
				Route::new("/user/:name", Page::Settings),
			],
		)
		.unwrap();

		router.push("/user/ada").unwrap();

		let state = router.state();
		assert_eq!(state.page, Some(Page::Settings));
		assert_eq!(state.params["name"], "ada");
	}

	#[rstest]
	fn test_pop_goes_back() {
		let store = StateStore::new();
		let router = Router::new(&store, routes()).unwrap();
		router.push("/settings").unwrap();
		router.push("/user/1").unwrap();

		router.pop().unwrap();

		assert_eq!(router.location(), "/settings");
		assert_eq!(router.current_index(), 1);
	}

	#[rstest]
	fn test_pop_at_first_entry_pushes_root() {
		let store = StateStore::new();
		let router = Router::with_location(&store, routes(), "/settings").unwrap();

		router.pop().unwrap();

		assert_eq!(router.location(), "/");
		assert_eq!(router.current_index(), -1);
		assert_eq!(router.state().page, Some(Page::Home));
	}

	#[rstest]
	fn test_replace_and_clear() {
		let store = StateStore::new();
		let router = Router::new(&store, routes()).unwrap();
		router.push("/settings").unwrap();

		router.replace("/user/7").unwrap();
		assert_eq!(router.current_index(), 1);
		assert_eq!(router.state().page, Some(Page::User));

		router.clear("/settings").unwrap();
		assert_eq!(router.current_index(), 0);
		assert_eq!(router.state().page, Some(Page::Settings));
	}

	#[rstest]
	fn test_set_routes_reresolves() {
		let store = StateStore::new();
		let router = Router::new(&store, routes()).unwrap();
		router.push("/settings").unwrap();

		router.set_routes(vec![Route::new("/", Page::Home)]).unwrap();

		assert_eq!(router.location(), "/");
		assert_eq!(router.route_count(), 1);
		assert_eq!(router.state().page, Some(Page::Home));
	}

	#[rstest]
	fn test_key_conflict() {
		let store = StateStore::new();
		store.init_state("router-state", 0_u32);

		let result = Router::new(&store, routes());

		assert!(matches!(result, Err(RouterError::KeyConflict(key)) if key == "router-state"));
	}

	#[rstest]
	fn test_subscribers_notified_on_navigation() {
		let store = StateStore::new();
		let router = Router::new(&store, routes()).unwrap();
		let seen = std::rc::Rc::new(RefCell::new(Vec::new()));
		let log = seen.clone();
		let observer = store.clone();
		store.subscribe("router-state", move || {
			let state: RouterState<Page> = observer.get_state("router-state").unwrap();
			log.borrow_mut().push(state.page);
		});

		router.push("/settings").unwrap();
		router.push("/nowhere").unwrap();

		// The redirect publishes once, for `/`
		assert_eq!(*seen.borrow(), vec![Some(Page::Settings), Some(Page::Home)]);
	}
}
