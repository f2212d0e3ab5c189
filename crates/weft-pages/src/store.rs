//! StateStore - named observable values shared between components
//!
//! A [`StateStore`] maps string keys to type-erased values, each with its own
//! set of subscriber callbacks. It is an explicit object: construct one per
//! application and hand clones of it (cheap, reference counted) to components
//! and the router.
//!
//! ## Semantics
//!
//! - [`StateStore::init_state`] registers a key once; later calls for the same
//!   key are no-ops.
//! - [`StateStore::get_state`] never fails: an unknown key (or a value of
//!   another type) yields `None`.
//! - [`StateStore::set_state`] returns an [`Updater`]. Applying it replaces the
//!   value and then synchronously notifies every subscriber of that key, in
//!   subscription order. Unknown keys are a no-op.
//! - [`StateStore::subscribe`] returns a [`SubscriptionId`] token which
//!   [`StateStore::unsubscribe`] takes back. Both tolerate unknown keys.
//!
//! The subscriber set is snapshotted before a notification pass, so callbacks
//! may subscribe, unsubscribe or set other keys while being notified.
//!
//! ## Example
//!
//! ```ignore
//! use weft_pages::store::StateStore;
//!
//! let store = StateStore::new();
//! let count = store.init_state("count", 0_i32).unwrap();
//!
//! store.set_state(&count).set(5)?;
//! assert_eq!(store.get_state(&count), Some(5));
//!
//! store.set_state(&count).update(|n| n + 1)?;
//! assert_eq!(store.get_state(&count), Some(6));
//! ```

use core::fmt;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicU64, Ordering};
use std::any::Any;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::config::PagesConfig;
use crate::{debug_log, warn_log};

/// Boxed error returned by fallible subscribers.
pub type BoxError = Box<dyn std::error::Error + 'static>;

type Subscriber = Rc<dyn Fn() -> Result<(), BoxError>>;

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	/// One or more subscribers failed while being notified.
	///
	/// Every subscriber still ran; this only reports the failures.
	#[error("{} subscriber(s) of `{key}` failed", .failures.len())]
	Notify {
		/// Key whose notification pass failed
		key: String,
		/// Errors returned by the failing subscribers, in notification order
		failures: Vec<BoxError>,
	},
}

/// Token identifying one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
	fn next() -> Self {
		static COUNTER: AtomicU64 = AtomicU64::new(0);
		Self(COUNTER.fetch_add(1, Ordering::Relaxed))
	}
}

/// Typed handle to a registered key.
///
/// Returned by [`StateStore::init_state`] and [`StateStore::key`]. It derefs to
/// nothing; use it with [`StateStore::get_state`] and [`StateStore::set_state`].
pub struct StateKey<T> {
	name: String,
	_marker: PhantomData<fn() -> T>,
}

impl<T> StateKey<T> {
	fn new(name: String) -> Self {
		Self {
			name,
			_marker: PhantomData,
		}
	}

	/// Returns the key name.
	pub fn name(&self) -> &str {
		&self.name
	}
}

impl<T> Clone for StateKey<T> {
	fn clone(&self) -> Self {
		Self::new(self.name.clone())
	}
}

impl<T> fmt::Debug for StateKey<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("StateKey").field(&self.name).finish()
	}
}

impl<T> AsRef<str> for StateKey<T> {
	fn as_ref(&self) -> &str {
		&self.name
	}
}

/// Names a store key holding values of type `T`.
///
/// Plain strings name a key of any type; a [`StateKey<T>`] fixes `T`, so
/// `store.get_state(&key)` needs no type annotation.
pub trait StoreKey<T> {
	/// Returns the key name.
	fn key_name(&self) -> &str;
}

impl<T> StoreKey<T> for str {
	fn key_name(&self) -> &str {
		self
	}
}

impl<T> StoreKey<T> for String {
	fn key_name(&self) -> &str {
		self
	}
}

impl<T> StoreKey<T> for StateKey<T> {
	fn key_name(&self) -> &str {
		&self.name
	}
}

impl<T> PartialEq for StateKey<T> {
	fn eq(&self, other: &Self) -> bool {
		self.name == other.name
	}
}

impl<T> Eq for StateKey<T> {}

/// A new value, or a function of the old value.
pub enum StateUpdate<T> {
	/// Replace with this value.
	Value(T),
	/// Compute the new value from the current one.
	With(Box<dyn FnOnce(&T) -> T>),
}

impl<T> StateUpdate<T> {
	/// Creates an updater function variant.
	pub fn with<F>(f: F) -> Self
	where
		F: FnOnce(&T) -> T + 'static,
	{
		Self::With(Box::new(f))
	}
}

impl<T> From<T> for StateUpdate<T> {
	fn from(value: T) -> Self {
		Self::Value(value)
	}
}

impl<T> fmt::Debug for StateUpdate<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Value(_) => f.write_str("StateUpdate::Value(..)"),
			Self::With(_) => f.write_str("StateUpdate::With(..)"),
		}
	}
}

struct StateEntry {
	value: Rc<dyn Any>,
	subscribers: BTreeMap<SubscriptionId, Subscriber>,
}

struct StoreInner {
	entries: RefCell<HashMap<String, StateEntry>>,
	config: PagesConfig,
}

/// Process-wide named observable values.
///
/// Cloning a `StateStore` yields another handle to the same entries.
#[derive(Clone)]
pub struct StateStore {
	inner: Rc<StoreInner>,
}

impl Default for StateStore {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for StateStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let entries = self.inner.entries.borrow();
		let mut keys: Vec<_> = entries.keys().collect();
		keys.sort();
		f.debug_struct("StateStore")
			.field("keys", &keys)
			.field("config", &self.inner.config)
			.finish()
	}
}

impl StateStore {
	/// Creates an empty store with the default configuration.
	pub fn new() -> Self {
		Self::with_config(PagesConfig::default())
	}

	/// Creates an empty store carrying the given configuration.
	pub fn with_config(config: PagesConfig) -> Self {
		Self {
			inner: Rc::new(StoreInner {
				entries: RefCell::new(HashMap::new()),
				config,
			}),
		}
	}

	/// Returns the configuration shared by everything attached to this store.
	pub fn config(&self) -> &PagesConfig {
		&self.inner.config
	}

	/// Registers `key` with a default value.
	///
	/// Returns the typed key on first registration. If the key already exists
	/// this is a no-op and `None` is returned; the stored value is untouched.
	pub fn init_state<T: 'static>(&self, key: impl Into<String>, default_value: T) -> Option<StateKey<T>> {
		let key = key.into();
		let mut entries = self.inner.entries.borrow_mut();
		if entries.contains_key(&key) {
			debug_log!("init_state: `{}` already registered", key);
			return None;
		}

		entries.insert(
			key.clone(),
			StateEntry {
				value: Rc::new(default_value),
				subscribers: BTreeMap::new(),
			},
		);
		debug_log!("init_state: registered `{}`", key);
		Some(StateKey::new(key))
	}

	/// Looks up an existing key holding values of type `T`.
	pub fn key<T: 'static>(&self, key: &str) -> Option<StateKey<T>> {
		let entries = self.inner.entries.borrow();
		let entry = entries.get(key)?;
		entry.value.is::<T>().then(|| StateKey::new(key.to_string()))
	}

	/// Returns whether `key` is registered.
	pub fn contains(&self, key: &str) -> bool {
		self.inner.entries.borrow().contains_key(key)
	}

	/// Returns all registered keys, sorted.
	pub fn keys(&self) -> Vec<String> {
		let mut keys: Vec<String> = self.inner.entries.borrow().keys().cloned().collect();
		keys.sort();
		keys
	}

	/// Returns the current value of `key`.
	///
	/// `None` is the not-found sentinel: the key is unknown or holds a value
	/// of a different type.
	pub fn get_state<T: Clone + 'static>(&self, key: &(impl StoreKey<T> + ?Sized)) -> Option<T> {
		let value = self.value_of(key.key_name())?;
		value.downcast_ref::<T>().cloned()
	}

	/// Returns an updater for `key`.
	///
	/// Nothing happens until the updater is applied.
	pub fn set_state<T: 'static>(&self, key: &(impl StoreKey<T> + ?Sized)) -> Updater<T> {
		Updater {
			store: self.clone(),
			key: key.key_name().to_string(),
			_marker: PhantomData,
		}
	}

	/// Adds a callback to `key`'s subscriber set.
	///
	/// Returns `None` (and registers nothing) if the key is unknown.
	pub fn subscribe<F>(&self, key: &str, callback: F) -> Option<SubscriptionId>
	where
		F: Fn() + 'static,
	{
		self.subscribe_fallible(key, move || {
			callback();
			Ok(())
		})
	}

	/// Adds a fallible callback to `key`'s subscriber set.
	///
	/// Errors returned by the callback are collected into the
	/// [`StoreError::Notify`] returned to whoever applied the update.
	pub fn subscribe_fallible<F>(&self, key: &str, callback: F) -> Option<SubscriptionId>
	where
		F: Fn() -> Result<(), BoxError> + 'static,
	{
		let mut entries = self.inner.entries.borrow_mut();
		let Some(entry) = entries.get_mut(key) else {
			warn_log!("subscribe: `{}` is not registered", key);
			return None;
		};

		let id = SubscriptionId::next();
		entry.subscribers.insert(id, Rc::new(callback));
		debug_log!("subscribe: `{}` -> {:?}", key, id);
		Some(id)
	}

	/// Removes a subscription.
	///
	/// Returns `false` if the key is unknown or the token is not subscribed.
	pub fn unsubscribe(&self, key: &str, id: SubscriptionId) -> bool {
		let mut entries = self.inner.entries.borrow_mut();
		match entries.get_mut(key) {
			Some(entry) => entry.subscribers.remove(&id).is_some(),
			None => {
				debug_log!("unsubscribe: `{}` is not registered", key);
				false
			}
		}
	}

	/// Returns the number of subscribers currently registered for `key`.
	pub fn subscriber_count(&self, key: &str) -> usize {
		self.inner
			.entries
			.borrow()
			.get(key)
			.map(|entry| entry.subscribers.len())
			.unwrap_or(0)
	}

	fn value_of(&self, key: &str) -> Option<Rc<dyn Any>> {
		self.inner
			.entries
			.borrow()
			.get(key)
			.map(|entry| Rc::clone(&entry.value))
	}

	fn replace_value(&self, key: &str, value: Rc<dyn Any>) -> bool {
		match self.inner.entries.borrow_mut().get_mut(key) {
			Some(entry) => {
				entry.value = value;
				true
			}
			None => false,
		}
	}

	fn notify(&self, key: &str) -> Result<(), StoreError> {
		// Snapshot so callbacks can (un)subscribe without disturbing this pass
		let subscribers: Vec<Subscriber> = match self.inner.entries.borrow().get(key) {
			Some(entry) => entry.subscribers.values().cloned().collect(),
			None => return Ok(()),
		};

		let mut failures = Vec::new();
		for subscriber in subscribers {
			if let Err(error) = subscriber() {
				warn_log!("subscriber of `{}` failed: {}", key, error);
				failures.push(error);
			}
		}

		if failures.is_empty() {
			Ok(())
		} else {
			Err(StoreError::Notify {
				key: key.to_string(),
				failures,
			})
		}
	}
}

/// Applies new values to one store key.
///
/// Obtained from [`StateStore::set_state`].
pub struct Updater<T> {
	store: StateStore,
	key: String,
	_marker: PhantomData<fn(T)>,
}

impl<T> fmt::Debug for Updater<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Updater").field("key", &self.key).finish()
	}
}

impl<T: 'static> Updater<T> {
	/// Replaces the value with `value` and notifies subscribers.
	pub fn set(&self, value: T) -> Result<(), StoreError> {
		self.apply(StateUpdate::Value(value))
	}

	/// Replaces the value with `f(old)` and notifies subscribers.
	pub fn update<F>(&self, f: F) -> Result<(), StoreError>
	where
		F: FnOnce(&T) -> T + 'static,
	{
		self.apply(StateUpdate::with(f))
	}

	/// Applies a literal value or an updater function.
	///
	/// Unknown keys and values of a different type are a no-op.
	pub fn apply(&self, update: impl Into<StateUpdate<T>>) -> Result<(), StoreError> {
		let Some(current) = self.store.value_of(&self.key) else {
			debug_log!("set_state: `{}` is not registered", self.key);
			return Ok(());
		};

		let Some(old) = current.downcast_ref::<T>() else {
			warn_log!(
				"set_state: `{}` does not hold a {}",
				self.key,
				std::any::type_name::<T>()
			);
			return Ok(());
		};

		// The old value is read without holding a store borrow, so the
		// updater function may itself read the store.
		let next = match update.into() {
			StateUpdate::Value(value) => value,
			StateUpdate::With(f) => f(old),
		};

		if !self.store.replace_value(&self.key, Rc::new(next)) {
			return Ok(());
		}
		self.store.notify(&self.key)
	}

	/// Returns the key this updater writes to.
	pub fn key(&self) -> &str {
		&self.key
	}
}
