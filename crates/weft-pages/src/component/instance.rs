//! Mounted component instances.
//!
//! [`mount`] drives a [`Component`] through its construction sequence and
//! returns a [`Mounted`] owner handle. Hooks receive a [`Context`] that gives
//! access to local state, the store, the target node and event delegation.
//!
//! Store subscriptions and delegated listeners only hold weak references to
//! the instance, so dropping the last [`Mounted`] handle tears it down.

use core::fmt;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::{Component, LocalState, RenderError, StatePatch};
use crate::dom::{Event, ListenerId, Node, Selector};
use crate::markup;
use crate::reconciler::Reconciler;
use crate::store::{BoxError, StateStore, SubscriptionId};
use crate::{debug_log, error_log, info_log, warn_log};

/// Lifecycle phase of a component instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
	/// Created, local state not yet initialized.
	Constructed,
	/// Local state initialized; first render pending or in progress.
	Initialized,
	/// Re-rendered at least once after construction.
	Updating,
	/// Torn down; further updates are rejected.
	Unmounted,
}

/// Type-erased owner handle of a mounted child component.
trait MountedChild {
	fn name(&self) -> &'static str;
	fn unmount(self: Box<Self>);
}

struct Instance<C: Component> {
	component: C,
	store: StateStore,
	reconciler: Reconciler,
	max_depth: usize,
	target: RefCell<Node>,
	state: RefCell<LocalState>,
	phase: Cell<Phase>,
	depth: Cell<usize>,
	subscriptions: RefCell<Vec<(String, SubscriptionId)>>,
	listeners: RefCell<Vec<ListenerId>>,
	children: RefCell<Vec<Box<dyn MountedChild>>>,
}

impl<C: Component> Instance<C> {
	fn new(target: Node, component: C, store: StateStore) -> Self {
		let reconciler = Reconciler::from_config(store.config());
		let max_depth = store.config().max_render_depth;
		Self {
			component,
			reconciler,
			max_depth,
			store,
			target: RefCell::new(target),
			state: RefCell::new(LocalState::new()),
			phase: Cell::new(Phase::Constructed),
			depth: Cell::new(0),
			subscriptions: RefCell::new(Vec::new()),
			listeners: RefCell::new(Vec::new()),
			children: RefCell::new(Vec::new()),
		}
	}

	fn target(&self) -> Node {
		self.target.borrow().clone()
	}

	fn ensure_mounted(&self) -> Result<(), RenderError> {
		if self.phase.get() == Phase::Unmounted {
			return Err(RenderError::Unmounted {
				component: C::name(),
			});
		}
		Ok(())
	}

	fn observe(self: &Rc<Self>, key: &str) {
		let already = self
			.subscriptions
			.borrow()
			.iter()
			.any(|(observed, _)| observed == key);
		if already {
			return;
		}

		let weak: Weak<Self> = Rc::downgrade(self);
		let subscribed = self.store.subscribe_fallible(key, move || -> Result<(), BoxError> {
			let Some(instance) = weak.upgrade() else {
				return Ok(());
			};
			instance.rerender().map_err(BoxError::from)
		});

		match subscribed {
			Some(id) => self.subscriptions.borrow_mut().push((key.to_string(), id)),
			None => warn_log!("{}: observed key `{}` is not registered", C::name(), key),
		}
	}

	fn rerender(self: &Rc<Self>) -> Result<(), RenderError> {
		self.ensure_mounted()?;
		self.phase.set(Phase::Updating);
		self.render_pass()
	}

	fn render_pass(self: &Rc<Self>) -> Result<(), RenderError> {
		self.ensure_mounted()?;

		let depth = self.depth.get() + 1;
		if depth > self.max_depth {
			warn_log!("{}: render nested {} deep, aborting", C::name(), depth);
			return Err(RenderError::RecursionLimit {
				component: C::name(),
				depth: self.max_depth,
			});
		}

		self.depth.set(depth);
		let result = self.render_once();
		self.depth.set(depth - 1);

		if let Err(error) = &result
			&& depth == 1
		{
			error_log!("{}: render failed: {}", C::name(), error);
		}
		result
	}

	fn render_once(self: &Rc<Self>) -> Result<(), RenderError> {
		let ctx = Context::new(Rc::clone(self));

		// Nothing touches the live tree until the markup has parsed
		let markup = self.component.render(&ctx)?;
		let candidate = markup::parse(&markup)?;

		let target = self.target();
		let patch = self.reconciler.reconcile(&target, candidate);
		if patch.root_replaced {
			self.rehome(&target, &patch.root);
		}
		debug_log!("{}: rendered, {:?}", C::name(), patch.stats);

		self.unmount_children();
		self.component.mount_children(&ctx)
	}

	fn rehome(&self, old_root: &Node, new_root: &Node) {
		let ids = self.listeners.borrow().clone();
		let _moved = old_root.move_listeners(&ids, new_root);
		*self.target.borrow_mut() = new_root.clone();
		info_log!(
			"{}: root element replaced, {} listener(s) moved",
			C::name(),
			_moved
		);
	}

	fn unmount_children(&self) {
		let children = self.children.take();
		for child in children {
			debug_log!("{}: unmounting child {}", C::name(), child.name());
			child.unmount();
		}
	}

	/// Releases store subscriptions and delegated listeners.
	fn release(&self) {
		for (key, id) in self.subscriptions.take() {
			self.store.unsubscribe(&key, id);
		}
		let target = self.target();
		for id in self.listeners.take() {
			target.remove_event_listener(id);
		}
	}
}

impl<C: Component> Drop for Instance<C> {
	fn drop(&mut self) {
		if self.phase.get() != Phase::Unmounted {
			debug_log!("{}: dropped while mounted, releasing", C::name());
			self.release();
		}
	}
}

/// Handle passed to component hooks.
pub struct Context<C: Component> {
	instance: Rc<Instance<C>>,
}

impl<C: Component> Context<C> {
	fn new(instance: Rc<Instance<C>>) -> Self {
		Self { instance }
	}

	/// Returns the component (its props).
	pub fn component(&self) -> &C {
		&self.instance.component
	}

	/// Returns a snapshot of the local state.
	pub fn state(&self) -> LocalState {
		self.instance.state.borrow().clone()
	}

	/// Returns the store this component was mounted with.
	pub fn store(&self) -> &StateStore {
		&self.instance.store
	}

	/// Returns the component's current root node.
	pub fn target(&self) -> Node {
		self.instance.target()
	}

	/// Returns the lifecycle phase.
	pub fn phase(&self) -> Phase {
		self.instance.phase.get()
	}

	/// Shallow-merges `patch` into local state, then re-renders synchronously.
	///
	/// Each call is one full render and reconcile pass; nothing is batched.
	/// A function patch receives a copy of the current state.
	pub fn set_state(&self, patch: impl Into<StatePatch>) -> Result<(), RenderError> {
		let instance = &self.instance;
		instance.ensure_mounted()?;

		let current = instance.state.borrow().clone();
		let fields = patch.into().resolve(&current);
		instance.state.borrow_mut().merge(fields)?;
		instance.rerender()
	}

	/// Re-renders without changing local state.
	pub fn rerender(&self) -> Result<(), RenderError> {
		self.instance.rerender()
	}

	/// Attaches a delegated listener for `event_type` on the component root.
	///
	/// The handler runs when the event's origin is one of the elements that
	/// matched `selector` when this was called, or has an inclusive ancestor
	/// matching `selector` now. Elements rendered later are only covered by
	/// the second check. A handler error is logged and recorded on the event
	/// with [`Event::report_failure`].
	pub fn add_event<F>(&self, event_type: &str, selector: &str, handler: F) -> Result<ListenerId, RenderError>
	where
		F: Fn(&Event, &Context<C>) -> Result<(), RenderError> + 'static,
	{
		let selector = Selector::parse(selector)?;
		let target = self.target();
		let snapshot = target.select_all(&selector);
		let weak = Rc::downgrade(&self.instance);

		let id = target.add_event_listener(event_type, move |event| {
			let origin = event.target();
			let is_target = snapshot.iter().any(|node| node.ptr_eq(origin))
				|| origin.closest_with(&selector).is_some();
			if !is_target {
				return;
			}
			let Some(instance) = weak.upgrade() else {
				return;
			};

			let ctx = Context::new(instance);
			if let Err(error) = handler(event, &ctx) {
				error_log!(
					"{}: `{}` handler for `{}` failed: {}",
					C::name(),
					event.event_type(),
					selector.source(),
					error
				);
				event.report_failure(error.to_string());
			}
		});

		self.instance.listeners.borrow_mut().push(id);
		Ok(id)
	}

	/// Removes a listener added with [`add_event`](Self::add_event).
	pub fn remove_event(&self, id: ListenerId) -> bool {
		let mut listeners = self.instance.listeners.borrow_mut();
		let Some(index) = listeners.iter().position(|listener| *listener == id) else {
			return false;
		};
		listeners.remove(index);
		self.target().remove_event_listener(id)
	}

	/// Mounts `component` onto the first element matching `selector` in this
	/// component's tree.
	///
	/// The child lives until this component's next render pass or unmount.
	pub fn mount_child<D: Component>(&self, selector: &str, component: D) -> Result<(), RenderError> {
		let mount_point = self
			.target()
			.query_selector(selector)?
			.ok_or_else(|| RenderError::MissingMountPoint {
				selector: selector.to_string(),
			})?;

		let child = mount(mount_point, component, &self.instance.store)?;
		self.instance.children.borrow_mut().push(Box::new(child));
		Ok(())
	}

	/// Returns the number of currently mounted child components.
	pub fn child_count(&self) -> usize {
		self.instance.children.borrow().len()
	}
}

impl<C: Component> fmt::Debug for Context<C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Context")
			.field("component", &C::name())
			.field("phase", &self.phase())
			.finish()
	}
}

/// Owner handle of a mounted component.
///
/// Dropping it releases the component's store subscriptions and delegated
/// listeners without running
/// [`component_will_unmount`](Component::component_will_unmount); call
/// [`unmount`](Mounted::unmount) for an orderly teardown.
pub struct Mounted<C: Component> {
	instance: Rc<Instance<C>>,
}

impl<C: Component> Mounted<C> {
	/// Returns a hook context for this instance.
	pub fn context(&self) -> Context<C> {
		Context::new(Rc::clone(&self.instance))
	}

	/// Returns the component (its props).
	pub fn component(&self) -> &C {
		&self.instance.component
	}

	/// Returns the component's current root node.
	pub fn target(&self) -> Node {
		self.instance.target()
	}

	/// Returns a snapshot of the local state.
	pub fn state(&self) -> LocalState {
		self.instance.state.borrow().clone()
	}

	/// Returns the lifecycle phase.
	pub fn phase(&self) -> Phase {
		self.instance.phase.get()
	}

	/// See [`Context::set_state`].
	pub fn set_state(&self, patch: impl Into<StatePatch>) -> Result<(), RenderError> {
		self.context().set_state(patch)
	}

	/// Returns the number of store keys this instance is subscribed to.
	pub fn subscription_count(&self) -> usize {
		self.instance.subscriptions.borrow().len()
	}

	/// Runs `component_will_unmount`, then releases subscriptions, listeners
	/// and child components.
	pub fn unmount(self) {
		let instance = &self.instance;
		if instance.phase.get() == Phase::Unmounted {
			return;
		}

		instance.component.component_will_unmount(&self.context());
		instance.phase.set(Phase::Unmounted);
		instance.release();
		instance.unmount_children();
		info_log!("{}: unmounted", C::name());
	}
}

impl<C: Component> MountedChild for Mounted<C> {
	fn name(&self) -> &'static str {
		C::name()
	}

	fn unmount(self: Box<Self>) {
		Mounted::unmount(*self);
	}
}

impl<C: Component> fmt::Debug for Mounted<C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Mounted")
			.field("component", &C::name())
			.field("phase", &self.phase())
			.field("target", &self.target())
			.finish()
	}
}

/// Mounts `component` onto `target`.
///
/// Runs, in order: `init_state`, subscription to every observed key, the first
/// render and reconcile, `mount_children`, `set_events` and
/// `component_did_mount`. Observed keys must already be registered in
/// `store`; unknown keys are skipped with a warning.
///
/// On error everything acquired so far is released again.
pub fn mount<C: Component>(target: Node, component: C, store: &StateStore) -> Result<Mounted<C>, RenderError> {
	let instance = Rc::new(Instance::new(target, component, store.clone()));

	let initial = LocalState::from_value(instance.component.init_state())?;
	*instance.state.borrow_mut() = initial;
	instance.phase.set(Phase::Initialized);

	for key in instance.component.observer_keys() {
		instance.observe(&key);
	}

	instance.render_pass()?;

	let ctx = Context::new(Rc::clone(&instance));
	instance.component.set_events(&ctx)?;
	instance.component.component_did_mount(&ctx)?;
	info_log!("{}: mounted", C::name());

	Ok(Mounted { instance })
}
