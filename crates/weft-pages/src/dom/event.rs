//! Bubbling events on the document tree.
//!
//! An [`Event`] starts at its origin target and visits the target and then
//! every ancestor, invoking the listeners registered for its type on each.
//! A listener may stop propagation; listeners on the current node still run.

use core::sync::atomic::{AtomicU64, Ordering};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::iter;
use std::rc::Rc;

use super::Node;

/// Identifies one registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
	fn next() -> Self {
		static COUNTER: AtomicU64 = AtomicU64::new(0);
		Self(COUNTER.fetch_add(1, Ordering::Relaxed))
	}
}

type Handler = Rc<dyn Fn(&Event)>;

#[derive(Clone)]
pub(crate) struct Listener {
	id: ListenerId,
	event_type: String,
	handler: Handler,
}

impl Listener {
	pub(crate) fn new(event_type: String, handler: Handler) -> Self {
		Self {
			id: ListenerId::next(),
			event_type,
			handler,
		}
	}

	pub(crate) fn id(&self) -> ListenerId {
		self.id
	}

	pub(crate) fn event_type(&self) -> &str {
		&self.event_type
	}
}

/// An event travelling up the tree.
pub struct Event {
	event_type: String,
	target: Node,
	current_target: RefCell<Option<Node>>,
	propagation_stopped: Cell<bool>,
	default_prevented: Cell<bool>,
	failures: RefCell<Vec<String>>,
}

impl Event {
	/// Creates an undispatched event.
	pub fn new(event_type: impl Into<String>, target: Node) -> Self {
		Self {
			event_type: event_type.into(),
			target,
			current_target: RefCell::new(None),
			propagation_stopped: Cell::new(false),
			default_prevented: Cell::new(false),
			failures: RefCell::new(Vec::new()),
		}
	}

	/// Returns the event type (e.g. `"click"`).
	pub fn event_type(&self) -> &str {
		&self.event_type
	}

	/// Returns the node the event originated at.
	pub fn target(&self) -> &Node {
		&self.target
	}

	/// Returns the node whose listeners are currently running.
	pub fn current_target(&self) -> Option<Node> {
		self.current_target.borrow().clone()
	}

	/// Stops the event from reaching further ancestors.
	pub fn stop_propagation(&self) {
		self.propagation_stopped.set(true);
	}

	/// Returns whether propagation was stopped.
	pub fn is_propagation_stopped(&self) -> bool {
		self.propagation_stopped.get()
	}

	/// Marks the event's default action as cancelled.
	pub fn prevent_default(&self) {
		self.default_prevented.set(true);
	}

	/// Returns whether the default action was cancelled.
	pub fn is_default_prevented(&self) -> bool {
		self.default_prevented.get()
	}

	/// Records a handler failure so the dispatcher can see it.
	pub fn report_failure(&self, message: impl Into<String>) {
		self.failures.borrow_mut().push(message.into());
	}

	/// Returns the handler failures recorded during dispatch.
	pub fn failures(&self) -> Vec<String> {
		self.failures.borrow().clone()
	}
}

impl fmt::Debug for Event {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Event")
			.field("event_type", &self.event_type)
			.field("target", &self.target.tag())
			.field("propagation_stopped", &self.propagation_stopped.get())
			.field("failures", &self.failures.borrow().len())
			.finish()
	}
}

pub(super) fn dispatch(event: &Event) {
	// The propagation path is fixed before any listener runs, so a handler
	// that detaches or replaces part of the tree does not cut it short
	let path: Vec<Node> = iter::successors(Some(event.target.clone()), Node::parent).collect();

	for node in &path {
		// Listeners are snapshotted so a handler may add or remove listeners
		for listener in node.listeners_for(&event.event_type) {
			*event.current_target.borrow_mut() = Some(node.clone());
			(listener.handler)(event);
		}
		if event.is_propagation_stopped() {
			break;
		}
	}
	*event.current_target.borrow_mut() = None;
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn tree() -> (Node, Node, Node) {
		let button = Node::element("button");
		let section = Node::element("section").with_child(button.clone());
		let root = Node::element("div").with_child(section.clone());
		(root, section, button)
	}

	#[rstest]
	fn test_event_bubbles_to_ancestors() {
		let (root, section, button) = tree();
		let seen = Rc::new(RefCell::new(Vec::new()));
		for (label, node) in [("root", &root), ("section", &section), ("button", &button)] {
			let seen = seen.clone();
			node.add_event_listener("click", move |event| {
				assert_eq!(event.event_type(), "click");
				seen.borrow_mut().push(label);
			});
		}

		button.dispatch_event("click");
		assert_eq!(*seen.borrow(), vec!["button", "section", "root"]);
	}

	#[rstest]
	fn test_stop_propagation() {
		let (root, section, button) = tree();
		let reached_root = Rc::new(Cell::new(false));
		let flag = reached_root.clone();
		root.add_event_listener("click", move |_| flag.set(true));
		section.add_event_listener("click", |event| event.stop_propagation());

		let event = button.dispatch_event("click");
		assert!(event.is_propagation_stopped());
		assert!(!reached_root.get());
	}

	#[rstest]
	fn test_detached_subtree_still_bubbles_to_original_ancestors() {
		let (root, section, button) = tree();
		let seen = Rc::new(RefCell::new(Vec::new()));
		let replaced = section.clone();
		let log = seen.clone();
		section.add_event_listener("click", move |_| {
			log.borrow_mut().push("section");
			replaced.replace_with(&Node::element("p"));
		});
		let log = seen.clone();
		root.add_event_listener("click", move |event| {
			log.borrow_mut().push("root");
			assert!(event.current_target().is_some_and(|node| node.tag().as_deref() == Some("div")));
		});

		button.dispatch_event("click");
		assert_eq!(*seen.borrow(), vec!["section", "root"]);
		assert!(section.parent().is_none());
		assert_eq!(root.inner_html(), "<p></p>");
	}

	#[rstest]
	fn test_other_event_types_ignored() {
		let (root, _, button) = tree();
		let count = Rc::new(Cell::new(0));
		let counter = count.clone();
		root.add_event_listener("input", move |_| counter.set(counter.get() + 1));

		button.dispatch_event("click");
		assert_eq!(count.get(), 0);
	}

	#[rstest]
	fn test_remove_and_move_listener() {
		let (root, section, button) = tree();
		let count = Rc::new(Cell::new(0));
		let counter = count.clone();
		let id = section.add_event_listener("click", move |_| counter.set(counter.get() + 1));

		assert_eq!(section.move_listeners(&[id], &root), 1);
		assert_eq!(section.listener_count(), 0);
		button.dispatch_event("click");
		assert_eq!(count.get(), 1);

		assert!(root.remove_event_listener(id));
		button.dispatch_event("click");
		assert_eq!(count.get(), 1);
	}

	#[rstest]
	fn test_failures_are_recorded() {
		let (root, _, button) = tree();
		root.add_event_listener("click", |event| event.report_failure("handler failed"));

		let event = button.dispatch_event("click");
		assert_eq!(event.failures(), vec!["handler failed".to_string()]);
		assert!(event.current_target().is_none());
	}
}
