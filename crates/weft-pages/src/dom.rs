//! Abstract document tree
//!
//! [`Node`] is a shared handle to either an element (`tag`, ordered
//! attributes, children) or a text node. It is the surface the reconciler
//! patches and components mount onto; binding it to a real rendering surface
//! happens outside this crate.
//!
//! Handles are reference counted. Cloning a `Node` yields another handle to
//! the same node; identity is compared with [`Node::ptr_eq`].
//!
//! ## Example
//!
//! ```ignore
//! use weft_pages::dom::Node;
//!
//! let list = Node::element("ul")
//!     .with_attr("class", "items")
//!     .with_child(Node::element("li").with_text("a"));
//!
//! assert_eq!(list.outer_html(), r#"<ul class="items"><li>a</li></ul>"#);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

pub mod event;
pub mod selector;

pub use event::{Event, ListenerId};
pub use selector::{Selector, SelectorError};

use event::Listener;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
	"wbr",
];

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
	/// An element with a lowercase tag name and attributes in insertion order.
	Element {
		/// Tag name
		tag: String,
		/// Attributes, unique by name
		attributes: Vec<(String, String)>,
	},
	/// A text node.
	Text(String),
}

struct NodeData {
	kind: NodeKind,
	parent: Weak<RefCell<NodeData>>,
	children: Vec<Node>,
	listeners: Vec<Listener>,
}

/// Handle to a node in a document tree.
#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeData>>);

impl Node {
	fn from_kind(kind: NodeKind) -> Self {
		Self(Rc::new(RefCell::new(NodeData {
			kind,
			parent: Weak::new(),
			children: Vec::new(),
			listeners: Vec::new(),
		})))
	}

	/// Creates a detached element.
	pub fn element(tag: impl Into<String>) -> Self {
		Self::from_kind(NodeKind::Element {
			tag: tag.into().to_ascii_lowercase(),
			attributes: Vec::new(),
		})
	}

	/// Creates a detached text node.
	pub fn text(content: impl Into<String>) -> Self {
		Self::from_kind(NodeKind::Text(content.into()))
	}

	/// Sets an attribute and returns the node (builder style).
	pub fn with_attr(self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.set_attribute(name, value);
		self
	}

	/// Appends a child and returns the node (builder style).
	pub fn with_child(self, child: Node) -> Self {
		self.append_child(&child);
		self
	}

	/// Appends a text child and returns the node (builder style).
	pub fn with_text(self, content: impl Into<String>) -> Self {
		self.append_child(&Node::text(content));
		self
	}

	/// Returns whether both handles point at the same node.
	pub fn ptr_eq(&self, other: &Node) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	/// Returns a copy of the node's kind.
	pub fn kind(&self) -> NodeKind {
		self.0.borrow().kind.clone()
	}

	/// Returns whether this is an element.
	pub fn is_element(&self) -> bool {
		matches!(self.0.borrow().kind, NodeKind::Element { .. })
	}

	/// Returns whether this is a text node.
	pub fn is_text(&self) -> bool {
		matches!(self.0.borrow().kind, NodeKind::Text(_))
	}

	/// Returns the tag name, or `None` for text nodes.
	pub fn tag(&self) -> Option<String> {
		match &self.0.borrow().kind {
			NodeKind::Element { tag, .. } => Some(tag.clone()),
			NodeKind::Text(_) => None,
		}
	}

	/// Returns the attributes in insertion order.
	pub fn attributes(&self) -> Vec<(String, String)> {
		match &self.0.borrow().kind {
			NodeKind::Element { attributes, .. } => attributes.clone(),
			NodeKind::Text(_) => Vec::new(),
		}
	}

	/// Returns the number of attributes.
	pub fn attribute_count(&self) -> usize {
		match &self.0.borrow().kind {
			NodeKind::Element { attributes, .. } => attributes.len(),
			NodeKind::Text(_) => 0,
		}
	}

	/// Returns an attribute value.
	pub fn get_attribute(&self, name: &str) -> Option<String> {
		match &self.0.borrow().kind {
			NodeKind::Element { attributes, .. } => attributes
				.iter()
				.find(|(n, _)| n == name)
				.map(|(_, v)| v.clone()),
			NodeKind::Text(_) => None,
		}
	}

	/// Sets an attribute, keeping its position if it already exists.
	///
	/// Ignored on text nodes.
	pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();
		let value = value.into();
		if let NodeKind::Element { attributes, .. } = &mut self.0.borrow_mut().kind {
			match attributes.iter_mut().find(|(n, _)| *n == name) {
				Some(slot) => slot.1 = value,
				None => attributes.push((name, value)),
			}
		}
	}

	/// Removes an attribute. Returns whether it existed.
	pub fn remove_attribute(&self, name: &str) -> bool {
		if let NodeKind::Element { attributes, .. } = &mut self.0.borrow_mut().kind {
			let before = attributes.len();
			attributes.retain(|(n, _)| n != name);
			return attributes.len() != before;
		}
		false
	}

	/// Returns whether the space separated `class` attribute contains `class`.
	pub fn has_class(&self, class: &str) -> bool {
		self.get_attribute("class")
			.is_some_and(|value| value.split_ascii_whitespace().any(|c| c == class))
	}

	/// Returns the parent node, if attached.
	pub fn parent(&self) -> Option<Node> {
		self.0.borrow().parent.upgrade().map(Node)
	}

	/// Returns all child nodes, text included.
	pub fn children(&self) -> Vec<Node> {
		self.0.borrow().children.clone()
	}

	/// Returns only the element children.
	pub fn element_children(&self) -> Vec<Node> {
		self.0
			.borrow()
			.children
			.iter()
			.filter(|child| child.is_element())
			.cloned()
			.collect()
	}

	/// Returns the number of element children.
	pub fn child_element_count(&self) -> usize {
		self.0
			.borrow()
			.children
			.iter()
			.filter(|child| child.is_element())
			.count()
	}

	/// Returns the concatenated text of this node and all descendants.
	pub fn text_content(&self) -> String {
		let mut out = String::new();
		self.collect_text(&mut out);
		out
	}

	fn collect_text(&self, out: &mut String) {
		let data = self.0.borrow();
		match &data.kind {
			NodeKind::Text(content) => out.push_str(content),
			NodeKind::Element { .. } => {
				for child in &data.children {
					child.collect_text(out);
				}
			}
		}
	}

	/// Replaces the text of this node.
	///
	/// For an element all children are detached and replaced by a single
	/// text node (none when `text` is empty).
	pub fn set_text_content(&self, text: &str) {
		if let NodeKind::Text(content) = &mut self.0.borrow_mut().kind {
			*content = text.to_string();
			return;
		}

		for child in self.children() {
			child.remove();
		}
		if !text.is_empty() {
			self.append_child(&Node::text(text));
		}
	}

	/// Returns whether `other` is this node or one of its descendants.
	pub fn contains(&self, other: &Node) -> bool {
		let mut current = Some(other.clone());
		while let Some(node) = current {
			if node.ptr_eq(self) {
				return true;
			}
			current = node.parent();
		}
		false
	}

	/// Appends `child`, detaching it from its previous parent first.
	///
	/// Appending a node to itself or to one of its descendants is ignored.
	pub fn append_child(&self, child: &Node) {
		if child.contains(self) {
			crate::warn_log!("append_child: refusing to create a cycle");
			return;
		}
		child.remove();
		child.0.borrow_mut().parent = Rc::downgrade(&self.0);
		self.0.borrow_mut().children.push(child.clone());
	}

	/// Detaches this node from its parent. No-op when already detached.
	pub fn remove(&self) {
		let Some(parent) = self.parent() else {
			return;
		};
		parent
			.0
			.borrow_mut()
			.children
			.retain(|child| !child.ptr_eq(self));
		self.0.borrow_mut().parent = Weak::new();
	}

	/// Puts `replacement` at this node's position in its parent.
	///
	/// Returns `false` (and does nothing) when this node has no parent.
	pub fn replace_with(&self, replacement: &Node) -> bool {
		let Some(parent) = self.parent() else {
			return false;
		};
		if replacement.ptr_eq(self) {
			return true;
		}

		replacement.remove();
		{
			let mut parent_data = parent.0.borrow_mut();
			let Some(index) = parent_data
				.children
				.iter()
				.position(|child| child.ptr_eq(self))
			else {
				return false;
			};
			parent_data.children[index] = replacement.clone();
		}
		replacement.0.borrow_mut().parent = Rc::downgrade(&parent.0);
		self.0.borrow_mut().parent = Weak::new();
		true
	}

	/// Returns the descendant elements matching `selector`, in document order.
	pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>, SelectorError> {
		let selector = Selector::parse(selector)?;
		Ok(self.select_all(&selector))
	}

	/// Returns the first descendant element matching `selector`.
	pub fn query_selector(&self, selector: &str) -> Result<Option<Node>, SelectorError> {
		let selector = Selector::parse(selector)?;
		Ok(self.select_first(&selector))
	}

	/// Returns the descendant elements matching a parsed selector.
	pub fn select_all(&self, selector: &Selector) -> Vec<Node> {
		let mut found = Vec::new();
		for child in self.children() {
			child.collect_matches(selector, &mut found);
		}
		found
	}

	/// Returns the first descendant element matching a parsed selector.
	pub fn select_first(&self, selector: &Selector) -> Option<Node> {
		self.select_all(selector).into_iter().next()
	}

	fn collect_matches(&self, selector: &Selector, found: &mut Vec<Node>) {
		if !self.is_element() {
			return;
		}
		if selector.matches(self) {
			found.push(self.clone());
		}
		for child in self.children() {
			child.collect_matches(selector, found);
		}
	}

	/// Returns whether this element matches `selector`.
	pub fn matches(&self, selector: &str) -> Result<bool, SelectorError> {
		Ok(Selector::parse(selector)?.matches(self))
	}

	/// Returns the nearest inclusive ancestor matching `selector`.
	pub fn closest(&self, selector: &str) -> Result<Option<Node>, SelectorError> {
		let selector = Selector::parse(selector)?;
		Ok(self.closest_with(&selector))
	}

	/// Returns the nearest inclusive ancestor matching a parsed selector.
	pub fn closest_with(&self, selector: &Selector) -> Option<Node> {
		let mut current = Some(self.clone());
		while let Some(node) = current {
			if node.is_element() && selector.matches(&node) {
				return Some(node);
			}
			current = node.parent();
		}
		None
	}

	/// Serializes this node and its subtree.
	pub fn outer_html(&self) -> String {
		let mut out = String::new();
		self.write_html(&mut out);
		out
	}

	/// Serializes this node's children.
	pub fn inner_html(&self) -> String {
		let mut out = String::new();
		for child in self.children() {
			child.write_html(&mut out);
		}
		out
	}

	fn write_html(&self, out: &mut String) {
		let data = self.0.borrow();
		match &data.kind {
			NodeKind::Text(content) => out.push_str(&escape_text(content)),
			NodeKind::Element { tag, attributes } => {
				out.push('<');
				out.push_str(tag);
				for (name, value) in attributes {
					out.push(' ');
					out.push_str(name);
					out.push_str("=\"");
					out.push_str(&escape_attribute(value));
					out.push('"');
				}
				out.push('>');
				if VOID_ELEMENTS.contains(&tag.as_str()) {
					return;
				}
				for child in &data.children {
					child.write_html(out);
				}
				out.push_str("</");
				out.push_str(tag);
				out.push('>');
			}
		}
	}

	/// Registers an event listener on this node.
	pub fn add_event_listener<F>(&self, event_type: impl Into<String>, handler: F) -> ListenerId
	where
		F: Fn(&Event) + 'static,
	{
		let listener = Listener::new(event_type.into(), Rc::new(handler));
		let id = listener.id();
		self.0.borrow_mut().listeners.push(listener);
		id
	}

	/// Removes a listener. Returns whether it was registered here.
	pub fn remove_event_listener(&self, id: ListenerId) -> bool {
		self.take_listener(id).is_some()
	}

	/// Returns the number of listeners registered on this node.
	pub fn listener_count(&self) -> usize {
		self.0.borrow().listeners.len()
	}

	pub(crate) fn take_listener(&self, id: ListenerId) -> Option<Listener> {
		let mut data = self.0.borrow_mut();
		let index = data.listeners.iter().position(|l| l.id() == id)?;
		Some(data.listeners.remove(index))
	}

	pub(crate) fn adopt_listener(&self, listener: Listener) {
		self.0.borrow_mut().listeners.push(listener);
	}

	/// Moves listeners `ids` from this node onto `other`.
	///
	/// Returns how many were moved.
	pub fn move_listeners(&self, ids: &[ListenerId], other: &Node) -> usize {
		let mut moved = 0;
		for id in ids {
			if let Some(listener) = self.take_listener(*id) {
				other.adopt_listener(listener);
				moved += 1;
			}
		}
		moved
	}

	pub(crate) fn listeners_for(&self, event_type: &str) -> Vec<Listener> {
		self.0
			.borrow()
			.listeners
			.iter()
			.filter(|l| l.event_type() == event_type)
			.cloned()
			.collect()
	}

	/// Dispatches a bubbling event with this node as its origin target.
	///
	/// Listeners run on this node first, then on each ancestor, until one
	/// stops propagation. The finished event is returned so the caller can
	/// inspect handler failures.
	pub fn dispatch_event(&self, event_type: impl Into<String>) -> Event {
		let event = Event::new(event_type, self.clone());
		event::dispatch(&event);
		event
	}
}

impl PartialEq for Node {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}

impl Eq for Node {}

impl fmt::Debug for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_element() {
			f.debug_tuple("Node").field(&self.outer_html()).finish()
		} else {
			f.debug_tuple("Text").field(&self.text_content()).finish()
		}
	}
}

fn escape_text(text: &str) -> String {
	text.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
	value.replace('&', "&amp;").replace('"', "&quot;")
}
