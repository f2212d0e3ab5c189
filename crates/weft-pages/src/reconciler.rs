//! Tree reconciliation
//!
//! Patches a live [`Node`] tree so it matches a freshly rendered candidate
//! tree.
//!
//! ## Comparison
//!
//! [`compare_nodes`] answers "must this node be replaced wholesale?":
//!
//! 1. different tag names: yes
//! 2. different attribute counts: yes
//! 3. any attribute value differing (order irrelevant): yes
//! 4. both nodes without element children: yes if their text differs
//! 5. otherwise no; text is not compared and the children are visited instead
//!
//! Rule 5 means a change to text mixed in between element children is not
//! picked up at that level.
//!
//! ## Patching
//!
//! [`Reconciler::apply_diff`] walks old and new trees together:
//!
//! 1. old present, new absent: remove old
//! 2. old absent, new present: append the new node itself
//! 3. both present and different: replace the old subtree wholesale, except
//!    that a leaf whose tag and attributes match and whose text alone differs
//!    gets its text updated in place
//! 4. both present and the same: recurse over element children by index
//!
//! Children are paired by position only. Inserting or deleting at index `k`
//! shifts every later sibling, which is then compared against its shifted
//! counterpart and usually replaced.
//!
//! ## Root replacement
//!
//! When the live root itself is judged different it is replaced in its
//! parent. [`Patch::root`] is the effective root afterwards and
//! [`Patch::root_replaced`] tells holders of the old root to update their
//! reference.

use crate::config::PagesConfig;
use crate::dom::Node;
use crate::markup::{self, MarkupError};
use crate::{debug_log, info_log};

/// Outcome of comparing two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeDiff {
	/// Same tag and attributes; children are compared next.
	Same,
	/// Same tag and attributes, no element children, different text.
	TextChanged,
	/// Different tag or attributes.
	Replace,
}

impl NodeDiff {
	/// Returns whether the nodes are considered different.
	pub fn is_different(self) -> bool {
		self != Self::Same
	}
}

/// Classifies how `a` differs from `b`.
pub fn diff_nodes(a: &Node, b: &Node) -> NodeDiff {
	if a.tag() != b.tag() {
		return NodeDiff::Replace;
	}

	// Text nodes only reach here paired with text nodes
	if a.is_text() {
		return if a.text_content() != b.text_content() {
			NodeDiff::TextChanged
		} else {
			NodeDiff::Same
		};
	}

	if a.attribute_count() != b.attribute_count() {
		return NodeDiff::Replace;
	}

	let attributes_differ = a
		.attributes()
		.iter()
		.any(|(name, value)| b.get_attribute(name).as_ref() != Some(value));
	if attributes_differ {
		return NodeDiff::Replace;
	}

	let is_childless = a.child_element_count() == 0 && b.child_element_count() == 0;
	if is_childless && a.text_content() != b.text_content() {
		return NodeDiff::TextChanged;
	}

	NodeDiff::Same
}

/// Returns whether `a` and `b` are different and `a` must be replaced.
pub fn compare_nodes(a: &Node, b: &Node) -> bool {
	diff_nodes(a, b).is_different()
}

/// Counts of the operations one reconciliation applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchStats {
	/// Nodes removed from the live tree
	pub removed: usize,
	/// Candidate nodes appended to the live tree
	pub appended: usize,
	/// Live subtrees replaced wholesale
	pub replaced: usize,
	/// Leaves whose text was updated in place
	pub text_updated: usize,
}

impl PatchStats {
	/// Returns the total number of operations.
	pub fn total(&self) -> usize {
		self.removed + self.appended + self.replaced + self.text_updated
	}

	/// Returns whether nothing changed.
	pub fn is_empty(&self) -> bool {
		self.total() == 0
	}
}

/// Result of reconciling a live root.
#[derive(Debug, Clone)]
pub struct Patch {
	/// The live root after patching.
	pub root: Node,
	/// Whether the previous root was replaced by `root`.
	pub root_replaced: bool,
	/// What was changed.
	pub stats: PatchStats,
}

/// Diff/patch engine.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
	trace: bool,
}

impl Reconciler {
	/// Creates a reconciler.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a reconciler honouring `config.trace_patches`.
	pub fn from_config(config: &PagesConfig) -> Self {
		Self {
			trace: config.trace_patches,
		}
	}

	/// Parses `markup` and reconciles `live_root` against it.
	///
	/// Parsing happens first: on a markup error the live tree is untouched.
	pub fn reconciliate(&self, live_root: &Node, markup: &str) -> Result<Patch, MarkupError> {
		let candidate = markup::parse(markup)?;
		Ok(self.reconcile(live_root, candidate))
	}

	/// Reconciles `live_root` against an already built candidate tree.
	///
	/// Candidate nodes that end up in the live tree are moved, not copied.
	pub fn reconcile(&self, live_root: &Node, candidate: Node) -> Patch {
		let mut stats = PatchStats::default();
		let parent = live_root.parent();

		let root_replaced = diff_nodes(live_root, &candidate) == NodeDiff::Replace;
		if root_replaced {
			if parent.is_none() {
				debug_log!("reconcile: swapping detached root");
			}
			self.replace(live_root, &candidate, &mut stats);
		} else {
			self.patch(parent.as_ref(), Some(live_root), Some(&candidate), &mut stats);
		}

		let root = if root_replaced {
			info_log!(
				"reconcile: root <{}> replaced by <{}>",
				live_root.tag().unwrap_or_default(),
				candidate.tag().unwrap_or_default()
			);
			candidate
		} else {
			live_root.clone()
		};

		debug_log!("reconcile: {:?}", stats);
		Patch {
			root,
			root_replaced,
			stats,
		}
	}

	/// Recursively patches `old` (a child of `parent`) to match `new`.
	pub fn apply_diff(&self, parent: Option<&Node>, old: Option<&Node>, new: Option<&Node>) -> PatchStats {
		let mut stats = PatchStats::default();
		self.patch(parent, old, new, &mut stats);
		stats
	}

	fn patch(&self, parent: Option<&Node>, old: Option<&Node>, new: Option<&Node>, stats: &mut PatchStats) {
		match (old, new) {
			(None, None) => {}
			(Some(old), None) => {
				self.trace_op("remove", old);
				old.remove();
				stats.removed += 1;
			}
			(None, Some(new)) => {
				let Some(parent) = parent else {
					return;
				};
				self.trace_op("append", new);
				parent.append_child(new);
				stats.appended += 1;
			}
			(Some(old), Some(new)) => match diff_nodes(old, new) {
				NodeDiff::Replace => self.replace(old, new, stats),
				NodeDiff::TextChanged => {
					self.trace_op("text", old);
					old.set_text_content(&new.text_content());
					stats.text_updated += 1;
				}
				NodeDiff::Same => {
					let old_children = old.element_children();
					let new_children = new.element_children();
					let max_length = old_children.len().max(new_children.len());
					for i in 0..max_length {
						self.patch(Some(old), old_children.get(i), new_children.get(i), stats);
					}
				}
			},
		}
	}

	fn replace(&self, old: &Node, new: &Node, stats: &mut PatchStats) {
		self.trace_op("replace", old);
		old.replace_with(new);
		stats.replaced += 1;
	}

	fn trace_op(&self, op: &str, node: &Node) {
		if self.trace {
			info_log!("patch {}: {:?}", op, node);
		}
	}
}

/// Parses `markup` and reconciles `live_root` against it with default settings.
pub fn reconciliate(live_root: &Node, markup: &str) -> Result<Patch, MarkupError> {
	Reconciler::new().reconciliate(live_root, markup)
}
