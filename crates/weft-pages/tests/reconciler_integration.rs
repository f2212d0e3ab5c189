//! Reconciler integration tests
//!
//! Success Criteria:
//! 1. Leaf text changes are patched in place (identity kept)
//! 2. Trailing children are removed and appended positionally
//! 3. Index-based pairing replaces shifted siblings wholesale
//! 4. Mixed text and element content is not compared at that level
//! 5. Root replacement is reported through the returned patch
//! 6. Reconciling the same markup twice is idempotent

use proptest::prelude::*;
use rstest::*;
use weft_pages::config::PagesConfig;
use weft_pages::dom::Node;
use weft_pages::markup::{self, MarkupError};
use weft_pages::reconciler::{
	NodeDiff, PatchStats, Reconciler, compare_nodes, diff_nodes, reconciliate,
};

/// Mounts `markup` under a `<body>` container and returns (container, root).
fn live(markup: &str) -> (Node, Node) {
	let container = Node::element("body");
	let root = markup::parse(markup).unwrap();
	container.append_child(&root);
	(container, root)
}

// ============================================================================
// Scenarios
// ============================================================================

#[rstest]
fn test_leaf_text_only_changes() {
	let (container, div) = live("<div><span>a</span></div>");
	let span = div.element_children()[0].clone();

	let patch = reconciliate(&div, "<div><span>b</span></div>").unwrap();

	assert!(container.element_children()[0].ptr_eq(&div));
	assert!(div.element_children()[0].ptr_eq(&span));
	assert_eq!(span.text_content(), "b");
	assert_eq!(patch.stats.text_updated, 1);
	assert_eq!(patch.stats.replaced, 0);
}

#[rstest]
fn test_second_item_removed_first_updated() {
	let (_container, list) = live("<ul><li>a</li><li>b</li></ul>");
	let first = list.element_children()[0].clone();
	let second = list.element_children()[1].clone();

	reconciliate(&list, "<ul><li>x</li></ul>").unwrap();

	assert_eq!(list.child_element_count(), 1);
	assert!(list.element_children()[0].ptr_eq(&first));
	assert_eq!(first.text_content(), "x");
	assert!(second.parent().is_none());
}

// ============================================================================
// Comparison rules
// ============================================================================

#[rstest]
#[case::tag("<p>a</p>", "<div>a</div>", NodeDiff::Replace)]
#[case::attribute_count("<p id=\"a\">a</p>", "<p>a</p>", NodeDiff::Replace)]
#[case::attribute_value("<p id=\"a\">a</p>", "<p id=\"b\">a</p>", NodeDiff::Replace)]
#[case::attribute_order("<p id=\"a\" class=\"c\">a</p>", "<p class=\"c\" id=\"a\">a</p>", NodeDiff::Same)]
#[case::leaf_text("<p>a</p>", "<p>b</p>", NodeDiff::TextChanged)]
#[case::nested_text("<p><b>a</b></p>", "<p><b>b</b></p>", NodeDiff::Same)]
#[case::mixed_text("<p>a<b>x</b></p>", "<p>b<b>x</b></p>", NodeDiff::Same)]
#[case::child_vs_leaf("<p><b>a</b></p>", "<p>a</p>", NodeDiff::Same)]
fn test_diff_rules(#[case] a: &str, #[case] b: &str, #[case] expected: NodeDiff) {
	let a = markup::parse(a).unwrap();
	let b = markup::parse(b).unwrap();

	assert_eq!(diff_nodes(&a, &b), expected);
	assert_eq!(compare_nodes(&a, &b), expected != NodeDiff::Same);
}

// ============================================================================
// Positional pairing
// ============================================================================

#[rstest]
fn test_deletion_at_front_replaces_every_shifted_sibling() {
	let (_container, list) = live(
		"<ul><li id=\"1\">1</li><li id=\"2\">2</li><li id=\"3\">3</li><li id=\"4\">4</li></ul>",
	);
	let last_kept = list.element_children()[3].clone();

	let patch = reconciliate(
		&list,
		"<ul><li id=\"2\">2</li><li id=\"3\">3</li><li id=\"4\">4</li></ul>",
	)
	.unwrap();

	assert_eq!(
		patch.stats,
		PatchStats {
			removed: 1,
			replaced: 3,
			..Default::default()
		}
	);
	// The old `4` was the trailing node and got removed, not moved
	assert!(last_kept.parent().is_none());
	assert_eq!(list.text_content(), "234");
}

#[rstest]
fn test_changed_subtree_is_not_descended() {
	let (_container, root) = live("<div><ul class=\"a\"><li>1</li><li>2</li></ul></div>");
	let old_item = root.element_children()[0].element_children()[0].clone();

	let patch = reconciliate(&root, "<div><ul class=\"b\"><li>1</li><li>2</li></ul></div>").unwrap();

	assert_eq!(patch.stats.total(), 1);
	assert_eq!(patch.stats.replaced, 1);
	assert!(!root.element_children()[0].element_children()[0].ptr_eq(&old_item));
}

#[rstest]
fn test_attributes_replace_node_with_children() {
	let (_container, root) = live("<form><input name=\"a\"><button>go</button></form>");

	reconciliate(&root, "<form><input name=\"b\"><button>go</button></form>").unwrap();

	assert_eq!(root.outer_html(), "<form><input name=\"b\"><button>go</button></form>");
}

// ============================================================================
// Root replacement
// ============================================================================

#[rstest]
fn test_root_tag_change_reported() {
	let (container, root) = live("<div class=\"page\"><p>1</p></div>");

	let patch = reconciliate(&root, "<section class=\"page\"><p>1</p></section>").unwrap();

	assert!(patch.root_replaced);
	assert_eq!(patch.stats.replaced, 1);
	assert!(container.element_children()[0].ptr_eq(&patch.root));
	assert!(root.parent().is_none());
}

#[rstest]
fn test_root_text_change_keeps_root() {
	let (_container, root) = live("<h1>a</h1>");

	let patch = reconciliate(&root, "<h1>b</h1>").unwrap();

	assert!(!patch.root_replaced);
	assert!(patch.root.ptr_eq(&root));
	assert_eq!(root.text_content(), "b");
}

// ============================================================================
// Error path
// ============================================================================

#[rstest]
#[case("")]
#[case("<p>1</p><p>2</p>")]
#[case("loose text")]
fn test_invalid_markup_applies_nothing(#[case] markup: &str) {
	let (container, root) = live("<div><p>keep</p></div>");

	let result: Result<_, MarkupError> = reconciliate(&root, markup);

	assert!(result.is_err());
	assert_eq!(container.inner_html(), "<div><p>keep</p></div>");
}

// ============================================================================
// Tracing
// ============================================================================

#[rstest]
fn test_traced_reconcile_with_subscriber() {
	let reconciler = Reconciler::from_config(&PagesConfig::new().with_trace_patches(true));
	let (_container, root) = live("<ul><li>a</li></ul>");

	let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
	let patch = tracing::subscriber::with_default(subscriber, || {
		reconciler.reconciliate(&root, "<ul><li>b</li><li>c</li></ul>").unwrap()
	});

	assert_eq!(patch.stats.text_updated, 1);
	assert_eq!(patch.stats.appended, 1);
}

// ============================================================================
// Property-based
// ============================================================================

fn item() -> impl Strategy<Value = String> {
	prop_oneof![
		"[a-z]{1,4}".prop_map(|text| format!("<li>{text}</li>")),
		"[a-z]{1,4}".prop_map(|text| format!("<li class=\"{text}\">{text}</li>")),
		"[a-z]{1,4}".prop_map(|text| format!("<li data-kind=\"nested\"><b>{text}</b></li>")),
	]
}

fn list_markup(items: &[String]) -> String {
	format!("<ul>{}</ul>", items.concat())
}

// Leaf and nested items carry different attributes: a leaf paired with a
// nested item of the same shape would only converge on a second pass, since
// text is not compared once element children are present.
proptest! {
	#[test]
	fn prop_reconciled_tree_matches_markup(
		before in proptest::collection::vec(item(), 0..6),
		after in proptest::collection::vec(item(), 0..6),
	) {
		let (_container, list) = live(&list_markup(&before));
		let markup = list_markup(&after);

		reconciliate(&list, &markup).unwrap();
		prop_assert_eq!(list.outer_html(), markup.clone());

		let again = reconciliate(&list, &markup).unwrap();
		prop_assert!(again.stats.is_empty());
	}
}
