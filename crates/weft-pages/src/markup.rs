//! Markup parsing.
//!
//! Turns a rendered markup string into a detached [`Node`] tree that the
//! reconciler can compare against the live tree. Parsing uses the html5ever
//! fragment parser (through `scraper`), so the usual HTML error recovery
//! applies; the only hard requirement is that the markup has exactly one root
//! element. Comments are dropped and whitespace-only text around the root is
//! ignored.
//!
//! The fragment is parsed in the context of the element its root may live
//! in: a `<tr>` root is parsed as the child of a `<tbody>`, a `<td>` as the
//! child of a `<tr>`, an `<option>` inside a `<select>` and so on. Anything
//! else is parsed in `<body>` context.

use html5ever::tendril::TendrilSink;
use html5ever::{LocalName, QualName, namespace_url, ns};
use scraper::node::Node as HtmlNode;
use scraper::{ElementRef, Html, HtmlTreeSink};

use crate::debug_log;
use crate::dom::Node;

/// Error type for markup that cannot become a single-rooted tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
	/// The markup contains no element at all.
	#[error("markup has no root element")]
	NoRootElement,
	/// The markup has more than one top-level element.
	#[error("markup must have a single root element, found {count}")]
	MultipleRoots {
		/// Number of top-level elements
		count: usize,
	},
	/// The markup has text outside the root element.
	#[error("markup has text outside the root element: {0:?}")]
	StrayText(String),
}

/// Parses `markup` into a detached tree rooted at its single element.
pub fn parse(markup: &str) -> Result<Node, MarkupError> {
	let context = context_for(leading_tag(markup).as_deref());
	let fragment = html5ever::driver::parse_fragment(
		HtmlTreeSink::new(Html::new_fragment()),
		Default::default(),
		QualName::new(None, ns!(html), LocalName::from(context)),
		Vec::new(),
	)
	.one(markup);
	if !fragment.errors.is_empty() {
		debug_log!(
			"markup parse in <{}> context recovered from {} error(s)",
			context,
			fragment.errors.len()
		);
	}

	// Fragment content lives under the synthetic <html> context element
	let container = fragment.root_element();
	let mut roots = Vec::new();
	for child in container.children() {
		match child.value() {
			HtmlNode::Element(_) => roots.push(child),
			HtmlNode::Text(text) if !text.trim().is_empty() => {
				return Err(MarkupError::StrayText(text.trim().to_string()));
			}
			_ => {}
		}
	}

	match roots.len() {
		0 => Err(MarkupError::NoRootElement),
		1 => ElementRef::wrap(roots[0])
			.map(convert)
			.ok_or(MarkupError::NoRootElement),
		count => Err(MarkupError::MultipleRoots { count }),
	}
}

/// Returns the tag name of the first start tag, skipping whitespace and comments.
fn leading_tag(markup: &str) -> Option<String> {
	let mut rest = markup.trim_start();
	while let Some(comment) = rest.strip_prefix("<!--") {
		let end = comment.find("-->")?;
		rest = comment[end + 3..].trim_start();
	}

	let name: String = rest
		.strip_prefix('<')?
		.chars()
		.take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
		.collect();
	(!name.is_empty()).then(|| name.to_ascii_lowercase())
}

/// Picks the element a root with tag `tag` is parsed inside.
fn context_for(tag: Option<&str>) -> &'static str {
	match tag {
		Some("tr") => "tbody",
		Some("td" | "th") => "tr",
		Some("thead" | "tbody" | "tfoot" | "caption" | "colgroup") => "table",
		Some("col") => "colgroup",
		Some("option" | "optgroup") => "select",
		_ => "body",
	}
}

fn convert(source: ElementRef<'_>) -> Node {
	let element = source.value();
	let node = Node::element(element.name());
	for (name, value) in element.attrs() {
		node.set_attribute(name, value);
	}
	for child in source.children() {
		match child.value() {
			HtmlNode::Element(_) => {
				if let Some(child) = ElementRef::wrap(child) {
					node.append_child(&convert(child));
				}
			}
			HtmlNode::Text(text) => node.append_child(&Node::text(&**text)),
			_ => {}
		}
	}
	node
}
