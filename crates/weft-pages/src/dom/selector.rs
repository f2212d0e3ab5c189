//! CSS selectors over the document tree.
//!
//! Selector lists are parsed with the same grammar `scraper` uses (the
//! `selectors` crate with `scraper`'s [`Simple`] implementation), so type,
//! id, class and attribute selectors, every combinator and the
//! tree-structural pseudo-classes (`:first-child`, `:nth-child()`, `:not()`,
//! `:is()`, `:has()` and friends) are available. Matching runs directly on
//! [`Node`] through the [`selectors::Element`] implementation below.
//! State pseudo-classes such as `:hover` are rejected at parse time.

use cssparser::{Parser as CssParser, ParserInput};
use html5ever::{Namespace, namespace_url, ns};
use scraper::error::SelectorErrorKind;
use scraper::selector::{CssLocalName, CssString, NonTSPseudoClass, Parser, PseudoElement, Simple};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::bloom::BloomFilter;
use selectors::matching::{
	self, MatchingContext, MatchingForInvalidation, MatchingMode, NeedsSelectorFlags, QuirksMode,
	SelectorCaches,
};
use selectors::parser::ParseRelative;
use selectors::{OpaqueElement, SelectorList};

use super::Node;

/// Error type for selector parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
	/// The selector string is empty.
	#[error("empty selector")]
	Empty,
	/// The selector is not valid CSS selector syntax.
	#[error("invalid selector `{selector}`: {reason}")]
	Invalid {
		/// The selector as given
		selector: String,
		/// What went wrong
		reason: String,
	},
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
	source: String,
	list: SelectorList<Simple>,
}

impl Selector {
	/// Parses a selector list.
	pub fn parse(source: &str) -> Result<Self, SelectorError> {
		if source.trim().is_empty() {
			return Err(SelectorError::Empty);
		}

		let mut input = ParserInput::new(source);
		let mut parser = CssParser::new(&mut input);
		let list = SelectorList::parse(&Parser, &mut parser, ParseRelative::No).map_err(|err| {
			SelectorError::Invalid {
				selector: source.to_string(),
				reason: SelectorErrorKind::from(err).to_string(),
			}
		})?;

		Ok(Self {
			source: source.to_string(),
			list,
		})
	}

	/// Returns the selector text this was parsed from.
	pub fn source(&self) -> &str {
		&self.source
	}

	/// Returns whether `node` matches any selector in the list.
	pub fn matches(&self, node: &Node) -> bool {
		if !node.is_element() {
			return false;
		}

		let mut caches = SelectorCaches::default();
		let mut context = MatchingContext::new(
			MatchingMode::Normal,
			None,
			&mut caches,
			QuirksMode::NoQuirks,
			NeedsSelectorFlags::No,
			MatchingForInvalidation::No,
		);
		matching::matches_selector_list(&self.list, &ElementNode(node.clone()), &mut context)
	}
}

/// An element handle as seen by the selector matcher.
#[derive(Debug, Clone)]
struct ElementNode(Node);

impl ElementNode {
	fn wrap(node: Node) -> Option<Self> {
		node.is_element().then_some(Self(node))
	}

	fn sibling_elements(&self) -> Vec<Node> {
		self.0
			.parent()
			.map(|parent| parent.element_children())
			.unwrap_or_default()
	}

	fn position(&self, siblings: &[Node]) -> Option<usize> {
		siblings.iter().position(|sibling| sibling.ptr_eq(&self.0))
	}
}

impl selectors::Element for ElementNode {
	type Impl = Simple;

	fn opaque(&self) -> OpaqueElement {
		OpaqueElement::new(&*self.0.0)
	}

	fn parent_element(&self) -> Option<Self> {
		self.0.parent().and_then(Self::wrap)
	}

	fn parent_node_is_shadow_root(&self) -> bool {
		false
	}

	fn containing_shadow_host(&self) -> Option<Self> {
		None
	}

	fn is_pseudo_element(&self) -> bool {
		false
	}

	fn prev_sibling_element(&self) -> Option<Self> {
		let siblings = self.sibling_elements();
		let index = self.position(&siblings)?;
		index
			.checked_sub(1)
			.and_then(|prev| siblings.get(prev).cloned())
			.map(Self)
	}

	fn next_sibling_element(&self) -> Option<Self> {
		let siblings = self.sibling_elements();
		let index = self.position(&siblings)?;
		siblings.get(index + 1).cloned().map(Self)
	}

	fn first_element_child(&self) -> Option<Self> {
		self.0.element_children().into_iter().next().map(Self)
	}

	fn is_html_element_in_html_document(&self) -> bool {
		true
	}

	fn has_local_name(&self, name: &CssLocalName) -> bool {
		self.0.tag().is_some_and(|tag| *tag == *name.0)
	}

	fn has_namespace(&self, namespace: &Namespace) -> bool {
		*namespace == ns!(html)
	}

	fn is_same_type(&self, other: &Self) -> bool {
		self.0.tag() == other.0.tag()
	}

	fn attr_matches(
		&self,
		namespace: &NamespaceConstraint<&Namespace>,
		local_name: &CssLocalName,
		operation: &AttrSelectorOperation<&CssString>,
	) -> bool {
		// Attributes all live in the null namespace
		if matches!(*namespace, NamespaceConstraint::Specific(url) if *url != ns!()) {
			return false;
		}
		self.0
			.get_attribute(&local_name.0)
			.is_some_and(|value| operation.eval_str(&value))
	}

	fn match_non_ts_pseudo_class(
		&self,
		_pc: &NonTSPseudoClass,
		_context: &mut MatchingContext<'_, Self::Impl>,
	) -> bool {
		false
	}

	fn match_pseudo_element(
		&self,
		_pe: &PseudoElement,
		_context: &mut MatchingContext<'_, Self::Impl>,
	) -> bool {
		false
	}

	fn apply_selector_flags(&self, _flags: matching::ElementSelectorFlags) {}

	fn is_link(&self) -> bool {
		self.0.tag().as_deref() == Some("link")
	}

	fn is_html_slot_element(&self) -> bool {
		self.0.tag().as_deref() == Some("slot")
	}

	fn has_id(&self, id: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
		self.0
			.get_attribute("id")
			.is_some_and(|value| case_sensitivity.eq(id.0.as_bytes(), value.as_bytes()))
	}

	fn has_class(&self, name: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
		self.0.get_attribute("class").is_some_and(|classes| {
			classes
				.split_ascii_whitespace()
				.any(|class| case_sensitivity.eq(name.0.as_bytes(), class.as_bytes()))
		})
	}

	fn has_custom_state(&self, _name: &CssLocalName) -> bool {
		false
	}

	fn imported_part(&self, _name: &CssLocalName) -> Option<CssLocalName> {
		None
	}

	fn is_part(&self, _name: &CssLocalName) -> bool {
		false
	}

	fn is_empty(&self) -> bool {
		self.0
			.children()
			.iter()
			.all(|child| child.is_text() && child.text_content().is_empty())
	}

	fn is_root(&self) -> bool {
		self.0.parent().is_none()
	}

	fn add_element_unique_hashes(&self, _filter: &mut BloomFilter) -> bool {
		false
	}
}
