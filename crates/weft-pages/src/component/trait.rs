//! Component trait definition.

use serde_json::Value;

use super::{Context, RenderError};

/// Trait for markup components.
///
/// A component's fields are its props. Every hook is optional: the defaults
/// do nothing, and the default [`render`](Component::render) re-emits the
/// current tree so reconciling it changes nothing.
///
/// Hooks run in this order when the component is mounted:
///
/// 1. [`init_state`](Component::init_state)
/// 2. [`observer_keys`](Component::observer_keys), each key gets a re-render
///    subscription
/// 3. [`render`](Component::render), then the result is reconciled into the
///    target
/// 4. [`mount_children`](Component::mount_children)
/// 5. [`set_events`](Component::set_events), once
/// 6. [`component_did_mount`](Component::component_did_mount), once
///
/// Steps 3 and 4 repeat on every [`Context::set_state`] and on every
/// notification of an observed store key.
///
/// # Example
///
/// ```ignore
/// use weft_pages::component::{Component, Context, RenderError, StatePatch};
/// use serde_json::{Value, json};
///
/// struct Counter;
///
/// impl Component for Counter {
///     fn init_state(&self) -> Value {
///         json!({ "count": 0 })
///     }
///
///     fn render(&self, ctx: &Context<Self>) -> Result<String, RenderError> {
///         let count = ctx.state().get::<i64>("count").unwrap_or(0);
///         Ok(format!(r#"<div id="counter"><button>{count}</button></div>"#))
///     }
///
///     fn set_events(&self, ctx: &Context<Self>) -> Result<(), RenderError> {
///         ctx.add_event("click", "button", |_, ctx| {
///             ctx.set_state(StatePatch::with(|state| {
///                 json!({ "count": state.get::<i64>("count").unwrap_or(0) + 1 })
///             }))
///         })?;
///         Ok(())
///     }
/// }
/// ```
pub trait Component: Sized + 'static {
	/// Returns the component's name for logging and errors.
	fn name() -> &'static str {
		std::any::type_name::<Self>()
	}

	/// Returns the initial local state, a JSON object (or `null`).
	fn init_state(&self) -> Value {
		Value::Null
	}

	/// Returns the store keys whose changes re-render this component.
	fn observer_keys(&self) -> Vec<String> {
		Vec::new()
	}

	/// Renders the markup for the component's root element.
	///
	/// The markup must have exactly one root element; it is compared against
	/// the current target node itself.
	fn render(&self, ctx: &Context<Self>) -> Result<String, RenderError> {
		Ok(ctx.target().outer_html())
	}

	/// Mounts nested components after each render.
	fn mount_children(&self, ctx: &Context<Self>) -> Result<(), RenderError> {
		let _ = ctx;
		Ok(())
	}

	/// Registers delegated event handlers, once after the first render.
	fn set_events(&self, ctx: &Context<Self>) -> Result<(), RenderError> {
		let _ = ctx;
		Ok(())
	}

	/// Runs once the component is fully mounted.
	fn component_did_mount(&self, ctx: &Context<Self>) -> Result<(), RenderError> {
		let _ = ctx;
		Ok(())
	}

	/// Runs on explicit unmount, before subscriptions and listeners are released.
	fn component_will_unmount(&self, ctx: &Context<Self>) {
		let _ = ctx;
	}
}
