//! Local component state.
//!
//! Each mounted component owns a [`LocalState`]: a JSON object whose
//! top-level fields are shallow-merged by [`Context::set_state`].
//!
//! [`Context::set_state`]: super::Context::set_state

use core::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Error type for local state updates.
#[derive(Debug, thiserror::Error)]
pub enum LocalStateError {
	/// The patch (or initial state) is not a JSON object.
	#[error("local state must be a JSON object, got {found}")]
	NotAnObject {
		/// JSON type that was supplied instead
		found: &'static str,
	},
	/// A value could not be converted to or from JSON.
	#[error("local state conversion failed: {0}")]
	Serde(#[from] serde_json::Error),
}

fn json_type(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

/// A component's local state: a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LocalState(Map<String, Value>);

impl LocalState {
	/// Creates an empty state.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a state from a JSON value.
	///
	/// `null` yields an empty state; any other non-object is rejected.
	pub fn from_value(value: Value) -> Result<Self, LocalStateError> {
		match value {
			Value::Null => Ok(Self::new()),
			Value::Object(map) => Ok(Self(map)),
			other => Err(LocalStateError::NotAnObject {
				found: json_type(&other),
			}),
		}
	}

	/// Creates a state from any serializable struct or map.
	pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, LocalStateError> {
		Self::from_value(serde_json::to_value(value)?)
	}

	/// Returns a field deserialized as `T`.
	///
	/// `None` if the field is missing or does not fit `T`.
	pub fn get<T: DeserializeOwned>(&self, field: &str) -> Option<T> {
		self.0
			.get(field)
			.and_then(|value| T::deserialize(value).ok())
	}

	/// Returns a field's raw JSON value.
	pub fn get_value(&self, field: &str) -> Option<&Value> {
		self.0.get(field)
	}

	/// Returns whether the field is present.
	pub fn contains(&self, field: &str) -> bool {
		self.0.contains_key(field)
	}

	/// Returns the number of top-level fields.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns whether there are no fields.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Deserializes the whole state into `T`.
	pub fn decode<T: DeserializeOwned>(&self) -> Result<T, LocalStateError> {
		Ok(T::deserialize(&Value::Object(self.0.clone()))?)
	}

	/// Returns the state as a JSON value.
	pub fn to_value(&self) -> Value {
		Value::Object(self.0.clone())
	}

	/// Shallow-merges the top-level fields of `patch` into this state.
	///
	/// Fields present in `patch` overwrite, all others are kept. Nested
	/// objects are replaced, not merged. `null` is an empty patch.
	pub fn merge(&mut self, patch: Value) -> Result<(), LocalStateError> {
		match patch {
			Value::Null => Ok(()),
			Value::Object(fields) => {
				self.0.extend(fields);
				Ok(())
			}
			other => Err(LocalStateError::NotAnObject {
				found: json_type(&other),
			}),
		}
	}
}

/// A local state patch: literal fields, or a function of the current state.
pub enum StatePatch {
	/// Merge these fields.
	Value(Value),
	/// Compute the fields to merge from the current state.
	With(Box<dyn FnOnce(&LocalState) -> Value>),
}

impl StatePatch {
	/// Creates a function patch.
	pub fn with<F>(f: F) -> Self
	where
		F: FnOnce(&LocalState) -> Value + 'static,
	{
		Self::With(Box::new(f))
	}

	/// Creates a literal patch from any serializable value.
	pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, LocalStateError> {
		Ok(Self::Value(serde_json::to_value(value)?))
	}

	pub(crate) fn resolve(self, current: &LocalState) -> Value {
		match self {
			Self::Value(value) => value,
			Self::With(f) => f(current),
		}
	}
}

impl From<Value> for StatePatch {
	fn from(value: Value) -> Self {
		Self::Value(value)
	}
}

impl fmt::Debug for StatePatch {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Value(value) => f.debug_tuple("StatePatch::Value").field(value).finish(),
			Self::With(_) => f.write_str("StatePatch::With(..)"),
		}
	}
}
