use serde::de::DeserializeOwned;
use serde_json::Value;
use spaces_protocol::param::{CleanParam, clean_parameter, is_truthy};

/// Read-only view over a tagged request object (`{action, ...params}`).
#[derive(Debug, Clone, Copy)]
pub struct RawRequest<'a> {
	value: &'a Value,
}

impl<'a> RawRequest<'a> {
	pub fn new(value: &'a Value) -> Self {
		Self { value }
	}

	pub fn action(&self) -> Option<&'a str> {
		self.value.get("action").and_then(Value::as_str)
	}

	pub fn get(&self, key: &str) -> Option<&'a Value> {
		self.value.get(key)
	}

	/// A cleaned, non-zero id.
	pub fn id<T: From<i64>>(&self, key: &str) -> Option<T> {
		self.get(key).map(clean_parameter).and_then(CleanParam::id).map(T::from)
	}

	pub fn flag(&self, key: &str) -> bool {
		is_truthy(self.get(key))
	}

	/// A non-empty string.
	pub fn text(&self, key: &str) -> Option<String> {
		self.get(key)?.as_str().filter(|text| !text.is_empty()).map(str::to_string)
	}

	pub fn decode<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
		T::deserialize(self.get(key)?).ok()
	}
}
