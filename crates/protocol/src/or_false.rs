//! Serde adapter for optional fields that the UI encodes as `false` when absent.
//!
//! Use with `#[serde(default, with = "or_false")]`. `None` serializes as
//! `false`; `false`, `true`, and `null` all deserialize as `None`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
	T: Serialize,
	S: Serializer,
{
	match value {
		Some(inner) => inner.serialize(serializer),
		None => serializer.serialize_bool(false),
	}
}

pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
	T: Deserialize<'de>,
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum OrFalse<T> {
		Flag(bool),
		Value(T),
	}

	match Option::<OrFalse<T>>::deserialize(deserializer)? {
		Some(OrFalse::Value(inner)) => Ok(Some(inner)),
		Some(OrFalse::Flag(_)) | None => Ok(None),
	}
}

#[cfg(test)]
mod tests {
	use serde::{Deserialize, Serialize};
	use serde_json::json;

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Probe {
		#[serde(default, with = "super")]
		window_id: Option<i64>,
	}

	#[test]
	fn none_serializes_as_false() {
		let value = serde_json::to_value(Probe { window_id: None }).unwrap();
		assert_eq!(value, json!({ "window_id": false }));
	}

	#[test]
	fn false_null_and_missing_deserialize_as_none() {
		for input in [json!({ "window_id": false }), json!({ "window_id": null }), json!({})] {
			let probe: Probe = serde_json::from_value(input).unwrap();
			assert_eq!(probe.window_id, None);
		}
	}

	#[test]
	fn value_passes_through() {
		let probe: Probe = serde_json::from_value(json!({ "window_id": 7 })).unwrap();
		assert_eq!(probe.window_id, Some(7));
	}
}
