//! Normalisation of loosely-typed request parameters.
//!
//! UI surfaces send ids as numbers, numeric strings, or the strings
//! `"true"`/`"false"` (URL hash parameters round-trip through strings).

use serde_json::Value;

/// Result of cleaning one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanParam {
	Number(i64),
	Bool(bool),
	/// Malformed input; always treated as absent.
	NaN,
}

impl CleanParam {
	/// Returns the value as an id. Zero, booleans, and NaN are not ids.
	pub fn id(self) -> Option<i64> {
		match self {
			CleanParam::Number(n) if n != 0 => Some(n),
			_ => None,
		}
	}

	pub fn is_truthy(self) -> bool {
		match self {
			CleanParam::Number(n) => n != 0,
			CleanParam::Bool(b) => b,
			CleanParam::NaN => false,
		}
	}
}

/// Cleans an id-like parameter.
///
/// Numbers pass through (fractions truncate), `"true"`/`"false"` and JSON
/// booleans become [`CleanParam::Bool`], other strings parse as base-10
/// integers with [`parse_int`], and everything else is [`CleanParam::NaN`].
pub fn clean_parameter(value: &Value) -> CleanParam {
	match value {
		Value::Number(number) => number
			.as_i64()
			.or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
			.map_or(CleanParam::NaN, CleanParam::Number),
		Value::Bool(flag) => CleanParam::Bool(*flag),
		Value::String(text) => match text.as_str() {
			"true" => CleanParam::Bool(true),
			"false" => CleanParam::Bool(false),
			other => parse_int(other).map_or(CleanParam::NaN, CleanParam::Number),
		},
		_ => CleanParam::NaN,
	}
}

/// Parses the leading base-10 integer of `text`.
///
/// Leading whitespace and a single sign are accepted, parsing stops at the
/// first non-digit, and trailing garbage is ignored. Returns `None` when no
/// digit is found or the value overflows.
pub fn parse_int(text: &str) -> Option<i64> {
	let trimmed = text.trim_start();
	let (negative, digits) = match trimmed.as_bytes().first() {
		Some(b'-') => (true, &trimmed[1..]),
		Some(b'+') => (false, &trimmed[1..]),
		_ => (false, trimmed),
	};
	let end = digits.bytes().position(|b| !b.is_ascii_digit()).unwrap_or(digits.len());
	if end == 0 {
		return None;
	}
	let magnitude: i64 = digits[..end].parse().ok()?;
	Some(if negative { -magnitude } else { magnitude })
}

/// JSON truthiness for boolean flags, except that the strings `"false"` and
/// `"0"` read as false.
pub fn is_truthy(value: Option<&Value>) -> bool {
	match value {
		None | Some(Value::Null) => false,
		Some(Value::Bool(flag)) => *flag,
		Some(Value::Number(number)) => number.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
		Some(Value::String(text)) => !matches!(text.as_str(), "" | "false" | "0"),
		Some(Value::Array(_) | Value::Object(_)) => true,
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn numbers_pass_through() {
		assert_eq!(clean_parameter(&json!(42)), CleanParam::Number(42));
		assert_eq!(clean_parameter(&json!(7.9)), CleanParam::Number(7));
	}

	#[test]
	fn boolean_strings_map_to_booleans() {
		assert_eq!(clean_parameter(&json!("true")), CleanParam::Bool(true));
		assert_eq!(clean_parameter(&json!("false")), CleanParam::Bool(false));
		assert_eq!(clean_parameter(&json!("false")).id(), None);
	}

	#[test]
	fn strings_parse_like_parse_int() {
		assert_eq!(clean_parameter(&json!("12")), CleanParam::Number(12));
		assert_eq!(clean_parameter(&json!("  -3px")), CleanParam::Number(-3));
		assert_eq!(clean_parameter(&json!("abc")), CleanParam::NaN);
		assert_eq!(clean_parameter(&json!("")), CleanParam::NaN);
		assert_eq!(clean_parameter(&json!(null)), CleanParam::NaN);
	}

	#[test]
	fn zero_and_nan_are_not_ids() {
		assert_eq!(clean_parameter(&json!(0)).id(), None);
		assert_eq!(clean_parameter(&json!("x1")).id(), None);
		assert_eq!(clean_parameter(&json!("5")).id(), Some(5));
	}

	#[test]
	fn parse_int_rejects_overflow_and_bare_signs() {
		assert_eq!(parse_int("-"), None);
		assert_eq!(parse_int("99999999999999999999"), None);
		assert_eq!(parse_int("+8"), Some(8));
	}

	#[test]
	fn truthiness_of_flags() {
		assert!(is_truthy(Some(&json!(true))));
		assert!(is_truthy(Some(&json!("yes"))));
		assert!(!is_truthy(Some(&json!("false"))));
		assert!(!is_truthy(Some(&json!(0))));
		assert!(!is_truthy(None));
	}
}
