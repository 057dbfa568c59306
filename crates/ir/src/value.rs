use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use smartstring::{LazyCompact, SmartString};
use std::fmt::Display;

/// The scalar kinds a parameter may have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParameterType {
	Int,
	Double,
	String,
}

impl Display for ParameterType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Int => write!(f, "INT"),
			Self::Double => write!(f, "DOUBLE"),
			Self::String => write!(f, "STRING"),
		}
	}
}

/// A literal scalar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
	IntValue(i64),
	DoubleValue(f64),
	StringValue(String),
}

impl FieldValue {
	/// The kind of this value
	pub fn kind(&self) -> ParameterType {
		match self {
			Self::IntValue(_) => ParameterType::Int,
			Self::DoubleValue(_) => ParameterType::Double,
			Self::StringValue(_) => ParameterType::String,
		}
	}

	/// Can this value be written to JSON without loss?
	pub fn is_finite(&self) -> bool {
		match self {
			Self::DoubleValue(x) => x.is_finite(),
			Self::IntValue(_) | Self::StringValue(_) => true,
		}
	}
}

/// A value that is only known when the pipeline runs.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeParameter {
	pub name: SmartString<LazyCompact>,

	#[serde(rename = "type")]
	pub parameter_type: ParameterType,

	/// The value used if the runtime does not provide one
	pub default_value: Option<FieldValue>,
}

impl RuntimeParameter {
	/// A string-typed runtime parameter with no default
	pub fn string(name: &str) -> Self {
		Self {
			name: name.into(),
			parameter_type: ParameterType::String,
			default_value: None,
		}
	}
}

/// A parameter or context value: either a literal,
/// or a reference to a [`RuntimeParameter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
	FieldValue(FieldValue),
	RuntimeParameter(RuntimeParameter),
}

impl Value {
	pub fn string(value: impl Into<String>) -> Self {
		Self::FieldValue(FieldValue::StringValue(value.into()))
	}

	pub fn int(value: i64) -> Self {
		Self::FieldValue(FieldValue::IntValue(value))
	}

	pub fn double(value: f64) -> Self {
		Self::FieldValue(FieldValue::DoubleValue(value))
	}

	/// Can this value be written to JSON without loss?
	pub fn is_finite(&self) -> bool {
		match self {
			Self::FieldValue(x) => x.is_finite(),
			Self::RuntimeParameter(p) => p.default_value.as_ref().map_or(true, FieldValue::is_finite),
		}
	}
}
