//! String ids used as map keys throughout the IR

use serde::{Deserialize, Serialize};
use smartstring::{LazyCompact, SmartString};
use std::fmt::Display;

#[derive(Debug, Hash, PartialEq, Eq, Clone, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(SmartString<LazyCompact>);

impl NodeId {
	/// Make a new pipeline node id
	pub fn new(id: &str) -> Self {
		Self(id.into())
	}

	/// get the id
	pub fn id(&self) -> &SmartString<LazyCompact> {
		&self.0
	}

	pub fn as_str(&self) -> &str {
		self.0.as_str()
	}
}

impl Display for NodeId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.0.fmt(f)
	}
}

impl From<&str> for NodeId {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl From<String> for NodeId {
	fn from(value: String) -> Self {
		Self::new(&value)
	}
}

/// The name of one input of a node
#[derive(Debug, Hash, PartialEq, Eq, Clone, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct InputKey(SmartString<LazyCompact>);

impl InputKey {
	pub fn new(key: &str) -> Self {
		Self(key.into())
	}

	pub fn as_str(&self) -> &str {
		self.0.as_str()
	}
}

impl Display for InputKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.0.fmt(f)
	}
}

impl From<&str> for InputKey {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

/// The name of one output of a node
#[derive(Debug, Hash, PartialEq, Eq, Clone, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct OutputKey(SmartString<LazyCompact>);

impl OutputKey {
	pub fn new(key: &str) -> Self {
		Self(key.into())
	}

	pub fn as_str(&self) -> &str {
		self.0.as_str()
	}
}

impl Display for OutputKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.0.fmt(f)
	}
}

impl From<&str> for OutputKey {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
