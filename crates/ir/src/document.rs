use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use smartstring::{LazyCompact, SmartString};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::{
	deployment::DeploymentEntry,
	labels::NodeId,
	node::PipelineNode,
	value::{FieldValue, RuntimeParameter},
	IR_VERSION,
};

/// An error we can encounter while encoding or decoding an [`IrDocument`]
#[derive(Debug, Error)]
pub enum IrError {
	/// JSON cannot faithfully represent NaN or infinities
	#[error("cannot encode non-finite double at {location}")]
	NonFiniteDouble { location: String },

	#[error("could not encode document")]
	Encode(#[source] serde_json::Error),

	#[error("could not decode document")]
	Decode(#[source] serde_json::Error),

	#[error("unsupported ir version {found}, expected {expected}")]
	UnsupportedVersion { found: u32, expected: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutionMode {
	#[default]
	Sync,
	Async,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineInfo {
	pub id: SmartString<LazyCompact>,
}

/// Values the runtime provides when a pipeline runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSpec {
	pub pipeline_root: RuntimeParameter,
	pub pipeline_run_id: RuntimeParameter,
}

/// A compiled pipeline.
///
/// Field order here is the key order of the encoded document,
/// and every map is keyed in sorted order.
/// Two equal documents always encode to the same bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrDocument {
	pub ir_version: u32,
	pub pipeline_info: PipelineInfo,
	pub nodes: Vec<PipelineNode>,
	pub runtime_spec: RuntimeSpec,
	pub execution_mode: ExecutionMode,
	pub deployment_config: BTreeMap<NodeId, DeploymentEntry>,
}

impl IrDocument {
	/// Make sure every double in this document is finite.
	pub fn check_finite(&self) -> Result<(), IrError> {
		let default_is_finite =
			|p: &RuntimeParameter| p.default_value.as_ref().map_or(true, FieldValue::is_finite);

		if !default_is_finite(&self.runtime_spec.pipeline_root) {
			return Err(IrError::NonFiniteDouble {
				location: "runtime_spec.pipeline_root".into(),
			});
		}

		if !default_is_finite(&self.runtime_spec.pipeline_run_id) {
			return Err(IrError::NonFiniteDouble {
				location: "runtime_spec.pipeline_run_id".into(),
			});
		}

		for node in &self.nodes {
			let node_id = &node.node_info.id;

			for (key, value) in &node.parameters {
				if !value.is_finite() {
					return Err(IrError::NonFiniteDouble {
						location: format!("node `{node_id}` parameter `{key}`"),
					});
				}
			}

			for context in &node.contexts {
				if !context.name.is_finite() {
					return Err(IrError::NonFiniteDouble {
						location: format!("node `{node_id}` context `{}`", context.context_type.name),
					});
				}
			}
		}

		return Ok(());
	}

	/// Encode this document as compact JSON.
	pub fn to_canonical_json(&self) -> Result<String, IrError> {
		self.check_finite()?;
		return serde_json::to_string(self).map_err(IrError::Encode);
	}

	/// Encode this document as indented JSON.
	/// Keys are in the same order as [`Self::to_canonical_json`].
	pub fn to_pretty_json(&self) -> Result<String, IrError> {
		self.check_finite()?;
		return serde_json::to_string_pretty(self).map_err(IrError::Encode);
	}

	/// A hex SHA-256 digest of this document's canonical encoding.
	pub fn fingerprint(&self) -> Result<String, IrError> {
		let json = self.to_canonical_json()?;
		return Ok(format!("{:x}", Sha256::digest(json.as_bytes())));
	}

	/// Decode a document written by [`Self::to_canonical_json`]
	/// or [`Self::to_pretty_json`].
	pub fn from_json(json: &str) -> Result<Self, IrError> {
		let doc: Self = serde_json::from_str(json).map_err(IrError::Decode)?;

		if doc.ir_version != IR_VERSION {
			return Err(IrError::UnsupportedVersion {
				found: doc.ir_version,
				expected: IR_VERSION,
			});
		}

		return Ok(doc);
	}

	/// Find a node by id
	pub fn node(&self, id: &str) -> Option<&PipelineNode> {
		self.nodes.iter().find(|n| n.node_info.id.as_str() == id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{node::*, value::Value, PIPELINE_ROOT_PARAMETER, PIPELINE_RUN_ID_PARAMETER};

	fn small_document() -> IrDocument {
		let node = PipelineNode {
			node_info: NodeInfo {
				node_type: NodeType {
					name: "tfx.components.CsvExampleGen".into(),
					base_type: Some(NodeBaseType::Ingest),
				},
				id: "CsvExampleGen".into(),
			},
			contexts: vec![ContextSpec::new("pipeline", Value::string("p"))],
			inputs: BTreeMap::new(),
			outputs: BTreeMap::new(),
			parameters: [("lr".into(), Value::double(0.25))].into_iter().collect(),
			upstream_nodes: Vec::new(),
			downstream_nodes: Vec::new(),
			execution_options: ExecutionOptions {
				enable_cache: true,
				max_execution_retries: None,
			},
		};

		IrDocument {
			ir_version: IR_VERSION,
			pipeline_info: PipelineInfo { id: "p".into() },
			nodes: vec![node],
			runtime_spec: RuntimeSpec {
				pipeline_root: RuntimeParameter::string(PIPELINE_ROOT_PARAMETER),
				pipeline_run_id: RuntimeParameter::string(PIPELINE_RUN_ID_PARAMETER),
			},
			execution_mode: ExecutionMode::Sync,
			deployment_config: BTreeMap::new(),
		}
	}

	#[test]
	fn top_level_key_order() {
		let json = small_document().to_canonical_json().unwrap();
		let keys = [
			"\"ir_version\"",
			"\"pipeline_info\"",
			"\"nodes\"",
			"\"runtime_spec\"",
			"\"execution_mode\"",
			"\"deployment_config\"",
		];
		let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
		let mut sorted = positions.clone();
		sorted.sort();
		assert_eq!(positions, sorted);
		assert!(json.starts_with(r#"{"ir_version":1,"pipeline_info":{"id":"p"},"nodes":[{"node_info":"#));
		assert!(json.ends_with(r#""execution_mode":"SYNC","deployment_config":{}}"#));
	}

	#[test]
	fn round_trip() {
		let doc = small_document();
		let decoded = IrDocument::from_json(&doc.to_pretty_json().unwrap()).unwrap();
		assert_eq!(decoded, doc);
		assert_eq!(
			decoded.to_canonical_json().unwrap(),
			doc.to_canonical_json().unwrap()
		);
	}

	#[test]
	fn fingerprint_is_stable() {
		let a = small_document().fingerprint().unwrap();
		let b = small_document().fingerprint().unwrap();
		assert_eq!(a, b);
		assert_eq!(a.len(), 64);

		let mut other = small_document();
		other.execution_mode = ExecutionMode::Async;
		assert_ne!(other.fingerprint().unwrap(), a);
	}

	#[test]
	fn refuses_non_finite_doubles() {
		let mut doc = small_document();
		doc.nodes[0]
			.parameters
			.insert("lr".into(), Value::double(f64::NAN));

		match doc.to_canonical_json() {
			Err(IrError::NonFiniteDouble { location }) => {
				assert_eq!(location, "node `CsvExampleGen` parameter `lr`")
			}
			Err(e) => panic!("unexpected error: {e}"),
			Ok(_) => panic!("encoded a NaN"),
		}
	}

	#[test]
	fn refuses_other_versions() {
		let json = small_document()
			.to_canonical_json()
			.unwrap()
			.replacen("\"ir_version\":1", "\"ir_version\":7", 1);

		assert!(matches!(
			IrDocument::from_json(&json),
			Err(IrError::UnsupportedVersion {
				found: 7,
				expected: 1
			})
		));
	}
}
