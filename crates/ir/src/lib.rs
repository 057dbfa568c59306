//! The intermediate representation emitted by the pipeline compiler.
//!
//! An [`IrDocument`] is a self-contained description of a pipeline:
//! every node, the channel queries it reads, and how it is deployed.
//! Orchestration runtimes consume it without knowing anything about
//! how the pipeline was authored.

mod deployment;
mod document;
mod labels;
mod node;
mod value;

pub use deployment::*;
pub use document::*;
pub use labels::*;
pub use node::*;
pub use value::*;

/// The version of the IR format written by this crate.
pub const IR_VERSION: u32 = 1;

// MARK: Well-known names

/// Context type naming the pipeline
pub const PIPELINE_CONTEXT_TYPE: &str = "pipeline";

/// Context type naming one run of the pipeline
pub const PIPELINE_RUN_CONTEXT_TYPE: &str = "pipeline_run";

/// Context type naming one node of the pipeline
pub const NODE_CONTEXT_TYPE: &str = "node";

/// Runtime parameter holding the id of the current run
pub const PIPELINE_RUN_ID_PARAMETER: &str = "pipeline-run-id";

/// Runtime parameter holding the pipeline's root directory
pub const PIPELINE_ROOT_PARAMETER: &str = "pipeline-root";

/// Is `context_type` one of the contexts every node carries?
pub fn is_canonical_context_type(context_type: &str) -> bool {
	return [
		PIPELINE_CONTEXT_TYPE,
		PIPELINE_RUN_CONTEXT_TYPE,
		NODE_CONTEXT_TYPE,
	]
	.contains(&context_type);
}
