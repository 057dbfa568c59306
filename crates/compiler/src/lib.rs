//! Compile pipeline declarations into [`weir_ir::IrDocument`]s.
//!
//! Compilation runs these stages in order:
//! - [`stage::assemble`]: create nodes and check references
//! - [`stage::context`]: attach contexts
//! - [`stage::resolve`]: build channel queries and resolver chains
//! - [`stage::validate`]: reject cycles and compute adjacency
//! - [`stage::deploy`]: attach deployment descriptors
//! - [`stage::emit`]: build the IR document
//!
//! Use [`compile`] to run all of them.

mod compile;
pub mod decl;
pub mod errors;
pub mod pipeline;
pub mod stage;

pub use compile::*;

#[cfg(test)]
mod properties;
