//! Compiler stages, in the order they run.
//!
//! Each stage reads the output of the one before it,
//! and fails on the first problem it finds.

pub mod assemble;
pub mod context;
pub mod deploy;
pub mod emit;
pub mod resolve;
pub mod validate;
