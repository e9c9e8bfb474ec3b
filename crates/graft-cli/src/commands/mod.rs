//! CLI command implementations for Graft.

pub mod check;
pub mod resolve;
