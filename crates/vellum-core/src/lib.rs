//! Core types for the Vellum markdown view renderer.
//!
//! This crate provides the foundational types used across the other vellum
//! crates:
//! - Template command types (the instruction stream emitted by a view compiler)
//! - The node tree (an ID arena of component/element/text/anchor nodes)
//! - Content projection buckets
//! - Error types

pub mod commands;
pub mod errors;
pub mod projection;
pub mod tree;

pub use commands::*;
pub use errors::*;
pub use projection::*;
pub use tree::*;
