//! Error types for the Vellum renderer.

use thiserror::Error;

use crate::commands::TemplateId;

/// Top-level error type for the Vellum renderer.
#[derive(Debug, Error)]
pub enum VellumError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Errors while interpreting a command stream.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Unknown component template: {id}")]
    UnknownTemplate { id: TemplateId },
}

/// Errors raised by the renderer facade.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("The selector \"{selector}\" did not match any target")]
    SelectorNotMatched { selector: String },

    #[error("Operation not supported: {operation}")]
    Unsupported { operation: &'static str },

    #[error("Unknown view index {index}")]
    UnknownView { index: usize },

    #[error("Bound {kind} index {index} out of range")]
    BoundIndexOutOfRange { kind: &'static str, index: usize },
}
