//! Markdown rendering for Vellum views.
//!
//! The renderer facade consumes compiled templates, builds live node trees
//! through `vellum-builder`, and keeps a markdown serialization of the root
//! view in sync with tree mutations.

pub mod markdown;
pub mod renderer;
pub mod target;
pub mod view;

pub use markdown::{render_node, render_nodes};
pub use renderer::MarkdownRenderer;
pub use target::{BufferTarget, RenderTarget};
pub use view::{ElementRef, FragmentRef, View, ViewRef};
