//! The output-target seam.
//!
//! The renderer does not know where its serialization goes. A target resolves
//! the host selector once, at root-view creation, and afterwards receives the
//! full serialization on every mutation, replacing prior content wholesale.

/// Where serialized markdown is written.
pub trait RenderTarget {
    /// Locate the host position named by `selector`. Returns false when the
    /// selector matches nothing; root-view creation fails in that case.
    fn resolve(&mut self, selector: &str) -> bool;

    /// Replace the target content with a fresh serialization.
    fn write(&mut self, markdown: &str);
}

/// In-memory target with a single named location.
///
/// Resolves only its own name and keeps the most recent write, which makes it
/// the natural target for tests and for hosts that consume the markdown as a
/// string.
#[derive(Debug, Clone, Default)]
pub struct BufferTarget {
    name: String,
    content: String,
}

impl BufferTarget {
    /// Create a target answering to `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: String::new(),
        }
    }

    /// The most recently written serialization.
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl RenderTarget for BufferTarget {
    fn resolve(&mut self, selector: &str) -> bool {
        selector == self.name
    }

    fn write(&mut self, markdown: &str) {
        self.content.clear();
        self.content.push_str(markdown);
    }
}
