//! The renderer facade.
//!
//! One renderer owns the template registry, the node arena shared by all of
//! its views, and the output target. Every mutating operation re-serializes
//! the root view's primary fragment and replaces the target content wholesale;
//! there is no incremental text update.

use tracing::{debug, error};

use vellum_builder::{BuildContext, ProtoView, TemplateRegistry};
use vellum_core::{
    BuildError, NodeId, NodeTree, RenderError, TemplateCmd, TemplateId, VellumError,
};

use crate::markdown;
use crate::target::RenderTarget;
use crate::view::{ElementRef, FragmentRef, View, ViewRef};

/// Renders component views into markdown on a [`RenderTarget`].
pub struct MarkdownRenderer<T> {
    registry: TemplateRegistry,
    tree: NodeTree,
    views: Vec<View>,
    root_view: Option<ViewRef>,
    target: T,
}

impl<T: RenderTarget> MarkdownRenderer<T> {
    /// Create a renderer writing to `target`.
    pub fn new(target: T) -> Self {
        Self {
            registry: TemplateRegistry::new(),
            tree: NodeTree::new(),
            views: Vec::new(),
            root_view: None,
            target,
        }
    }

    /// The output target.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// The node arena backing this renderer's views.
    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// Look up a view by handle.
    pub fn view(&self, view: ViewRef) -> Option<&View> {
        self.views.get(view.0)
    }

    /// Number of views built so far.
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Wrap a compiled command list as a proto-view.
    pub fn create_proto_view(&self, commands: Vec<TemplateCmd>) -> ProtoView {
        ProtoView::new(commands)
    }

    /// Register a component template. Duplicate ids silently overwrite.
    pub fn register_component_template(&mut self, id: TemplateId, commands: Vec<TemplateCmd>) {
        self.registry.register(id, commands);
    }

    /// Build the root host view at the target location named by `selector`,
    /// then serialize immediately.
    ///
    /// Later mutations re-serialize this view's primary fragment. Fails with
    /// [`RenderError::SelectorNotMatched`] before building anything when the
    /// selector resolves to no location.
    pub fn create_root_host_view(
        &mut self,
        proto: &ProtoView,
        selector: &str,
    ) -> Result<(ViewRef, Vec<FragmentRef>), VellumError> {
        if !self.target.resolve(selector) {
            return Err(RenderError::SelectorNotMatched {
                selector: selector.to_string(),
            }
            .into());
        }
        let (view, fragments) = self.build_view(proto)?;
        self.root_view = Some(view);
        self.refresh();
        Ok((view, fragments))
    }

    /// Build a view for any proto-view, independent of the root.
    pub fn create_view(
        &mut self,
        proto: &ProtoView,
    ) -> Result<(ViewRef, Vec<FragmentRef>), VellumError> {
        Ok(self.build_view(proto)?)
    }

    fn build_view(
        &mut self,
        proto: &ProtoView,
    ) -> Result<(ViewRef, Vec<FragmentRef>), BuildError> {
        let output = {
            let mut ctx = BuildContext::new(&self.registry, &mut self.tree);
            ctx.build(proto.commands())?;
            ctx.into_output()
        };
        let view = View::new(output);
        let view_ref = ViewRef(self.views.len());
        let fragments = (0..view.fragment_count())
            .map(|fragment| FragmentRef {
                view: view_ref,
                fragment,
            })
            .collect();
        debug!(view = view_ref.0, "view built");
        self.views.push(view);
        Ok((view_ref, fragments))
    }

    /// Splice `fragment`'s roots into the tree right after the last node of
    /// `previous`. No-op when there is nothing to insert or the sibling is an
    /// unattached root.
    pub fn attach_fragment_after_fragment(
        &mut self,
        previous: FragmentRef,
        fragment: FragmentRef,
    ) -> Result<(), RenderError> {
        let previous_nodes = self.fragment_nodes(previous)?;
        let Some(&sibling) = previous_nodes.last() else {
            return Ok(());
        };
        self.attach_after(sibling, fragment)
    }

    /// Splice `fragment`'s roots into the tree right after a bound element.
    /// No-op when there is nothing to insert or the element is an unattached
    /// root.
    pub fn attach_fragment_after_element(
        &mut self,
        location: ElementRef,
        fragment: FragmentRef,
    ) -> Result<(), RenderError> {
        let sibling = self.bound_element(location)?;
        self.attach_after(sibling, fragment)
    }

    fn attach_after(&mut self, sibling: NodeId, fragment: FragmentRef) -> Result<(), RenderError> {
        let nodes = self.fragment_nodes(fragment)?;
        if self.tree.insert_all_after(sibling, &nodes) {
            self.refresh();
        }
        Ok(())
    }

    /// Remove every node of `fragment` from its parent.
    pub fn detach_fragment(&mut self, fragment: FragmentRef) -> Result<(), RenderError> {
        let nodes = self.fragment_nodes(fragment)?;
        for node in nodes {
            self.tree.detach(node);
        }
        self.refresh();
        Ok(())
    }

    /// Replace the value of the bound text node at `index`.
    pub fn set_text(
        &mut self,
        view: ViewRef,
        index: usize,
        text: &str,
    ) -> Result<(), RenderError> {
        let node = self
            .view_by_ref(view)?
            .bound_text_node(index)
            .ok_or(RenderError::BoundIndexOutOfRange { kind: "text", index })?;
        self.tree.set_text(node, text);
        self.refresh();
        Ok(())
    }

    /// Set a property on a bound element. Properties and attributes share one
    /// mapping in this output target.
    pub fn set_element_property(
        &mut self,
        location: ElementRef,
        name: &str,
        value: &str,
    ) -> Result<(), RenderError> {
        self.set_bound_attribute(location, name, value)
    }

    /// Set an attribute on a bound element.
    pub fn set_element_attribute(
        &mut self,
        location: ElementRef,
        name: &str,
        value: &str,
    ) -> Result<(), RenderError> {
        self.set_bound_attribute(location, name, value)
    }

    fn set_bound_attribute(
        &mut self,
        location: ElementRef,
        name: &str,
        value: &str,
    ) -> Result<(), RenderError> {
        let node = self.bound_element(location)?;
        self.tree.set_attribute(node, name, value);
        self.refresh();
        Ok(())
    }

    /// Mark a view hydrated. No structural effect.
    pub fn hydrate_view(&mut self, view: ViewRef) -> Result<(), RenderError> {
        self.view_mut(view)?.set_hydrated(true);
        Ok(())
    }

    /// Mark a view dehydrated. No structural effect.
    pub fn dehydrate_view(&mut self, view: ViewRef) -> Result<(), RenderError> {
        self.view_mut(view)?.set_hydrated(false);
        Ok(())
    }

    /// The node behind a bound element location. The arena id is the native
    /// representation in this output target.
    pub fn get_native_node(&self, location: ElementRef) -> Option<NodeId> {
        self.views
            .get(location.view.0)
            .and_then(|view| view.bound_element_node(location.index))
    }

    /// Event dispatch is wired outside the renderer; nothing to do here.
    pub fn set_event_dispatcher(&mut self, _view: ViewRef) {}

    /// Not implemented.
    pub fn destroy_view(&mut self, _view: ViewRef) -> Result<(), RenderError> {
        error!("destroy_view is not supported");
        Err(RenderError::Unsupported {
            operation: "destroy_view",
        })
    }

    /// Not implemented.
    pub fn set_element_class(
        &mut self,
        _location: ElementRef,
        _class: &str,
        _add: bool,
    ) -> Result<(), RenderError> {
        error!("set_element_class is not supported");
        Err(RenderError::Unsupported {
            operation: "set_element_class",
        })
    }

    /// Not implemented.
    pub fn set_element_style(
        &mut self,
        _location: ElementRef,
        _name: &str,
        _value: &str,
    ) -> Result<(), RenderError> {
        error!("set_element_style is not supported");
        Err(RenderError::Unsupported {
            operation: "set_element_style",
        })
    }

    /// Not implemented.
    pub fn invoke_element_method(
        &mut self,
        _location: ElementRef,
        _method: &str,
        _args: &[String],
    ) -> Result<(), RenderError> {
        error!("invoke_element_method is not supported");
        Err(RenderError::Unsupported {
            operation: "invoke_element_method",
        })
    }

    /// Serialize the root view's primary fragment into the target. No-op
    /// until a root host view exists.
    fn refresh(&mut self) {
        let Some(root) = self.root_view else {
            return;
        };
        let Some(view) = self.views.get(root.0) else {
            return;
        };
        let Some(nodes) = view.fragment(0) else {
            return;
        };
        let output = markdown::render_nodes(&self.tree, nodes);
        self.target.write(&output);
    }

    fn view_by_ref(&self, view: ViewRef) -> Result<&View, RenderError> {
        self.views
            .get(view.0)
            .ok_or(RenderError::UnknownView { index: view.0 })
    }

    fn view_mut(&mut self, view: ViewRef) -> Result<&mut View, RenderError> {
        self.views
            .get_mut(view.0)
            .ok_or(RenderError::UnknownView { index: view.0 })
    }

    fn bound_element(&self, location: ElementRef) -> Result<NodeId, RenderError> {
        self.view_by_ref(location.view)?
            .bound_element_node(location.index)
            .ok_or(RenderError::BoundIndexOutOfRange {
                kind: "element",
                index: location.index,
            })
    }

    fn fragment_nodes(&self, fragment: FragmentRef) -> Result<Vec<NodeId>, RenderError> {
        let view = self.view_by_ref(fragment.view)?;
        Ok(view
            .fragment(fragment.fragment)
            .map(|nodes| nodes.to_vec())
            .unwrap_or_default())
    }
}
