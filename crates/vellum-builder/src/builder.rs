//! The command-stream interpreter and the deferred-build orchestrator.
//!
//! A [`ViewBuilder`] interprets one command list into nodes. Opening a
//! component creates its node synchronously but defers its own template to a
//! new builder on the [`BuildContext`] queue: the component's projected
//! children must be attached to the host node before a content-slot command
//! inside its template can look them up. The queue is drained FIFO within one
//! `build` call; no concurrency is involved.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, error};

use vellum_core::{decode_attributes, BuildError, NodeId, NodeTree, TemplateCmd, TemplateId};

use crate::registry::TemplateRegistry;

/// The lists a finished build hands to the view layer.
#[derive(Debug, Default)]
pub struct BuildOutput {
    /// Fragment root lists, one per top-level interpreter pass.
    pub fragments: Vec<Vec<NodeId>>,
    /// Bound text nodes, addressable by their stable index.
    pub bound_text_nodes: Vec<NodeId>,
    /// Bound element, component, and anchor nodes, addressable by their
    /// stable index.
    pub bound_element_nodes: Vec<NodeId>,
}

/// Shared state of one view build: the arena under construction, the flat
/// bound-node index spaces, the fragment list, and the queue of builders
/// still to run.
pub struct BuildContext<'a> {
    registry: &'a TemplateRegistry,
    tree: &'a mut NodeTree,
    fragments: Vec<Vec<NodeId>>,
    bound_text_nodes: Vec<NodeId>,
    bound_element_nodes: Vec<NodeId>,
    components_count: usize,
    queue: VecDeque<ViewBuilder>,
}

impl<'a> BuildContext<'a> {
    /// Create a context building into `tree`.
    pub fn new(registry: &'a TemplateRegistry, tree: &'a mut NodeTree) -> Self {
        Self {
            registry,
            tree,
            fragments: Vec::new(),
            bound_text_nodes: Vec::new(),
            bound_element_nodes: Vec::new(),
            components_count: 0,
            queue: VecDeque::new(),
        }
    }

    /// Interpret a top-level command list, then expand every queued component
    /// template until no builder remains.
    pub fn build(&mut self, commands: Arc<[TemplateCmd]>) -> Result<(), BuildError> {
        debug!(commands = commands.len(), "building view");
        let fragment = self.fragments.len();
        self.fragments.push(Vec::new());
        ViewBuilder::for_fragment(commands, fragment).run(self)?;
        while let Some(builder) = self.queue.pop_front() {
            builder.run(self)?;
        }
        Ok(())
    }

    /// The finished fragment and bound-node lists.
    pub fn into_output(self) -> BuildOutput {
        BuildOutput {
            fragments: self.fragments,
            bound_text_nodes: self.bound_text_nodes,
            bound_element_nodes: self.bound_element_nodes,
        }
    }

    fn enqueue(&mut self, builder: ViewBuilder) {
        self.queue.push_back(builder);
    }
}

/// Interprets one command list into a subtree.
///
/// The open-node stack top is the current insertion parent. An empty stack in
/// a top-level build means new nodes become fragment roots; a component
/// builder starts with its component on the stack instead.
struct ViewBuilder {
    commands: Arc<[TemplateCmd]>,
    stack: Vec<NodeId>,
    /// The component whose own template this builder interprets; None for a
    /// top-level build.
    building_for: Option<NodeId>,
    /// Index of this builder's fragment root list; None for component builds.
    fragment: Option<usize>,
}

impl ViewBuilder {
    fn for_fragment(commands: Arc<[TemplateCmd]>, fragment: usize) -> Self {
        Self {
            commands,
            stack: Vec::new(),
            building_for: None,
            fragment: Some(fragment),
        }
    }

    fn for_component(commands: Arc<[TemplateCmd]>, component: NodeId) -> Self {
        Self {
            commands,
            stack: vec![component],
            building_for: Some(component),
            fragment: None,
        }
    }

    fn run(mut self, ctx: &mut BuildContext<'_>) -> Result<(), BuildError> {
        let commands = Arc::clone(&self.commands);
        for cmd in commands.iter() {
            self.apply(cmd, ctx)?;
        }
        Ok(())
    }

    fn apply(&mut self, cmd: &TemplateCmd, ctx: &mut BuildContext<'_>) -> Result<(), BuildError> {
        match cmd {
            TemplateCmd::Text { value, bound, slot } => {
                self.visit_text(ctx, value, *bound, *slot);
                Ok(())
            }
            TemplateCmd::ContentSlot { index, slot } => {
                self.visit_content_slot(ctx, *index, *slot);
                Ok(())
            }
            TemplateCmd::BeginElement {
                tag,
                attributes,
                bound,
                slot,
            } => {
                self.visit_begin_element(ctx, tag, attributes, *bound, *slot);
                Ok(())
            }
            TemplateCmd::BeginComponent {
                tag,
                attributes,
                bound,
                slot,
                template_id,
            } => self.visit_begin_component(ctx, tag, attributes, *bound, *slot, *template_id),
            TemplateCmd::EndElement | TemplateCmd::EndComponent => {
                self.stack.pop();
                Ok(())
            }
            TemplateCmd::EmbeddedTemplate { merged, slot } => {
                self.visit_embedded_template(ctx, *merged, *slot);
                Ok(())
            }
        }
    }

    fn visit_text(
        &mut self,
        ctx: &mut BuildContext<'_>,
        value: &str,
        bound: bool,
        slot: Option<usize>,
    ) {
        let node = ctx.tree.create_text(value, bound);
        self.attach(ctx, node, slot);
        if bound {
            ctx.bound_text_nodes.push(node);
        }
    }

    fn visit_content_slot(&mut self, ctx: &mut BuildContext<'_>, index: usize, slot: Option<usize>) {
        let Some(host) = self.building_for else {
            return;
        };
        if ctx.tree.is_root_component(host) {
            error!("content projection into the root component is not supported");
            return;
        }
        // The bucket is done growing by the time this template runs; detach
        // the list from the tree borrow before re-parenting.
        let projected: Vec<NodeId> = ctx.tree.project(host, index).to_vec();
        for node in projected {
            self.attach(ctx, node, slot);
        }
    }

    fn visit_begin_element(
        &mut self,
        ctx: &mut BuildContext<'_>,
        tag: &str,
        attributes: &[String],
        bound: bool,
        slot: Option<usize>,
    ) {
        let attributes = decode_attributes(attributes);
        let node = ctx.tree.create_element(tag, bound, attributes);
        self.attach(ctx, node, slot);
        self.stack.push(node);
        if bound {
            ctx.bound_element_nodes.push(node);
        }
    }

    fn visit_begin_component(
        &mut self,
        ctx: &mut BuildContext<'_>,
        tag: &str,
        attributes: &[String],
        bound: bool,
        slot: Option<usize>,
        template_id: TemplateId,
    ) -> Result<(), BuildError> {
        let attributes = decode_attributes(attributes);
        let root = ctx.components_count == 0;
        let node = ctx.tree.create_component(tag, bound, attributes, root);
        self.attach(ctx, node, slot);
        self.stack.push(node);
        if bound {
            ctx.bound_element_nodes.push(node);
        }
        ctx.components_count += 1;
        // The component's own template runs deferred, once its projected
        // children have all been routed into the node created above.
        let commands = ctx.registry.resolve(template_id)?;
        ctx.enqueue(ViewBuilder::for_component(commands, node));
        Ok(())
    }

    fn visit_embedded_template(
        &mut self,
        ctx: &mut BuildContext<'_>,
        merged: bool,
        slot: Option<usize>,
    ) {
        let node = ctx.tree.create_anchor();
        self.attach(ctx, node, slot);
        // Anchors are always addressable: later dynamic attachment targets
        // them by bound-element index.
        ctx.bound_element_nodes.push(node);
        if merged {
            error!("merged embedded templates are not supported");
        }
    }

    /// Attach `node` at the current insertion point: into the open parent's
    /// projection bucket when a destination slot is present and the parent is
    /// a component, as a direct child otherwise, or as a fragment root when
    /// the stack is empty.
    fn attach(&mut self, ctx: &mut BuildContext<'_>, node: NodeId, slot: Option<usize>) {
        if let Some(&parent) = self.stack.last() {
            if let Some(slot) = slot {
                if ctx.tree.is_component(parent) {
                    ctx.tree.add_content_node(parent, slot, node);
                    return;
                }
            }
            ctx.tree.append_child(parent, node);
        } else if let Some(fragment) = self.fragment {
            if let Some(roots) = ctx.fragments.get_mut(fragment) {
                roots.push(node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_core::NodeKind;

    fn text(value: &str) -> TemplateCmd {
        TemplateCmd::Text {
            value: value.to_string(),
            bound: false,
            slot: None,
        }
    }

    fn bound_text(value: &str) -> TemplateCmd {
        TemplateCmd::Text {
            value: value.to_string(),
            bound: true,
            slot: None,
        }
    }

    fn slotted_text(value: &str, slot: usize) -> TemplateCmd {
        TemplateCmd::Text {
            value: value.to_string(),
            bound: false,
            slot: Some(slot),
        }
    }

    fn begin_element(tag: &str) -> TemplateCmd {
        TemplateCmd::BeginElement {
            tag: tag.to_string(),
            attributes: Vec::new(),
            bound: false,
            slot: None,
        }
    }

    fn begin_component(tag: &str, template: u32) -> TemplateCmd {
        TemplateCmd::BeginComponent {
            tag: tag.to_string(),
            attributes: Vec::new(),
            bound: false,
            slot: None,
            template_id: TemplateId(template),
        }
    }

    fn build(
        registry: &TemplateRegistry,
        tree: &mut NodeTree,
        commands: Vec<TemplateCmd>,
    ) -> Result<BuildOutput, BuildError> {
        let mut ctx = BuildContext::new(registry, tree);
        ctx.build(commands.into())?;
        Ok(ctx.into_output())
    }

    fn text_value(tree: &NodeTree, id: NodeId) -> String {
        match &tree.get(id).unwrap().kind {
            NodeKind::Text { value, .. } => value.clone(),
            other => panic!("expected text node, got {other:?}"),
        }
    }

    #[test]
    fn test_flat_element_stream() {
        let registry = TemplateRegistry::new();
        let mut tree = NodeTree::new();
        let output = build(
            &registry,
            &mut tree,
            vec![begin_element("bold"), text("hi"), TemplateCmd::EndElement],
        )
        .unwrap();

        assert_eq!(output.fragments.len(), 1);
        let roots = &output.fragments[0];
        assert_eq!(roots.len(), 1);
        let children = tree.children(roots[0]);
        assert_eq!(children.len(), 1);
        assert_eq!(text_value(&tree, children[0]), "hi");
    }

    #[test]
    fn test_stack_unwinds_to_fragment_roots() {
        // After a balanced begin/end pair, following nodes are fragment
        // roots again, not children of the closed element.
        let registry = TemplateRegistry::new();
        let mut tree = NodeTree::new();
        let output = build(
            &registry,
            &mut tree,
            vec![begin_element("bold"), TemplateCmd::EndElement, text("tail")],
        )
        .unwrap();

        let roots = &output.fragments[0];
        assert_eq!(roots.len(), 2);
        assert!(tree.children(roots[0]).is_empty());
        assert_eq!(text_value(&tree, roots[1]), "tail");
        assert_eq!(tree.parent(roots[1]), None);
    }

    #[test]
    fn test_bound_node_index_order() {
        let registry = TemplateRegistry::new();
        let mut tree = NodeTree::new();
        let output = build(
            &registry,
            &mut tree,
            vec![
                TemplateCmd::BeginElement {
                    tag: "bold".to_string(),
                    attributes: Vec::new(),
                    bound: true,
                    slot: None,
                },
                bound_text("first"),
                bound_text("second"),
                TemplateCmd::EndElement,
            ],
        )
        .unwrap();

        assert_eq!(output.bound_element_nodes.len(), 1);
        assert_eq!(output.bound_text_nodes.len(), 2);
        assert_eq!(text_value(&tree, output.bound_text_nodes[0]), "first");
        assert_eq!(text_value(&tree, output.bound_text_nodes[1]), "second");
    }

    #[test]
    fn test_unbound_nodes_not_registered() {
        let registry = TemplateRegistry::new();
        let mut tree = NodeTree::new();
        let output = build(
            &registry,
            &mut tree,
            vec![begin_element("bold"), text("plain"), TemplateCmd::EndElement],
        )
        .unwrap();

        assert!(output.bound_text_nodes.is_empty());
        assert!(output.bound_element_nodes.is_empty());
    }

    #[test]
    fn test_element_attributes_decoded() {
        let registry = TemplateRegistry::new();
        let mut tree = NodeTree::new();
        let output = build(
            &registry,
            &mut tree,
            vec![
                TemplateCmd::BeginElement {
                    tag: "md-link".to_string(),
                    attributes: vec!["url".to_string(), "http://x".to_string()],
                    bound: false,
                    slot: None,
                },
                TemplateCmd::EndElement,
            ],
        )
        .unwrap();

        let link = output.fragments[0][0];
        assert_eq!(tree.attribute(link, "url"), Some("http://x"));
    }

    #[test]
    fn test_component_projection() {
        let mut registry = TemplateRegistry::new();
        // The root component's template instantiates a card and routes one
        // text child into the card's slot 0.
        registry.register(
            TemplateId(1),
            vec![
                begin_component("card", 2),
                slotted_text("mid", 0),
                TemplateCmd::EndComponent,
            ],
        );
        registry.register(
            TemplateId(2),
            vec![
                text("("),
                TemplateCmd::ContentSlot {
                    index: 0,
                    slot: None,
                },
                text(")"),
            ],
        );

        let mut tree = NodeTree::new();
        let output = build(
            &registry,
            &mut tree,
            vec![begin_component("app", 1), TemplateCmd::EndComponent],
        )
        .unwrap();

        let app = output.fragments[0][0];
        assert!(tree.is_root_component(app));
        let app_children = tree.children(app);
        assert_eq!(app_children.len(), 1);

        let card = app_children[0];
        assert!(tree.is_component(card));
        assert!(!tree.is_root_component(card));
        let card_children: Vec<String> = tree
            .children(card)
            .iter()
            .map(|&id| text_value(&tree, id))
            .collect();
        assert_eq!(card_children, vec!["(", "mid", ")"]);
        // The projected node is now a real child of the card.
        assert_eq!(tree.parent(tree.children(card)[1]), Some(card));
    }

    #[test]
    fn test_projection_order_preserved() {
        let mut registry = TemplateRegistry::new();
        registry.register(
            TemplateId(1),
            vec![
                begin_component("card", 2),
                slotted_text("a", 0),
                slotted_text("b", 0),
                TemplateCmd::EndComponent,
            ],
        );
        registry.register(
            TemplateId(2),
            vec![TemplateCmd::ContentSlot {
                index: 0,
                slot: None,
            }],
        );

        let mut tree = NodeTree::new();
        let output = build(
            &registry,
            &mut tree,
            vec![begin_component("app", 1), TemplateCmd::EndComponent],
        )
        .unwrap();

        let app = output.fragments[0][0];
        let card = tree.children(app)[0];
        let values: Vec<String> = tree
            .children(card)
            .iter()
            .map(|&id| text_value(&tree, id))
            .collect();
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_projection_slot() {
        let mut registry = TemplateRegistry::new();
        registry.register(
            TemplateId(1),
            vec![begin_component("card", 2), TemplateCmd::EndComponent],
        );
        // Slot 5 never receives content; the lookup must come back empty
        // rather than failing.
        registry.register(
            TemplateId(2),
            vec![
                TemplateCmd::ContentSlot {
                    index: 5,
                    slot: None,
                },
                text("after"),
            ],
        );

        let mut tree = NodeTree::new();
        let output = build(
            &registry,
            &mut tree,
            vec![begin_component("app", 1), TemplateCmd::EndComponent],
        )
        .unwrap();

        let app = output.fragments[0][0];
        let card = tree.children(app)[0];
        let children = tree.children(card);
        assert_eq!(children.len(), 1);
        assert_eq!(text_value(&tree, children[0]), "after");
    }

    #[test]
    fn test_root_component_content_slot_skipped() {
        let mut registry = TemplateRegistry::new();
        registry.register(
            TemplateId(1),
            vec![TemplateCmd::ContentSlot {
                index: 0,
                slot: None,
            }],
        );

        let mut tree = NodeTree::new();
        let output = build(
            &registry,
            &mut tree,
            vec![
                begin_component("app", 1),
                slotted_text("lost", 0),
                TemplateCmd::EndComponent,
            ],
        )
        .unwrap();

        // The root component cannot project; the diagnostic replaces the
        // effect and the build carries on.
        let app = output.fragments[0][0];
        assert!(tree.children(app).is_empty());
    }

    #[test]
    fn test_unknown_template_aborts_build() {
        let registry = TemplateRegistry::new();
        let mut tree = NodeTree::new();
        let err = build(
            &registry,
            &mut tree,
            vec![begin_component("app", 42), TemplateCmd::EndComponent],
        )
        .unwrap_err();

        assert_eq!(
            err,
            BuildError::UnknownTemplate {
                id: TemplateId(42)
            }
        );
    }

    #[test]
    fn test_embedded_template_anchor_is_bound() {
        let registry = TemplateRegistry::new();
        let mut tree = NodeTree::new();
        let output = build(
            &registry,
            &mut tree,
            vec![
                begin_element("container"),
                TemplateCmd::EmbeddedTemplate {
                    merged: false,
                    slot: None,
                },
                TemplateCmd::EndElement,
            ],
        )
        .unwrap();

        assert_eq!(output.bound_element_nodes.len(), 1);
        let anchor = output.bound_element_nodes[0];
        let container = output.fragments[0][0];
        assert_eq!(tree.children(container), &[anchor]);
        assert!(matches!(
            tree.get(anchor).unwrap().kind,
            NodeKind::Anchor
        ));
    }

    #[test]
    fn test_merged_embedded_template_still_builds() {
        let registry = TemplateRegistry::new();
        let mut tree = NodeTree::new();
        let output = build(
            &registry,
            &mut tree,
            vec![
                TemplateCmd::EmbeddedTemplate {
                    merged: true,
                    slot: None,
                },
                text("tail"),
            ],
        )
        .unwrap();

        // The merged variant is diagnosed but does not abort the build.
        assert_eq!(output.fragments[0].len(), 2);
    }

    #[test]
    fn test_nested_components_expand_level_order() {
        let mut registry = TemplateRegistry::new();
        registry.register(
            TemplateId(1),
            vec![
                begin_component("inner", 2),
                TemplateCmd::EndComponent,
                text("outer-tail"),
            ],
        );
        registry.register(TemplateId(2), vec![text("deep")]);

        let mut tree = NodeTree::new();
        let output = build(
            &registry,
            &mut tree,
            vec![begin_component("outer", 1), TemplateCmd::EndComponent],
        )
        .unwrap();

        let outer = output.fragments[0][0];
        let outer_children = tree.children(outer);
        assert_eq!(outer_children.len(), 2);
        let inner = outer_children[0];
        assert_eq!(text_value(&tree, outer_children[1]), "outer-tail");
        let inner_children = tree.children(inner);
        assert_eq!(inner_children.len(), 1);
        assert_eq!(text_value(&tree, inner_children[0]), "deep");
    }
}
