//! Lays the top-level list out as lines of text.
//!
//! Without reordering, each section is injected with the edit capabilities and flattened
//! in document order. With reordering, each section is first wrapped by
//! [`scope_section`] so its lines know their drag handle and resolved id, and the
//! [`ReorderRegion`] drives keyboard "dragging" whose final order goes to the store
//! verbatim. Every layout ends with a best-effort typesetting pass.

use crate::context::{
    scope_section, DragHandle, Dispatcher, EditCapabilities, ScopedSection, SectionContext,
};
use crate::node::{Node, TEXT_TAG};
use crate::traversal::{contains_id, find_by_id, inject_props};
use crate::typeset::Typesetter;

/// Marker drawn before the first line of a draggable section.
pub const GRIP: &str = "⠿ ";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Switches for one renderer.
pub struct RenderOptions {
    /// Lay sections out inside the reorder region.
    pub reorder_enabled: bool,
    /// Render read-only; injected edit callbacks become inert.
    pub is_preview: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// One visible line.
pub struct RenderedLine {
    /// Nesting depth counted in labelled ancestors.
    pub indent: usize,
    /// Display text.
    pub text: String,
    /// Nearest addressable section at or above the line's node.
    pub section_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
/// A top-level section after layout.
pub struct RenderedBlock {
    /// The section with capabilities injected.
    pub node: Node,
    /// Scoped context, present inside the reorder region.
    pub context: Option<SectionContext>,
    /// The section's lines.
    pub lines: Vec<RenderedLine>,
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Result of one layout pass.
pub struct Layout {
    /// Blocks in document order.
    pub blocks: Vec<RenderedBlock>,
}

impl Layout {
    #[must_use]
    /// All lines, top to bottom.
    pub fn lines(&self) -> impl Iterator<Item = &RenderedLine> {
        self.blocks.iter().flat_map(|block| block.lines.iter())
    }

    #[must_use]
    /// Block whose section contains `id`.
    pub fn block_for(&self, id: &str) -> Option<&RenderedBlock> {
        self.blocks
            .iter()
            .find(|block| contains_id(&block.node, id))
    }

    #[must_use]
    /// Rendered node carrying `id`.
    pub fn node_for(&self, id: &str) -> Option<&Node> {
        self.blocks
            .iter()
            .find_map(|block| find_by_id(&block.node, id))
    }
}

fn label(node: &Node) -> Option<String> {
    if node.tag() == TEXT_TAG {
        return node.prop_str("text").map(str::to_string);
    }
    if let Some(title) = node.prop_str("title") {
        return Some(title.to_string());
    }
    if let Some(placeholder) = node.prop_str("placeholder") {
        return Some(format!("[{placeholder}]"));
    }
    node.id().map(|id| format!("§ {id}"))
}

/// Accumulates lines from a pre-order walk.
#[derive(Default)]
struct LineBuilder {
    ancestry: Vec<(Option<String>, bool)>,
    lines: Vec<RenderedLine>,
}

impl LineBuilder {
    fn visit(&mut self, node: &Node, depth: usize) {
        self.ancestry.truncate(depth);
        let text = label(node);
        self.ancestry
            .push((node.id().map(str::to_string), text.is_some()));

        if let Some(text) = text {
            let indent = self.ancestry[..depth]
                .iter()
                .filter(|(_, labelled)| *labelled)
                .count();
            let section_id = self
                .ancestry
                .iter()
                .rev()
                .find_map(|(id, _)| id.clone());
            self.lines.push(RenderedLine {
                indent,
                text,
                section_id,
            });
        }
    }

    fn walk(&mut self, node: &Node, depth: usize) {
        self.visit(node, depth);
        for child in node.children() {
            self.walk(child, depth + 1);
        }
    }
}

/// Turns the top-level list into a [`Layout`].
pub struct Renderer {
    options: RenderOptions,
    dispatcher: Dispatcher,
    typesetter: Option<Box<dyn Typesetter>>,
}

impl Renderer {
    #[must_use]
    /// Renderer whose injected callbacks dispatch through `dispatcher`.
    pub fn new(options: RenderOptions, dispatcher: Dispatcher) -> Self {
        Self {
            options,
            dispatcher,
            typesetter: None,
        }
    }

    #[must_use]
    /// Runs `typesetter` after every layout.
    pub fn with_typesetter(mut self, typesetter: impl Typesetter + 'static) -> Self {
        self.typesetter = Some(Box::new(typesetter));
        self
    }

    #[must_use]
    /// Current switches.
    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Lays out `sections`.
    pub fn layout(&mut self, sections: &[Node]) -> Layout {
        let capabilities = EditCapabilities::new(self.options.is_preview, self.dispatcher.clone());
        let blocks = sections
            .iter()
            .enumerate()
            .map(|(index, node)| {
                if self.options.reorder_enabled {
                    let scoped = scope_section(
                        node,
                        &format!("section-{index}"),
                        DragHandle { index },
                        &capabilities,
                        &self.dispatcher,
                    );
                    Self::scoped_block(&scoped)
                } else {
                    let node = inject_props(node, &capabilities);
                    let mut builder = LineBuilder::default();
                    builder.walk(&node, 0);
                    RenderedBlock {
                        node,
                        context: None,
                        lines: builder.lines,
                    }
                }
            })
            .collect();

        let mut layout = Layout { blocks };
        self.typeset(&mut layout);
        layout
    }

    fn scoped_block(scoped: &ScopedSection) -> RenderedBlock {
        let mut builder = LineBuilder::default();
        scoped.walk(|node, depth, _| builder.visit(node, depth));

        let context = scoped.context();
        match builder.lines.first_mut() {
            Some(first) => first.text.insert_str(0, GRIP),
            None => builder.lines.push(RenderedLine {
                indent: 0,
                text: GRIP.trim_end().to_string(),
                section_id: context.id().map(str::to_string),
            }),
        }

        RenderedBlock {
            node: scoped.node().clone(),
            context: Some(context.clone()),
            lines: builder.lines,
        }
    }

    fn typeset(&mut self, layout: &mut Layout) {
        let Some(typesetter) = self.typesetter.as_mut() else {
            return;
        };
        let mut texts: Vec<String> = layout.lines().map(|line| line.text.clone()).collect();
        if typesetter.typeset(&mut texts).is_err() {
            return;
        }
        let lines = layout
            .blocks
            .iter_mut()
            .flat_map(|block| block.lines.iter_mut());
        for (line, text) in lines.zip(texts) {
            line.text = text;
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Keyboard-driven drag of one top-level section.
///
/// The region works on its own copy of the list; nothing reaches the store until
/// [`ReorderRegion::finish`] hands back the new order.
pub struct ReorderRegion {
    order: Vec<Node>,
    grabbed: usize,
    moved: bool,
}

impl ReorderRegion {
    #[must_use]
    /// Grabs the section at `index`, or `None` when out of range.
    pub fn grab(sections: &[Node], index: usize) -> Option<Self> {
        (index < sections.len()).then(|| Self {
            order: sections.to_vec(),
            grabbed: index,
            moved: false,
        })
    }

    #[must_use]
    /// Current position of the grabbed section.
    pub fn grabbed(&self) -> usize {
        self.grabbed
    }

    #[must_use]
    /// Whether any move has happened since grabbing.
    pub fn is_moved(&self) -> bool {
        self.moved
    }

    #[must_use]
    /// The order as it currently stands.
    pub fn order(&self) -> &[Node] {
        &self.order
    }

    /// Moves the grabbed section up by one position.
    pub fn move_up(&mut self) -> bool {
        if self.grabbed == 0 {
            return false;
        }
        self.order.swap(self.grabbed, self.grabbed - 1);
        self.grabbed -= 1;
        self.moved = true;
        true
    }

    /// Moves the grabbed section down by one position.
    pub fn move_down(&mut self) -> bool {
        if self.grabbed + 1 >= self.order.len() {
            return false;
        }
        self.order.swap(self.grabbed, self.grabbed + 1);
        self.grabbed += 1;
        self.moved = true;
        true
    }

    /// Moves the grabbed section to the top.
    pub fn move_to_top(&mut self) -> bool {
        if self.grabbed == 0 {
            return false;
        }
        let node = self.order.remove(self.grabbed);
        self.order.insert(0, node);
        self.grabbed = 0;
        self.moved = true;
        true
    }

    /// Moves the grabbed section to the bottom.
    pub fn move_to_bottom(&mut self) -> bool {
        let last = self.order.len() - 1;
        if self.grabbed >= last {
            return false;
        }
        let node = self.order.remove(self.grabbed);
        self.order.push(node);
        self.grabbed = last;
        self.moved = true;
        true
    }

    #[must_use]
    /// Drops the grab and returns the new order.
    pub fn finish(self) -> Vec<Node> {
        self.order
    }
}

#[cfg(test)]
#[path = "tests/render.rs"]
mod tests;
