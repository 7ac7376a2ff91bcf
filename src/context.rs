//! Capability bundles and the per-section scope that carries them.
//!
//! Two bundles exist. [`EditCapabilities`] is injected into every composite node of a
//! section (preview flag plus edit and add callbacks). [`SectionContext`] is the ambient
//! value for one top-level section inside the reorder region: its drag handle, its
//! resolved id and a delete callback already bound to that id. Descendants read the
//! context through [`ScopedSection::walk`]; nothing outside the scope can reach it.

use crate::node::Node;
use crate::store::Action;
use crate::traversal::{extract_id, inject_props};
use std::fmt;
use std::sync::{mpsc, Arc};

#[derive(Clone)]
/// Fire-and-forget entry point into the section store.
pub struct Dispatcher(Arc<dyn Fn(Action) + Send + Sync>);

impl Dispatcher {
    #[must_use]
    /// Wraps a callback that receives every dispatched action.
    pub fn new(f: impl Fn(Action) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[must_use]
    /// Forwards actions into a channel; a closed receiver drops them.
    pub fn from_sender(sender: mpsc::Sender<Action>) -> Self {
        Self::new(move |action| {
            if sender.send(action).is_err() {
                tracing::debug!("action receiver closed; dropping action");
            }
        })
    }

    /// Sends `action` without waiting for it to be applied.
    pub fn dispatch(&self, action: Action) {
        (self.0)(action);
    }
}

impl PartialEq for Dispatcher {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Dispatcher")
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Bundle injected into composite nodes.
pub struct EditCapabilities {
    is_preview: bool,
    dispatcher: Dispatcher,
}

impl EditCapabilities {
    #[must_use]
    /// Creates the bundle for one render pass.
    pub fn new(is_preview: bool, dispatcher: Dispatcher) -> Self {
        Self {
            is_preview,
            dispatcher,
        }
    }

    #[must_use]
    /// Whether the surface is a read-only preview.
    pub fn is_preview(&self) -> bool {
        self.is_preview
    }

    /// Commits `text` as the new content of section `id`. Inert in preview.
    pub fn on_edit_section(&self, id: &str, text: &str) {
        if self.is_preview {
            return;
        }
        self.dispatcher.dispatch(Action::CommitText {
            id: id.to_string(),
            text: text.to_string(),
        });
    }

    /// Requests a new section after `id`. Inert in preview.
    pub fn on_add_section(&self, id: &str) {
        if self.is_preview {
            return;
        }
        self.dispatcher.dispatch(Action::AddAfter { id: id.to_string() });
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Grip of one element inside the reorder region.
pub struct DragHandle {
    /// Position of the element when the region was laid out.
    pub index: usize,
}

#[derive(Clone, Debug, PartialEq)]
/// Ambient value shared with every descendant of one top-level section.
pub struct SectionContext {
    drag_handle: DragHandle,
    id: Option<String>,
    dispatcher: Dispatcher,
}

impl SectionContext {
    #[must_use]
    /// Drag grip for this section.
    pub fn drag_handle(&self) -> DragHandle {
        self.drag_handle
    }

    #[must_use]
    /// Resolved addressable id.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Deletes the section this context was resolved for.
    ///
    /// Does nothing when no id could be resolved.
    pub fn on_delete(&self) {
        match &self.id {
            Some(id) => self.dispatcher.dispatch(Action::Delete { id: id.clone() }),
            None => tracing::warn!(
                index = self.drag_handle.index,
                "delete requested for a section without an id"
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// A top-level section wrapped for rendering inside the reorder region.
pub struct ScopedSection {
    context: SectionContext,
    node: Node,
}

impl ScopedSection {
    #[must_use]
    /// The ambient context of this section.
    pub fn context(&self) -> &SectionContext {
        &self.context
    }

    #[must_use]
    /// The section after capability injection.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Visits every node of the section in pre-order with its depth and the ambient
    /// context.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&Node, usize, &SectionContext),
    {
        fn go<F>(node: &Node, depth: usize, context: &SectionContext, visit: &mut F)
        where
            F: FnMut(&Node, usize, &SectionContext),
        {
            visit(node, depth, context);
            for child in node.children() {
                go(child, depth + 1, context, visit);
            }
        }

        go(&self.node, 0, &self.context, &mut visit);
    }
}

#[must_use]
/// Wraps one top-level node with its scoped context and injects `capabilities` into its
/// subtree.
///
/// The id is taken from the node itself or its descendants; `fallback_id` is used only
/// when none is found, and an empty fallback leaves the section without an id.
pub fn scope_section(
    node: &Node,
    fallback_id: &str,
    drag_handle: DragHandle,
    capabilities: &EditCapabilities,
    dispatcher: &Dispatcher,
) -> ScopedSection {
    let id = extract_id(node)
        .or_else(|| Some(fallback_id).filter(|id| !id.is_empty()))
        .map(str::to_string);
    ScopedSection {
        context: SectionContext {
            drag_handle,
            id,
            dispatcher: dispatcher.clone(),
        },
        node: inject_props(node, capabilities),
    }
}

#[cfg(test)]
#[path = "tests/context.rs"]
mod tests;
