//! Recursive algorithms over section trees.
//!
//! Every function here is pure: inputs are borrowed and any changed tree is returned as a
//! new value. Replacement rebuilds the path from the root to the target; nodes off that
//! path are cloned as they were.

use crate::context::EditCapabilities;
use crate::node::Node;

#[must_use]
/// Whether `node` or any of its descendants carries `target_id`.
pub fn contains_id(node: &Node, target_id: &str) -> bool {
    node.id() == Some(target_id)
        || node
            .children()
            .iter()
            .any(|child| contains_id(child, target_id))
}

#[must_use]
/// Returns a copy of `node` in which the node carrying `target_id` has its children
/// replaced wholesale by `content`.
///
/// The matched node keeps its tag, key, id and props. When `target_id` is absent the
/// result is structurally equal to `node`.
pub fn replace_content_by_id(node: &Node, target_id: &str, content: &[Node]) -> Node {
    if node.id() == Some(target_id) {
        return node.rebuild(content.to_vec());
    }
    if node.children().is_empty() {
        return node.clone();
    }
    let children = node
        .children()
        .iter()
        .map(|child| replace_content_by_id(child, target_id, content))
        .collect();
    node.rebuild(children)
}

#[must_use]
/// Recovers an addressable id from `node`, looking through structural wrappers.
///
/// The node's own id wins; otherwise the first non-empty id found in pre-order among its
/// descendants is returned.
pub fn extract_id(node: &Node) -> Option<&str> {
    if let Some(id) = node.id().filter(|id| !id.is_empty()) {
        return Some(id);
    }
    node.children().iter().find_map(extract_id)
}

#[must_use]
/// Clones `node` and its whole subtree, attaching `capabilities` to every composite.
///
/// Opaque nodes are cloned without capabilities, but their children are still visited so
/// composites nested inside primitive containers receive the bundle.
pub fn inject_props(node: &Node, capabilities: &EditCapabilities) -> Node {
    let children = node
        .children()
        .iter()
        .map(|child| inject_props(child, capabilities))
        .collect();
    let mut injected = node.rebuild(children);
    let own = node.is_composite().then(|| capabilities.clone());
    injected.set_capabilities(own);
    injected
}

#[must_use]
/// Finds the node carrying `target_id`, depth-first.
pub fn find_by_id<'a>(node: &'a Node, target_id: &str) -> Option<&'a Node> {
    if node.id() == Some(target_id) {
        return Some(node);
    }
    node.children()
        .iter()
        .find_map(|child| find_by_id(child, target_id))
}

#[must_use]
/// Lists every non-empty id in `nodes`, pre-order.
pub fn collect_ids(nodes: &[Node]) -> Vec<String> {
    fn walk(node: &Node, ids: &mut Vec<String>) {
        if let Some(id) = node.id().filter(|id| !id.is_empty()) {
            ids.push(id.to_string());
        }
        for child in node.children() {
            walk(child, ids);
        }
    }

    let mut ids = Vec::new();
    for node in nodes {
        walk(node, &mut ids);
    }
    ids
}

#[cfg(test)]
#[path = "tests/traversal.rs"]
mod tests;
