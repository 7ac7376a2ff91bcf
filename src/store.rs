//! The section store owns the top-level list and is its single point of mutation.
//!
//! Every transition swaps in a freshly computed list; nodes are never edited in place.
//! Structural outcomes (reorder, delete) are posted to the host, committed text goes to
//! the edit journal, and nothing here returns an error: failures degrade to a no-op or a
//! placeholder id and leave a diagnostic in the log.

use crate::host::{HostChannel, HostMessage};
use crate::journal::{EditJournal, EditRecord};
use crate::node::Node;
use crate::traversal::{contains_id, extract_id, replace_content_by_id};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Key prefix marking a structural wrapper around a section.
pub const DEFAULT_WRAPPER_PREFIX: &str = "layout-";

/// Id reported to the host when none can be derived.
pub const UNKNOWN_SECTION_ID: &str = "unknown";

/// Hint shown by a freshly added section.
pub const PLACEHOLDER_TEXT: &str = "Click to edit";

#[derive(Clone, Debug, PartialEq)]
/// User or host request against the store.
pub enum Action {
    /// Replace a section's content with text.
    CommitText {
        /// Target section.
        id: String,
        /// New content.
        text: String,
    },
    /// Insert a placeholder section after the top-level element owning `id`.
    AddAfter {
        /// Section to insert after.
        id: String,
    },
    /// Remove the top-level element owning `id`.
    Delete {
        /// Section to delete.
        id: String,
    },
    /// Adopt a new top-level order.
    Reorder(Vec<Node>),
}

#[derive(Clone, Debug, PartialEq)]
/// Full replacement list pushed by the watcher.
pub struct SectionUpdate {
    /// Stamp taken when the read that produced `sections` started.
    pub generation: u64,
    /// The replacement list.
    pub sections: Vec<Node>,
}

#[must_use]
/// Builds the placeholder section inserted by [`SectionStore::add_section_after`].
pub fn placeholder_section(id: &str) -> Node {
    Node::element("Section")
        .with_id(id)
        .with_child(Node::element("input").with_prop("placeholder", PLACEHOLDER_TEXT))
}

#[must_use]
/// Derives the id reported to the host for a top-level element.
///
/// A key carrying the wrapper prefix and something after it wins, with the prefix
/// stripped; otherwise the id is recovered from the element's subtree, falling back to
/// [`UNKNOWN_SECTION_ID`]. An empty prefix never matches.
pub fn host_section_id(node: &Node, wrapper_prefix: &str) -> String {
    let from_key = node
        .key()
        .filter(|_| !wrapper_prefix.is_empty())
        .and_then(|key| key.strip_prefix(wrapper_prefix))
        .filter(|id| !id.is_empty());
    if let Some(id) = from_key {
        return id.to_string();
    }
    extract_id(node).map_or_else(
        || {
            tracing::warn!(tag = node.tag(), "no id found for top-level section");
            UNKNOWN_SECTION_ID.to_string()
        },
        str::to_string,
    )
}

fn time_based_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis());
    format!("section-{millis}")
}

/// Owner of the top-level section list.
pub struct SectionStore {
    sections: Vec<Node>,
    host: Box<dyn HostChannel>,
    journal: Option<Box<dyn EditJournal>>,
    wrapper_prefix: String,
    id_source: Box<dyn FnMut() -> String>,
    generation: Option<u64>,
}

impl SectionStore {
    #[must_use]
    /// Creates a store holding `sections` that reports to `host`.
    pub fn new(sections: Vec<Node>, host: impl HostChannel + 'static) -> Self {
        Self {
            sections,
            host: Box::new(host),
            journal: None,
            wrapper_prefix: DEFAULT_WRAPPER_PREFIX.to_string(),
            id_source: Box::new(time_based_id),
            generation: None,
        }
    }

    #[must_use]
    /// Attaches an edit journal for committed text.
    pub fn with_journal(mut self, journal: impl EditJournal + 'static) -> Self {
        self.journal = Some(Box::new(journal));
        self
    }

    #[must_use]
    /// Overrides the key prefix recognised on structural wrappers.
    pub fn with_wrapper_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.wrapper_prefix = prefix.into();
        self
    }

    #[must_use]
    /// Overrides how fresh section ids are minted.
    pub fn with_id_source(mut self, source: impl FnMut() -> String + 'static) -> Self {
        self.id_source = Box::new(source);
        self
    }

    #[must_use]
    /// The current top-level list.
    pub fn sections(&self) -> &[Node] {
        &self.sections
    }

    #[must_use]
    /// Key prefix recognised on structural wrappers.
    pub fn wrapper_prefix(&self) -> &str {
        &self.wrapper_prefix
    }

    /// Applies a dispatched action.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::CommitText { id, text } => self.commit_text(&id, &text),
            Action::AddAfter { id } => {
                self.add_section_after(&id);
            }
            Action::Delete { id } => self.delete(&id),
            Action::Reorder(new_order) => self.reorder(new_order),
        }
    }

    /// Replaces the content of section `id` with a single text leaf holding `text`.
    pub fn commit_text(&mut self, id: &str, text: &str) {
        let content = [Node::text(text)];
        self.sections = self
            .sections
            .iter()
            .map(|node| replace_content_by_id(node, id, &content))
            .collect();

        match self.journal.as_mut() {
            Some(journal) => {
                if let Err(e) = journal.record(EditRecord::add(id, text)) {
                    tracing::warn!(section_id = id, "failed to journal edit: {e}");
                }
            }
            None => tracing::debug!(section_id = id, "no edit journal; edit not recorded"),
        }
    }

    /// Inserts a placeholder section after the top-level element that owns `id`.
    ///
    /// The placeholder takes the structural wrapper of that element when it has one.
    /// Returns the new section's id, or `None` if `id` is not in the list.
    pub fn add_section_after(&mut self, id: &str) -> Option<String> {
        let Some(index) = self.sections.iter().position(|node| contains_id(node, id)) else {
            tracing::warn!(section_id = id, "cannot add after unknown section");
            return None;
        };

        let new_id = self.mint_id();
        let section = placeholder_section(&new_id);
        let sibling = &self.sections[index];
        let element = if sibling.id().is_some_and(|own| !own.is_empty()) {
            section
        } else {
            sibling
                .rebuild(vec![section])
                .with_key(format!("{}{new_id}", self.wrapper_prefix))
        };

        self.sections.insert(index + 1, element);
        Some(new_id)
    }

    /// Adopts `new_order` verbatim as the top-level list and tells the host.
    ///
    /// The order is not checked against the current list; a mismatch is only logged.
    pub fn reorder(&mut self, new_order: Vec<Node>) {
        let section_ids: Vec<String> = new_order
            .iter()
            .map(|node| host_section_id(node, &self.wrapper_prefix))
            .collect();

        if !self.is_permutation(&new_order) {
            tracing::warn!(
                before = self.sections.len(),
                after = new_order.len(),
                "reorder is not a permutation of the current sections"
            );
        }

        self.sections = new_order;
        self.host.post(HostMessage::CommitSectionReorder { section_ids });
    }

    /// Removes every top-level element that contains `id` and tells the host.
    pub fn delete(&mut self, id: &str) {
        let before = self.sections.len();
        self.sections.retain(|node| !contains_id(node, id));
        if self.sections.len() == before {
            tracing::warn!(section_id = id, "delete matched no section");
        }
        self.host.post(HostMessage::CommitSectionDelete {
            section_id: id.to_string(),
        });
    }

    /// Swaps in a whole new list, as on a hot reload.
    pub fn replace_all(&mut self, sections: Vec<Node>) {
        self.sections = sections;
    }

    /// Swaps in a watcher push unless a newer one has already been applied.
    ///
    /// Returns whether the update was applied.
    pub fn apply_update(&mut self, update: SectionUpdate) -> bool {
        if self
            .generation
            .is_some_and(|applied| update.generation < applied)
        {
            tracing::debug!(
                generation = update.generation,
                "discarding stale section update"
            );
            return false;
        }
        self.generation = Some(update.generation);
        self.replace_all(update.sections);
        true
    }

    fn mint_id(&mut self) -> String {
        let base = (self.id_source)();
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.sections.iter().any(|node| contains_id(node, &candidate)) {
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
        candidate
    }

    fn is_permutation(&self, new_order: &[Node]) -> bool {
        if new_order.len() != self.sections.len() {
            return false;
        }
        let identity = |node: &Node| {
            (
                node.key().map(str::to_string),
                extract_id(node).map(str::to_string),
            )
        };
        let mut counts: HashMap<_, isize> = HashMap::new();
        for node in &self.sections {
            *counts.entry(identity(node)).or_default() += 1;
        }
        for node in new_order {
            *counts.entry(identity(node)).or_default() -= 1;
        }
        counts.values().all(|&count| count == 0)
    }
}

#[cfg(test)]
#[path = "tests/store.rs"]
mod tests;
