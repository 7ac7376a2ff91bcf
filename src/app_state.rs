//! The state machine bridging the section store and the interactive editor.
//!
//! A TUI needs a single source of truth that can be interrogated and mutated as the user
//! navigates and edits. The store owns the sections; this state owns everything about the
//! session around them: which section is selected, the editor buffer, an in-progress
//! drag, and the latest layout. User intents are routed through the capabilities the
//! renderer injected, which dispatch actions that are then drained into the store.

use crate::context::Dispatcher;
use crate::loader::LoaderEvent;
use crate::node::Node;
use crate::render::{Layout, ReorderRegion, Renderer};
use crate::store::{Action, SectionStore};
use crate::traversal::{collect_ids, contains_id};
use edtui::{EditorState, Lines};
use std::sync::mpsc;

#[derive(Clone, PartialEq, Debug)]
/// Tracks the lifecycle of a section reordering operation.
///
/// ```text
/// None -> Selected -> Moved -> None (after save or cancel)
///        ^ |
///        |____________________|
///              (cancel)
/// ```
///
/// - **None → Selected**: `Ctrl+↑/↓` on a section
/// - **Selected → Moved**: any move (up/down/top/bottom)
/// - **Moved → None**: `:w` hands the new order to the store, `Esc` discards it
/// - **Selected → None**: cancel before any moves
pub enum MoveState {
    /// No section is being moved; normal navigation mode.
    None,
    /// A top-level section has been grabbed but not moved yet.
    Selected,
    /// The grabbed section has been repositioned; the store has not seen it yet.
    Moved,
}

#[derive(PartialEq, Debug)]
/// Determines which UI screen renders and how input is interpreted.
pub enum View {
    /// Shows the laid-out section tree with navigation.
    List,
    /// Provides a vim-like editor for section content.
    Detail,
    /// Captures vim-style command input after ':' keystroke.
    Command,
}

#[derive(Clone, PartialEq, Debug)]
/// Progress of the initial load.
pub enum LoadStatus {
    /// Waiting for the loader.
    Loading,
    /// Sections are available.
    Ready,
    /// The loader reported a failure.
    Failed(String),
}

/// Session state around a [`SectionStore`].
pub struct AppState {
    /// Owner of the top-level list.
    pub store: SectionStore,
    /// Produces the layout from the store's list.
    pub renderer: Renderer,
    /// Latest layout.
    pub layout: Layout,
    /// Every addressable section id, in display order.
    pub section_ids: Vec<String>,
    /// Selected entry of `section_ids`.
    pub current_section_index: usize,
    /// Active UI screen determining input handling.
    pub current_view: View,
    /// Editor buffer content when detail view is active.
    pub editor_state: Option<EditorState>,
    /// Accumulates vim-style command input after ':' is pressed.
    pub command_buffer: String,
    /// Status feedback displayed in the help bar.
    pub message: Option<String>,
    /// Maximum line width for text wrapping in the editor.
    pub wrap_width: usize,
    /// Reorder lifecycle for visual feedback.
    pub move_state: MoveState,
    /// Drag in progress, if any.
    pub region: Option<ReorderRegion>,
    /// Progress of the initial load.
    pub load_status: LoadStatus,
    dispatcher: Dispatcher,
    actions: mpsc::Receiver<Action>,
}

impl AppState {
    #[must_use]
    /// Builds the session and lays out the store's current list.
    ///
    /// `dispatcher` must feed `actions`; it is the same dispatcher the renderer injects.
    pub fn new(
        store: SectionStore,
        renderer: Renderer,
        dispatcher: Dispatcher,
        actions: mpsc::Receiver<Action>,
        wrap_width: usize,
    ) -> Self {
        let mut state = Self {
            store,
            renderer,
            layout: Layout::default(),
            section_ids: Vec::new(),
            current_section_index: 0,
            current_view: View::List,
            editor_state: None,
            command_buffer: String::new(),
            message: None,
            wrap_width,
            move_state: MoveState::None,
            region: None,
            load_status: LoadStatus::Loading,
            dispatcher,
            actions,
        };
        state.refresh();
        state
    }

    #[must_use]
    /// Id of the selected section.
    pub fn current_section_id(&self) -> Option<&str> {
        self.section_ids
            .get(self.current_section_index)
            .map(String::as_str)
    }

    fn is_preview(&self) -> bool {
        self.renderer.options().is_preview
    }

    /// Re-lays out the sections (or the drag in progress) and keeps the selection on the
    /// same section when it still exists.
    pub fn refresh(&mut self) {
        let selected = self.current_section_id().map(str::to_string);
        self.layout = match &self.region {
            Some(region) => self.renderer.layout(region.order()),
            None => self.renderer.layout(self.store.sections()),
        };
        self.section_ids = match &self.region {
            Some(region) => collect_ids(region.order()),
            None => collect_ids(self.store.sections()),
        };
        if let Some(index) = selected
            .and_then(|id| self.section_ids.iter().position(|other| *other == id))
        {
            self.current_section_index = index;
        }
        self.current_section_index = self
            .current_section_index
            .min(self.section_ids.len().saturating_sub(1));
    }

    /// Applies every dispatched action to the store, then re-lays out.
    ///
    /// Returns the number of actions applied.
    pub fn pump_actions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(action) = self.actions.try_recv() {
            self.store.apply(action);
            applied += 1;
        }
        if applied > 0 {
            self.refresh();
        }
        applied
    }

    /// Folds a loader event into the session.
    pub fn ingest(&mut self, event: LoaderEvent) {
        match event {
            LoaderEvent::Loaded(update) => {
                self.store.apply_update(update);
                self.load_status = LoadStatus::Ready;
                self.refresh();
            }
            LoaderEvent::Replaced(update) => {
                if self.store.apply_update(update) {
                    if self.region.take().is_some() {
                        self.move_state = MoveState::None;
                        self.message = Some("Reloaded; move discarded".to_string());
                    } else {
                        self.message = Some("Reloaded".to_string());
                    }
                    self.refresh();
                }
            }
            LoaderEvent::Failed(reason) => {
                if self.load_status == LoadStatus::Loading {
                    self.load_status = LoadStatus::Failed(reason.clone());
                }
                self.message = Some(format!("Load failed: {reason}"));
            }
        }
    }

    /// Loads the selected section's text into the editor buffer.
    pub fn enter_detail_view(&mut self) {
        let Some(id) = self.current_section_id() else {
            return;
        };
        let text = self
            .layout
            .node_for(id)
            .map(Node::text_content)
            .unwrap_or_default();

        let lines_text = if text.trim().is_empty() {
            "\n".to_string()
        } else {
            format!("\n{}\n", text.trim())
        };
        self.editor_state = Some(EditorState::new(Lines::from(lines_text.as_str())));
        self.current_view = View::Detail;
    }

    /// Returns to the section list, optionally committing the editor's text first.
    pub fn exit_detail_view(&mut self, save: bool) {
        if save {
            self.save_current();
        }
        self.editor_state = None;
        self.current_view = View::List;
    }

    fn editor_text(&self) -> Option<String> {
        self.editor_state.as_ref().map(|editor_state| {
            editor_state
                .lines
                .iter_row()
                .map(|line| line.iter().collect::<String>())
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
    }

    // The store must not change while a region holds a copy of its list.
    fn refuse_during_move(&mut self) -> bool {
        if self.region.is_none() {
            return false;
        }
        self.message = Some("Finish or cancel the move first".to_string());
        true
    }

    /// Commits the editor's text to the selected section through its injected
    /// capabilities.
    pub fn save_current(&mut self) {
        let Some(text) = self.editor_text() else {
            return;
        };
        let Some(id) = self.current_section_id().map(str::to_string) else {
            return;
        };
        if self.is_preview() {
            self.message = Some("Preview is read-only".to_string());
            return;
        }
        if self.refuse_during_move() {
            return;
        }

        match self.layout.node_for(&id).and_then(|node| node.capabilities()) {
            Some(capabilities) => capabilities.on_edit_section(&id, &text),
            None => self.dispatcher.dispatch(Action::CommitText {
                id: id.clone(),
                text,
            }),
        }
        self.pump_actions();
        self.message = Some("Saved".to_string());
    }

    /// Inserts a new section after the selected one's top-level element.
    pub fn add_after_current(&mut self) {
        let Some(id) = self.current_section_id().map(str::to_string) else {
            return;
        };
        if self.is_preview() {
            self.message = Some("Preview is read-only".to_string());
            return;
        }
        if self.refuse_during_move() {
            return;
        }

        let before = self.store.sections().len();
        match self.layout.node_for(&id).and_then(|node| node.capabilities()) {
            Some(capabilities) => capabilities.on_add_section(&id),
            None => self.dispatcher.dispatch(Action::AddAfter { id }),
        }
        self.pump_actions();
        self.message = Some(if self.store.sections().len() > before {
            "Section added".to_string()
        } else {
            "Nothing to add after".to_string()
        });
    }

    /// Deletes the top-level element owning the selected section.
    pub fn delete_current(&mut self) {
        let Some(id) = self.current_section_id().map(str::to_string) else {
            return;
        };
        if self.is_preview() {
            self.message = Some("Preview is read-only".to_string());
            return;
        }
        if self.refuse_during_move() {
            return;
        }

        match self.layout.block_for(&id).and_then(|block| block.context.as_ref()) {
            Some(context) => context.on_delete(),
            None => self.dispatcher.dispatch(Action::Delete { id }),
        }
        self.pump_actions();
        self.message = Some("Section deleted".to_string());
    }

    #[must_use]
    /// Returns the following section index for sequential navigation.
    pub fn find_next_section(&self) -> Option<usize> {
        (self.current_section_index + 1 < self.section_ids.len())
            .then_some(self.current_section_index + 1)
    }

    #[must_use]
    /// Returns the preceding section index for reverse navigation.
    pub fn find_prev_section(&self) -> Option<usize> {
        self.current_section_index.checked_sub(1)
    }

    #[must_use]
    /// Jumps to the first section in the document.
    pub fn navigate_to_first(&self) -> Option<usize> {
        (!self.section_ids.is_empty()).then_some(0)
    }

    #[must_use]
    /// Jumps to the last section in the document.
    pub fn navigate_to_last(&self) -> Option<usize> {
        self.section_ids.len().checked_sub(1)
    }

    #[must_use]
    /// Determines available width for text after accounting for indentation.
    pub fn get_max_line_width(&self) -> usize {
        let indent = self
            .current_section_id()
            .and_then(|id| {
                self.layout
                    .lines()
                    .find(|line| line.section_id.as_deref() == Some(id))
            })
            .map_or(0, |line| line.indent * 2);
        self.wrap_width.saturating_sub(indent)
    }

    // --- Section List Movement ---

    /// Grabs the top-level element owning the selected section.
    pub fn start_move(&mut self) {
        if !self.renderer.options().reorder_enabled || self.is_preview() {
            self.message = Some("Reordering is disabled".to_string());
            return;
        }
        let Some(id) = self.current_section_id() else {
            return;
        };
        let sections = self.store.sections();
        let Some(index) = sections.iter().position(|node| contains_id(node, id)) else {
            return;
        };
        self.region = ReorderRegion::grab(sections, index);
        self.move_state = MoveState::Selected;
        self.refresh();
    }

    /// Cancel the current move operation
    pub fn cancel_move(&mut self) {
        self.region = None;
        self.move_state = MoveState::None;
        self.refresh();
    }

    fn after_move(&mut self, moved: bool) -> bool {
        if moved {
            self.move_state = MoveState::Moved;
            self.refresh();
        }
        moved
    }

    /// Move section up by one position
    pub fn move_section_up(&mut self) -> bool {
        let moved = self.region.as_mut().is_some_and(ReorderRegion::move_up);
        self.after_move(moved)
    }

    /// Move section down by one position
    pub fn move_section_down(&mut self) -> bool {
        let moved = self.region.as_mut().is_some_and(ReorderRegion::move_down);
        self.after_move(moved)
    }

    /// Move section to top of document
    pub fn move_section_to_top(&mut self) -> bool {
        let moved = self.region.as_mut().is_some_and(ReorderRegion::move_to_top);
        self.after_move(moved)
    }

    /// Move section to bottom of document
    pub fn move_section_to_bottom(&mut self) -> bool {
        let moved = self
            .region
            .as_mut()
            .is_some_and(ReorderRegion::move_to_bottom);
        self.after_move(moved)
    }

    /// Hands the dragged order to the store, which notifies the host.
    pub fn save_section_reorder(&mut self) {
        if self.move_state != MoveState::Moved {
            return;
        }
        if let Some(region) = self.region.take() {
            self.dispatcher.dispatch(Action::Reorder(region.finish()));
        }
        self.move_state = MoveState::None;
        self.pump_actions();
        self.message = Some("Sections reordered".to_string());
    }

    // --- </Section List Movement> ---
}

#[cfg(test)]
#[path = "tests/app_state.rs"]
mod tests;
