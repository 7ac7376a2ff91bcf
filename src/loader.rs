//! Loading the section document and watching it for changes.
//!
//! The initial load runs on a background thread and reports back over a channel, so the
//! event loop never blocks on disk. If the handle is torn down before the load finishes,
//! the result is thrown away and no watcher is installed. Once loaded, a debounced file
//! watcher pushes whole replacement lists; each push is stamped with a generation taken
//! when its read started, letting the store discard pushes that arrive out of order.

use crate::error::{Error, Result};
use crate::node::Node;
use crate::store::SectionUpdate;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
/// Message from the loader to the event loop.
pub enum LoaderEvent {
    /// The initial load finished.
    Loaded(SectionUpdate),
    /// The document changed on disk and was read again.
    Replaced(SectionUpdate),
    /// A load or reload failed.
    Failed(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    List(Vec<Node>),
    Wrapped { sections: Vec<Node> },
}

/// Parses a section document: either a bare array of nodes or `{ "sections": [...] }`.
///
/// # Errors
///
/// Returns an error if `json` is neither shape.
pub fn parse_sections(json: &str) -> Result<Vec<Node>> {
    let document: Document = serde_json::from_str(json)?;
    Ok(match document {
        Document::List(sections) | Document::Wrapped { sections } => sections,
    })
}

#[derive(Clone, Debug)]
/// Reads the section document from a JSON file.
pub struct FileLoader {
    path: PathBuf,
}

impl FileLoader {
    #[must_use]
    /// Loader for the document at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    /// Location of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Vec<Node>> {
        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))?;
        parse_sections(&contents)
    }
}

#[derive(Clone, Copy, Debug)]
/// Whether and how to watch the document after loading.
pub struct WatchOptions {
    /// Install a watcher once the initial load succeeds.
    pub enabled: bool,
    /// Quiet period before a burst of file events triggers a reload.
    pub debounce: Duration,
}

#[derive(Clone, Default)]
struct Shared {
    cancelled: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    watcher: Arc<Mutex<Option<Debouncer<RecommendedWatcher>>>>,
}

impl Shared {
    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst)
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Handle on a running load and its watcher.
pub struct LoadHandle {
    shared: Shared,
}

impl LoadHandle {
    #[must_use]
    /// Starts loading on a background thread; events are sent to `events`.
    pub fn spawn(
        loader: FileLoader,
        watch: WatchOptions,
        events: mpsc::Sender<LoaderEvent>,
    ) -> Self {
        let shared = Shared::default();
        let worker = shared.clone();
        thread::spawn(move || run_load(&loader, watch, &events, &worker));
        Self { shared }
    }

    #[must_use]
    /// Whether a watcher is currently installed.
    pub fn is_watching(&self) -> bool {
        self.shared
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Cancels a pending load and stops watching.
    pub fn teardown(&self) {
        self.shared.cancelled.store(true, Ordering::SeqCst);
        let watcher = self
            .shared
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if watcher.is_some() {
            tracing::debug!("section watcher stopped");
        }
    }
}

impl Drop for LoadHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn run_load(
    loader: &FileLoader,
    watch: WatchOptions,
    events: &mpsc::Sender<LoaderEvent>,
    shared: &Shared,
) {
    let generation = shared.next_generation();
    let result = loader.load();

    if shared.is_cancelled() {
        tracing::debug!(path = %loader.path().display(), "load finished after teardown; discarding");
        return;
    }

    let sections = match result {
        Ok(sections) => sections,
        Err(e) => {
            tracing::warn!("failed to load sections: {e}");
            let _ = events.send(LoaderEvent::Failed(e.to_string()));
            return;
        }
    };

    tracing::info!(
        path = %loader.path().display(),
        count = sections.len(),
        "sections loaded"
    );
    if events
        .send(LoaderEvent::Loaded(SectionUpdate {
            generation,
            sections,
        }))
        .is_err()
    {
        return;
    }

    if !watch.enabled {
        return;
    }

    match install_watcher(loader, watch.debounce, events, shared) {
        Ok(debouncer) => {
            let mut slot = shared
                .watcher
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if shared.is_cancelled() {
                tracing::debug!("torn down before the watcher was installed");
            } else {
                *slot = Some(debouncer);
            }
        }
        Err(e) => tracing::warn!("live reload disabled: {e}"),
    }
}

fn install_watcher(
    loader: &FileLoader,
    debounce: Duration,
    events: &mpsc::Sender<LoaderEvent>,
    shared: &Shared,
) -> Result<Debouncer<RecommendedWatcher>> {
    let reloader = loader.clone();
    let sink = events.clone();
    let state = shared.clone();

    let mut debouncer = new_debouncer(debounce, move |result: DebounceEventResult| {
        match result {
            Ok(changes) if !changes.is_empty() && !state.is_cancelled() => {
                let generation = state.next_generation();
                let event = match reloader.load() {
                    Ok(sections) => LoaderEvent::Replaced(SectionUpdate {
                        generation,
                        sections,
                    }),
                    Err(e) => LoaderEvent::Failed(e.to_string()),
                };
                if sink.send(event).is_err() {
                    tracing::debug!("event loop gone; dropping reload");
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("watcher error: {e}"),
        }
    })?;

    debouncer
        .watcher()
        .watch(loader.path(), RecursiveMode::NonRecursive)?;
    Ok(debouncer)
}

#[cfg(test)]
#[path = "tests/loader.rs"]
mod tests;
