//! One-way notifications to the host.
//!
//! The host learns about structural outcomes (a new order, a deleted section) but never
//! answers. Posting cannot fail from the caller's point of view: channels that break are
//! logged at debug level and the message is dropped.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::mpsc;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
/// Structural notification posted to the host.
pub enum HostMessage {
    /// The top-level order changed.
    CommitSectionReorder {
        #[serde(rename = "sectionIds")]
        /// Ids of the top-level sections in their new order.
        section_ids: Vec<String>,
    },
    /// A section and its whole top-level owner were removed.
    CommitSectionDelete {
        #[serde(rename = "sectionId")]
        /// Id that was asked to be deleted.
        section_id: String,
    },
}

/// Outbound-only message sink.
pub trait HostChannel {
    /// Posts `message` without awaiting acknowledgement.
    fn post(&mut self, message: HostMessage);
}

impl HostChannel for mpsc::Sender<HostMessage> {
    fn post(&mut self, message: HostMessage) {
        if self.send(message).is_err() {
            tracing::debug!("host receiver closed; dropping notification");
        }
    }
}

/// Writes each message as one line of JSON.
pub struct NdjsonHost<W: Write> {
    writer: W,
}

impl<W: Write> NdjsonHost<W> {
    #[must_use]
    /// Wraps a writer, typically a file or stdout.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    #[must_use]
    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> HostChannel for NdjsonHost<W> {
    fn post(&mut self, message: HostMessage) {
        let written = serde_json::to_string(&message)
            .map_err(std::io::Error::other)
            .and_then(|line| {
                writeln!(self.writer, "{line}")?;
                self.writer.flush()
            });
        if let Err(e) = written {
            tracing::debug!("failed to post host notification: {e}");
        }
    }
}

#[cfg(test)]
#[path = "tests/host.rs"]
mod tests;
