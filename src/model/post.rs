//! Pipeline outputs: extracted content, per-message outcomes, and run summaries.

use std::path::PathBuf;

use serde::Serialize;

/// Body text and saved attachments pulled out of one message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedContent {
    /// Selected body text (plain text preferred, converted HTML otherwise).
    /// Empty when the message has neither.
    pub body: String,

    /// Paths of the attachments written for this message, in encounter order.
    pub attachments: Vec<PathBuf>,
}

/// Result of processing a single message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MessageOutcome {
    /// A post was written and the message was flagged as seen.
    Posted { id: String, path: PathBuf },
    /// The message was left unread.
    Skipped { id: String, reason: String },
}

/// Aggregated result of one polling run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Number of unread messages reported by the server.
    pub found: usize,
    /// Messages turned into posts and marked read.
    pub processed: usize,
    /// Messages left unread because something failed.
    pub skipped: usize,
    /// Every per-message outcome, in processing order.
    pub outcomes: Vec<MessageOutcome>,
}

impl RunSummary {
    /// Fold one outcome into the counters.
    pub fn record(&mut self, outcome: MessageOutcome) {
        match outcome {
            MessageOutcome::Posted { .. } => self.processed += 1,
            MessageOutcome::Skipped { .. } => self.skipped += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Paths of all posts written during the run.
    pub fn posts(&self) -> impl Iterator<Item = &PathBuf> {
        self.outcomes.iter().filter_map(|o| match o {
            MessageOutcome::Posted { path, .. } => Some(path),
            MessageOutcome::Skipped { .. } => None,
        })
    }
}
