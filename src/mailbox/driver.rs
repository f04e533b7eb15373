//! One polling run: connect, turn every unread message into a post, log out.
//!
//! Failures are isolated per message. A message whose post could not be
//! written stays unread on the server and is picked up again next run.
//! Only configuration, connection, select and search failures end the run.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, Local};

use crate::config::Config;
use crate::error::{AutoblogError, Result};
use crate::export::content::{extract_content, Html2Text, TextTransform};
use crate::export::post::{write_post, PostDraft};
use crate::model::post::{MessageOutcome, RunSummary};
use crate::parser::header::{decode_encoded_words, parse_date};
use crate::parser::mime::parse_message;

use super::{Connector, Credentials, MailSession, MessageId};

/// Subject used when a message has none.
pub const DEFAULT_SUBJECT: &str = "No Subject";

/// Drives a [`Connector`] through one polling run.
pub struct MailboxDriver<C: Connector> {
    config: Config,
    connector: C,
    transform: Box<dyn TextTransform>,
}

impl<C: Connector> MailboxDriver<C> {
    /// Create a driver converting HTML bodies with [`Html2Text`].
    pub fn new(config: Config, connector: C) -> Self {
        Self {
            config,
            connector,
            transform: Box::new(Html2Text::default()),
        }
    }

    /// Replace the HTML-to-text conversion.
    pub fn with_transform(mut self, transform: impl TextTransform + 'static) -> Self {
        self.transform = Box::new(transform);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run once over all unread messages.
    ///
    /// Returns an error only when the run could not start or the unread
    /// list could not be obtained. Logout is attempted on every path once
    /// connected, and its failure is only logged.
    pub fn run(&self, credentials: &Credentials) -> Result<RunSummary> {
        self.config.validate()?;
        credentials.validate()?;
        self.prepare_dirs()?;

        let server = &self.config.server;
        tracing::info!(server = %server.host, port = server.port, "Connecting");
        let mut session = self.connector.connect(server, credentials)?;

        let result = self.poll(&mut session);

        if let Err(e) = session.logout() {
            tracing::warn!(error = %e, "Failed to log out");
        }

        if let Ok(summary) = &result {
            tracing::info!(
                found = summary.found,
                processed = summary.processed,
                skipped = summary.skipped,
                "Run finished"
            );
        }
        result
    }

    fn prepare_dirs(&self) -> Result<()> {
        for dir in [&self.config.output.posts_dir, &self.config.output.attachments_dir] {
            std::fs::create_dir_all(dir).map_err(|e| AutoblogError::io(dir, e))?;
        }
        Ok(())
    }

    fn poll(&self, session: &mut C::Session) -> Result<RunSummary> {
        session.select(&self.config.server.mailbox)?;

        let ids = session.search_unseen()?;
        tracing::info!(count = ids.len(), "Found unread messages");

        let mut summary = RunSummary {
            found: ids.len(),
            ..RunSummary::default()
        };
        for id in ids {
            summary.record(self.process_message(session, id));
        }
        Ok(summary)
    }

    /// Turn one message into a post and flag it as seen.
    ///
    /// Never fails: any error becomes [`MessageOutcome::Skipped`].
    pub fn process_message(&self, session: &mut C::Session, id: MessageId) -> MessageOutcome {
        match self.publish(session, id) {
            Ok(path) => MessageOutcome::Posted {
                id: id.to_string(),
                path,
            },
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "Skipping message");
                MessageOutcome::Skipped {
                    id: id.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    fn publish(&self, session: &mut C::Session, id: MessageId) -> Result<PathBuf> {
        let raw = session.fetch(id)?;
        let message = parse_message(&raw)?;

        let subject = match message.subject.as_deref() {
            Some(s) if !s.trim().is_empty() => decode_encoded_words(s),
            _ => DEFAULT_SUBJECT.to_string(),
        };
        let date = message_date(message.date.as_deref());
        tracing::debug!(id = %id, subject = %subject, date = %date, "Processing message");

        let output = &self.config.output;
        let content = extract_content(&message, &output.attachments_dir, self.transform.as_ref())?;

        let path = write_post(
            &PostDraft {
                subject: &subject,
                date,
                body: &content.body,
                attachments: &content.attachments,
            },
            &output.posts_dir,
        )?;

        session.mark_seen(id).map_err(|e| {
            tracing::error!(
                id = %id,
                path = %path.display(),
                "Post written but message could not be marked read; it will be posted again"
            );
            e
        })?;
        tracing::debug!(id = %id, "Marked as read");

        Ok(path)
    }
}

/// Parse the `Date` header, falling back to the current local time.
fn message_date(raw: Option<&str>) -> DateTime<FixedOffset> {
    raw.and_then(parse_date)
        .unwrap_or_else(|| Local::now().fixed_offset())
}
