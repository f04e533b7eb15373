//! Mailbox access: the protocol seam, the IMAP implementation, and the
//! polling driver.

pub mod driver;
pub mod imap;

use std::fmt;

use crate::config::ServerConfig;
use crate::error::{AutoblogError, Result};

pub use self::driver::MailboxDriver;
pub use self::imap::ImapConnector;

/// Server-assigned identifier of a message in the selected mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub u32);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account name and secret used to log in.
#[derive(Clone)]
pub struct Credentials {
    pub account: String,
    secret: String,
}

impl Credentials {
    pub fn new(account: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            secret: secret.into(),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Reject blank values before any connection is attempted.
    pub fn validate(&self) -> Result<()> {
        if self.account.trim().is_empty() {
            return Err(AutoblogError::Config("mail account is not set".into()));
        }
        if self.secret.is_empty() {
            return Err(AutoblogError::Config("mail password is not set".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account", &self.account)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// An authenticated session with a mail server.
///
/// Every call reports success or failure; none of them retry.
pub trait MailSession {
    /// Select the mailbox later calls operate on.
    fn select(&mut self, mailbox: &str) -> Result<()>;

    /// Identifiers of all unread messages, in server order.
    fn search_unseen(&mut self) -> Result<Vec<MessageId>>;

    /// Full raw message. Must not set the `\Seen` flag.
    fn fetch(&mut self, id: MessageId) -> Result<Vec<u8>>;

    /// Add the `\Seen` flag.
    fn mark_seen(&mut self, id: MessageId) -> Result<()>;

    fn logout(&mut self) -> Result<()>;
}

/// Opens authenticated [`MailSession`]s.
pub trait Connector {
    type Session: MailSession;

    fn connect(&self, server: &ServerConfig, credentials: &Credentials) -> Result<Self::Session>;
}
