//! IMAP-over-TLS implementation of the mailbox seam.

use std::net::TcpStream;

use native_tls::{TlsConnector, TlsStream};

use crate::config::ServerConfig;
use crate::error::{AutoblogError, Result};

use super::{Connector, Credentials, MailSession, MessageId};

/// Connects to `server.host:server.port` over implicit TLS and logs in.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImapConnector;

impl Connector for ImapConnector {
    type Session = ImapSession;

    fn connect(&self, server: &ServerConfig, credentials: &Credentials) -> Result<ImapSession> {
        let connection_error = |reason: String| AutoblogError::Connection {
            server: format!("{}:{}", server.host, server.port),
            reason,
        };

        let tls = TlsConnector::builder()
            .build()
            .map_err(|e| connection_error(e.to_string()))?;

        // The domain is passed twice so the certificate is checked against it.
        let client = ::imap::connect((server.host.as_str(), server.port), &server.host, &tls)
            .map_err(|e| connection_error(e.to_string()))?;

        let session = client
            .login(&credentials.account, credentials.secret())
            .map_err(|(e, _client)| connection_error(format!("login rejected: {e}")))?;

        tracing::info!(server = %server.host, account = %credentials.account, "Logged in");
        Ok(ImapSession { session })
    }
}

/// A logged-in IMAP session.
pub struct ImapSession {
    session: ::imap::Session<TlsStream<TcpStream>>,
}

impl MailSession for ImapSession {
    fn select(&mut self, mailbox: &str) -> Result<()> {
        let info = self
            .session
            .select(mailbox)
            .map_err(|e| AutoblogError::mailbox("select", e))?;
        tracing::debug!(mailbox, exists = info.exists, "Selected mailbox");
        Ok(())
    }

    fn search_unseen(&mut self) -> Result<Vec<MessageId>> {
        let found = self
            .session
            .search("UNSEEN")
            .map_err(|e| AutoblogError::mailbox("search", e))?;
        // The server's answer is unordered here; sequence order is arrival order.
        let mut ids: Vec<MessageId> = found.into_iter().map(MessageId).collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn fetch(&mut self, id: MessageId) -> Result<Vec<u8>> {
        // BODY.PEEK leaves the message unread until the post is written.
        let fetches = self
            .session
            .fetch(id.to_string(), "BODY.PEEK[]")
            .map_err(|e| AutoblogError::mailbox("fetch", e))?;
        fetches
            .iter()
            .find_map(|f| f.body())
            .map(<[u8]>::to_vec)
            .ok_or_else(|| AutoblogError::mailbox("fetch", format!("no body returned for {id}")))
    }

    fn mark_seen(&mut self, id: MessageId) -> Result<()> {
        self.session
            .store(id.to_string(), "+FLAGS (\\Seen)")
            .map_err(|e| AutoblogError::mailbox("store", e))?;
        Ok(())
    }

    fn logout(&mut self) -> Result<()> {
        self.session
            .logout()
            .map_err(|e| AutoblogError::mailbox("logout", e))
    }
}
