//! In-memory mail server shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::Path;
use std::rc::Rc;

use autoblog::config::{Config, ServerConfig};
use autoblog::error::{AutoblogError, Result};
use autoblog::mailbox::{Connector, Credentials, MailSession, MessageId};

pub const PLAIN_WITH_ATTACHMENT: &str = "\
From: Writer <writer@example.com>\r
To: blog@example.com\r
Subject: Hello World\r
Date: Tue, 02 Jan 2024 03:04:05 +0000\r
MIME-Version: 1.0\r
Content-Type: multipart/mixed; boundary=\"XYZ\"\r
\r
--XYZ\r
Content-Type: text/plain; charset=utf-8\r
\r
Hello from the mailbox.\r
--XYZ\r
Content-Type: image/png\r
Content-Disposition: attachment; filename=\"cat.png\"\r
Content-Transfer-Encoding: base64\r
\r
iVBORw0KGgo=\r
--XYZ--\r
";

pub const HTML_ONLY: &str = "\
From: writer@example.com\r
Subject: =?UTF-8?B?Q2Fmw6kgbm90ZXM=?=\r
Date: Wed, 03 Jan 2024 10:00:00 +0100\r
MIME-Version: 1.0\r
Content-Type: text/html; charset=utf-8\r
\r
<p>Rich <b>text</b></p>\r
";

pub const NO_SUBJECT: &str = "\
From: writer@example.com\r
Date: Thu, 04 Jan 2024 12:30:00 +0000\r
Content-Type: text/plain\r
\r
Just a note.\r
";

/// Scripted server state. Message ids are 1-based positions in `messages`.
#[derive(Default)]
pub struct ServerState {
    pub messages: Vec<Vec<u8>>,
    pub seen: HashSet<u32>,
    pub fail_connect: bool,
    pub fail_select: bool,
    pub fail_search: bool,
    pub fail_logout: bool,
    pub fail_fetch: HashSet<u32>,
    pub fail_store: HashSet<u32>,
    pub connects: usize,
    pub logged_out: bool,
    /// Runs before a fetch is answered.
    pub on_fetch: Option<Box<dyn FnMut(MessageId)>>,
}

#[derive(Clone, Default)]
pub struct FakeServer {
    pub state: Rc<RefCell<ServerState>>,
}

impl FakeServer {
    pub fn with_messages(raws: &[&str]) -> Self {
        let server = Self::default();
        server.state.borrow_mut().messages = raws.iter().map(|r| r.as_bytes().to_vec()).collect();
        server
    }

    pub fn update(&self, f: impl FnOnce(&mut ServerState)) {
        f(&mut self.state.borrow_mut());
    }

    pub fn is_seen(&self, id: u32) -> bool {
        self.state.borrow().seen.contains(&id)
    }

    pub fn logged_out(&self) -> bool {
        self.state.borrow().logged_out
    }

    pub fn connects(&self) -> usize {
        self.state.borrow().connects
    }
}

impl Connector for FakeServer {
    type Session = FakeSession;

    fn connect(&self, server: &ServerConfig, _credentials: &Credentials) -> Result<FakeSession> {
        let mut state = self.state.borrow_mut();
        state.connects += 1;
        if state.fail_connect {
            return Err(AutoblogError::Connection {
                server: server.host.clone(),
                reason: "connection refused".into(),
            });
        }
        Ok(FakeSession {
            state: Rc::clone(&self.state),
        })
    }
}

pub struct FakeSession {
    state: Rc<RefCell<ServerState>>,
}

impl MailSession for FakeSession {
    fn select(&mut self, _mailbox: &str) -> Result<()> {
        if self.state.borrow().fail_select {
            return Err(AutoblogError::mailbox("select", "no such mailbox"));
        }
        Ok(())
    }

    fn search_unseen(&mut self) -> Result<Vec<MessageId>> {
        let state = self.state.borrow();
        if state.fail_search {
            return Err(AutoblogError::mailbox("search", "server busy"));
        }
        Ok((1..=state.messages.len() as u32)
            .filter(|id| !state.seen.contains(id))
            .map(MessageId)
            .collect())
    }

    fn fetch(&mut self, id: MessageId) -> Result<Vec<u8>> {
        let hook = self.state.borrow_mut().on_fetch.take();
        if let Some(mut hook) = hook {
            hook(id);
            self.state.borrow_mut().on_fetch = Some(hook);
        }

        let state = self.state.borrow();
        if state.fail_fetch.contains(&id.0) {
            return Err(AutoblogError::mailbox("fetch", "connection reset"));
        }
        state
            .messages
            .get(id.0 as usize - 1)
            .cloned()
            .ok_or_else(|| AutoblogError::mailbox("fetch", "no such message"))
    }

    fn mark_seen(&mut self, id: MessageId) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_store.contains(&id.0) {
            return Err(AutoblogError::mailbox("store", "read-only mailbox"));
        }
        state.seen.insert(id.0);
        Ok(())
    }

    fn logout(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.logged_out = true;
        if state.fail_logout {
            return Err(AutoblogError::mailbox("logout", "connection closed"));
        }
        Ok(())
    }
}

/// Configuration writing into `root/posts` and `root/posts/attachments`.
pub fn config_in(root: &Path) -> Config {
    let mut config = Config::default();
    config.server.host = "mail.example.com".into();
    config.output.posts_dir = root.join("posts");
    config.output.attachments_dir = root.join("posts").join("attachments");
    config
}

pub fn credentials() -> Credentials {
    Credentials::new("blog@example.com", "secret")
}

/// Sorted file names in `dir`, empty if it does not exist.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_file())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
