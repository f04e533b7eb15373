//! `autoblog` — turn unread mailbox messages into static-site blog posts.
//!
//! Each unread message becomes a markdown file with TOML front matter; its
//! attachments are saved next to the posts and linked from the document.
//! The mailbox is only touched through the [`mailbox::MailSession`] seam.

pub mod config;
pub mod error;
pub mod export;
pub mod mailbox;
pub mod model;
pub mod parser;
