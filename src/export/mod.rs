//! Post generation: slugs, attachments, body extraction, and markdown output.

pub mod attachment;
pub mod content;
pub mod post;
pub mod slug;
