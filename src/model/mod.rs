//! Core data model types: fetched messages, MIME parts, and pipeline outputs.

pub mod message;
pub mod post;
