//! Email parsing: header decoding, dates, and MIME structure.

pub mod header;
pub mod mime;
