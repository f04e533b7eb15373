//! Body selection and attachment extraction for one message.

use std::path::Path;

use crate::error::{AutoblogError, Result};
use crate::model::message::{Message, Part};
use crate::model::post::ExtractedContent;
use crate::parser::header::decode_charset;

use super::attachment::save_attachment;

/// Converts an HTML body into markdown-ish plain text.
pub trait TextTransform {
    fn html_to_text(&self, html: &str) -> Result<String>;
}

impl<F> TextTransform for F
where
    F: Fn(&str) -> String,
{
    fn html_to_text(&self, html: &str) -> Result<String> {
        Ok(self(html))
    }
}

/// [`TextTransform`] backed by the `html2text` crate.
#[derive(Debug, Clone, Copy)]
pub struct Html2Text {
    /// Column at which paragraphs are wrapped.
    pub width: usize,
}

impl Default for Html2Text {
    fn default() -> Self {
        Self { width: 80 }
    }
}

impl TextTransform for Html2Text {
    fn html_to_text(&self, html: &str) -> Result<String> {
        if self.width == 0 {
            return Err(AutoblogError::Conversion("wrap width must be non-zero".into()));
        }
        Ok(html2text::from_read(html.as_bytes(), self.width))
    }
}

/// Walk `message` once, saving attachments and selecting the body.
///
/// The first `text/plain` part becomes the body. Without one, the first
/// `text/html` part is run through `transform`; when a plain part exists
/// the HTML is never converted. Later parts of an already seen type are
/// ignored. A part counts as an attachment only by its disposition, so a
/// `text/plain` attachment is saved, not used as body.
pub fn extract_content(
    message: &Message,
    attachments_dir: &Path,
    transform: &dyn TextTransform,
) -> Result<ExtractedContent> {
    let mut plain: Option<String> = None;
    let mut html: Option<String> = None;
    let mut attachments = Vec::new();

    // A single-part message is a tree of one node; same rules apply.
    for part in message.root.walk() {
        if part.is_attachment() {
            if let Some(path) = save_attachment(part, attachments_dir)? {
                attachments.push(path);
            }
        } else if part.is_plain_text() {
            if plain.is_none() {
                plain = Some(decode_text(part));
            }
        } else if part.is_html() && html.is_none() {
            html = Some(decode_text(part));
        }
    }

    let body = match (plain, html) {
        (Some(text), _) => text,
        (None, Some(html)) => transform.html_to_text(&html)?,
        (None, None) => String::new(),
    };

    Ok(ExtractedContent { body, attachments })
}

/// Decode a text part's payload with its declared charset (UTF-8 if none).
fn decode_text(part: &Part) -> String {
    decode_charset(part.charset.as_deref().unwrap_or("utf-8"), &part.payload)
}
