//! Fetched messages and their MIME part tree.
//!
//! A [`Message`] is built once from the raw bytes returned by the mailbox,
//! consumed by the content extractor and then dropped.

/// A message fetched from the mailbox.
#[derive(Debug, Clone)]
pub struct Message {
    /// Raw `Subject` header value, possibly containing encoded-words.
    pub subject: Option<String>,

    /// Raw `Date` header value.
    pub date: Option<String>,

    /// Root of the part tree. For a single-part message this is the only part.
    pub root: Part,
}

/// A node in a message's MIME structure.
#[derive(Debug, Clone, Default)]
pub struct Part {
    /// Lowercase `type/subtype` (e.g. `"text/plain"`, `"multipart/mixed"`).
    pub content_type: String,

    /// Primary token of the `Content-Disposition` header (`"inline"`, `"attachment"`).
    pub disposition: Option<String>,

    /// Declared `charset` parameter, if any.
    pub charset: Option<String>,

    /// Declared filename (`filename` or `name` parameter), undecoded.
    pub filename: Option<String>,

    /// Transfer-decoded payload. Text is still in its declared charset.
    pub payload: Vec<u8>,

    /// Child parts of a multipart container or an embedded message.
    pub children: Vec<Part>,
}

impl Part {
    /// Create a leaf part with the given content type and payload.
    pub fn leaf(content_type: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.into().to_ascii_lowercase(),
            payload: payload.into(),
            ..Self::default()
        }
    }

    /// Create a container part holding `children`.
    pub fn multipart(content_type: impl Into<String>, children: Vec<Part>) -> Self {
        Self {
            content_type: content_type.into().to_ascii_lowercase(),
            children,
            ..Self::default()
        }
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn with_disposition(mut self, disposition: impl Into<String>) -> Self {
        self.disposition = Some(disposition.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// `true` iff the disposition's primary token is `attachment`, whatever
    /// the content type.
    pub fn is_attachment(&self) -> bool {
        self.disposition
            .as_deref()
            .and_then(|d| d.split(';').next())
            .is_some_and(|token| token.trim().eq_ignore_ascii_case("attachment"))
    }

    /// `true` for containers (`multipart/*` or an embedded message with children).
    pub fn is_multipart(&self) -> bool {
        self.content_type.starts_with("multipart/") || !self.children.is_empty()
    }

    pub fn is_plain_text(&self) -> bool {
        self.content_type == "text/plain"
    }

    pub fn is_html(&self) -> bool {
        self.content_type == "text/html"
    }

    /// Depth-first, document-order traversal of this part and all descendants.
    ///
    /// Every node is yielded exactly once, containers included.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

/// Iterator returned by [`Part::walk`].
pub struct Walk<'a> {
    stack: Vec<&'a Part>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Part;

    fn next(&mut self) -> Option<Self::Item> {
        let part = self.stack.pop()?;
        self.stack.extend(part.children.iter().rev());
        Some(part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_classification_ignores_content_type() {
        let text = Part::leaf("text/plain", "hi").with_disposition("ATTACHMENT");
        assert!(text.is_attachment());

        let inline = Part::leaf("image/png", vec![1u8, 2]).with_disposition("inline");
        assert!(!inline.is_attachment());

        let none = Part::leaf("application/pdf", vec![1u8]);
        assert!(!none.is_attachment());
    }

    #[test]
    fn test_disposition_with_parameters() {
        let part = Part::leaf("image/png", vec![0u8]).with_disposition("attachment; filename=a.png");
        assert!(part.is_attachment());
    }

    #[test]
    fn test_walk_is_depth_first_in_document_order() {
        let tree = Part::multipart(
            "multipart/mixed",
            vec![
                Part::multipart(
                    "multipart/alternative",
                    vec![Part::leaf("text/plain", "a"), Part::leaf("text/html", "b")],
                ),
                Part::leaf("image/png", vec![0u8]),
            ],
        );
        let types: Vec<&str> = tree.walk().map(|p| p.content_type.as_str()).collect();
        assert_eq!(
            types,
            vec![
                "multipart/mixed",
                "multipart/alternative",
                "text/plain",
                "text/html",
                "image/png"
            ]
        );
    }

    #[test]
    fn test_single_part_is_not_multipart() {
        assert!(!Part::leaf("text/plain", "x").is_multipart());
        assert!(Part::multipart("multipart/mixed", Vec::new()).is_multipart());
    }
}
