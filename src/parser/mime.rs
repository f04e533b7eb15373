//! MIME message parsing: raw fetched bytes → [`Message`] part tree.
//!
//! `mail-parser` does the structural work (boundaries, nesting, header
//! parameters). Text payloads are re-read from the raw message and only
//! transfer-decoded, so that charset handling stays with the content
//! extractor.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use mail_parser::{MessageParser, MimeHeaders, PartType};

use crate::error::{AutoblogError, Result};
use crate::model::message::{Message, Part};
use crate::parser::header;

/// Maximum nesting of embedded messages followed before giving up on descent.
const MAX_DEPTH: usize = 10;

/// Parse a complete raw message (headers + body) into a [`Message`].
pub fn parse_message(raw_message: &[u8]) -> Result<Message> {
    let raw_message = raw_message
        .strip_prefix(&[0xEF, 0xBB, 0xBF])
        .unwrap_or(raw_message);

    let parsed = MessageParser::default()
        .parse(raw_message)
        .ok_or_else(|| AutoblogError::MimeError("message could not be parsed".into()))?;

    let root = convert_message(&parsed, 0)
        .ok_or_else(|| AutoblogError::MimeError("message has no parts".into()))?;

    Ok(Message {
        subject: header::header_value(raw_message, "subject"),
        date: header::header_value(raw_message, "date"),
        root,
    })
}

fn convert_message(msg: &mail_parser::Message<'_>, depth: usize) -> Option<Part> {
    convert_part(msg, 0, depth)
}

fn convert_part(msg: &mail_parser::Message<'_>, part_id: usize, depth: usize) -> Option<Part> {
    let part = msg.parts.get(part_id)?;

    let content_type = part
        .content_type()
        .map(|ct| match ct.subtype() {
            Some(sub) => format!("{}/{}", ct.ctype(), sub),
            None => ct.ctype().to_string(),
        })
        .unwrap_or_else(|| "text/plain".to_string())
        .to_ascii_lowercase();

    let mut node = Part {
        charset: part
            .content_type()
            .and_then(|ct| ct.attribute("charset"))
            .map(String::from),
        disposition: part.content_disposition().map(|d| d.ctype().to_string()),
        filename: part.attachment_name().map(String::from),
        content_type,
        ..Part::default()
    };

    match &part.body {
        PartType::Multipart(children) => {
            node.children = children
                .iter()
                .filter_map(|&child| convert_part(msg, child, depth))
                .collect();
        }
        PartType::Message(nested) if !node.is_attachment() && depth < MAX_DEPTH => {
            node.children = convert_message(nested, depth + 1).into_iter().collect();
        }
        PartType::Text(text) | PartType::Html(text) => {
            let raw = msg
                .raw_message
                .get(part.offset_body as usize..part.offset_end as usize);
            match raw.and_then(|r| transfer_decode(r, part.content_transfer_encoding())) {
                Some(bytes) => node.payload = bytes,
                None => {
                    // Already decoded to UTF-8 by the parser.
                    node.payload = text.as_bytes().to_vec();
                    node.charset = Some("utf-8".to_string());
                }
            }
        }
        PartType::Binary(_) | PartType::InlineBinary(_) | PartType::Message(_) => {
            node.payload = part.contents().to_vec();
        }
    }

    Some(node)
}

/// Undo the `Content-Transfer-Encoding` of a raw body.
///
/// Returns `None` if a base64 body is corrupt.
fn transfer_decode(raw: &[u8], encoding: Option<&str>) -> Option<Vec<u8>> {
    match encoding.map(|e| e.trim().to_ascii_lowercase()).as_deref() {
        Some("base64") => {
            let cleaned: Vec<u8> = raw
                .iter()
                .copied()
                .filter(|b| !b.is_ascii_whitespace())
                .collect();
            STANDARD.decode(&cleaned).ok()
        }
        Some("quoted-printable") => Some(decode_quoted_printable(raw)),
        _ => Some(raw.to_vec()),
    }
}

/// Decode a quoted-printable body (RFC 2045 §6.7).
///
/// Malformed escapes are kept literally.
fn decode_quoted_printable(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] != b'=' {
            out.push(raw[i]);
            i += 1;
            continue;
        }
        match (raw.get(i + 1), raw.get(i + 2)) {
            // Soft line breaks
            (Some(b'\r'), Some(b'\n')) => i += 3,
            (Some(b'\n'), _) => i += 2,
            (Some(&hi), Some(&lo)) => match (hex_val(hi), hex_val(lo)) {
                (Some(hi), Some(lo)) => {
                    out.push((hi << 4) | lo);
                    i += 3;
                }
                _ => {
                    out.push(b'=');
                    i += 1;
                }
            },
            _ => {
                out.push(b'=');
                i += 1;
            }
        }
    }
    out
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
