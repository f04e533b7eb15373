//! Save attachment parts next to the posts.

use std::path::{Path, PathBuf};

use crate::error::{AutoblogError, Result};
use crate::model::message::Part;
use crate::parser::header::decode_encoded_words;

use super::slug::slugify_or;

/// Write an attachment part into `attachments_dir`.
///
/// The declared filename is decoded and slugified; an existing file of the
/// same name is never overwritten. Returns `None` when
/// the part declares no filename.
pub fn save_attachment(part: &Part, attachments_dir: &Path) -> Result<Option<PathBuf>> {
    let Some(raw_name) = part.filename.as_deref() else {
        tracing::debug!(
            content_type = %part.content_type,
            "Attachment without filename, skipping"
        );
        return Ok(None);
    };

    let filename = slugify_or(&decode_encoded_words(raw_name), "attachment");
    let path = unique_path(attachments_dir, &filename);

    std::fs::write(&path, &part.payload).map_err(|e| AutoblogError::io(&path, e))?;
    tracing::info!(
        path = %path.display(),
        size = %humansize::format_size(part.payload.len(), humansize::BINARY),
        "Saved attachment"
    );
    Ok(Some(path))
}

/// First free path among `name`, `1_name`, `2_name`, … inside `dir`.
///
/// The check is not atomic; concurrent runs could race.
fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let mut candidate = dir.join(name);
    let mut counter = 1u32;
    while candidate.exists() {
        candidate = dir.join(format!("{counter}_{name}"));
        counter += 1;
    }
    candidate
}
