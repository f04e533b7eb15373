//! Render and write markdown posts with TOML front matter.

use std::fmt::Write as _;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, FixedOffset};

use crate::error::{AutoblogError, Result};

use super::slug::slugify_or;

/// Everything needed to render one post.
#[derive(Debug, Clone)]
pub struct PostDraft<'a> {
    /// Decoded subject, used verbatim as the title.
    pub subject: &'a str,
    pub date: DateTime<FixedOffset>,
    pub body: &'a str,
    /// Saved attachment paths, linked relative to the posts directory.
    pub attachments: &'a [PathBuf],
}

/// `YYYY-MM-DD-HH-MM-SS-<slug>.md`, with `untitled` for an unsluggable subject.
pub fn post_filename(subject: &str, date: &DateTime<FixedOffset>) -> String {
    format!(
        "{}-{}.md",
        date.format("%Y-%m-%d-%H-%M-%S"),
        slugify_or(subject, "untitled")
    )
}

/// Render the markdown document for `draft`.
pub fn render_post(draft: &PostDraft<'_>, posts_dir: &Path) -> String {
    let mut doc = String::new();
    doc.push_str("+++\n");
    let _ = writeln!(doc, "title = \"{}\"", escape_toml(draft.subject));
    let _ = writeln!(doc, "date = \"{}\"", draft.date.format("%Y-%m-%dT%H:%M:%S%z"));
    doc.push_str("draft = false\n");
    doc.push_str("+++\n\n");

    let body = draft.body.trim_end();
    if !body.is_empty() {
        doc.push_str(body);
        doc.push('\n');
    }

    if !draft.attachments.is_empty() {
        doc.push_str("\n## Attachments\n\n");
        for path in draft.attachments {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let _ = writeln!(doc, "![{}]({})", name, relative_link(path, posts_dir));
        }
    }

    doc
}

/// Write `draft` into `posts_dir` and return the created file.
///
/// An existing post with the same name is kept; the new one gets a `-1`,
/// `-2`, … suffix.
pub fn write_post(draft: &PostDraft<'_>, posts_dir: &Path) -> Result<PathBuf> {
    let path = unique_post_path(posts_dir, &post_filename(draft.subject, &draft.date));
    let doc = render_post(draft, posts_dir);

    std::fs::write(&path, doc).map_err(|e| AutoblogError::io(&path, e))?;
    tracing::info!(path = %path.display(), "Created post");
    Ok(path)
}

fn unique_post_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let stem = filename.strip_suffix(".md").unwrap_or(filename);
    let mut counter = 1u32;
    loop {
        let candidate = dir.join(format!("{stem}-{counter}.md"));
        if !candidate.exists() {
            tracing::warn!(
                wanted = filename,
                path = %candidate.display(),
                "Post name already taken"
            );
            return candidate;
        }
        counter += 1;
    }
}

/// Escape a string for a TOML basic (double-quoted) string.
fn escape_toml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Path of `target` relative to `base`, `/`-separated for use in markdown.
fn relative_link(target: &Path, base: &Path) -> String {
    let target = std::path::absolute(target).unwrap_or_else(|_| target.to_path_buf());
    let base = std::path::absolute(base).unwrap_or_else(|_| base.to_path_buf());

    let target_parts: Vec<Component<'_>> = target.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();
    let common = target_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let ups = std::iter::repeat("..".to_string()).take(base_parts.len() - common);
    let downs = target_parts[common..]
        .iter()
        .map(|c| c.as_os_str().to_string_lossy().into_owned());
    ups.chain(downs).collect::<Vec<_>>().join("/")
}
