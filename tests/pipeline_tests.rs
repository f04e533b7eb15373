//! End-to-end runs against the in-memory server.

mod common;

use autoblog::mailbox::MailboxDriver;
use autoblog::model::post::MessageOutcome;

use common::{config_in, credentials, file_names, FakeServer, PLAIN_WITH_ATTACHMENT};

// ─── Plain body with one attachment ─────────────────────────────────

#[test]
fn test_plain_message_with_attachment_becomes_post() {
    let dir = tempfile::tempdir().unwrap();
    let server = FakeServer::with_messages(&[PLAIN_WITH_ATTACHMENT]);
    let driver = MailboxDriver::new(config_in(dir.path()), server.clone());

    let summary = driver.run(&credentials()).unwrap();
    assert_eq!(summary.found, 1);
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.skipped, 0);

    let posts_dir = dir.path().join("posts");
    assert_eq!(
        file_names(&posts_dir),
        vec!["2024-01-02-03-04-05-hello-world.md".to_string()]
    );
    let attachments_dir = posts_dir.join("attachments");
    assert_eq!(file_names(&attachments_dir), vec!["catpng".to_string()]);
    assert_eq!(
        std::fs::read(attachments_dir.join("catpng")).unwrap(),
        b"\x89PNG\r\n\x1a\n"
    );

    let doc = std::fs::read_to_string(posts_dir.join("2024-01-02-03-04-05-hello-world.md")).unwrap();
    assert!(doc.contains("title = \"Hello World\"\n"));
    assert!(doc.contains("date = \"2024-01-02T03:04:05+0000\"\n"));
    assert!(doc.contains("Hello from the mailbox."));
    assert_eq!(doc.matches("## Attachments").count(), 1);
    assert_eq!(doc.matches("![").count(), 1);
    assert!(doc.contains("![catpng](attachments/catpng)"));

    assert!(server.is_seen(1));
    assert!(server.logged_out());
}

// ─── Second run finds nothing new ───────────────────────────────────

#[test]
fn test_second_run_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let server = FakeServer::with_messages(&[PLAIN_WITH_ATTACHMENT]);
    let driver = MailboxDriver::new(config_in(dir.path()), server.clone());

    driver.run(&credentials()).unwrap();
    let posts = file_names(&dir.path().join("posts"));
    let attachments = file_names(&dir.path().join("posts").join("attachments"));

    let summary = driver.run(&credentials()).unwrap();
    assert_eq!(summary.found, 0);
    assert!(summary.outcomes.is_empty());
    assert_eq!(file_names(&dir.path().join("posts")), posts);
    assert_eq!(
        file_names(&dir.path().join("posts").join("attachments")),
        attachments
    );
    assert_eq!(server.connects(), 2);
}

// ─── Empty mailbox ──────────────────────────────────────────────────

#[test]
fn test_empty_mailbox_creates_dirs_only() {
    let dir = tempfile::tempdir().unwrap();
    let server = FakeServer::default();
    let driver = MailboxDriver::new(config_in(dir.path()), server.clone());

    let summary = driver.run(&credentials()).unwrap();
    assert_eq!(summary.found, 0);
    assert!(dir.path().join("posts").join("attachments").is_dir());
    assert!(file_names(&dir.path().join("posts")).is_empty());
    assert!(server.logged_out());
}

// ─── Summary serialization ──────────────────────────────────────────

#[test]
fn test_summary_lists_written_posts() {
    let dir = tempfile::tempdir().unwrap();
    let server = FakeServer::with_messages(&[PLAIN_WITH_ATTACHMENT, PLAIN_WITH_ATTACHMENT]);
    let driver = MailboxDriver::new(config_in(dir.path()), server);

    let summary = driver.run(&credentials()).unwrap();
    assert_eq!(summary.processed, 2);

    // Same subject and date: the second post gets a suffix instead of overwriting.
    let posts: Vec<_> = summary.posts().cloned().collect();
    assert_eq!(posts.len(), 2);
    assert!(posts[1].ends_with("2024-01-02-03-04-05-hello-world-1.md"));
    assert_eq!(
        file_names(&dir.path().join("posts").join("attachments")),
        vec!["1_catpng".to_string(), "catpng".to_string()]
    );

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["processed"], 2);
    assert_eq!(json["outcomes"][0]["status"], "posted");
    assert_eq!(json["outcomes"][0]["id"], "1");
    assert!(matches!(summary.outcomes[1], MessageOutcome::Posted { .. }));
}
