//! Integration tests for the full book pipeline: archive reading, reply
//! selection, normalization, chapter grouping, and HTML output.

use std::path::Path;

use assert_fs::prelude::*;
use predicates::prelude::*;

use mboxbook::book::{self, BookOptions};
use mboxbook::config::Config;
use mboxbook::parser::mbox::MboxReader;

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn options() -> BookOptions {
    BookOptions {
        title: "Letters".to_string(),
        author: "Ana Duarte".to_string(),
        date_format: "%d %b %Y".to_string(),
    }
}

/// Build `name` into a temporary file and return the stats and the HTML.
fn build(name: &str) -> (book::BuildStats, String) {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("book.html");
    let stats = book::build_book(&fixture(name), &out, &options(), &Config::default(), None)
        .expect("build should succeed");
    let html = std::fs::read_to_string(&out).unwrap();
    (stats, html)
}

// ─── Test 1: Parse letters.mbox → exactly 3 messages ────────────────

#[test]
fn test_parse_letters_mbox_count() {
    let reader = MboxReader::new(fixture("letters.mbox")).unwrap();
    let mut count: u64 = 0;
    reader
        .for_each_message(
            &mut |_offset, _bytes| {
                count += 1;
                true
            },
            None,
        )
        .unwrap();
    assert_eq!(count, 3, "letters.mbox should contain exactly 3 messages");
}

// ─── Test 2: Chapters appear in first-seen order of the date sort ───

#[test]
fn test_chapters_in_first_seen_order() {
    let report = book::analyze(&fixture("letters.mbox"), &options(), &Config::default(), None)
        .expect("analyze should succeed");

    assert_eq!(report.messages_total, 3);
    assert_eq!(report.messages_kept, 3);
    assert_eq!(report.messages_skipped, 0);
    assert_eq!(report.messages_empty, 0);

    assert_eq!(report.chapters.len(), 2, "two seasons → two chapters");
    assert_eq!(report.chapters[0].name, "Winter '22 - '23");
    assert_eq!(report.chapters[0].messages, 2);
    assert_eq!(report.chapters[1].name, "Spring '23");
    assert_eq!(report.chapters[1].messages, 1);
}

// ─── Test 3: Build writes the HTML book ─────────────────────────────

#[test]
fn test_build_writes_book() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let out = tmp.child("letters.html");

    let stats = book::build_book(
        &fixture("letters.mbox"),
        out.path(),
        &options(),
        &Config::default(),
        None,
    )
    .expect("build should succeed");

    out.assert(predicate::path::exists());
    out.assert(predicate::str::contains("<title>Letters</title>"));
    out.assert(predicate::str::contains("<h1>Winter '22 - '23</h1>"));
    out.assert(predicate::str::contains("<h1>Spring '23</h1>"));
    assert_eq!(stats.chapters, 2);
    assert!(stats.output_bytes > 0);
}

// ─── Test 4: In-chapter order follows the archive, chapters the sort ─

#[test]
fn test_messages_keep_archive_order_within_chapter() {
    let (_, html) = build("letters.mbox");

    // Both winter letters share a timestamp; the stable sort keeps the
    // order they appear in the archive.
    let snow = html.find("Snowed in").expect("first winter letter");
    let thaw = html.find("Re: Thaw news").expect("second winter letter");
    let crocus = html.find("Crocuses").expect("spring letter");
    assert!(snow < thaw, "winter letters should keep archive order");
    assert!(thaw < crocus, "the winter chapter should precede spring");

    let winter = html.find("<h1>Winter '22 - '23</h1>").unwrap();
    let spring = html.find("<h1>Spring '23</h1>").unwrap();
    assert!(winter < spring);
}

// ─── Test 5: Quoted history and signatures do not reach the page ────

#[test]
fn test_quoted_history_and_signature_removed() {
    let (_, html) = build("letters.mbox");

    assert!(
        html.contains("The plows finally reached us"),
        "the reply's own text should survive"
    );
    assert!(
        !html.contains("Has the road opened yet?"),
        "quoted lines should be stripped"
    );
    assert!(
        !html.contains("We are worried about the deliveries"),
        "quoted lines should be stripped"
    );
    assert!(
        !html.contains("wrote:"),
        "the quote attribution line should be stripped"
    );
}

// ─── Test 6: Hard-wrapped letters reflow, flowed letters keep breaks ─

#[test]
fn test_wrap_detection_drives_rendering() {
    let (_, html) = build("letters.mbox");

    // The first letter is wrapped at ~65 columns; its line breaks become
    // spaces, so text split across lines reads as one sentence.
    assert!(
        html.contains("half a meter of powder, the kind that creaks"),
        "wrapped letter should be reflowed into flowing text"
    );
    assert!(!html.contains("meter of<br>"));

    // The second letter is short flowed prose and keeps its breaks.
    assert!(
        html.contains("this week.<br><br>Come visit before they are gone.<br>"),
        "flowed letter should keep its line structure"
    );
}

// ─── Test 7: Formatted dates above each letter ──────────────────────

#[test]
fn test_dates_formatted_for_print() {
    let (_, html) = build("letters.mbox");
    assert!(html.contains("05 Jan 2023"));
    assert!(html.contains("10 Apr 2023"));
    assert!(html.contains("Maria Lopez"), "display name should be used");
}

// ─── Test 8: Empty MBOX → empty report, no error ────────────────────

#[test]
fn test_empty_archive() {
    let report = book::analyze(&fixture("empty.mbox"), &options(), &Config::default(), None)
        .expect("analyze should succeed on an empty archive");
    assert_eq!(report.messages_total, 0);
    assert!(report.chapters.is_empty());
}

// ─── Test 9: Dateless messages land in the epoch chapter ────────────

#[test]
fn test_dateless_messages_fall_back_to_epoch_chapter() {
    let report = book::analyze(
        &fixture("edge_cases.mbox"),
        &options(),
        &Config::default(),
        None,
    )
    .expect("analyze should succeed");

    assert_eq!(report.messages_total, 5);
    assert_eq!(report.messages_kept, 4);
    assert_eq!(report.messages_skipped, 0);
    assert_eq!(report.messages_empty, 1);

    // A missing Date header and an unparseable one both sort to the
    // epoch, so they share the first chapter.
    assert_eq!(report.chapters[0].name, "Winter '69 - '70");
    assert_eq!(report.chapters[0].messages, 2);
    assert_eq!(report.chapters[1].name, "Summer '23");
    assert_eq!(report.chapters[1].messages, 1);
    assert_eq!(report.chapters[2].name, "Winter '23 - '24");
    assert_eq!(report.chapters[2].messages, 1);
}

// ─── Test 10: Blank messages are dropped, their chapter survives ────

#[test]
fn test_blank_message_dropped() {
    let (stats, html) = build("edge_cases.mbox");
    assert_eq!(stats.messages_empty, 1);
    assert!(
        !html.contains("Silence"),
        "a message with no body should not get a page"
    );
    // The other July message still carries the summer chapter.
    assert!(html.contains("<h1>Summer '23</h1>"));
}

// ─── Test 11: Trailing date stamps and separators are removed ───────

#[test]
fn test_trailing_stamps_removed() {
    let (_, html) = build("edge_cases.mbox");

    assert!(html.contains("See you on Sunday."));
    assert!(
        !html.contains("March 3, 2021"),
        "a date as the last line is an export stamp, not content"
    );

    assert!(html.contains("The year closes quietly here."));
    assert!(
        !html.contains("----"),
        "a separator as the last line should be removed"
    );
}

// ─── Test 12: Encoded headers are decoded before rendering ──────────

#[test]
fn test_encoded_headers_decoded() {
    let (_, html) = build("edge_cases.mbox");
    assert!(
        html.contains("Café con leña"),
        "RFC 2047 subject should be decoded"
    );
    assert!(
        html.contains("Elena Muñoz"),
        "RFC 2047 display name should be decoded"
    );
}

// ─── Test 13: Epoch fallbacks keep archive order and render a date ──

#[test]
fn test_epoch_messages_keep_archive_order() {
    let (_, html) = build("edge_cases.mbox");

    let undated = html.find("Undated postcard").expect("dateless letter");
    let mystery = html.find("Mystery date").expect("unparseable-date letter");
    assert!(
        undated < mystery,
        "messages sharing the epoch fallback should keep archive order"
    );

    assert!(html.contains("01 Jan 1970"), "epoch date should be shown");
    assert!(
        html.contains("carmen@example.com"),
        "a sender with no display name falls back to the address"
    );
}
