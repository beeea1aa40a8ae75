//! Book assembly: drives the per-message pipeline (reply selection,
//! normalization, season classification) and groups the survivors into
//! chapters in first-seen order.

pub mod render;

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{BookError, Result};
use crate::model::chapter::Chapter;
use crate::model::message::{NormalizedMessage, RawMessage};
use crate::normalize::{self, WrapConfig};
use crate::parser::header;
use crate::parser::mbox::MboxReader;
use crate::reply;
use crate::season;

/// Presentation options resolved from CLI flags and config defaults.
#[derive(Debug, Clone)]
pub struct BookOptions {
    /// Title on the facsimile page, in the colophon, and (by default) in
    /// the output filename.
    pub title: String,
    /// Author on the facsimile page and in the colophon.
    pub author: String,
    /// `strftime` format for the date shown above each message.
    pub date_format: String,
}

/// Counters for one build run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct BuildStats {
    /// Messages found in the archive.
    pub messages_total: u64,
    /// Messages that made it into a chapter.
    pub messages_kept: u64,
    /// Messages skipped because they could not be parsed.
    pub messages_skipped: u64,
    /// Messages dropped because nothing remained after normalization.
    pub messages_empty: u64,
    /// Chapters in the final document.
    pub chapters: u64,
    /// Size of the written HTML file.
    pub output_bytes: u64,
}

/// Per-chapter message counts for the `stats` command.
#[derive(Debug, Serialize)]
pub struct ChapterSummary {
    pub name: String,
    pub messages: u64,
}

/// Archive report for the `stats` command.
#[derive(Debug, Serialize)]
pub struct ArchiveReport {
    pub messages_total: u64,
    pub messages_kept: u64,
    pub messages_skipped: u64,
    pub messages_empty: u64,
    pub chapters: Vec<ChapterSummary>,
}

/// Build the book: read the archive, run the pipeline, write `output_path`.
pub fn build_book(
    mbox_path: &Path,
    output_path: &Path,
    opts: &BookOptions,
    config: &Config,
    progress: Option<&dyn Fn(u64, u64)>,
) -> Result<BuildStats> {
    info!(path = %mbox_path.display(), title = %opts.title, "Building book");

    let mut stats = BuildStats::default();
    let messages = collect_messages(mbox_path, config, progress, &mut stats)?;
    let chapters = aggregate(messages, opts, &config.detect, &mut stats);
    let html = render_book_html(&chapters, &opts.title, &opts.author);

    fs::write(output_path, &html).map_err(|e| BookError::io(output_path, e))?;
    stats.output_bytes = html.len() as u64;

    info!(
        chapters = stats.chapters,
        messages = stats.messages_kept,
        output = %output_path.display(),
        "Book written"
    );
    Ok(stats)
}

/// Dry-run analysis: same pipeline as [`build_book`], nothing written.
pub fn analyze(
    mbox_path: &Path,
    opts: &BookOptions,
    config: &Config,
    progress: Option<&dyn Fn(u64, u64)>,
) -> Result<ArchiveReport> {
    let mut stats = BuildStats::default();
    let messages = collect_messages(mbox_path, config, progress, &mut stats)?;
    let chapters = aggregate(messages, opts, &config.detect, &mut stats);

    Ok(ArchiveReport {
        messages_total: stats.messages_total,
        messages_kept: stats.messages_kept,
        messages_skipped: stats.messages_skipped,
        messages_empty: stats.messages_empty,
        chapters: chapters
            .iter()
            .map(|c| ChapterSummary {
                name: c.name.clone(),
                messages: c.messages.len() as u64,
            })
            .collect(),
    })
}

/// Read every message from the archive and sort by date.
///
/// Messages that cannot be parsed are logged and counted, never fatal.
/// The sort is stable, so messages sharing a timestamp keep their archive
/// order.
fn collect_messages(
    mbox_path: &Path,
    config: &Config,
    progress: Option<&dyn Fn(u64, u64)>,
    stats: &mut BuildStats,
) -> Result<Vec<RawMessage>> {
    let reader =
        MboxReader::new(mbox_path)?.with_max_message_size(config.performance.max_message_size);

    let mut messages: Vec<RawMessage> = Vec::new();
    let mut skipped: u64 = 0;
    let total = reader.for_each_message(
        &mut |offset, raw| {
            match header::parse_raw_message(raw, offset) {
                Ok(msg) => messages.push(msg),
                Err(e) => {
                    warn!(offset, error = %e, "Skipping unparseable message");
                    skipped += 1;
                }
            }
            true
        },
        progress,
    )?;

    stats.messages_total = total;
    stats.messages_skipped = skipped;

    messages.sort_by_key(RawMessage::sort_date);
    Ok(messages)
}

/// Run each message through reply selection and normalization, classify
/// its date, and group the non-empty results into chapters.
fn aggregate(
    messages: Vec<RawMessage>,
    opts: &BookOptions,
    wrap: &WrapConfig,
    stats: &mut BuildStats,
) -> Vec<Chapter> {
    let mut builder = ChapterBuilder::default();

    for msg in messages {
        let label = season::chapter_label(msg.sort_date().date_naive());
        let normalized = normalize_message(&msg, opts, wrap);

        if is_empty_content(&normalized.body_html) {
            debug!(
                sender = %msg.sender,
                subject = %msg.subject,
                "Dropping message with empty normalized body"
            );
            stats.messages_empty += 1;
            continue;
        }

        builder.push(&label, normalized);
        stats.messages_kept += 1;
    }

    let chapters = builder.into_chapters();
    stats.chapters = chapters.len() as u64;
    chapters
}

/// One message through the body pipeline.
fn normalize_message(msg: &RawMessage, opts: &BookOptions, wrap: &WrapConfig) -> NormalizedMessage {
    let content = reply::visible_content(&msg.body);
    let body_html = normalize::normalize_body(&content, wrap);

    NormalizedMessage {
        sender: msg.sender.book_name().to_string(),
        date: msg.sort_date().format(&opts.date_format).to_string(),
        subject: msg.subject.clone(),
        body_html,
    }
}

/// Whether a normalized body carries no content: nothing but break
/// markers and whitespace.
pub fn is_empty_content(body_html: &str) -> bool {
    body_html.replace("<br>", " ").trim().is_empty()
}

/// Render all chapters into the final document.
pub fn render_book_html(chapters: &[Chapter], title: &str, author: &str) -> String {
    let chapters_html: String = chapters
        .iter()
        .map(|chapter| {
            let messages_html: String = chapter
                .messages
                .iter()
                .map(|m| render::render_message(&m.subject, &m.sender, &m.date, &m.body_html))
                .collect();
            render::render_chapter(&chapter.name, &messages_html)
        })
        .collect();
    render::render_book(title, author, &chapters_html)
}

/// Groups messages into chapters, preserving the order in which chapter
/// names are first seen. Lookup is a linear scan; the chapter count is a
/// handful of seasons, so nothing faster is warranted.
#[derive(Default)]
pub struct ChapterBuilder {
    chapters: Vec<Chapter>,
}

impl ChapterBuilder {
    /// Append to the chapter named `label`, creating it on first sight.
    pub fn push(&mut self, label: &str, message: NormalizedMessage) {
        match self.chapters.iter_mut().find(|c| c.name == label) {
            Some(chapter) => chapter.messages.push(message),
            None => self.chapters.push(Chapter::new(label, message)),
        }
    }

    /// Chapters in first-seen order. Empty chapters are dropped rather
    /// than rendered as bare headings.
    pub fn into_chapters(self) -> Vec<Chapter> {
        let mut chapters = self.chapters;
        chapters.retain(|c| !c.messages.is_empty());
        chapters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(subject: &str, body_html: &str) -> NormalizedMessage {
        NormalizedMessage {
            sender: "Ana".to_string(),
            date: "05 Jan 2023".to_string(),
            subject: subject.to_string(),
            body_html: body_html.to_string(),
        }
    }

    #[test]
    fn test_chapters_keep_first_seen_order() {
        let mut builder = ChapterBuilder::default();
        builder.push("Winter '22 - '23", message("one", "a<br>"));
        builder.push("Spring '23", message("two", "b<br>"));
        builder.push("Winter '22 - '23", message("three", "c<br>"));

        let chapters = builder.into_chapters();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].name, "Winter '22 - '23");
        assert_eq!(chapters[1].name, "Spring '23");
        // In-chapter order is push order, not a re-sort.
        assert_eq!(chapters[0].messages[0].subject, "one");
        assert_eq!(chapters[0].messages[1].subject, "three");
    }

    #[test]
    fn test_is_empty_content() {
        assert!(is_empty_content(""));
        assert!(is_empty_content("   "));
        assert!(is_empty_content("<br>"));
        assert!(is_empty_content("<br><br>  <br>"));
        assert!(!is_empty_content("Hello<br>"));
        assert!(!is_empty_content("x"));
    }

    #[test]
    fn test_render_book_html_nests_messages() {
        let mut builder = ChapterBuilder::default();
        builder.push("Summer '23", message("Beach", "Sand everywhere.<br>"));
        let chapters = builder.into_chapters();

        let html = render_book_html(&chapters, "Letters", "Ana");
        assert!(html.contains("<h1>Summer '23</h1>"));
        assert!(html.contains("Beach"));
        assert!(html.contains("Sand everywhere.<br>"));
        assert!(html.contains("<title>Letters</title>"));
    }
}
