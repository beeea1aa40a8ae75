//! Body normalization: turns a selected plain-text body into the HTML
//! line-break form the renderer embeds in the book.
//!
//! The pipeline runs in a fixed order: collapse blank-line runs, reflow
//! hard-wrapped prose (see [`wrap`]), convert newlines to `<br>` markers,
//! then strip a trailing mailing-list separator or date stamp.

pub mod wrap;

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

pub use wrap::{is_hard_wrapped, WrapConfig};

fn newline_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("valid regex"))
}

fn space_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" {2,}").expect("valid regex"))
}

/// Normalize a message body for embedding in the book.
///
/// The result contains no raw newlines; line structure survives only as
/// `<br>` markers, with paragraph breaks rendered as `<br><br>`. Reflow
/// joins lines within a paragraph only; blank-line boundaries between
/// paragraphs always survive.
pub fn normalize_body(body: &str, cfg: &WrapConfig) -> String {
    if body.trim().is_empty() {
        return String::new();
    }

    let mut text = body.replace("\r\n", "\n").replace('\r', "\n");
    text = newline_runs().replace_all(&text, "\n\n").into_owned();

    if is_hard_wrapped(&text, cfg) {
        text = reflow(&text);
    }

    render_breaks(&text)
}

/// Join hard-wrapped lines back into flowed paragraphs. Blank lines keep
/// their role as paragraph breaks; everything else becomes one line per
/// paragraph with single spaces between the joined pieces.
fn reflow(text: &str) -> String {
    let paragraphs: Vec<String> = text
        .split("\n\n")
        .map(|para| {
            let joined = para.replace('\n', " ");
            space_runs().replace_all(&joined, " ").into_owned()
        })
        .collect();
    paragraphs.join("\n\n")
}

/// Replace newlines with `<br>` markers and blank a trailing separator or
/// date-stamp line. Both checks look only at the final line; earlier
/// separators and dates are content and stay.
fn render_breaks(text: &str) -> String {
    let with_markers = text.replace('\n', "<br>\n");
    let mut lines: Vec<String> = with_markers.lines().map(str::to_string).collect();

    if let Some(last) = lines.last_mut() {
        if last.starts_with("----") {
            debug!("Stripped trailing separator line");
            last.clear();
        }
    }
    if let Some(last) = lines.last_mut() {
        if !last.is_empty() && parses_as_date(last) {
            debug!("Stripped trailing date line");
            last.clear();
        }
    }

    lines.concat()
}

/// Whether a rendered line is nothing but a date stamp. The `<br>` marker
/// the rendering step may have appended is stripped before parsing.
fn parses_as_date(line: &str) -> bool {
    let candidate = line.replace("<br>", " ");
    let candidate = candidate.trim();
    !candidate.is_empty() && dateparser::parse(candidate).is_ok()
}
