//! Message types at the two ends of the pipeline.

use chrono::{DateTime, Utc};

use super::address::EmailAddress;

/// A single message as read from the MBOX, before any cleaning.
///
/// Produced once by the parser and consumed once by the pipeline;
/// never mutated.
#[derive(Debug, Clone)]
pub struct RawMessage {
    /// Sender parsed from the first `From:` header.
    pub sender: EmailAddress,

    /// Parsed `Date:` header. `None` when the header is absent or
    /// unparseable; such messages sort (and classify) as the Unix epoch.
    pub date: Option<DateTime<Utc>>,

    /// Decoded subject line (RFC 2047 encoded-words resolved).
    pub subject: String,

    /// Charset-decoded plain-text body. May be empty.
    pub body: String,
}

impl RawMessage {
    /// The key used for the ascending date sort of the input stream.
    ///
    /// Messages without a parseable date use the epoch placeholder so the
    /// sort stays total and deterministic, and they group into the epoch
    /// winter chapter rather than being dropped.
    pub fn sort_date(&self) -> DateTime<Utc> {
        self.date.unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// A message after normalization, ready for the renderer.
///
/// Created from exactly one [`RawMessage`]; owned by the chapter that
/// contains it.
#[derive(Debug, Clone)]
pub struct NormalizedMessage {
    /// Sender display form (name, or bare address when no name was given).
    pub sender: String,

    /// Display date, e.g. `"05 Jan 2023"`.
    pub date: String,

    /// Decoded subject line.
    pub subject: String,

    /// Cleaned body with `<br>` line-break markers (double marker between
    /// paragraphs).
    pub body_html: String,
}
