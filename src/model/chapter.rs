//! Seasonal chapter grouping.

use super::message::NormalizedMessage;

/// A named group of messages covering one season.
///
/// Chapters are created the first time a message maps to an unseen season
/// label and only ever grow by appending; they are never merged, re-sorted,
/// or renamed. In-chapter order is the order messages were consumed from
/// the date-sorted input stream, not a secondary sort.
#[derive(Debug, Clone)]
pub struct Chapter {
    /// Season label, e.g. `"Winter '22 - '23"`. Unique within a book.
    pub name: String,
    /// Messages in processing order.
    pub messages: Vec<NormalizedMessage>,
}

impl Chapter {
    /// Create a chapter holding its first message.
    pub fn new(name: impl Into<String>, first: NormalizedMessage) -> Self {
        Self {
            name: name.into(),
            messages: vec![first],
        }
    }
}
