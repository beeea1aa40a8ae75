//! `mboxbook` — turn an MBOX mail archive into a printable HTML book.
//!
//! Messages are read from the archive, dated and sorted, stripped down to
//! the text their authors actually wrote (quotes, signatures and trailing
//! stamps removed, hard wraps reflowed), grouped into seasonal chapters,
//! and rendered into a single HTML document.

pub mod book;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod reply;
pub mod season;
