//! Email parsing: streaming MBOX reader, header decoding, and MIME body extraction.

pub mod header;
pub mod mbox;
pub mod mime;
