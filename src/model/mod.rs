//! Core data model types: messages, sender addresses, and chapters.

pub mod address;
pub mod chapter;
pub mod message;
