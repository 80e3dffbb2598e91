//! smartpaste - format selected text and append it to Markdown notes.
//!
//! The formatting core (`markup`, `format`, `sequence`, `organize`) is pure:
//! it takes and returns strings. `vault` and `config` are the file-backed
//! adapters the command line drives it through.

pub mod config;
pub mod format;
pub mod markup;
pub mod organize;
pub mod sequence;
pub mod vault;

#[cfg(test)]
mod tests;
