//! LSP surface for movesafe.
//!
//! Turns movesafe's warning-then-notes diagnostic stream into
//! `textDocument/publishDiagnostics` payloads. Transport is left to the host.

pub mod convert;

pub use convert::{ClientCapabilities, SOURCE, group_by_document, to_lsp_diagnostic};
