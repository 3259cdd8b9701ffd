//! Command line tooling for a folio content tree: listing, inspection,
//! consistency checks and feed/sitemap export.

pub mod cli;
pub mod commands;
pub mod utils;
