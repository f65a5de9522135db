//! Analytics dashboard for precomputed web log histograms.
//!
//! Pages are driven by state in the URL fragment (`#period=all&uri_base=...`):
//! the state names a stats file, the stats file holds histograms, and the
//! histograms become HTML tables.

pub mod cli;
pub mod config;
pub mod dom;
pub mod error;
pub mod escape;
pub mod fetch;
pub mod format;
pub mod histogram;
pub mod page;
pub mod render;
pub mod state;
pub mod web;
