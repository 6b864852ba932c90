//! Watchlist source adapters
//!
//! Each jurisdiction publishes its list in a different shape: OFAC as
//! headerless and headered CSV sets, the UN as XML, the EU as
//! semicolon-delimited CSV with a BOM, the UK as CSV with a preamble row.
//! Every adapter here emits the same `CanonicalEntityRecord` shape, so
//! the screening engine never sees a format. Formats are dispatched by a
//! tagged variant keyed by source, not a trait hierarchy.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

mod collect;
mod eu;
mod ofac;
mod uk;
mod un;

pub mod error;
pub mod fetch;
pub mod source;

pub use error::{Error, Result};
pub use fetch::{fetch_source, FetchOptions, FetchedSource};
pub use source::{builtin_sources, FileSpec, RawFile, SourceFormat, SourceSpec};
