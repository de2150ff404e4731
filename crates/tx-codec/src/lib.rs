//! tx-codec: pure text codec for Sea-Bird CNV live-feed files.
//!
//! Contains:
//! - header (realistic Seasave-style header block)
//! - row (fixed-format data-row rendering and parsing)
//! - resume (last-data-row scan of an existing file)
//!
//! Everything here is stateless; the engine in `tx-sim` owns all I/O handles
//! except the read-only scan in [`resume`].

pub mod error;
pub mod header;
pub mod resume;
pub mod row;

pub use error::{CodecError, CodecResult};
pub use header::{HeaderMeta, format_header};
pub use resume::read_last_row;
pub use row::{format_row, parse_row};
