//! posidex: an external-memory word-position search index
//!
//! Feed `(word id, byte offset)` pairs in corpus order to an
//! [`IndexBuilder`]; it spills sorted slices to disk as its buffer
//! fills, merges them on close, and leaves one immutable index file.
//! [`IndexReader`] opens that file and lazily pages through any word's
//! positions.

pub mod config;
pub mod error;
pub mod index;
pub mod io;

pub use config::BuilderConfig;
pub use error::{PosidexError, Result};
pub use index::{
    IndexBuilder, IndexReader, MatchBuffer, MatchCursor, SliceWriter, WordId, MAX_POSITION, SHIFT,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
