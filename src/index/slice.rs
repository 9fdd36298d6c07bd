//! Slice writer: delta-encoded position streams followed by the offset
//! directory and word-count trailer
//!
//! Slices and the final index share one layout, so this writer produces
//! both. All multi-byte integers are little-endian.

use std::io::Write;

use crate::error::{PosidexError, Result};
use crate::index::types::{MAX_POSITION, SHIFT};
use crate::io::varint::write_varint;
use crate::io::CountingWriter;

/// Streams one slice or index file
///
/// Positions arrive grouped by word: all of word 0's positions, then
/// [`next_word`](SliceWriter::next_word), then word 1's, and so on.
/// `next_word` must be called exactly once per word, including empty
/// ones, before [`finish`](SliceWriter::finish).
pub struct SliceWriter<W: Write> {
    sink: CountingWriter<W>,
    /// Absolute byte offset where each word's delta stream begins
    offsets: Vec<u32>,
    word_count: u32,
    current_word: u32,
    /// Shifted bucket of the last position emitted for the current
    /// word; `None` until the word's first position arrives
    last_bucket: Option<u64>,
}

impl<W: Write> SliceWriter<W> {
    pub fn new(sink: CountingWriter<W>, word_count: u32) -> Self {
        Self {
            sink,
            offsets: vec![0; word_count as usize],
            word_count,
            current_word: 0,
            last_bucket: None,
        }
    }

    /// Append `position` to the current word
    ///
    /// Positions must be non-decreasing within a word; a position whose
    /// shifted bucket repeats the previous one is silently dropped.
    pub fn write_position(&mut self, position: u64) -> Result<()> {
        if position > MAX_POSITION {
            return Err(PosidexError::PositionOverflow(position));
        }
        let bucket = position >> SHIFT;
        match self.last_bucket {
            None => {
                write_varint(&mut self.sink, bucket)?;
            }
            Some(prev) if bucket < prev => {
                return Err(PosidexError::OutOfOrder {
                    word: self.current_word,
                    prev,
                    got: bucket,
                });
            }
            Some(prev) if bucket == prev => return Ok(()),
            Some(prev) => {
                write_varint(&mut self.sink, bucket - prev)?;
            }
        }
        self.last_bucket = Some(bucket);
        Ok(())
    }

    /// Close out the current word and record where the next one starts
    pub fn next_word(&mut self) -> Result<()> {
        self.last_bucket = None;
        self.current_word += 1;
        if self.current_word < self.word_count {
            let offset = self.sink.bytes_written();
            self.offsets[self.current_word as usize] =
                u32::try_from(offset).map_err(|_| PosidexError::RegionOverflow(offset))?;
        }
        Ok(())
    }

    /// Write the directory and trailer, flush, and hand back the sink
    pub fn finish(mut self) -> Result<CountingWriter<W>> {
        if self.current_word != self.word_count {
            return Err(PosidexError::Incomplete {
                advanced: self.current_word,
                expected: self.word_count,
            });
        }
        for &offset in &self.offsets {
            self.sink.write_u32_le(offset)?;
        }
        self.sink.write_u32_le(self.word_count)?;
        self.sink.flush()?;
        Ok(self.sink)
    }
}
