//! Index builder: buffered adds, slice flushes, and the closing merge
//!
//! Input pairs arrive in corpus order, so every position recorded in
//! slice i precedes every position recorded in slice i+1 for the same
//! word. The merge therefore concatenates slices in creation order per
//! word instead of running a priority queue; the slice writer's bucket
//! check drops duplicates that straddle a slice boundary.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::config::BuilderConfig;
use crate::error::{PosidexError, Result};
use crate::index::buffer::MatchBuffer;
use crate::index::reader::IndexReader;
use crate::index::slice::SliceWriter;
use crate::index::types::{WordId, MAX_POSITION};
use crate::io::CountingWriter;

/// Suffix appended to the output path to name the scratch directory
const WORKING_SUFFIX: &str = ".Working";

/// Streaming builder for one index file
///
/// Feed `(word, position)` pairs with [`add`](IndexBuilder::add) and
/// call [`close`](IndexBuilder::close) once; the index appears at the
/// output path and the scratch directory is removed. After a failed
/// close the scratch directory is left in place so its slices can be
/// inspected.
pub struct IndexBuilder {
    output_path: PathBuf,
    working_dir: PathBuf,
    word_count: u32,
    buffer: MatchBuffer,
    /// Most recent position accepted per word, surviving flushes so an
    /// exact repeat arriving right after a flush is still dropped
    last_added: Vec<Option<u64>>,
    config: BuilderConfig,
    block_count: u32,
    positions_seen: u64,
    positions_recorded: u64,
}

impl IndexBuilder {
    /// Create a builder writing to `output_path`, with slices
    /// accumulating in a sibling `<output_path>.Working` directory
    pub fn create<P: AsRef<Path>>(
        output_path: P,
        word_count: u32,
        config: BuilderConfig,
    ) -> Result<Self> {
        let output_path = output_path.as_ref().to_path_buf();
        let mut working = output_path.clone().into_os_string();
        working.push(WORKING_SUFFIX);
        let working_dir = PathBuf::from(working);
        fs::create_dir_all(&working_dir)?;

        let buffer = MatchBuffer::new(word_count, config.buffer_entries);
        Ok(Self {
            output_path,
            working_dir,
            word_count,
            buffer,
            last_added: vec![None; word_count as usize],
            config,
            block_count: 0,
            positions_seen: 0,
            positions_recorded: 0,
        })
    }

    pub fn word_count(&self) -> u32 {
        self.word_count
    }

    /// Number of `add` calls accepted so far
    pub fn positions_seen(&self) -> u64 {
        self.positions_seen
    }

    /// `positions_seen` minus the adds dropped as exact duplicates
    pub fn positions_recorded(&self) -> u64 {
        self.positions_recorded
    }

    /// Slices flushed so far
    pub fn slice_count(&self) -> u32 {
        self.block_count
    }

    /// Record that `word` occurs at byte offset `position`
    ///
    /// Calls must arrive in corpus order: positions are non-decreasing
    /// within any single word. An add repeating the word's previous
    /// position exactly is dropped here; positions that collide only
    /// after shifting are dropped by the slice writer.
    pub fn add(&mut self, word: WordId, position: u64) -> Result<()> {
        if word >= self.word_count {
            return Err(PosidexError::WordOutOfRange {
                word,
                word_count: self.word_count,
            });
        }
        if position > MAX_POSITION {
            return Err(PosidexError::PositionOverflow(position));
        }

        self.positions_seen += 1;
        if self.last_added[word as usize] == Some(position) {
            return Ok(());
        }
        self.buffer.push(word, position);
        self.last_added[word as usize] = Some(position);
        self.positions_recorded += 1;

        if self.buffer.is_full() {
            self.flush()?;
        }
        Ok(())
    }

    /// Flush remaining entries, merge all slices into the output file,
    /// and remove the working directory
    pub fn close(mut self) -> Result<()> {
        if !self.buffer.is_empty() {
            self.flush()?;
        }
        self.merge()?;
        fs::remove_dir_all(&self.working_dir)?;
        Ok(())
    }

    fn slice_path(&self, block: u32) -> PathBuf {
        self.working_dir.join(format!("{}.idx", block))
    }

    fn flush(&mut self) -> Result<()> {
        let path = self.slice_path(self.block_count);
        let entries = self.buffer.len();

        let sink =
            CountingWriter::with_capacity(self.config.write_buffer_bytes, File::create(&path)?);
        let mut writer = SliceWriter::new(sink, self.word_count);
        for word in 0..self.word_count {
            for position in self.buffer.chain(word) {
                writer.write_position(position)?;
            }
            writer.next_word()?;
        }
        writer.finish()?;

        tracing::debug!("flushed slice {} ({} entries)", path.display(), entries);
        self.block_count += 1;
        self.buffer.clear();
        Ok(())
    }

    fn merge(&mut self) -> Result<()> {
        if self.block_count == 1 {
            // One slice already has the final layout
            fs::rename(self.slice_path(0), &self.output_path)?;
            return Ok(());
        }

        let mut readers = Vec::with_capacity(self.block_count as usize);
        for block in 0..self.block_count {
            readers.push(IndexReader::open(self.slice_path(block))?);
        }

        let sink = CountingWriter::with_capacity(
            self.config.write_buffer_bytes,
            File::create(&self.output_path)?,
        );
        let mut writer = SliceWriter::new(sink, self.word_count);
        let mut page = vec![0u64; self.config.page_entries];

        for word in 0..self.word_count {
            for reader in &mut readers {
                let mut cursor = reader.find(word)?;
                while !cursor.done() {
                    let produced = cursor.page(&mut page)?;
                    for &position in &page[..produced] {
                        writer.write_position(position)?;
                    }
                }
            }
            writer.next_word()?;
        }
        writer.finish()?;

        tracing::debug!(
            "merged {} slices into {}",
            self.block_count,
            self.output_path.display()
        );
        Ok(())
    }
}
