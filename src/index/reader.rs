//! Index reader: opens a slice or index file and hands out paged
//! per-word cursors

use std::fs::File;
use std::path::Path;

use crate::error::{PosidexError, Result};
use crate::index::types::{WordId, MAX_BUCKET, SHIFT};
use crate::io::varint::read_varint;
use crate::io::CountingReader;

/// Random-access reader over one slice or index file
///
/// Opening reads only the trailer and directory; position streams are
/// decoded lazily as cursors page through them.
#[derive(Debug)]
pub struct IndexReader {
    src: CountingReader<File>,
    /// `word_count + 1` entries; the last is where the directory begins
    offsets: Vec<u64>,
    word_count: u32,
}

impl IndexReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let mut src = CountingReader::new(file);

        let file_len = src.seek_from_end(0)?;
        if file_len < 4 {
            return Err(PosidexError::Corrupt(
                "missing word-count trailer".to_string(),
            ));
        }
        src.seek_to(file_len - 4)?;
        let word_count = src.read_u32_le()?;

        let tail_bytes = 4 * (u64::from(word_count) + 1);
        if file_len < tail_bytes {
            return Err(PosidexError::Corrupt(format!(
                "directory for {} words does not fit in a {}-byte file",
                word_count, file_len
            )));
        }
        let dir_start = file_len - tail_bytes;

        src.seek_to(dir_start)?;
        let mut offsets = Vec::with_capacity(word_count as usize + 1);
        for _ in 0..word_count {
            offsets.push(u64::from(src.read_u32_le()?));
        }
        offsets.push(dir_start);

        if word_count > 0 && offsets[0] != 0 {
            return Err(PosidexError::Corrupt(
                "first word does not start at byte 0".to_string(),
            ));
        }
        if offsets.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(PosidexError::Corrupt(
                "directory offsets are not monotone".to_string(),
            ));
        }

        Ok(Self {
            src,
            offsets,
            word_count,
        })
    }

    pub fn word_count(&self) -> u32 {
        self.word_count
    }

    /// Cursor over `word`'s positions
    pub fn find(&mut self, word: WordId) -> Result<MatchCursor<'_>> {
        if word >= self.word_count {
            return Err(PosidexError::WordOutOfRange {
                word,
                word_count: self.word_count,
            });
        }
        let start = self.offsets[word as usize];
        let end = self.offsets[word as usize + 1];
        self.src.seek_to(start)?;
        Ok(MatchCursor {
            src: &mut self.src,
            end,
            last_bucket: 0,
        })
    }
}

/// Pages through one word's decoded positions
///
/// A word with no positions yields a cursor that is done from the
/// start; there is no separate "no matches" representation.
#[derive(Debug)]
pub struct MatchCursor<'a> {
    src: &'a mut CountingReader<File>,
    /// Byte offset where this word's delta stream ends
    end: u64,
    last_bucket: u64,
}

impl MatchCursor<'_> {
    pub fn done(&self) -> bool {
        self.src.position() >= self.end
    }

    /// Decode up to `out.len()` further positions into `out`, returning
    /// how many were produced
    pub fn page(&mut self, out: &mut [u64]) -> Result<usize> {
        let mut produced = 0;
        while produced < out.len() && self.src.position() < self.end {
            let (delta, _) = read_varint(self.src)?;
            if self.src.position() > self.end {
                return Err(PosidexError::Corrupt(
                    "varint runs past the word's byte range".to_string(),
                ));
            }
            self.last_bucket = self
                .last_bucket
                .checked_add(delta)
                .filter(|bucket| *bucket <= MAX_BUCKET)
                .ok_or_else(|| {
                    PosidexError::Corrupt("decoded bucket exceeds the position limit".to_string())
                })?;
            out[produced] = self.last_bucket << SHIFT;
            produced += 1;
        }
        Ok(produced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::slice::SliceWriter;
    use crate::io::CountingWriter;
    use std::fs;
    use tempfile::TempDir;

    fn write_index(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("two_words.idx");

        let sink = CountingWriter::new(fs::File::create(&path).unwrap());
        let mut writer = SliceWriter::new(sink, 2);
        writer.next_word().unwrap();
        writer.write_position(8).unwrap();
        writer.next_word().unwrap();
        writer.finish().unwrap();

        let mut reader = IndexReader::open(&path).unwrap();
        assert_eq!(reader.word_count(), 2);

        let mut out = [0u64; 4];
        let mut cursor = reader.find(0).unwrap();
        assert!(cursor.done());
        assert_eq!(cursor.page(&mut out).unwrap(), 0);

        let mut cursor = reader.find(1).unwrap();
        assert!(!cursor.done());
        assert_eq!(cursor.page(&mut out).unwrap(), 1);
        assert_eq!(out[0], 8);
        assert!(cursor.done());
    }

    #[test]
    fn test_word_out_of_range() {
        let dir = TempDir::new().unwrap();
        // One empty word: no delta bytes, directory [0], trailer 1
        let path = write_index(&dir, "one.idx", &[0, 0, 0, 0, 1, 0, 0, 0]);

        let mut reader = IndexReader::open(&path).unwrap();
        let err = reader.find(1).unwrap_err();
        assert!(matches!(
            err,
            PosidexError::WordOutOfRange {
                word: 1,
                word_count: 1
            }
        ));
    }

    #[test]
    fn test_truncated_file() {
        let dir = TempDir::new().unwrap();
        let path = write_index(&dir, "short.idx", &[0x01, 0x00]);
        let err = IndexReader::open(&path).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_directory_does_not_fit() {
        let dir = TempDir::new().unwrap();
        // Trailer claims u32::MAX words in a four-byte file
        let path = write_index(&dir, "liar.idx", &[0xFF, 0xFF, 0xFF, 0xFF]);
        let err = IndexReader::open(&path).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_non_monotone_directory() {
        let dir = TempDir::new().unwrap();
        // One byte of delta stream, but word 1 claims to start at byte 2,
        // past the directory start at byte 1
        let path = write_index(
            &dir,
            "bad_dir.idx",
            &[0x81, 0, 0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0],
        );
        let err = IndexReader::open(&path).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_varint_past_range() {
        let dir = TempDir::new().unwrap();
        // Word 0's single stream byte is a continuation byte, so the
        // decoder runs into the directory
        let path = write_index(&dir, "overrun.idx", &[0x01, 0, 0, 0, 0, 1, 0, 0, 0]);

        let mut reader = IndexReader::open(&path).unwrap();
        let mut out = [0u64; 4];
        let mut cursor = reader.find(0).unwrap();
        let err = cursor.page(&mut out).unwrap_err();
        assert!(err.is_corruption());
    }
}
