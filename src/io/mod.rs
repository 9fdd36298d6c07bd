//! Buffered byte sink and source with position tracking
//!
//! The index format records absolute byte offsets in its trailing
//! directory, so both ends of the pipeline count bytes as they go: the
//! writer's counter feeds the directory, the reader's counter bounds
//! each word's delta stream.

pub mod varint;

use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};

/// Default capacity for the write buffer
pub const DEFAULT_WRITE_BUFFER_BYTES: usize = 4096;

/// Buffered writer that tracks the number of bytes written through it
#[derive(Debug)]
pub struct CountingWriter<W: Write> {
    inner: BufWriter<W>,
    bytes_written: u64,
}

impl<W: Write> CountingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::with_capacity(DEFAULT_WRITE_BUFFER_BYTES, inner)
    }

    pub fn with_capacity(capacity: usize, inner: W) -> Self {
        Self {
            inner: BufWriter::with_capacity(capacity, inner),
            bytes_written: 0,
        }
    }

    /// Bytes written so far, flushed or not
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn write_u32_le(&mut self, value: u32) -> io::Result<()> {
        self.write_all(&value.to_le_bytes())
    }

    /// Flush and release the underlying sink
    pub fn into_inner(self) -> io::Result<W> {
        self.inner.into_inner().map_err(|e| e.into_error())
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.bytes_written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Buffered reader that tracks its logical byte position across seeks
#[derive(Debug)]
pub struct CountingReader<R: Read + Seek> {
    inner: BufReader<R>,
    position: u64,
}

impl<R: Read + Seek> CountingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
            position: 0,
        }
    }

    /// Current logical byte position
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn seek_to(&mut self, offset: u64) -> io::Result<u64> {
        self.position = self.inner.seek(SeekFrom::Start(offset))?;
        Ok(self.position)
    }

    pub fn seek_from_end(&mut self, offset: i64) -> io::Result<u64> {
        self.position = self.inner.seek(SeekFrom::End(offset))?;
        Ok(self.position)
    }

    pub fn read_u32_le(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }
}

impl<R: Read + Seek> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.position += read as u64;
        Ok(read)
    }
}
