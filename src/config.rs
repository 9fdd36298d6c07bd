use serde::{Deserialize, Serialize};

/// Tunables for [`IndexBuilder`](crate::index::IndexBuilder)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// In-memory entries buffered before a slice is flushed
    pub buffer_entries: usize,
    /// Capacity of each file write buffer (bytes)
    pub write_buffer_bytes: usize,
    /// Positions decoded per page while merging slices
    pub page_entries: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            // 64k entries
            buffer_entries: 64 * 1024,
            // 4KB
            write_buffer_bytes: 4096,
            page_entries: 256,
        }
    }
}

impl BuilderConfig {
    /// Set the in-memory entry capacity
    pub fn with_buffer_entries(mut self, entries: usize) -> Self {
        self.buffer_entries = entries;
        self
    }

    /// Set the file write buffer capacity
    pub fn with_write_buffer_bytes(mut self, bytes: usize) -> Self {
        self.write_buffer_bytes = bytes;
        self
    }
}
