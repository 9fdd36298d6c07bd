use thiserror::Error;

/// Main error type for posidex operations
#[derive(Error, Debug)]
pub enum PosidexError {
    #[error("bucket {got} precedes bucket {prev} within word {word}")]
    OutOfOrder { word: u32, prev: u64, got: u64 },

    #[error("writer finished after {advanced} of {expected} word advances")]
    Incomplete { advanced: u32, expected: u32 },

    #[error("word {word} out of range for word count {word_count}")]
    WordOutOfRange { word: u32, word_count: u32 },

    #[error("position {0} exceeds the 63-bit position limit")]
    PositionOverflow(u64),

    #[error("delta region offset {0} exceeds the u32 directory limit")]
    RegionOverflow(u64),

    #[error("corrupt index: {0}")]
    Corrupt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for posidex operations
pub type Result<T> = std::result::Result<T, PosidexError>;

impl PosidexError {
    /// Check if this error indicates a damaged or truncated file rather
    /// than a misuse of the API
    pub fn is_corruption(&self) -> bool {
        matches!(self, PosidexError::Corrupt(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PosidexError::OutOfOrder {
            word: 3,
            prev: 9,
            got: 7,
        };
        assert_eq!(err.to_string(), "bucket 7 precedes bucket 9 within word 3");

        let err = PosidexError::WordOutOfRange {
            word: 5,
            word_count: 5,
        };
        assert_eq!(err.to_string(), "word 5 out of range for word count 5");
    }

    #[test]
    fn test_corruption_check() {
        assert!(PosidexError::Corrupt("bad directory".to_string()).is_corruption());
        assert!(!PosidexError::PositionOverflow(u64::MAX).is_corruption());
    }
}
