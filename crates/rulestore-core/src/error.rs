//! Error types for rulestore

/// Result type alias using rulestore's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for rulestore operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Policy model errors (unknown section or assertion, bad line)
    #[error("model error: {0}")]
    Model(String),

    /// A stored record could not be parsed into a rule
    #[error("malformed record {record:?}: {reason}")]
    MalformedRecord {
        /// The raw record as read from the store
        record: String,
        /// Why it was rejected
        reason: String,
    },

    /// A filter addressed fields outside the stored record shape
    #[error("field filter out of range: index {index} with {len} value(s) exceeds {max} fields")]
    FieldIndexOutOfRange {
        /// First field the filter applies to
        index: usize,
        /// Number of filter values
        len: usize,
        /// Number of fields a record can hold
        max: usize,
    },

    /// Backing store failures (connectivity, auth, wrong type)
    #[error("store error: {0}")]
    Store(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new malformed record error
    pub fn malformed(record: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            record: record.into(),
            reason: reason.into(),
        }
    }

    /// Create a new store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::malformed("{oops", "expected value");
        assert_eq!(err.to_string(), "malformed record \"{oops\": expected value");

        let err = Error::FieldIndexOutOfRange {
            index: 5,
            len: 2,
            max: 6,
        };
        assert!(err.to_string().contains("index 5 with 2 value(s)"));
    }
}
