//! Error types for link operations

use thiserror::Error;

/// Errors that can occur while talking to the producer's segment
#[derive(Error, Debug)]
pub enum LinkError {
    /// The named mapping does not exist; the producer is not running
    #[error("Producer segment not found: {name}")]
    ProducerAbsent {
        /// Segment name
        name: String,
    },

    /// The mapping exists but no view of it could be mapped
    #[error("Could not map a view of segment {name}: {reason}")]
    MappingUnavailable {
        /// Segment name
        name: String,
        /// What went wrong
        reason: String,
    },

    /// The paired cross-process mutex could not be opened
    #[error("Segment mutex unavailable: {name}")]
    SynchronizationUnavailable {
        /// Mutex name
        name: String,
    },

    /// The mutex was not acquired within the configured bound
    #[error("Timed out after {waited_ms}ms waiting for mutex {name}")]
    LockTimeout {
        /// Mutex name
        name: String,
        /// How long the wait lasted
        waited_ms: u64,
    },

    /// The connection is closed
    #[error("Connection is not open")]
    NotOpen,

    /// The mapped segment does not carry the producer's signature
    #[error("Invalid segment signature: {found:#010x}")]
    InvalidSignature {
        /// Signature found in the segment
        found: u32,
    },

    /// IO error
    #[error("IO error: {source}")]
    Io {
        /// Source IO error
        #[from]
        source: std::io::Error,
    },

    /// Nix system call error
    #[cfg(unix)]
    #[error("System call error: {source}")]
    Nix {
        /// Source nix error
        #[from]
        source: nix::Error,
    },
}

impl LinkError {
    /// Numeric status used by hosts that speak the producer link's legacy
    /// return codes: 1 segment missing, 10 view failed, 100 mutex missing.
    /// Errors outside the open sequence report `-1`.
    pub fn status_code(&self) -> i32 {
        match self {
            Self::ProducerAbsent { .. } => 1,
            Self::MappingUnavailable { .. } => 10,
            Self::SynchronizationUnavailable { .. } => 100,
            _ => -1,
        }
    }

    /// Whether this error means "the producer is not there (yet)".
    ///
    /// A foreign or stale mapping is treated the same as a missing one.
    pub fn is_producer_absent(&self) -> bool {
        matches!(
            self,
            Self::ProducerAbsent { .. } | Self::InvalidSignature { .. }
        )
    }
}

/// Result type for link operations
pub type LinkResult<T> = Result<T, LinkError>;
