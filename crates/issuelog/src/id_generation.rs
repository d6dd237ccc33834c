//! Identifier generation for stored issues.
//!
//! Identifiers use the 12-byte layout of document-store object ids, so
//! existing clients that already hold ids of that shape keep working:
//!
//! | bytes  | content                                   |
//! |--------|-------------------------------------------|
//! | 0..4   | Unix seconds, big-endian                  |
//! | 4..9   | per-process entropy (SHA-256 digest)      |
//! | 9..12  | wrapping counter, big-endian              |
//!
//! # Example
//!
//! ```
//! use issuelog::id_generation::IdGenerator;
//!
//! let mut generator = IdGenerator::new();
//! let first = generator.generate();
//! let second = generator.generate();
//! assert_ne!(first, second);
//! assert_eq!(first.to_string().len(), 24);
//! ```

use crate::domain::IssueId;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

const COUNTER_MASK: u32 = 0x00FF_FFFF;

/// Generator for [`IssueId`] values.
///
/// One generator is owned by each store instance. The per-process bytes and
/// the counter seed are derived once from a SHA-256 digest of the seed
/// material; after that, generation is a cheap counter increment.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    process_bytes: [u8; 5],
    counter: u32,
}

impl IdGenerator {
    /// Create a generator seeded from the process id and the current time.
    #[must_use]
    pub fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());

        let mut seed = Vec::with_capacity(20);
        seed.extend_from_slice(&std::process::id().to_be_bytes());
        seed.extend_from_slice(&nanos.to_be_bytes());
        Self::with_seed(&seed)
    }

    /// Create a generator from explicit seed material.
    ///
    /// Two generators built from the same seed produce the same sequence for
    /// the same timestamps, which keeps tests deterministic.
    #[must_use]
    pub fn with_seed(seed: &[u8]) -> Self {
        let digest = Sha256::digest(seed);

        let mut process_bytes = [0u8; 5];
        process_bytes.copy_from_slice(&digest[..5]);
        let counter = u32::from_be_bytes([0, digest[5], digest[6], digest[7]]);

        Self {
            process_bytes,
            counter,
        }
    }

    /// Generate an identifier stamped with the current time.
    pub fn generate(&mut self) -> IssueId {
        self.generate_at(Utc::now().timestamp())
    }

    /// Generate an identifier stamped with `unix_seconds`.
    ///
    /// Seconds outside the `u32` range are clamped, which only matters for
    /// timestamps before 1970 or after 2106.
    pub fn generate_at(&mut self, unix_seconds: i64) -> IssueId {
        let seconds = u32::try_from(unix_seconds.max(0)).unwrap_or(u32::MAX);
        let count = self.counter & COUNTER_MASK;
        self.counter = self.counter.wrapping_add(1) & COUNTER_MASK;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&self.process_bytes);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        IssueId::from_bytes(bytes)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
