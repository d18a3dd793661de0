//! Object Id Module
//!
//! 12-byte document identifiers rendered as 24 lowercase hex characters.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

static COUNTER: AtomicU32 = AtomicU32::new(0);

// == Object Id ==
/// Identifier of a stored document.
///
/// Layout: 4 bytes of Unix seconds, 4 bytes of process id, 4 bytes of a
/// process-wide counter, all big endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Length of the hex representation
    pub const HEX_LEN: usize = 24;

    // == Generate ==
    /// Creates a fresh identifier.
    pub fn generate() -> Self {
        let seconds = chrono::Utc::now().timestamp() as u32;
        let count = COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..8].copy_from_slice(&std::process::id().to_be_bytes());
        bytes[8..].copy_from_slice(&count.to_be_bytes());
        Self(bytes)
    }

    // == Parse ==
    /// Parses a 24 character hex string.
    ///
    /// Returns None for anything else, so malformed ids behave as unknown ids.
    pub fn parse(text: &str) -> Option<Self> {
        if text.len() != Self::HEX_LEN || !text.is_ascii() {
            return None;
        }

        let mut bytes = [0u8; 12];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&text[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(Self(bytes))
    }

    /// Returns the hex representation.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
