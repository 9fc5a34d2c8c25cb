//! # Fingerprint Codec
//!
//! A fingerprint is the 64-bit output of the perceptual transform. Callers
//! outside this crate see it as a base-10 string ([`EncodedFingerprint`]) so
//! that hosts whose numbers are IEEE doubles cannot silently round it.
//!
//! Two parse policies exist:
//!
//! - [`decode`] is permissive: anything that is not a valid `u64` decodes to
//!   `0`. The distance path uses it so comparisons never fail.
//! - [`Fingerprint::from_str`] is strict and reports
//!   [`Error::MalformedFingerprint`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Width of a fingerprint in bits
pub const FINGERPRINT_BITS: u32 = u64::BITS;

/// Encoded value reported when no usable fingerprint could be computed
pub const SENTINEL: &str = "0";

/// Decimal-string form of a [`Fingerprint`]
pub type EncodedFingerprint = String;

/// A perceptual fingerprint represented as a 64-bit value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    /// The all-zero fingerprint, which doubles as the legacy error sentinel
    pub const ZERO: Fingerprint = Fingerprint(0);

    /// Get the underlying 64-bit value
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Render as a base-10 string with no sign, grouping or leading zeros
    pub fn encode(&self) -> EncodedFingerprint {
        self.0.to_string()
    }

    /// Fixed 8-byte big-endian form
    pub fn to_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Inverse of [`Fingerprint::to_bytes`]
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Fingerprint(u64::from_be_bytes(bytes))
    }

    /// Lower 32 bits, as returned by the deprecated numeric entry point
    pub fn truncated(&self) -> u32 {
        self.0 as u32
    }

    /// Calculate the Hamming distance between two fingerprints
    pub fn distance(&self, other: &Fingerprint) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// Check if two images are perceptually similar based on a threshold
    pub fn is_similar(&self, other: &Fingerprint, threshold: u32) -> bool {
        self.distance(other) <= threshold
    }
}

impl From<u64> for Fingerprint {
    fn from(value: u64) -> Self {
        Fingerprint(value)
    }
}

impl From<Fingerprint> for u64 {
    fn from(fingerprint: Fingerprint) -> Self {
        fingerprint.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = Error;

    /// Strict parse: one or more ASCII digits whose value fits in 64 bits
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::MalformedFingerprint(s.to_string()));
        }

        s.parse::<u64>()
            .map(Fingerprint)
            .map_err(|_| Error::MalformedFingerprint(s.to_string()))
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Encode a fingerprint as its decimal string
pub fn encode(fingerprint: Fingerprint) -> EncodedFingerprint {
    fingerprint.encode()
}

/// Permissive decode: malformed, empty or overflowing input yields `0`
pub fn decode(encoded: &str) -> Fingerprint {
    encoded.parse().unwrap_or(Fingerprint::ZERO)
}
