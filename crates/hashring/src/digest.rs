//! Placement values derived from SHA-1 digests.
//!
//! A key (or a node key followed by the decimal replica index) is hashed with
//! SHA-1. The 160-bit result is read as five big-endian 32-bit words and the
//! 4th and 5th words, most-significant first, form the 64-bit position on the
//! ring.

use sha1::{Digest, Sha1};

use crate::error::Result;

/// Signature of the function the ring hashes keys and replicas with.
///
/// The input is a list of byte slices hashed as if concatenated.
pub(crate) type DigestFn = fn(&[&[u8]]) -> Result<Digest160>;

/// A 160-bit digest split into five 32-bit words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest160([u32; 5]);

impl Digest160 {
    /// SHA-1 of the concatenation of `parts`.
    pub fn sha1(parts: &[&[u8]]) -> Self {
        let mut hasher = Sha1::new();
        for part in parts {
            hasher.update(part);
        }
        let out = hasher.finalize();

        let mut words = [0u32; 5];
        for (word, chunk) in words.iter_mut().zip(out.chunks_exact(4)) {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self(words)
    }

    /// Build a digest from raw words.
    pub fn from_words(words: [u32; 5]) -> Self {
        Self(words)
    }

    /// The five words, in digest order.
    pub fn words(&self) -> [u32; 5] {
        self.0
    }

    /// The 64-bit ring position: `(word[3] << 32) | word[4]`.
    pub fn placement(&self) -> u64 {
        (u64::from(self.0[3]) << 32) | u64::from(self.0[4])
    }
}

/// Ring position of a routing key.
pub fn key_placement(key: &[u8]) -> u64 {
    Digest160::sha1(&[key]).placement()
}

/// Ring position of replica `replica` of the node identified by `key`.
///
/// The replica index is appended to the key as a decimal string, so replica
/// 12 of `"cache-a"` hashes `"cache-a12"`.
pub fn replica_placement(key: &[u8], replica: u32) -> u64 {
    let index = replica.to_string();
    Digest160::sha1(&[key, index.as_bytes()]).placement()
}

/// Default [`DigestFn`]: SHA-1, which cannot fail.
pub(crate) fn sha1_digest(parts: &[&[u8]]) -> Result<Digest160> {
    Ok(Digest160::sha1(parts))
}
