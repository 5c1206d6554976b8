//! Fingerprint functions for existence filter keys
//!
//! A fingerprint is the only key the existence filter ever sees: every bit
//! position is derived from these 64 bits. Values must be identical across
//! runs and platforms, so both implementations read input bytes in a fixed
//! order and use fixed seeds/keys.

use std::hash::Hasher;
use std::io::Cursor;

use siphasher::sip::SipHasher24;

/// Seed for the default MurmurHash3 fingerprint
pub const MURMUR_SEED: u32 = 0;

/// Key for the SipHash fingerprint ("ime-datagen-key!" as two LE words)
pub const SIP_KEY: (u64, u64) = (0x6174_6164_2d65_6d69, 0x2179_656b_2d6e_6567);

/// Deterministic string -> u64 hash used as the existence filter key
///
/// Implementations are passed explicitly to builders; there is no global
/// registry.
pub trait Fingerprinter {
    /// Fingerprint an arbitrary byte string (total, including empty input)
    fn fingerprint(&self, bytes: &[u8]) -> u64;

    /// Fingerprint the UTF-8 bytes of a string
    fn fingerprint_str(&self, s: &str) -> u64 {
        self.fingerprint(s.as_bytes())
    }
}

/// Lower 64 bits of MurmurHash3 x64-128 with a fixed seed
#[derive(Clone, Copy, Debug, Default)]
pub struct Murmur3Fingerprinter;

impl Fingerprinter for Murmur3Fingerprinter {
    fn fingerprint(&self, bytes: &[u8]) -> u64 {
        let mut cursor = Cursor::new(bytes);
        // Reading from an in-memory cursor cannot fail.
        let hash = murmur3::murmur3_x64_128(&mut cursor, MURMUR_SEED).unwrap_or(0);
        hash as u64
    }
}

/// SipHash-2-4 with a fixed key
#[derive(Clone, Copy, Debug)]
pub struct SipFingerprinter {
    k0: u64,
    k1: u64,
}

impl SipFingerprinter {
    pub fn new(k0: u64, k1: u64) -> Self {
        Self { k0, k1 }
    }
}

impl Default for SipFingerprinter {
    fn default() -> Self {
        Self::new(SIP_KEY.0, SIP_KEY.1)
    }
}

impl Fingerprinter for SipFingerprinter {
    fn fingerprint(&self, bytes: &[u8]) -> u64 {
        let mut hasher = SipHasher24::new_with_keys(self.k0, self.k1);
        hasher.write(bytes);
        hasher.finish()
    }
}

/// Fingerprint with the default hasher
pub fn fingerprint(bytes: &[u8]) -> u64 {
    Murmur3Fingerprinter.fingerprint(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_deterministic() {
        let a = fingerprint(b"\xe3\x81\x82\xe3\x81\x84");
        let b = fingerprint(b"\xe3\x81\x82\xe3\x81\x84");
        assert_eq!(a, b, "Same bytes must produce the same fingerprint");

        let sip = SipFingerprinter::default();
        assert_eq!(sip.fingerprint(b"abc"), sip.fingerprint(b"abc"));
    }

    #[test]
    fn test_fingerprint_total_on_empty_input() {
        // Must not panic and must be stable.
        assert_eq!(fingerprint(b""), fingerprint(b""));
        let sip = SipFingerprinter::default();
        assert_eq!(sip.fingerprint(b""), sip.fingerprint(b""));
    }

    #[test]
    fn test_similar_inputs_differ() {
        let a = fingerprint(b"entry_0001");
        let b = fingerprint(b"entry_0002");
        assert_ne!(a, b);

        // Roughly half the bits should flip between neighbours.
        let flipped = (a ^ b).count_ones();
        assert!(
            (12..=52).contains(&flipped),
            "Poor avalanche: only {} bits differ",
            flipped
        );
    }

    #[test]
    fn test_str_and_bytes_agree() {
        let hasher = Murmur3Fingerprinter;
        assert_eq!(hasher.fingerprint_str("かな"), hasher.fingerprint("かな".as_bytes()));
    }

    #[test]
    fn test_different_keys_different_output() {
        let a = SipFingerprinter::new(1, 2).fingerprint(b"word");
        let b = SipFingerprinter::new(3, 4).fingerprint(b"word");
        assert_ne!(a, b, "Different keys must produce different outputs");
    }

    #[test]
    fn test_low_and_high_halves_uniform() {
        // Both 32-bit halves should be uniform.
        let mut low_buckets = [0usize; 8];
        let mut high_buckets = [0usize; 8];
        for i in 0..8000 {
            let fp = fingerprint(format!("word_{}", i).as_bytes());
            low_buckets[(fp as u32 % 8) as usize] += 1;
            high_buckets[((fp >> 32) as u32 % 8) as usize] += 1;
        }
        for count in low_buckets.iter().chain(high_buckets.iter()) {
            assert!(
                (700..=1300).contains(count),
                "Bucket count {} far from expected 1000",
                count
            );
        }
    }
}
