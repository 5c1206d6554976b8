//! Existence filter: a frozen Bloom filter keyed by 64-bit fingerprints
//!
//! INVARIANTS:
//! - INVARIANT-1: No false negatives - once `insert(fp)` ran, `contains(fp)` is true
//! - INVARIANT-2: FPR converges to the configured error rate at design capacity
//!
//! ## Blob layout
//!
//! ```text
//! [m: u32 LE][k: u32 LE][m bytes of bit vector]
//! ```
//!
//! Bit `i` of the vector lives in byte `i / 8` under mask `1 << (i % 8)`.
//! Probe positions are derived by [`bit_positions`].

use bitvec::prelude::*;

use super::parameters::{
    calculate_fpr, min_filter_size_for_error_rate, optimal_hash_count, MAX_FILTER_SIZE_BYTES,
    MAX_HASH_COUNT, MIN_HASH_COUNT,
};
use crate::error::{GenError, Result};

/// Size of the blob header in bytes
pub const HEADER_SIZE: usize = 8;

/// Bloom filter over fingerprints
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExistenceFilter {
    /// Bit array storing the filter state
    bits: BitVec<u8, Lsb0>,
    /// Number of hash functions (k)
    k: usize,
    /// Number of entries the filter was sized for (n)
    expected_entries: usize,
    /// Number of insert calls so far
    inserted: usize,
}

/// Offset added to the fingerprint per probe round (2^64 / golden ratio)
pub const ROUND_STEP: u64 = 0x9E37_79B9_7F4A_7C15;

/// MurmurHash3 64-bit finalizer
fn fmix64(mut h: u64) -> u64 {
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    h ^= h >> 33;
    h
}

/// Derive the `k` bit positions for a fingerprint
///
/// `pos_i = fmix64(fp + i * ROUND_STEP) mod m_bits`. Plain double hashing
/// `(h1 + i*h2) mod m_bits` collapses onto a few bits whenever `h2` shares a
/// factor with `m_bits`, which is always a multiple of 8 here.
pub fn bit_positions(fingerprint: u64, k: usize, m_bits: usize) -> impl Iterator<Item = usize> {
    let m = m_bits as u64;
    (0..k as u64).map(move |i| {
        let probe = fmix64(fingerprint.wrapping_add(i.wrapping_mul(ROUND_STEP)));
        (probe % m) as usize
    })
}

impl ExistenceFilter {
    /// Allocate a zeroed filter of `size_bytes` bytes sized for `expected_entries`
    ///
    /// The hash count is fixed here from (m, n) and never changes afterwards.
    pub fn create_optimal(size_bytes: usize, expected_entries: usize) -> Result<Self> {
        if size_bytes == 0 {
            return Err(GenError::Configuration(
                "filter size must be at least one byte".to_string(),
            ));
        }
        if size_bytes as u64 > MAX_FILTER_SIZE_BYTES {
            return Err(GenError::Capacity {
                what: "filter bytes",
                value: size_bytes as u64,
                max: MAX_FILTER_SIZE_BYTES,
            });
        }

        Ok(Self {
            bits: BitVec::from_vec(vec![0u8; size_bytes]),
            k: optimal_hash_count(size_bytes, expected_entries),
            expected_entries,
            inserted: 0,
        })
    }

    /// Size and allocate a filter for `expected_entries` at `error_rate`
    pub fn with_error_rate(error_rate: f64, expected_entries: usize) -> Result<Self> {
        let sizing = min_filter_size_for_error_rate(error_rate, expected_entries)?;
        Self::create_optimal(sizing.size_bytes, expected_entries)
    }

    /// Set the `k` bits derived from `fingerprint`
    ///
    /// Setting an already-set bit is a no-op, so repeated inserts are harmless.
    pub fn insert(&mut self, fingerprint: u64) {
        let m_bits = self.bits.len();
        for pos in bit_positions(fingerprint, self.k, m_bits) {
            self.bits.set(pos, true);
        }
        self.inserted += 1;
    }

    /// Test if a fingerprint might be in the filter
    ///
    /// - `true` if it might be present (could be a false positive)
    /// - `false` if it was definitely never inserted
    pub fn contains(&self, fingerprint: u64) -> bool {
        bit_positions(fingerprint, self.k, self.bits.len()).all(|pos| self.bits[pos])
    }

    /// Serialize to the blob layout described in the module docs
    pub fn write(&self) -> Vec<u8> {
        let raw = self.bits.as_raw_slice();
        let mut buf = Vec::with_capacity(HEADER_SIZE + raw.len());
        // Both fit: size checked in create_optimal, k clamped to MAX_HASH_COUNT.
        buf.extend_from_slice(&(raw.len() as u32).to_le_bytes());
        buf.extend_from_slice(&(self.k as u32).to_le_bytes());
        buf.extend_from_slice(raw);
        buf
    }

    /// Parse a blob produced by [`ExistenceFilter::write`]
    ///
    /// The entry count is not part of the blob and is reported as 0.
    pub fn from_bytes(blob: &[u8]) -> Result<Self> {
        if blob.len() < HEADER_SIZE {
            return Err(GenError::MalformedArtifact(format!(
                "existence filter blob too short: {} bytes",
                blob.len()
            )));
        }

        let (header, body) = blob.split_at(HEADER_SIZE);
        let size_bytes = read_u32_le(&header[0..4]) as usize;
        let k = read_u32_le(&header[4..8]) as usize;

        if size_bytes == 0 || body.len() != size_bytes {
            return Err(GenError::MalformedArtifact(format!(
                "existence filter declares {} bytes, body has {}",
                size_bytes,
                body.len()
            )));
        }
        if !(MIN_HASH_COUNT..=MAX_HASH_COUNT).contains(&k) {
            return Err(GenError::MalformedArtifact(format!(
                "existence filter hash count {} out of range",
                k
            )));
        }

        Ok(Self {
            bits: BitVec::from_vec(body.to_vec()),
            k,
            expected_entries: 0,
            inserted: 0,
        })
    }

    /// Expected false positive rate once `expected_entries` are inserted
    pub fn expected_false_positive_rate(&self) -> f64 {
        calculate_fpr(self.bits.len(), self.expected_entries, self.k)
    }

    /// Get the number of bits set in the filter
    pub fn bits_set(&self) -> usize {
        self.bits.count_ones()
    }

    /// Get the filter size in bytes (m)
    pub fn size_bytes(&self) -> usize {
        self.bits.as_raw_slice().len()
    }

    /// Get the filter size in bits
    pub fn size_bits(&self) -> usize {
        self.bits.len()
    }

    /// Get the number of hash functions (k)
    pub fn hash_count(&self) -> usize {
        self.k
    }

    /// Get the number of entries the filter was sized for
    pub fn expected_entries(&self) -> usize {
        self.expected_entries
    }

    /// Get the number of insert calls made
    pub fn inserted(&self) -> usize {
        self.inserted
    }
}

fn read_u32_le(bytes: &[u8]) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(bytes);
    u32::from_le_bytes(word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fingerprint::fingerprint;

    #[test]
    fn test_create_optimal_zeroed() {
        let filter = ExistenceFilter::create_optimal(128, 100).unwrap();
        assert_eq!(filter.size_bytes(), 128);
        assert_eq!(filter.size_bits(), 1024);
        assert_eq!(filter.hash_count(), 7);
        assert_eq!(filter.bits_set(), 0, "All bits should be zero initially");
    }

    #[test]
    fn test_create_optimal_rejects_zero_size() {
        assert!(matches!(
            ExistenceFilter::create_optimal(0, 10),
            Err(GenError::Configuration(_))
        ));
    }

    #[test]
    fn test_insert_sets_at_most_k_bits_and_is_idempotent() {
        let mut filter = ExistenceFilter::create_optimal(1024, 100).unwrap();
        let fp = fingerprint(b"test_entry");

        filter.insert(fp);
        let after_first = filter.bits_set();
        assert!(after_first > 0 && after_first <= filter.hash_count());

        let snapshot = filter.write();
        filter.insert(fp);
        assert_eq!(filter.bits_set(), after_first);
        assert_eq!(filter.write(), snapshot, "Re-insert must not change bytes");
    }

    #[test]
    fn test_contains_after_insert() {
        let mut filter = ExistenceFilter::with_error_rate(0.01, 3).unwrap();
        for word in ["a", "b", "c"] {
            filter.insert(fingerprint(word.as_bytes()));
        }
        for word in ["a", "b", "c"] {
            assert!(
                filter.contains(fingerprint(word.as_bytes())),
                "INVARIANT-1: contains() must be true for inserted {}",
                word
            );
        }
    }

    #[test]
    fn test_empty_filter_never_matches() {
        let filter = ExistenceFilter::with_error_rate(0.01, 0).unwrap();
        assert_eq!(filter.size_bytes(), 1);
        assert_eq!(filter.hash_count(), 1);
        for i in 0..1000 {
            assert!(!filter.contains(fingerprint(format!("w{}", i).as_bytes())));
        }
    }

    #[test]
    fn test_no_false_negatives_bulk() {
        let entries: Vec<String> = (0..5000).map(|i| format!("entry_{:05}", i)).collect();
        let mut filter = ExistenceFilter::with_error_rate(0.001, entries.len()).unwrap();
        for e in &entries {
            filter.insert(fingerprint(e.as_bytes()));
        }
        for e in &entries {
            assert!(filter.contains(fingerprint(e.as_bytes())), "False negative for {}", e);
        }
    }

    #[test]
    fn test_false_positive_rate_bounded() {
        let target = 0.01;
        let n = 2000;
        let mut filter = ExistenceFilter::with_error_rate(target, n).unwrap();
        for i in 0..n {
            filter.insert(fingerprint(format!("inserted_{}", i).as_bytes()));
        }

        let trials = 100_000;
        let positives = (0..trials)
            .filter(|i| filter.contains(fingerprint(format!("absent_{}", i).as_bytes())))
            .count();
        let actual = positives as f64 / trials as f64;

        // Allow 1.5x statistical tolerance
        assert!(
            actual <= target * 1.5,
            "INVARIANT-2: actual FPR {} exceeds 1.5 * target {}",
            actual,
            target
        );
    }

    #[test]
    fn test_write_layout() {
        let fp = fingerprint(b"layout");
        let mut filter = ExistenceFilter::create_optimal(4, 3).unwrap();
        filter.insert(fp);

        // Bit i lives in byte i / 8 under mask 1 << (i % 8).
        let mut expected = [0u8; 4];
        for pos in bit_positions(fp, 7, 32) {
            expected[pos / 8] |= 1 << (pos % 8);
        }

        let blob = filter.write();
        assert_eq!(blob.len(), HEADER_SIZE + 4);
        assert_eq!(&blob[0..4], &4u32.to_le_bytes());
        assert_eq!(&blob[4..8], &7u32.to_le_bytes());
        assert_eq!(&blob[8..], &expected);
    }

    #[test]
    fn test_bit_positions_in_range_and_spread() {
        let fp = fingerprint(b"probe");
        let positions: Vec<usize> = bit_positions(fp, 7, 32).collect();
        assert_eq!(positions.len(), 7);
        assert!(positions.iter().all(|&p| p < 32));
        assert_eq!(positions, bit_positions(fp, 7, 32).collect::<Vec<_>>());

        // Fingerprints whose halves would defeat double hashing still spread.
        let degenerate = 0x0000_0020_0000_0000u64;
        let distinct: std::collections::HashSet<usize> = bit_positions(degenerate, 7, 32).collect();
        assert!(distinct.len() >= 4, "Positions collapsed: {:?}", distinct);
    }

    #[test]
    fn test_from_bytes_restores_membership() {
        let mut filter = ExistenceFilter::with_error_rate(0.01, 10).unwrap();
        for i in 0..10 {
            filter.insert(fingerprint(format!("w{}", i).as_bytes()));
        }
        let restored = ExistenceFilter::from_bytes(&filter.write()).unwrap();
        assert_eq!(restored.hash_count(), filter.hash_count());
        assert_eq!(restored.size_bytes(), filter.size_bytes());
        for i in 0..10 {
            assert!(restored.contains(fingerprint(format!("w{}", i).as_bytes())));
        }
    }

    #[test]
    fn test_from_bytes_rejects_malformed() {
        assert!(ExistenceFilter::from_bytes(&[1, 0, 0]).is_err());

        // Declared size disagrees with body.
        let mut blob = vec![];
        blob.extend_from_slice(&4u32.to_le_bytes());
        blob.extend_from_slice(&3u32.to_le_bytes());
        blob.extend_from_slice(&[0, 0]);
        assert!(matches!(
            ExistenceFilter::from_bytes(&blob),
            Err(GenError::MalformedArtifact(_))
        ));

        // Zero hash count.
        let mut blob = vec![];
        blob.extend_from_slice(&1u32.to_le_bytes());
        blob.extend_from_slice(&0u32.to_le_bytes());
        blob.push(0);
        assert!(ExistenceFilter::from_bytes(&blob).is_err());
    }

    #[test]
    fn test_sizing_hash_count_matches_built_filter() {
        for n in [0, 1, 2, 3, 7, 100, 12_345] {
            for rate in [0.5, 0.01, 0.0001] {
                let sizing = min_filter_size_for_error_rate(rate, n).unwrap();
                let filter = ExistenceFilter::with_error_rate(rate, n).unwrap();
                assert_eq!(filter.size_bytes(), sizing.size_bytes);
                assert_eq!(filter.hash_count(), sizing.hash_count, "n={} rate={}", n, rate);
            }
        }
    }

    #[test]
    fn test_expected_fpr_near_target() {
        let filter = ExistenceFilter::with_error_rate(0.01, 1000).unwrap();
        let fpr = filter.expected_false_positive_rate();
        assert!(fpr <= 0.011, "Expected FPR {} should be near 0.01", fpr);
    }
}
