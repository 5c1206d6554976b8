//! Optimal existence filter sizing
//!
//! Formulas:
//! - m_bits = ceil(-n * ln(p) / (ln 2)^2)  -- optimal bits
//! - m      = ceil(m_bits / 8)             -- whole bytes
//! - k      = round((8m / n) * ln 2)       -- hash functions for the byte-rounded size
//! - FPR    = (1 - e^(-kn/m_bits))^k

use std::f64::consts::LN_2;

use crate::error::{GenError, Result};

/// Filter size used when there are no entries at all
pub const MIN_FILTER_SIZE_BYTES: usize = 1;

/// Largest byte size representable in the blob header
pub const MAX_FILTER_SIZE_BYTES: u64 = u32::MAX as u64;

/// Hash count bounds
pub const MIN_HASH_COUNT: usize = 1;
pub const MAX_HASH_COUNT: usize = 32;

/// Sizing decision for an existence filter
#[derive(Clone, Debug, PartialEq)]
pub struct FilterSizing {
    /// Size of the bit vector in bytes (m)
    pub size_bytes: usize,
    /// Number of hash functions (k), from the byte-rounded size
    pub hash_count: usize,
    /// Raw optimal bit count before rounding to whole bytes
    pub optimal_bits: u64,
}

/// Check that an error rate lies in the open interval (0, 1)
pub fn validate_error_rate(error_rate: f64) -> Result<()> {
    // Written this way round so that NaN is rejected too.
    if error_rate > 0.0 && error_rate < 1.0 {
        Ok(())
    } else {
        Err(GenError::invalid_error_rate(error_rate))
    }
}

/// Compute the minimal filter size for `num_entries` at `error_rate`
///
/// # Errors
/// - `Configuration` if `error_rate` is not in (0, 1)
/// - `Capacity` if the byte size does not fit the 32-bit header field
pub fn min_filter_size_for_error_rate(error_rate: f64, num_entries: usize) -> Result<FilterSizing> {
    validate_error_rate(error_rate)?;

    if num_entries == 0 {
        return Ok(FilterSizing {
            size_bytes: MIN_FILTER_SIZE_BYTES,
            hash_count: MIN_HASH_COUNT,
            optimal_bits: 0,
        });
    }

    let n = num_entries as f64;
    let bits = (-n * error_rate.ln() / (LN_2 * LN_2)).ceil();
    let max_bits = (MAX_FILTER_SIZE_BYTES * 8) as f64;
    if !bits.is_finite() || bits > max_bits {
        return Err(GenError::Capacity {
            what: "filter bits",
            value: if bits.is_finite() { bits as u64 } else { u64::MAX },
            max: MAX_FILTER_SIZE_BYTES * 8,
        });
    }

    let optimal_bits = (bits as u64).max(1);
    let size_bytes = optimal_bits.div_ceil(8) as usize;

    Ok(FilterSizing {
        size_bytes,
        hash_count: optimal_hash_count(size_bytes, num_entries),
        optimal_bits,
    })
}

/// Hash count for a filter of `size_bytes` bytes holding `num_entries`
pub fn optimal_hash_count(size_bytes: usize, num_entries: usize) -> usize {
    if num_entries == 0 {
        return MIN_HASH_COUNT;
    }
    let m_bits = (size_bytes as f64) * 8.0;
    let k = ((m_bits / num_entries as f64) * LN_2).round() as usize;
    k.clamp(MIN_HASH_COUNT, MAX_HASH_COUNT)
}

/// Expected false positive rate: (1 - e^(-kn/m))^k
pub fn calculate_fpr(m_bits: usize, n: usize, k: usize) -> f64 {
    if m_bits == 0 {
        return 1.0;
    }
    let exponent = -(k as f64) * (n as f64) / (m_bits as f64);
    (1.0 - exponent.exp()).powi(k as i32)
}
