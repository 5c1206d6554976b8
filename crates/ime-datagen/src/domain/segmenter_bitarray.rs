//! Segmenter boundary bitarray
//!
//! Compacts an `lsize x rsize` boundary predicate into two compaction tables
//! and a packed bit vector.
//!
//! ## Algorithm
//!
//! 1. Evaluate the predicate once per cell, row-major (`l` outer, `r` inner)
//! 2. Collapse identical rows; ids assigned in order of first occurrence
//! 3. Collapse identical columns the same way
//! 4. Pack the reduced grid: bit `l' * rsize' + r'`, LSB-first in each byte
//!
//! INVARIANT: for every original `(l, r)`,
//! `bit[ltable[l] * rsize' + rtable[r]] == predicate(l, r)`.

use std::collections::HashMap;

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};

/// Largest supported dimension; compacted ids are stored as u16
pub const MAX_DIMENSION: usize = u16::MAX as usize + 1;

/// Byte length of the serialized size info
pub const SIZE_INFO_LEN: usize = 8;

/// Compacted grid dimensions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmenterDataSizeInfo {
    pub compressed_lsize: u32,
    pub compressed_rsize: u32,
}

impl SegmenterDataSizeInfo {
    /// Fixed-width little-endian encoding (bincode fixint)
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| GenError::Serialization(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SIZE_INFO_LEN {
            return Err(GenError::MalformedArtifact(format!(
                "size info must be {} bytes, got {}",
                SIZE_INFO_LEN,
                bytes.len()
            )));
        }
        bincode::deserialize(bytes).map_err(|e| GenError::MalformedArtifact(e.to_string()))
    }
}

/// Compacted boundary grid
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmenterBitarray {
    size_info: SegmenterDataSizeInfo,
    ltable: Vec<u16>,
    rtable: Vec<u16>,
    bitarray: BitVec<u8, Lsb0>,
}

/// Check the dimensions before any evaluation happens
pub fn validate_dimensions(lsize: usize, rsize: usize) -> Result<()> {
    if lsize == 0 || rsize == 0 {
        return Err(GenError::InvalidDimensions { lsize, rsize });
    }
    for (what, value) in [("lsize", lsize), ("rsize", rsize)] {
        if value > MAX_DIMENSION {
            return Err(GenError::Capacity {
                what,
                value: value as u64,
                max: MAX_DIMENSION as u64,
            });
        }
    }
    Ok(())
}

/// Group identical lines; returns (line -> compacted id, number of ids)
fn compact_lines<F>(count: usize, mut line: F) -> (Vec<u16>, usize)
where
    F: FnMut(usize) -> BitVec<u8, Lsb0>,
{
    let mut ids: HashMap<BitVec<u8, Lsb0>, u16> = HashMap::new();
    let mut table = Vec::with_capacity(count);
    for i in 0..count {
        let next = ids.len() as u16;
        let id = *ids.entry(line(i)).or_insert(next);
        table.push(id);
    }
    (table, ids.len())
}

impl SegmenterBitarray {
    /// Evaluate `is_boundary` over the whole grid and compact it
    ///
    /// # Errors
    /// - `InvalidDimensions` if either dimension is zero
    /// - `Capacity` if either dimension exceeds [`MAX_DIMENSION`]
    pub fn generate<F>(lsize: usize, rsize: usize, is_boundary: F) -> Result<Self>
    where
        F: Fn(usize, usize) -> bool,
    {
        validate_dimensions(lsize, rsize)?;

        // Row-major: l outer, r inner.
        let mut grid: BitVec<u8, Lsb0> = BitVec::with_capacity(lsize * rsize);
        for l in 0..lsize {
            for r in 0..rsize {
                grid.push(is_boundary(l, r));
            }
        }

        let (ltable, compressed_lsize) =
            compact_lines(lsize, |l| grid[l * rsize..(l + 1) * rsize].to_bitvec());
        let (rtable, compressed_rsize) =
            compact_lines(rsize, |r| (0..lsize).map(|l| grid[l * rsize + r]).collect());

        // Any representative cell of a compacted class carries the class value.
        let mut bitarray = bitvec![u8, Lsb0; 0; compressed_lsize * compressed_rsize];
        for l in 0..lsize {
            let row = ltable[l] as usize * compressed_rsize;
            for r in 0..rsize {
                if grid[l * rsize + r] {
                    bitarray.set(row + rtable[r] as usize, true);
                }
            }
        }

        Ok(Self {
            size_info: SegmenterDataSizeInfo {
                compressed_lsize: compressed_lsize as u32,
                compressed_rsize: compressed_rsize as u32,
            },
            ltable,
            rtable,
            bitarray,
        })
    }

    /// Reassemble from the four serialized artifacts, validating them
    pub fn from_parts(
        size_info: &[u8],
        ltable: &[u8],
        rtable: &[u8],
        bitarray: &[u8],
    ) -> Result<Self> {
        let size_info = SegmenterDataSizeInfo::from_bytes(size_info)?;
        let lsize = size_info.compressed_lsize as usize;
        let rsize = size_info.compressed_rsize as usize;
        let ltable = decode_table("ltable", ltable, lsize)?;
        let rtable = decode_table("rtable", rtable, rsize)?;

        let bits = lsize * rsize;
        if bitarray.len() != bits.div_ceil(8) {
            return Err(GenError::MalformedArtifact(format!(
                "bitarray has {} bytes, expected {}",
                bitarray.len(),
                bits.div_ceil(8)
            )));
        }
        let mut bitarray = BitVec::<u8, Lsb0>::from_slice(bitarray);
        bitarray.truncate(bits);

        Ok(Self {
            size_info,
            ltable,
            rtable,
            bitarray,
        })
    }

    /// Decode one original cell through the compaction tables
    ///
    /// # Panics
    /// Panics if `l` or `r` is outside the original grid.
    pub fn is_boundary(&self, l: usize, r: usize) -> bool {
        let row = self.ltable[l] as usize;
        let col = self.rtable[r] as usize;
        self.bitarray[row * self.size_info.compressed_rsize as usize + col]
    }

    pub fn size_info(&self) -> SegmenterDataSizeInfo {
        self.size_info
    }

    pub fn ltable(&self) -> &[u16] {
        &self.ltable
    }

    pub fn rtable(&self) -> &[u16] {
        &self.rtable
    }

    /// Original (uncompacted) dimensions
    pub fn original_size(&self) -> (usize, usize) {
        (self.ltable.len(), self.rtable.len())
    }

    /// Number of set bits in the packed vector
    pub fn bits_set(&self) -> usize {
        self.bitarray.count_ones()
    }

    /// One little-endian u16 per original left id
    pub fn ltable_bytes(&self) -> Vec<u8> {
        encode_table(&self.ltable)
    }

    /// One little-endian u16 per original right id
    pub fn rtable_bytes(&self) -> Vec<u8> {
        encode_table(&self.rtable)
    }

    /// Packed bit vector, zero-padded to a whole byte
    pub fn bitarray_bytes(&self) -> Vec<u8> {
        self.bitarray.as_raw_slice().to_vec()
    }
}

fn encode_table(table: &[u16]) -> Vec<u8> {
    table.iter().flat_map(|id| id.to_le_bytes()).collect()
}

fn decode_table(name: &str, bytes: &[u8], compressed: usize) -> Result<Vec<u16>> {
    if bytes.is_empty() || bytes.len() % 2 != 0 {
        return Err(GenError::MalformedArtifact(format!(
            "{} has invalid length {}",
            name,
            bytes.len()
        )));
    }
    let table: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    if let Some(bad) = table.iter().find(|&&id| id as usize >= compressed) {
        return Err(GenError::MalformedArtifact(format!(
            "{} entry {} out of range for compacted size {}",
            name, bad, compressed
        )));
    }
    Ok(table)
}
