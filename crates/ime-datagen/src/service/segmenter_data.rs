//! Segmenter Bitarray Generator
//!
//! Produces the four segmenter artifacts from a boundary predicate:
//! size info, left compaction table, right compaction table, bitarray.
//! All four are rendered before the first file is replaced.

use std::path::PathBuf;

use tracing::info;

use crate::adapters::{commit_all, emitter_for};
use crate::domain::{EmitFormat, SegmenterBitarray};
use crate::error::Result;
use crate::ports::{Artifact, ArtifactEmitter};

pub const SIZE_INFO_NAME: &str = "SegmenterSizeInfo";
pub const LTABLE_NAME: &str = "SegmenterLTable";
pub const RTABLE_NAME: &str = "SegmenterRTable";
pub const BITARRAY_NAME: &str = "SegmenterBitArray";

/// Destination of each segmenter artifact
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmenterOutputPaths {
    pub size_info: PathBuf,
    pub ltable: PathBuf,
    pub rtable: PathBuf,
    pub bitarray: PathBuf,
}

/// The four serialized segmenter artifacts
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmenterArtifacts {
    pub size_info: Artifact,
    pub ltable: Artifact,
    pub rtable: Artifact,
    pub bitarray: Artifact,
}

impl SegmenterArtifacts {
    /// Serialize a compacted bitarray
    pub fn from_bitarray(array: &SegmenterBitarray) -> Result<Self> {
        Ok(Self {
            size_info: Artifact::new(SIZE_INFO_NAME, array.size_info().to_bytes()?),
            ltable: Artifact::new(LTABLE_NAME, array.ltable_bytes()),
            rtable: Artifact::new(RTABLE_NAME, array.rtable_bytes()),
            bitarray: Artifact::new(BITARRAY_NAME, array.bitarray_bytes()),
        })
    }

    /// Pair each artifact with its destination
    pub fn into_outputs(self, paths: &SegmenterOutputPaths) -> Vec<(PathBuf, Artifact)> {
        vec![
            (paths.size_info.clone(), self.size_info),
            (paths.ltable.clone(), self.ltable),
            (paths.rtable.clone(), self.rtable),
            (paths.bitarray.clone(), self.bitarray),
        ]
    }
}

/// Segmenter bitarray generator
pub struct SegmenterBitarrayGenerator {
    emitter: Box<dyn ArtifactEmitter>,
}

impl SegmenterBitarrayGenerator {
    pub fn new(format: &EmitFormat) -> Result<Self> {
        Ok(Self {
            emitter: emitter_for(format)?,
        })
    }

    pub fn with_emitter(emitter: Box<dyn ArtifactEmitter>) -> Self {
        Self { emitter }
    }

    /// Evaluate, compact and serialize
    pub fn generate<F>(&self, lsize: usize, rsize: usize, is_boundary: F) -> Result<SegmenterArtifacts>
    where
        F: Fn(usize, usize) -> bool,
    {
        let array = SegmenterBitarray::generate(lsize, rsize, is_boundary)?;
        let info = array.size_info();
        info!(
            lsize,
            rsize,
            compressed_lsize = info.compressed_lsize,
            compressed_rsize = info.compressed_rsize,
            bits_set = array.bits_set(),
            "Segmenter bitarray compacted"
        );
        SegmenterArtifacts::from_bitarray(&array)
    }

    /// Render all four artifacts through the emitter
    pub fn render<F>(&self, lsize: usize, rsize: usize, is_boundary: F) -> Result<Vec<(String, Vec<u8>)>>
    where
        F: Fn(usize, usize) -> bool,
    {
        let artifacts = self.generate(lsize, rsize, is_boundary)?;
        [
            artifacts.size_info,
            artifacts.ltable,
            artifacts.rtable,
            artifacts.bitarray,
        ]
        .iter()
        .map(|a| Ok((a.name().to_string(), self.emitter.render(a)?)))
        .collect()
    }

    /// Generate and atomically replace the four output files
    pub fn generate_files<F>(
        &self,
        lsize: usize,
        rsize: usize,
        is_boundary: F,
        paths: &SegmenterOutputPaths,
    ) -> Result<()>
    where
        F: Fn(usize, usize) -> bool,
    {
        let outputs = self.generate(lsize, rsize, is_boundary)?.into_outputs(paths);
        commit_all(self.emitter.as_ref(), &outputs)?;
        info!(
            size_info = %paths.size_info.display(),
            ltable = %paths.ltable.display(),
            rtable = %paths.rtable.display(),
            bitarray = %paths.bitarray.display(),
            "Segmenter data written"
        );
        Ok(())
    }
}
