//! # IME Datagen
//!
//! Offline generators for the binary data files consumed by the input-method
//! engine at runtime.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure generation logic, no I/O
//!   - `Fingerprinter`: Deterministic string -> u64 keys
//!   - `ExistenceFilter`: Frozen Bloom filter over fingerprints
//!   - `SegmenterBitarray`: Compacted boundary grid
//!   - `ExistenceConfig`: Configuration with validation
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `ArtifactEmitter`: Driven port rendering finished artifacts
//!
//! - **Adapters Layer** (`adapters/`): Emitters and filesystem commit
//!   - `RawBinaryEmitter`, `SourceEmbeddedEmitter`
//!   - `write_atomic`: temp file + rename
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `ExistenceDataGenerator`
//!   - `SegmenterBitarrayGenerator`
//!
//! ## Invariants
//!
//! - No false negatives: an inserted fingerprint is always reported present
//! - Lossless compaction: `bit[ltable[l] * rsize' + rtable[r]] == is_boundary(l, r)`
//! - Reproducible output: identical input yields identical bytes
//!
//! ## Usage Example
//!
//! ```
//! use ime_datagen::{ExistenceConfigBuilder, ExistenceDataGenerator, fingerprint};
//!
//! let config = ExistenceConfigBuilder::new().error_rate(0.01).build()?;
//! let generator = ExistenceDataGenerator::new(config)?;
//! let filter = generator.build_filter(&["a", "b", "c"])?;
//! assert!(filter.contains(fingerprint(b"a")));
//! # Ok::<(), ime_datagen::GenError>(())
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::{emitter_for, write_atomic, RawBinaryEmitter, SourceEmbeddedEmitter};
pub use domain::{
    fingerprint, BoundaryRules, EmitFormat, ExistenceConfig, ExistenceConfigBuilder,
    ExistenceFilter, Fingerprinter, Murmur3Fingerprinter, SegmenterBitarray,
    SegmenterDataSizeInfo, SipFingerprinter,
};
pub use error::{GenError, Result};
pub use ports::{Artifact, ArtifactEmitter};
pub use service::{
    ExistenceDataGenerator, SegmenterArtifacts, SegmenterBitarrayGenerator, SegmenterOutputPaths,
};
