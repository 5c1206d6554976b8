//! Domain Layer - Pure generation logic
//!
//! This layer contains:
//! - Fingerprint functions
//! - Existence filter sizing and construction
//! - Segmenter boundary grid compaction
//! - Configuration
//!
//! RULES:
//! - No I/O operations
//! - Deterministic output for identical input

pub mod boundary_rules;
pub mod config;
pub mod existence_filter;
pub mod fingerprint;
pub mod parameters;
pub mod segmenter_bitarray;

pub use boundary_rules::BoundaryRules;
pub use config::{EmitFormat, ExistenceConfig, ExistenceConfigBuilder};
pub use existence_filter::ExistenceFilter;
pub use fingerprint::{fingerprint, Fingerprinter, Murmur3Fingerprinter, SipFingerprinter};
pub use parameters::{min_filter_size_for_error_rate, FilterSizing};
pub use segmenter_bitarray::{SegmenterBitarray, SegmenterDataSizeInfo};
