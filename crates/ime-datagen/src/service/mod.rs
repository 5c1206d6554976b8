//! Service Layer
//!
//! Orchestrates domain logic and hands finished artifacts to an emitter.

pub mod existence_data;
pub mod segmenter_data;

pub use existence_data::{ExistenceDataGenerator, EXISTENCE_FILTER_NAME};
pub use segmenter_data::{
    SegmenterArtifacts, SegmenterBitarrayGenerator, SegmenterOutputPaths, BITARRAY_NAME,
    LTABLE_NAME, RTABLE_NAME, SIZE_INFO_NAME,
};
