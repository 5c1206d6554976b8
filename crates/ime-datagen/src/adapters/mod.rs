//! Adapters Layer
//!
//! Implementations of the `ArtifactEmitter` port and the filesystem commit.

pub mod file_commit;
pub mod raw_binary;
pub mod source_embedded;

pub use file_commit::{commit_all, commit_artifact, write_atomic};
pub use raw_binary::RawBinaryEmitter;
pub use source_embedded::SourceEmbeddedEmitter;

use crate::domain::EmitFormat;
use crate::error::Result;
use crate::ports::ArtifactEmitter;

/// Select the emitter for a format
pub fn emitter_for(format: &EmitFormat) -> Result<Box<dyn ArtifactEmitter>> {
    let emitter: Box<dyn ArtifactEmitter> = match format {
        EmitFormat::Binary => Box::new(RawBinaryEmitter),
        EmitFormat::Source { namespace } => Box::new(SourceEmbeddedEmitter::new(namespace)?),
    };
    Ok(emitter)
}
