//! Raw binary emitter: the artifact bytes, nothing else

use std::io::Write;

use crate::error::Result;
use crate::ports::{Artifact, ArtifactEmitter};

#[derive(Clone, Copy, Debug, Default)]
pub struct RawBinaryEmitter;

impl ArtifactEmitter for RawBinaryEmitter {
    fn emit(&self, artifact: &Artifact, sink: &mut dyn Write) -> Result<()> {
        sink.write_all(artifact.bytes())?;
        Ok(())
    }
}
