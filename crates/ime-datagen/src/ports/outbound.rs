//! Outbound Ports (Driven Ports)
//!
//! Both generators hand their finished bytes to an [`ArtifactEmitter`]; the
//! emitter decides the representation, the caller decides the sink.

use std::io::Write;

use crate::error::Result;

/// An immutable named byte sequence
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// CamelCase name, e.g. `ExistenceFilter`
    name: String,
    bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Artifact renderer (Driven Port)
///
/// Implementations must be deterministic: same artifact, same output bytes.
pub trait ArtifactEmitter {
    /// Render `artifact` into `sink`
    fn emit(&self, artifact: &Artifact, sink: &mut dyn Write) -> Result<()>;

    /// Render into a fresh buffer
    fn render(&self, artifact: &Artifact) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(artifact.len());
        self.emit(artifact, &mut buf)?;
        Ok(buf)
    }
}
