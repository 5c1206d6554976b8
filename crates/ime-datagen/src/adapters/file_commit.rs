//! Atomic artifact commits
//!
//! The artifact is rendered fully in memory, written to a temporary file in
//! the destination directory, synced, then renamed over the destination. A
//! failed run leaves the previous file in place.
//!
//! For a set of artifacts every temporary is written and synced before the
//! first rename, so a failure while staging leaves the whole previous set
//! untouched.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::Result;
use crate::ports::{Artifact, ArtifactEmitter};

/// Write `bytes` to a synced temporary next to `path`
fn stage(path: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

/// Replace `path` with `bytes` atomically
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    stage(path, bytes)?.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Render `artifact` with `emitter` and commit it to `path`
pub fn commit_artifact(path: &Path, emitter: &dyn ArtifactEmitter, artifact: &Artifact) -> Result<()> {
    let rendered = emitter.render(artifact)?;
    write_atomic(path, &rendered)?;
    debug!(
        artifact = artifact.name(),
        path = %path.display(),
        bytes = rendered.len(),
        "Artifact committed"
    );
    Ok(())
}

/// Render and stage every artifact, then rename them into place in order
///
/// A rendering or staging failure replaces nothing; staged temporaries are
/// removed when dropped.
pub fn commit_all(emitter: &dyn ArtifactEmitter, outputs: &[(PathBuf, Artifact)]) -> Result<()> {
    let rendered = outputs
        .iter()
        .map(|(path, artifact)| Ok((path, artifact.name(), emitter.render(artifact)?)))
        .collect::<Result<Vec<_>>>()?;

    let staged = rendered
        .iter()
        .map(|(path, name, bytes)| Ok((*path, *name, bytes.len(), stage(path, bytes)?)))
        .collect::<Result<Vec<_>>>()?;

    for (path, name, len, tmp) in staged {
        tmp.persist(path).map_err(|e| e.error)?;
        debug!(artifact = name, path = %path.display(), bytes = len, "Artifact committed");
    }
    Ok(())
}
