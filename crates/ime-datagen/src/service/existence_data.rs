//! Existence Data Generator
//!
//! Turns a list of known strings into an `ExistenceFilter` artifact.
//! Configuration is validated and the filter sized before any entry is
//! hashed; nothing is emitted until the filter is complete.

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::adapters::{commit_artifact, emitter_for};
use crate::domain::{
    min_filter_size_for_error_rate, ExistenceConfig, ExistenceFilter, Fingerprinter,
    Murmur3Fingerprinter,
};
use crate::error::Result;
use crate::ports::{Artifact, ArtifactEmitter};

/// Artifact name of the filter blob
pub const EXISTENCE_FILTER_NAME: &str = "ExistenceFilter";

/// Existence filter generator
///
/// The fingerprint function and emitter are injected; nothing is global.
pub struct ExistenceDataGenerator<H: Fingerprinter = Murmur3Fingerprinter> {
    hasher: H,
    config: ExistenceConfig,
    emitter: Box<dyn ArtifactEmitter>,
}

impl ExistenceDataGenerator<Murmur3Fingerprinter> {
    /// Default fingerprint, emitter chosen by `config.format`
    pub fn new(config: ExistenceConfig) -> Result<Self> {
        Self::with_hasher(Murmur3Fingerprinter, config)
    }
}

impl<H: Fingerprinter> ExistenceDataGenerator<H> {
    pub fn with_hasher(hasher: H, config: ExistenceConfig) -> Result<Self> {
        config.validate()?;
        let emitter = emitter_for(&config.format)?;
        Ok(Self {
            hasher,
            config,
            emitter,
        })
    }

    /// Replace the emitter selected from the config
    pub fn with_emitter(mut self, emitter: Box<dyn ArtifactEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn config(&self) -> &ExistenceConfig {
        &self.config
    }

    /// Size, allocate and populate the filter
    pub fn build_filter<S: AsRef<str>>(&self, entries: &[S]) -> Result<ExistenceFilter> {
        let n = entries.len();
        self.config.check_entry_count(n)?;
        let sizing = min_filter_size_for_error_rate(self.config.error_rate, n)?;
        info!(
            entries = n,
            error_rate = self.config.error_rate,
            bytes = sizing.size_bytes,
            "Sizing existence filter"
        );

        let mut filter = ExistenceFilter::create_optimal(sizing.size_bytes, n)?;
        for entry in entries {
            filter.insert(self.hasher.fingerprint_str(entry.as_ref()));
        }

        info!(
            hash_count = filter.hash_count(),
            bits_set = filter.bits_set(),
            size_bits = filter.size_bits(),
            expected_fpr = filter.expected_false_positive_rate(),
            "Existence filter built"
        );
        Ok(filter)
    }

    /// Build the filter and wrap its blob as an artifact
    pub fn generate<S: AsRef<str>>(&self, entries: &[S]) -> Result<Artifact> {
        let filter = self.build_filter(entries)?;
        Ok(Artifact::new(EXISTENCE_FILTER_NAME, filter.write()))
    }

    /// Generate and render into `sink`
    pub fn write_to<S: AsRef<str>>(&self, entries: &[S], sink: &mut dyn Write) -> Result<()> {
        let artifact = self.generate(entries)?;
        let rendered = self.emitter.render(&artifact)?;
        sink.write_all(&rendered)?;
        Ok(())
    }

    /// Generate and atomically replace the file at `path`
    pub fn write_file<S: AsRef<str>>(&self, entries: &[S], path: &Path) -> Result<()> {
        let artifact = self.generate(entries)?;
        commit_artifact(path, self.emitter.as_ref(), &artifact)?;
        info!(path = %path.display(), bytes = artifact.len(), "Existence data written");
        Ok(())
    }
}
