//! Source-embedded emitter
//!
//! Renders an artifact as a Rust byte-array constant that the consuming
//! program can `include!`:
//!
//! ```text
//! // Generated by ime-datagen. DO NOT EDIT.
//! pub mod mozc {
//! pub const EXISTENCE_FILTER_SIZE: usize = 12;
//! pub static EXISTENCE_FILTER_DATA: [u8; 12] = [
//!     0x04, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00, 0x91, 0x20, 0x4c, 0x02,
//! ];
//! }  // mod mozc
//! ```
//!
//! Nothing run-dependent (time, paths, hash-map order) reaches the output.

use std::io::Write;

use crate::domain::config::{is_identifier, EmitFormat};
use crate::error::{GenError, Result};
use crate::ports::{Artifact, ArtifactEmitter};

/// Bytes per line of the array literal
pub const BYTES_PER_LINE: usize = 16;

const GENERATED_BANNER: &str = "// Generated by ime-datagen. DO NOT EDIT.";

#[derive(Clone, Debug)]
pub struct SourceEmbeddedEmitter {
    /// Module path segments, outermost first
    modules: Vec<String>,
}

impl SourceEmbeddedEmitter {
    /// `namespace` is a `::`-separated module path; empty means top level
    pub fn new(namespace: &str) -> Result<Self> {
        EmitFormat::source(namespace).validate()?;
        let modules = if namespace.is_empty() {
            Vec::new()
        } else {
            namespace.split("::").map(str::to_string).collect()
        };
        Ok(Self { modules })
    }
}

/// `ExistenceFilter` -> `EXISTENCE_FILTER`, `SegmenterLTable` -> `SEGMENTER_L_TABLE`
pub fn constant_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_lower)
            {
                out.push('_');
            }
        }
        out.push(c.to_ascii_uppercase());
    }
    out
}

impl ArtifactEmitter for SourceEmbeddedEmitter {
    fn emit(&self, artifact: &Artifact, sink: &mut dyn Write) -> Result<()> {
        if !is_identifier(artifact.name()) {
            return Err(GenError::Configuration(format!(
                "artifact name {:?} is not an identifier",
                artifact.name()
            )));
        }
        let constant = constant_name(artifact.name());
        let len = artifact.len();

        writeln!(sink, "{}", GENERATED_BANNER)?;
        for module in &self.modules {
            writeln!(sink, "pub mod {} {{", module)?;
        }
        writeln!(sink, "pub const {}_SIZE: usize = {};", constant, len)?;
        writeln!(sink, "pub static {}_DATA: [u8; {}] = [", constant, len)?;
        for line in artifact.bytes().chunks(BYTES_PER_LINE) {
            let cells: Vec<String> = line.iter().map(|b| format!("0x{:02x},", b)).collect();
            writeln!(sink, "    {}", cells.join(" "))?;
        }
        writeln!(sink, "];")?;
        for module in self.modules.iter().rev() {
            writeln!(sink, "}}  // mod {}", module)?;
        }
        Ok(())
    }
}
