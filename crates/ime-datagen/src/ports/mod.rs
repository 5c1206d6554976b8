//! Ports Layer
//!
//! Defines the interfaces (traits) the generators depend on:
//! - Driven Ports (outbound) - where finished artifacts go

pub mod outbound;

pub use outbound::{Artifact, ArtifactEmitter};
