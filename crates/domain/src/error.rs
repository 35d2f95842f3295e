use thiserror::Error;

use crate::sensor::AttributeKind;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// The tag type code is outside the known domain. Fatal for that tag:
    /// construction aborts.
    #[error("Unknown tag type code: {0}")]
    UnknownTagType(u16),

    #[error("Attribute {kind} not supported by tag type {tag_type}")]
    CapabilityMissing { kind: AttributeKind, tag_type: u16 },

    #[error("Unknown push event: {0}")]
    UnknownEvent(String),

    /// A command against the cloud tag manager reported failure.
    #[error("Tag manager command failed: {0}")]
    CommandFailed(String),

    #[error("Invalid tag record: {0}")]
    InvalidRecord(String),

    #[error("Tag not found: {0}")]
    TagNotFound(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
