//! Evidence references: the provenance attached to every edge

use super::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of clinical system an evidence record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Fhir,
    Dicom,
    Note,
    Lab,
    Device,
    Claims,
    Synthetic,
}

impl Source {
    /// Every source kind, in declaration order
    pub const ALL: [Source; 7] = [
        Source::Fhir,
        Source::Dicom,
        Source::Note,
        Source::Lab,
        Source::Device,
        Source::Claims,
        Source::Synthetic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Fhir => "fhir",
            Source::Dicom => "dicom",
            Source::Note => "note",
            Source::Lab => "lab",
            Source::Device => "device",
            Source::Claims => "claims",
            Source::Synthetic => "synthetic",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Source {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Source::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownSource(s.to_string()))
    }
}

/// One piece of supporting evidence for a relationship.
///
/// Immutable once built: fields are only reachable through accessors, and
/// edges share a single allocation per citation. Two references with equal
/// fields are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawEvidence")]
pub struct EvidenceRef {
    source: Source,
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    captured_at: Option<DateTime<Utc>>,
}

impl EvidenceRef {
    /// Create an evidence reference for a source record
    pub fn new(source: Source, id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::EmptyEvidenceId);
        }
        Ok(Self {
            source,
            id,
            uri: None,
            captured_at: None,
        })
    }

    /// Set the retrieval URI
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set the capture timestamp
    pub fn captured_at(mut self, at: DateTime<Utc>) -> Self {
        self.captured_at = Some(at);
        self
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn captured(&self) -> Option<DateTime<Utc>> {
        self.captured_at
    }
}

impl std::fmt::Display for EvidenceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.source, self.id)
    }
}

/// Wire shape of an evidence reference, validated on the way in
#[derive(Deserialize)]
struct RawEvidence {
    source: Source,
    id: String,
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    captured_at: Option<DateTime<Utc>>,
}

impl TryFrom<RawEvidence> for EvidenceRef {
    type Error = ValidationError;

    fn try_from(raw: RawEvidence) -> Result<Self, Self::Error> {
        let mut evidence = EvidenceRef::new(raw.source, raw.id)?;
        evidence.uri = raw.uri;
        evidence.captured_at = raw.captured_at;
        Ok(evidence)
    }
}
