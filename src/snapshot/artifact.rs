//! Snapshot artifacts and the ordered split result

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Role of an artifact within a split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ArtifactRole {
    Orchestrator,
    EntityUnit,
}

/// One generated unit: a file stem plus its source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub identifier: String,
    pub content: String,
    pub role: ArtifactRole,
}

impl Artifact {
    pub fn orchestrator(identifier: impl Into<String>, content: String) -> Self {
        Self {
            identifier: identifier.into(),
            content,
            role: ArtifactRole::Orchestrator,
        }
    }

    pub fn entity_unit(identifier: impl Into<String>, content: String) -> Self {
        Self {
            identifier: identifier.into(),
            content,
            role: ArtifactRole::EntityUnit,
        }
    }
}

/// Ordered artifacts of one split. The orchestrator is always first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitResult {
    artifacts: Vec<Artifact>,
}

impl SplitResult {
    pub fn new(orchestrator: Artifact, units: Vec<Artifact>) -> Self {
        debug_assert_eq!(orchestrator.role, ArtifactRole::Orchestrator);
        let mut artifacts = Vec::with_capacity(units.len() + 1);
        artifacts.push(orchestrator);
        artifacts.extend(units);
        Self { artifacts }
    }

    /// The orchestrator, i.e. "the" snapshot file
    pub fn primary(&self) -> &Artifact {
        &self.artifacts[0]
    }

    pub fn entity_units(&self) -> &[Artifact] {
        &self.artifacts[1..]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Artifact> {
        self.artifacts.iter()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Never true; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// SHA-256 over identifiers and contents, in order
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        for artifact in &self.artifacts {
            hasher.update(artifact.identifier.as_bytes());
            hasher.update([0u8]);
            hasher.update(artifact.content.as_bytes());
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }
}

impl<'a> IntoIterator for &'a SplitResult {
    type Item = &'a Artifact;
    type IntoIter = std::slice::Iter<'a, Artifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.artifacts.iter()
    }
}

impl IntoIterator for SplitResult {
    type Item = Artifact;
    type IntoIter = std::vec::IntoIter<Artifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.artifacts.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orchestrator_first() {
        let result = SplitResult::new(
            Artifact::orchestrator("ShopSnapshot", "o".to_string()),
            vec![
                Artifact::entity_unit("UserSnapshot", "u".to_string()),
                Artifact::entity_unit("OrderSnapshot", "r".to_string()),
            ],
        );

        assert_eq!(result.len(), 3);
        assert_eq!(result.primary().identifier, "ShopSnapshot");
        assert_eq!(result.entity_units()[1].identifier, "OrderSnapshot");
    }

    #[test]
    fn test_checksum_tracks_content() {
        let a = SplitResult::new(Artifact::orchestrator("S", "one".to_string()), vec![]);
        let b = SplitResult::new(Artifact::orchestrator("S", "one".to_string()), vec![]);
        let c = SplitResult::new(Artifact::orchestrator("S", "two".to_string()), vec![]);

        assert_eq!(a.checksum(), b.checksum());
        assert_ne!(a.checksum(), c.checksum());
    }
}
