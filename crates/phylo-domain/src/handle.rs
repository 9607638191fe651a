use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Referencia opaca a un artifact externo (archivo local o dataset remoto).
///
/// Los stages nunca inspeccionan el contenido: sólo pasan el handle al
/// siguiente stage del mismo backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactHandle {
    LocalFile { path: PathBuf },
    RemoteDataset { id: String },
    RemoteCollection { id: String },
}

impl ArtifactHandle {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        ArtifactHandle::LocalFile { path: path.into() }
    }

    pub fn dataset(id: impl Into<String>) -> Self {
        ArtifactHandle::RemoteDataset { id: id.into() }
    }

    pub fn collection(id: impl Into<String>) -> Self {
        ArtifactHandle::RemoteCollection { id: id.into() }
    }

    pub fn as_local_path(&self) -> Option<&Path> {
        match self {
            ArtifactHandle::LocalFile { path } => Some(path),
            _ => None,
        }
    }

    pub fn remote_id(&self) -> Option<&str> {
        match self {
            ArtifactHandle::RemoteDataset { id } | ArtifactHandle::RemoteCollection { id } => Some(id),
            ArtifactHandle::LocalFile { .. } => None,
        }
    }
}

impl fmt::Display for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactHandle::LocalFile { path } => write!(f, "file:{}", path.display()),
            ArtifactHandle::RemoteDataset { id } => write!(f, "hda:{id}"),
            ArtifactHandle::RemoteCollection { id } => write!(f, "hdca:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_kind_tag() {
        let h = ArtifactHandle::collection("c0ffee");
        assert_eq!(serde_json::to_value(&h).unwrap(), json!({"kind": "remote_collection", "id": "c0ffee"}));
        assert_eq!(h.remote_id(), Some("c0ffee"));
        assert!(h.as_local_path().is_none());
        assert_eq!(ArtifactHandle::local("/w/a.fasta").to_string(), "file:/w/a.fasta");
    }
}
