//! Artifacts tipados que fluyen entre los steps del pipeline.
//!
//! Cada uno serializa a un `phylo_core::Artifact` con su `ArtifactKind` y un
//! `schema_version` estable; el engine calcula el hash sobre el payload
//! canónico. Los handles se guardan tal cual los devolvió el backend.

use std::path::PathBuf;

use phylo_core::{typed_artifact, ArtifactKind};
use phylo_domain::{AlignmentMethod, ArtifactHandle, GeneQuery, TreeMethod};
use serde::{Deserialize, Serialize};

/// Registro recuperado para una query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub query: GeneQuery,
    pub handle: ArtifactHandle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord {
    pub method: TreeMethod,
    pub handle: ArtifactHandle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedFile {
    pub method: TreeMethod,
    pub path: PathBuf,
}

// Resultado del stage de búsqueda; `records` conserva el orden de las queries.
typed_artifact!(FetchedSequences {
    records: Vec<SequenceRecord>,
    misses: Vec<GeneQuery>,
} kind: ArtifactKind::SequenceRecords);

typed_artifact!(CompositeSequences {
    handle: ArtifactHandle,
    member_count: usize,
} kind: ArtifactKind::SequenceComposite);

typed_artifact!(AlignedSequences {
    method: AlignmentMethod,
    handle: ArtifactHandle,
} kind: ArtifactKind::Alignment);

// Un árbol por método pedido, en el orden pedido.
typed_artifact!(TreeSet {
    trees: Vec<TreeRecord>,
} kind: ArtifactKind::TreeSet);

typed_artifact!(ExportedTrees {
    files: Vec<ExportedFile>,
} kind: ArtifactKind::ExportedFiles);

impl FetchedSequences {
    pub fn handles(&self) -> Vec<ArtifactHandle> {
        self.records.iter().map(|r| r.handle.clone()).collect()
    }
}
