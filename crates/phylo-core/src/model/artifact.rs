//! Artifact neutral del flujo.
//!
//! Un `Artifact` es la unidad de datos intercambiada entre steps. Es neutral:
//! - `payload` es JSON genérico; el motor no interpreta su semántica.
//! - `hash` es calculado por el engine sobre el JSON canonicalizado (ver
//!   `hashing::to_canonical_json`).
//! - `metadata` permite anotar información auxiliar que no entra al hash.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tipos neutrales de artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// JSON genérico sin semántica.
    GenericJson,
    /// Referencias a registros de secuencia (uno por query encontrada).
    SequenceRecords,
    /// Referencia a un compuesto de secuencias (archivo combinado o colección).
    SequenceComposite,
    /// Referencia a un alineamiento múltiple.
    Alignment,
    /// Referencias a árboles filogenéticos.
    TreeSet,
    /// Archivos locales exportados.
    ExportedFiles,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub hash: String,            // hash canonical del payload (asignado por engine)
    pub payload: Value,          // contenido neutro JSON
    pub metadata: Option<Value>, // información auxiliar (no entra al hash)
}

impl Artifact {
    /// Constructor sin hash; el engine lo completa al almacenar el output.
    pub fn new_unhashed(kind: ArtifactKind, payload: Value, metadata: Option<Value>) -> Self {
        Self { kind,
               hash: String::new(),
               payload,
               metadata }
    }
}
