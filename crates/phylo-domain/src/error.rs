use thiserror::Error;

/// Errores de dominio: selección de métodos y validación de entradas.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unsupported alignment method: {0}")]
    UnsupportedAlignmentMethod(String),
    #[error("Unsupported tree-building method: {0}")]
    UnsupportedTreeMethod(String),
    #[error("tree method listed twice: {0}")]
    DuplicateTreeMethod(String),
    #[error("at least one tree-building method is required")]
    NoTreeMethods,
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("serialization: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Serialization(e.to_string())
    }
}
