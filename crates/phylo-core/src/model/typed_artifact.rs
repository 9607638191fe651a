//! Infraestructura de tipado fuerte para `Artifact` manteniendo el núcleo agnóstico.
//! Permite describir artefactos con un tipo de datos concreto (T) y validaciones.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::{Artifact, ArtifactKind};
use crate::constants::SCHEMA_VERSION_FIELD;

/// Errores posibles al codificar/decodificar un artifact tipado.
#[derive(Debug, Error)]
pub enum ArtifactDecodeError {
    #[error("kind mismatch: expected {expected:?}, found {found:?}")]
    KindMismatch { expected: ArtifactKind, found: ArtifactKind },
    #[error("schema version mismatch: expected {expected}, found {found:?}")]
    VersionMismatch { expected: u32, found: Option<u32> },
    #[error("serde: {0}")]
    Serde(String),
    #[error("validation: {0}")]
    Validation(String),
}

/// Especificación abstracta de un artifact tipado.
pub trait ArtifactSpec: Sized + Serialize + DeserializeOwned + Clone {
    /// Kind asociado (permite distinguir en runtime).
    const KIND: ArtifactKind;
    /// Versión de esquema (incrementar en cambios incompatibles).
    const SCHEMA_VERSION: u32 = 1;

    /// Validación semántica ligera (sin efectos secundarios).
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Serializa a `Artifact` sin hash (lo añadirá el engine).
    fn into_artifact(self) -> Result<Artifact, ArtifactDecodeError> {
        let mut value = serde_json::to_value(&self).map_err(|e| ArtifactDecodeError::Serde(e.to_string()))?;
        if let Value::Object(map) = &mut value {
            map.entry(SCHEMA_VERSION_FIELD.to_string())
               .or_insert(Value::from(Self::SCHEMA_VERSION));
        }
        Ok(Artifact::new_unhashed(Self::KIND, value, None))
    }

    /// Decodifica desde artifact neutro verificando kind, versión y validación.
    fn from_artifact(a: &Artifact) -> Result<Self, ArtifactDecodeError> {
        if a.kind != Self::KIND {
            return Err(ArtifactDecodeError::KindMismatch { expected: Self::KIND,
                                                           found: a.kind.clone() });
        }
        let found = a.payload
                     .get(SCHEMA_VERSION_FIELD)
                     .and_then(|v| v.as_u64())
                     .map(|v| v as u32);
        if found != Some(Self::SCHEMA_VERSION) {
            return Err(ArtifactDecodeError::VersionMismatch { expected: Self::SCHEMA_VERSION,
                                                              found });
        }
        let decoded: Self =
            serde_json::from_value(a.payload.clone()).map_err(|e| ArtifactDecodeError::Serde(e.to_string()))?;
        decoded.validate().map_err(ArtifactDecodeError::Validation)?;
        Ok(decoded)
    }
}

/// Artifact tipado ya decodificado junto con su representación neutra.
pub struct TypedArtifact<T: ArtifactSpec> {
    pub inner: T,
    pub raw: Artifact, // mantiene representación original (hash incluido)
}

impl<T: ArtifactSpec> TypedArtifact<T> {
    pub fn decode(raw: &Artifact) -> Result<Self, ArtifactDecodeError> {
        let inner = T::from_artifact(raw)?;
        Ok(Self { inner, raw: raw.clone() })
    }
}
