//! Constantes del motor core.
//!
//! Estos valores participan en el cálculo de fingerprints: cambiarlos
//! invalida los fingerprints de ejecuciones anteriores aunque la definición y
//! los datos no cambien.

/// Versión lógica del motor. Se incluye en cada fingerprint de step y de flow.
pub const ENGINE_VERSION: &str = "P1.0";

/// Nombre del campo que lleva la versión de esquema dentro del payload de un
/// artifact tipado.
pub const SCHEMA_VERSION_FIELD: &str = "schema_version";
