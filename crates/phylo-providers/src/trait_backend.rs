use std::fmt;
use std::path::{Path, PathBuf};

use phylo_domain::{AlignmentMethod, ArtifactHandle, GeneQuery, TreeMethod};

use crate::ProviderError;

/// Capacidad común a los modos de orquestación.
///
/// Cada operación es una llamada bloqueante request/response sin reintentos.
/// Los handles devueltos sólo tienen sentido para el mismo backend.
pub trait PhyloBackend: fmt::Debug {
    /// Nombre corto del modo (`galaxy`, `local`, `mock`).
    fn name(&self) -> &'static str;

    /// Busca un registro de referencia para la query. `Ok(None)` es un miss.
    fn search(&self, query: &GeneQuery) -> Result<Option<ArtifactHandle>, ProviderError>;

    /// Combina los registros en un único artifact compuesto.
    fn merge(&self, records: &[ArtifactHandle]) -> Result<ArtifactHandle, ProviderError>;

    fn align(&self, composite: &ArtifactHandle, method: AlignmentMethod) -> Result<ArtifactHandle, ProviderError>;

    fn build_tree(&self, alignment: &ArtifactHandle, method: TreeMethod) -> Result<ArtifactHandle, ProviderError>;

    /// Materializa el árbol como archivo local en `target` y devuelve la ruta.
    fn export(&self, tree: &ArtifactHandle, target: &Path) -> Result<PathBuf, ProviderError>;
}
