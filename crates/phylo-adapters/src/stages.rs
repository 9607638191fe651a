//! Los cinco stages del pipeline, escritos una sola vez contra `PhyloBackend`.
//!
//! Cada stage valida sus selectores antes de la primera llamada al backend,
//! de modo que un método no soportado no deja trabajo externo a medias.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use phylo_domain::newick::is_plausible_newick;
use phylo_domain::{AlignmentMethod, ArtifactHandle, GeneQuery, TreeMethod};
use phylo_providers::PhyloBackend;

use crate::artifacts::{AlignedSequences, CompositeSequences, ExportedFile, ExportedTrees, FetchedSequences,
                       SequenceRecord, TreeRecord, TreeSet};
use crate::StageError;

/// Busca un registro por query, en orden. Un miss se registra y no corta el
/// lote; cualquier otro error sí.
pub fn fetch_sequences<B>(backend: &B, queries: &[GeneQuery]) -> Result<FetchedSequences, StageError>
    where B: PhyloBackend + ?Sized
{
    info!("fetch:start backend={} queries={}", backend.name(), queries.len());
    let mut records = Vec::with_capacity(queries.len());
    let mut misses = Vec::new();
    for query in queries {
        match backend.search(query)? {
            Some(handle) => {
                info!("fetch:hit gene={} organism=\"{}\" handle={handle}", query.gene(), query.organism());
                records.push(SequenceRecord { query: query.clone(),
                                              handle });
            }
            None => {
                warn!("fetch:miss gene={} organism=\"{}\"", query.gene(), query.organism());
                misses.push(query.clone());
            }
        }
    }
    info!("fetch:done hits={} misses={}", records.len(), misses.len());
    Ok(FetchedSequences { records,
                          misses,
                          schema_version: 1 })
}

/// Combina los registros en un único artifact. Sin registros no hay nada que
/// alinear: falla antes de llamar al backend.
pub fn merge_records<B>(backend: &B, records: &[ArtifactHandle]) -> Result<CompositeSequences, StageError>
    where B: PhyloBackend + ?Sized
{
    if records.is_empty() {
        return Err(StageError::NoSequences);
    }
    let handle = backend.merge(records)?;
    info!("merge:done members={} handle={handle}", records.len());
    Ok(CompositeSequences { handle,
                            member_count: records.len(),
                            schema_version: 1 })
}

pub fn align_sequences<B>(backend: &B, composite: &ArtifactHandle, method: &str) -> Result<AlignedSequences, StageError>
    where B: PhyloBackend + ?Sized
{
    let method: AlignmentMethod = method.parse()?;
    info!("align:start method={method} input={composite}");
    let handle = backend.align(composite, method)?;
    info!("align:done method={method} handle={handle}");
    Ok(AlignedSequences { method,
                          handle,
                          schema_version: 1 })
}

/// Un árbol por selector, en el orden pedido. Todos los selectores se
/// validan antes del primer árbol.
pub fn build_trees<B, S>(backend: &B, alignment: &ArtifactHandle, methods: &[S]) -> Result<TreeSet, StageError>
    where B: PhyloBackend + ?Sized,
          S: AsRef<str>
{
    let methods = TreeMethod::parse_list(methods)?;
    let mut trees = Vec::with_capacity(methods.len());
    for method in methods {
        info!("tree:start method={method} input={alignment}");
        let handle = backend.build_tree(alignment, method)?;
        info!("tree:done method={method} handle={handle}");
        trees.push(TreeRecord { method, handle });
    }
    Ok(TreeSet { trees, schema_version: 1 })
}

/// Ruta de exportación: un único árbol va exactamente a `target`; con varios,
/// cada uno va a `<stem>.<method>.<ext>` junto a `target`.
pub fn export_path(target: &Path, method: TreeMethod, multiple: bool) -> PathBuf {
    if !multiple {
        return target.to_path_buf();
    }
    let stem = target.file_stem()
                     .map(|s| s.to_string_lossy().into_owned())
                     .unwrap_or_else(|| "tree".to_string());
    let name = match target.extension() {
        Some(ext) => format!("{stem}.{method}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{method}"),
    };
    target.with_file_name(name)
}

pub fn export_trees<B>(backend: &B, trees: &[TreeRecord], target: &Path) -> Result<ExportedTrees, StageError>
    where B: PhyloBackend + ?Sized
{
    let multiple = trees.len() > 1;
    let mut files = Vec::with_capacity(trees.len());
    for tree in trees {
        let dest = export_path(target, tree.method, multiple);
        let path = backend.export(&tree.handle, &dest)?;
        check_newick(&path);
        info!("export:done method={} path={}", tree.method, path.display());
        files.push(ExportedFile { method: tree.method,
                                  path });
    }
    Ok(ExportedTrees { files, schema_version: 1 })
}

// El contenido no se corrige; sólo se avisa.
fn check_newick(path: &Path) {
    match fs::read_to_string(path) {
        Ok(text) if is_plausible_newick(&text) => {}
        Ok(_) => warn!("export:suspicious_newick path={}", path.display()),
        Err(e) => warn!("export:unreadable path={} err={e}", path.display()),
    }
}
