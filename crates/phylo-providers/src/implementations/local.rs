//! Backend local: Entrez para la búsqueda y binarios locales para alinear y
//! construir árboles.
//!
//! Todos los intermedios se escriben en un directorio de ejecución propio y
//! los subprocesos corren con ese directorio como cwd, de modo que dos
//! ejecuciones no comparten nombres de archivo.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use phylo_domain::{AlignmentMethod, ArtifactHandle, GeneQuery, TreeMethod};
use uuid::Uuid;

use super::entrez::{search_term, EntrezApi, PROTEIN_DB};
use super::process::{ToolCommand, ToolRunner};
use crate::{PhyloBackend, ProviderError};

pub const SEQUENCES_DIR: &str = "sequences";
pub const COMBINED_FASTA: &str = "combined.fasta";

/// `<work_root>/run-<uuid>`: directorio único por ejecución.
pub fn unique_run_dir(work_root: &Path) -> PathBuf {
    work_root.join(format!("run-{}", Uuid::new_v4()))
}

/// Comando del alineador y archivo que producirá, dentro de `run_dir`.
pub fn alignment_command(method: AlignmentMethod, input: &Path, run_dir: &Path) -> (ToolCommand, PathBuf) {
    let output = run_dir.join(format!("alignment_{}.fasta", method.as_str()));
    let cmd = match method {
        AlignmentMethod::Mafft => ToolCommand::new("mafft").arg("--auto").arg(input).stdout_to(&output),
        AlignmentMethod::ClustalOmega => ToolCommand::new("clustalo").arg("-i")
                                                                   .arg(input)
                                                                   .arg("-o")
                                                                   .arg(&output)
                                                                   .arg("--force"),
        AlignmentMethod::Muscle => ToolCommand::new("muscle").arg("-in").arg(input).arg("-out").arg(&output),
    };
    (cmd, output)
}

/// Comando de inferencia de árbol y archivo que producirá, dentro de `run_dir`.
pub fn tree_command(method: TreeMethod, alignment: &Path, run_dir: &Path) -> (ToolCommand, PathBuf) {
    match method {
        TreeMethod::FastTree => {
            let stem = alignment.file_stem()
                                .map(|s| s.to_string_lossy().into_owned())
                                .unwrap_or_else(|| "alignment".to_string());
            let output = run_dir.join(format!("{stem}.fasttree.nwk"));
            (ToolCommand::new("FastTree").arg("-lg").arg(alignment).stdout_to(&output), output)
        }
        TreeMethod::Raxml => {
            let cmd = ToolCommand::new("raxmlHPC-PTHREADS").arg("-T")
                                                           .arg("2")
                                                           .arg("-s")
                                                           .arg(alignment)
                                                           .arg("-n")
                                                           .arg("raxml_tree")
                                                           .arg("-m")
                                                           .arg("PROTGAMMAJTT")
                                                           .arg("-p")
                                                           .arg("12345")
                                                           .arg("-#")
                                                           .arg("100");
            (cmd, run_dir.join("RAxML_bestTree.raxml_tree"))
        }
        TreeMethod::IqTree => {
            let cmd = ToolCommand::new("iqtree").arg("-s")
                                                .arg(alignment)
                                                .arg("-m")
                                                .arg("MFP")
                                                .arg("-B")
                                                .arg("1000")
                                                .arg("--prefix")
                                                .arg("iqtree_out");
            (cmd, run_dir.join("iqtree_out.treefile"))
        }
    }
}

#[derive(Debug)]
pub struct LocalBackend<E: EntrezApi, X: ToolRunner> {
    entrez: E,
    runner: X,
    run_dir: PathBuf,
}

impl<E: EntrezApi, X: ToolRunner> LocalBackend<E, X> {
    /// Prepara el directorio de ejecución (y su subdirectorio de secuencias).
    pub fn start(entrez: E, runner: X, run_dir: impl Into<PathBuf>) -> Result<Self, ProviderError> {
        let run_dir = run_dir.into();
        let seq_dir = run_dir.join(SEQUENCES_DIR);
        fs::create_dir_all(&seq_dir).map_err(|e| ProviderError::io(&seq_dir, e))?;
        // Rutas absolutas: los subprocesos corren con otro cwd.
        let run_dir = fs::canonicalize(&run_dir).map_err(|e| ProviderError::io(&run_dir, e))?;
        info!("local:run_dir path={}", run_dir.display());
        Ok(Self { entrez, runner, run_dir })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn entrez(&self) -> &E {
        &self.entrez
    }

    pub fn runner(&self) -> &X {
        &self.runner
    }

    fn local_path<'h>(&self, handle: &'h ArtifactHandle) -> Result<&'h Path, ProviderError> {
        handle.as_local_path()
              .ok_or_else(|| ProviderError::UnsupportedHandle { backend: "local",
                                                                handle: handle.to_string() })
    }

    fn run_expecting(&self, cmd: &ToolCommand, output: PathBuf) -> Result<ArtifactHandle, ProviderError> {
        self.runner.run(cmd, &self.run_dir)?;
        if !output.is_file() {
            return Err(ProviderError::MissingOutput { tool: cmd.program.clone(),
                                                      path: output });
        }
        Ok(ArtifactHandle::local(output))
    }
}

impl<E: EntrezApi, X: ToolRunner> PhyloBackend for LocalBackend<E, X> {
    fn name(&self) -> &'static str {
        "local"
    }

    fn search(&self, query: &GeneQuery) -> Result<Option<ArtifactHandle>, ProviderError> {
        let ids = self.entrez.esearch(PROTEIN_DB, &search_term(query), 1)?;
        let Some(id) = ids.into_iter().next() else {
            return Ok(None);
        };
        let fasta = self.entrez.efetch_fasta(PROTEIN_DB, &id)?;
        if !fasta.trim_start().starts_with('>') {
            return Err(ProviderError::unexpected("efetch.fcgi", format!("record {id} is not FASTA")));
        }
        let path = self.run_dir
                       .join(SEQUENCES_DIR)
                       .join(format!("{}.fasta", query.record_file_stem()));
        if path.exists() {
            warn!("local:search overwriting path={} query=\"{query}\"", path.display());
        }
        fs::write(&path, fasta).map_err(|e| ProviderError::io(&path, e))?;
        info!("local:search saved id={id} path={}", path.display());
        Ok(Some(ArtifactHandle::local(path)))
    }

    fn merge(&self, records: &[ArtifactHandle]) -> Result<ArtifactHandle, ProviderError> {
        let combined = self.run_dir.join(COMBINED_FASTA);
        let mut out = File::create(&combined).map_err(|e| ProviderError::io(&combined, e))?;
        for handle in records {
            let path = self.local_path(handle)?;
            let mut bytes = Vec::new();
            File::open(path).and_then(|mut f| f.read_to_end(&mut bytes))
                            .map_err(|e| ProviderError::io(path, e))?;
            if !bytes.is_empty() && !bytes.ends_with(b"\n") {
                bytes.push(b'\n');
            }
            out.write_all(&bytes).map_err(|e| ProviderError::io(&combined, e))?;
        }
        out.flush().map_err(|e| ProviderError::io(&combined, e))?;
        Ok(ArtifactHandle::local(combined))
    }

    fn align(&self, composite: &ArtifactHandle, method: AlignmentMethod) -> Result<ArtifactHandle, ProviderError> {
        let input = self.local_path(composite)?;
        let (cmd, output) = alignment_command(method, input, &self.run_dir);
        self.run_expecting(&cmd, output)
    }

    fn build_tree(&self, alignment: &ArtifactHandle, method: TreeMethod) -> Result<ArtifactHandle, ProviderError> {
        let input = self.local_path(alignment)?;
        let (cmd, output) = tree_command(method, input, &self.run_dir);
        self.run_expecting(&cmd, output)
    }

    fn export(&self, tree: &ArtifactHandle, target: &Path) -> Result<PathBuf, ProviderError> {
        let source = self.local_path(tree)?;
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ProviderError::io(parent, e))?;
        }
        if same_file(source, target) {
            return Ok(target.to_path_buf());
        }
        fs::copy(source, target).map_err(|e| ProviderError::io(target, e))?;
        info!("local:export from={} to={}", source.display(), target.display());
        Ok(target.to_path_buf())
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    matches!((fs::canonicalize(a), fs::canonicalize(b)), (Ok(a), Ok(b)) if a == b)
}
