//! Flags de línea de comando. Todos son opcionales: lo que no se pasa sale
//! del entorno (ver `config`).
use std::path::PathBuf;

use clap::Parser;

use crate::config::Mode;

/// phyloflow - pipeline de filogenia de proteínas (fetch → merge → align → trees → export)
#[derive(Parser, Debug, Clone)]
#[command(name = "phyloflow")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Modo de orquestación (por defecto PHYLOFLOW_MODE o local)
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Archivo JSON con la lista de queries [{"gene", "organism"}]
    #[arg(long, value_name = "FILE")]
    pub queries: Option<PathBuf>,

    /// Método de alineamiento: mafft | clustal_omega | muscle
    #[arg(long, value_name = "METHOD", default_value = "mafft")]
    pub align: String,

    /// Método de árbol (repetible, en orden): fasttree | raxml | iqtree
    #[arg(long = "tree", value_name = "METHOD")]
    pub tree: Vec<String>,

    /// Archivo Newick de salida
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Raíz de los directorios de ejecución (modo local)
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Directorio de ejecución explícito (modo local)
    #[arg(long, value_name = "DIR")]
    pub run_dir: Option<PathBuf>,

    /// Nombre de la history (modo galaxy)
    #[arg(long, value_name = "NAME")]
    pub history_name: Option<String>,
}
