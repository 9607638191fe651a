//! Configuración central de la aplicación.
//!
//! Capas, de menor a mayor prioridad: `.env` (cargado una sola vez), variables
//! de entorno y flags de CLI. Los métodos se validan al armar la
//! configuración, de modo que un selector no soportado aborta antes de
//! cualquier stage.
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use once_cell::sync::Lazy;
use phylo_domain::{AlignmentMethod, TreeMethod};

use crate::cli::Cli;
use crate::errors::CoreError;

pub const DEFAULT_GALAXY_URL: &str = "http://example.galaxy.url";
pub const DEFAULT_HISTORY_NAME: &str = "Flagellin Analysis";
pub const DEFAULT_ENTREZ_EMAIL: &str = "your.email@example.com";
pub const DEFAULT_WORK_DIR: &str = "work";
pub const DEFAULT_QUERIES_FILE: &str = "data/flagellin_queries.json";
pub const DEFAULT_OUTPUT: &str = "treefile.newick";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 300;

/// Resultado de cargar `.env`, evaluado una sola vez. `None` si no existe.
static DOTENV: Lazy<Option<PathBuf>> = Lazy::new(|| dotenvy::dotenv().ok());

pub fn load_dotenv() -> Option<&'static PathBuf> {
    DOTENV.as_ref()
}

/// Modo de orquestación.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Cada stage es un job en un servidor Galaxy.
    Galaxy,
    /// Entrez + herramientas locales.
    Local,
}

impl FromStr for Mode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "galaxy" => Ok(Mode::Galaxy),
            "local" => Ok(Mode::Local),
            other => Err(CoreError::Config(format!("modo desconocido: {other}"))),
        }
    }
}

/// Configuración inmutable de una ejecución.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: Mode,
    pub galaxy_url: String,
    pub galaxy_api_key: Option<String>,
    pub history_name: String,
    pub entrez_email: String,
    pub work_dir: PathBuf,
    /// Directorio de ejecución explícito; si falta se genera uno único.
    pub run_dir: Option<PathBuf>,
    pub http_timeout: Duration,
    pub queries_file: PathBuf,
    pub align_method: AlignmentMethod,
    pub tree_methods: Vec<TreeMethod>,
    pub output: PathBuf,
}

impl AppConfig {
    /// Configuración desde `.env` + entorno del proceso.
    pub fn from_env() -> Result<Self, CoreError> {
        load_dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
        where F: Fn(&str) -> Option<String>
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mode = match var("PHYLOFLOW_MODE") {
            Some(m) => m.parse()?,
            None => Mode::Local,
        };
        let http_timeout = match var("PHYLOFLOW_HTTP_TIMEOUT_SECS") {
            Some(v) => {
                let secs: u64 = v.parse()
                                 .map_err(|_| CoreError::Config(format!("PHYLOFLOW_HTTP_TIMEOUT_SECS inválido: {v}")))?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self { mode,
                  galaxy_url: var("GALAXY_URL").unwrap_or_else(|| DEFAULT_GALAXY_URL.to_string()),
                  galaxy_api_key: var("GALAXY_API_KEY"),
                  history_name: var("GALAXY_HISTORY_NAME").unwrap_or_else(|| DEFAULT_HISTORY_NAME.to_string()),
                  entrez_email: var("ENTREZ_EMAIL").unwrap_or_else(|| DEFAULT_ENTREZ_EMAIL.to_string()),
                  work_dir: var("PHYLOFLOW_WORK_DIR").map(PathBuf::from)
                                                      .unwrap_or_else(|| PathBuf::from(DEFAULT_WORK_DIR)),
                  run_dir: None,
                  http_timeout,
                  queries_file: PathBuf::from(DEFAULT_QUERIES_FILE),
                  align_method: AlignmentMethod::default(),
                  tree_methods: vec![TreeMethod::FastTree],
                  output: PathBuf::from(DEFAULT_OUTPUT) })
    }

    /// Aplica los flags de CLI sobre la configuración de entorno y valida.
    pub fn with_cli(mut self, cli: &Cli) -> Result<Self, CoreError> {
        if let Some(mode) = cli.mode {
            self.mode = mode;
        }
        if let Some(q) = &cli.queries {
            self.queries_file = q.clone();
        }
        if let Some(dir) = &cli.work_dir {
            self.work_dir = dir.clone();
        }
        if let Some(dir) = &cli.run_dir {
            self.run_dir = Some(dir.clone());
        }
        if let Some(name) = &cli.history_name {
            self.history_name = name.clone();
        }
        if let Some(out) = &cli.output {
            self.output = out.clone();
        }
        self.align_method = cli.align.parse()?;
        if !cli.tree.is_empty() {
            self.tree_methods = TreeMethod::parse_list(cli.tree.as_slice())?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Falla si falta configuración obligatoria para el modo elegido.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.mode == Mode::Galaxy && self.galaxy_api_key.is_none() {
            return Err(CoreError::Config("GALAXY_API_KEY es obligatorio en modo galaxy".into()));
        }
        if self.tree_methods.is_empty() {
            return Err(CoreError::Config("se requiere al menos un método de árbol".into()));
        }
        Ok(())
    }

    /// Selectores de árbol en su forma canónica, en orden.
    pub fn tree_selectors(&self) -> Vec<String> {
        self.tree_methods.iter().map(|m| m.as_str().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.mode, Mode::Local);
        assert_eq!(cfg.galaxy_url, DEFAULT_GALAXY_URL);
        assert_eq!(cfg.history_name, "Flagellin Analysis");
        assert_eq!(cfg.entrez_email, DEFAULT_ENTREZ_EMAIL);
        assert_eq!(cfg.http_timeout, Duration::from_secs(300));
        assert_eq!(cfg.align_method, AlignmentMethod::Mafft);
        assert_eq!(cfg.tree_methods, vec![TreeMethod::FastTree]);
        assert_eq!(cfg.output, PathBuf::from("treefile.newick"));
    }

    #[test]
    fn environment_overrides_defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[("PHYLOFLOW_MODE", "Galaxy"),
                                                  ("GALAXY_API_KEY", "k"),
                                                  ("PHYLOFLOW_HTTP_TIMEOUT_SECS", "30"),
                                                  ("PHYLOFLOW_WORK_DIR", "/tmp/pf")])).unwrap();
        assert_eq!(cfg.mode, Mode::Galaxy);
        assert_eq!(cfg.galaxy_api_key.as_deref(), Some("k"));
        assert_eq!(cfg.http_timeout, Duration::from_secs(30));
        assert_eq!(cfg.work_dir, PathBuf::from("/tmp/pf"));
    }

    #[test]
    fn galaxy_mode_requires_api_key() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        let cli = Cli::parse_from(["phyloflow", "--mode", "galaxy"]);
        let err = cfg.with_cli(&cli).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn cli_methods_are_validated_up_front() {
        let base = AppConfig::from_lookup(lookup(&[])).unwrap();

        let cli = Cli::parse_from(["phyloflow", "--align", "clustalo", "--tree", "raxml", "--tree", "iqtree"]);
        let cfg = base.clone().with_cli(&cli).unwrap();
        assert_eq!(cfg.align_method, AlignmentMethod::ClustalOmega);
        assert_eq!(cfg.tree_selectors(), vec!["raxml", "iqtree"]);

        let cli = Cli::parse_from(["phyloflow", "--align", "nonexistent"]);
        assert!(matches!(base.clone().with_cli(&cli), Err(CoreError::Domain(_))));

        let cli = Cli::parse_from(["phyloflow", "--tree", "fasttree", "--tree", "fasttree"]);
        assert!(matches!(base.with_cli(&cli), Err(CoreError::Domain(_))));
    }

    #[test]
    fn bad_values_are_config_errors() {
        assert!(AppConfig::from_lookup(lookup(&[("PHYLOFLOW_MODE", "cluster")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("PHYLOFLOW_HTTP_TIMEOUT_SECS", "soon")])).is_err());
    }
}
