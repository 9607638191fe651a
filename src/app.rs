//! Selección de backend y ejecución de una corrida completa.

use std::path::Path;
use std::rc::Rc;

use log::info;
use phylo_adapters::{run_pipeline, PipelineConfig, PipelineReport};
use phylo_domain::GeneQuery;
use phylo_providers::implementations::entrez::DEFAULT_EUTILS_URL;
use phylo_providers::implementations::local::unique_run_dir;
use phylo_providers::{GalaxyBackend, LocalBackend, PhyloBackend, SystemToolRunner, UreqEntrezApi, UreqGalaxyApi};

use crate::config::{AppConfig, Mode};
use crate::errors::CoreError;

/// Lee la lista ordenada de queries. Una lista vacía no es un error aquí:
/// el stage de merge la rechaza.
pub fn load_queries(path: &Path) -> Result<Vec<GeneQuery>, CoreError> {
    let queries = GeneQuery::list_from_file(path)?;
    info!("config:queries path={} count={}", path.display(), queries.len());
    Ok(queries)
}

/// Construye el backend del modo configurado. En modo galaxy crea la history;
/// en modo local prepara el directorio de ejecución.
pub fn build_backend(config: &AppConfig) -> Result<Rc<dyn PhyloBackend>, CoreError> {
    match config.mode {
        Mode::Galaxy => {
            let key = config.galaxy_api_key
                            .as_deref()
                            .ok_or_else(|| CoreError::Config("GALAXY_API_KEY es obligatorio en modo galaxy".into()))?;
            let api = UreqGalaxyApi::new(&config.galaxy_url, key, config.http_timeout);
            let backend = GalaxyBackend::start(api, &config.history_name)?;
            Ok(Rc::new(backend))
        }
        Mode::Local => {
            let entrez = UreqEntrezApi::new(DEFAULT_EUTILS_URL, &config.entrez_email, config.http_timeout);
            let run_dir = config.run_dir
                                .clone()
                                .unwrap_or_else(|| unique_run_dir(&config.work_dir));
            let backend = LocalBackend::start(entrez, SystemToolRunner, run_dir)?;
            Ok(Rc::new(backend))
        }
    }
}

/// Ejecuta el pipeline completo con la configuración dada.
pub fn run(config: &AppConfig) -> Result<PipelineReport, CoreError> {
    config.validate()?;
    let queries = load_queries(&config.queries_file)?;
    let backend = build_backend(config)?;
    let pipeline = PipelineConfig { queries,
                                    align_method: config.align_method.as_str().to_string(),
                                    tree_methods: config.tree_selectors(),
                                    output: config.output.clone() };
    Ok(run_pipeline(backend, &pipeline)?)
}
