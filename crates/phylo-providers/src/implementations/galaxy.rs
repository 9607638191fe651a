//! Backend remoto sobre la API REST de Galaxy.
//!
//! Cada ejecución vive en una history propia (el "run context"). Los tools se
//! identifican por su id de toolshed y reciben un mapa de inputs fijo por
//! método; sólo la elección del método es configurable.
//!
//! Una búsqueda sin resultados suele producir un dataset vacío en lugar de
//! ninguno, así que `search` espera a que el dataset termine y trata 0 bytes
//! como miss.

use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::{debug, info};
use phylo_domain::{AlignmentMethod, ArtifactHandle, GeneQuery, TreeMethod};
use serde_json::{json, Value};

use crate::{PhyloBackend, ProviderError};

pub const SEARCH_TOOL_ID: &str = "ncbi_esearch";
pub const MERGED_COLLECTION_NAME: &str = "merged_fasta";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_POLLS: u32 = 1800;

/// Transporte hacia Galaxy. Separado del backend para poder sustituirlo en tests.
pub trait GalaxyApi: fmt::Debug {
    /// POST con cuerpo JSON; devuelve el JSON de respuesta.
    fn post_json(&self, path: &str, body: &Value) -> Result<Value, ProviderError>;
    fn get_json(&self, path: &str) -> Result<Value, ProviderError>;
    /// GET de contenido binario escrito en `dest`; devuelve los bytes escritos.
    fn download(&self, path: &str, dest: &Path) -> Result<u64, ProviderError>;
}

/// Cliente HTTP bloqueante (`ureq`) autenticado con `x-api-key`.
pub struct UreqGalaxyApi {
    base_url: String,
    api_key: String,
    agent: ureq::Agent,
}

impl UreqGalaxyApi {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { base_url: base_url.trim_end_matches('/').to_string(),
               api_key: api_key.to_string(),
               agent }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl fmt::Debug for UreqGalaxyApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqGalaxyApi")
         .field("base_url", &self.base_url)
         .field("api_key", &"<redacted>")
         .finish()
    }
}

impl GalaxyApi for UreqGalaxyApi {
    fn post_json(&self, path: &str, body: &Value) -> Result<Value, ProviderError> {
        debug!("galaxy:post path={path}");
        let resp = self.agent
                       .post(&self.url(path))
                       .set("x-api-key", &self.api_key)
                       .send_json(body.clone())
                       .map_err(|e| ProviderError::from_ureq(path, e))?;
        resp.into_json::<Value>()
            .map_err(|e| ProviderError::unexpected(path, e.to_string()))
    }

    fn get_json(&self, path: &str) -> Result<Value, ProviderError> {
        debug!("galaxy:get path={path}");
        let resp = self.agent
                       .get(&self.url(path))
                       .set("x-api-key", &self.api_key)
                       .call()
                       .map_err(|e| ProviderError::from_ureq(path, e))?;
        resp.into_json::<Value>()
            .map_err(|e| ProviderError::unexpected(path, e.to_string()))
    }

    fn download(&self, path: &str, dest: &Path) -> Result<u64, ProviderError> {
        debug!("galaxy:download path={path} dest={}", dest.display());
        let resp = self.agent
                       .get(&self.url(path))
                       .set("x-api-key", &self.api_key)
                       .call()
                       .map_err(|e| ProviderError::from_ureq(path, e))?;
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ProviderError::io(parent, e))?;
        }
        let mut file = File::create(dest).map_err(|e| ProviderError::io(dest, e))?;
        io::copy(&mut resp.into_reader(), &mut file).map_err(|e| ProviderError::io(dest, e))
    }
}

/// Expresión de búsqueda NCBI restringida a registros RefSeq.
pub fn search_expression(query: &GeneQuery) -> String {
    format!("{}[gene] AND \"{}\"[orgn] AND refseq[filter]", query.gene(), query.organism())
}

pub fn alignment_tool_id(method: AlignmentMethod) -> &'static str {
    match method {
        AlignmentMethod::Mafft => "toolshed.g2.bx.psu.edu/repos/devteam/mafft/mafft/7.221.1",
        AlignmentMethod::ClustalOmega => "toolshed.g2.bx.psu.edu/repos/devteam/clustalomega/clustalomega/1.2.0",
        AlignmentMethod::Muscle => "toolshed.g2.bx.psu.edu/repos/devteam/muscle/muscle/3.8.31",
    }
}

pub fn tree_tool_id(method: TreeMethod) -> &'static str {
    match method {
        TreeMethod::FastTree => "toolshed.g2.bx.psu.edu/repos/iuc/fasttree/fasttree/2.1.10",
        TreeMethod::Raxml => "toolshed.g2.bx.psu.edu/repos/iuc/raxml/raxml/8.2.12.1",
        TreeMethod::IqTree => "toolshed.g2.bx.psu.edu/repos/iuc/iqtree/iqtree/2.1.2",
    }
}

/// Inputs del tool de árbol: dataset de entrada más hiperparámetros fijos.
pub fn tree_tool_inputs(method: TreeMethod, alignment: &Value) -> Value {
    let mut inputs = json!({ "input": alignment });
    let fixed = match method {
        TreeMethod::FastTree => json!({ "model": "JTT+CAT" }),
        TreeMethod::Raxml => json!({ "model": "PROTGAMMAJTT", "bootstrap_replicates": 100 }),
        TreeMethod::IqTree => json!({ "model": "AUTO", "ultrafast_bootstrap": 1000 }),
    };
    if let (Value::Object(map), Value::Object(extra)) = (&mut inputs, fixed) {
        map.extend(extra);
    }
    inputs
}

/// Referencia `{src, id}` que Galaxy espera para un dataset o colección.
fn input_ref(handle: &ArtifactHandle) -> Result<Value, ProviderError> {
    match handle {
        ArtifactHandle::RemoteDataset { id } => Ok(json!({ "src": "hda", "id": id })),
        ArtifactHandle::RemoteCollection { id } => Ok(json!({ "src": "hdca", "id": id })),
        other => Err(ProviderError::UnsupportedHandle { backend: "galaxy",
                                                        handle: other.to_string() }),
    }
}

fn string_field(value: &Value, field: &str, endpoint: &str) -> Result<String, ProviderError> {
    value.get(field)
         .and_then(Value::as_str)
         .map(str::to_string)
         .ok_or_else(|| ProviderError::unexpected(endpoint, format!("missing string field `{field}`")))
}

#[derive(Debug)]
pub struct GalaxyBackend<A: GalaxyApi> {
    api: A,
    history_id: String,
    poll_interval: Duration,
    max_polls: u32,
}

impl<A: GalaxyApi> GalaxyBackend<A> {
    /// Crea la history de la ejecución.
    pub fn start(api: A, history_name: &str) -> Result<Self, ProviderError> {
        let endpoint = "/api/histories";
        let resp = api.post_json(endpoint, &json!({ "name": history_name }))?;
        let history_id = string_field(&resp, "id", endpoint)?;
        info!("galaxy:history created id={history_id} name={history_name}");
        Ok(Self { api,
                  history_id,
                  poll_interval: DEFAULT_POLL_INTERVAL,
                  max_polls: DEFAULT_MAX_POLLS })
    }

    /// Cadencia y límite de consultas al esperar un dataset.
    pub fn with_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls;
        self
    }

    pub fn history_id(&self) -> &str {
        &self.history_id
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Ejecuta un tool y devuelve los ids de sus datasets de salida.
    fn run_tool(&self, tool_id: &str, inputs: Value) -> Result<Vec<String>, ProviderError> {
        let endpoint = "/api/tools";
        let body = json!({
            "history_id": self.history_id,
            "tool_id": tool_id,
            "inputs": inputs,
        });
        let resp = self.api.post_json(endpoint, &body)?;
        let outputs = resp.get("outputs")
                          .and_then(Value::as_array)
                          .ok_or_else(|| ProviderError::unexpected(endpoint, "missing `outputs` array"))?;
        outputs.iter().map(|o| string_field(o, "id", endpoint)).collect()
    }

    /// Espera a que el dataset llegue a un estado final y devuelve su tamaño.
    fn wait_for_dataset(&self, id: &str) -> Result<u64, ProviderError> {
        let endpoint = format!("/api/datasets/{id}");
        for _ in 0..self.max_polls {
            let resp = self.api.get_json(&endpoint)?;
            let state = string_field(&resp, "state", &endpoint)?;
            match state.as_str() {
                "ok" => return Ok(resp.get("file_size").and_then(Value::as_u64).unwrap_or(0)),
                "empty" => return Ok(0),
                "error" | "failed_metadata" | "discarded" | "paused" => {
                    return Err(ProviderError::unexpected(&endpoint, format!("dataset {id} ended in state {state}")))
                }
                _ => thread::sleep(self.poll_interval),
            }
        }
        Err(ProviderError::unexpected(&endpoint,
                                      format!("dataset {id} not ready after {} polls", self.max_polls)))
    }

    fn first_output(&self, tool_id: &str, inputs: Value) -> Result<ArtifactHandle, ProviderError> {
        self.run_tool(tool_id, inputs)?
            .into_iter()
            .next()
            .map(ArtifactHandle::dataset)
            .ok_or_else(|| ProviderError::unexpected("/api/tools", format!("{tool_id} produced no outputs")))
    }
}

impl<A: GalaxyApi> PhyloBackend for GalaxyBackend<A> {
    fn name(&self) -> &'static str {
        "galaxy"
    }

    fn search(&self, query: &GeneQuery) -> Result<Option<ArtifactHandle>, ProviderError> {
        let inputs = json!({
            "query": search_expression(query),
            "return_type": "protein_fasta",
        });
        let Some(id) = self.run_tool(SEARCH_TOOL_ID, inputs)?.into_iter().next() else {
            return Ok(None);
        };
        if self.wait_for_dataset(&id)? == 0 {
            debug!("galaxy:search empty dataset={id}");
            return Ok(None);
        }
        Ok(Some(ArtifactHandle::dataset(id)))
    }

    fn merge(&self, records: &[ArtifactHandle]) -> Result<ArtifactHandle, ProviderError> {
        let elements = records.iter()
                              .enumerate()
                              .map(|(i, h)| match h {
                                  ArtifactHandle::RemoteDataset { id } => {
                                      Ok(json!({ "name": format!("seq_{i}"), "src": "hda", "id": id }))
                                  }
                                  other => Err(ProviderError::UnsupportedHandle { backend: "galaxy",
                                                                                  handle: other.to_string() }),
                              })
                              .collect::<Result<Vec<Value>, _>>()?;
        let endpoint = format!("/api/histories/{}/contents", self.history_id);
        let body = json!({
            "type": "dataset_collection",
            "collection_type": "list",
            "name": MERGED_COLLECTION_NAME,
            "element_identifiers": elements,
        });
        let resp = self.api.post_json(&endpoint, &body)?;
        Ok(ArtifactHandle::collection(string_field(&resp, "id", &endpoint)?))
    }

    fn align(&self, composite: &ArtifactHandle, method: AlignmentMethod) -> Result<ArtifactHandle, ProviderError> {
        let inputs = json!({ "input_file": input_ref(composite)? });
        self.first_output(alignment_tool_id(method), inputs)
    }

    fn build_tree(&self, alignment: &ArtifactHandle, method: TreeMethod) -> Result<ArtifactHandle, ProviderError> {
        let inputs = tree_tool_inputs(method, &input_ref(alignment)?);
        self.first_output(tree_tool_id(method), inputs)
    }

    fn export(&self, tree: &ArtifactHandle, target: &Path) -> Result<PathBuf, ProviderError> {
        let id = match tree {
            ArtifactHandle::RemoteDataset { id } => id,
            other => {
                return Err(ProviderError::UnsupportedHandle { backend: "galaxy",
                                                              handle: other.to_string() })
            }
        };
        let bytes = self.api.download(&format!("/api/datasets/{id}/display"), target)?;
        info!("galaxy:export dataset={id} bytes={bytes} path={}", target.display());
        Ok(target.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Transporte falso: registra cada request y responde según el path.
    #[derive(Debug, Default)]
    struct FakeApi {
        posts: RefCell<Vec<(String, Value)>>,
        gets: RefCell<Vec<String>>,
        empty_search: bool,
        /// Tamaño informado para los datasets.
        dataset_size: u64,
        /// Consultas que responden "running" antes de "ok".
        running_polls: usize,
        final_state: Option<&'static str>,
    }

    impl GalaxyApi for FakeApi {
        fn post_json(&self, path: &str, body: &Value) -> Result<Value, ProviderError> {
            let n = self.posts.borrow().len();
            self.posts.borrow_mut().push((path.to_string(), body.clone()));
            if path == "/api/tools" && self.empty_search && body["tool_id"] == SEARCH_TOOL_ID {
                return Ok(json!({ "outputs": [] }));
            }
            Ok(json!({ "id": format!("id{n}"), "outputs": [{ "id": format!("out{n}") }] }))
        }

        fn get_json(&self, path: &str) -> Result<Value, ProviderError> {
            self.gets.borrow_mut().push(path.to_string());
            if self.gets.borrow().len() <= self.running_polls {
                return Ok(json!({ "state": "running", "file_size": 0 }));
            }
            Ok(json!({ "state": self.final_state.unwrap_or("ok"), "file_size": self.dataset_size }))
        }

        fn download(&self, _path: &str, dest: &Path) -> Result<u64, ProviderError> {
            fs::write(dest, "(a,b);").map_err(|e| ProviderError::io(dest, e))?;
            Ok(6)
        }
    }

    fn with_api(api: FakeApi) -> GalaxyBackend<FakeApi> {
        GalaxyBackend::start(api, "Flagellin Analysis").unwrap()
                                                       .with_polling(Duration::ZERO, 5)
    }

    fn backend(empty_search: bool) -> GalaxyBackend<FakeApi> {
        with_api(FakeApi { empty_search,
                           dataset_size: 412,
                           ..FakeApi::default() })
    }

    #[test]
    fn start_creates_named_history() {
        let b = backend(false);
        assert_eq!(b.history_id(), "id0");
        let posts = b.api().posts.borrow();
        assert_eq!(posts[0], ("/api/histories".to_string(), json!({ "name": "Flagellin Analysis" })));
    }

    #[test]
    fn search_submits_refseq_expression() {
        let b = backend(false);
        let q = GeneQuery::new("fliC", "Escherichia coli").unwrap();
        let h = b.search(&q).unwrap();
        assert_eq!(h, Some(ArtifactHandle::dataset("out1")));
        let posts = b.api().posts.borrow();
        let body = &posts[1].1;
        assert_eq!(body["tool_id"], SEARCH_TOOL_ID);
        assert_eq!(body["history_id"], "id0");
        assert_eq!(body["inputs"]["query"], r#"fliC[gene] AND "Escherichia coli"[orgn] AND refseq[filter]"#);
        assert_eq!(body["inputs"]["return_type"], "protein_fasta");
    }

    #[test]
    fn search_without_outputs_is_a_miss() {
        let b = backend(true);
        let q = GeneQuery::new("madeUpGene123", "Nonexistent organism").unwrap();
        assert_eq!(b.search(&q).unwrap(), None);
        assert!(b.api().gets.borrow().is_empty());
    }

    #[test]
    fn search_with_empty_dataset_is_a_miss() {
        let b = with_api(FakeApi { running_polls: 2,
                                   ..FakeApi::default() });
        let q = GeneQuery::new("madeUpGene123", "Nonexistent organism").unwrap();
        assert_eq!(b.search(&q).unwrap(), None);
        assert_eq!(*b.api().gets.borrow(), vec!["/api/datasets/out1"; 3]);

        let b = with_api(FakeApi { final_state: Some("empty"),
                                   dataset_size: 10,
                                   ..FakeApi::default() });
        assert_eq!(b.search(&q).unwrap(), None);
    }

    #[test]
    fn search_dataset_errors_are_fatal() {
        let q = GeneQuery::new("fliC", "Escherichia coli").unwrap();
        let b = with_api(FakeApi { final_state: Some("error"),
                                   ..FakeApi::default() });
        assert!(matches!(b.search(&q), Err(ProviderError::UnexpectedResponse { .. })));

        let b = with_api(FakeApi { running_polls: 10,
                                   dataset_size: 412,
                                   ..FakeApi::default() });
        let err = b.search(&q).unwrap_err();
        assert!(err.to_string().contains("not ready after 5 polls"));
    }

    #[test]
    fn merge_builds_list_collection() {
        let b = backend(false);
        let h = b.merge(&[ArtifactHandle::dataset("d1"), ArtifactHandle::dataset("d2")]).unwrap();
        assert_eq!(h, ArtifactHandle::collection("id1"));
        let posts = b.api().posts.borrow();
        let (path, body) = &posts[1];
        assert_eq!(path, "/api/histories/id0/contents");
        assert_eq!(body["name"], MERGED_COLLECTION_NAME);
        assert_eq!(body["collection_type"], "list");
        assert_eq!(body["element_identifiers"],
                   json!([{ "name": "seq_0", "src": "hda", "id": "d1" },
                          { "name": "seq_1", "src": "hda", "id": "d2" }]));
    }

    #[test]
    fn merge_rejects_local_handles() {
        let b = backend(false);
        let err = b.merge(&[ArtifactHandle::local("/tmp/a.fasta")]).unwrap_err();
        assert!(matches!(err, ProviderError::UnsupportedHandle { backend: "galaxy", .. }));
    }

    #[test]
    fn align_dispatches_one_tool_per_method() {
        for method in AlignmentMethod::ALL {
            let b = backend(false);
            b.align(&ArtifactHandle::collection("c1"), method).unwrap();
            let posts = b.api().posts.borrow();
            assert_eq!(posts.len(), 2);
            assert_eq!(posts[1].1["tool_id"], alignment_tool_id(method));
            assert_eq!(posts[1].1["inputs"], json!({ "input_file": { "src": "hdca", "id": "c1" } }));
        }
    }

    #[test]
    fn tree_inputs_carry_fixed_hyperparameters() {
        let aln = json!({ "src": "hda", "id": "a1" });
        assert_eq!(tree_tool_inputs(TreeMethod::FastTree, &aln),
                   json!({ "input": aln, "model": "JTT+CAT" }));
        assert_eq!(tree_tool_inputs(TreeMethod::Raxml, &aln),
                   json!({ "input": aln, "model": "PROTGAMMAJTT", "bootstrap_replicates": 100 }));
        assert_eq!(tree_tool_inputs(TreeMethod::IqTree, &aln),
                   json!({ "input": aln, "model": "AUTO", "ultrafast_bootstrap": 1000 }));

        let b = backend(false);
        let tree = b.build_tree(&ArtifactHandle::dataset("a1"), TreeMethod::IqTree).unwrap();
        assert_eq!(tree, ArtifactHandle::dataset("out1"));
        assert_eq!(b.api().posts.borrow()[1].1["tool_id"], tree_tool_id(TreeMethod::IqTree));
    }

    #[test]
    fn export_downloads_dataset_display() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("treefile.newick");
        let b = backend(false);
        let path = b.export(&ArtifactHandle::dataset("t1"), &target).unwrap();
        assert_eq!(path, target);
        assert_eq!(fs::read_to_string(&target).unwrap(), "(a,b);");
    }

    #[test]
    fn api_key_is_not_printed() {
        let api = UreqGalaxyApi::new("http://galaxy.test/", "secret-key", Duration::from_secs(5));
        let dbg = format!("{api:?}");
        assert!(!dbg.contains("secret-key"));
        assert_eq!(api.url("/api/tools"), "http://galaxy.test/api/tools");
    }
}
