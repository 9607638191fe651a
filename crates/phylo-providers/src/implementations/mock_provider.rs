use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use phylo_domain::{AlignmentMethod, ArtifactHandle, GeneQuery, TreeMethod};

use crate::{PhyloBackend, ProviderError};

/// Llamada registrada por el `MockBackend`, en el orden en que ocurrió.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Search(GeneQuery),
    Merge(Vec<ArtifactHandle>),
    Align(AlignmentMethod),
    BuildTree(TreeMethod),
    Export(PathBuf),
}

impl MockCall {
    pub fn stage(&self) -> &'static str {
        match self {
            MockCall::Search(_) => "search",
            MockCall::Merge(_) => "merge",
            MockCall::Align(_) => "align",
            MockCall::BuildTree(_) => "build_tree",
            MockCall::Export(_) => "export",
        }
    }
}

/// Backend en memoria para tests: handles deterministas, organismos sin
/// resultados configurables y fallo inyectable en un stage.
#[derive(Debug, Default)]
pub struct MockBackend {
    misses: HashSet<String>,
    fail_on: Option<&'static str>,
    calls: RefCell<Vec<MockCall>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Las búsquedas de este organismo no devuelven nada.
    pub fn with_miss(mut self, organism: &str) -> Self {
        self.misses.insert(organism.to_string());
        self
    }

    /// El stage indicado ("search", "merge", "align", "build_tree", "export")
    /// devuelve error.
    pub fn failing_on(mut self, stage: &'static str) -> Self {
        self.fail_on = Some(stage);
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self, stage: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.stage() == stage).count()
    }

    fn record(&self, call: MockCall) -> Result<(), ProviderError> {
        let stage = call.stage();
        self.calls.borrow_mut().push(call);
        if self.fail_on == Some(stage) {
            return Err(ProviderError::Api { endpoint: format!("mock/{stage}"),
                                            status: 500,
                                            body: "injected failure".to_string() });
        }
        Ok(())
    }
}

impl PhyloBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn search(&self, query: &GeneQuery) -> Result<Option<ArtifactHandle>, ProviderError> {
        self.record(MockCall::Search(query.clone()))?;
        if self.misses.contains(query.organism()) {
            return Ok(None);
        }
        Ok(Some(ArtifactHandle::dataset(format!("seq-{}-{}", query.gene(), query.organism_file_stem()))))
    }

    fn merge(&self, records: &[ArtifactHandle]) -> Result<ArtifactHandle, ProviderError> {
        self.record(MockCall::Merge(records.to_vec()))?;
        Ok(ArtifactHandle::collection(format!("merged-{}", records.len())))
    }

    fn align(&self, _composite: &ArtifactHandle, method: AlignmentMethod) -> Result<ArtifactHandle, ProviderError> {
        self.record(MockCall::Align(method))?;
        Ok(ArtifactHandle::dataset(format!("aln-{}", method.as_str())))
    }

    fn build_tree(&self, _alignment: &ArtifactHandle, method: TreeMethod) -> Result<ArtifactHandle, ProviderError> {
        self.record(MockCall::BuildTree(method))?;
        Ok(ArtifactHandle::dataset(format!("tree-{}", method.as_str())))
    }

    fn export(&self, tree: &ArtifactHandle, target: &Path) -> Result<PathBuf, ProviderError> {
        self.record(MockCall::Export(target.to_path_buf()))?;
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ProviderError::io(parent, e))?;
        }
        let label = tree.remote_id().unwrap_or("tree").replace(['(', ')', ',', ':', ';'], "_");
        fs::write(target, format!("({label}:0.1,outgroup:0.2);\n")).map_err(|e| ProviderError::io(target, e))?;
        Ok(target.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_calls_in_order() {
        let b = MockBackend::new().with_miss("Nonexistent organism");
        let hit = b.search(&GeneQuery::new("fliC", "Escherichia coli").unwrap()).unwrap();
        let miss = b.search(&GeneQuery::new("madeUpGene123", "Nonexistent organism").unwrap()).unwrap();
        assert_eq!(hit, Some(ArtifactHandle::dataset("seq-fliC-Escherichia_coli")));
        assert_eq!(miss, None);

        let merged = b.merge(&[ArtifactHandle::dataset("seq-fliC-Escherichia_coli")]).unwrap();
        b.align(&merged, AlignmentMethod::Muscle).unwrap();
        assert_eq!(b.call_count("search"), 2);
        assert_eq!(b.calls().last(), Some(&MockCall::Align(AlignmentMethod::Muscle)));
    }

    #[test]
    fn injected_failure_is_still_recorded() {
        let b = MockBackend::new().failing_on("align");
        let err = b.align(&ArtifactHandle::collection("c"), AlignmentMethod::Mafft).unwrap_err();
        assert!(matches!(err, ProviderError::Api { status: 500, .. }));
        assert_eq!(b.call_count("align"), 1);
    }

    #[test]
    fn export_writes_newick() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("sub/t.nwk");
        let b = MockBackend::new();
        b.export(&ArtifactHandle::dataset("tree-fasttree"), &target).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "(tree-fasttree:0.1,outgroup:0.2);\n");
    }
}
