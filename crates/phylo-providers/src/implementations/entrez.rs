//! Cliente mínimo de NCBI Entrez E-utilities (esearch + efetch).

use std::fmt;
use std::time::Duration;

use log::debug;
use phylo_domain::GeneQuery;
use serde_json::Value;

use crate::ProviderError;

pub const DEFAULT_EUTILS_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
pub const PROTEIN_DB: &str = "protein";

pub trait EntrezApi: fmt::Debug {
    /// Ids que coinciden con `term`, a lo sumo `retmax`.
    fn esearch(&self, db: &str, term: &str, retmax: u32) -> Result<Vec<String>, ProviderError>;
    /// Registro FASTA (texto) del id.
    fn efetch_fasta(&self, db: &str, id: &str) -> Result<String, ProviderError>;
}

/// Término Entrez: gen + organismo + filtro RefSeq.
pub fn search_term(query: &GeneQuery) -> String {
    format!("{}[Gene Name] AND {}[Organism] AND srcdb_refseq[PROP]", query.gene(), query.organism())
}

#[derive(Debug)]
pub struct UreqEntrezApi {
    base_url: String,
    email: String,
    agent: ureq::Agent,
}

impl UreqEntrezApi {
    pub fn new(base_url: &str, email: &str, timeout: Duration) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(),
               email: email.to_string(),
               agent: ureq::AgentBuilder::new().timeout(timeout).build() }
    }

    fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<ureq::Response, ProviderError> {
        let mut req = self.agent
                          .get(&format!("{}/{endpoint}", self.base_url))
                          .query("tool", "phyloflow")
                          .query("email", &self.email);
        for (k, v) in params {
            req = req.query(k, v);
        }
        req.call().map_err(|e| ProviderError::from_ureq(endpoint, e))
    }
}

impl EntrezApi for UreqEntrezApi {
    fn esearch(&self, db: &str, term: &str, retmax: u32) -> Result<Vec<String>, ProviderError> {
        let endpoint = "esearch.fcgi";
        debug!("entrez:esearch db={db} term={term}");
        let retmax = retmax.to_string();
        let body: Value = self.get(endpoint, &[("db", db), ("term", term), ("retmax", &retmax), ("retmode", "json")])?
                              .into_json()
                              .map_err(|e| ProviderError::unexpected(endpoint, e.to_string()))?;
        parse_esearch_ids(&body).ok_or_else(|| ProviderError::unexpected(endpoint, "missing esearchresult.idlist"))
    }

    fn efetch_fasta(&self, db: &str, id: &str) -> Result<String, ProviderError> {
        let endpoint = "efetch.fcgi";
        debug!("entrez:efetch db={db} id={id}");
        self.get(endpoint, &[("db", db), ("id", id), ("rettype", "fasta"), ("retmode", "text")])?
            .into_string()
            .map_err(|e| ProviderError::unexpected(endpoint, e.to_string()))
    }
}

/// Extrae `esearchresult.idlist` de la respuesta JSON de esearch.
pub fn parse_esearch_ids(body: &Value) -> Option<Vec<String>> {
    body.get("esearchresult")?
        .get("idlist")?
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn term_uses_refseq_property_filter() {
        let q = GeneQuery::new("flaA", "Vibrio cholerae").unwrap();
        assert_eq!(search_term(&q), "flaA[Gene Name] AND Vibrio cholerae[Organism] AND srcdb_refseq[PROP]");
    }

    #[test]
    fn esearch_ids_are_extracted() {
        let body = json!({"header": {}, "esearchresult": {"count": "1", "idlist": ["15801986"]}});
        assert_eq!(parse_esearch_ids(&body), Some(vec!["15801986".to_string()]));
        let empty = json!({"esearchresult": {"count": "0", "idlist": []}});
        assert_eq!(parse_esearch_ids(&empty), Some(vec![]));
        assert_eq!(parse_esearch_ids(&json!({"error": "bad"})), None);
    }
}
