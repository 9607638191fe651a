use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Par (gen, organismo) que dispara una búsqueda de secuencia.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneQuery {
    gene: String,
    organism: String,
}

impl GeneQuery {
    pub fn new(gene: &str, organism: &str) -> Result<Self, DomainError> {
        let gene = gene.trim();
        let organism = organism.trim();
        if gene.is_empty() || organism.is_empty() {
            return Err(DomainError::InvalidQuery(format!("gene={gene:?} organism={organism:?}")));
        }
        Ok(Self { gene: gene.to_string(),
                  organism: organism.to_string() })
    }

    pub fn gene(&self) -> &str { &self.gene }
    pub fn organism(&self) -> &str { &self.organism }

    /// Nombre de archivo derivado del organismo. Sólo conserva
    /// `[A-Za-z0-9._-]`; el resto pasa a `_`, así el resultado nunca es un
    /// separador de ruta ni `.`/`..`.
    pub fn organism_file_stem(&self) -> String {
        file_safe(&self.organism)
    }

    /// Nombre de archivo único por (gen, organismo): `<gen>_<organismo>`.
    pub fn record_file_stem(&self) -> String {
        file_safe(&format!("{}_{}", self.gene, self.organism))
    }

    /// Parsea una lista JSON `[{"gene": "..", "organism": ".."}]`, validando
    /// cada entrada y conservando el orden.
    pub fn list_from_json(text: &str) -> Result<Vec<GeneQuery>, DomainError> {
        let raw: Vec<GeneQuery> = serde_json::from_str(text)?;
        raw.into_iter().map(|q| GeneQuery::new(&q.gene, &q.organism)).collect()
    }

    pub fn list_from_file(path: &Path) -> Result<Vec<GeneQuery>, DomainError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| DomainError::InvalidQuery(format!("cannot read {}: {e}", path.display())))?;
        Self::list_from_json(&text)
    }
}

fn file_safe(raw: &str) -> String {
    let stem: String = raw.chars()
                          .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
                          .collect();
    if stem.chars().all(|c| c == '.') {
        return "_".repeat(stem.len().max(1));
    }
    stem
}

impl fmt::Display for GeneQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.gene, self.organism)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_and_rejects_blank_fields() {
        let q = GeneQuery::new(" fliC ", "Escherichia coli ").unwrap();
        assert_eq!(q.gene(), "fliC");
        assert_eq!(q.organism_file_stem(), "Escherichia_coli");
        assert!(matches!(GeneQuery::new("", "Vibrio cholerae"), Err(DomainError::InvalidQuery(_))));
        assert!(GeneQuery::new("flaA", "   ").is_err());
    }

    #[test]
    fn file_stems_never_leave_their_directory() {
        let q = GeneQuery::new("fliC", "Escherichia coli O157:H7 str. EDL933/ATCC 700927").unwrap();
        assert_eq!(q.organism_file_stem(), "Escherichia_coli_O157_H7_str._EDL933_ATCC_700927");
        assert_eq!(q.record_file_stem(), "fliC_Escherichia_coli_O157_H7_str._EDL933_ATCC_700927");

        let q = GeneQuery::new("fliC", "../../escaped").unwrap();
        assert_eq!(q.organism_file_stem(), ".._.._escaped");
        assert!(!q.organism_file_stem().contains('/'));

        assert_eq!(GeneQuery::new("x", "..").unwrap().organism_file_stem(), "__");
        assert_eq!(GeneQuery::new("x", ".").unwrap().organism_file_stem(), "_");
        assert_eq!(GeneQuery::new("x", "Bacillus\\subtilis").unwrap().organism_file_stem(), "Bacillus_subtilis");
    }

    #[test]
    fn record_stems_differ_per_gene() {
        let a = GeneQuery::new("fliC", "Escherichia coli").unwrap();
        let b = GeneQuery::new("flaA", "Escherichia coli").unwrap();
        assert_eq!(a.organism_file_stem(), b.organism_file_stem());
        assert_ne!(a.record_file_stem(), b.record_file_stem());
        assert_eq!(a.record_file_stem(), "fliC_Escherichia_coli");
    }

    #[test]
    fn list_from_json_keeps_order() {
        let text = r#"[{"gene": "fliC", "organism": "Escherichia coli"},
                       {"gene": "flaB", "organism": "Borrelia burgdorferi"}]"#;
        let list = GeneQuery::list_from_json(text).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].to_string(), "flaB in Borrelia burgdorferi");
    }

    #[test]
    fn list_from_json_validates_entries() {
        let text = r#"[{"gene": "", "organism": "Escherichia coli"}]"#;
        assert!(matches!(GeneQuery::list_from_json(text), Err(DomainError::InvalidQuery(_))));
        assert!(matches!(GeneQuery::list_from_json("{"), Err(DomainError::Serialization(_))));
    }
}
