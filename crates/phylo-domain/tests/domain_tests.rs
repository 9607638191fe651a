use std::io::Write;
use std::path::PathBuf;

use phylo_domain::{DomainError, GeneQuery};

fn shipped_panel() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/flagellin_queries.json")
}

#[test]
fn shipped_flagellin_panel_loads_in_order() {
    let queries = GeneQuery::list_from_file(&shipped_panel()).expect("panel should parse");
    assert_eq!(queries.len(), 10);
    assert_eq!(queries[0], GeneQuery::new("fliC", "Escherichia coli").unwrap());
    assert_eq!(queries[2].gene(), "flaB");
    assert_eq!(queries[9].organism(), "Clostridioides difficile");
}

#[test]
fn query_list_from_temp_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file,
           r#"[{{"gene": "fliC", "organism": "Escherichia coli"}},
               {{"gene": "madeUpGene123", "organism": "Nonexistent organism"}}]"#).unwrap();
    let queries = GeneQuery::list_from_file(file.path()).unwrap();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[1].organism_file_stem(), "Nonexistent_organism");
}

#[test]
fn missing_query_file_is_reported() {
    let err = GeneQuery::list_from_file(&PathBuf::from("/definitely/not/here.json")).unwrap_err();
    assert!(matches!(err, DomainError::InvalidQuery(msg) if msg.contains("cannot read")));
}
