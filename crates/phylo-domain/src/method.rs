//! Selectores de método para los stages de alineamiento y árbol.
//!
//! El conjunto es cerrado: cualquier otro selector falla con
//! `DomainError::Unsupported*` antes de cualquier llamada externa.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentMethod {
    /// Alineador múltiple principal.
    #[default]
    Mafft,
    ClustalOmega,
    Muscle,
}

impl AlignmentMethod {
    pub const ALL: [AlignmentMethod; 3] = [AlignmentMethod::Mafft, AlignmentMethod::ClustalOmega, AlignmentMethod::Muscle];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlignmentMethod::Mafft => "mafft",
            AlignmentMethod::ClustalOmega => "clustal_omega",
            AlignmentMethod::Muscle => "muscle",
        }
    }
}

impl FromStr for AlignmentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mafft" => Ok(AlignmentMethod::Mafft),
            "clustal_omega" | "clustalo" => Ok(AlignmentMethod::ClustalOmega),
            "muscle" => Ok(AlignmentMethod::Muscle),
            _ => Err(DomainError::UnsupportedAlignmentMethod(s.to_string())),
        }
    }
}

impl fmt::Display for AlignmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeMethod {
    /// Aproximado rápido.
    #[serde(rename = "fasttree")]
    FastTree,
    /// Máxima verosimilitud con bootstrap.
    Raxml,
    /// Máxima verosimilitud con selección de modelo y ultrafast bootstrap.
    #[serde(rename = "iqtree")]
    IqTree,
}

impl TreeMethod {
    pub const ALL: [TreeMethod; 3] = [TreeMethod::FastTree, TreeMethod::Raxml, TreeMethod::IqTree];

    pub fn as_str(&self) -> &'static str {
        match self {
            TreeMethod::FastTree => "fasttree",
            TreeMethod::Raxml => "raxml",
            TreeMethod::IqTree => "iqtree",
        }
    }

    /// Parsea una lista ordenada de selectores. La lista no puede estar vacía
    /// ni repetir métodos; el primer selector inválido corta el parseo.
    pub fn parse_list<S: AsRef<str>>(selectors: &[S]) -> Result<Vec<TreeMethod>, DomainError> {
        if selectors.is_empty() {
            return Err(DomainError::NoTreeMethods);
        }
        let mut out: Vec<TreeMethod> = Vec::with_capacity(selectors.len());
        for s in selectors {
            let m: TreeMethod = s.as_ref().parse()?;
            if out.contains(&m) {
                return Err(DomainError::DuplicateTreeMethod(m.to_string()));
            }
            out.push(m);
        }
        Ok(out)
    }
}

impl FromStr for TreeMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fasttree" => Ok(TreeMethod::FastTree),
            "raxml" => Ok(TreeMethod::Raxml),
            "iqtree" | "iq-tree" => Ok(TreeMethod::IqTree),
            _ => Err(DomainError::UnsupportedTreeMethod(s.to_string())),
        }
    }
}

impl fmt::Display for TreeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_method_round_trips_through_its_name() {
        for m in AlignmentMethod::ALL {
            assert_eq!(m.as_str().parse::<AlignmentMethod>().unwrap(), m);
        }
        for m in TreeMethod::ALL {
            assert_eq!(m.as_str().parse::<TreeMethod>().unwrap(), m);
        }
    }

    #[test]
    fn aliases_are_accepted() {
        assert_eq!("clustalo".parse::<AlignmentMethod>().unwrap(), AlignmentMethod::ClustalOmega);
        assert_eq!(" MAFFT ".parse::<AlignmentMethod>().unwrap(), AlignmentMethod::Mafft);
        assert_eq!("IQ-TREE".parse::<TreeMethod>().unwrap(), TreeMethod::IqTree);
    }

    #[test]
    fn unknown_selectors_are_rejected_verbatim() {
        let err = "nonexistent".parse::<AlignmentMethod>().unwrap_err();
        assert_eq!(err, DomainError::UnsupportedAlignmentMethod("nonexistent".into()));
        assert_eq!(err.to_string(), "Unsupported alignment method: nonexistent");
        assert!(matches!("phyml".parse::<TreeMethod>(), Err(DomainError::UnsupportedTreeMethod(_))));
    }

    #[test]
    fn parse_list_enforces_non_empty_and_unique() {
        let empty: [&str; 0] = [];
        assert_eq!(TreeMethod::parse_list(&empty).unwrap_err(), DomainError::NoTreeMethods);
        assert_eq!(TreeMethod::parse_list(&["raxml", "fasttree"]).unwrap(),
                   vec![TreeMethod::Raxml, TreeMethod::FastTree]);
        assert_eq!(TreeMethod::parse_list(&["iqtree", "iq-tree"]).unwrap_err(),
                   DomainError::DuplicateTreeMethod("iqtree".into()));
        assert!(matches!(TreeMethod::parse_list(&["fasttree", "nj"]),
                         Err(DomainError::UnsupportedTreeMethod(_))));
    }
}
